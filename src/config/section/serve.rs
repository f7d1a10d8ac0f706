//! `[serve]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [serve]
//! interface = "127.0.0.1"     # Network interface (127.0.0.1 = localhost only)
//! port = 5277                 # HTTP port number
//! ```
//!
//! Use `interface = "0.0.0.0"` to make the server accessible from LAN.

use std::net::{IpAddr, Ipv4Addr};

use serde::{Deserialize, Serialize};

/// Development server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Network interface to bind.
    pub interface: IpAddr,

    /// HTTP port number.
    pub port: u16,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 5277,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;
    use std::net::Ipv6Addr;

    #[test]
    fn test_defaults_bind_localhost() {
        let serve = test_parse_config("").serve;
        assert!(serve.interface.is_loopback());
        assert_eq!(serve.port, 5277);
    }

    #[test]
    fn test_lan_and_ipv6_interfaces() {
        let serve = test_parse_config("[serve]\ninterface = \"0.0.0.0\"\nport = 8080").serve;
        assert!(serve.interface.is_unspecified());
        assert_eq!(serve.port, 8080);

        let serve = test_parse_config("[serve]\ninterface = \"::1\"").serve;
        assert_eq!(serve.interface, IpAddr::V6(Ipv6Addr::LOCALHOST));
    }
}
