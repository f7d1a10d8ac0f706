//! `[build]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [build]
//! src = "public"          # Source root; bundles are written here too
//! env = "production"      # production | development
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Emit mode for template layers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Env {
    /// Pages reference the single compiled bundle.
    #[default]
    Production,
    /// Pages reference each original entry for easier debugging.
    Development,
}

impl Env {
    pub const fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }
}

impl fmt::Display for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Production => f.write_str("production"),
            Self::Development => f.write_str("development"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Source root directory. Relative paths resolve against the config file.
    pub src: PathBuf,

    /// Emit mode.
    pub env: Env,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            src: PathBuf::from("public"),
            env: Env::default(),
        }
    }
}

impl BuildConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if !self.src.is_dir() {
            diag.error_with_hint(
                FieldPath::new("build.src"),
                format!("source root `{}` is not a directory", self.src.display()),
                "create the directory or point `build.src` at an existing one",
            );
        }
    }
}
