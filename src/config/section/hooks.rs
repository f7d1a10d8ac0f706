//! `[hooks]` section configuration.
//!
//! Hooks post-process a leaf's raw content before it is assembled into a
//! bundle. They are keyed by the entry's file extension (including the dot).
//!
//! # Example
//!
//! ```toml
//! [hooks.".tmpl"]
//! command = ["mustache", "-", "$BUNDLE_SRC_ROOT/data.json"]
//!
//! [hooks.".ts"]
//! command = ["esbuild", "--loader=ts"]
//! quiet = false
//! ```
//!
//! The raw content is piped to the command's stdin and its stdout replaces
//! the content. Arguments may reference `$BUNDLE_SOURCE`, `$BUNDLE_NAME`
//! and `$BUNDLE_SRC_ROOT`.

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Configuration for a single extension hook.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HookConfig {
    /// Command and arguments to execute.
    pub command: Vec<String>,

    /// Suppress stderr output of successful runs (default: true).
    pub quiet: bool,
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            command: Vec::new(),
            quiet: true,
        }
    }
}

impl HookConfig {
    /// Display name for logging (`command[0]`).
    pub fn display_name(&self) -> &str {
        self.command.first().map_or("hook", String::as_str)
    }
}

/// Validate every declared hook.
///
/// Extensions must carry their leading dot so they compare equal to
/// `Path::extension` results rendered as `.ext`.
pub fn validate_hooks(hooks: &BTreeMap<String, HookConfig>, diag: &mut ConfigDiagnostics) {
    for (ext, hook) in hooks {
        let field = FieldPath::new(format!("hooks.\"{ext}\""));
        if !ext.starts_with('.') || ext.len() < 2 {
            diag.error_with_hint(
                field.clone(),
                format!("hook key `{ext}` is not a file extension"),
                format!("write it as `.{}`", ext.trim_start_matches('.')),
            );
        }
        if hook.command.is_empty() {
            diag.error(field, "hook command is empty");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_empty_hooks() {
        let config = test_parse_config("");
        assert!(config.hooks.is_empty());
    }

    #[test]
    fn test_hook_parse() {
        let config = test_parse_config(
            r#"
[hooks.".tmpl"]
command = ["mustache", "-"]
"#,
        );
        let hook = &config.hooks[".tmpl"];
        assert_eq!(hook.command, vec!["mustache", "-"]);
        assert_eq!(hook.display_name(), "mustache");
        assert!(hook.quiet);
    }

    #[test]
    fn test_validate_hooks() {
        let mut hooks = BTreeMap::new();
        hooks.insert("tmpl".to_string(), HookConfig {
            command: vec!["cat".into()],
            quiet: true,
        });
        hooks.insert(".ts".to_string(), HookConfig::default());
        hooks.insert(".md".to_string(), HookConfig {
            command: vec!["pandoc".into()],
            quiet: true,
        });

        let mut diag = ConfigDiagnostics::new();
        validate_hooks(&hooks, &mut diag);
        assert_eq!(diag.len(), 2);
    }
}
