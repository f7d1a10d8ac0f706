//! Bundle configuration management for `bundle.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # [build] [hooks] [minify] [fetch] [serve]
//! ├── types/         # ConfigError, ConfigDiagnostics, FieldPath, global handle
//! ├── util.rs        # Config discovery and path resolution
//! └── mod.rs         # BundleConfig (this file)
//! ```
//!
//! # Example
//!
//! ```toml
//! [build]
//! src = "public"
//! env = "production"
//!
//! [bundles]
//! "app.js" = ["js/vendor.js", "js/app.js"]
//! "main.css" = ["css/reset.css", "https://cdn.example.com/grid.css", "css/site.css"]
//! "all.css" = ["main.css", "css/print.css"]   # nested bundle
//! ```

pub mod section;
pub mod types;
mod util;

pub use section::{
    BuildConfig, CssMinifyConfig, Env, FetchConfig, HookConfig, JsMinifyConfig, MinifyConfig,
    ServeConfig,
};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath, cfg, init_config};

use crate::bundle::{OutputFormat, find_cycle, has_parent_segment, is_remote};
use crate::cli::{Cli, Commands};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Bundle name -> ordered entry names.
pub type BundleDefinitions = BTreeMap<String, Vec<String>>;

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing bundle.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BundleConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Source root and emit mode
    #[serde(default)]
    pub build: BuildConfig,

    /// Bundle definitions
    #[serde(default)]
    pub bundles: BundleDefinitions,

    /// Extension -> content transform
    #[serde(default)]
    pub hooks: BTreeMap<String, HookConfig>,

    /// Minifier options
    #[serde(default)]
    pub minify: MinifyConfig,

    /// Remote entry retrieval
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Development server settings
    #[serde(default)]
    pub serve: ServeConfig,
}

impl BundleConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd to find the config file. The project root is
    /// the config file's parent directory.
    pub fn load(cli: &Cli) -> Result<Self> {
        let config_path = util::find_config_file(&cli.config)
            .ok_or_else(|| ConfigError::NotFound(cli.config.clone()))?;

        let (mut config, diag) = Self::from_path(&config_path)?;
        config.config_path = util::absolute(&config_path);
        config.finalize(cli);

        diag.print_warnings();
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<(Self, ConfigDiagnostics)> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)
            .with_context(|| format!("failed to parse `{}`", path.display()))?;

        let mut diag = ConfigDiagnostics::new();
        for field in ignored {
            diag.warn_unknown(field);
        }
        Ok((config, diag))
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Resolve the root, apply CLI overrides and normalize paths.
    fn finalize(&mut self, cli: &Cli) {
        self.root = self
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Self::update_option(&mut self.build.env, cli.env.as_ref());
        Self::update_option(&mut self.build.src, cli.src.as_ref());
        if let Commands::Serve { interface, port } = &cli.command {
            Self::update_option(&mut self.serve.interface, interface.as_ref());
            Self::update_option(&mut self.serve.port, port.as_ref());
        }

        self.build.src = util::resolve_against(&self.root, &self.build.src);
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Source root; bundles are read from and written to this directory.
    pub fn src_root(&self) -> &Path {
        &self.build.src
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate configuration, collecting all errors and returning them at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.build.validate(&mut diag);
        validate_bundles(&self.bundles, &mut diag);
        section::validate_hooks(&self.hooks, &mut diag);

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

/// Check every bundle definition: known output format, non-empty entries, no cycles.
pub fn validate_bundles(bundles: &BundleDefinitions, diag: &mut ConfigDiagnostics) {
    for (name, entries) in bundles {
        if OutputFormat::from_name(name).is_none() {
            diag.error_with_hint(
                FieldPath::bundle(name),
                format!("`{name}` has no supported output format"),
                "bundle names must end in .css, .js or .html",
            );
        }
        if entries.is_empty() {
            diag.error(FieldPath::bundle(name), "entry list is empty");
        }
        if entries.iter().any(|entry| entry == name) {
            diag.error(FieldPath::bundle(name), "bundle lists itself as an entry");
        }
        if has_parent_segment(name) {
            diag.error(
                FieldPath::bundle(name),
                format!("`{name}` would be written outside the source root"),
            );
        }
        for entry in entries {
            if !is_remote(entry) && has_parent_segment(entry) {
                diag.error_with_hint(
                    FieldPath::bundle(name),
                    format!("entry `{entry}` points outside the source root"),
                    "entries may not contain `..` segments",
                );
            }
        }
    }

    if let Some(cycle) = find_cycle(bundles) {
        diag.error_with_hint(
            FieldPath::bundle(&cycle[0]),
            format!("bundle cycle: {}", cycle.join(" -> ")),
            "nested bundles must form a tree",
        );
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config and panic on unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> BundleConfig {
    let (parsed, ignored) = BundleConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================
