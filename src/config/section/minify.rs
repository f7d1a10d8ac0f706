//! `[minify]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [minify.js]
//! mangle = true       # Rename local bindings
//! compress = true     # Dead-code elimination and constant folding
//! module = false      # Parse input as an ES module instead of a script
//!
//! [minify.css]
//! enable = true       # false = join stylesheets without minifying
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MinifyConfig {
    pub js: JsMinifyConfig,
    pub css: CssMinifyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JsMinifyConfig {
    pub mangle: bool,
    pub compress: bool,
    pub module: bool,
}

impl Default for JsMinifyConfig {
    fn default() -> Self {
        Self {
            mangle: true,
            compress: true,
            module: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CssMinifyConfig {
    pub enable: bool,
}

impl Default for CssMinifyConfig {
    fn default() -> Self {
        Self { enable: true }
    }
}
