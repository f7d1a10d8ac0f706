//! Configuration section definitions.
//!
//! Each module corresponds to a section in `bundle.toml`:
//!
//! | Module   | TOML Section | Purpose                               |
//! |----------|--------------|---------------------------------------|
//! | `build`  | `[build]`    | Source root, emit mode                |
//! | `hooks`  | `[hooks]`    | Per-extension content transforms      |
//! | `minify` | `[minify]`   | JS/CSS minifier options               |
//! | `fetch`  | `[fetch]`    | Remote entry retrieval                |
//! | `serve`  | `[serve]`    | Development server                    |
//!
//! `[bundles]` is a plain name -> entries table and lives on the root config.

mod build;
mod fetch;
mod hooks;
mod minify;
mod serve;

pub use build::{BuildConfig, Env};
pub use fetch::FetchConfig;
pub use hooks::{HookConfig, validate_hooks};
pub use minify::{CssMinifyConfig, JsMinifyConfig, MinifyConfig};
pub use serve::ServeConfig;
