//! Finalize assembled content and write the bundle artifact.
//!
//! | Format | Join    | Finalize                       |
//! |--------|---------|--------------------------------|
//! | CSS    | newline | lightningcss (unless disabled) |
//! | HTML   | newline | none                           |
//! | JS     | nothing | oxc minify + mangle            |

pub mod minify;

use std::fs;
use std::path::Path;

use crate::bundle::{BuildError, Bundle, OutputFormat};
use crate::config::MinifyConfig;
use crate::log;

/// Writes finalized bundle artifacts.
#[derive(Debug, Clone, Default)]
pub struct Persister {
    minify: MinifyConfig,
}

impl Persister {
    pub fn new(minify: MinifyConfig) -> Self {
        Self { minify }
    }

    /// Produce the final artifact text without writing it.
    pub fn finalize(&self, bundle: &Bundle, contents: &[String]) -> Result<String, BuildError> {
        let format = bundle.format();
        let joined = contents.join(format.separator());

        let result = match format {
            OutputFormat::Html => Ok(joined),
            OutputFormat::Css if !self.minify.css.enable => Ok(joined),
            OutputFormat::Css => minify::minify_css(&joined),
            OutputFormat::Js => minify::minify_js(&joined, &self.minify.js),
        };

        result.map_err(|message| {
            log!("minify"; "{}: {}", bundle.name(), message);
            BuildError::Minify {
                bundle: bundle.name().to_string(),
                message,
            }
        })
    }

    /// Finalize `contents` and replace the bundle's artifact.
    ///
    /// Nothing is written when finalization fails, so the previous artifact
    /// stays in place.
    pub fn save(&self, bundle: &Bundle, contents: &[String]) -> Result<(), BuildError> {
        let output = self.finalize(bundle, contents)?;
        write_atomic(bundle.output_path(), output.as_bytes())
    }
}

/// Write through a temporary sibling, then rename over `path`.
///
/// Readers never observe a half-written artifact.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<(), BuildError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| BuildError::write(parent, e))?;
    }

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!(".{file_name}.{}.tmp", std::process::id()));

    fs::write(&tmp, content).map_err(|e| BuildError::write(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        BuildError::write(path, e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::Registry;
    use crate::config::{BundleDefinitions, CssMinifyConfig};
    use tempfile::TempDir;

    fn registry(root: &Path, name: &str) -> Registry {
        let mut defs = BundleDefinitions::new();
        defs.insert(name.into(), vec!["x".into()]);
        Registry::register(&defs, root).unwrap()
    }

    #[test]
    fn test_html_joined_verbatim() {
        let dir = TempDir::new().unwrap();
        let registry = registry(dir.path(), "index.html");
        let bundle = registry.get("index.html").unwrap();

        Persister::default()
            .save(bundle, &["<header>".into(), "<main>  </main>".into()])
            .unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("index.html")).unwrap(),
            "<header>\n<main>  </main>"
        );
    }

    #[test]
    fn test_css_minified() {
        let dir = TempDir::new().unwrap();
        let registry = registry(dir.path(), "main.css");
        let bundle = registry.get("main.css").unwrap();

        Persister::default()
            .save(bundle, &["a { color: red; }".into(), "b { margin: 0px; }".into()])
            .unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("main.css")).unwrap(),
            "a{color:red}b{margin:0}"
        );
    }

    #[test]
    fn test_css_minify_disabled() {
        let dir = TempDir::new().unwrap();
        let registry = registry(dir.path(), "main.css");
        let bundle = registry.get("main.css").unwrap();
        let persister = Persister::new(MinifyConfig {
            css: CssMinifyConfig { enable: false },
            ..MinifyConfig::default()
        });

        let out = persister
            .finalize(bundle, &["a { }".into(), "b { }".into()])
            .unwrap();
        assert_eq!(out, "a { }\nb { }");
    }

    #[test]
    fn test_js_concatenated_without_separator() {
        let dir = TempDir::new().unwrap();
        let registry = registry(dir.path(), "app.js");
        let bundle = registry.get("app.js").unwrap();

        // Neither half parses alone, so only a plain concatenation succeeds
        let out = Persister::default()
            .finalize(bundle, &["console.log(".into(), "1);".into()])
            .unwrap();
        assert!(out.contains("console.log(1)"));
    }

    #[test]
    fn test_js_minify_failure_keeps_previous_artifact() {
        let dir = TempDir::new().unwrap();
        let registry = registry(dir.path(), "app.js");
        let bundle = registry.get("app.js").unwrap();
        fs::write(dir.path().join("app.js"), "old").unwrap();

        let err = Persister::default()
            .save(bundle, &["function (".into()])
            .unwrap_err();
        assert!(matches!(err, BuildError::Minify { ref bundle, .. } if bundle == "app.js"));
        assert_eq!(fs::read_to_string(dir.path().join("app.js")).unwrap(), "old");
    }

    #[test]
    fn test_write_atomic_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("css/nested/all.css");
        write_atomic(&path, b"x").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"x");

        // No temporary files left behind
        let leftovers = fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}
