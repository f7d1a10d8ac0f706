//! URL to bundle name and filesystem path resolution.

use std::path::{Path, PathBuf};

/// Prefix of the server's own endpoints.
const API_PREFIX: &str = "__bundles/";

/// What a request path addresses.
#[derive(Debug, PartialEq, Eq)]
pub enum Route {
    /// `GET /__bundles/emit/<name>`
    Emit(String),
    /// `POST /__bundles/invalidate/<name>`
    Invalidate(String),
    /// Anything else, as a path relative to the source root.
    Path(String),
}

impl Route {
    pub fn parse(url: &str) -> Self {
        let clean = normalize_url(url);
        match clean.strip_prefix(API_PREFIX) {
            Some(rest) => {
                if let Some(name) = rest.strip_prefix("emit/") {
                    Self::Emit(name.to_string())
                } else if let Some(name) = rest.strip_prefix("invalidate/") {
                    Self::Invalidate(name.to_string())
                } else {
                    Self::Path(clean)
                }
            }
            None => Self::Path(clean),
        }
    }
}

/// Resolve a relative request path to a file under `serve_root`, handling
/// index.html for directories.
pub fn resolve_path(clean: &str, serve_root: &Path) -> Option<PathBuf> {
    // Reject paths with suspicious patterns early
    if clean.split('/').any(|segment| segment == "..") {
        return None;
    }

    let local = serve_root.join(clean);

    // Canonicalize to resolve symlinks and verify path is under serve_root
    let canonical = local.canonicalize().ok()?;
    let root_canonical = serve_root.canonicalize().ok()?;
    if !canonical.starts_with(&root_canonical) {
        return None;
    }

    if canonical.is_file() {
        return Some(canonical);
    }

    if canonical.is_dir() {
        let index = canonical.join("index.html");
        if index.is_file() {
            return Some(index);
        }
    }

    None
}

/// Normalize URL: decode, strip query string, unify separators, trim slashes
pub fn normalize_url(url: &str) -> String {
    use percent_encoding::percent_decode_str;

    let path = url.split(['?', '#']).next().unwrap_or(url);
    let decoded = percent_decode_str(path)
        .decode_utf8()
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_default();

    decoded.replace('\\', "/").trim_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("/css/all.css?v=3"), "css/all.css");
        assert_eq!(normalize_url("/app%2Ejs"), "app.js");
        assert_eq!(normalize_url("\\css\\main.css"), "css/main.css");
        assert_eq!(normalize_url("/"), "");
    }

    #[test]
    fn test_route_parse() {
        assert_eq!(
            Route::parse("/__bundles/emit/app.js"),
            Route::Emit("app.js".into())
        );
        assert_eq!(
            Route::parse("/__bundles/invalidate/css/all.css"),
            Route::Invalidate("css/all.css".into())
        );
        assert_eq!(Route::parse("/main.css?x=1"), Route::Path("main.css".into()));
        assert_eq!(
            Route::parse("/__bundles/other"),
            Route::Path("__bundles/other".into())
        );
    }

    #[test]
    fn test_resolve_path() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("docs")).unwrap();
        fs::write(dir.path().join("docs/index.html"), "<docs>").unwrap();
        fs::write(dir.path().join("a.css"), "a{}").unwrap();

        assert!(resolve_path("a.css", dir.path()).is_some());
        assert!(
            resolve_path("docs", dir.path())
                .unwrap()
                .ends_with("docs/index.html")
        );
        assert!(resolve_path("missing.css", dir.path()).is_none());
        assert!(resolve_path("../etc/passwd", dir.path()).is_none());
    }
}
