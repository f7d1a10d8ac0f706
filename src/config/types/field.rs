//! Config field path used to point diagnostics at a TOML location.

use owo_colors::OwoColorize;
use std::fmt;

/// Dotted path to a config field, e.g. `build.src` or `bundles."app.js"`.
///
/// Bundle and hook keys are user-defined, so paths are owned strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath(String);

impl FieldPath {
    #[inline]
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Path of a bundle entry list.
    #[inline]
    pub fn bundle(name: &str) -> Self {
        Self(format!("bundles.\"{name}\""))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_args!("`{}`", self.0).bright_blue())
    }
}

impl AsRef<str> for FieldPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_field_path() {
        assert_eq!(FieldPath::bundle("app.js").as_str(), "bundles.\"app.js\"");
        assert_eq!(FieldPath::new("build.src").as_ref(), "build.src");
    }
}
