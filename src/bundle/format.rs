//! Output format of a bundle, derived from its name.

use std::fmt;
use std::path::Path;

/// Closed set of artifact formats a bundle can be finalized into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// Entries joined with newlines, then minified.
    Css,
    /// Entries joined with newlines, written verbatim.
    Html,
    /// Entries concatenated, then minified and mangled.
    Js,
}

impl OutputFormat {
    /// Resolve the format from a bundle name's extension.
    ///
    /// Returns `None` for anything outside the closed set, which registration
    /// reports as a configuration error.
    pub fn from_name(name: &str) -> Option<Self> {
        let ext = Path::new(name).extension()?.to_str()?;
        match ext.to_ascii_lowercase().as_str() {
            "css" => Some(Self::Css),
            "html" | "htm" => Some(Self::Html),
            "js" | "mjs" | "cjs" => Some(Self::Js),
            _ => None,
        }
    }

    /// Separator placed between entry contents.
    pub const fn separator(self) -> &'static str {
        match self {
            Self::Css | Self::Html => "\n",
            Self::Js => "",
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Css => "css",
            Self::Html => "html",
            Self::Js => "js",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
