//! Build failure kinds.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::fetch::FetchError;

/// A failed bundle build.
///
/// Cloneable so a single in-flight build can hand its result to every
/// coalesced caller; underlying causes are shared behind `Arc`.
#[derive(Debug, Clone, Error)]
pub enum BuildError {
    #[error("failed to read `{name}`")]
    Read {
        name: String,
        #[source]
        source: Arc<io::Error>,
    },

    #[error("failed to fetch `{name}`")]
    Fetch {
        name: String,
        #[source]
        source: Arc<FetchError>,
    },

    #[error("hook `{hook}` failed on `{name}`: {message}")]
    Transform {
        name: String,
        hook: String,
        message: String,
    },

    #[error("failed to minify `{bundle}`: {message}")]
    Minify { bundle: String, message: String },

    #[error("failed to write `{}`", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: Arc<io::Error>,
    },

    #[error("unknown bundle `{0}`")]
    UnknownBundle(String),

    #[error("bundle cycle: {}", .0.join(" -> "))]
    Cycle(Vec<String>),

    #[error("build of `{0}` was interrupted")]
    Interrupted(String),
}

impl BuildError {
    pub fn read(name: impl Into<String>, err: io::Error) -> Self {
        Self::Read {
            name: name.into(),
            source: Arc::new(err),
        }
    }

    pub fn write(path: impl Into<PathBuf>, err: io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source: Arc::new(err),
        }
    }

    pub fn fetch(name: impl Into<String>, err: FetchError) -> Self {
        Self::Fetch {
            name: name.into(),
            source: Arc::new(err),
        }
    }
}
