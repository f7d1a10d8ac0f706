//! Leaf entry descriptors and their modification markers.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::SystemTime;

use parking_lot::Mutex;
use regex::Regex;
use url::Url;

use super::BuildError;
use crate::fetch::Fetcher;

/// `scheme://...` entries are remote.
static REMOTE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*://").unwrap());

/// Check whether an entry name denotes a remote resource.
pub fn is_remote(name: &str) -> bool {
    REMOTE_PATTERN.is_match(name)
}

/// Resolve a config name under `src_root`, treating a leading `/` or `\\` as
/// the source root itself.
pub fn under_root(src_root: &Path, name: &str) -> PathBuf {
    src_root.join(name.trim_start_matches(['/', '\\']))
}

/// Whether a config name climbs out of its root with a `..` segment.
pub fn has_parent_segment(name: &str) -> bool {
    name.split(['/', '\\']).any(|segment| segment == "..")
}

/// Opaque, comparable token describing a version of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Filesystem modification time of a local file.
    Modified(SystemTime),
    /// Build generation of a nested bundle.
    Generation(u64),
}

/// Where an entry's bytes come from.
#[derive(Debug, Clone)]
pub enum SourceKind {
    Local(PathBuf),
    Remote(Url),
}

#[derive(Debug, Default)]
struct MarkerState {
    /// Marker recorded after the last successful build including this entry.
    previous: Option<Marker>,
    /// Marker seen during the current check, committed on success.
    observed: Option<Marker>,
}

/// One entry of a bundle: a local file, a remote resource, or (by name) a
/// nested bundle whose output file lives at the local path.
#[derive(Debug)]
pub struct Source {
    name: String,
    kind: SourceKind,
    markers: Mutex<MarkerState>,
}

impl Source {
    /// Local entry resolved against the source root.
    pub fn local(name: impl Into<String>, src_root: &Path) -> Self {
        let name = name.into();
        let path = under_root(src_root, &name);
        Self::with_kind(name, SourceKind::Local(path))
    }

    /// Remote entry; the name is the URL.
    pub fn remote(url: Url) -> Self {
        Self::with_kind(url.to_string(), SourceKind::Remote(url))
    }

    fn with_kind(name: String, kind: SourceKind) -> Self {
        Self {
            name,
            kind,
            markers: Mutex::new(MarkerState::default()),
        }
    }

    /// Entry name as written in the config.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &SourceKind {
        &self.kind
    }

    pub fn is_remote(&self) -> bool {
        matches!(self.kind, SourceKind::Remote(_))
    }

    /// Extension with its leading dot (`.tmpl`), used to select a hook.
    ///
    /// Remote entries use their URL path so query strings are ignored.
    pub fn extension(&self) -> Option<String> {
        let path = match &self.kind {
            SourceKind::Local(path) => path.as_path(),
            SourceKind::Remote(url) => Path::new(url.path()),
        };
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{ext}"))
    }

    /// Human-readable location (file path or URL).
    pub fn location(&self) -> String {
        match &self.kind {
            SourceKind::Local(path) => path.display().to_string(),
            SourceKind::Remote(url) => url.to_string(),
        }
    }

    // ========================================================================
    // content
    // ========================================================================

    /// Read the entry as text.
    pub fn read(&self, fetcher: &dyn Fetcher) -> Result<String, BuildError> {
        match &self.kind {
            SourceKind::Local(path) => {
                fs::read_to_string(path).map_err(|e| BuildError::read(&self.name, e))
            }
            SourceKind::Remote(url) => fetcher
                .fetch(url)
                .map_err(|e| BuildError::fetch(&self.name, e)),
        }
    }

    // ========================================================================
    // markers
    // ========================================================================

    /// Current marker of a leaf, `None` when the kind has no marker capability.
    pub fn current_marker(&self) -> Result<Option<Marker>, BuildError> {
        match &self.kind {
            SourceKind::Local(path) => fs::metadata(path)
                .and_then(|meta| meta.modified())
                .map(|time| Some(Marker::Modified(time)))
                .map_err(|e| BuildError::read(&self.name, e)),
            SourceKind::Remote(_) => Ok(None),
        }
    }

    /// Fetch the current marker, remember it, and report whether it differs
    /// from the committed one.
    ///
    /// Entries without marker capability always report unchanged.
    pub fn observe_current(&self) -> Result<bool, BuildError> {
        match self.current_marker()? {
            Some(marker) => Ok(self.observe(marker)),
            None => Ok(false),
        }
    }

    /// Compare the current marker against the committed one without
    /// remembering it.
    pub fn peek_current(&self) -> Result<bool, BuildError> {
        match self.current_marker()? {
            Some(marker) => Ok(self.differs(marker)),
            None => Ok(false),
        }
    }

    /// Whether `marker` differs from the committed one.
    pub fn differs(&self, marker: Marker) -> bool {
        self.markers.lock().previous != Some(marker)
    }

    /// Remember `marker` for this check. A missing previous marker counts as changed.
    pub fn observe(&self, marker: Marker) -> bool {
        let mut state = self.markers.lock();
        state.observed = Some(marker);
        state.previous != Some(marker)
    }

    /// Make sure a marker was observed in this check round.
    ///
    /// Change detection stops at the first change, so later entries may not
    /// have been looked at yet.
    pub fn ensure_observed(&self) -> Result<(), BuildError> {
        if self.markers.lock().observed.is_some() {
            return Ok(());
        }
        if let Some(marker) = self.current_marker()? {
            self.markers.lock().observed = Some(marker);
        }
        Ok(())
    }

    /// Forget observations from an earlier, possibly failed, check.
    pub fn reset_observation(&self) {
        self.markers.lock().observed = None;
    }

    /// Advance the committed marker to the observed one.
    pub fn commit(&self) {
        let mut state = self.markers.lock();
        if let Some(marker) = state.observed.take() {
            state.previous = Some(marker);
        }
    }

    #[cfg(test)]
    pub fn previous_marker(&self) -> Option<Marker> {
        self.markers.lock().previous
    }
}
