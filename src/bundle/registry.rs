//! Bundle registry: every bundle and its entries, built once from config.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use rustc_hash::FxHashMap;
use url::Url;

use super::source::{self, Source};
use super::OutputFormat;
use crate::config::{BundleDefinitions, ConfigDiagnostics, ConfigError, FieldPath, validate_bundles};

/// Process-wide build sequence. Generation `0` means "never built".
static GENERATION: AtomicU64 = AtomicU64::new(0);

fn next_generation() -> u64 {
    GENERATION.fetch_add(1, Ordering::SeqCst) + 1
}

/// A named, ordered collection of entries compiled into one artifact.
#[derive(Debug)]
pub struct Bundle {
    name: String,
    output: PathBuf,
    format: OutputFormat,
    entries: Vec<Source>,
    generation: AtomicU64,
    /// Bumped by every `invalidate`.
    invalidations: AtomicU64,
    /// Invalidations seen by the running check.
    checked: AtomicU64,
    /// Invalidations covered by the last successful build.
    settled: AtomicU64,
}

impl Bundle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Artifact path, `src_root/name`.
    pub fn output_path(&self) -> &Path {
        &self.output
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Entries in declared order.
    pub fn entries(&self) -> &[Source] {
        &self.entries
    }

    /// Immediate entry names in declared order.
    pub fn entry_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(Source::name)
    }

    /// Generation of the last successful build, `0` if none in this process.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Invalidated since the last successful build.
    pub fn is_stale(&self) -> bool {
        self.invalidations.load(Ordering::SeqCst) > self.settled.load(Ordering::SeqCst)
    }

    /// Force the next check to report a change, including for remote entries.
    ///
    /// An invalidation that lands while a build is running survives that
    /// build's commit.
    pub fn invalidate(&self) {
        self.invalidations.fetch_add(1, Ordering::SeqCst);
    }

    /// Start a change check: drop observations left behind by an unfinished
    /// one and remember which invalidations this check accounts for.
    pub fn begin_check(&self) {
        self.checked
            .store(self.invalidations.load(Ordering::SeqCst), Ordering::SeqCst);
        for entry in &self.entries {
            entry.reset_observation();
        }
    }

    /// Record a successful build: advance every entry's marker and take a
    /// fresh generation so parents notice the new artifact.
    pub fn commit(&self) -> u64 {
        for entry in &self.entries {
            entry.commit();
        }
        let generation = next_generation();
        self.generation.store(generation, Ordering::SeqCst);
        self.settled
            .fetch_max(self.checked.load(Ordering::SeqCst), Ordering::SeqCst);
        generation
    }
}

/// Mapping from bundle name to bundle, owning every entry descriptor.
#[derive(Debug)]
pub struct Registry {
    src_root: PathBuf,
    bundles: FxHashMap<String, Bundle>,
}

impl Registry {
    /// Build descriptors for every bundle definition.
    ///
    /// Entries matching `scheme://` become remote descriptors, everything else
    /// resolves against `src_root`. Whether an entry names another bundle is
    /// decided by lookup at build time. All problems are reported together.
    pub fn register(definitions: &BundleDefinitions, src_root: &Path) -> Result<Self, ConfigError> {
        let mut diag = ConfigDiagnostics::new();
        validate_bundles(definitions, &mut diag);

        let mut bundles = FxHashMap::default();
        for (name, names) in definitions {
            let mut entries = Vec::with_capacity(names.len());
            for entry in names {
                if source::is_remote(entry) {
                    match Url::parse(entry) {
                        Ok(url) => entries.push(Source::remote(url)),
                        Err(e) => diag.error(
                            FieldPath::bundle(name),
                            format!("invalid remote entry `{entry}`: {e}"),
                        ),
                    }
                } else {
                    entries.push(Source::local(entry.as_str(), src_root));
                }
            }

            // Unsupported formats were already reported above
            let Some(format) = OutputFormat::from_name(name) else {
                continue;
            };

            bundles.insert(
                name.clone(),
                Bundle {
                    name: name.clone(),
                    output: source::under_root(src_root, name),
                    format,
                    entries,
                    generation: AtomicU64::new(0),
                    invalidations: AtomicU64::new(0),
                    checked: AtomicU64::new(0),
                    settled: AtomicU64::new(0),
                },
            );
        }

        diag.into_result().map_err(ConfigError::Diagnostics)?;
        Ok(Self {
            src_root: src_root.to_path_buf(),
            bundles,
        })
    }

    pub fn get(&self, name: &str) -> Option<&Bundle> {
        self.bundles.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bundles.contains_key(name)
    }

    pub fn src_root(&self) -> &Path {
        &self.src_root
    }

    /// Bundle names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.bundles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Bundles sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = &Bundle> {
        self.names().into_iter().filter_map(|name| self.get(name))
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::SourceKind;

    fn defs(pairs: &[(&str, &[&str])]) -> BundleDefinitions {
        pairs
            .iter()
            .map(|(name, entries)| {
                (
                    name.to_string(),
                    entries.iter().map(|e| e.to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_register_local_and_remote() {
        let registry = Registry::register(
            &defs(&[(
                "app.js",
                &["https://cdn.example.com/lib.js", "js/app.js"],
            )]),
            Path::new("/site"),
        )
        .unwrap();

        let bundle = registry.get("app.js").unwrap();
        assert_eq!(bundle.output_path(), Path::new("/site/app.js"));
        assert_eq!(bundle.format(), OutputFormat::Js);
        assert!(bundle.entries()[0].is_remote());
        assert!(matches!(
            bundle.entries()[1].kind(),
            SourceKind::Local(path) if path == Path::new("/site/js/app.js")
        ));
        assert_eq!(bundle.generation(), 0);
    }

    #[test]
    fn test_declaration_order_is_irrelevant() {
        // `all.css` is declared (sorted) before `main.css` and still resolves
        let registry = Registry::register(
            &defs(&[("main.css", &["a.css"]), ("all.css", &["main.css", "p.css"])]),
            Path::new("/site"),
        )
        .unwrap();
        let all = registry.get("all.css").unwrap();
        assert!(registry.contains(all.entries()[0].name()));
        assert_eq!(registry.names(), vec!["all.css", "main.css"]);
    }

    #[test]
    fn test_unknown_format_rejected() {
        let err = Registry::register(&defs(&[("notes.txt", &["a.txt"])]), Path::new("/site"))
            .unwrap_err();
        assert!(err.to_string().contains("notes.txt"));
    }

    #[test]
    fn test_cycle_rejected() {
        let err = Registry::register(
            &defs(&[("a.css", &["b.css"]), ("b.css", &["a.css"])]),
            Path::new("/site"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("a.css -> b.css -> a.css"));
    }

    #[test]
    fn test_commit_advances_generation() {
        let registry =
            Registry::register(&defs(&[("a.css", &["x.css"]), ("b.css", &["y.css"])]), Path::new("/s"))
                .unwrap();
        let a = registry.get("a.css").unwrap();
        let b = registry.get("b.css").unwrap();

        a.invalidate();
        assert!(a.is_stale());
        a.begin_check();
        let first = a.commit();
        let second = b.commit();
        assert!(first > 0);
        assert!(second > first);
        assert_eq!(a.generation(), first);
        assert!(!a.is_stale());
    }

    #[test]
    fn test_invalidation_during_build_survives_commit() {
        let registry =
            Registry::register(&defs(&[("a.css", &["x.css"])]), Path::new("/s")).unwrap();
        let a = registry.get("a.css").unwrap();

        a.begin_check();
        a.invalidate();
        a.commit();
        assert!(a.is_stale());

        a.begin_check();
        a.commit();
        assert!(!a.is_stale());
    }

    #[test]
    fn test_absolute_names_stay_under_root() {
        let registry = Registry::register(
            &defs(&[("/app.js", &["/js/app.js"])]),
            Path::new("/site"),
        )
        .unwrap();
        let bundle = registry.get("/app.js").unwrap();
        assert_eq!(bundle.output_path(), Path::new("/site/app.js"));
        assert!(matches!(
            bundle.entries()[0].kind(),
            SourceKind::Local(path) if path == Path::new("/site/js/app.js")
        ));
    }

    #[test]
    fn test_parent_segments_rejected() {
        let err = Registry::register(
            &defs(&[("../out.js", &["a.js"]), ("b.js", &["js/../../secret.js"])]),
            Path::new("/site"),
        )
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("../out.js"));
        assert!(message.contains("js/../../secret.js"));
    }
}
