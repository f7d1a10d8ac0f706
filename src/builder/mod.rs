//! Incremental bundle builder.
//!
//! Single entry point for every build request (CLI, serve, tests):
//!
//! 1. Coalesce with an in-flight build of the same bundle, if any
//! 2. Ask [`has_changed`]; skip when unchanged and the artifact exists
//! 3. Collect entries in order, building nested bundles first and reading
//!    their artifacts back from disk
//! 4. Persist, then commit markers
//!
//! Any failure leaves markers untouched so the next request retries.


use std::fs;
use std::sync::Arc;

use anyhow::Result;
use crossbeam::channel::{self, Receiver, Sender};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rayon::prelude::*;

use crate::bundle::{BuildError, Bundle, Emitter, Marker, Registry, cycle_error, has_changed};
use crate::config::{BundleConfig, Env};
use crate::fetch::{Fetcher, HttpFetcher};
use crate::logger::Progress;
use crate::persist::Persister;
use crate::pipeline::{HookContext, Pipeline};
use crate::{debug, log};

/// What a successful build did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Artifact rewritten from this many entries.
    Built { entries: usize },
    /// Nothing changed and the artifact already exists.
    Fresh,
}

pub type BuildResult = Result<BuildOutcome, BuildError>;

type Waiter = Sender<BuildResult>;

/// Builds bundles on demand, at most one build per bundle at a time.
pub struct Builder {
    registry: Arc<Registry>,
    pipeline: Pipeline,
    persister: Persister,
    fetcher: Arc<dyn Fetcher>,
    /// In-progress bundles -> coalesced callers
    active: DashMap<String, Vec<Waiter>>,
}

impl Builder {
    pub fn new(
        registry: Arc<Registry>,
        pipeline: Pipeline,
        persister: Persister,
        fetcher: Arc<dyn Fetcher>,
    ) -> Self {
        Self {
            registry,
            pipeline,
            persister,
            fetcher,
            active: DashMap::new(),
        }
    }

    /// Register bundles, hooks, minifier and fetcher from config.
    pub fn from_config(config: &BundleConfig) -> Result<Self> {
        let registry = Registry::register(&config.bundles, config.src_root())?;
        let pipeline = Pipeline::from_config(config)?;
        if pipeline.is_empty() {
            debug!("build"; "no hooks registered, entries are joined as read");
        } else {
            debug!("build"; "{} hooks registered", pipeline.len());
        }
        let fetcher = HttpFetcher::new(&config.fetch)?;
        Ok(Self::new(
            Arc::new(registry),
            pipeline,
            Persister::new(config.minify.clone()),
            Arc::new(fetcher),
        ))
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn emitter(&self, env: Env) -> Emitter<'_> {
        Emitter::new(env, &self.registry)
    }

    /// Build `name` if anything under it changed.
    ///
    /// Concurrent calls for the same bundle share one build and its result.
    pub fn build(&self, name: &str) -> BuildResult {
        let mut stack = Vec::new();
        self.build_in(name, &mut stack)
    }

    /// Build several bundles on the rayon pool with a progress line.
    ///
    /// Results come back in the order of `names`.
    pub fn build_many(&self, names: &[&str]) -> Vec<(String, BuildResult)> {
        let progress = Progress::new("bundles", names.len());
        let results: Vec<_> = names
            .par_iter()
            .map(|name| {
                let result = self.build(name);
                progress.tick(result.is_ok());
                (name.to_string(), result)
            })
            .collect();
        progress.finish();
        results
    }

    /// Build every registered bundle, sorted by name.
    pub fn build_all(&self) -> Vec<(String, BuildResult)> {
        let names = self.registry.names();
        self.build_many(&names)
    }

    /// Force the next build of `name` to run, even if only remote entries
    /// would have changed.
    pub fn invalidate(&self, name: &str) -> Result<(), BuildError> {
        let bundle = self.bundle(name)?;
        bundle.invalidate();
        debug!("build"; "invalidated {}", name);
        Ok(())
    }

    fn bundle(&self, name: &str) -> Result<&Bundle, BuildError> {
        self.registry
            .get(name)
            .ok_or_else(|| BuildError::UnknownBundle(name.to_string()))
    }
}

// =============================================================================
// Coalescing
// =============================================================================

impl Builder {
    fn build_in<'s>(&'s self, name: &str, stack: &mut Vec<&'s str>) -> BuildResult {
        let bundle = self.bundle(name)?;

        // A bundle already on our own path would wait on itself
        if stack.contains(&bundle.name()) {
            return Err(cycle_error(stack, bundle.name()));
        }

        if let Some(rx) = self.join_or_claim(bundle.name()) {
            return Self::recv(bundle.name(), rx);
        }

        let depth = stack.len();
        stack.push(bundle.name());

        // Catch panics so waiters always receive a result
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            self.run(bundle, stack)
        }))
        .unwrap_or_else(|_| Err(BuildError::Interrupted(bundle.name().to_string())));
        stack.truncate(depth);

        let waiters = self
            .active
            .remove(bundle.name())
            .map(|(_, w)| w)
            .unwrap_or_default();
        Self::broadcast(&waiters, &result);
        result
    }

    /// Join an in-flight build, or claim the bundle for this caller.
    ///
    /// Returns the receiver when joined, `None` when claimed.
    fn join_or_claim(&self, name: &str) -> Option<Receiver<BuildResult>> {
        match self.active.entry(name.to_string()) {
            Entry::Occupied(mut e) => {
                let (tx, rx) = channel::bounded(1);
                e.get_mut().push(tx);
                Some(rx)
            }
            Entry::Vacant(e) => {
                e.insert(Vec::new());
                None
            }
        }
    }

    fn recv(name: &str, rx: Receiver<BuildResult>) -> BuildResult {
        debug!("build"; "waiting for in-flight {}", name);
        rx.recv()
            .unwrap_or_else(|_| Err(BuildError::Interrupted(name.to_string())))
    }

    fn broadcast(waiters: &[Waiter], result: &BuildResult) {
        for tx in waiters {
            let _ = tx.send(result.clone());
        }
    }
}

// =============================================================================
// Build logic
// =============================================================================

impl Builder {
    fn run<'s>(&'s self, bundle: &'s Bundle, stack: &mut Vec<&'s str>) -> BuildResult {
        let changed = has_changed(&self.registry, bundle)?;
        if !changed && bundle.output_path().exists() {
            debug!("build"; "{} is fresh", bundle.name());
            return Ok(BuildOutcome::Fresh);
        }

        let contents = self.collect(bundle, stack)?;
        self.persister.save(bundle, &contents)?;
        bundle.commit();

        log!("build"; "{} ({} entries)", bundle.name(), contents.len());
        Ok(BuildOutcome::Built {
            entries: contents.len(),
        })
    }

    /// Content of every entry, in declared order.
    fn collect<'s>(
        &'s self,
        bundle: &'s Bundle,
        stack: &mut Vec<&'s str>,
    ) -> Result<Vec<String>, BuildError> {
        let mut contents = Vec::with_capacity(bundle.entries().len());

        for entry in bundle.entries() {
            let content = match self.registry.get(entry.name()) {
                Some(nested) => {
                    self.build_in(nested.name(), stack)?;
                    entry.observe(Marker::Generation(nested.generation()));
                    // The finalized artifact, not the raw entries
                    fs::read_to_string(nested.output_path())
                        .map_err(|e| BuildError::read(nested.name(), e))?
                }
                None => {
                    entry.ensure_observed()?;
                    let raw = entry.read(self.fetcher.as_ref())?;
                    let ctx = HookContext {
                        source: entry,
                        bundle: bundle.name(),
                        src_root: self.registry.src_root(),
                    };
                    self.pipeline.transform(&ctx, raw)?
                }
            };
            contents.push(content);
        }

        Ok(contents)
    }
}
