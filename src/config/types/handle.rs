//! Global config handle.
//!
//! Uses `arc-swap` for lock-free reads from request worker threads.

use crate::config::BundleConfig;
use arc_swap::ArcSwap;
use std::sync::{Arc, LazyLock};

/// Global config storage.
pub static CONFIG: LazyLock<ArcSwap<BundleConfig>> =
    LazyLock::new(|| ArcSwap::from_pointee(BundleConfig::default()));

#[inline]
pub fn cfg() -> Arc<BundleConfig> {
    CONFIG.load_full()
}

#[inline]
pub fn init_config(config: BundleConfig) -> Arc<BundleConfig> {
    let arc = Arc::new(config);
    CONFIG.store(Arc::clone(&arc));
    arc
}
