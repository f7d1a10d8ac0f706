//! Bundle model: entries, registry, change detection and emit resolution.
//!
//! # Module Structure
//!
//! ```text
//! bundle/
//! ├── source.rs     # Leaf entries and modification markers
//! ├── registry.rs   # Registry and Bundle, built once from config
//! ├── graph.rs      # Nesting structure, cycle detection
//! ├── detect.rs     # has_changed
//! ├── emit.rs       # Production/development references
//! ├── format.rs     # OutputFormat
//! └── error.rs      # BuildError
//! ```

mod detect;
mod emit;
mod error;
mod format;
mod graph;
mod registry;
mod source;

pub use detect::has_changed;
pub(crate) use detect::cycle_error;
pub use emit::Emitter;
pub use error::BuildError;
pub use format::OutputFormat;
pub use graph::find_cycle;
pub use registry::{Bundle, Registry};
pub use source::{Marker, Source, SourceKind, has_parent_segment, is_remote};
