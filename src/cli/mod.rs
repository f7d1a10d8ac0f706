//! Command-line interface module.

mod args;
pub mod build;
pub mod emit;
pub mod serve;

pub use args::{Cli, Commands};
