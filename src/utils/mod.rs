//! Shared utilities: hook command execution and MIME detection.

pub mod exec;
pub mod mime;
