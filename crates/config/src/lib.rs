//! Configuration management for docvault
//!
//! Settings come from built-in defaults, an optional JSON file, and
//! environment variables, in increasing order of precedence.

pub mod config;
pub mod loader;

pub use config::*;
pub use loader::*;
