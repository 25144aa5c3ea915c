//! Shared utilities for docvault
//!
//! This crate provides the pieces every client component leans on that
//! carry no document semantics: the blob lifecycle manager that owns
//! fetched payloads, tracing initialisation, and display formatting.

pub mod blob;
pub mod format;
pub mod tracing;

pub use blob::{BlobAddress, BlobHandle, BlobLease, BlobManager, BlobStatsSnapshot, ReleasePath};
pub use format::*;
