//! Core domain types, errors, and constants for the `docvault` client.
//!
//! Everything the sharing subsystem passes between components lives here:
//! documents as the backend reports them, share options and capability
//! links, content classification for the anonymous viewer, and the error
//! taxonomy every component recovers from locally.
//!
//! ## Key Components
//!
//! - **`errors`**: The `Error` enum and `Result` alias. Each variant maps to
//!   a distinct user-facing advisory via [`Error::advisory`].
//! - **`types`**: `DocumentId`, `Document`, `ShareOptions`, `ShareToken`,
//!   `ShareLink`, and the `ContentKind`/`RenderMode` classification.
//! - **`constants`**: Wire paths, default origins, and stable fallback
//!   messages.

pub mod constants;
pub mod errors;
pub mod types;

pub use self::{
    constants::*,
    errors::{Error, Result, ResultExt},
    types::*,
};
