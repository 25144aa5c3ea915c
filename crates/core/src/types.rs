//! Domain types shared by every docvault component

pub mod content;
pub mod document;
pub mod share;

pub use content::{essence, file_type_label, safe_file_name, ContentKind, RenderMode};
pub use document::{Document, DocumentId};
pub use share::{ShareLink, ShareOptions, ShareToken};
