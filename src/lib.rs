//! Soundvault core
//!
//! Document index and safe transfer engine for a media library stored in an
//! external, permission-gated document tree. The crate crawls the tree once
//! into a flat parent/child index, serves folder views from that index
//! without re-walking, and performs move/rename/delete against the storage
//! provider. Moves prefer an atomic native primitive and fall back to a
//! streamed copy-then-delete with throttled progress reporting.

pub mod domain;
pub mod file_type;
pub mod library;
pub mod operations;
pub mod provider;
pub mod shared;

pub use domain::entry::IndexEntry;
pub use domain::generation::IndexGeneration;
pub use library::{LibraryEvent, LibraryIndex, RefRewriteSink};
pub use operations::indexing::{ExclusionRules, IndexWalker};
pub use operations::transfer::{TransferEngine, TransferOutcome, TransferProgress};
pub use provider::{NativeMove, ProviderError, StorageProvider};
pub use shared::types::{DocumentKind, DocumentRef};
