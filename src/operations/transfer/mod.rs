//! Safe transfer operations against the storage provider
//!
//! Move prefers the provider's atomic native primitive and falls back to a
//! streamed copy-then-delete; rename handles providers that hand back a new
//! ref, the same ref, or no usable ref at all. All failure paths leave no
//! partially written destination behind, with one documented asymmetry: a
//! failed source delete after a verified copy reports failure even though a
//! duplicate now exists at the destination.

pub mod engine;
pub mod progress;

pub use engine::{TransferEngine, TransferOutcome};
pub use progress::TransferProgress;
