//! Index-specific error types

use crate::library::persistence::PersistenceError;
use crate::provider::ProviderError;
use thiserror::Error;

/// Index engine errors
#[derive(Error, Debug)]
pub enum IndexError {
	/// The scan root is not directory-typed
	#[error("Root is not a directory: {0}")]
	RootNotADirectory(String),

	/// The granted root handle is no longer usable
	#[error("Library root is no longer valid: {0}")]
	RootInvalid(String),

	/// Invalid exclusion rule pattern
	#[error("Invalid exclusion pattern: {0}")]
	Rule(#[from] globset::Error),

	/// Storage provider error
	#[error("Provider error: {0}")]
	Provider(#[from] ProviderError),

	/// Persistence collaborator error
	#[error("Persistence error: {0}")]
	Persistence(#[from] PersistenceError),
}

/// Result type for index operations
pub type Result<T> = std::result::Result<T, IndexError>;
