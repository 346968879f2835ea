//! Storage provider abstraction
//!
//! The external tree is permission-gated and only partially under our
//! control: entries can vanish, be renamed by other actors, or refuse
//! operations outright. Everything the engine does against storage goes
//! through [`StorageProvider`]; the adapters behind it are the only code
//! allowed to interpret the internals of a [`DocumentRef`] id.

pub mod local;

use crate::shared::types::DocumentRef;
use async_trait::async_trait;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};

pub use local::LocalFsProvider;

/// Storage provider errors
#[derive(Error, Debug)]
pub enum ProviderError {
	/// The ref no longer resolves to anything
	#[error("Document not found: {0}")]
	NotFound(String),

	/// Permission to the subtree was revoked or never granted
	#[error("Permission denied: {0}")]
	PermissionDenied(String),

	/// A directory operation was attempted on a leaf
	#[error("Not a directory: {0}")]
	NotADirectory(String),

	/// A leaf operation was attempted on a directory
	#[error("Not a leaf: {0}")]
	NotALeaf(String),

	/// The ref could not be interpreted by this provider
	#[error("Invalid document ref: {0}")]
	InvalidRef(String),

	/// IO error
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Outcome of a native move attempt.
///
/// Providers that cannot relocate a document atomically report
/// `Unsupported`, and the transfer engine falls through to the streamed
/// copy-then-delete path.
#[derive(Debug, Clone)]
pub enum NativeMove {
	/// The provider relocated the document without copying bytes. The
	/// returned ref may differ from the source ref.
	Moved(DocumentRef),
	/// No tree-level move primitive for this source/destination pair
	Unsupported,
}

/// Async interface to the external document tree.
///
/// All calls are blocking IO from the engine's point of view and run on the
/// caller's async runtime; nothing here assumes a UI thread.
#[async_trait]
pub trait StorageProvider: Send + Sync {
	/// List the direct children of a directory
	async fn list_children(&self, dir: &DocumentRef) -> ProviderResult<Vec<DocumentRef>>;

	/// Byte length of a leaf, if the provider can cheaply report it
	async fn len(&self, leaf: &DocumentRef) -> ProviderResult<Option<u64>>;

	/// Open a leaf for reading
	async fn open_read(
		&self,
		leaf: &DocumentRef,
	) -> ProviderResult<Box<dyn AsyncRead + Send + Unpin>>;

	/// Create an empty leaf under `parent` with the declared content type.
	/// Fails if the name is already taken.
	async fn create_leaf(
		&self,
		parent: &DocumentRef,
		name: &str,
		content_type: &str,
	) -> ProviderResult<DocumentRef>;

	/// Open an existing leaf for writing, truncating it
	async fn open_write(
		&self,
		leaf: &DocumentRef,
	) -> ProviderResult<Box<dyn AsyncWrite + Send + Unpin>>;

	/// Delete a document. Directories are deleted with their contents.
	async fn delete(&self, target: &DocumentRef) -> ProviderResult<()>;

	/// Rename a document in place.
	///
	/// Returns the post-rename ref when the provider knows it; `None` means
	/// the rename took effect but no usable ref came back, and the caller
	/// must re-resolve it.
	async fn rename(&self, target: &DocumentRef, new_name: &str)
		-> ProviderResult<Option<DocumentRef>>;

	/// Attempt an atomic tree-level move of `source` from `source_parent`
	/// into `dest_parent`. O(1) regardless of size when supported.
	async fn native_move(
		&self,
		source: &DocumentRef,
		source_parent: &DocumentRef,
		dest_parent: &DocumentRef,
	) -> ProviderResult<NativeMove>;

	/// Whether the granted root handle is still usable
	async fn is_root_valid(&self, root: &DocumentRef) -> bool;
}
