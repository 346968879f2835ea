//! Shared test doubles for the integration suites
#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use soundvault_core::provider::{
	LocalFsProvider, NativeMove, ProviderError, ProviderResult, StorageProvider,
};
use soundvault_core::{DocumentRef, RefRewriteSink};
use std::io;
use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, ReadBuf};

/// Create a file with content, creating parents as needed
pub async fn write_file(path: &Path, content: &[u8]) {
	if let Some(parent) = path.parent() {
		tokio::fs::create_dir_all(parent).await.unwrap();
	}
	tokio::fs::write(path, content).await.unwrap();
}

/// How the shim answers native move requests
#[derive(Default, Clone, Copy, PartialEq)]
pub enum NativeMoveMode {
	#[default]
	Passthrough,
	Unsupported,
	Fail,
}

/// Misbehaviour knobs for [`ShimProvider`]
#[derive(Default)]
pub struct ShimBehavior {
	pub native_move: NativeMoveMode,
	pub rename_returns_none: bool,
	pub fail_create: bool,
	pub fail_read: bool,
	/// Serve only the first N bytes of any read, then EOF
	pub truncate_read_to: Option<u64>,
	/// Refuse to delete the document with this ref id
	pub fail_delete_of: Option<String>,
	/// Refuse to list the directory with this name, like a subtree whose
	/// grant was revoked
	pub fail_list_of: Option<String>,
}

/// Local provider wrapper that injects provider misbehaviour
pub struct ShimProvider {
	inner: LocalFsProvider,
	behavior: ShimBehavior,
}

impl ShimProvider {
	pub fn new(root: impl Into<std::path::PathBuf>, behavior: ShimBehavior) -> Self {
		Self {
			inner: LocalFsProvider::new(root),
			behavior,
		}
	}

	pub fn root_ref(&self) -> DocumentRef {
		self.inner.root_ref()
	}
}

#[async_trait]
impl StorageProvider for ShimProvider {
	async fn list_children(&self, dir: &DocumentRef) -> ProviderResult<Vec<DocumentRef>> {
		if self.behavior.fail_list_of.as_deref() == Some(dir.name()) {
			return Err(ProviderError::PermissionDenied(dir.id().to_string()));
		}
		self.inner.list_children(dir).await
	}

	async fn len(&self, leaf: &DocumentRef) -> ProviderResult<Option<u64>> {
		self.inner.len(leaf).await
	}

	async fn open_read(
		&self,
		leaf: &DocumentRef,
	) -> ProviderResult<Box<dyn AsyncRead + Send + Unpin>> {
		if self.behavior.fail_read {
			return Ok(Box::new(ErrorReader));
		}
		let reader = self.inner.open_read(leaf).await?;
		if let Some(limit) = self.behavior.truncate_read_to {
			return Ok(Box::new(reader.take(limit)));
		}
		Ok(reader)
	}

	async fn create_leaf(
		&self,
		parent: &DocumentRef,
		name: &str,
		content_type: &str,
	) -> ProviderResult<DocumentRef> {
		if self.behavior.fail_create {
			return Err(ProviderError::PermissionDenied(parent.id().to_string()));
		}
		self.inner.create_leaf(parent, name, content_type).await
	}

	async fn open_write(
		&self,
		leaf: &DocumentRef,
	) -> ProviderResult<Box<dyn AsyncWrite + Send + Unpin>> {
		self.inner.open_write(leaf).await
	}

	async fn delete(&self, target: &DocumentRef) -> ProviderResult<()> {
		if self.behavior.fail_delete_of.as_deref() == Some(target.id()) {
			return Err(ProviderError::PermissionDenied(target.id().to_string()));
		}
		self.inner.delete(target).await
	}

	async fn rename(
		&self,
		target: &DocumentRef,
		new_name: &str,
	) -> ProviderResult<Option<DocumentRef>> {
		let renamed = self.inner.rename(target, new_name).await?;
		if self.behavior.rename_returns_none {
			return Ok(None);
		}
		Ok(renamed)
	}

	async fn native_move(
		&self,
		source: &DocumentRef,
		source_parent: &DocumentRef,
		dest_parent: &DocumentRef,
	) -> ProviderResult<NativeMove> {
		match self.behavior.native_move {
			NativeMoveMode::Passthrough => {
				self.inner.native_move(source, source_parent, dest_parent).await
			}
			NativeMoveMode::Unsupported => Ok(NativeMove::Unsupported),
			NativeMoveMode::Fail => Err(ProviderError::PermissionDenied(
				source.id().to_string(),
			)),
		}
	}

	async fn is_root_valid(&self, root: &DocumentRef) -> bool {
		self.inner.is_root_valid(root).await
	}
}

/// Reader that fails on the first poll, like a mid-stream permission loss
struct ErrorReader;

impl AsyncRead for ErrorReader {
	fn poll_read(
		self: Pin<&mut Self>,
		_cx: &mut Context<'_>,
		_buf: &mut ReadBuf<'_>,
	) -> Poll<io::Result<()>> {
		Poll::Ready(Err(io::Error::new(
			io::ErrorKind::PermissionDenied,
			"storage permission revoked",
		)))
	}
}

/// Playlist-like collaborator holding stringified refs
#[derive(Default)]
pub struct PlaylistStore {
	pub refs: Mutex<Vec<String>>,
	pub cleared: Mutex<Vec<String>>,
}

impl PlaylistStore {
	pub fn with_refs<I, S>(refs: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self {
			refs: Mutex::new(refs.into_iter().map(Into::into).collect()),
			cleared: Mutex::new(Vec::new()),
		}
	}

	pub fn refs(&self) -> Vec<String> {
		self.refs.lock().clone()
	}

	pub fn cleared(&self) -> Vec<String> {
		self.cleared.lock().clone()
	}
}

impl RefRewriteSink for PlaylistStore {
	fn replace_ref_everywhere(&self, old_id: &str, new_id: &str) {
		for stored in self.refs.lock().iter_mut() {
			if stored == old_id {
				*stored = new_id.to_string();
			}
		}
	}

	fn clear_custom_name_everywhere(&self, id: &str) {
		self.cleared.lock().push(id.to_string());
	}
}

/// Find a child ref by name, panicking when absent
pub async fn child_named(
	provider: &dyn StorageProvider,
	dir: &DocumentRef,
	name: &str,
) -> DocumentRef {
	provider
		.list_children(dir)
		.await
		.unwrap()
		.into_iter()
		.find(|c| c.name() == name)
		.unwrap_or_else(|| panic!("no child named {name}"))
}
