//! Local filesystem adapter
//!
//! Desktop backend and test double: maps refs onto paths under a granted
//! root directory. The ref id is the absolute path string; this module is
//! the only place that parses it back.

use super::{NativeMove, ProviderError, ProviderResult, StorageProvider};
use crate::shared::types::DocumentRef;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::debug;

pub struct LocalFsProvider {
	root: PathBuf,
}

impl LocalFsProvider {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	/// Directory ref for the granted root
	pub fn root_ref(&self) -> DocumentRef {
		let name = self
			.root
			.file_name()
			.map(|n| n.to_string_lossy().into_owned())
			.unwrap_or_else(|| self.root.to_string_lossy().into_owned());
		DocumentRef::directory(self.root.to_string_lossy().into_owned(), name)
	}

	fn path_of(&self, target: &DocumentRef) -> ProviderResult<PathBuf> {
		let path = PathBuf::from(target.id());
		if !path.starts_with(&self.root) {
			return Err(ProviderError::InvalidRef(target.id().to_string()));
		}
		Ok(path)
	}

	fn ref_for(path: &Path, is_dir: bool) -> DocumentRef {
		let id = path.to_string_lossy().into_owned();
		let name = path
			.file_name()
			.map(|n| n.to_string_lossy().into_owned())
			.unwrap_or_default();
		if is_dir {
			DocumentRef::directory(id, name)
		} else {
			DocumentRef::leaf(id, name)
		}
	}
}

#[async_trait]
impl StorageProvider for LocalFsProvider {
	async fn list_children(&self, dir: &DocumentRef) -> ProviderResult<Vec<DocumentRef>> {
		if !dir.is_directory() {
			return Err(ProviderError::NotADirectory(dir.id().to_string()));
		}
		let path = self.path_of(dir)?;

		let mut children = Vec::new();
		let mut read_dir = fs::read_dir(&path).await?;
		while let Some(entry) = read_dir.next_entry().await? {
			let file_type = entry.file_type().await?;
			children.push(Self::ref_for(&entry.path(), file_type.is_dir()));
		}
		Ok(children)
	}

	async fn len(&self, leaf: &DocumentRef) -> ProviderResult<Option<u64>> {
		let path = self.path_of(leaf)?;
		let metadata = fs::metadata(&path).await?;
		Ok(Some(metadata.len()))
	}

	async fn open_read(
		&self,
		leaf: &DocumentRef,
	) -> ProviderResult<Box<dyn AsyncRead + Send + Unpin>> {
		if leaf.is_directory() {
			return Err(ProviderError::NotALeaf(leaf.id().to_string()));
		}
		let path = self.path_of(leaf)?;
		let file = fs::File::open(&path).await?;
		Ok(Box::new(file))
	}

	async fn create_leaf(
		&self,
		parent: &DocumentRef,
		name: &str,
		_content_type: &str,
	) -> ProviderResult<DocumentRef> {
		if !parent.is_directory() {
			return Err(ProviderError::NotADirectory(parent.id().to_string()));
		}
		let path = self.path_of(parent)?.join(name);

		// create_new so an existing document is never clobbered
		let file = OpenOptions::new()
			.write(true)
			.create_new(true)
			.open(&path)
			.await?;
		drop(file);

		Ok(Self::ref_for(&path, false))
	}

	async fn open_write(
		&self,
		leaf: &DocumentRef,
	) -> ProviderResult<Box<dyn AsyncWrite + Send + Unpin>> {
		if leaf.is_directory() {
			return Err(ProviderError::NotALeaf(leaf.id().to_string()));
		}
		let path = self.path_of(leaf)?;
		let file = OpenOptions::new().write(true).truncate(true).open(&path).await?;
		Ok(Box::new(file))
	}

	async fn delete(&self, target: &DocumentRef) -> ProviderResult<()> {
		let path = self.path_of(target)?;
		if target.is_directory() {
			fs::remove_dir_all(&path).await?;
		} else {
			fs::remove_file(&path).await?;
		}
		Ok(())
	}

	async fn rename(
		&self,
		target: &DocumentRef,
		new_name: &str,
	) -> ProviderResult<Option<DocumentRef>> {
		let path = self.path_of(target)?;
		let Some(parent) = path.parent() else {
			return Err(ProviderError::InvalidRef(target.id().to_string()));
		};
		let new_path = parent.join(new_name);

		fs::rename(&path, &new_path).await?;
		debug!(from = %path.display(), to = %new_path.display(), "renamed document");

		// The path-based identity changes, so the old ref is now dangling.
		Ok(Some(Self::ref_for(&new_path, target.is_directory())))
	}

	async fn native_move(
		&self,
		source: &DocumentRef,
		_source_parent: &DocumentRef,
		dest_parent: &DocumentRef,
	) -> ProviderResult<NativeMove> {
		let source_path = self.path_of(source)?;
		let dest_path = self.path_of(dest_parent)?.join(source.name());

		// Same-volume rename is atomic; a cross-device move errors out here
		// and the engine falls back to the streamed copy.
		fs::rename(&source_path, &dest_path).await?;
		debug!(from = %source_path.display(), to = %dest_path.display(), "native move");

		Ok(NativeMove::Moved(Self::ref_for(
			&dest_path,
			source.is_directory(),
		)))
	}

	async fn is_root_valid(&self, root: &DocumentRef) -> bool {
		match self.path_of(root) {
			Ok(path) => fs::metadata(&path)
				.await
				.map(|m| m.is_dir())
				.unwrap_or(false),
			Err(_) => false,
		}
	}
}
