//! Index persistence collaborator
//!
//! The engine only needs "durable across process restarts"; the format
//! behind the trait is the collaborator's business. The JSON file
//! implementation below is the default desktop backend.

use crate::domain::entry::IndexEntry;
use crate::shared::types::DocumentRef;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;
use tokio::fs;
use tracing::warn;

/// Persistence errors
#[derive(Error, Debug)]
pub enum PersistenceError {
	/// IO error
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	/// Serialization error
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

/// Durable storage for the flat index
#[async_trait]
pub trait IndexPersistence: Send + Sync {
	async fn save(
		&self,
		root: &DocumentRef,
		entries: &[IndexEntry],
	) -> Result<(), PersistenceError>;

	async fn load(&self) -> Result<Option<(DocumentRef, Vec<IndexEntry>)>, PersistenceError>;

	async fn clear(&self) -> Result<(), PersistenceError>;
}

const FORMAT_VERSION: u32 = 1;

/// On-disk envelope for the persisted index
#[derive(Serialize, Deserialize)]
struct PersistedIndex {
	version: u32,
	generated_at: DateTime<Utc>,
	root: DocumentRef,
	entries: Vec<IndexEntry>,
}

/// JSON file persistence
pub struct JsonFilePersistence {
	path: PathBuf,
}

impl JsonFilePersistence {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}
}

#[async_trait]
impl IndexPersistence for JsonFilePersistence {
	async fn save(
		&self,
		root: &DocumentRef,
		entries: &[IndexEntry],
	) -> Result<(), PersistenceError> {
		let envelope = PersistedIndex {
			version: FORMAT_VERSION,
			generated_at: Utc::now(),
			root: root.clone(),
			entries: entries.to_vec(),
		};
		let data = serde_json::to_vec_pretty(&envelope)?;

		if let Some(parent) = self.path.parent() {
			fs::create_dir_all(parent).await?;
		}
		fs::write(&self.path, data).await?;
		Ok(())
	}

	async fn load(&self) -> Result<Option<(DocumentRef, Vec<IndexEntry>)>, PersistenceError> {
		let data = match fs::read(&self.path).await {
			Ok(data) => data,
			Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
			Err(e) => return Err(e.into()),
		};

		let envelope: PersistedIndex = serde_json::from_slice(&data)?;
		if envelope.version != FORMAT_VERSION {
			warn!(
				found = envelope.version,
				expected = FORMAT_VERSION,
				"persisted index has an unknown format version, ignoring it"
			);
			return Ok(None);
		}

		Ok(Some((envelope.root, envelope.entries)))
	}

	async fn clear(&self) -> Result<(), PersistenceError> {
		match fs::remove_file(&self.path).await {
			Ok(()) => Ok(()),
			Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
			Err(e) => Err(e.into()),
		}
	}
}
