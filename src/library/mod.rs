//! Library index manager
//!
//! Owns the published generation, funnels every structural mutation through
//! a single writer, patches the index after transfers, and propagates ref
//! changes to external reference holders.

pub mod error;
pub mod events;
pub mod persistence;

use crate::domain::entry::IndexEntry;
use crate::domain::generation::IndexGeneration;
use crate::operations::indexing::{ExclusionRules, IndexWalker};
use crate::operations::transfer::TransferOutcome;
use crate::provider::StorageProvider;
use crate::shared::types::DocumentRef;
use chrono::Utc;
use error::{IndexError, Result};
use parking_lot::RwLock;
use persistence::IndexPersistence;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

pub use events::{EventBus, LibraryEvent};

/// External holder of stringified refs (e.g. a saved playlist store).
///
/// Stale string refs have no self-healing path, so the sweep after every
/// ref-changing mutation is mandatory.
pub trait RefRewriteSink: Send + Sync {
	/// Replace every stored occurrence of `old_id` with `new_id`
	fn replace_ref_everywhere(&self, old_id: &str, new_id: &str);

	/// Drop any per-ref display-name customization for `id`
	fn clear_custom_name_everywhere(&self, id: &str);
}

/// The index engine's mutable heart.
///
/// Readers take lock-free snapshots of an immutable generation; writers are
/// serialized through one async mutex and publish a complete new generation
/// with an atomic pointer swap. Readers never observe a half-updated table.
pub struct LibraryIndex {
	provider: Arc<dyn StorageProvider>,
	walker: IndexWalker,
	persistence: Arc<dyn IndexPersistence>,
	events: EventBus,
	sinks: RwLock<Vec<Arc<dyn RefRewriteSink>>>,
	current: RwLock<Option<Arc<IndexGeneration>>>,
	/// Single-writer discipline: held across every structural mutation
	writer: Mutex<()>,
}

impl LibraryIndex {
	pub fn new(
		provider: Arc<dyn StorageProvider>,
		rules: ExclusionRules,
		persistence: Arc<dyn IndexPersistence>,
	) -> Self {
		Self {
			walker: IndexWalker::new(provider.clone(), rules),
			provider,
			persistence,
			events: EventBus::default(),
			sinks: RwLock::new(Vec::new()),
			current: RwLock::new(None),
			writer: Mutex::new(()),
		}
	}

	pub fn events(&self) -> &EventBus {
		&self.events
	}

	/// Register an external reference holder for ref-rewrite sweeps
	pub fn register_rewrite_sink(&self, sink: Arc<dyn RefRewriteSink>) {
		self.sinks.write().push(sink);
	}

	/// Current generation, if any scan or restore has completed
	pub fn snapshot(&self) -> Option<Arc<IndexGeneration>> {
		self.current.read().clone()
	}

	/// Walk the whole tree and publish a fresh generation
	pub async fn rescan(&self, root: &DocumentRef) -> Result<Arc<IndexGeneration>> {
		let _writer = self.writer.lock().await;
		self.rescan_locked(root).await
	}

	async fn rescan_locked(&self, root: &DocumentRef) -> Result<Arc<IndexGeneration>> {
		if !self.provider.is_root_valid(root).await {
			return Err(IndexError::RootInvalid(root.id().to_string()));
		}

		let entries = self.walker.build_full_index(root).await?;
		let generation = Arc::new(IndexGeneration::new(root.clone(), entries));

		self.persist(&generation).await;
		*self.current.write() = Some(generation.clone());

		info!(root = %root, entries = generation.len(), "index rebuilt");
		self.events.emit(LibraryEvent::IndexRebuilt {
			root_id: root.id().to_string(),
			entry_count: generation.len(),
			at: Utc::now(),
		});
		Ok(generation)
	}

	/// Publish the persisted index from a previous run, if one exists
	pub async fn restore(&self) -> Result<Option<Arc<IndexGeneration>>> {
		let _writer = self.writer.lock().await;

		let Some((root, entries)) = self.persistence.load().await? else {
			return Ok(None);
		};
		let generation = Arc::new(IndexGeneration::new(root, entries));
		*self.current.write() = Some(generation.clone());

		info!(root = %generation.root(), entries = generation.len(), "index restored");
		self.events.emit(LibraryEvent::IndexRebuilt {
			root_id: generation.root().id().to_string(),
			entry_count: generation.len(),
			at: Utc::now(),
		});
		Ok(Some(generation))
	}

	/// Drop the published generation and its persisted copy, e.g. after the
	/// root grant was revoked
	pub async fn clear(&self) -> Result<()> {
		let _writer = self.writer.lock().await;
		self.persistence.clear().await?;
		*self.current.write() = None;
		Ok(())
	}

	/// Patch the index after a successful move.
	///
	/// Removes the entry keyed by the old ref and inserts one under the
	/// destination parent, keyed by the outcome's new ref when the provider
	/// handed one back. Moves are file-granularity.
	pub async fn apply_move(
		&self,
		old_ref: &DocumentRef,
		outcome: &TransferOutcome,
		dest_parent: &DocumentRef,
	) -> Result<()> {
		if !outcome.ok {
			debug!(old = %old_ref, "move failed, index unchanged");
			return Ok(());
		}

		let _writer = self.writer.lock().await;
		let Some(generation) = self.snapshot() else {
			warn!(old = %old_ref, "move patch requested with no published generation");
			return Ok(());
		};

		let new_ref = outcome.new_ref.clone().unwrap_or_else(|| old_ref.clone());
		let mut entries = generation.entries().to_vec();

		let name = match entries.iter().position(|e| e.id() == old_ref.id()) {
			Some(i) => entries.remove(i).name,
			None => old_ref.name().to_string(),
		};

		entries.push(IndexEntry {
			document: new_ref.clone(),
			name,
			is_directory: false,
			parent_id: dest_parent.id().to_string(),
		});

		self.publish_patched(generation.root().clone(), entries)
			.await?;

		if new_ref.id() != old_ref.id() {
			self.sweep_replace(old_ref.id(), new_ref.id());
		}
		self.events.emit(LibraryEvent::EntryMoved {
			old_id: old_ref.id().to_string(),
			new_id: new_ref.id().to_string(),
			dest_parent_id: dest_parent.id().to_string(),
		});
		Ok(())
	}

	/// Patch the index after a successful rename. Parent unchanged; the
	/// children of a renamed directory follow the new ref id.
	pub async fn apply_rename(
		&self,
		old_ref: &DocumentRef,
		new_ref: &DocumentRef,
		new_name: &str,
	) -> Result<()> {
		let _writer = self.writer.lock().await;
		let Some(generation) = self.snapshot() else {
			warn!(old = %old_ref, "rename patch requested with no published generation");
			return Ok(());
		};

		let mut entries = generation.entries().to_vec();
		match entries.iter_mut().find(|e| e.id() == old_ref.id()) {
			Some(entry) => {
				entry.document = new_ref.clone().with_name(new_name);
				entry.name = new_name.to_string();
			}
			None => warn!(old = %old_ref, "renamed entry not present in index"),
		}

		if new_ref.id() != old_ref.id() {
			for entry in entries.iter_mut() {
				if entry.parent_id == old_ref.id() {
					entry.parent_id = new_ref.id().to_string();
				}
			}
		}

		self.publish_patched(generation.root().clone(), entries)
			.await?;

		if new_ref.id() != old_ref.id() {
			self.sweep_replace(old_ref.id(), new_ref.id());
		}
		self.events.emit(LibraryEvent::EntryRenamed {
			old_id: old_ref.id().to_string(),
			new_id: new_ref.id().to_string(),
			new_name: new_name.to_string(),
		});
		Ok(())
	}

	/// Patch the index after a successful delete. The deleted entry's
	/// subtree goes with it. There is no successor ref, so no rewrite sweep
	/// runs; only the custom-name cleanup hook fires.
	pub async fn apply_delete(&self, target: &DocumentRef) -> Result<()> {
		let _writer = self.writer.lock().await;
		let Some(generation) = self.snapshot() else {
			warn!(target = %target, "delete patch requested with no published generation");
			return Ok(());
		};

		let mut removed: HashSet<String> = HashSet::new();
		removed.insert(target.id().to_string());

		// Entries are unordered, so grow the removal set to a fixpoint
		loop {
			let before = removed.len();
			for entry in generation.entries() {
				if removed.contains(&entry.parent_id) {
					removed.insert(entry.id().to_string());
				}
			}
			if removed.len() == before {
				break;
			}
		}

		let entries: Vec<IndexEntry> = generation
			.entries()
			.iter()
			.filter(|e| !removed.contains(e.id()))
			.cloned()
			.collect();

		self.publish_patched(generation.root().clone(), entries)
			.await?;

		let sinks: Vec<_> = self.sinks.read().clone();
		for id in &removed {
			for sink in &sinks {
				sink.clear_custom_name_everywhere(id);
			}
		}
		self.events.emit(LibraryEvent::EntryDeleted {
			id: target.id().to_string(),
		});
		Ok(())
	}

	/// Publish a patched entry list, falling back to a full rescan if the
	/// patch somehow broke the parent invariant. Must be called with the
	/// writer lock held.
	async fn publish_patched(
		&self,
		root: DocumentRef,
		entries: Vec<IndexEntry>,
	) -> Result<Arc<IndexGeneration>> {
		let generation = Arc::new(IndexGeneration::new(root.clone(), entries));

		let orphan_count = generation.orphans().len();
		if orphan_count > 0 {
			error!(
				root = %root,
				orphans = orphan_count,
				"index patch produced orphaned entries, forcing full rescan"
			);
			return self.rescan_locked(&root).await;
		}

		self.persist(&generation).await;
		*self.current.write() = Some(generation.clone());
		Ok(generation)
	}

	/// Save the generation; persistence failure degrades durability, not the
	/// in-memory index
	async fn persist(&self, generation: &IndexGeneration) {
		if let Err(e) = self
			.persistence
			.save(generation.root(), generation.entries())
			.await
		{
			warn!(error = %e, "index persistence save failed");
		}
	}

	fn sweep_replace(&self, old_id: &str, new_id: &str) {
		let sinks: Vec<_> = self.sinks.read().clone();
		debug!(old_id, new_id, sinks = sinks.len(), "ref-rewrite sweep");
		for sink in &sinks {
			sink.replace_ref_everywhere(old_id, new_id);
		}
	}
}
