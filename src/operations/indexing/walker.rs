//! Full-tree crawler

use super::filters::ExclusionRules;
use crate::domain::entry::IndexEntry;
use crate::file_type::FileCategory;
use crate::library::error::{IndexError, Result};
use crate::provider::StorageProvider;
use crate::shared::types::DocumentRef;
use std::sync::Arc;
use tracing::{debug, warn};

/// Performs the one full recursive walk an index generation is built from
pub struct IndexWalker {
	provider: Arc<dyn StorageProvider>,
	rules: ExclusionRules,
}

impl IndexWalker {
	pub fn new(provider: Arc<dyn StorageProvider>, rules: ExclusionRules) -> Self {
		Self { provider, rules }
	}

	/// Walk the whole tree under `root` and return the flat entry list.
	///
	/// Excluded directories are indexed but not descended into. Leaves
	/// outside the content allow-list are omitted. A listing failure on an
	/// individual subtree is logged and the subtree treated as empty, so one
	/// bad node never aborts the scan. Idempotent for a static tree.
	pub async fn build_full_index(&self, root: &DocumentRef) -> Result<Vec<IndexEntry>> {
		if !root.is_directory() {
			return Err(IndexError::RootNotADirectory(root.id().to_string()));
		}

		let mut entries = Vec::new();
		let mut stack = vec![root.clone()];

		while let Some(dir) = stack.pop() {
			let children = match self.provider.list_children(&dir).await {
				Ok(children) => children,
				Err(e) => {
					// Subtree listing failure is local: skip it, keep walking
					warn!(dir = %dir, error = %e, "failed to list directory, skipping subtree");
					continue;
				}
			};

			for child in children {
				if child.is_directory() {
					let excluded = self.rules.is_excluded(child.name());
					if !excluded {
						stack.push(child.clone());
					}
					entries.push(IndexEntry::new(child, &dir));
				} else if FileCategory::of(child.name()).is_indexed() {
					entries.push(IndexEntry::new(child, &dir));
				}
			}
		}

		debug!(root = %root, count = entries.len(), "full index walk complete");
		Ok(entries)
	}
}
