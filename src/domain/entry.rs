//! Flat index records

use crate::shared::types::DocumentRef;
use serde::{Deserialize, Serialize};

/// One node of the indexed tree, flattened.
///
/// `parent_id` is the id of the parent ref. In any published generation every
/// entry's parent resolves to another entry of that generation or to the
/// generation's root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
	pub document: DocumentRef,
	pub name: String,
	pub is_directory: bool,
	pub parent_id: String,
}

impl IndexEntry {
	pub fn new(document: DocumentRef, parent: &DocumentRef) -> Self {
		Self {
			name: document.name().to_string(),
			is_directory: document.is_directory(),
			parent_id: parent.id().to_string(),
			document,
		}
	}

	pub fn id(&self) -> &str {
		self.document.id()
	}
}
