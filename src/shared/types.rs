//! Shared value types for addressing documents in the external tree

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Whether a document is a directory or a leaf (file). Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
	Directory,
	Leaf,
}

/// Opaque handle to a node in the external storage tree.
///
/// The `id` is a provider-specific identity string; only the storage provider
/// adapter may interpret its internal structure. Two refs are equal iff their
/// ids match. Refs are value types copied freely, and they are NOT stable
/// across mutation: a provider is allowed to hand back a brand-new ref after
/// a rename or move, at which point the old ref is dangling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRef {
	id: String,
	name: String,
	kind: DocumentKind,
}

impl DocumentRef {
	/// Create a directory-typed ref
	pub fn directory(id: impl Into<String>, name: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			name: name.into(),
			kind: DocumentKind::Directory,
		}
	}

	/// Create a leaf-typed ref
	pub fn leaf(id: impl Into<String>, name: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			name: name.into(),
			kind: DocumentKind::Leaf,
		}
	}

	/// Provider identity string. Opaque outside the provider adapter.
	pub fn id(&self) -> &str {
		&self.id
	}

	/// Human-readable display name
	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn kind(&self) -> DocumentKind {
		self.kind
	}

	pub fn is_directory(&self) -> bool {
		self.kind == DocumentKind::Directory
	}

	/// Same identity, new display name. Used when patching the index after a
	/// rename where the provider preserved the ref.
	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = name.into();
		self
	}
}

impl PartialEq for DocumentRef {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}

impl Eq for DocumentRef {}

impl Hash for DocumentRef {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id.hash(state);
	}
}

impl fmt::Display for DocumentRef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} ({})", self.name, self.id)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashSet;

	#[test]
	fn equality_is_identity_only() {
		let a = DocumentRef::leaf("doc:1", "song.mp3");
		let b = DocumentRef::leaf("doc:1", "renamed.mp3");
		let c = DocumentRef::leaf("doc:2", "song.mp3");

		assert_eq!(a, b);
		assert_ne!(a, c);

		let mut set = HashSet::new();
		set.insert(a);
		assert!(set.contains(&b));
		assert!(!set.contains(&c));
	}

	#[test]
	fn kind_is_fixed_at_creation() {
		let dir = DocumentRef::directory("doc:3", "Albums");
		assert!(dir.is_directory());
		assert_eq!(dir.kind(), DocumentKind::Directory);

		let renamed = dir.with_name("Singles");
		assert!(renamed.is_directory());
		assert_eq!(renamed.id(), "doc:3");
		assert_eq!(renamed.name(), "Singles");
	}
}
