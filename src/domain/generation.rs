//! Immutable index generations
//!
//! A generation is one snapshot of the flat entry table. Writers never mutate
//! a published generation; they derive a new one and swap the shared pointer,
//! so readers always see a complete table. The parent→children multimap is
//! built lazily on first query and shared for the lifetime of the generation.

use crate::domain::entry::IndexEntry;
use crate::shared::types::DocumentRef;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Lazily derived lookup structures for one generation
struct QueryCache {
	/// entry id -> index into `entries`
	by_id: HashMap<String, usize>,
	/// parent id -> indices of children, pre-sorted for presentation
	by_parent: HashMap<String, Vec<usize>>,
}

/// One immutable snapshot of the flat index
pub struct IndexGeneration {
	root: DocumentRef,
	entries: Vec<IndexEntry>,
	cache: OnceLock<QueryCache>,
}

impl IndexGeneration {
	pub fn new(root: DocumentRef, entries: Vec<IndexEntry>) -> Self {
		Self {
			root,
			entries,
			cache: OnceLock::new(),
		}
	}

	/// The root this generation was built from. The root itself is not an
	/// entry; top-level entries carry its id as their parent.
	pub fn root(&self) -> &DocumentRef {
		&self.root
	}

	pub fn entries(&self) -> &[IndexEntry] {
		&self.entries
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Look up an entry by ref id
	pub fn get(&self, id: &str) -> Option<&IndexEntry> {
		self.cache().by_id.get(id).map(|&i| &self.entries[i])
	}

	pub fn contains(&self, id: &str) -> bool {
		self.cache().by_id.contains_key(id)
	}

	/// Direct children of `parent`, in presentation order: directories before
	/// files, each group case-insensitively sorted by name. Pure in-memory
	/// lookup; O(children) once the multimap exists.
	pub fn children_of(&self, parent: &DocumentRef) -> Vec<&IndexEntry> {
		match self.cache().by_parent.get(parent.id()) {
			Some(indices) => indices.iter().map(|&i| &self.entries[i]).collect(),
			None => Vec::new(),
		}
	}

	/// Entries whose parent resolves to neither the root nor another entry.
	///
	/// A published generation must never contain any; a non-empty result
	/// means a patch went wrong and the caller should force a full rescan.
	pub fn orphans(&self) -> Vec<&IndexEntry> {
		let cache = self.cache();
		self.entries
			.iter()
			.filter(|e| e.parent_id != self.root.id() && !cache.by_id.contains_key(&e.parent_id))
			.collect()
	}

	fn cache(&self) -> &QueryCache {
		self.cache.get_or_init(|| {
			let mut by_id = HashMap::with_capacity(self.entries.len());
			let mut by_parent: HashMap<String, Vec<usize>> = HashMap::new();

			for (i, entry) in self.entries.iter().enumerate() {
				by_id.insert(entry.id().to_string(), i);
				by_parent.entry(entry.parent_id.clone()).or_default().push(i);
			}

			// Presentation ordering is fixed per generation: directories
			// first, then case-insensitive name order within each group.
			for indices in by_parent.values_mut() {
				indices.sort_by(|&a, &b| {
					let ea = &self.entries[a];
					let eb = &self.entries[b];
					eb.is_directory
						.cmp(&ea.is_directory)
						.then_with(|| ea.name.to_lowercase().cmp(&eb.name.to_lowercase()))
				});
			}

			QueryCache { by_id, by_parent }
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn dir(id: &str, name: &str, parent: &DocumentRef) -> IndexEntry {
		IndexEntry::new(DocumentRef::directory(id, name), parent)
	}

	fn leaf(id: &str, name: &str, parent: &DocumentRef) -> IndexEntry {
		IndexEntry::new(DocumentRef::leaf(id, name), parent)
	}

	fn root() -> DocumentRef {
		DocumentRef::directory("root", "Music")
	}

	#[test]
	fn children_are_ordered_dirs_first_case_insensitive() {
		let root = root();
		let gen = IndexGeneration::new(
			root.clone(),
			vec![
				leaf("l1", "zebra.mp3", &root),
				dir("d1", "beta", &root),
				leaf("l2", "Alpha.mp3", &root),
				dir("d2", "Acoustic", &root),
			],
		);

		let names: Vec<&str> = gen
			.children_of(&root)
			.iter()
			.map(|e| e.name.as_str())
			.collect();
		assert_eq!(names, vec!["Acoustic", "beta", "Alpha.mp3", "zebra.mp3"]);
	}

	#[test]
	fn children_of_unknown_parent_is_empty() {
		let root = root();
		let gen = IndexGeneration::new(root.clone(), vec![leaf("l1", "a.mp3", &root)]);
		let other = DocumentRef::directory("elsewhere", "Elsewhere");
		assert!(gen.children_of(&other).is_empty());
	}

	#[test]
	fn orphan_detection() {
		let root = root();
		let d = DocumentRef::directory("d1", "Albums");
		let gen = IndexGeneration::new(
			root.clone(),
			vec![
				dir("d1", "Albums", &root),
				leaf("l1", "ok.mp3", &d),
				leaf("l2", "lost.mp3", &DocumentRef::directory("gone", "Gone")),
			],
		);

		let orphans = gen.orphans();
		assert_eq!(orphans.len(), 1);
		assert_eq!(orphans[0].id(), "l2");
	}

	#[test]
	fn get_and_contains() {
		let root = root();
		let gen = IndexGeneration::new(root.clone(), vec![leaf("l1", "a.mp3", &root)]);
		assert!(gen.contains("l1"));
		assert_eq!(gen.get("l1").map(|e| e.name.as_str()), Some("a.mp3"));
		assert!(gen.get("nope").is_none());
	}
}
