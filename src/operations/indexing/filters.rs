//! Directory exclusion rules
//!
//! Rules are evaluated on the directory name before descent. A matching
//! directory keeps its own index entry so the folder stays visible, but the
//! walker never recurses into it, so none of its descendants are indexed.
//! This bounds the walk and protects reserved subtrees owned by unrelated
//! features.

use globset::{Glob, GlobSet, GlobSetBuilder};

/// Name-based exclusion rules for the crawler
#[derive(Debug, Default)]
pub struct ExclusionRules {
	/// Reserved names, stored lowercase for case-insensitive matching
	reserved: Vec<String>,
	globs: Option<GlobSet>,
}

impl ExclusionRules {
	pub fn new() -> Self {
		Self::default()
	}

	/// Exclude directories whose name equals `name`, case-insensitively
	pub fn with_reserved_name(mut self, name: impl Into<String>) -> Self {
		self.reserved.push(name.into().to_lowercase());
		self
	}

	/// Exclude directories whose name matches any of the glob patterns
	pub fn with_globs<I, S>(mut self, patterns: I) -> Result<Self, globset::Error>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut builder = GlobSetBuilder::new();
		for pattern in patterns {
			builder.add(Glob::new(pattern.as_ref())?);
		}
		self.globs = Some(builder.build()?);
		Ok(self)
	}

	/// Whether a directory with this name is excluded from descent
	pub fn is_excluded(&self, name: &str) -> bool {
		if self.reserved.iter().any(|r| r == &name.to_lowercase()) {
			return true;
		}
		if let Some(globs) = &self.globs {
			if globs.is_match(name) {
				return true;
			}
		}
		false
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn reserved_name_is_case_insensitive() {
		let rules = ExclusionRules::new().with_reserved_name("DJ");
		assert!(rules.is_excluded("DJ"));
		assert!(rules.is_excluded("dj"));
		assert!(rules.is_excluded("Dj"));
		assert!(!rules.is_excluded("DJs"));
		assert!(!rules.is_excluded("Albums"));
	}

	#[test]
	fn glob_patterns_match_names() {
		let rules = ExclusionRules::new()
			.with_globs([".*", "*-trash"])
			.unwrap();
		assert!(rules.is_excluded(".thumbnails"));
		assert!(rules.is_excluded("old-trash"));
		assert!(!rules.is_excluded("Albums"));
	}

	#[test]
	fn empty_rules_exclude_nothing() {
		let rules = ExclusionRules::new();
		assert!(!rules.is_excluded("DJ"));
		assert!(!rules.is_excluded(".hidden"));
	}
}
