//! Tree crawling
//!
//! One full recursive walk of the external tree produces the flat entry list
//! a generation is built from. Repeated navigation is then served from the
//! index; the tree is not walked again until the next forced rescan.

pub mod filters;
pub mod walker;

pub use filters::ExclusionRules;
pub use walker::IndexWalker;
