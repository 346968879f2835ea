//! Event bus for index change notifications

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

/// Index lifecycle events
#[derive(Debug, Clone)]
pub enum LibraryEvent {
	/// A full generation was published (rescan or restore)
	IndexRebuilt {
		root_id: String,
		entry_count: usize,
		at: DateTime<Utc>,
	},

	/// An entry was moved to a new parent
	EntryMoved {
		old_id: String,
		new_id: String,
		dest_parent_id: String,
	},

	/// An entry was renamed
	EntryRenamed {
		old_id: String,
		new_id: String,
		new_name: String,
	},

	/// An entry (and any descendants) was deleted
	EntryDeleted { id: String },
}

/// Broadcast bus for library events
pub struct EventBus {
	sender: broadcast::Sender<LibraryEvent>,
}

impl EventBus {
	/// Create a new event bus with specified capacity
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	/// Emit an event to all subscribers. Dropped silently when nobody
	/// listens.
	pub fn emit(&self, event: LibraryEvent) {
		let _ = self.sender.send(event);
	}

	/// Subscribe to events
	pub fn subscribe(&self) -> broadcast::Receiver<LibraryEvent> {
		self.sender.subscribe()
	}
}

impl Default for EventBus {
	fn default() -> Self {
		Self::new(64)
	}
}
