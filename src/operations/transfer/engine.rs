//! Move, rename, and delete against the storage provider

use super::progress::{ProgressThrottle, TransferProgress};
use crate::file_type::guess_mime;
use crate::provider::{NativeMove, ProviderError, StorageProvider};
use crate::shared::types::{DocumentKind, DocumentRef};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Streamed copy chunk size
const COPY_BUFFER_SIZE: usize = 256 * 1024;

/// Result of a move operation.
///
/// `ok == false` guarantees no partially written destination was left
/// behind, and that the source is untouched, unless the copy itself
/// completed and only the source delete failed, in which case a duplicate
/// remains at the destination. That asymmetry is reported as failure rather
/// than hidden, because index patching decides from `ok` whether to drop the
/// old entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferOutcome {
	pub ok: bool,
	pub new_ref: Option<DocumentRef>,
}

impl TransferOutcome {
	fn success(new_ref: DocumentRef) -> Self {
		Self {
			ok: true,
			new_ref: Some(new_ref),
		}
	}

	fn failure() -> Self {
		Self {
			ok: false,
			new_ref: None,
		}
	}
}

/// Executes transfers against the provider.
///
/// All operations are plain async calls; run them on a worker runtime and
/// marshal progress back to wherever it is consumed. Progress callbacks for
/// one transfer arrive with non-decreasing fractions and a final emission
/// that reports completion.
pub struct TransferEngine {
	provider: Arc<dyn StorageProvider>,
}

impl TransferEngine {
	pub fn new(provider: Arc<dyn StorageProvider>) -> Self {
		Self { provider }
	}

	/// Move a leaf from `source_parent` into `dest_parent`.
	///
	/// Attempts the provider's atomic native move first; when that is
	/// unsupported or fails, falls back to a streamed copy followed by a
	/// source delete.
	pub async fn move_document<F>(
		&self,
		source: &DocumentRef,
		source_parent: &DocumentRef,
		dest_parent: &DocumentRef,
		mut on_progress: F,
	) -> TransferOutcome
	where
		F: FnMut(TransferProgress) + Send,
	{
		let transfer_id = Uuid::new_v4();

		match self
			.provider
			.native_move(source, source_parent, dest_parent)
			.await
		{
			Ok(NativeMove::Moved(new_ref)) => {
				on_progress(TransferProgress {
					fraction: None,
					label: format!("Moving {}", source.name()),
				});
				on_progress(TransferProgress {
					fraction: Some(1.0),
					label: "Finalizing".to_string(),
				});
				info!(transfer = %transfer_id, source = %source, "native move complete");
				return TransferOutcome::success(new_ref);
			}
			Ok(NativeMove::Unsupported) => {
				debug!(transfer = %transfer_id, source = %source, "native move unsupported");
			}
			Err(e) => {
				warn!(
					transfer = %transfer_id,
					source = %source,
					error = %e,
					"native move failed, falling back to streamed copy"
				);
			}
		}

		self.streamed_move(transfer_id, source, dest_parent, &mut on_progress)
			.await
	}

	/// Streamed copy + verify + delete fallback
	async fn streamed_move<F>(
		&self,
		transfer_id: Uuid,
		source: &DocumentRef,
		dest_parent: &DocumentRef,
		on_progress: &mut F,
	) -> TransferOutcome
	where
		F: FnMut(TransferProgress) + Send,
	{
		// Length is optional; streaming works without it
		let total = self.provider.len(source).await.ok().flatten();

		let dest = match self
			.provider
			.create_leaf(dest_parent, source.name(), guess_mime(source.name()))
			.await
		{
			Ok(dest) => dest,
			Err(e) => {
				warn!(transfer = %transfer_id, source = %source, error = %e, "destination create failed");
				return TransferOutcome::failure();
			}
		};

		let mut throttle =
			ProgressThrottle::new(total, format!("Copying {}", source.name()));

		let copied = match self
			.copy_bytes(source, &dest, &mut throttle, on_progress)
			.await
		{
			Ok(copied) => copied,
			Err(e) => {
				warn!(transfer = %transfer_id, source = %source, error = %e, "streamed copy aborted");
				self.remove_partial(&dest).await;
				return TransferOutcome::failure();
			}
		};

		// A short stream means the source changed or the provider lied about
		// the length; the destination is not a faithful copy either way.
		if let Some(total) = total {
			if copied != total {
				warn!(
					transfer = %transfer_id,
					source = %source,
					copied,
					total,
					"stream ended short of the declared length"
				);
				self.remove_partial(&dest).await;
				return TransferOutcome::failure();
			}
		}

		on_progress(throttle.finish());

		if let Err(e) = self.provider.delete(source).await {
			// The copy is verified complete, so a duplicate now exists at
			// the destination. Reported as failure, not silent success: the
			// caller's index patch must not drop the still-present source.
			warn!(
				transfer = %transfer_id,
				source = %source,
				error = %e,
				"source delete failed after verified copy; duplicate remains at destination"
			);
			return TransferOutcome::failure();
		}

		info!(transfer = %transfer_id, source = %source, copied, "streamed move complete");
		TransferOutcome::success(dest)
	}

	async fn copy_bytes<F>(
		&self,
		source: &DocumentRef,
		dest: &DocumentRef,
		throttle: &mut ProgressThrottle,
		on_progress: &mut F,
	) -> Result<u64, ProviderError>
	where
		F: FnMut(TransferProgress) + Send,
	{
		let mut reader = self.provider.open_read(source).await?;
		let mut writer = self.provider.open_write(dest).await?;

		let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
		let mut copied = 0u64;

		loop {
			let n = reader.read(&mut buffer).await?;
			if n == 0 {
				break;
			}
			writer.write_all(&buffer[..n]).await?;
			copied += n as u64;

			if let Some(progress) = throttle.update(copied) {
				on_progress(progress);
			}
		}

		writer.flush().await?;
		writer.shutdown().await?;
		Ok(copied)
	}

	/// Best-effort removal of a half-written destination
	async fn remove_partial(&self, dest: &DocumentRef) {
		if let Err(e) = self.provider.delete(dest).await {
			warn!(dest = %dest, error = %e, "failed to remove partial destination");
		}
	}

	/// Rename a document in place.
	///
	/// Providers may return the same ref, a brand-new ref, or no usable ref;
	/// in the last case the new ref is resolved by re-listing the parent and
	/// matching the new name. Returns `None` when the provider call itself
	/// fails, or when a completed rename leaves the ref unresolvable; the
	/// caller must not assume the entry is unchanged on `None`.
	pub async fn rename(
		&self,
		target: &DocumentRef,
		parent: &DocumentRef,
		new_name: &str,
	) -> Option<DocumentRef> {
		match self.provider.rename(target, new_name).await {
			Ok(Some(new_ref)) => Some(new_ref),
			Ok(None) => {
				self.resolve_renamed(target, parent, new_name).await
			}
			Err(e) => {
				error!(target = %target, new_name, error = %e, "rename failed");
				None
			}
		}
	}

	/// Last-resort ref resolution after a rename that returned no ref.
	///
	/// Correct only while names are unique within a directory; on duplicates
	/// the first match wins.
	async fn resolve_renamed(
		&self,
		target: &DocumentRef,
		parent: &DocumentRef,
		new_name: &str,
	) -> Option<DocumentRef> {
		let children = match self.provider.list_children(parent).await {
			Ok(children) => children,
			Err(e) => {
				error!(
					target = %target,
					new_name,
					error = %e,
					"rename succeeded but parent re-listing failed; new ref unresolved"
				);
				return None;
			}
		};

		let mut matches = children
			.into_iter()
			.filter(|c| c.name() == new_name && matches_kind(c, target));

		let resolved = matches.next();
		match &resolved {
			Some(new_ref) => {
				if matches.next().is_some() {
					warn!(
						parent = %parent,
						new_name,
						"duplicate names in directory; rename resolution took the first match"
					);
				}
				debug!(target = %target, new_ref = %new_ref, "rename ref resolved by re-listing");
			}
			None => {
				error!(
					target = %target,
					new_name,
					"rename succeeded but no child matches the new name"
				);
			}
		}
		resolved
	}

	/// Delete a document. Failures are logged and reduced to `false`.
	pub async fn delete(&self, target: &DocumentRef) -> bool {
		match self.provider.delete(target).await {
			Ok(()) => true,
			Err(e) => {
				warn!(target = %target, error = %e, "delete failed");
				false
			}
		}
	}
}

fn matches_kind(candidate: &DocumentRef, target: &DocumentRef) -> bool {
	match target.kind() {
		DocumentKind::Directory => candidate.is_directory(),
		DocumentKind::Leaf => !candidate.is_directory(),
	}
}
