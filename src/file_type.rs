//! Content-category classification for library leaves
//!
//! The index only carries the file categories the library actually presents:
//! playable media, lyric/text sidecars, and backup archives. Everything else
//! is ignored by the crawler without blocking traversal of its siblings.

/// Audio extensions recognised by the library (without the dot)
const AUDIO_EXTENSIONS: &[&str] = &[
	"mp3", "m4a", "m4b", "aac", "flac", "ogg", "oga", "opus", "wav", "aiff",
	"aif", "wma", "mid", "midi",
];

/// Lyric and text sidecar extensions
const LYRIC_EXTENSIONS: &[&str] = &["lrc", "txt"];

/// Backup archive extensions
const BACKUP_EXTENSIONS: &[&str] = &["zip"];

/// Coarse content category of a leaf, derived from its name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCategory {
	Audio,
	Lyrics,
	Backup,
	Other,
}

impl FileCategory {
	/// Classify a leaf by file name. Extension matching is case-insensitive.
	pub fn of(name: &str) -> Self {
		let Some(ext) = extension_of(name) else {
			return FileCategory::Other;
		};
		let ext = ext.to_ascii_lowercase();

		if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
			FileCategory::Audio
		} else if LYRIC_EXTENSIONS.contains(&ext.as_str()) {
			FileCategory::Lyrics
		} else if BACKUP_EXTENSIONS.contains(&ext.as_str()) {
			FileCategory::Backup
		} else {
			FileCategory::Other
		}
	}

	/// Whether leaves of this category belong in the index
	pub fn is_indexed(&self) -> bool {
		!matches!(self, FileCategory::Other)
	}
}

/// Best-effort MIME type for a leaf name, used as the declared content type
/// when creating the destination of a streamed copy.
pub fn guess_mime(name: &str) -> &'static str {
	let ext = extension_of(name)
		.map(str::to_ascii_lowercase)
		.unwrap_or_default();

	match ext.as_str() {
		"mp3" => "audio/mpeg",
		"m4a" | "m4b" | "aac" => "audio/mp4",
		"flac" => "audio/flac",
		"ogg" | "oga" | "opus" => "audio/ogg",
		"wav" => "audio/wav",
		"aiff" | "aif" => "audio/aiff",
		"wma" => "audio/x-ms-wma",
		"mid" | "midi" => "audio/midi",
		"lrc" | "txt" => "text/plain",
		"zip" => "application/zip",
		_ => "application/octet-stream",
	}
}

fn extension_of(name: &str) -> Option<&str> {
	let (stem, ext) = name.rsplit_once('.')?;
	if stem.is_empty() || ext.is_empty() {
		return None;
	}
	Some(ext)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn classifies_audio() {
		assert_eq!(FileCategory::of("song.mp3"), FileCategory::Audio);
		assert_eq!(FileCategory::of("SONG.FLAC"), FileCategory::Audio);
		assert_eq!(FileCategory::of("take.2.opus"), FileCategory::Audio);
	}

	#[test]
	fn classifies_sidecars_and_backups() {
		assert_eq!(FileCategory::of("song.lrc"), FileCategory::Lyrics);
		assert_eq!(FileCategory::of("notes.txt"), FileCategory::Lyrics);
		assert_eq!(FileCategory::of("library-backup.zip"), FileCategory::Backup);
	}

	#[test]
	fn rejects_everything_else() {
		assert_eq!(FileCategory::of("cover.jpg"), FileCategory::Other);
		assert_eq!(FileCategory::of("noext"), FileCategory::Other);
		assert_eq!(FileCategory::of(".hidden"), FileCategory::Other);
		assert!(!FileCategory::of("movie.mkv").is_indexed());
	}

	#[test]
	fn mime_guess() {
		assert_eq!(guess_mime("a.mp3"), "audio/mpeg");
		assert_eq!(guess_mime("a.unknown"), "application/octet-stream");
	}
}
