//! The format registry
//!
//! Every supported container format is described by a [`FormatHandler`] entry in
//! [`HANDLERS`]. Format selection is a table lookup, either by file extension/MIME
//! type or by probing the first page of the stream.

use std::ffi::OsStr;
use std::path::Path;

/// List of all file extensions the crate handles
///
/// This aggregates the per-format extension sets, and can be used as a filter
/// when scanning directories.
pub const EXTENSIONS: &[&str] = &["ogg", "oga", "spx"];

/// The container formats the crate can read and write
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
#[non_exhaustive]
pub enum FileFormat {
	/// Ogg Vorbis
	Vorbis,
	/// Ogg Speex
	Speex,
}

/// The capabilities of a single [`FileFormat`]
#[derive(Debug)]
pub struct FormatHandler {
	/// The format this entry describes
	pub format: FileFormat,
	/// Human readable format name, used in error messages and as the
	/// format-name marker during reads
	pub name: &'static str,
	/// The file extensions this format claims
	pub extensions: &'static [&'static str],
	/// The MIME types this format claims
	pub mime_types: &'static [&'static str],
}

/// The registry of supported formats
pub const HANDLERS: &[FormatHandler] = &[
	FormatHandler {
		format: FileFormat::Vorbis,
		name: "Ogg Vorbis",
		extensions: &["ogg", "oga"],
		mime_types: &["audio/ogg-vorbis"],
	},
	FormatHandler {
		format: FileFormat::Speex,
		name: "Ogg Speex",
		extensions: &["spx"],
		mime_types: &["audio/speex"],
	},
];

impl FileFormat {
	/// Returns the registry entry for this format
	pub fn handler(self) -> &'static FormatHandler {
		match self {
			FileFormat::Vorbis => &HANDLERS[0],
			FileFormat::Speex => &HANDLERS[1],
		}
	}

	/// Human readable format name (`"Ogg Vorbis"` / `"Ogg Speex"`)
	pub fn name(self) -> &'static str {
		self.handler().name
	}

	/// The file extensions this format claims
	pub fn supported_extensions(self) -> &'static [&'static str] {
		self.handler().extensions
	}

	/// The MIME types this format claims
	pub fn supported_mime_types(self) -> &'static [&'static str] {
		self.handler().mime_types
	}

	/// Whether this format claims files with the given extension
	///
	/// The comparison is case-insensitive.
	///
	/// # Examples
	///
	/// ```rust
	/// use oggmeta::FileFormat;
	///
	/// assert!(FileFormat::Vorbis.handles_extension("OGG"));
	/// assert!(!FileFormat::Vorbis.handles_extension("mp3"));
	/// ```
	pub fn handles_extension(self, extension: &str) -> bool {
		self.handler()
			.extensions
			.iter()
			.any(|e| e.eq_ignore_ascii_case(extension))
	}

	/// Whether this format claims the given MIME type
	///
	/// The comparison is case-insensitive.
	pub fn handles_mime_type(self, mime_type: &str) -> bool {
		self.handler()
			.mime_types
			.iter()
			.any(|m| m.eq_ignore_ascii_case(mime_type))
	}

	/// Attempts to extract a [`FileFormat`] from an extension
	///
	/// # Examples
	///
	/// ```rust
	/// use oggmeta::FileFormat;
	///
	/// assert_eq!(FileFormat::from_ext("oga"), Some(FileFormat::Vorbis));
	/// ```
	pub fn from_ext<E>(ext: E) -> Option<Self>
	where
		E: AsRef<OsStr>,
	{
		let ext = ext.as_ref().to_str()?.to_ascii_lowercase();

		HANDLERS
			.iter()
			.find(|h| h.extensions.contains(&ext.as_str()))
			.map(|h| h.format)
	}

	/// Attempts to determine a [`FileFormat`] from a path
	///
	/// # Examples
	///
	/// ```rust
	/// use oggmeta::FileFormat;
	/// use std::path::Path;
	///
	/// let path = Path::new("path/to/my.spx");
	/// assert_eq!(FileFormat::from_path(path), Some(FileFormat::Speex));
	/// ```
	pub fn from_path<P>(path: P) -> Option<Self>
	where
		P: AsRef<Path>,
	{
		let ext = path.as_ref().extension();
		ext.and_then(Self::from_ext)
	}

	/// Attempts to extract a [`FileFormat`] from the start of a stream
	///
	/// This expects `buf` to begin with an OGG page; the codec signature sits at a
	/// fixed offset inside the first page's content.
	pub fn from_buffer(buf: &[u8]) -> Option<Self> {
		if buf.len() < 36 || &buf[..4] != b"OggS" {
			return None;
		}

		if &buf[29..35] == b"vorbis" {
			return Some(Self::Vorbis);
		}
		if &buf[28..36] == b"Speex   " {
			return Some(Self::Speex);
		}

		None
	}
}
