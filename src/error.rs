//! Contains the errors that can arise within the crate
//!
//! The primary error is [`Error`]. The type of error is determined by [`ErrorKind`];
//! file-level errors additionally carry the path of the offending file.

use std::fmt::{Debug, Display, Formatter};
use std::path::{Path, PathBuf};

use ogg_pager::PageError;

/// Alias for `Result<T, Error>`
pub type Result<T> = std::result::Result<T, Error>;

/// The types of errors that can occur
#[derive(Debug)]
#[non_exhaustive]
pub enum ErrorKind {
	// File level errors
	/// The container failed its validity check on open, carrying the format name.
	///
	/// This is returned by both the read and write paths; the write path will
	/// never touch a file it cannot safely parse.
	NotAValidFile(&'static str),
	/// The container save step failed after a valid parse
	WriteFailed,

	// Picture related errors
	/// A `METADATA_BLOCK_PICTURE` payload was truncated or otherwise invalid
	MalformedPictureBlock,

	/// A field name cannot be represented as a Xiph comment key
	///
	/// Unknown-but-valid field names are never rejected, they are carried
	/// opaquely. This only fires for names holding characters outside of
	/// `0x20..=0x7D`, or `'='`.
	UnsupportedField,

	// Comment block errors
	/// Expected the data to be a different size than provided
	///
	/// This occurs when the size of an item is written as one value, but that size is
	/// either too big or small to be valid within the bounds of that item.
	SizeMismatch,
	/// Attempting to read/write an abnormally large amount of data
	TooMuchData,

	// Conversions for external errors
	/// Errors that arise while parsing OGG pages
	OggPage(ogg_pager::PageError),
	/// Unable to convert bytes to a String
	StringFromUtf8(std::string::FromUtf8Error),
	/// Unable to convert bytes to a str
	Utf8(std::str::Utf8Error),
	/// Represents all cases of [`std::io::Error`].
	Io(std::io::Error),
}

/// Errors that could occur within the crate
pub struct Error {
	pub(crate) kind: ErrorKind,
	pub(crate) path: Option<PathBuf>,
}

impl Error {
	/// Create an `Error` from an [`ErrorKind`]
	#[must_use]
	pub const fn new(kind: ErrorKind) -> Self {
		Self { kind, path: None }
	}

	/// Returns the [`ErrorKind`]
	pub fn kind(&self) -> &ErrorKind {
		&self.kind
	}

	/// Returns the path of the offending file, if this was a file-level error
	pub fn path(&self) -> Option<&Path> {
		self.path.as_deref()
	}

	pub(crate) fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
		self.path = Some(path.into());
		self
	}

	/// Reclassify a decode failure as `NotAValidFile` for the given format.
	///
	/// I/O errors other than an early EOF keep their kind, since they say nothing
	/// about the validity of the file contents.
	pub(crate) fn into_invalid_file(self, format_name: &'static str, path: &Path) -> Self {
		match self.kind {
			ErrorKind::Io(ref err) if err.kind() != std::io::ErrorKind::UnexpectedEof => {
				self.with_path(path)
			},
			_ => Error::new(ErrorKind::NotAValidFile(format_name)).with_path(path),
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self.kind {
			ErrorKind::OggPage(ref err) => Some(err),
			ErrorKind::StringFromUtf8(ref err) => Some(err),
			ErrorKind::Utf8(ref err) => Some(err),
			ErrorKind::Io(ref err) => Some(err),
			_ => None,
		}
	}
}

impl Debug for Error {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self.path {
			Some(ref path) => write!(f, "{:?} ({})", self.kind, path.display()),
			None => write!(f, "{:?}", self.kind),
		}
	}
}

impl From<PageError> for Error {
	fn from(input: PageError) -> Self {
		Self::new(ErrorKind::OggPage(input))
	}
}

impl From<std::io::Error> for Error {
	fn from(input: std::io::Error) -> Self {
		Self::new(ErrorKind::Io(input))
	}
}

impl From<std::string::FromUtf8Error> for Error {
	fn from(input: std::string::FromUtf8Error) -> Self {
		Self::new(ErrorKind::StringFromUtf8(input))
	}
}

impl From<std::str::Utf8Error> for Error {
	fn from(input: std::str::Utf8Error) -> Self {
		Self::new(ErrorKind::Utf8(input))
	}
}

impl Display for Error {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self.kind {
			// Conversions
			ErrorKind::OggPage(ref err) => write!(f, "{err}"),
			ErrorKind::StringFromUtf8(ref err) => write!(f, "{err}"),
			ErrorKind::Utf8(ref err) => write!(f, "{err}"),
			ErrorKind::Io(ref err) => match self.path {
				Some(ref path) => write!(f, "{err} ({})", path.display()),
				None => write!(f, "{err}"),
			},

			ErrorKind::NotAValidFile(format_name) => match self.path {
				Some(ref path) => write!(
					f,
					"The file \"{}\" is not a valid {format_name} file",
					path.display()
				),
				None => write!(f, "Not a valid {format_name} file"),
			},
			ErrorKind::WriteFailed => match self.path {
				Some(ref path) => {
					write!(f, "Unable to write metadata to \"{}\"", path.display())
				},
				None => write!(f, "Unable to write metadata"),
			},
			ErrorKind::MalformedPictureBlock => {
				write!(f, "Picture: encountered a truncated or invalid block")
			},
			ErrorKind::UnsupportedField => {
				write!(f, "A field name cannot be represented as a comment key")
			},
			ErrorKind::SizeMismatch => write!(
				f,
				"Encountered an invalid item size, either too big or too small to be valid"
			),
			ErrorKind::TooMuchData => write!(
				f,
				"Attempted to read/write an abnormally large amount of data"
			),
		}
	}
}
