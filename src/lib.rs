//! [![GitHub Workflow Status](https://img.shields.io/github/actions/workflow/status/oggmeta/oggmeta/ci.yml?branch=main&style=for-the-badge&logo=github)](https://github.com/oggmeta/oggmeta/actions/workflows/ci.yml)
//! [![Downloads](https://img.shields.io/crates/d/oggmeta?style=for-the-badge&logo=rust)](https://crates.io/crates/oggmeta)
//! [![Version](https://img.shields.io/crates/v/oggmeta?style=for-the-badge&logo=rust)](https://crates.io/crates/oggmeta)
//!
//! Tag reading and writing for Ogg Vorbis and Ogg Speex files.
//!
//! # Reading
//!
//! The format is picked by file extension, falling back to content sniffing:
//!
//! ```rust,no_run
//! # fn main() -> oggmeta::Result<()> {
//! let metadata = oggmeta::read_metadata("foo.ogg")?;
//!
//! println!("Title: {:?}", metadata.title());
//! println!("Duration: {:?}", metadata.properties().duration());
//! # Ok(()) }
//! ```
//!
//! # Writing
//!
//! Edits are queued as pending changes and only hit the file on
//! [`save`](AudioMetadata::save):
//!
//! ```rust,no_run
//! # fn main() -> oggmeta::Result<()> {
//! let mut metadata = oggmeta::read_metadata("foo.ogg")?;
//!
//! metadata.set_title(String::from("A new title"));
//! metadata.remove_comment();
//! metadata.save()?;
//! # Ok(()) }
//! ```
//!
//! A failed save leaves both the file and the pending changes as they were,
//! so the save can simply be retried.
//!
//! Fields the crate does not understand (`REPLAYGAIN_*`, encoder settings,
//! ...) survive a rewrite untouched.

pub(crate) mod error;
pub(crate) mod macros;
pub(crate) mod metadata;
pub(crate) mod ogg;
pub(crate) mod picture;
pub(crate) mod properties;
pub(crate) mod registry;
pub(crate) mod util;

pub use error::{Error, ErrorKind, Result};
pub use metadata::{AudioMetadata, MetadataDict, MetadataKey, MetadataValue, read_metadata};
pub use ogg::XiphComment;
pub use picture::{MimeType, Picture, PictureType};
pub use properties::AudioProperties;
pub use registry::{EXTENSIONS, FileFormat, FormatHandler, HANDLERS};
