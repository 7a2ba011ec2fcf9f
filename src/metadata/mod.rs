//! The high level metadata model
//!
//! [`AudioMetadata`] pairs an immutable base snapshot of a file's tag with a
//! pending-change overlay. Reads go through the overlay, [`AudioMetadata::save`]
//! persists it, and only a successful save folds the overlay into the base.

mod dict;
mod key;

pub use dict::{MetadataDict, MetadataValue};
pub use key::MetadataKey;

use crate::error::{Error, ErrorKind, Result};
use crate::ogg;
use crate::picture::Picture;
use crate::properties::AudioProperties;
use crate::registry::FileFormat;

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

/// Read the metadata of a supported file
///
/// Shorthand for [`AudioMetadata::read_from_path`].
///
/// # Errors
///
/// * The file cannot be opened
/// * The file is not a valid stream of its format ([`ErrorKind::NotAValidFile`])
///
/// # Examples
///
/// ```rust,no_run
/// # fn main() -> oggmeta::Result<()> {
/// let metadata = oggmeta::read_metadata("foo.ogg")?;
///
/// println!("{:?}", metadata.title());
/// # Ok(()) }
/// ```
pub fn read_metadata<P>(path: P) -> Result<AudioMetadata>
where
	P: AsRef<Path>,
{
	AudioMetadata::read_from_path(path)
}

/// Edits not yet written to disk
///
/// `None` values mark removals. A `picture` of `Some(None)` likewise marks
/// removal of the embedded picture.
#[derive(Default, Debug, Clone)]
struct PendingChanges {
	fields: BTreeMap<MetadataKey, Option<MetadataValue>>,
	picture: Option<Option<Picture>>,
}

impl PendingChanges {
	fn is_empty(&self) -> bool {
		self.fields.is_empty() && self.picture.is_none()
	}

	fn clear(&mut self) {
		self.fields.clear();
		self.picture = None;
	}
}

/// The metadata of an audio file
///
/// Every setter records a pending change; the file on disk and the base
/// snapshot only move when [`save`](AudioMetadata::save) succeeds. A failed
/// save leaves both the file and the pending changes untouched, so it can
/// simply be retried.
#[derive(Debug, Clone)]
pub struct AudioMetadata {
	path: PathBuf,
	format: FileFormat,
	vendor: String,
	properties: AudioProperties,
	base: MetadataDict,
	pending: PendingChanges,
}

impl AudioMetadata {
	/// Read the metadata of a supported file
	///
	/// The format is picked by file extension, falling back to content
	/// sniffing for unrecognized extensions.
	///
	/// # Errors
	///
	/// * The file cannot be opened
	/// * The file is not a valid stream of its format ([`ErrorKind::NotAValidFile`])
	pub fn read_from_path<P>(path: P) -> Result<Self>
	where
		P: AsRef<Path>,
	{
		let path = path.as_ref();

		let mut file = File::open(path).map_err(|err| Error::from(err).with_path(path))?;

		let format = match FileFormat::from_path(path) {
			Some(format) => format,
			None => Self::sniff_format(&mut file, path)?,
		};

		let (tag, properties) = match format {
			FileFormat::Vorbis => ogg::vorbis::read_from(&mut file),
			FileFormat::Speex => ogg::speex::read_from(&mut file),
		}
		.map_err(|err| err.into_invalid_file(format.name(), path))?;

		let vendor = tag.vendor().to_owned();

		Ok(Self {
			path: path.to_path_buf(),
			format,
			vendor,
			properties,
			base: MetadataDict::from_comment(tag),
			pending: PendingChanges::default(),
		})
	}

	fn sniff_format(file: &mut File, path: &Path) -> Result<FileFormat> {
		// Enough for the page header plus either codec signature
		let mut prologue = [0; 36];

		file.read_exact(&mut prologue)
			.map_err(|err| Error::from(err).into_invalid_file(FileFormat::Vorbis.name(), path))?;
		file.rewind().map_err(|err| Error::from(err).with_path(path))?;

		FileFormat::from_buffer(&prologue).ok_or_else(|| {
			Error::new(ErrorKind::NotAValidFile(FileFormat::Vorbis.name())).with_path(path)
		})
	}

	/// The path this metadata was read from
	pub fn path(&self) -> &Path {
		&self.path
	}

	/// The detected format
	pub fn format(&self) -> FileFormat {
		self.format
	}

	/// Human readable name of the detected format
	pub fn format_name(&self) -> &'static str {
		self.format.name()
	}

	/// The vendor string of the encoder that produced the stream
	pub fn vendor(&self) -> &str {
		&self.vendor
	}

	/// The audio properties of the stream
	pub fn properties(&self) -> &AudioProperties {
		&self.properties
	}

	/// The state of the file as of the last read or successful save
	pub fn base(&self) -> &MetadataDict {
		&self.base
	}

	/// The base snapshot with all pending changes applied
	pub fn merged(&self) -> MetadataDict {
		let mut merged = self.base.clone();

		for (key, change) in &self.pending.fields {
			match change {
				Some(value) => {
					merged.fields.insert(*key, value.clone());
				},
				None => {
					merged.fields.remove(key);
				},
			}
		}

		match self.pending.picture {
			Some(Some(ref picture)) => merged.picture = Some(picture.clone()),
			Some(None) => merged.picture = None,
			None => {},
		}

		merged
	}

	/// Gets the value for a key, pending changes included
	pub fn get(&self, key: MetadataKey) -> Option<&MetadataValue> {
		match self.pending.fields.get(&key) {
			Some(change) => change.as_ref(),
			None => self.base.fields.get(&key),
		}
	}

	/// Records a pending value for a key
	pub fn set(&mut self, key: MetadataKey, value: MetadataValue) {
		self.pending.fields.insert(key, Some(value));
	}

	/// Records a pending removal of a key
	pub fn clear(&mut self, key: MetadataKey) {
		self.pending.fields.insert(key, None);
	}

	/// Returns the embedded front cover, pending changes included
	pub fn front_cover(&self) -> Option<&Picture> {
		match self.pending.picture {
			Some(ref change) => change.as_ref(),
			None => self.base.picture.as_ref(),
		}
	}

	/// Records a pending front cover
	pub fn set_front_cover(&mut self, picture: Picture) {
		self.pending.picture = Some(Some(picture));
	}

	/// Records a pending removal of the front cover
	pub fn remove_front_cover(&mut self) {
		self.pending.picture = Some(None);
	}

	/// Whether any edits are waiting on a [`save`](AudioMetadata::save)
	pub fn has_pending_changes(&self) -> bool {
		!self.pending.is_empty()
	}

	/// Drops all pending edits, reverting to the base snapshot
	pub fn discard_pending_changes(&mut self) {
		self.pending.clear();
	}

	/// Write all pending changes to the file
	///
	/// The updated stream is composed in memory before the file is touched,
	/// and the base snapshot absorbs the pending changes only once the write
	/// has fully succeeded. On error the file keeps its previous contents and
	/// the pending changes stay queued.
	///
	/// # Errors
	///
	/// * The file cannot be opened for writing
	/// * The file is no longer a valid stream of its format ([`ErrorKind::NotAValidFile`])
	/// * Writing the composed stream failed ([`ErrorKind::WriteFailed`])
	pub fn save(&mut self) -> Result<()> {
		let merged = self.merged();
		let items = merged.to_comment_items();

		let mut file = OpenOptions::new()
			.read(true)
			.write(true)
			.open(&self.path)
			.map_err(|err| Error::from(err).with_path(&self.path))?;

		ogg::write::write_to(&mut file, self.format, &items, merged.picture()).map_err(|err| {
			match err.kind {
				ErrorKind::WriteFailed => err.with_path(&self.path),
				_ => err.into_invalid_file(self.format.name(), &self.path),
			}
		})?;

		self.base = merged;
		self.pending.clear();

		Ok(())
	}
}

macro_rules! impl_text_accessor {
	($($name:ident => $key:ident),+ $(,)?) => {
		paste::paste! {
			impl AudioMetadata {
				$(
					#[doc = "Returns the " $name ", pending changes included"]
					pub fn $name(&self) -> Option<&str> {
						self.get(MetadataKey::$key).and_then(MetadataValue::text)
					}

					#[doc = "Records a pending " $name]
					pub fn [<set_ $name>](&mut self, value: String) {
						self.set(MetadataKey::$key, MetadataValue::Text(value));
					}

					#[doc = "Records a pending removal of the " $name]
					pub fn [<remove_ $name>](&mut self) {
						self.clear(MetadataKey::$key);
					}
				)+
			}
		}
	};
}

macro_rules! impl_number_accessor {
	($($name:ident => $key:ident),+ $(,)?) => {
		paste::paste! {
			impl AudioMetadata {
				$(
					#[doc = "Returns the " $name ", pending changes included"]
					pub fn $name(&self) -> Option<u32> {
						self.get(MetadataKey::$key).and_then(MetadataValue::number)
					}

					#[doc = "Records a pending " $name]
					pub fn [<set_ $name>](&mut self, value: u32) {
						self.set(MetadataKey::$key, MetadataValue::Number(value));
					}

					#[doc = "Records a pending removal of the " $name]
					pub fn [<remove_ $name>](&mut self) {
						self.clear(MetadataKey::$key);
					}
				)+
			}
		}
	};
}

impl_text_accessor! {
	title => Title,
	artist => Artist,
	album => Album,
	album_artist => AlbumArtist,
	composer => Composer,
	genre => Genre,
	date => Date,
	comment => Comment,
	lyrics => Lyrics,
	isrc => Isrc,
}

impl_number_accessor! {
	bpm => Bpm,
	track => TrackNumber,
	track_total => TrackTotal,
	disc => DiscNumber,
	disc_total => DiscTotal,
}

#[cfg(test)]
mod tests {
	use super::{AudioMetadata, MetadataDict, MetadataKey, MetadataValue, PendingChanges};
	use crate::properties::AudioProperties;
	use crate::registry::FileFormat;

	fn empty_metadata() -> AudioMetadata {
		AudioMetadata {
			path: std::path::PathBuf::from("test.ogg"),
			format: FileFormat::Vorbis,
			vendor: String::new(),
			properties: AudioProperties::default(),
			base: MetadataDict::default(),
			pending: PendingChanges::default(),
		}
	}

	#[test_log::test]
	fn pending_changes_shadow_the_base() {
		let mut metadata = empty_metadata();
		metadata.base.fields.insert(
			MetadataKey::Title,
			MetadataValue::Text(String::from("Base title")),
		);

		assert_eq!(metadata.title(), Some("Base title"));
		assert!(!metadata.has_pending_changes());

		metadata.set_title(String::from("New title"));
		assert_eq!(metadata.title(), Some("New title"));
		assert!(metadata.has_pending_changes());

		// The base snapshot is untouched
		assert_eq!(
			metadata.base().get(MetadataKey::Title),
			Some(&MetadataValue::Text(String::from("Base title")))
		);
	}

	#[test_log::test]
	fn pending_removals_hide_base_values() {
		let mut metadata = empty_metadata();
		metadata.base.fields.insert(
			MetadataKey::Artist,
			MetadataValue::Text(String::from("Foo artist")),
		);

		metadata.remove_artist();
		assert_eq!(metadata.artist(), None);
		assert!(metadata.merged().get(MetadataKey::Artist).is_none());

		metadata.discard_pending_changes();
		assert_eq!(metadata.artist(), Some("Foo artist"));
	}

	#[test_log::test]
	fn merged_view_is_pure() {
		let mut metadata = empty_metadata();
		metadata.base.fields.insert(
			MetadataKey::Genre,
			MetadataValue::Text(String::from("Ambient")),
		);
		metadata.set_bpm(120);

		let merged = metadata.merged();
		assert_eq!(
			merged.get(MetadataKey::Genre),
			Some(&MetadataValue::Text(String::from("Ambient")))
		);
		assert_eq!(merged.get(MetadataKey::Bpm), Some(&MetadataValue::Number(120)));

		// Merging does not commit anything
		assert!(metadata.has_pending_changes());
		assert!(metadata.base().get(MetadataKey::Bpm).is_none());
	}
}
