/// A canonical metadata field
///
/// Each key corresponds to one Xiph comment field name; see
/// [`as_xiph_key`](MetadataKey::as_xiph_key) for the mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[non_exhaustive]
pub enum MetadataKey {
	Title,
	Artist,
	Album,
	AlbumArtist,
	Composer,
	Genre,
	Date,
	Comment,
	Lyrics,
	Isrc,
	Bpm,
	TrackNumber,
	TrackTotal,
	DiscNumber,
	DiscTotal,
}

macro_rules! key_map {
	($($variant:ident => $key:literal $(| $alt:literal)*;)+) => {
		impl MetadataKey {
			/// The canonical Xiph field name for this key
			pub fn as_xiph_key(self) -> &'static str {
				match self {
					$(Self::$variant => $key,)+
				}
			}

			/// Map an uppercased Xiph field name back to a canonical key
			///
			/// Alternate spellings seen in the wild (`TRACKNUM`, `TOTALTRACKS`, ...)
			/// map to the same key as the primary name.
			pub fn from_xiph_key(key: &str) -> Option<Self> {
				match key {
					$($key $(| $alt)* => Some(Self::$variant),)+
					_ => None,
				}
			}
		}
	};
}

key_map! {
	Title       => "TITLE";
	Artist      => "ARTIST";
	Album       => "ALBUM";
	AlbumArtist => "ALBUMARTIST" | "ALBUM ARTIST";
	Composer    => "COMPOSER";
	Genre       => "GENRE";
	Date        => "DATE";
	Comment     => "COMMENT";
	Lyrics      => "LYRICS";
	Isrc        => "ISRC";
	Bpm         => "BPM";
	TrackNumber => "TRACKNUMBER" | "TRACKNUM";
	TrackTotal  => "TRACKTOTAL" | "TOTALTRACKS";
	DiscNumber  => "DISCNUMBER";
	DiscTotal   => "DISCTOTAL" | "TOTALDISCS";
}

impl MetadataKey {
	/// Whether values for this key are unsigned integers
	pub fn is_numeric(self) -> bool {
		matches!(
			self,
			MetadataKey::Bpm
				| MetadataKey::TrackNumber
				| MetadataKey::TrackTotal
				| MetadataKey::DiscNumber
				| MetadataKey::DiscTotal
		)
	}

	/// The total-count key paired with a position key (`TRACKNUMBER` -> `TRACKTOTAL`)
	pub(crate) fn total_counterpart(self) -> Option<Self> {
		match self {
			MetadataKey::TrackNumber => Some(MetadataKey::TrackTotal),
			MetadataKey::DiscNumber => Some(MetadataKey::DiscTotal),
			_ => None,
		}
	}
}
