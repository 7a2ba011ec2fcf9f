//! The `METADATA_BLOCK_PICTURE` codec
//!
//! Xiph comments carry embedded cover art as a FLAC-style picture block,
//! base64 encoded to fit the text-only comment model. [`Picture`] is the decoded
//! record; [`Picture::from_base64`] and [`Picture::as_base64`] are the comment-value
//! codec, built on the raw binary pair [`Picture::from_flac_bytes`] /
//! [`Picture::as_flac_bytes`].

use crate::error::Result;
use crate::macros::err;

use std::fmt::{Debug, Display, Formatter};
use std::io::{Cursor, Read, Seek, SeekFrom};

use byteorder::{BigEndian, ReadBytesExt as _};
use data_encoding::BASE64;

/// MIME types for pictures.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum MimeType {
	/// PNG image
	Png,
	/// JPEG image
	Jpeg,
	/// TIFF image
	Tiff,
	/// BMP image
	Bmp,
	/// GIF image
	Gif,
	/// Some unknown MIME type
	Unknown(String),
}

impl MimeType {
	/// Get a `MimeType` from a string
	///
	/// # Examples
	///
	/// ```rust
	/// use oggmeta::MimeType;
	///
	/// assert_eq!(MimeType::from_str("image/jpeg"), MimeType::Jpeg);
	/// ```
	#[must_use]
	#[allow(clippy::should_implement_trait)] // Infallible in contrast to FromStr
	pub fn from_str(mime_type: &str) -> Self {
		match &*mime_type.to_lowercase() {
			"image/jpeg" | "image/jpg" => Self::Jpeg,
			"image/png" => Self::Png,
			"image/tiff" => Self::Tiff,
			"image/bmp" => Self::Bmp,
			"image/gif" => Self::Gif,
			_ => Self::Unknown(mime_type.to_owned()),
		}
	}

	/// Get a &str from a `MimeType`
	#[must_use]
	pub fn as_str(&self) -> &str {
		match self {
			MimeType::Jpeg => "image/jpeg",
			MimeType::Png => "image/png",
			MimeType::Tiff => "image/tiff",
			MimeType::Bmp => "image/bmp",
			MimeType::Gif => "image/gif",
			MimeType::Unknown(unknown) => unknown,
		}
	}
}

impl Display for MimeType {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// The picture type, according to ID3v2 APIC
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum PictureType {
	Other,
	Icon,
	OtherIcon,
	CoverFront,
	CoverBack,
	Leaflet,
	Media,
	LeadArtist,
	Artist,
	Conductor,
	Band,
	Composer,
	Lyricist,
	RecordingLocation,
	DuringRecording,
	DuringPerformance,
	ScreenCapture,
	BrightFish,
	Illustration,
	BandLogo,
	PublisherLogo,
	Undefined(u8),
}

impl PictureType {
	/// Get a `u8` from a `PictureType` according to ID3v2 APIC
	pub fn as_u8(&self) -> u8 {
		match self {
			Self::Other => 0,
			Self::Icon => 1,
			Self::OtherIcon => 2,
			Self::CoverFront => 3,
			Self::CoverBack => 4,
			Self::Leaflet => 5,
			Self::Media => 6,
			Self::LeadArtist => 7,
			Self::Artist => 8,
			Self::Conductor => 9,
			Self::Band => 10,
			Self::Composer => 11,
			Self::Lyricist => 12,
			Self::RecordingLocation => 13,
			Self::DuringRecording => 14,
			Self::DuringPerformance => 15,
			Self::ScreenCapture => 16,
			Self::BrightFish => 17,
			Self::Illustration => 18,
			Self::BandLogo => 19,
			Self::PublisherLogo => 20,
			Self::Undefined(i) => *i,
		}
	}

	/// Get a `PictureType` from a u8 according to ID3v2 APIC
	pub fn from_u8(byte: u8) -> Self {
		match byte {
			0 => Self::Other,
			1 => Self::Icon,
			2 => Self::OtherIcon,
			3 => Self::CoverFront,
			4 => Self::CoverBack,
			5 => Self::Leaflet,
			6 => Self::Media,
			7 => Self::LeadArtist,
			8 => Self::Artist,
			9 => Self::Conductor,
			10 => Self::Band,
			11 => Self::Composer,
			12 => Self::Lyricist,
			13 => Self::RecordingLocation,
			14 => Self::DuringRecording,
			15 => Self::DuringPerformance,
			16 => Self::ScreenCapture,
			17 => Self::BrightFish,
			18 => Self::Illustration,
			19 => Self::BandLogo,
			20 => Self::PublisherLogo,
			i => Self::Undefined(i),
		}
	}
}

/// An embedded picture
///
/// The width/height/depth/color count fields are advisory and may be zero;
/// [`Picture::front_cover`] fills them for PNG and JPEG images.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct Picture {
	pic_type: PictureType,
	mime_type: Option<MimeType>,
	description: Option<String>,
	width: u32,
	height: u32,
	color_depth: u32,
	num_colors: u32,
	data: Vec<u8>,
}

impl Debug for Picture {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Picture")
			.field("pic_type", &self.pic_type)
			.field("mime_type", &self.mime_type)
			.field("description", &self.description)
			.field("width", &self.width)
			.field("height", &self.height)
			.field("data", &format!("<{} bytes>", self.data.len()))
			.finish()
	}
}

impl Picture {
	/// Create a `Picture`
	///
	/// The dimension fields start out zeroed; for PNG and JPEG data they are
	/// filled by probing the image header.
	pub fn new(
		pic_type: PictureType,
		mime_type: Option<MimeType>,
		description: Option<String>,
		data: Vec<u8>,
	) -> Self {
		let mut picture = Self {
			pic_type,
			mime_type,
			description,
			width: 0,
			height: 0,
			color_depth: 0,
			num_colors: 0,
			data,
		};

		picture.probe_dimensions();
		picture
	}

	/// Create a front cover `Picture` from raw image bytes
	///
	/// The MIME type is detected from the image signature.
	///
	/// # Errors
	///
	/// * `data` is shorter than 8 bytes or carries no recognized image signature
	pub fn front_cover(data: Vec<u8>) -> Result<Self> {
		let mime_type = Self::mimetype_from_bin(&data)?;
		Ok(Self::new(
			PictureType::CoverFront,
			Some(mime_type),
			None,
			data,
		))
	}

	/// Returns the [`PictureType`]
	pub fn pic_type(&self) -> PictureType {
		self.pic_type
	}

	/// Returns the [`MimeType`], if one was stored
	pub fn mime_type(&self) -> Option<&MimeType> {
		self.mime_type.as_ref()
	}

	/// Returns the description
	pub fn description(&self) -> Option<&str> {
		self.description.as_deref()
	}

	/// The picture's width in pixels (advisory, may be zero)
	pub fn width(&self) -> u32 {
		self.width
	}

	/// The picture's height in pixels (advisory, may be zero)
	pub fn height(&self) -> u32 {
		self.height
	}

	/// The picture's color depth in bits per pixel (advisory, may be zero)
	pub fn color_depth(&self) -> u32 {
		self.color_depth
	}

	/// The number of colors used (advisory, may be zero)
	pub fn num_colors(&self) -> u32 {
		self.num_colors
	}

	/// Returns the raw image bytes
	pub fn data(&self) -> &[u8] {
		&self.data
	}

	/// Consumes the `Picture`, returning the raw image bytes
	pub fn into_data(self) -> Vec<u8> {
		self.data
	}

	/// Encode the picture as a base64 `METADATA_BLOCK_PICTURE` comment value
	///
	/// RFC 4648 standard alphabet, padded, no line wrapping.
	pub fn as_base64(&self) -> String {
		BASE64.encode(&self.as_flac_bytes())
	}

	/// Decode a base64 `METADATA_BLOCK_PICTURE` comment value
	///
	/// # Errors
	///
	/// * `text` contains characters outside the base64 alphabet
	/// * The decoded block is truncated ([`MalformedPictureBlock`](crate::ErrorKind::MalformedPictureBlock))
	pub fn from_base64(text: &[u8]) -> Result<Self> {
		let Ok(block) = BASE64.decode(text) else {
			err!(MalformedPictureBlock);
		};

		Self::from_flac_bytes(&block)
	}

	/// Serialize the picture as a raw FLAC picture block
	///
	/// All fields are big-endian and length-prefixed. This does not include a
	/// comment key or base64 wrapping.
	pub fn as_flac_bytes(&self) -> Vec<u8> {
		let mut data = Vec::with_capacity(32 + self.data.len());

		data.extend(u32::from(self.pic_type.as_u8()).to_be_bytes());

		let mime_str = match self.mime_type {
			Some(ref mime_type) => mime_type.as_str(),
			None => "",
		};
		data.extend((mime_str.len() as u32).to_be_bytes());
		data.extend(mime_str.as_bytes());

		let description = self.description.as_deref().unwrap_or_default();
		data.extend((description.len() as u32).to_be_bytes());
		data.extend(description.as_bytes());

		data.extend(self.width.to_be_bytes());
		data.extend(self.height.to_be_bytes());
		data.extend(self.color_depth.to_be_bytes());
		data.extend(self.num_colors.to_be_bytes());

		data.extend((self.data.len() as u32).to_be_bytes());
		data.extend(self.data.iter());

		data
	}

	/// Parse a raw FLAC picture block
	///
	/// # Errors
	///
	/// Any declared length running past the end of `content`, a block too
	/// short to hold a length prefix, or a non-UTF-8 MIME type/description
	/// fails with [`MalformedPictureBlock`](crate::ErrorKind::MalformedPictureBlock);
	/// the parser never reads out of bounds.
	pub fn from_flac_bytes(content: &[u8]) -> Result<Self> {
		let mut size = content.len();
		let mut reader = Cursor::new(content);

		// picture type + 4 length prefixes + 4 dimension fields
		if size < 32 {
			err!(MalformedPictureBlock);
		}

		let pic_ty = reader.read_u32::<BigEndian>()?;
		size -= 4;

		// ID3v2 APIC uses a single byte for picture type, anything
		// greater is invalid
		if pic_ty > 255 {
			err!(MalformedPictureBlock);
		}

		let mime_len = reader.read_u32::<BigEndian>()? as usize;
		size -= 4;

		if mime_len > size {
			err!(MalformedPictureBlock);
		}

		let Ok(mime_type_str) = std::str::from_utf8(&content[8..8 + mime_len]) else {
			err!(MalformedPictureBlock);
		};
		size -= mime_len;

		reader.seek(SeekFrom::Current(mime_len as i64))?;

		// The MIME length can leave too few bytes for the description's
		// length prefix
		let Ok(desc_len) = reader.read_u32::<BigEndian>() else {
			err!(MalformedPictureBlock);
		};
		let desc_len = desc_len as usize;
		size -= 4;

		if desc_len > size {
			err!(MalformedPictureBlock);
		}

		let mut description = None;
		if desc_len > 0 {
			let pos = 12 + mime_len;
			let Ok(desc) = std::str::from_utf8(&content[pos..pos + desc_len]) else {
				err!(MalformedPictureBlock);
			};

			description = Some(desc.to_owned());
			size -= desc_len;
			reader.seek(SeekFrom::Current(desc_len as i64))?;
		}

		if size < 20 {
			err!(MalformedPictureBlock);
		}

		let width = reader.read_u32::<BigEndian>()?;
		let height = reader.read_u32::<BigEndian>()?;
		let color_depth = reader.read_u32::<BigEndian>()?;
		let num_colors = reader.read_u32::<BigEndian>()?;
		let data_len = reader.read_u32::<BigEndian>()? as usize;
		size -= 20;

		if data_len > size {
			err!(MalformedPictureBlock);
		}

		let mut data = vec![0; data_len];
		reader.read_exact(&mut data)?;

		let mime_type = if mime_type_str.is_empty() {
			None
		} else {
			Some(MimeType::from_str(mime_type_str))
		};

		Ok(Self {
			pic_type: PictureType::from_u8(pic_ty as u8),
			mime_type,
			description,
			width,
			height,
			color_depth,
			num_colors,
			data,
		})
	}

	pub(crate) fn mimetype_from_bin(bytes: &[u8]) -> Result<MimeType> {
		if bytes.len() < 8 {
			err!(MalformedPictureBlock);
		}

		match bytes[..8] {
			[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A] => Ok(MimeType::Png),
			[0xFF, 0xD8, ..] => Ok(MimeType::Jpeg),
			[b'G', b'I', b'F', 0x38, 0x37 | 0x39, b'a', ..] => Ok(MimeType::Gif),
			[b'B', b'M', ..] => Ok(MimeType::Bmp),
			[b'I', b'I', b'*', 0x00, ..] | [b'M', b'M', 0x00, b'*', ..] => Ok(MimeType::Tiff),
			_ => err!(MalformedPictureBlock),
		}
	}

	// Fill the advisory dimension fields for PNG/JPEG data. Other image
	// formats keep zeroed dimensions, which the block format allows.
	fn probe_dimensions(&mut self) {
		if self.width != 0 || self.height != 0 || self.data.len() < 8 {
			return;
		}

		let probed = match self.data[..4] {
			[0x89, b'P', b'N', b'G'] => Self::png_dimensions(&self.data),
			[0xFF, 0xD8, 0xFF, ..] => Self::jpeg_dimensions(&self.data),
			_ => None,
		};

		if let Some((width, height, color_depth, num_colors)) = probed {
			self.width = width;
			self.height = height;
			self.color_depth = color_depth;
			self.num_colors = num_colors;
		}
	}

	fn png_dimensions(data: &[u8]) -> Option<(u32, u32, u32, u32)> {
		let reader = &mut &*data;

		let mut sig = [0; 8];
		reader.read_exact(&mut sig).ok()?;

		if sig != [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A] {
			return None;
		}

		// The signature must be immediately followed by the IHDR chunk
		let mut ihdr = [0; 8];
		reader.read_exact(&mut ihdr).ok()?;
		if !ihdr.ends_with(b"IHDR") {
			return None;
		}

		let width = reader.read_u32::<BigEndian>().ok()?;
		let height = reader.read_u32::<BigEndian>().ok()?;
		let mut color_depth = u32::from(reader.read_u8().ok()?);
		let color_type = reader.read_u8().ok()?;

		match color_type {
			2 => color_depth *= 3,
			4 | 6 => color_depth *= 4,
			_ => {},
		}

		let mut num_colors = 0;

		// Indexed-color images carry a "PLTE" chunk whose entry count
		// belongs in the color-count field
		if color_type == 3 {
			let mut reader = Cursor::new(reader);

			// Skip compression method (1), filter method (1),
			// interlace method (1) and the IHDR CRC (4)
			reader.seek(SeekFrom::Current(7)).ok()?;

			let mut chunk_type = [0; 4];
			while let (Ok(size), Ok(())) = (
				reader.read_u32::<BigEndian>(),
				reader.read_exact(&mut chunk_type),
			) {
				if &chunk_type == b"PLTE" {
					// The PLTE chunk contains 1-256 3-byte entries
					num_colors = size / 3;
					break;
				}

				// Skip the chunk's data (size) and CRC (4 bytes)
				let (content_size, overflowed) = size.overflowing_add(4);
				if overflowed {
					break;
				}

				reader.seek(SeekFrom::Current(i64::from(content_size))).ok()?;
			}
		}

		Some((width, height, color_depth, num_colors))
	}

	fn jpeg_dimensions(data: &[u8]) -> Option<(u32, u32, u32, u32)> {
		let reader = &mut &*data;

		let mut frame_marker = [0; 4];
		reader.read_exact(&mut frame_marker).ok()?;

		if !matches!(frame_marker, [0xFF, 0xD8, 0xFF, ..]) {
			return None;
		}

		let mut section_len = reader.read_u16::<BigEndian>().ok()?;

		let mut reader = Cursor::new(reader);

		// The length contains itself, so anything < 2 is invalid
		let content_len = section_len.checked_sub(2)?;
		reader.seek(SeekFrom::Current(i64::from(content_len))).ok()?;

		// There is no fixed header, the dimensions live in a "SOFn" frame
		// (n = 0 or 2) somewhere before the start of scan
		while let Ok(0xFF) = reader.read_u8() {
			let marker = reader.read_u8().ok()?;
			section_len = reader.read_u16::<BigEndian>().ok()?;

			// SOS, end of the header
			if marker == 0xDA {
				break;
			}

			if marker == 0xC0 || marker == 0xC2 {
				let precision = reader.read_u8().ok()?;
				let height = u32::from(reader.read_u16::<BigEndian>().ok()?);
				let width = u32::from(reader.read_u16::<BigEndian>().ok()?);
				let components = reader.read_u8().ok()?;

				return Some((width, height, u32::from(precision) * u32::from(components), 0));
			}

			reader
				.seek(SeekFrom::Current(i64::from(section_len.checked_sub(2)?)))
				.ok()?;
		}

		None
	}
}

#[cfg(test)]
mod tests {
	use super::{MimeType, Picture, PictureType};
	use crate::error::ErrorKind;

	use data_encoding::BASE64;

	fn jpeg_picture() -> Picture {
		// A bare JPEG SOI marker, enough to be recognized as image/jpeg
		let data = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F'];
		Picture::new(
			PictureType::CoverFront,
			Some(MimeType::Jpeg),
			Some(String::from("Front cover")),
			data,
		)
	}

	#[test_log::test]
	fn base64_round_trip() {
		let picture = jpeg_picture();
		let encoded = picture.as_base64();

		let decoded = Picture::from_base64(encoded.as_bytes()).unwrap();
		assert_eq!(decoded, picture);
	}

	#[test_log::test]
	fn flac_bytes_round_trip_without_description() {
		let picture = Picture::new(PictureType::Other, Some(MimeType::Png), None, vec![0; 16]);

		let decoded = Picture::from_flac_bytes(&picture.as_flac_bytes()).unwrap();
		assert_eq!(decoded, picture);
	}

	#[test_log::test]
	fn truncated_mime_length_is_rejected() {
		let picture = jpeg_picture();
		let mut block = picture.as_flac_bytes();

		// Declare a MIME type longer than the remaining buffer
		block[4..8].copy_from_slice(&u32::MAX.to_be_bytes());

		let err = Picture::from_flac_bytes(&block).unwrap_err();
		assert!(matches!(err.kind(), ErrorKind::MalformedPictureBlock));
	}

	#[test_log::test]
	fn truncated_data_length_is_rejected() {
		let picture = jpeg_picture();
		let mut block = picture.as_flac_bytes();

		let data_len_pos = block.len() - picture.data().len() - 4;
		block[data_len_pos..data_len_pos + 4].copy_from_slice(&u32::MAX.to_be_bytes());

		let err = Picture::from_flac_bytes(&block).unwrap_err();
		assert!(matches!(err.kind(), ErrorKind::MalformedPictureBlock));
	}

	#[test_log::test]
	fn truncated_length_prefix_is_rejected() {
		// A MIME length leaving only 2 bytes where the description's 4-byte
		// length prefix should be
		let mut block = vec![0; 32];
		block[3] = 3;
		block[4..8].copy_from_slice(&22_u32.to_be_bytes());

		let err = Picture::from_flac_bytes(&block).unwrap_err();
		assert!(matches!(err.kind(), ErrorKind::MalformedPictureBlock));
	}

	#[test_log::test]
	fn non_utf8_mime_type_is_rejected() {
		let picture = jpeg_picture();
		let mut block = picture.as_flac_bytes();

		// First byte of the "image/jpeg" MIME string
		block[8] = 0xFF;

		let err = Picture::from_flac_bytes(&block).unwrap_err();
		assert!(matches!(err.kind(), ErrorKind::MalformedPictureBlock));
	}

	#[test_log::test]
	fn undersized_block_is_rejected() {
		let err = Picture::from_flac_bytes(&[0; 16]).unwrap_err();
		assert!(matches!(err.kind(), ErrorKind::MalformedPictureBlock));
	}

	#[test_log::test]
	fn invalid_base64_characters_are_rejected() {
		let err = Picture::from_base64(b"not*base64!").unwrap_err();
		assert!(matches!(err.kind(), ErrorKind::MalformedPictureBlock));
	}

	#[test_log::test]
	fn base64_alphabet_is_unwrapped() {
		// Line-wrapped base64, as produced by some encoders, is not tolerated
		let picture = jpeg_picture();
		let mut encoded = picture.as_base64();
		encoded.insert(4, '\n');

		assert!(Picture::from_base64(encoded.as_bytes()).is_err());
	}

	#[test_log::test]
	fn png_dimensions_are_probed() {
		#[rustfmt::skip]
		let mut png = vec![
			0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A,
			0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D', b'R',
			0x00, 0x00, 0x01, 0x00, // width 256
			0x00, 0x00, 0x00, 0x80, // height 128
			0x08, // bit depth
			0x02, // color type: truecolor
		];
		png.extend([0; 16]);

		let picture = Picture::new(PictureType::CoverFront, Some(MimeType::Png), None, png);
		assert_eq!(picture.width(), 256);
		assert_eq!(picture.height(), 128);
		assert_eq!(picture.color_depth(), 24);
	}

	#[test_log::test]
	fn front_cover_detects_mime() {
		let data = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];
		let picture = Picture::front_cover(data).unwrap();

		assert_eq!(picture.pic_type(), PictureType::CoverFront);
		assert_eq!(picture.mime_type(), Some(&MimeType::Png));
	}

	#[test_log::test]
	fn encoded_form_is_standard_base64() {
		let picture = jpeg_picture();
		let encoded = picture.as_base64();

		// Standard padded alphabet, decodable by any RFC 4648 decoder
		assert!(BASE64.decode(encoded.as_bytes()).is_ok());
	}
}
