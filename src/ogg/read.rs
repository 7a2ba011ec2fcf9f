use super::tag::{XiphComment, verify_key};
use super::verify_signature;
use crate::error::Result;
use crate::macros::err;
use crate::picture::{Picture, PictureType};
use crate::registry::FileFormat;

use std::io::{Read, Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt};
use data_encoding::BASE64;
use ogg_pager::{PageHeader, Packets};

pub(crate) const PICTURE_KEY: &str = "METADATA_BLOCK_PICTURE";

// Pre-`METADATA_BLOCK_PICTURE` pictures, just base64 encoded image data
const LEGACY_PICTURE_KEY: &str = "COVERART";
const LEGACY_PICTURE_MIME_KEY: &str = "COVERARTMIME";

/// The result of reading the header packets of an OGG stream
///
/// The header of the first page and the packets are retained for property
/// reading, which is format specific.
pub(crate) type OggTags = (XiphComment, PageHeader, Packets);

/// Decode a Xiph comment block
///
/// `len` is the number of bytes remaining in the packet, used to reject
/// lengths that run past the end of the block.
pub(crate) fn read_comments<R>(data: &mut R, mut len: u64) -> Result<XiphComment>
where
	R: Read,
{
	let mut tag = XiphComment::new();

	let vendor_len = data.read_u32::<LittleEndian>()?;
	if u64::from(vendor_len) > len {
		err!(SizeMismatch);
	}

	let mut vendor = vec![0; vendor_len as usize];
	data.read_exact(&mut vendor)?;
	len = len.saturating_sub(u64::from(vendor_len));

	// The vendor string has no bearing on the fields, so a non UTF-8 one is
	// not worth failing the read over.
	match String::from_utf8(vendor) {
		Ok(vendor) => tag.vendor = vendor,
		Err(_) => {
			log::warn!("Vendor string is not UTF-8, discarding");
		},
	}

	let number_of_items = data.read_u32::<LittleEndian>()?;

	// Each remaining item needs at least a 4 byte length prefix
	if u64::from(number_of_items) > len / 4 {
		err!(SizeMismatch);
	}

	for _ in 0..number_of_items {
		let comment_len = data.read_u32::<LittleEndian>()?;
		if u64::from(comment_len) > len {
			err!(SizeMismatch);
		}

		let mut comment_bytes = vec![0; comment_len as usize];
		data.read_exact(&mut comment_bytes)?;
		len = len.saturating_sub(u64::from(comment_len));

		let Some(split_at) = comment_bytes.iter().position(|&b| b == b'=') else {
			log::warn!("Comment item is missing a `=`, discarding");
			continue;
		};
		let value = &comment_bytes[split_at + 1..];

		let Ok(key) = std::str::from_utf8(&comment_bytes[..split_at]) else {
			log::warn!("Comment key is not UTF-8, discarding the item");
			continue;
		};

		// Keys are case-insensitive, normalize upfront
		let key = key.to_ascii_uppercase();
		if !verify_key(&key) {
			log::warn!("Comment key contains invalid characters, discarding the item");
			continue;
		}

		match key.as_str() {
			PICTURE_KEY => {
				if tag.picture.is_some() {
					log::warn!("Multiple embedded pictures, only the first one is kept");
					continue;
				}

				match Picture::from_base64(value) {
					Ok(picture) => tag.picture = Some(picture),
					Err(err) => {
						// Keep the raw item around so it survives a rewrite
						log::warn!("Unable to decode embedded picture, keeping the raw item: {err}");
						tag.items
							.push((key, String::from_utf8_lossy(value).into_owned()));
					},
				}
			},
			LEGACY_PICTURE_KEY => {
				if tag.picture.is_some() {
					log::warn!("Multiple embedded pictures, only the first one is kept");
					continue;
				}

				match BASE64.decode(value) {
					Ok(data) => {
						let mime_type = Picture::mimetype_from_bin(&data).ok();
						tag.picture = Some(Picture::new(
							PictureType::CoverFront,
							mime_type,
							None,
							data,
						));
					},
					Err(_) => {
						log::warn!("Failed to decode `COVERART`, discarding the item");
					},
				}
			},
			// Belongs to the `COVERART` item, which is converted on read
			LEGACY_PICTURE_MIME_KEY => {},
			_ => match std::str::from_utf8(value) {
				Ok(value) => tag.items.push((key, value.to_owned())),
				Err(_) => {
					log::warn!("Comment value for {key:?} is not UTF-8, discarding the item");
				},
			},
		}
	}

	Ok(tag)
}

/// Read the header packets of an OGG stream, decoding the comment packet
///
/// The stream serial, granule positions, and raw packets are needed later for
/// property reading and must come from the same pass, so they are returned
/// alongside the decoded tag.
pub(crate) fn read_from<T>(data: &mut T, format: FileFormat) -> Result<OggTags>
where
	T: Read + Seek,
{
	let start = data.stream_position()?;
	let first_page_header = PageHeader::read(data)?;
	data.seek(SeekFrom::Start(start))?;

	let packets = Packets::read_count(data, format.header_packet_count())?;

	let Some(ident_packet) = packets.get(0) else {
		err!(SizeMismatch);
	};
	verify_signature(ident_packet, format.ident_signature(), format)?;

	let Some(mut comment_packet) = packets.get(1) else {
		err!(SizeMismatch);
	};

	let comment_signature = format.comment_signature();
	verify_signature(comment_packet, comment_signature, format)?;
	comment_packet = &comment_packet[comment_signature.len()..];

	let len = comment_packet.len() as u64;
	let reader = &mut comment_packet;

	let tag = read_comments(reader, len)?;

	Ok((tag, first_page_header, packets))
}

#[cfg(test)]
mod tests {
	use super::read_comments;
	use crate::error::ErrorKind;
	use crate::ogg::write::create_metadata_packet;
	use crate::picture::Picture;

	use byteorder::{LittleEndian, WriteBytesExt};

	fn comment_block(vendor: &str, items: &[(&str, &str)]) -> Vec<u8> {
		let mut block = Vec::new();
		block
			.write_u32::<LittleEndian>(vendor.len() as u32)
			.unwrap();
		block.extend_from_slice(vendor.as_bytes());
		block
			.write_u32::<LittleEndian>(items.len() as u32)
			.unwrap();
		for (key, value) in items {
			let comment = format!("{key}={value}");
			block
				.write_u32::<LittleEndian>(comment.len() as u32)
				.unwrap();
			block.extend_from_slice(comment.as_bytes());
		}
		block
	}

	#[test_log::test]
	fn keys_are_uppercased() {
		let block = comment_block("vendor", &[("title", "Foo title"), ("Artist", "Bar artist")]);

		let tag = read_comments(&mut &block[..], block.len() as u64).unwrap();
		assert_eq!(tag.vendor(), "vendor");
		assert_eq!(tag.get("TITLE"), Some("Foo title"));
		assert_eq!(tag.get("ARTIST"), Some("Bar artist"));
	}

	#[test_log::test]
	fn duplicate_keys_are_preserved() {
		let block = comment_block("", &[("ARTIST", "Foo"), ("ARTIST", "Bar")]);

		let tag = read_comments(&mut &block[..], block.len() as u64).unwrap();
		assert_eq!(tag.get_all("ARTIST").collect::<Vec<_>>(), ["Foo", "Bar"]);
	}

	#[test_log::test]
	fn items_without_separator_are_skipped() {
		let block = comment_block("", &[("TITLE", "Foo title")]);

		// Rewrite the second item without a `=`
		let mut block = block;
		block[8..12].copy_from_slice(&9_u32.to_le_bytes());
		block.truncate(12);
		block.extend_from_slice(b"NOEQUALS!");
		block[4..8].copy_from_slice(&1_u32.to_le_bytes());

		let tag = read_comments(&mut &block[..], block.len() as u64).unwrap();
		assert!(tag.is_empty());
	}

	#[test_log::test]
	fn oversized_lengths_are_rejected() {
		let mut block = Vec::new();
		block.extend_from_slice(&u32::MAX.to_le_bytes());
		block.extend_from_slice(b"vendor");

		let err = read_comments(&mut &block[..], block.len() as u64).unwrap_err();
		assert!(matches!(err.kind(), ErrorKind::SizeMismatch));
	}

	#[test_log::test]
	fn oversized_item_count_is_rejected() {
		let mut block = Vec::new();
		block.extend_from_slice(&0_u32.to_le_bytes());
		block.extend_from_slice(&u32::MAX.to_le_bytes());

		let err = read_comments(&mut &block[..], block.len() as u64).unwrap_err();
		assert!(matches!(err.kind(), ErrorKind::SizeMismatch));
	}

	#[test_log::test]
	fn only_first_picture_is_decoded() {
		let jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F'];
		let picture_one = Picture::front_cover(jpeg.clone()).unwrap();
		let picture_two = Picture::front_cover(jpeg).unwrap();

		let block = comment_block(
			"",
			&[
				("METADATA_BLOCK_PICTURE", &picture_one.as_base64()),
				("METADATA_BLOCK_PICTURE", &picture_two.as_base64()),
			],
		);

		let tag = read_comments(&mut &block[..], block.len() as u64).unwrap();
		assert!(tag.picture().is_some());
		assert!(tag.get("METADATA_BLOCK_PICTURE").is_none());
	}

	#[test_log::test]
	fn legacy_coverart_is_converted() {
		use data_encoding::BASE64;

		let jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F'];
		let encoded = BASE64.encode(&jpeg);

		let block = comment_block(
			"",
			&[("COVERART", &encoded), ("COVERARTMIME", "image/jpeg")],
		);

		let tag = read_comments(&mut &block[..], block.len() as u64).unwrap();

		let picture = tag.picture().expect("expected a converted cover");
		assert_eq!(picture.data(), &jpeg[..]);
		assert_eq!(picture.mime_type(), Some(&crate::picture::MimeType::Jpeg));

		// The legacy items are consumed by the conversion
		assert!(tag.get("COVERART").is_none());
		assert!(tag.get("COVERARTMIME").is_none());
	}

	#[test_log::test]
	fn coverart_yields_to_metadata_block_picture() {
		use data_encoding::BASE64;

		let jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F'];
		let modern = Picture::front_cover(jpeg.clone()).unwrap();

		let png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];
		let legacy = BASE64.encode(&png);

		let block = comment_block(
			"",
			&[
				("METADATA_BLOCK_PICTURE", &modern.as_base64()),
				("COVERART", &legacy),
			],
		);

		let tag = read_comments(&mut &block[..], block.len() as u64).unwrap();

		let picture = tag.picture().expect("expected a front cover");
		assert_eq!(picture.data(), &jpeg[..]);
	}

	#[test_log::test]
	fn undecodable_picture_is_kept_as_raw_item() {
		let block = comment_block("", &[("METADATA_BLOCK_PICTURE", "QUJD")]);

		let tag = read_comments(&mut &block[..], block.len() as u64).unwrap();
		assert!(tag.picture().is_none());
		assert_eq!(tag.get("METADATA_BLOCK_PICTURE"), Some("QUJD"));
	}

	#[test_log::test]
	fn packet_round_trip() {
		let mut tag = crate::ogg::XiphComment::new();
		tag.set_vendor(String::from("oggmeta"));
		tag.push(String::from("TITLE"), String::from("Foo title"))
			.unwrap();
		tag.push(String::from("ARTIST"), String::from("Bar artist"))
			.unwrap();

		let items = tag.items().map(|(k, v)| (k.to_owned(), v.to_owned())).collect::<Vec<_>>();
		let packet = create_metadata_packet(tag.vendor(), &items, None, &[], false).unwrap();

		let len = packet.len() as u64;
		let read_back = read_comments(&mut &packet[..], len).unwrap();
		assert_eq!(read_back, tag);
	}
}
