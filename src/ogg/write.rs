use super::read::PICTURE_KEY;
use super::verify_signature;
use crate::error::{Error, ErrorKind, Result};
use crate::macros::err;
use crate::picture::Picture;
use crate::registry::FileFormat;
use crate::util::io::FileLike;

use std::io::{Cursor, Read, Seek, SeekFrom, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use ogg_pager::{CONTAINS_FIRST_PAGE_OF_BITSTREAM, Page, PageHeader, Packets};

/// Replace the comment packet of an OGG stream
///
/// The new stream is composed in memory first; only once every page has been
/// rebuilt successfully does the file get touched. An I/O failure during that
/// final step surfaces as [`ErrorKind::WriteFailed`], anything before it means
/// the file was left untouched.
pub(crate) fn write_to<F>(
	file: &mut F,
	format: FileFormat,
	items: &[(String, String)],
	picture: Option<&Picture>,
) -> Result<()>
where
	F: FileLike,
{
	// Read the first page header to get the stream serial number
	let start = file.stream_position()?;
	let first_page_header = PageHeader::read(file)?;

	let stream_serial = first_page_header.stream_serial;

	file.seek(SeekFrom::Start(start))?;
	let mut packets = Packets::read_count(file, format.header_packet_count())?;

	let mut remaining_file_content = Vec::new();
	file.read_to_end(&mut remaining_file_content)?;

	let Some(ident_packet) = packets.get(0) else {
		err!(SizeMismatch);
	};
	verify_signature(ident_packet, format.ident_signature(), format)?;

	let Some(comment_packet) = packets.get(1) else {
		err!(SizeMismatch);
	};

	let comment_signature = format.comment_signature();
	verify_signature(comment_packet, comment_signature, format)?;

	// Retain the file's vendor string
	let md_reader = &mut &comment_packet[comment_signature.len()..];

	let vendor_len = md_reader.read_u32::<LittleEndian>()?;
	if vendor_len as usize > md_reader.len() {
		err!(SizeMismatch);
	}

	let mut vendor = vec![0; vendor_len as usize];
	md_reader.read_exact(&mut vendor)?;

	let vendor = match String::from_utf8(vendor) {
		Ok(vendor) => vendor,
		Err(_) => {
			log::warn!("Vendor string is not valid UTF-8, not re-using");
			String::new()
		},
	};

	let add_framing_bit = format == FileFormat::Vorbis;
	let new_metadata_packet =
		create_metadata_packet(&vendor, items, picture, comment_signature, add_framing_bit)?;

	// Replace the old comment packet
	packets.set(1, new_metadata_packet);

	let mut new_stream = Cursor::new(Vec::new());
	let pages_written =
		packets.write_to(&mut new_stream, stream_serial, 0, CONTAINS_FIRST_PAGE_OF_BITSTREAM)?
			as u32;

	// Correct all remaining page sequence numbers
	let mut pages_reader = Cursor::new(&remaining_file_content[..]);
	let mut idx = 0;
	while let Ok(mut page) = Page::read(&mut pages_reader) {
		let header = page.header_mut();
		header.sequence_number = pages_written + idx;
		page.gen_crc();
		new_stream.write_all(&page.as_bytes())?;

		idx += 1;
	}

	persist(file, start, new_stream.get_ref())
		.map_err(|_| Error::new(ErrorKind::WriteFailed))?;

	Ok(())
}

fn persist<F>(file: &mut F, start: u64, content: &[u8]) -> std::io::Result<()>
where
	F: FileLike,
{
	file.seek(SeekFrom::Start(start))?;
	file.truncate(start)?;
	file.write_all(content)?;
	file.flush()
}

/// Encode a comment packet from its parts
///
/// For Speex, `comment_signature` is empty and `add_framing_bit` is `false`,
/// the packet then starts directly with the vendor length.
pub(crate) fn create_metadata_packet(
	vendor: &str,
	items: &[(String, String)],
	picture: Option<&Picture>,
	comment_signature: &[u8],
	add_framing_bit: bool,
) -> Result<Vec<u8>> {
	let mut new_comment_packet = Cursor::new(Vec::new());

	let vendor_bytes = vendor.as_bytes();
	new_comment_packet.write_all(comment_signature)?;
	new_comment_packet.write_u32::<LittleEndian>(vendor_bytes.len() as u32)?;
	new_comment_packet.write_all(vendor_bytes)?;

	// Zero out the item count for later
	let item_count_pos = new_comment_packet.stream_position()?;
	new_comment_packet.write_u32::<LittleEndian>(0)?;

	let mut count = 0;
	create_comments(&mut new_comment_packet, &mut count, items)?;
	if let Some(picture) = picture {
		create_picture(&mut new_comment_packet, &mut count, picture)?;
	}

	// Seek back and write the item count
	new_comment_packet.seek(SeekFrom::Start(item_count_pos))?;
	new_comment_packet.write_u32::<LittleEndian>(count)?;

	if add_framing_bit {
		// OGG Vorbis makes use of a "framing bit" to
		// separate the header packets
		//
		// https://xiph.org/vorbis/doc/Vorbis_I_spec.html#x1-590004
		new_comment_packet.get_mut().push(1);
	}

	Ok(new_comment_packet.into_inner())
}

fn create_comments(
	packet: &mut impl Write,
	count: &mut u32,
	items: &[(String, String)],
) -> Result<()> {
	for (k, v) in items {
		if v.is_empty() {
			continue;
		}

		let comment = format!("{k}={v}");
		let comment_bytes = comment.as_bytes();

		let Ok(bytes_len) = u32::try_from(comment_bytes.len()) else {
			err!(TooMuchData);
		};

		*count += 1;

		packet.write_u32::<LittleEndian>(bytes_len)?;
		packet.write_all(comment_bytes)?;
	}

	Ok(())
}

fn create_picture(packet: &mut impl Write, count: &mut u32, picture: &Picture) -> Result<()> {
	let comment = format!("{PICTURE_KEY}={}", picture.as_base64());
	let comment_bytes = comment.as_bytes();

	let Ok(bytes_len) = u32::try_from(comment_bytes.len()) else {
		err!(TooMuchData);
	};

	*count += 1;

	packet.write_u32::<LittleEndian>(bytes_len)?;
	packet.write_all(comment_bytes)?;

	Ok(())
}
