use super::find_last_page_header;
use super::read::OggTags;
use super::tag::XiphComment;
use crate::error::Result;
use crate::macros::err;
use crate::properties::{AudioProperties, RoundedDivision};
use crate::registry::FileFormat;

use std::io::{Read, Seek, SeekFrom};
use std::time::Duration;

use byteorder::{LittleEndian, ReadBytesExt};
use ogg_pager::{PageHeader, Packets};

// The Speex header is fixed at 80 bytes; the fields read here end at
// offset 56 (bitrate).
const MIN_HEADER_PACKET_SIZE: usize = 64;

/// Read the tag and properties of an Ogg Speex stream
pub(crate) fn read_from<R>(data: &mut R) -> Result<(XiphComment, AudioProperties)>
where
	R: Read + Seek,
{
	let (tag, first_page_header, packets): OggTags =
		super::read::read_from(data, FileFormat::Speex)?;

	let properties = read_properties(data, &first_page_header, &packets)?;

	Ok((tag, properties))
}

fn read_properties<R>(
	data: &mut R,
	first_page_header: &PageHeader,
	packets: &Packets,
) -> Result<AudioProperties>
where
	R: Read + Seek,
{
	let mut properties = AudioProperties::default();

	let Some(first_packet) = packets.get(0) else {
		err!(SizeMismatch);
	};

	if first_packet.len() < MIN_HEADER_PACKET_SIZE {
		err!(SizeMismatch);
	}

	// Skip the signature (8) and the version string (20)
	let header_content = &mut &first_packet[28..];

	let _version_id = header_content.read_i32::<LittleEndian>()?;
	let _header_size = header_content.read_i32::<LittleEndian>()?;

	let sample_rate = header_content.read_u32::<LittleEndian>()?;

	let _mode = header_content.read_i32::<LittleEndian>()?;
	let _mode_bitstream_version = header_content.read_i32::<LittleEndian>()?;

	let channels = header_content.read_i32::<LittleEndian>()?;
	let bitrate = header_content.read_i32::<LittleEndian>()?;

	properties.sample_rate = Some(sample_rate);
	properties.channels = u8::try_from(channels).ok();

	let last_page_header = find_last_page_header(data);
	let file_length = data.seek(SeekFrom::End(0))?;

	let mut length = 1000;
	if let Ok(last_page_header) = last_page_header {
		let first_page_abgp = first_page_header.abgp;
		let last_page_abgp = last_page_header.abgp;

		if sample_rate > 0 {
			let total_samples = u128::from(last_page_abgp.saturating_sub(first_page_abgp));

			if total_samples > 0 {
				length = (total_samples * 1000).div_round(u128::from(sample_rate)) as u64;
				properties.duration = Duration::from_millis(length);
			} else {
				log::warn!("Speex: The file contains invalid PCM values, unable to calculate length");
			}
		} else {
			log::warn!("Speex: Sample rate = 0, unable to calculate length");
		}
	}

	if length > 0 {
		properties.overall_bitrate = Some((file_length.saturating_mul(8) / length) as u32);
	}

	// A bitrate of -1 means the encoder did not record one
	if bitrate > 0 {
		properties.audio_bitrate = Some((bitrate as u64 / 1000) as u32);
	}

	Ok(properties)
}
