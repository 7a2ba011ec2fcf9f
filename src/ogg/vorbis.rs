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

// Identification signature (7), version (4), channels (1), sample rate (4),
// and the three bitrate fields (12)
const MIN_IDENT_PACKET_SIZE: usize = 28;

/// Read the tag and properties of an Ogg Vorbis stream
pub(crate) fn read_from<R>(data: &mut R) -> Result<(XiphComment, AudioProperties)>
where
	R: Read + Seek,
{
	let (tag, first_page_header, packets): OggTags =
		super::read::read_from(data, FileFormat::Vorbis)?;

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

	if first_packet.len() < MIN_IDENT_PACKET_SIZE {
		err!(SizeMismatch);
	}

	// Skip identification signature
	let ident_content = &mut &first_packet[7..];

	let _version = ident_content.read_u32::<LittleEndian>()?;

	let channels = ident_content.read_u8()?;
	let sample_rate = ident_content.read_u32::<LittleEndian>()?;

	let _bitrate_maximum = ident_content.read_i32::<LittleEndian>()?;
	let bitrate_nominal = ident_content.read_i32::<LittleEndian>()?;

	properties.channels = Some(channels);
	properties.sample_rate = Some(sample_rate);

	let last_page_header = find_last_page_header(data);
	let file_length = data.seek(SeekFrom::End(0))?;

	// This is used for bitrate calculation, it should be the length in
	// milliseconds, but if we can't determine it then we'll just use 1000.
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
				log::warn!("Vorbis: The file contains invalid PCM values, unable to calculate length");
			}
		} else {
			log::warn!("Vorbis: Sample rate = 0, unable to calculate length");
		}
	}

	if length > 0 {
		properties.overall_bitrate = Some((file_length.saturating_mul(8) / length) as u32);
	}

	if bitrate_nominal > 0 {
		properties.audio_bitrate = Some((bitrate_nominal as u64 / 1000) as u32);
	}

	Ok(properties)
}
