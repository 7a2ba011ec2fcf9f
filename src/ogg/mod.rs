//! Xiph comment support for Ogg container formats

pub(crate) mod constants;
pub(crate) mod read;
pub(crate) mod speex;
pub(crate) mod tag;
pub(crate) mod vorbis;
pub(crate) mod write;

use crate::error::{Error, ErrorKind, Result};
use crate::registry::FileFormat;

use std::io::{Read, Seek, SeekFrom};

use ogg_pager::{MAX_CONTENT_SIZE, PageError, PageHeader};

pub use tag::XiphComment;

impl FileFormat {
	/// The signature expected at the start of the identification packet
	pub(crate) fn ident_signature(self) -> &'static [u8] {
		match self {
			FileFormat::Vorbis => constants::VORBIS_IDENT_HEAD,
			FileFormat::Speex => constants::SPEEXHEADER,
		}
	}

	/// The signature expected at the start of the comment packet
	///
	/// Speex comment packets have no signature, the packet starts directly
	/// with the vendor length.
	pub(crate) fn comment_signature(self) -> &'static [u8] {
		match self {
			FileFormat::Vorbis => constants::VORBIS_COMMENT_HEAD,
			FileFormat::Speex => &[],
		}
	}

	/// The number of header packets preceding the audio data
	pub(crate) fn header_packet_count(self) -> isize {
		match self {
			// Identification, comment, setup
			FileFormat::Vorbis => 3,
			// Header, comment
			FileFormat::Speex => 2,
		}
	}
}

fn verify_signature(content: &[u8], sig: &[u8], format: FileFormat) -> Result<()> {
	let sig_len = sig.len();

	if content.len() < sig_len || &content[..sig_len] != sig {
		return Err(Error::new(ErrorKind::NotAValidFile(format.name())));
	}

	Ok(())
}

/// Find the header of the last page in the OGG stream.
///
/// The position of the reader afterwards is not guaranteed.
fn find_last_page_header<R>(data: &mut R) -> Result<PageHeader>
where
	R: Read + Seek,
{
	// A page can span at most a header (27 bytes), a full segment table, and
	// 255 maximally sized segments.
	const MAX_PAGE_SIZE: u64 = (27 + 255 + MAX_CONTENT_SIZE) as u64;

	let file_end = data.seek(SeekFrom::End(0))?;
	let tail_len = file_end.min(MAX_PAGE_SIZE);
	let tail_start = file_end - tail_len;

	data.seek(SeekFrom::Start(tail_start))?;

	let mut tail = vec![0; tail_len as usize];
	data.read_exact(&mut tail)?;

	let mut search_end = tail.len();
	while let Some(pos) = tail[..search_end].windows(4).rposition(|w| w == b"OggS") {
		data.seek(SeekFrom::Start(tail_start + pos as u64))?;
		match PageHeader::read(data) {
			Ok(header) => return Ok(header),
			// False positive, keep searching
			Err(
				PageError::MissingMagic | PageError::InvalidVersion | PageError::BadSegmentCount,
			) => {
				search_end = pos;
				continue;
			},
			Err(err) => return Err(err.into()),
		}
	}

	Err(PageError::MissingMagic.into())
}
