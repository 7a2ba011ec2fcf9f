/// The identification header signature for an Ogg Vorbis stream
pub(crate) const VORBIS_IDENT_HEAD: &[u8] = &[1, b'v', b'o', b'r', b'b', b'i', b's'];

/// The comment header signature for an Ogg Vorbis stream
pub(crate) const VORBIS_COMMENT_HEAD: &[u8] = &[3, b'v', b'o', b'r', b'b', b'i', b's'];

/// The header packet signature for an Ogg Speex stream
///
/// Note the two trailing spaces, they are part of the signature.
pub(crate) const SPEEXHEADER: &[u8] = b"Speex   ";
