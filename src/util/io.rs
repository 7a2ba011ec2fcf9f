//! File-like abstractions for the writer
//!
//! The comment encoder rewrites a stream in place, which needs truncation on top
//! of the usual `Read + Write + Seek` bounds. `Cursor<Vec<u8>>` is supported so
//! tests can run against in-memory streams.

use std::fs::File;
use std::io::{Read, Seek, Write};

/// Provides a method to truncate an object to the specified length
pub trait Truncate {
	/// Truncate a stream to the specified length
	///
	/// # Errors
	///
	/// * See [`File::set_len`]
	fn truncate(&mut self, new_len: u64) -> std::io::Result<()>;
}

impl Truncate for File {
	fn truncate(&mut self, new_len: u64) -> std::io::Result<()> {
		self.set_len(new_len)
	}
}

impl Truncate for std::io::Cursor<Vec<u8>> {
	fn truncate(&mut self, new_len: u64) -> std::io::Result<()> {
		self.get_mut().truncate(new_len as usize);
		Ok(())
	}
}

impl<T> Truncate for &mut T
where
	T: Truncate,
{
	fn truncate(&mut self, new_len: u64) -> std::io::Result<()> {
		(**self).truncate(new_len)
	}
}

/// The combination of traits the writer needs from a file-like stream
pub trait FileLike: Read + Write + Seek + Truncate {}

impl<T> FileLike for T where T: Read + Write + Seek + Truncate {}
