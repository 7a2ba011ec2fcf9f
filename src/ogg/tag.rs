use crate::error::Result;
use crate::macros::err;
use crate::picture::Picture;

/// Verify a Xiph comment field name
///
/// Field names are restricted to the printable ASCII range `0x20..=0x7D`,
/// excluding `'='` which terminates the name on the wire.
pub fn verify_key(key: &str) -> bool {
	!key.is_empty()
		&& key
			.chars()
			.all(|ch| (' '..='}').contains(&ch) && ch != '=')
}

/// A decoded Xiph comment block
///
/// This is the wire-level view of the comment packet, a vendor string plus an
/// ordered list of `KEY=value` items. Field names are stored uppercased, and
/// duplicate names are preserved in their original order.
///
/// A single embedded picture travels alongside the items, decoded from the
/// first `METADATA_BLOCK_PICTURE` item encountered.
#[derive(Default, Debug, PartialEq, Eq, Clone)]
pub struct XiphComment {
	/// Vendor string of the encoder that produced the stream
	pub(crate) vendor: String,
	/// The items (key, value) in order of appearance
	pub(crate) items: Vec<(String, String)>,
	/// The embedded front cover, if any
	pub(crate) picture: Option<Picture>,
}

impl XiphComment {
	/// Create an empty comment block
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the vendor string
	pub fn vendor(&self) -> &str {
		&self.vendor
	}

	/// Sets the vendor string
	pub fn set_vendor(&mut self, vendor: String) {
		self.vendor = vendor;
	}

	/// Visit all items in order of appearance
	pub fn items(&self) -> impl Iterator<Item = (&str, &str)> + Clone {
		self.items.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}

	/// Gets the first item with the key, case-sensitively
	pub fn get(&self, key: &str) -> Option<&str> {
		self.items
			.iter()
			.find(|(k, _)| k == key)
			.map(|(_, v)| v.as_str())
	}

	/// Visit all items with the key, case-sensitively
	pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + Clone {
		self.items
			.iter()
			.filter(move |(k, _)| k == key)
			.map(|(_, v)| v.as_str())
	}

	/// Replace all items with the key with a single item
	///
	/// # Errors
	///
	/// The key contains a character outside of `0x20..=0x7D`, or `'='`
	pub fn insert(&mut self, key: String, value: String) -> Result<()> {
		if !verify_key(&key) {
			err!(UnsupportedField);
		}

		self.items.retain(|(k, _)| k != &key);
		self.items.push((key, value));
		Ok(())
	}

	/// Append an item, keeping any existing items with the key
	///
	/// # Errors
	///
	/// The key contains a character outside of `0x20..=0x7D`, or `'='`
	pub fn push(&mut self, key: String, value: String) -> Result<()> {
		if !verify_key(&key) {
			err!(UnsupportedField);
		}

		self.items.push((key, value));
		Ok(())
	}

	/// Remove all items with the key, returning their values
	pub fn remove(&mut self, key: &str) -> impl Iterator<Item = String> + '_ {
		// TODO: drain_filter
		let mut split_idx = 0_usize;

		for read_idx in 0..self.items.len() {
			if self.items[read_idx].0 == key {
				self.items.swap(split_idx, read_idx);
				split_idx += 1;
			}
		}

		self.items.drain(..split_idx).map(|(_, v)| v)
	}

	/// Returns the embedded picture, if any
	pub fn picture(&self) -> Option<&Picture> {
		self.picture.as_ref()
	}

	/// Sets the embedded picture, replacing any existing one
	pub fn set_picture(&mut self, picture: Picture) {
		self.picture = Some(picture);
	}

	/// Removes the embedded picture
	pub fn remove_picture(&mut self) -> Option<Picture> {
		self.picture.take()
	}

	/// Whether the comment block holds no items and no picture
	///
	/// The vendor string is ignored, it is always present on the wire.
	pub fn is_empty(&self) -> bool {
		self.items.is_empty() && self.picture.is_none()
	}
}
