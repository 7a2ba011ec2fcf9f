use super::key::MetadataKey;
use crate::ogg::XiphComment;
use crate::picture::Picture;

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// A single metadata value
///
/// Numeric fields (track/disc positions and totals, BPM) carry parsed
/// integers, everything else is text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataValue {
	Text(String),
	Number(u32),
}

impl MetadataValue {
	/// Returns the text content, if this is a text value
	pub fn text(&self) -> Option<&str> {
		match self {
			MetadataValue::Text(text) => Some(text),
			MetadataValue::Number(_) => None,
		}
	}

	/// Returns the numeric content, if this is a numeric value
	pub fn number(&self) -> Option<u32> {
		match self {
			MetadataValue::Text(_) => None,
			MetadataValue::Number(number) => Some(*number),
		}
	}
}

impl Display for MetadataValue {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			MetadataValue::Text(text) => write!(f, "{text}"),
			MetadataValue::Number(number) => write!(f, "{number}"),
		}
	}
}

/// An immutable snapshot of a file's metadata
///
/// Fields with a [`MetadataKey`] mapping live in `fields`; everything else is
/// carried verbatim in `unknown` so a rewrite never drops fields it does not
/// understand.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct MetadataDict {
	pub(crate) fields: BTreeMap<MetadataKey, MetadataValue>,
	pub(crate) unknown: Vec<(String, String)>,
	pub(crate) picture: Option<Picture>,
}

impl MetadataDict {
	/// Gets the value for a key
	pub fn get(&self, key: MetadataKey) -> Option<&MetadataValue> {
		self.fields.get(&key)
	}

	/// Visit all mapped fields
	pub fn fields(&self) -> impl Iterator<Item = (MetadataKey, &MetadataValue)> {
		self.fields.iter().map(|(k, v)| (*k, v))
	}

	/// The unmapped items, in their original order
	pub fn unknown(&self) -> &[(String, String)] {
		&self.unknown
	}

	/// The embedded front cover, if any
	pub fn picture(&self) -> Option<&Picture> {
		self.picture.as_ref()
	}

	/// Whether the snapshot holds no fields, no unmapped items, and no picture
	pub fn is_empty(&self) -> bool {
		self.fields.is_empty() && self.unknown.is_empty() && self.picture.is_none()
	}

	/// Map a decoded comment block into a snapshot
	///
	/// Text fields that appear multiple times are joined with newlines.
	/// Numeric fields keep their first parseable occurrence; a value that
	/// does not start with a decimal integer is passed through as an
	/// unmapped item instead of being dropped.
	pub(crate) fn from_comment(tag: XiphComment) -> Self {
		let mut dict = MetadataDict {
			picture: tag.picture,
			..MetadataDict::default()
		};

		for (key, value) in tag.items {
			let Some(mapped) = MetadataKey::from_xiph_key(&key) else {
				dict.unknown.push((key, value));
				continue;
			};

			if !mapped.is_numeric() {
				dict.fields
					.entry(mapped)
					.and_modify(|existing| {
						if let MetadataValue::Text(text) = existing {
							text.push('\n');
							text.push_str(&value);
						}
					})
					.or_insert_with(|| MetadataValue::Text(value));
				continue;
			}

			// `"N/M"` style combined position/total values
			let (position, total) = match value.split_once('/') {
				Some((position, total)) if mapped.total_counterpart().is_some() => {
					(position, Some(total))
				},
				_ => (value.as_str(), None),
			};

			let Some(position) = parse_leading_u32(position) else {
				// Vinyl-style track ids ("A1") and the like
				dict.unknown.push((key, value));
				continue;
			};

			dict.fields
				.entry(mapped)
				.or_insert(MetadataValue::Number(position));

			if let (Some(total), Some(total_key)) = (total, mapped.total_counterpart()) {
				if let Some(total) = parse_leading_u32(total) {
					dict.fields
						.entry(total_key)
						.or_insert(MetadataValue::Number(total));
				}
			}
		}

		dict
	}

	/// Flatten the snapshot back into comment items
	///
	/// Multi-line text values are split back into one item per line, and
	/// positions/totals are written as separate plain decimal fields.
	pub(crate) fn to_comment_items(&self) -> Vec<(String, String)> {
		let mut items = Vec::new();

		for (key, value) in &self.fields {
			let name = key.as_xiph_key();

			match value {
				MetadataValue::Text(text) => {
					for line in text.split('\n') {
						items.push((name.to_owned(), line.to_owned()));
					}
				},
				MetadataValue::Number(number) => {
					items.push((name.to_owned(), number.to_string()));
				},
			}
		}

		items.extend(self.unknown.iter().cloned());
		items
	}
}

fn parse_leading_u32(value: &str) -> Option<u32> {
	let digits = value
		.trim_start()
		.split(|c: char| !c.is_ascii_digit())
		.next()?;

	digits.parse().ok()
}
