//! Decoding of the `.metadata` section.
//!
//! The section holds a run of NUL-terminated strings without a count. The run
//! ends at the first empty string, or at the end of the section if the last
//! string ends exactly on the boundary.

use crate::error::{Error, ErrorKind, Result};
use crate::strtab::Strtab;

/// Name of the section dumped by default.
pub const SECTION_NAME: &str = ".metadata";

/// Iterator over the strings of a metadata section.
///
/// Yields each string without its terminator. A string that is not
/// terminated inside the section yields [`ErrorKind::MalformedSection`], after
/// which the iterator is exhausted.
#[derive(Debug, Clone)]
pub struct Strings<'a> {
	strtab: Strtab<'a>,
	file_offset: u64,
	pos: usize,
	done: bool,
}

impl<'a> Strings<'a> {
	/// Decodes `data`, the section bytes found at `file_offset` in the image.
	pub fn new(data: &'a [u8], file_offset: u64) -> Self {
		Self {
			strtab: Strtab::new(Strtab::DEFAULT_DELIM, data),
			file_offset,
			pos: 0,
			done: false,
		}
	}
}

impl<'a> Iterator for Strings<'a> {
	type Item = Result<&'a [u8]>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.done || self.pos >= self.strtab.len() {
			self.done = true;
			return None;
		}

		match self.strtab.get_bytes_off(self.pos) {
			Some([]) => {
				self.done = true;
				None
			}
			Some(string) => {
				self.pos += string.len() + 1;
				Some(Ok(string))
			}
			None => {
				self.done = true;
				Some(Err(Error::new(ErrorKind::MalformedSection(
					self.file_offset + self.pos as u64,
				))))
			}
		}
	}
}

impl core::iter::FusedIterator for Strings<'_> {}

/// Encodes `strings` the way [`Strings`] decodes them: each string followed
/// by a NUL, then one more NUL closing the run.
///
/// Strings must not contain NUL bytes themselves.
#[cfg(feature = "std")]
pub fn encode<I>(strings: I) -> Vec<u8>
where
	I: IntoIterator,
	I::Item: AsRef<[u8]>,
{
	let mut data = Vec::new();
	for string in strings {
		let string = string.as_ref();
		debug_assert!(!string.contains(&0), "embedded NUL in {string:?}");

		data.extend_from_slice(string);
		data.push(0);
	}
	data.push(0);
	data
}

#[cfg(all(test, feature = "std"))]
mod tests {
	use super::*;

	fn decode(data: &[u8]) -> Result<Vec<&[u8]>> {
		Strings::new(data, 0x100).collect()
	}

	#[test]
	fn stops_at_empty_string() {
		assert_eq!(decode(b"a\0bb\0\0"), Ok(vec![&b"a"[..], b"bb"]));
		assert_eq!(decode(b"a\0\0ignored\0\0"), Ok(vec![&b"a"[..]]));
	}

	#[test]
	fn empty_section() {
		assert_eq!(decode(b"\0"), Ok(vec![]));
		assert_eq!(decode(b"\0garbage"), Ok(vec![]));
		assert_eq!(decode(b""), Ok(vec![]));
	}

	#[test]
	fn ends_on_section_boundary() {
		assert_eq!(decode(b"a\0bb\0"), Ok(vec![&b"a"[..], b"bb"]));
	}

	#[test]
	fn unterminated_string() {
		let mut strings = Strings::new(b"a\0bb", 0x100);

		assert_eq!(strings.next(), Some(Ok(&b"a"[..])));
		assert_eq!(
			strings.next().unwrap().unwrap_err().kind,
			ErrorKind::MalformedSection(0x102)
		);
		assert_eq!(strings.next(), None);
	}

	#[test]
	fn round_trip() {
		let list = ["Name: demo", "Version: 1.0", "", "x"];
		// The empty entry terminates the run, so only what precedes it survives.
		let data = encode(&list);
		assert_eq!(decode(&data), Ok(vec![&b"Name: demo"[..], b"Version: 1.0"]));

		let list = ["Name: demo", "Version: 1.0", "Summary: ünïcode"];
		let data = encode(list);
		let decoded = decode(&data).unwrap();
		assert_eq!(decoded, list.map(str::as_bytes));
	}
}
