/// View over a string table: a run of delimiter terminated strings which are
/// addressed by their byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Strtab<'a> {
	delim: u8,
	bytes: &'a [u8],
}

impl<'a> Strtab<'a> {
	pub const DEFAULT_DELIM: u8 = b'\0';

	pub fn new(delim: u8, bytes: &'a [u8]) -> Self {
		Self { delim, bytes }
	}

	pub fn len(&self) -> usize {
		self.bytes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.bytes.is_empty()
	}

	/// Returns the bytes from `offset` up to (excluding) the next delimiter.
	///
	/// `None` if `offset` lies outside of the table or no delimiter follows it.
	pub fn get_bytes_off(&self, offset: usize) -> Option<&'a [u8]> {
		let tail = self.bytes.get(offset..)?;
		let len = memchr::memchr(self.delim, tail)?;

		Some(&tail[..len])
	}

	/// Like [`Strtab::get_bytes_off`], but also requires the string to be
	/// valid UTF-8.
	pub fn get_str_off(&self, offset: usize) -> Option<&'a str> {
		core::str::from_utf8(self.get_bytes_off(offset)?).ok()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const SHSTRTAB: &[u8] = b"\0.text\0.metadata\0.shstrtab\0";

	#[test]
	fn lookup_by_offset() {
		let strtab = Strtab::new(Strtab::DEFAULT_DELIM, SHSTRTAB);

		assert_eq!(strtab.get_str_off(0), Some(""));
		assert_eq!(strtab.get_str_off(1), Some(".text"));
		assert_eq!(strtab.get_str_off(7), Some(".metadata"));
		// Suffix sharing, as linkers do
		assert_eq!(strtab.get_str_off(8), Some("metadata"));
		assert_eq!(strtab.get_bytes_off(17), Some(&b".shstrtab"[..]));
	}

	#[test]
	fn offset_outside_of_table() {
		let strtab = Strtab::new(Strtab::DEFAULT_DELIM, SHSTRTAB);

		assert_eq!(strtab.get_bytes_off(SHSTRTAB.len()), None);
		assert_eq!(strtab.get_bytes_off(usize::MAX), None);
	}

	#[test]
	fn missing_terminator() {
		let strtab = Strtab::new(Strtab::DEFAULT_DELIM, b"\0.meta");

		assert_eq!(strtab.get_bytes_off(0), Some(&b""[..]));
		assert_eq!(strtab.get_bytes_off(1), None);
	}

	#[test]
	fn invalid_utf8() {
		let strtab = Strtab::new(Strtab::DEFAULT_DELIM, b"\xff\xfe\0");

		assert_eq!(strtab.get_bytes_off(0), Some(&b"\xff\xfe"[..]));
		assert_eq!(strtab.get_str_off(0), None);
	}

	#[test]
	fn custom_delimiter() {
		let strtab = Strtab::new(b'\n', b"one\ntwo\n");

		assert_eq!(strtab.get_str_off(4), Some("two"));
	}
}
