// Enable/disable `no_std` depending on the feature
#![cfg_attr(not(any(feature = "std", test)), no_std)]

//! Bounds-checked reader for ELF images.
//!
//! References:
//!     - <https://refspecs.linuxbase.org/elf/elf.pdf>
//!     - <http://www.sco.com/developers/gabi/2000-07-17/ch4.sheader.html>
//!     - <https://en.wikipedia.org/wiki/Executable_and_Linkable_Format>

#[macro_use]
mod macros;

pub(crate) mod bytes;

pub mod elf;
pub mod header;
pub mod metadata;
pub mod section_header;
pub mod strtab;

#[cfg(feature = "std")]
pub mod mmap;
#[cfg(feature = "std")]
pub mod writer;

pub mod error {
	use core::fmt;

	use crate::header::Class;

	pub type Result<T, E = Error> = core::result::Result<T, E>;

	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
	pub enum ErrorKind {
		#[error(
			"Not enough bytes found to parse: need {needed}, found {available}"
		)]
		InsufficientSize { needed: usize, available: usize },

		#[error("Bad ident sequence {0:02x?}, not an ELF file?")]
		InvalidMagic([u8; 4]),

		#[error("Found unknown class {0} in field `e_ident[EI_CLASS]`")]
		UnknownClass(u8),

		#[error("Found unknown endianness {0} in field `e_ident[EI_DATA]`")]
		UnknownEndianness(u8),

		#[error("32/64 mismatch: elfclass is {found} but expected {expected}")]
		ClassMismatch { found: Class, expected: Class },

		#[error(
			"Section header entry size {found} is smaller than the {needed} bytes of the layout"
		)]
		InvalidEntrySize { found: u16, needed: usize },

		#[error("Section index {index} is out of range ({count} sections)")]
		InvalidSectionIndex { index: u64, count: u64 },

		#[error("Section {0} is not a string table")]
		NotStringTable(u64),

		#[error(
			"Range {offset:#x}+{len:#x} lies outside of the {available:#x} byte image"
		)]
		OutOfBounds { offset: u64, len: u64, available: usize },

		#[error("Unterminated string at file offset {0:#x}")]
		MalformedSection(u64),
	}

	#[derive(Debug, Clone, PartialEq, Eq, Hash)]
	#[cfg_attr(not(feature = "std"), derive(Copy))]
	pub struct Error {
		pub kind: ErrorKind,
		#[cfg(feature = "std")]
		pub message: Option<String>,
	}

	impl Error {
		pub(crate) fn new(kind: ErrorKind) -> Self {
			Self {
				kind,
				#[cfg(feature = "std")]
				message: None,
			}
		}

		#[cfg(feature = "std")]
		pub(crate) fn with_message(
			mut self,
			message: impl fmt::Display,
		) -> Self {
			self.message = Some(message.to_string());
			self
		}
	}

	impl From<ErrorKind> for Error {
		fn from(kind: ErrorKind) -> Self {
			Self::new(kind)
		}
	}

	impl fmt::Display for Error {
		fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
			#[cfg(feature = "std")]
			let message = self.message.as_deref();
			#[cfg(not(feature = "std"))]
			let message: Option<&str> = None;

			match message {
				Some(message) => write!(f, "{}: {}", message, self.kind),
				None => fmt::Display::fmt(&self.kind, f),
			}
		}
	}

	impl core::error::Error for Error {}

}
