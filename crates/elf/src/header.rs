/// References:
///     - <https://refspecs.linuxbase.org/elf/elf.pdf>
///     - <http://www.sco.com/developers/gabi/2000-07-17/ch4.eheader.html>
///     - <https://en.wikipedia.org/wiki/Executable_and_Linkable_Format>
pub mod consts {
	pub mod ident {
		/// Size of the `e_ident` array.
		pub const EI_NIDENT: usize = 16;

		/// Magic constant `\x7fELF` stored in `ei_mag0..=ei_mag3`.
		pub const ELF_MAGIC: [u8; 4] = [0x7f, 0x45, 0x4c, 0x46];

		pub mod index {
			/// Field `ei_mag0`: Magic constant `0x7f`.
			pub const EI_MAG0: usize = 0;

			/// Field `ei_class`: Signifies the 32- or 64-bit format.
			pub const EI_CLASS: usize = 4;

			/// Field `ei_data`: Signifies the little or big endianness.
			pub const EI_DATA: usize = 5;

			/// Field `ei_version`: Specifies the version of ELF.
			pub const EI_VERSION: usize = 6;

			/// Field `ei_osabi`: Identifies the target operating system abi.
			pub const EI_OSABI: usize = 7;

			/// Field `ei_abiversion`: Specifies the abi version.
			pub const EI_ABIVERSION: usize = 8;
		}

		pub mod class {
			/// Field `ei_class`: Signifies 32-bit format.
			pub const EI_CLASS_32: u8 = 1;

			/// Field `ei_class`: Signifies 64-bit format.
			pub const EI_CLASS_64: u8 = 2;
		}

		pub mod data {
			/// Field `ei_data`: Signifies little endianness.
			pub const EI_DATA_LE: u8 = 1;

			/// Field `ei_data`: Signifies big endianness.
			pub const EI_DATA_BE: u8 = 2;
		}

		pub mod version {
			/// Field `ei_version`: Original and current version.
			pub const EI_VERSION_CURRENT: u8 = 1;
		}
	}

	pub mod typ {
		/// Field `e_type`: ET_NONE.
		pub const E_TYPE_ET_NONE: u16 = 0x0000;

		/// Field `e_type`: ET_REL.
		pub const E_TYPE_ET_REL: u16 = 0x0001;

		/// Field `e_type`: ET_EXEC.
		pub const E_TYPE_ET_EXEC: u16 = 0x0002;

		/// Field `e_type`: ET_DYN.
		pub const E_TYPE_ET_DYN: u16 = 0x0003;

		/// Field `e_type`: ET_CORE.
		pub const E_TYPE_ET_CORE: u16 = 0x0004;
	}
}

mod stringify {
	#[rustfmt::skip]
	pub fn e_type_as_str(e_type: u16) -> &'static str {
		match e_type {
			crate::header::consts::typ::E_TYPE_ET_NONE => "ET_NONE",
			crate::header::consts::typ::E_TYPE_ET_REL => "ET_REL",
			crate::header::consts::typ::E_TYPE_ET_EXEC => "ET_EXEC",
			crate::header::consts::typ::E_TYPE_ET_DYN => "ET_DYN",
			crate::header::consts::typ::E_TYPE_ET_CORE => "ET_CORE",
			_ => "UNKNOWN",
		}
	}
}

use core::fmt;

use crate::error::{Error, ErrorKind, Result};

/// Address width of an image, from `e_ident[EI_CLASS]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Class {
	Elf32,
	Elf64,
}

impl TryFrom<u8> for Class {
	type Error = Error;

	fn try_from(ei_class: u8) -> Result<Self> {
		match ei_class {
			consts::ident::class::EI_CLASS_32 => Ok(Self::Elf32),
			consts::ident::class::EI_CLASS_64 => Ok(Self::Elf64),
			_ => Err(Error::new(ErrorKind::UnknownClass(ei_class))),
		}
	}
}

impl From<Class> for u8 {
	fn from(class: Class) -> Self {
		match class {
			Class::Elf32 => consts::ident::class::EI_CLASS_32,
			Class::Elf64 => consts::ident::class::EI_CLASS_64,
		}
	}
}

impl fmt::Display for Class {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Elf32 => f.write_str("32-bit"),
			Self::Elf64 => f.write_str("64-bit"),
		}
	}
}

/// Byte order of every multi-byte field, from `e_ident[EI_DATA]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endianness {
	Little,
	Big,
}

impl TryFrom<u8> for Endianness {
	type Error = Error;

	fn try_from(ei_data: u8) -> Result<Self> {
		match ei_data {
			consts::ident::data::EI_DATA_LE => Ok(Self::Little),
			consts::ident::data::EI_DATA_BE => Ok(Self::Big),
			_ => Err(Error::new(ErrorKind::UnknownEndianness(ei_data))),
		}
	}
}

impl From<Endianness> for u8 {
	fn from(endianness: Endianness) -> Self {
		match endianness {
			Endianness::Little => consts::ident::data::EI_DATA_LE,
			Endianness::Big => consts::ident::data::EI_DATA_BE,
		}
	}
}

impl fmt::Display for Endianness {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Little => f.write_str("little-endian"),
			Self::Big => f.write_str("big-endian"),
		}
	}
}

#[repr(C)]
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ident(pub [u8; consts::ident::EI_NIDENT]);

impl Ident {
	/// Reads the identification bytes at the start of `bytes`.
	///
	/// The magic is checked before anything else, so a short or foreign file
	/// is always reported as [`ErrorKind::InvalidMagic`].
	pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
		let mut magic = [0u8; 4];
		let available = bytes.len().min(magic.len());
		magic[..available].copy_from_slice(&bytes[..available]);

		if available < magic.len() || magic != consts::ident::ELF_MAGIC {
			return Err(Error::new(ErrorKind::InvalidMagic(magic)));
		}

		let mut ident = [0u8; consts::ident::EI_NIDENT];
		let head = bytes.get(..ident.len()).ok_or_else(|| {
			Error::new(ErrorKind::InsufficientSize {
				needed: consts::ident::EI_NIDENT,
				available: bytes.len(),
			})
		})?;
		ident.copy_from_slice(head);

		Ok(Self(ident))
	}

	pub fn ei_mag(&self) -> &[u8] {
		&self.0[consts::ident::index::EI_MAG0..consts::ident::index::EI_CLASS]
	}

	pub fn ei_class(&self) -> u8 {
		self.0[consts::ident::index::EI_CLASS]
	}

	pub fn ei_data(&self) -> u8 {
		self.0[consts::ident::index::EI_DATA]
	}

	pub fn ei_version(&self) -> u8 {
		self.0[consts::ident::index::EI_VERSION]
	}

	pub fn ei_osabi(&self) -> u8 {
		self.0[consts::ident::index::EI_OSABI]
	}

	pub fn ei_abiversion(&self) -> u8 {
		self.0[consts::ident::index::EI_ABIVERSION]
	}

	pub fn class(&self) -> Result<Class> {
		Class::try_from(self.ei_class())
	}

	pub fn endianness(&self) -> Result<Endianness> {
		Endianness::try_from(self.ei_data())
	}
}

macro_rules! header {
	( $size:ty, $class:expr ) => {
		#[repr(C)]
		#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
		pub struct Header {
			/// Field `e_ident`: Identifiers.
			pub e_ident: crate::header::Ident,

			/// Field `e_type`: Identifies object file type.
			pub e_type: u16,

			/// Field `e_machine`: Specifies a target instruction set architecture.
			pub e_machine: u16,

			/// Field `e_version`: Specifies the version of elf (`1` for the original version).
			pub e_version: u32,

			/// Field `e_entry`: Memory address of the entry point.
			pub e_entry: $size,

			/// Field `e_phoff`: Points to the start of the program header table.
			pub e_phoff: $size,

			/// Field `e_shoff`: Points to the start of the section header table.
			pub e_shoff: $size,

			/// Field `e_flags`: Flags (interpretation of the field depends on the target
			/// architecture).
			pub e_flags: u32,

			/// Field `e_ehsize`: Contains the size of this [`Header`].
			pub e_ehsize: u16,

			/// Field `e_phentsize`: Contains the size of a program header table entry.
			pub e_phentsize: u16,

			/// Field `e_phnum`: Contains the number of entries in the program header table.
			pub e_phnum: u16,

			/// Field `e_shentsize`: Contains the size of a section header table entry.
			pub e_shentsize: u16,

			/// Field `e_shnum`: Contains the number of entries in the section header table.
			pub e_shnum: u16,

			/// Field `e_shstrndx`: Contains index of the section header table entry that
			/// contains the section names.
			pub e_shstrndx: u16,
		}

		impl Header {
			/// Address width this layout describes.
			pub const CLASS: crate::header::Class = $class;

			/// Size of the on-disk layout.
			pub const SIZE: usize = core::mem::size_of::<Self>();

			#[allow(unused_assignments)]
			pub fn from_bytes(mut bytes: &[u8]) -> crate::error::Result<Self> {
				use crate::error::{Error, ErrorKind};

				let e_ident = crate::header::Ident::from_bytes(bytes)?;

				let found = e_ident.class()?;
				if found != Self::CLASS {
					return Err(Error::new(ErrorKind::ClassMismatch {
						found,
						expected: Self::CLASS,
					}));
				}

				let endianness = e_ident.endianness()?;

				if bytes.len() < Self::SIZE {
					return Err(Error::new(ErrorKind::InsufficientSize {
						needed: Self::SIZE,
						available: bytes.len(),
					}));
				}

				let _: [u8; crate::header::consts::ident::EI_NIDENT] =
					consume!(bytes, crate::header::consts::ident::EI_NIDENT);

				Ok(Self {
					e_ident,
					e_type: consume!(bytes, endianness => u16),
					e_machine: consume!(bytes, endianness => u16),
					e_version: consume!(bytes, endianness => u32),
					e_entry: consume!(bytes, endianness => $size),
					e_phoff: consume!(bytes, endianness => $size),
					e_shoff: consume!(bytes, endianness => $size),
					e_flags: consume!(bytes, endianness => u32),
					e_ehsize: consume!(bytes, endianness => u16),
					e_phentsize: consume!(bytes, endianness => u16),
					e_phnum: consume!(bytes, endianness => u16),
					e_shentsize: consume!(bytes, endianness => u16),
					e_shnum: consume!(bytes, endianness => u16),
					e_shstrndx: consume!(bytes, endianness => u16),
				})
			}

			/// Byte order of this image. Validated by [`Header::from_bytes`].
			pub fn endianness(&self) -> crate::header::Endianness {
				match self.e_ident.ei_data() {
					crate::header::consts::ident::data::EI_DATA_BE => {
						crate::header::Endianness::Big
					}
					_ => crate::header::Endianness::Little,
				}
			}
		}

		impl core::fmt::Display for Header {
			fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
				f.write_fmt(format_args!(r#"Header:
	Ident:
		ei_class     : {}
		ei_data      : {}
		ei_version   : {}
		ei_osabi     : {:#04x}
		ei_abiversion: {}
	e_type     : {}
	e_machine  : {:#06x}
	e_version  : {}
	e_entry    : {:#x}
	e_phoff    : {}
	e_shoff    : {}
	e_flags    : {:#b}
	e_ehsize   : {}
	e_phentsize: {}
	e_phnum    : {}
	e_shentsize: {}
	e_shnum    : {}
	e_shstrndx : {}"#,
					Self::CLASS,
					self.endianness(),
					self.e_ident.ei_version(),
					self.e_ident.ei_osabi(),
					self.e_ident.ei_abiversion(),
					crate::header::stringify::e_type_as_str(self.e_type),
					self.e_machine,
					self.e_version,
					self.e_entry,
					self.e_phoff,
					self.e_shoff,
					self.e_flags,
					self.e_ehsize,
					self.e_phentsize,
					self.e_phnum,
					self.e_shentsize,
					self.e_shnum,
					self.e_shstrndx
				))
			}
		}
	};
}

pub mod elf32 {
	header!(u32, crate::header::Class::Elf32);

	#[cfg(test)]
	mod tests {
		use super::*;
		use crate::error::ErrorKind;
		use crate::header::Class;

		#[test]
		fn layout_size() {
			assert_eq!(Header::SIZE, 52);
		}

		#[test]
		fn big_endian_header() {
			let mut bytes = [0u8; 52];
			bytes[..8].copy_from_slice(&[0x7f, 0x45, 0x4c, 0x46, 0x01, 0x02, 0x01, 0x00]);
			// e_type, e_machine
			bytes[16..20].copy_from_slice(&[0x00, 0x01, 0x00, 0x08]);
			// e_shoff
			bytes[32..36].copy_from_slice(&[0x00, 0x00, 0x01, 0x00]);
			// e_shentsize, e_shnum, e_shstrndx
			bytes[46..52].copy_from_slice(&[0x00, 0x28, 0x00, 0x05, 0x00, 0x04]);

			let header = Header::from_bytes(&bytes).unwrap();
			assert_eq!(header.e_type, 1);
			assert_eq!(header.e_machine, 8);
			assert_eq!(header.e_shoff, 0x100);
			assert_eq!(header.e_shentsize, 40);
			assert_eq!(header.e_shnum, 5);
			assert_eq!(header.e_shstrndx, 4);
		}

		#[test]
		fn refuses_64_bit_image() {
			let mut bytes = [0u8; 64];
			bytes[..6].copy_from_slice(&[0x7f, 0x45, 0x4c, 0x46, 0x02, 0x01]);

			let err = Header::from_bytes(&bytes).unwrap_err();
			assert_eq!(
				err.kind,
				ErrorKind::ClassMismatch {
					found: Class::Elf64,
					expected: Class::Elf32
				}
			);
		}
	}
}

pub mod elf64 {
	header!(u64, crate::header::Class::Elf64);

}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn bad_magic_wins_over_length() {
		let err = Ident::from_bytes(b"MZ").unwrap_err();
		assert_eq!(err.kind, ErrorKind::InvalidMagic([b'M', b'Z', 0, 0]));

		let err = Ident::from_bytes(b"\x7fELG and then plenty of bytes").unwrap_err();
		assert_eq!(err.kind, ErrorKind::InvalidMagic(*b"\x7fELG"));
	}

	#[test]
	fn short_ident() {
		let err = Ident::from_bytes(b"\x7fELF\x02\x01").unwrap_err();
		assert_eq!(
			err.kind,
			ErrorKind::InsufficientSize {
				needed: 16,
				available: 6
			}
		);
	}

	#[test]
	fn ident_fields() {
		let ident = Ident::from_bytes(b"\x7fELF\x01\x02\x01\x03\x00\0\0\0\0\0\0\0").unwrap();
		assert_eq!(ident.ei_mag(), &consts::ident::ELF_MAGIC);
		assert_eq!(ident.class(), Ok(Class::Elf32));
		assert_eq!(ident.endianness(), Ok(Endianness::Big));
		assert_eq!(ident.ei_osabi(), 3);
	}

	#[test]
	fn unknown_class() {
		let ident = Ident::from_bytes(b"\x7fELF\x07\x01\x01\0\0\0\0\0\0\0\0\0").unwrap();
		assert_eq!(ident.class().unwrap_err().kind, ErrorKind::UnknownClass(7));
	}
}
