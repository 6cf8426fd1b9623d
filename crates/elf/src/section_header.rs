/// References:
///     - <http://www.sco.com/developers/gabi/2000-07-17/ch4.sheader.html>
pub mod consts {
	pub mod typ {
		/// Field `sh_type`: Inactive header without an associated section.
		pub const SH_TYPE_SHT_NULL: u32 = 0x0;

		/// Field `sh_type`: Information defined by the program.
		pub const SH_TYPE_SHT_PROGBITS: u32 = 0x1;

		/// Field `sh_type`: Symbol table.
		pub const SH_TYPE_SHT_SYMTAB: u32 = 0x2;

		/// Field `sh_type`: String table.
		pub const SH_TYPE_SHT_STRTAB: u32 = 0x3;

		/// Field `sh_type`: Relocation entries with addends.
		pub const SH_TYPE_SHT_RELA: u32 = 0x4;

		/// Field `sh_type`: Symbol hash table.
		pub const SH_TYPE_SHT_HASH: u32 = 0x5;

		/// Field `sh_type`: Dynamic linking information.
		pub const SH_TYPE_SHT_DYNAMIC: u32 = 0x6;

		/// Field `sh_type`: Notes.
		pub const SH_TYPE_SHT_NOTE: u32 = 0x7;

		/// Field `sh_type`: Occupies no space in the file (bss).
		pub const SH_TYPE_SHT_NOBITS: u32 = 0x8;

		/// Field `sh_type`: Relocation entries without addends.
		pub const SH_TYPE_SHT_REL: u32 = 0x9;

		/// Field `sh_type`: Dynamic linker symbol table.
		pub const SH_TYPE_SHT_DYNSYM: u32 = 0xb;
	}

	pub mod index {
		/// Undefined section reference. As `e_shstrndx` it means the file has
		/// no section name string table.
		pub const SHN_UNDEF: u16 = 0x0000;

		/// Start of the reserved index range.
		pub const SHN_LORESERVE: u16 = 0xff00;

		/// The real index is too large for the field and is stored in the
		/// `sh_link` field of section header 0.
		pub const SHN_XINDEX: u16 = 0xffff;
	}
}

mod stringify {
	#[rustfmt::skip]
	pub fn sh_type_as_str(sh_type: u32) -> &'static str {
		match sh_type {
			crate::section_header::consts::typ::SH_TYPE_SHT_NULL => "SHT_NULL",
			crate::section_header::consts::typ::SH_TYPE_SHT_PROGBITS => "SHT_PROGBITS",
			crate::section_header::consts::typ::SH_TYPE_SHT_SYMTAB => "SHT_SYMTAB",
			crate::section_header::consts::typ::SH_TYPE_SHT_STRTAB => "SHT_STRTAB",
			crate::section_header::consts::typ::SH_TYPE_SHT_RELA => "SHT_RELA",
			crate::section_header::consts::typ::SH_TYPE_SHT_HASH => "SHT_HASH",
			crate::section_header::consts::typ::SH_TYPE_SHT_DYNAMIC => "SHT_DYNAMIC",
			crate::section_header::consts::typ::SH_TYPE_SHT_NOTE => "SHT_NOTE",
			crate::section_header::consts::typ::SH_TYPE_SHT_NOBITS => "SHT_NOBITS",
			crate::section_header::consts::typ::SH_TYPE_SHT_REL => "SHT_REL",
			crate::section_header::consts::typ::SH_TYPE_SHT_DYNSYM => "SHT_DYNSYM",
			_ => "UNKNOWN",
		}
	}
}

pub(crate) use stringify::sh_type_as_str;

use core::marker::PhantomData;

use crate::error::{Error, ErrorKind, Result};
use crate::header::Endianness;

/// Width independent access to a section header record.
///
/// Implemented by [`elf32::SectionHeader`] and [`elf64::SectionHeader`] so the
/// table walker can be written once for both layouts.
pub trait Layout: Sized + Copy {
	/// Size of the on-disk record.
	const SIZE: usize;

	fn from_bytes(bytes: &[u8], endianness: Endianness) -> Result<Self>;

	fn name(&self) -> u32;

	fn typ(&self) -> u32;

	fn offset(&self) -> u64;

	fn size(&self) -> u64;

	fn link(&self) -> u32;

	/// Returns the bytes of the section inside `bytes`, the whole image.
	///
	/// `SHT_NOBITS` sections occupy no space in the file and yield an empty
	/// slice.
	fn extract_data<'a>(&self, bytes: &'a [u8]) -> Result<&'a [u8]> {
		if self.typ() == consts::typ::SH_TYPE_SHT_NOBITS {
			return Ok(&[]);
		}

		crate::bytes::range(bytes, self.offset(), self.size())
	}
}

macro_rules! section_header {
	( $size:ty ) => {
		#[repr(C)]
		#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
		pub struct SectionHeader {
			/// Field `sh_name`: Offset of the name in the section name string table.
			pub sh_name: u32,

			/// Field `sh_type`: Categorizes the contents and semantics of the section.
			pub sh_type: u32,

			/// Field `sh_flags`: Attribute flags.
			pub sh_flags: $size,

			/// Field `sh_addr`: Address of the first byte in memory, if loaded.
			pub sh_addr: $size,

			/// Field `sh_offset`: Offset of the first byte of the section in the file.
			pub sh_offset: $size,

			/// Field `sh_size`: Size of the section in bytes.
			pub sh_size: $size,

			/// Field `sh_link`: Section header table index link (type dependent).
			pub sh_link: u32,

			/// Field `sh_info`: Extra information (type dependent).
			pub sh_info: u32,

			/// Field `sh_addralign`: Alignment constraint of the section.
			pub sh_addralign: $size,

			/// Field `sh_entsize`: Size of each entry for sections holding a table.
			pub sh_entsize: $size,
		}

		impl crate::section_header::Layout for SectionHeader {
			const SIZE: usize = core::mem::size_of::<Self>();

			#[allow(unused_assignments)]
			fn from_bytes(
				mut bytes: &[u8],
				endianness: crate::header::Endianness,
			) -> crate::error::Result<Self> {
				if bytes.len() < Self::SIZE {
					return Err(crate::error::Error::new(
						crate::error::ErrorKind::InsufficientSize {
							needed: Self::SIZE,
							available: bytes.len(),
						},
					));
				}

				Ok(Self {
					sh_name: consume!(bytes, endianness => u32),
					sh_type: consume!(bytes, endianness => u32),
					sh_flags: consume!(bytes, endianness => $size),
					sh_addr: consume!(bytes, endianness => $size),
					sh_offset: consume!(bytes, endianness => $size),
					sh_size: consume!(bytes, endianness => $size),
					sh_link: consume!(bytes, endianness => u32),
					sh_info: consume!(bytes, endianness => u32),
					sh_addralign: consume!(bytes, endianness => $size),
					sh_entsize: consume!(bytes, endianness => $size),
				})
			}

			fn name(&self) -> u32 {
				self.sh_name
			}

			fn typ(&self) -> u32 {
				self.sh_type
			}

			fn offset(&self) -> u64 {
				self.sh_offset.into()
			}

			fn size(&self) -> u64 {
				self.sh_size.into()
			}

			fn link(&self) -> u32 {
				self.sh_link
			}
		}

		impl core::fmt::Display for SectionHeader {
			fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
				f.write_fmt(format_args!(r#"SectionHeader:
	sh_name     : {}
	sh_type     : {}
	sh_flags    : {:#x}
	sh_addr     : {:#x}
	sh_offset   : {:#x}
	sh_size     : {:#x}
	sh_link     : {}
	sh_info     : {}
	sh_addralign: {}
	sh_entsize  : {}"#,
					self.sh_name,
					crate::section_header::sh_type_as_str(self.sh_type),
					self.sh_flags,
					self.sh_addr,
					self.sh_offset,
					self.sh_size,
					self.sh_link,
					self.sh_info,
					self.sh_addralign,
					self.sh_entsize
				))
			}
		}
	};
}

pub mod elf32 {
	section_header!(u32);
}

pub mod elf64 {
	section_header!(u64);
}

/// Lazy view over the section header table of an image.
///
/// Records are only decoded when requested, so iterating twice simply walks
/// the table again.
#[derive(Debug, Clone, Copy)]
pub struct Table<'a, S> {
	bytes: &'a [u8],
	offset: u64,
	entsize: u64,
	count: u64,
	endianness: Endianness,
	_layout: PhantomData<S>,
}

impl<'a, S: Layout> Table<'a, S> {
	/// Creates a view of `count` records of `entsize` bytes each, starting at
	/// `offset` inside `bytes`.
	///
	/// The whole table must lie inside `bytes`.
	pub fn new(
		bytes: &'a [u8],
		offset: u64,
		entsize: u16,
		count: u64,
		endianness: Endianness,
	) -> Result<Self> {
		if count > 0 && usize::from(entsize) < S::SIZE {
			return Err(Error::new(ErrorKind::InvalidEntrySize {
				found: entsize,
				needed: S::SIZE,
			}));
		}

		let entsize = u64::from(entsize);
		let len = count.checked_mul(entsize).ok_or_else(|| {
			Error::new(ErrorKind::OutOfBounds {
				offset,
				len: u64::MAX,
				available: bytes.len(),
			})
		})?;
		crate::bytes::range(bytes, offset, len)?;

		Ok(Self {
			bytes,
			offset,
			entsize,
			count,
			endianness,
			_layout: PhantomData,
		})
	}

	pub fn len(&self) -> u64 {
		self.count
	}

	pub fn is_empty(&self) -> bool {
		self.count == 0
	}

	pub fn get(&self, index: u64) -> Result<S> {
		if index >= self.count {
			return Err(Error::new(ErrorKind::InvalidSectionIndex {
				index,
				count: self.count,
			}));
		}

		let start = self.offset + index * self.entsize;
		let record = crate::bytes::range(self.bytes, start, S::SIZE as u64)?;

		S::from_bytes(record, self.endianness)
	}

	pub fn iter(&self) -> Iter<'a, S> {
		Iter {
			table: *self,
			index: 0,
		}
	}
}

impl<'a, S: Layout> IntoIterator for &Table<'a, S> {
	type Item = Result<S>;
	type IntoIter = Iter<'a, S>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

#[derive(Debug, Clone)]
pub struct Iter<'a, S> {
	table: Table<'a, S>,
	index: u64,
}

impl<'a, S: Layout> Iterator for Iter<'a, S> {
	type Item = Result<S>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.index >= self.table.count {
			return None;
		}

		let header = self.table.get(self.index);
		self.index += 1;
		Some(header)
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		let left = self.table.count.saturating_sub(self.index);
		let left = usize::try_from(left).unwrap_or(usize::MAX);
		(left, Some(left))
	}
}
