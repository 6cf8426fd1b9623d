use log::{debug, trace};

use crate::error::{Error, ErrorKind, Result};
use crate::header::{self, Class, Endianness, Ident};
use crate::metadata::{self, Strings};
use crate::section_header::consts::index::{SHN_LORESERVE, SHN_UNDEF, SHN_XINDEX};
use crate::section_header::consts::typ::{
	SH_TYPE_SHT_NOBITS, SH_TYPE_SHT_STRTAB,
};
use crate::section_header::{self, Layout, Table};
use crate::strtab::Strtab;

/// A parsed ELF image, borrowing the bytes it was parsed from.
///
/// The variant is picked from `e_ident[EI_CLASS]`, so one build reads both
/// address widths.
#[derive(Debug, Clone, Copy)]
pub enum Elf<'a> {
	Elf32 {
		bytes: &'a [u8],
		header: header::elf32::Header,
		sheaders: Table<'a, section_header::elf32::SectionHeader>,
	},
	Elf64 {
		bytes: &'a [u8],
		header: header::elf64::Header,
		sheaders: Table<'a, section_header::elf64::SectionHeader>,
	},
}

/// A section header with its name resolved through the section name table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Section<'a> {
	/// Index in the section header table.
	pub index: u64,

	/// Offset of the name in the section name table.
	pub sh_name: u32,

	/// `None` if the image has no name table or `sh_name` does not point at a
	/// terminated string inside it.
	pub name: Option<&'a [u8]>,

	pub sh_type: u32,

	pub sh_offset: u64,

	pub sh_size: u64,
}

impl Section<'_> {
	fn from_layout<S: Layout>(index: u64, sh: &S) -> Self {
		Self {
			index,
			sh_name: sh.name(),
			name: None,
			sh_type: sh.typ(),
			sh_offset: sh.offset(),
			sh_size: sh.size(),
		}
	}
}

impl<'a> Elf<'a> {
	/// Parses the file header and locates the section header table.
	pub fn from_bytes(bytes: &'a [u8]) -> Result<Self> {
		let class = Ident::from_bytes(bytes)?.class()?;

		Self::from_bytes_as(bytes, class)
	}

	/// Like [`Elf::from_bytes`], but refuses images of any other width than
	/// `class` with [`ErrorKind::ClassMismatch`].
	pub fn from_bytes_as(bytes: &'a [u8], class: Class) -> Result<Self> {
		let elf = match class {
			Class::Elf32 => {
				let header = header::elf32::Header::from_bytes(bytes)?;
				debug!("{}", header);

				let sheaders = section_table(
					bytes,
					header.e_shoff.into(),
					header.e_shentsize,
					header.e_shnum,
					header.endianness(),
				)?;

				Self::Elf32 {
					bytes,
					header,
					sheaders,
				}
			}
			Class::Elf64 => {
				let header = header::elf64::Header::from_bytes(bytes)?;
				debug!("{}", header);

				let sheaders = section_table(
					bytes,
					header.e_shoff,
					header.e_shentsize,
					header.e_shnum,
					header.endianness(),
				)?;

				Self::Elf64 {
					bytes,
					header,
					sheaders,
				}
			}
		};

		Ok(elf)
	}

	pub fn bytes(&self) -> &'a [u8] {
		match self {
			Self::Elf32 { bytes, .. } | Self::Elf64 { bytes, .. } => *bytes,
		}
	}

	pub fn class(&self) -> Class {
		match self {
			Self::Elf32 { .. } => Class::Elf32,
			Self::Elf64 { .. } => Class::Elf64,
		}
	}

	pub fn endianness(&self) -> Endianness {
		match self {
			Self::Elf32 { header, .. } => header.endianness(),
			Self::Elf64 { header, .. } => header.endianness(),
		}
	}

	/// Number of entries in the section header table, including the null
	/// entry at index 0.
	pub fn section_count(&self) -> u64 {
		match self {
			Self::Elf32 { sheaders, .. } => sheaders.len(),
			Self::Elf64 { sheaders, .. } => sheaders.len(),
		}
	}

	/// Returns the section name string table, or `None` if the image has
	/// none.
	pub fn section_names(&self) -> Result<Option<Strtab<'a>>> {
		match self {
			Self::Elf32 {
				bytes,
				header,
				sheaders,
			} => section_names(*bytes, sheaders, header.e_shstrndx),
			Self::Elf64 {
				bytes,
				header,
				sheaders,
			} => section_names(*bytes, sheaders, header.e_shstrndx),
		}
	}

	/// Walks the section header table in order.
	///
	/// Fails up front if the section name table is unusable. Every call starts
	/// a fresh walk.
	pub fn sections(&self) -> Result<Sections<'a>> {
		let names = self.section_names()?;
		let inner = match self {
			Self::Elf32 { sheaders, .. } => SectionsInner::Elf32(sheaders.iter()),
			Self::Elf64 { sheaders, .. } => SectionsInner::Elf64(sheaders.iter()),
		};

		Ok(Sections {
			inner,
			names,
			index: 0,
		})
	}

	/// Returns the first section whose name is exactly `name`.
	pub fn section_by_name(&self, name: &[u8]) -> Result<Option<Section<'a>>> {
		for section in self.sections()? {
			let section = section?;
			if section.name == Some(name) {
				debug!(
					"found section {:?} at index {}: {}, offset {:#x}, size {:#x}",
					core::str::from_utf8(name).unwrap_or("<binary>"),
					section.index,
					section_header::sh_type_as_str(section.sh_type),
					section.sh_offset,
					section.sh_size
				);
				return Ok(Some(section));
			}
		}

		Ok(None)
	}

	/// Returns the file bytes of `section`, checked against the image.
	pub fn section_data(&self, section: &Section<'a>) -> Result<&'a [u8]> {
		if section.sh_type == SH_TYPE_SHT_NOBITS {
			return Ok(&[]);
		}

		crate::bytes::range(self.bytes(), section.sh_offset, section.sh_size)
			.map_err(|err| {
				#[cfg(feature = "std")]
				let err = err.with_message(format_args!(
					"section {}",
					section.index
				));
				err
			})
	}

	/// Decodes the strings of the section named `name`, or `None` if there
	/// is no such section.
	pub fn section_strings(&self, name: &[u8]) -> Result<Option<Strings<'a>>> {
		let Some(section) = self.section_by_name(name)? else {
			return Ok(None);
		};
		let data = self.section_data(&section)?;

		Ok(Some(Strings::new(data, section.sh_offset)))
	}

	/// Decodes the `.metadata` section.
	pub fn metadata(&self) -> Result<Option<Strings<'a>>> {
		self.section_strings(metadata::SECTION_NAME.as_bytes())
	}
}

fn section_table<'a, S: Layout>(
	bytes: &'a [u8],
	e_shoff: u64,
	e_shentsize: u16,
	e_shnum: u16,
	endianness: Endianness,
) -> Result<Table<'a, S>> {
	if e_shoff == 0 {
		debug!("no section header table");
		return Table::new(bytes, 0, e_shentsize, 0, endianness);
	}

	let mut count = u64::from(e_shnum);
	if count == 0 {
		// Extended numbering, the real count is stored in entry 0.
		let first =
			Table::<S>::new(bytes, e_shoff, e_shentsize, 1, endianness)?.get(0)?;
		count = first.size();
	}

	debug!(
		"section header table at {:#x}: {} entries of {} bytes",
		e_shoff, count, e_shentsize
	);

	Table::new(bytes, e_shoff, e_shentsize, count, endianness)
}

fn section_names<'a, S: Layout>(
	bytes: &'a [u8],
	sheaders: &Table<'a, S>,
	e_shstrndx: u16,
) -> Result<Option<Strtab<'a>>> {
	if sheaders.is_empty() {
		return Ok(None);
	}

	let index = match e_shstrndx {
		SHN_UNDEF => {
			debug!("no section name table");
			return Ok(None);
		}
		SHN_XINDEX => u64::from(sheaders.get(0)?.link()),
		// SHN_ABS, SHN_COMMON and friends never name a real section
		index if index >= SHN_LORESERVE => {
			return Err(Error::new(ErrorKind::InvalidSectionIndex {
				index: u64::from(index),
				count: sheaders.len(),
			}));
		}
		index => u64::from(index),
	};

	let sh = sheaders.get(index)?;
	if sh.typ() != SH_TYPE_SHT_STRTAB {
		return Err(Error::new(ErrorKind::NotStringTable(index)));
	}

	let data = sh.extract_data(bytes)?;
	debug!("section names in section {} ({} bytes)", index, data.len());

	Ok(Some(Strtab::new(Strtab::DEFAULT_DELIM, data)))
}

/// Iterator returned by [`Elf::sections`].
#[derive(Debug, Clone)]
pub struct Sections<'a> {
	inner: SectionsInner<'a>,
	names: Option<Strtab<'a>>,
	index: u64,
}

#[derive(Debug, Clone)]
enum SectionsInner<'a> {
	Elf32(section_header::Iter<'a, section_header::elf32::SectionHeader>),
	Elf64(section_header::Iter<'a, section_header::elf64::SectionHeader>),
}

impl<'a> Sections<'a> {
	fn resolve_name(&self, section: &Section<'_>) -> Option<&'a [u8]> {
		let names = self.names?;
		let name = usize::try_from(section.sh_name)
			.ok()
			.and_then(|offset| names.get_bytes_off(offset));

		if name.is_none() {
			debug!(
				"section {}: name offset {:#x} is outside of the {} byte name table, treating as unnamed",
				section.index,
				section.sh_name,
				names.len()
			);
		}

		name
	}
}

impl<'a> Iterator for Sections<'a> {
	type Item = Result<Section<'a>>;

	fn next(&mut self) -> Option<Self::Item> {
		let index = self.index;
		let section = match &mut self.inner {
			SectionsInner::Elf32(iter) => {
				iter.next()?.map(|sh| Section::from_layout(index, &sh))
			}
			SectionsInner::Elf64(iter) => {
				iter.next()?.map(|sh| Section::from_layout(index, &sh))
			}
		};
		self.index += 1;

		Some(section.map(|mut section| {
			section.name = self.resolve_name(&section);
			trace!(
				"section {}: {:?} {} offset {:#x} size {:#x}",
				section.index,
				section.name.map(|name| core::str::from_utf8(name).unwrap_or("<binary>")),
				section_header::sh_type_as_str(section.sh_type),
				section.sh_offset,
				section.sh_size
			);
			section
		}))
	}
}
