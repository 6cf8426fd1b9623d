//! Assembles small relocatable images, mainly to have fixtures of either
//! width and byte order at hand without shipping binaries.

use crate::header::consts::ident::version::EI_VERSION_CURRENT;
use crate::header::consts::ident::{ELF_MAGIC, EI_NIDENT};
use crate::header::consts::typ::E_TYPE_ET_REL;
use crate::header::{self, Class, Endianness};
use crate::section_header::consts::typ::SH_TYPE_SHT_STRTAB;
use crate::section_header::{self, Layout};

const SHSTRTAB: &str = ".shstrtab";

#[derive(Debug, Clone)]
struct PendingSection {
	name: String,
	sh_type: u32,
	data: Vec<u8>,
}

/// Builds an image made of the file header, the payload of every added
/// section, a `.shstrtab` section and the section header table.
///
/// Section 0 is the null section, added sections follow in order and
/// `.shstrtab` comes last.
#[derive(Debug, Clone)]
pub struct Builder {
	class: Class,
	endianness: Endianness,
	sections: Vec<PendingSection>,
}

impl Builder {
	pub fn new(class: Class, endianness: Endianness) -> Self {
		Self {
			class,
			endianness,
			sections: Vec::new(),
		}
	}

	pub fn section(
		mut self,
		name: impl Into<String>,
		sh_type: u32,
		data: impl Into<Vec<u8>>,
	) -> Self {
		self.sections.push(PendingSection {
			name: name.into(),
			sh_type,
			data: data.into(),
		});
		self
	}

	pub fn build(&self) -> Vec<u8> {
		let (ehsize, shentsize) = match self.class {
			Class::Elf32 => (
				header::elf32::Header::SIZE,
				section_header::elf32::SectionHeader::SIZE,
			),
			Class::Elf64 => (
				header::elf64::Header::SIZE,
				section_header::elf64::SectionHeader::SIZE,
			),
		};

		let mut out = Writer {
			buf: vec![0; ehsize],
			class: self.class,
			endianness: self.endianness,
		};

		// Payloads
		let mut placed = Vec::with_capacity(self.sections.len());
		for section in &self.sections {
			placed.push(out.buf.len() as u64);
			out.buf.extend_from_slice(&section.data);
		}

		// Section names
		let mut shstrtab = vec![0u8];
		let mut name_offsets = Vec::with_capacity(self.sections.len() + 1);
		for name in self
			.sections
			.iter()
			.map(|section| section.name.as_str())
			.chain([SHSTRTAB])
		{
			name_offsets.push(shstrtab.len() as u32);
			shstrtab.extend_from_slice(name.as_bytes());
			shstrtab.push(0);
		}
		let shstrtab_offset = out.buf.len() as u64;
		out.buf.extend_from_slice(&shstrtab);

		// Section header table
		out.buf.resize(out.buf.len().next_multiple_of(8), 0);
		let shoff = out.buf.len() as u64;

		out.section_header(0, 0, 0, 0, 0);
		for ((section, offset), name) in
			self.sections.iter().zip(&placed).zip(&name_offsets)
		{
			out.section_header(
				*name,
				section.sh_type,
				*offset,
				section.data.len() as u64,
				1,
			);
		}
		out.section_header(
			name_offsets[self.sections.len()],
			SH_TYPE_SHT_STRTAB,
			shstrtab_offset,
			shstrtab.len() as u64,
			1,
		);

		let shnum = self.sections.len() + 2;
		let shnum = u16::try_from(shnum).unwrap_or(0);
		out.file_header(
			shoff,
			ehsize as u16,
			shentsize as u16,
			shnum,
			shnum.saturating_sub(1),
		);

		out.buf
	}
}

struct Writer {
	buf: Vec<u8>,
	class: Class,
	endianness: Endianness,
}

impl Writer {
	fn u16(&mut self, value: u16) {
		match self.endianness {
			Endianness::Little => self.buf.extend_from_slice(&value.to_le_bytes()),
			Endianness::Big => self.buf.extend_from_slice(&value.to_be_bytes()),
		}
	}

	fn u32(&mut self, value: u32) {
		match self.endianness {
			Endianness::Little => self.buf.extend_from_slice(&value.to_le_bytes()),
			Endianness::Big => self.buf.extend_from_slice(&value.to_be_bytes()),
		}
	}

	fn u64(&mut self, value: u64) {
		match self.endianness {
			Endianness::Little => self.buf.extend_from_slice(&value.to_le_bytes()),
			Endianness::Big => self.buf.extend_from_slice(&value.to_be_bytes()),
		}
	}

	/// Writes an address sized field. Values are truncated for 32-bit images.
	fn word(&mut self, value: u64) {
		match self.class {
			Class::Elf32 => self.u32(value as u32),
			Class::Elf64 => self.u64(value),
		}
	}

	fn section_header(
		&mut self,
		sh_name: u32,
		sh_type: u32,
		sh_offset: u64,
		sh_size: u64,
		sh_addralign: u64,
	) {
		self.u32(sh_name);
		self.u32(sh_type);
		// sh_flags, sh_addr
		self.word(0);
		self.word(0);
		self.word(sh_offset);
		self.word(sh_size);
		// sh_link, sh_info
		self.u32(0);
		self.u32(0);
		self.word(sh_addralign);
		// sh_entsize
		self.word(0);
	}

	/// Fills in the file header, which was reserved at the start of `buf`.
	fn file_header(
		&mut self,
		e_shoff: u64,
		e_ehsize: u16,
		e_shentsize: u16,
		e_shnum: u16,
		e_shstrndx: u16,
	) {
		let body = self.buf.split_off(usize::from(e_ehsize));
		self.buf.clear();

		let mut ident = [0u8; EI_NIDENT];
		ident[..ELF_MAGIC.len()].copy_from_slice(&ELF_MAGIC);
		ident[ELF_MAGIC.len()] = self.class.into();
		ident[ELF_MAGIC.len() + 1] = self.endianness.into();
		ident[ELF_MAGIC.len() + 2] = EI_VERSION_CURRENT;
		self.buf.extend_from_slice(&ident);

		self.u16(E_TYPE_ET_REL);
		// e_machine
		self.u16(0);
		self.u32(EI_VERSION_CURRENT.into());
		// e_entry, e_phoff
		self.word(0);
		self.word(0);
		self.word(e_shoff);
		// e_flags
		self.u32(0);
		self.u16(e_ehsize);
		// e_phentsize, e_phnum
		self.u16(0);
		self.u16(0);
		self.u16(e_shentsize);
		self.u16(e_shnum);
		self.u16(e_shstrndx);

		self.buf.extend_from_slice(&body);
	}
}
