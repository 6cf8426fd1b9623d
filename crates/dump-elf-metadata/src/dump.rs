use std::io::{self, Write};
use std::path::{Path, PathBuf};

use elf::elf::Elf;
use elf::header::Class;
use elf::mmap::{LoadError, Mapping};
use log::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
	Dumped { count: usize },
	NotFound,
}

#[derive(Debug, thiserror::Error)]
pub enum DumpError {
	#[error(transparent)]
	Load(#[from] LoadError),

	#[error("{}: {source}", path.display())]
	Parse {
		path: PathBuf,
		#[source]
		source: elf::error::Error,
	},

	#[error("could not write to stdout: {0}")]
	Write(#[source] io::Error),
}

/// Maps `path`, finds the section named `section` and writes its strings to
/// `out`, one per line.
///
/// Nothing is written unless the whole section decodes.
pub fn run(
	path: &Path,
	class: Option<Class>,
	section: &[u8],
	out: &mut impl Write,
) -> Result<Outcome, DumpError> {
	let mapping = Mapping::open(path)?;
	let parse_error = |source| DumpError::Parse {
		path: path.to_owned(),
		source,
	};

	let elf = match class {
		Some(class) => Elf::from_bytes_as(&mapping, class),
		None => Elf::from_bytes(&mapping),
	}
	.map_err(parse_error)?;

	info!(
		"{}: {} {} image, {} sections",
		path.display(),
		elf.class(),
		elf.endianness(),
		elf.section_count()
	);

	let Some(strings) = elf.section_strings(section).map_err(parse_error)? else {
		return Ok(Outcome::NotFound);
	};
	let strings = strings
		.collect::<Result<Vec<_>, _>>()
		.map_err(parse_error)?;

	for string in &strings {
		out.write_all(string).map_err(DumpError::Write)?;
		out.write_all(b"\n").map_err(DumpError::Write)?;
	}
	out.flush().map_err(DumpError::Write)?;

	Ok(Outcome::Dumped {
		count: strings.len(),
	})
}

#[cfg(test)]
mod tests {
	use std::fs;

	use elf::header::Endianness;
	use elf::section_header::consts::typ::SH_TYPE_SHT_PROGBITS;
	use elf::writer::Builder;

	use super::*;

	fn scratch(name: &str, contents: &[u8]) -> PathBuf {
		let path = std::env::temp_dir().join(format!(
			"dump-elf-metadata-{}-{}",
			std::process::id(),
			name
		));
		fs::write(&path, contents).unwrap();
		path
	}

	fn run_on(path: &Path, class: Option<Class>) -> (Result<Outcome, DumpError>, Vec<u8>) {
		let mut out = Vec::new();
		let outcome = run(path, class, b".metadata", &mut out);
		(outcome, out)
	}

	#[test]
	fn dumps_strings() {
		let image = Builder::new(Class::Elf32, Endianness::Little)
			.section(".metadata", SH_TYPE_SHT_PROGBITS, b"a\0bb\0\0".to_vec())
			.build();
		let path = scratch("dumps.o", &image);

		let (outcome, out) = run_on(&path, None);
		assert_eq!(outcome.unwrap(), Outcome::Dumped { count: 2 });
		assert_eq!(out, b"a\nbb\n");

		fs::remove_file(path).unwrap();
	}

	#[test]
	fn not_found_writes_nothing() {
		let image = Builder::new(Class::Elf64, Endianness::Big)
			.section(".data", SH_TYPE_SHT_PROGBITS, b"a\0bb\0\0".to_vec())
			.build();
		let path = scratch("not-found.o", &image);

		let (outcome, out) = run_on(&path, None);
		assert_eq!(outcome.unwrap(), Outcome::NotFound);
		assert!(out.is_empty());

		fs::remove_file(path).unwrap();
	}

	#[test]
	fn malformed_writes_nothing() {
		let image = Builder::new(Class::Elf64, Endianness::Little)
			.section(".metadata", SH_TYPE_SHT_PROGBITS, b"a\0bb".to_vec())
			.build();
		let path = scratch("malformed.o", &image);

		let (outcome, out) = run_on(&path, None);
		let err = outcome.unwrap_err();
		assert!(
			matches!(
				err,
				DumpError::Parse {
					source: elf::error::Error {
						kind: elf::error::ErrorKind::MalformedSection(_),
						..
					},
					..
				}
			),
			"{err}"
		);
		assert!(out.is_empty());

		fs::remove_file(path).unwrap();
	}

	#[test]
	fn class_mismatch() {
		let image = Builder::new(Class::Elf64, Endianness::Little)
			.section(".metadata", SH_TYPE_SHT_PROGBITS, b"a\0\0".to_vec())
			.build();
		let path = scratch("mismatch.o", &image);

		let (outcome, out) = run_on(&path, Some(Class::Elf32));
		let err = outcome.unwrap_err();
		assert!(err.to_string().contains("32/64 mismatch"), "{err}");
		assert!(out.is_empty());

		fs::remove_file(path).unwrap();
	}

	#[test]
	fn load_error_keeps_its_message() {
		let path = std::env::temp_dir().join("dump-elf-metadata-no-such-file");

		let (outcome, _) = run_on(&path, None);
		let err = outcome.unwrap_err();
		assert!(matches!(err, DumpError::Load(LoadError::NotFound { .. })));
		assert!(err.to_string().starts_with("could not open"), "{err}");
	}
}
