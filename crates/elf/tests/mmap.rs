use std::fs;
use std::path::PathBuf;

use elf::elf::Elf;
use elf::header::{Class, Endianness};
use elf::mmap::{LoadError, Mapping};
use elf::writer::Builder;

fn scratch(name: &str) -> PathBuf {
	let dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("elf-mmap");
	fs::create_dir_all(&dir).unwrap();
	dir.join(name)
}

#[test]
fn maps_whole_file() {
	let image = Builder::new(Class::Elf64, Endianness::Little)
		.section(".metadata", 1, b"mapped\0\0".to_vec())
		.build();
	let path = scratch("whole.o");
	fs::write(&path, &image).unwrap();

	let mapping = Mapping::open(&path).unwrap();
	assert_eq!(&*mapping, &image[..]);

	let elf = Elf::from_bytes(&mapping).unwrap();
	let strings = elf
		.metadata()
		.unwrap()
		.unwrap()
		.collect::<Result<Vec<_>, _>>()
		.unwrap();
	assert_eq!(strings, [&b"mapped"[..]]);
}

#[test]
fn missing_file() {
	let path = scratch("does-not-exist.o");
	let _ = fs::remove_file(&path);

	let err = Mapping::open(&path).unwrap_err();
	assert!(matches!(err, LoadError::NotFound { .. }), "{err}");
	assert!(err.to_string().starts_with("could not open"), "{err}");
}

#[test]
fn empty_file() {
	let path = scratch("empty.o");
	fs::write(&path, b"").unwrap();

	let err = Mapping::open(&path).unwrap_err();
	assert!(matches!(err, LoadError::Empty { .. }), "{err}");
	assert!(err.to_string().starts_with("could not mmap"), "{err}");
}

#[test]
fn directory() {
	let path = scratch("a-directory");
	fs::create_dir_all(&path).unwrap();

	let err = Mapping::open(&path).unwrap_err();
	assert!(matches!(err, LoadError::NotRegular { .. }), "{err}");
}
