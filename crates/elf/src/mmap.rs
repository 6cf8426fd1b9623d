//! Read-only memory mapping of an image on disk.

use std::fs;
use std::io;
use std::ops::Deref;
use std::path::{Path, PathBuf};

use log::debug;
use memmap2::Mmap;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
	#[error("could not open {}: no such file", path.display())]
	NotFound { path: PathBuf },

	#[error("could not open {}: {source}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: io::Error,
	},

	#[error("could not open {}: not a regular file", path.display())]
	NotRegular { path: PathBuf },

	#[error("could not mmap {}: file is empty", path.display())]
	Empty { path: PathBuf },

	#[error("could not mmap {}: {source}", path.display())]
	MapFailed {
		path: PathBuf,
		#[source]
		source: io::Error,
	},
}

impl LoadError {
	fn open(path: &Path, source: io::Error) -> Self {
		match source.kind() {
			io::ErrorKind::NotFound => Self::NotFound {
				path: path.to_owned(),
			},
			_ => Self::Io {
				path: path.to_owned(),
				source,
			},
		}
	}
}

/// A file mapped read-only into memory.
///
/// The descriptor is closed once the mapping exists; the mapping itself is
/// released on drop.
#[derive(Debug)]
pub struct Mapping {
	mmap: Mmap,
}

impl Mapping {
	pub fn open(path: impl AsRef<Path>) -> Result<Self, LoadError> {
		let path = path.as_ref();

		let meta = fs::metadata(path).map_err(|err| LoadError::open(path, err))?;
		if !meta.is_file() {
			return Err(LoadError::NotRegular {
				path: path.to_owned(),
			});
		}
		if meta.len() == 0 {
			return Err(LoadError::Empty {
				path: path.to_owned(),
			});
		}

		let file = fs::File::open(path).map_err(|err| LoadError::open(path, err))?;

		// SAFETY: The mapping is read-only and only read through bounds-checked
		// accessors. Truncating the file while it is mapped is not guarded
		// against.
		let mmap = unsafe { Mmap::map(&file) }.map_err(|source| {
			LoadError::MapFailed {
				path: path.to_owned(),
				source,
			}
		})?;

		debug!("mapped {} ({} bytes)", path.display(), mmap.len());

		Ok(Self { mmap })
	}
}

impl Deref for Mapping {
	type Target = [u8];

	fn deref(&self) -> &Self::Target {
		&self.mmap
	}
}

impl AsRef<[u8]> for Mapping {
	fn as_ref(&self) -> &[u8] {
		self
	}
}
