use crate::error::{Error, ErrorKind, Result};

/// Returns `len` bytes of `bytes` starting at `offset`.
///
/// Offsets come straight from the file, so every conversion and addition is
/// checked before slicing.
pub(crate) fn range(bytes: &[u8], offset: u64, len: u64) -> Result<&[u8]> {
	let out_of_bounds = || {
		Error::new(ErrorKind::OutOfBounds {
			offset,
			len,
			available: bytes.len(),
		})
	};

	let start = usize::try_from(offset).map_err(|_| out_of_bounds())?;
	let len = usize::try_from(len).map_err(|_| out_of_bounds())?;
	let end = start.checked_add(len).ok_or_else(out_of_bounds)?;

	bytes.get(start..end).ok_or_else(out_of_bounds)
}
