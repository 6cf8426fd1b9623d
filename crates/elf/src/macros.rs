/// Consumes bytes from the front of the `$bytes` slice and converts them to
/// the requested type. The `$bytes` slice will be advanced by the amount of
/// bytes consumed for the type.
///
/// The caller is responsible for checking that `$bytes` is long enough.
macro_rules! consume {
	// Consumes `size_of<$type>` bytes and converts them to `$type` with the
	// given `crate::header::Endianness`.
	( $bytes:ident, $endianness:expr => $type:ty ) => {{
		const SIZE: usize = core::mem::size_of::<$type>();

		let buf: [u8; SIZE] = consume!($bytes, SIZE);
		match $endianness {
			crate::header::Endianness::Little => <$type>::from_le_bytes(buf),
			crate::header::Endianness::Big => <$type>::from_be_bytes(buf),
		}
	}};
	// Consumes `$len` bytes and returns them as array.
	( $bytes:ident, $len:expr ) => {{
		let mut buf = [0u8; $len];
		let (left, right) = $bytes.split_at($len);
		buf.copy_from_slice(left);
		$bytes = right;
		buf
	}};
}
