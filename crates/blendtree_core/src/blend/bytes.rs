use crate::blend::{BlendError, Endianness, Result};

/// Bounded cursor over an immutable byte slice, reading in a fixed byte order.
pub struct Cursor<'a> {
	bytes: &'a [u8],
	pos: usize,
	endianness: Endianness,
}

macro_rules! read_int {
	($(#[$doc:meta] $name:ident -> $ty:ty),* $(,)?) => {
		$(
			#[$doc]
			pub fn $name(&mut self) -> Result<$ty> {
				let raw = self.read_exact(std::mem::size_of::<$ty>())?;
				let mut buf = [0_u8; std::mem::size_of::<$ty>()];
				buf.copy_from_slice(raw);
				Ok(match self.endianness {
					Endianness::Little => <$ty>::from_le_bytes(buf),
					Endianness::Big => <$ty>::from_be_bytes(buf),
				})
			}
		)*
	};
}

impl<'a> Cursor<'a> {
	/// Create a cursor at position 0.
	pub fn new(bytes: &'a [u8], endianness: Endianness) -> Self {
		Self { bytes, pos: 0, endianness }
	}

	/// Return current byte offset.
	pub fn pos(&self) -> usize {
		self.pos
	}

	/// Return remaining unread bytes.
	pub fn remaining(&self) -> usize {
		self.bytes.len().saturating_sub(self.pos)
	}

	/// Byte order used for multi-byte reads.
	pub fn endianness(&self) -> Endianness {
		self.endianness
	}

	/// Read exactly `n` bytes and advance cursor.
	pub fn read_exact(&mut self, n: usize) -> Result<&'a [u8]> {
		if n > self.remaining() {
			return Err(BlendError::UnexpectedEof {
				at: self.pos,
				need: n,
				rem: self.remaining(),
			});
		}

		let start = self.pos;
		self.pos += n;
		Ok(&self.bytes[start..self.pos])
	}

	/// Read a four-byte code.
	pub fn read_code4(&mut self) -> Result<[u8; 4]> {
		let raw = self.read_exact(4)?;
		let mut out = [0_u8; 4];
		out.copy_from_slice(raw);
		Ok(out)
	}

	read_int! {
		/// Read a `u16`.
		read_u16 -> u16,
		/// Read an `i16`.
		read_i16 -> i16,
		/// Read a `u32`.
		read_u32 -> u32,
		/// Read an `i32`.
		read_i32 -> i32,
		/// Read a `u64`.
		read_u64 -> u64,
		/// Read an `i64`.
		read_i64 -> i64,
	}

	/// Read a pointer-sized unsigned integer and widen to `u64`.
	pub fn read_ptr(&mut self, pointer_size: usize) -> Result<u64> {
		match pointer_size {
			4 => Ok(u64::from(self.read_u32()?)),
			8 => self.read_u64(),
			_ => Err(BlendError::UnsupportedPointerSize { header_size: pointer_size }),
		}
	}

	/// Advance to the next 4-byte aligned position.
	pub fn align4(&mut self) -> Result<()> {
		let aligned = (self.pos + 3) & !3;
		let skip = aligned.saturating_sub(self.pos);
		let _ = self.read_exact(skip)?;
		Ok(())
	}

	/// Advance to the next 4-byte aligned position, stopping early at end of data.
	pub fn align4_lenient(&mut self) {
		let aligned = (self.pos + 3) & !3;
		self.pos = aligned.min(self.bytes.len()).max(self.pos);
	}

	/// Read a zero-terminated byte string without the terminator.
	pub fn read_cstring_bytes(&mut self) -> Result<&'a [u8]> {
		let start = self.pos;
		let rem = self.bytes.get(self.pos..).unwrap_or(&[]);
		let Some(rel_end) = rem.iter().position(|byte| *byte == 0) else {
			return Err(BlendError::UnexpectedEof {
				at: self.pos,
				need: 1,
				rem: self.remaining(),
			});
		};

		let end = start + rel_end;
		self.pos = end + 1;
		Ok(&self.bytes[start..end])
	}
}

#[cfg(test)]
mod tests {
	use super::Cursor;
	use crate::blend::{BlendError, Endianness};

	#[test]
	fn reads_follow_selected_byte_order() {
		let bytes = [0x01, 0x02, 0x03, 0x04];
		let mut little = Cursor::new(&bytes, Endianness::Little);
		let mut big = Cursor::new(&bytes, Endianness::Big);
		assert_eq!(little.read_u32().expect("read"), 0x0403_0201);
		assert_eq!(big.read_u32().expect("read"), 0x0102_0304);
	}

	#[test]
	fn align4_lenient_stops_at_end() {
		let bytes = [0_u8; 6];
		let mut cursor = Cursor::new(&bytes, Endianness::Little);
		cursor.read_exact(5).expect("read");
		cursor.align4_lenient();
		assert_eq!(cursor.pos(), 6);
		assert_eq!(cursor.remaining(), 0);
	}

	#[test]
	fn short_read_reports_offset() {
		let bytes = [0_u8; 3];
		let mut cursor = Cursor::new(&bytes, Endianness::Little);
		let err = cursor.read_u32().expect_err("short read fails");
		assert!(matches!(err, BlendError::UnexpectedEof { at: 0, need: 4, rem: 3 }));
	}

	#[test]
	fn cstring_without_terminator_is_eof() {
		let bytes = *b"abc";
		let mut cursor = Cursor::new(&bytes, Endianness::Little);
		assert!(cursor.read_cstring_bytes().is_err());
	}
}
