use crate::blend::bytes::Cursor;
use crate::blend::{BlendError, BlendHeader, Result};

/// Parsed block header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BHead {
	/// Four-byte block code.
	pub code: [u8; 4],
	/// SDNA struct index for payload interpretation.
	pub sdna_nr: u32,
	/// Old memory address the payload had when the file was written, widened to 64 bits.
	pub old: u64,
	/// Payload byte length.
	pub len: u64,
	/// Number of elements stored in payload.
	pub nr: u64,
}

impl BHead {
	/// Code of the SDNA block.
	pub const DNA1: [u8; 4] = *b"DNA1";
	/// Code of the terminal block.
	pub const ENDB: [u8; 4] = *b"ENDB";

	/// Parse a block header from cursor position.
	pub fn parse(cursor: &mut Cursor<'_>, header: BlendHeader) -> Result<Self> {
		if header.format_version == BlendHeader::LEGACY_FORMAT_VERSION {
			return Self::parse_legacy(cursor, header);
		}
		Self::parse_v1(cursor)
	}

	/// Encoded header size in bytes for the given file layout.
	pub fn encoded_size(header: BlendHeader) -> usize {
		if header.format_version == BlendHeader::LEGACY_FORMAT_VERSION {
			16 + header.pointer_size
		} else {
			32
		}
	}

	fn parse_v1(cursor: &mut Cursor<'_>) -> Result<Self> {
		let code = cursor.read_code4()?;
		let sdna_nr = cursor.read_u32()?;
		let old = cursor.read_u64()?;

		let len = cursor.read_i64()?;
		if len < 0 {
			return Err(BlendError::NegativeBlockLength { len });
		}

		let nr = cursor.read_i64()?;
		if nr < 0 {
			return Err(BlendError::NegativeBlockCount { nr });
		}

		Ok(Self {
			code,
			sdna_nr,
			old,
			len: len as u64,
			nr: nr as u64,
		})
	}

	fn parse_legacy(cursor: &mut Cursor<'_>, header: BlendHeader) -> Result<Self> {
		let code = cursor.read_code4()?;
		let len = i64::from(cursor.read_i32()?);
		if len < 0 {
			return Err(BlendError::NegativeBlockLength { len });
		}

		let old = cursor.read_ptr(header.pointer_size)?;
		let sdna_nr = cursor.read_u32()?;
		let nr = i64::from(cursor.read_i32()?);
		if nr < 0 {
			return Err(BlendError::NegativeBlockCount { nr });
		}

		Ok(Self {
			code,
			sdna_nr,
			old,
			len: len as u64,
			nr: nr as u64,
		})
	}

	/// Return `true` when this is the terminal `ENDB` block.
	pub fn is_endb(&self) -> bool {
		self.code == Self::ENDB
	}

	/// Return `true` when this block carries the SDNA catalog.
	pub fn is_dna(&self) -> bool {
		self.code == Self::DNA1
	}
}

#[cfg(test)]
mod tests;
