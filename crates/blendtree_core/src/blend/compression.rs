use std::io::Read;

use crate::blend::{BlendError, Result};

const BLEND_MAGIC: &[u8] = b"BLENDER";
/// zstd frame magic that prefixes compressed `.blend` files.
pub const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];
/// Largest decompressed stream accepted.
pub const MAX_DECOMPRESSED_BYTES: usize = 512 * 1024 * 1024;

/// How the source bytes were stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
	/// Plain `BLENDER` stream.
	None,
	/// zstd frame around a `BLENDER` stream.
	Zstd,
}

impl Compression {
	/// Stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::None => "none",
			Self::Zstd => "zstd",
		}
	}
}

/// Sniff the leading magic and return the plain `BLENDER` stream.
pub fn unwrap_stream(raw: Vec<u8>) -> Result<(Compression, Vec<u8>)> {
	if raw.starts_with(BLEND_MAGIC) {
		return Ok((Compression::None, raw));
	}
	if raw.starts_with(&ZSTD_MAGIC) {
		return Ok((Compression::Zstd, inflate(&raw, MAX_DECOMPRESSED_BYTES)?));
	}

	let mut magic = [0_u8; 4];
	let take = raw.len().min(4);
	magic[..take].copy_from_slice(&raw[..take]);
	Err(BlendError::UnknownMagic { magic })
}

fn inflate(raw: &[u8], limit: usize) -> Result<Vec<u8>> {
	let decoder = zstd::stream::read::Decoder::new(raw)?;
	let mut out = Vec::new();
	decoder.take(limit as u64 + 1).read_to_end(&mut out)?;

	if out.len() > limit {
		return Err(BlendError::DecompressedTooLarge { limit });
	}
	if !out.starts_with(BLEND_MAGIC) {
		return Err(BlendError::NotBlendAfterDecompress);
	}

	tracing::debug!(compressed = raw.len(), inflated = out.len(), "decompressed zstd stream");
	Ok(out)
}

#[cfg(test)]
mod tests {
	use super::{Compression, inflate, unwrap_stream};
	use crate::blend::{BlendError, ErrorKind};

	#[test]
	fn plain_stream_passes_through() {
		let (mode, bytes) = unwrap_stream(b"BLENDER_v271".to_vec()).expect("plain accepted");
		assert_eq!(mode, Compression::None);
		assert_eq!(bytes, b"BLENDER_v271");
	}

	#[test]
	fn zstd_stream_is_inflated() {
		let packed = zstd::encode_all(&b"BLENDER-v300rest"[..], 3).expect("compress");
		let (mode, bytes) = unwrap_stream(packed).expect("zstd accepted");
		assert_eq!(mode, Compression::Zstd);
		assert_eq!(bytes, b"BLENDER-v300rest");
	}

	#[test]
	fn zstd_of_something_else_is_rejected() {
		let packed = zstd::encode_all(&b"PK\x03\x04 not a blend"[..], 3).expect("compress");
		let err = unwrap_stream(packed).expect_err("payload rejected");
		assert!(matches!(err, BlendError::NotBlendAfterDecompress));
	}

	#[test]
	fn output_over_limit_is_rejected() {
		let packed = zstd::encode_all(&[b'B'; 64][..], 3).expect("compress");
		let err = inflate(&packed, 16).expect_err("limit enforced");
		assert!(matches!(err, BlendError::DecompressedTooLarge { limit: 16 }));
	}

	#[test]
	fn unknown_magic_is_format_error() {
		let err = unwrap_stream(b"\x1f\x8b".to_vec()).expect_err("gzip rejected");
		assert!(matches!(err, BlendError::UnknownMagic { magic: [0x1f, 0x8b, 0, 0] }));
		assert_eq!(err.kind(), ErrorKind::Format);
	}
}
