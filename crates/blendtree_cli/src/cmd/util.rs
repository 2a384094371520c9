use std::io::Write;
use std::path::Path;

use blendtree::blend::{BlendFile, ParsedFile, Result};

/// Open and fully parse a file.
pub(crate) fn load(path: &Path) -> Result<ParsedFile> {
	BlendFile::open(path)?.parse()
}

/// Clap value parser for an up-to-4 ASCII block code, NUL padded.
pub(crate) fn parse_block_code(code: &str) -> std::result::Result<[u8; 4], String> {
	if code.is_empty() || code.len() > 4 || !code.is_ascii() {
		return Err(format!("block code must be 1 to 4 ASCII characters, got {code:?}"));
	}

	let mut out = [0_u8; 4];
	out[..code.len()].copy_from_slice(code.as_bytes());
	Ok(out)
}

/// Clap value parser for a decimal or `0x`-prefixed hex address.
pub(crate) fn parse_addr(value: &str) -> std::result::Result<u64, String> {
	let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
		Some(hex) => u64::from_str_radix(hex, 16),
		None => value.parse::<u64>(),
	};
	parsed.map_err(|_| format!("invalid address {value:?}"))
}

/// Hex address zero-padded to the file pointer width.
pub(crate) fn addr_hex(addr: u64, pointer_size: usize) -> String {
	let width = pointer_size * 2;
	format!("0x{addr:0width$x}")
}

/// Print a serializable value as pretty JSON on stdout.
pub(crate) fn emit_json<T: serde::Serialize>(value: &T) -> Result<()> {
	write_json(std::io::stdout().lock(), value)
}

fn write_json<W: Write, T: serde::Serialize>(mut out: W, value: &T) -> Result<()> {
	serde_json::to_writer_pretty(&mut out, value).map_err(std::io::Error::from)?;
	writeln!(out)?;
	Ok(())
}

#[cfg(test)]
mod tests {
	use blendtree::blend::{BlendError, ErrorKind};
	use serde::ser::{Error as _, Serialize, Serializer};

	use super::{addr_hex, parse_addr, parse_block_code, write_json};

	struct Unserializable;

	impl Serialize for Unserializable {
		fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
			Err(S::Error::custom("value has no json form"))
		}
	}

	#[test]
	fn block_codes_are_nul_padded() {
		assert_eq!(parse_block_code("OB"), Ok(*b"OB\0\0"));
		assert_eq!(parse_block_code("DATA"), Ok(*b"DATA"));
		assert!(parse_block_code("").is_err());
		assert!(parse_block_code("TOOLONG").is_err());
	}

	#[test]
	fn addresses_accept_hex_and_decimal() {
		assert_eq!(parse_addr("0x1f"), Ok(31));
		assert_eq!(parse_addr("4096"), Ok(4096));
		assert!(parse_addr("0xzz").is_err());
		assert_eq!(addr_hex(0x10, 4), "0x00000010");
	}

	#[test]
	fn json_output_ends_with_newline() {
		let mut out = Vec::new();
		write_json(&mut out, &serde_json::json!({ "count": 2 })).expect("writes");
		assert_eq!(String::from_utf8(out).expect("utf8"), "{\n  \"count\": 2\n}\n");
	}

	#[test]
	fn serialization_failure_is_an_error() {
		let err = write_json(Vec::new(), &Unserializable).expect_err("serializer refuses");
		assert!(matches!(err, BlendError::Io(_)));
		assert_eq!(err.kind(), ErrorKind::Io);
	}
}
