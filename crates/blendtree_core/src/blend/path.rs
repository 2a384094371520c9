use std::fmt;

use crate::blend::{BlendError, Result};

/// One step of a field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
	/// Select a field by base name.
	Field(String),
	/// Select the element of a nested-struct array by zero-based index.
	Index(usize),
}

/// Dotted field path such as `id.name` or `mtex[2].tex`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
	/// Ordered steps.
	pub steps: Vec<PathStep>,
}

impl FieldPath {
	/// Parse dotted field syntax with optional `[index]` selectors after each segment.
	pub fn parse(input: &str) -> Result<Self> {
		let invalid = || BlendError::InvalidFieldPath { path: input.to_owned() };
		if input.is_empty() {
			return Err(invalid());
		}

		let mut steps = Vec::new();
		for segment in input.split('.') {
			let ident_end = segment.find('[').unwrap_or(segment.len());
			let ident = &segment[..ident_end];
			if ident.is_empty() || !ident.bytes().all(|byte| byte.is_ascii_alphanumeric() || byte == b'_') {
				return Err(invalid());
			}
			steps.push(PathStep::Field(ident.to_owned()));

			let mut rest = &segment[ident_end..];
			while let Some(body) = rest.strip_prefix('[') {
				let close = body.find(']').ok_or_else(invalid)?;
				let digits = &body[..close];
				if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
					return Err(invalid());
				}
				steps.push(PathStep::Index(digits.parse().map_err(|_| invalid())?));
				rest = &body[close + 1..];
			}
			if !rest.is_empty() {
				return Err(invalid());
			}
		}

		Ok(Self { steps })
	}
}

impl fmt::Display for FieldPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (idx, step) in self.steps.iter().enumerate() {
			match step {
				PathStep::Field(name) if idx == 0 => f.write_str(name)?,
				PathStep::Field(name) => write!(f, ".{name}")?,
				PathStep::Index(index) => write!(f, "[{index}]")?,
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::{FieldPath, PathStep};

	#[test]
	fn parses_fields_and_indices() {
		let path = FieldPath::parse("mtex[2].tex").expect("parses");
		assert_eq!(
			path.steps,
			vec![PathStep::Field("mtex".into()), PathStep::Index(2), PathStep::Field("tex".into())]
		);
		assert_eq!(path.to_string(), "mtex[2].tex");
	}

	#[test]
	fn rejects_malformed_paths() {
		for input in ["", ".a", "a.", "a..b", "a[", "a[]", "a[x]", "a[1]b", "a-b"] {
			assert!(FieldPath::parse(input).is_err(), "{input:?} should be rejected");
		}
	}
}
