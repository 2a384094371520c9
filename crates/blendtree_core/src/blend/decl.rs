use crate::blend::{BlendError, Result};

/// Inline array shape of a field declarator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArrayDims {
	/// Not an array.
	#[default]
	Scalar,
	/// `name[n]`.
	One(usize),
	/// `name[n][m]`, `n` outer.
	Two(usize, usize),
}

impl ArrayDims {
	/// Total element count; `1` for scalars.
	pub fn len(self) -> usize {
		match self {
			Self::Scalar => 1,
			Self::One(n) => n,
			Self::Two(n, m) => n.saturating_mul(m),
		}
	}

	/// Whether the flattened element count is zero.
	pub fn is_empty(self) -> bool {
		self.len() == 0
	}

	/// Whether the declarator has any bracket pair.
	pub fn is_array(self) -> bool {
		!matches!(self, Self::Scalar)
	}

	/// Dimensions as a list, outermost first.
	pub fn to_vec(self) -> Vec<usize> {
		match self {
			Self::Scalar => Vec::new(),
			Self::One(n) => vec![n],
			Self::Two(n, m) => vec![n, m],
		}
	}
}

/// Shape metadata decoded from a raw SDNA field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
	/// Identifier portion of the declarator.
	pub ident: Box<str>,
	/// Pointer nesting depth, 0 to 2.
	pub ptr_depth: u8,
	/// Inline array shape.
	pub dims: ArrayDims,
	/// Declarator is a function pointer such as `(*exec)()`.
	pub is_func_ptr: bool,
}

impl FieldDecl {
	/// Whether the field stores addresses rather than inline data.
	pub fn is_pointer(&self) -> bool {
		self.ptr_depth > 0
	}
}

/// Decode SDNA declarator text into base name, pointer depth, and array dimensions.
///
/// Both schema building and materialization go through this function, so the field
/// shape and the byte layout can never disagree.
pub fn parse_field_decl(raw: &str) -> Result<FieldDecl> {
	let trimmed = raw.trim();

	if let Some(inner) = trimmed.strip_prefix('(') {
		let close = inner.find(')').ok_or_else(|| bad_name(raw))?;
		let inside = &inner[..close];
		let stars = inside.chars().take_while(|c| *c == '*').count();
		if stars == 0 {
			return Err(bad_name(raw));
		}
		check_depth(raw, stars)?;
		let ident = inside[stars..].trim();
		if ident.is_empty() {
			return Err(bad_name(raw));
		}
		return Ok(FieldDecl {
			ident: ident.into(),
			ptr_depth: stars as u8,
			dims: ArrayDims::Scalar,
			is_func_ptr: inner[close + 1..].trim_start().starts_with('('),
		});
	}

	let stars = trimmed.chars().take_while(|c| *c == '*').count();
	check_depth(raw, stars)?;
	let rest = &trimmed[stars..];

	let ident_end = rest.find('[').unwrap_or(rest.len());
	let ident = rest[..ident_end].trim();
	if ident.is_empty() {
		return Err(bad_name(raw));
	}

	let mut dims = Vec::new();
	let mut tail = &rest[ident_end..];
	while !tail.is_empty() {
		let body = tail.strip_prefix('[').ok_or_else(|| bad_name(raw))?;
		let end = body.find(']').ok_or_else(|| bad_name(raw))?;
		let dim = body[..end].trim().parse::<usize>().map_err(|_| bad_name(raw))?;
		dims.push(dim);
		tail = &body[end + 1..];
	}

	let dims = match dims.as_slice() {
		[] => ArrayDims::Scalar,
		[n] => ArrayDims::One(*n),
		[n, m] => ArrayDims::Two(*n, *m),
		_ => {
			return Err(BlendError::ArrayRankUnsupported {
				name: raw.to_owned(),
				rank: dims.len(),
			});
		}
	};

	Ok(FieldDecl {
		ident: ident.into(),
		ptr_depth: stars as u8,
		dims,
		is_func_ptr: false,
	})
}

fn check_depth(raw: &str, depth: usize) -> Result<()> {
	if depth > 2 {
		return Err(BlendError::PointerDepthUnsupported {
			name: raw.to_owned(),
			depth,
		});
	}
	Ok(())
}

fn bad_name(raw: &str) -> BlendError {
	BlendError::DnaBadFieldName { name: raw.to_owned() }
}

#[cfg(test)]
mod tests {
	use super::{ArrayDims, parse_field_decl};
	use crate::blend::{BlendError, ErrorKind};

	#[test]
	fn plain_scalar() {
		let decl = parse_field_decl("totvert").expect("parses");
		assert_eq!(&*decl.ident, "totvert");
		assert_eq!(decl.ptr_depth, 0);
		assert_eq!(decl.dims, ArrayDims::Scalar);
		assert_eq!(decl.dims.len(), 1);
	}

	#[test]
	fn pointer_depth_counts_leading_stars() {
		assert_eq!(parse_field_decl("*next").expect("parses").ptr_depth, 1);
		let decl = parse_field_decl("**mat").expect("parses");
		assert_eq!(decl.ptr_depth, 2);
		assert_eq!(&*decl.ident, "mat");
	}

	#[test]
	fn three_stars_is_unsupported() {
		let err = parse_field_decl("***deep").expect_err("depth 3 rejected");
		assert!(matches!(err, BlendError::PointerDepthUnsupported { depth: 3, .. }));
		assert_eq!(err.kind(), ErrorKind::UnsupportedShape);
	}

	#[test]
	fn one_and_two_dimensional_arrays() {
		let decl = parse_field_decl("name[66]").expect("parses");
		assert_eq!(&*decl.ident, "name");
		assert_eq!(decl.dims, ArrayDims::One(66));

		let decl = parse_field_decl("obmat[4][4]").expect("parses");
		assert_eq!(decl.dims, ArrayDims::Two(4, 4));
		assert_eq!(decl.dims.len(), 16);
		assert_eq!(decl.dims.to_vec(), vec![4, 4]);
	}

	#[test]
	fn pointer_array_keeps_both_shapes() {
		let decl = parse_field_decl("*mtex[18]").expect("parses");
		assert_eq!(decl.ptr_depth, 1);
		assert_eq!(&*decl.ident, "mtex");
		assert_eq!(decl.dims, ArrayDims::One(18));
	}

	#[test]
	fn three_dimensions_is_unsupported() {
		let err = parse_field_decl("cube[2][2][2]").expect_err("rank 3 rejected");
		assert!(matches!(err, BlendError::ArrayRankUnsupported { rank: 3, .. }));
	}

	#[test]
	fn function_pointer_declarators() {
		let decl = parse_field_decl("(*exec)()").expect("parses");
		assert_eq!(&*decl.ident, "exec");
		assert_eq!(decl.ptr_depth, 1);
		assert!(decl.is_func_ptr);

		let decl = parse_field_decl("(*next)").expect("parses");
		assert_eq!(decl.ptr_depth, 1);
		assert!(!decl.is_func_ptr);
	}

	#[test]
	fn zero_sized_array_is_preserved() {
		let decl = parse_field_decl("weights[0]").expect("parses");
		assert_eq!(decl.dims, ArrayDims::One(0));
		assert!(decl.dims.is_empty());
	}

	#[test]
	fn malformed_brackets_are_schema_errors() {
		for raw in ["a[", "a[x]", "a]", "[4]", "a[4]b"] {
			let err = parse_field_decl(raw).expect_err("malformed rejected");
			assert_eq!(err.kind(), ErrorKind::Schema, "{raw}");
		}
	}
}
