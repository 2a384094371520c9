use std::fmt;

use crate::blend::prim::braced;
use crate::blend::{ArrayDims, FieldPath, PathStep, Primitive, PrimitiveArray};

/// Addresses read from a pointer-array field, flattened row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerArray {
	/// Declared shape.
	pub dims: ArrayDims,
	/// Old addresses widened to 64 bits.
	pub addrs: Vec<u64>,
}

impl PointerArray {
	/// Addresses grouped by outer index; a 1D array is a single row.
	pub fn rows(&self) -> Vec<&[u64]> {
		match self.dims {
			ArrayDims::Two(_, inner) if inner > 0 => self.addrs.chunks(inner).collect(),
			_ => vec![self.addrs.as_slice()],
		}
	}
}

/// Materialized payload of one field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
	/// Single primitive.
	Scalar(Primitive),
	/// 1D or 2D primitive array.
	Array(PrimitiveArray),
	/// Single pointer; `0` is null.
	Pointer(u64),
	/// 1D or 2D pointer array.
	PointerArray(PointerArray),
	/// Inline nested structure, or one element of a nested-structure array.
	Struct(Structure),
}

/// One materialized field with the schema metadata needed to interpret it.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
	/// Base name, or `base[i]` for an element of a nested-structure array.
	pub name: Box<str>,
	/// Dotted path from the root structure, root excluded.
	pub qualified_name: String,
	/// Type name of the enclosing structure.
	pub parent_type: Box<str>,
	/// SDNA type name.
	pub type_name: Box<str>,
	/// Bytes this field occupies in its parent.
	pub size: usize,
	/// Pointer depth, 0 to 2.
	pub ptr_depth: u8,
	/// Array shape. Nested-structure array elements are scalars.
	pub dims: ArrayDims,
	/// File pointer width, used when rendering addresses.
	pub pointer_size: u8,
	/// Decoded payload.
	pub value: FieldValue,
}

impl Field {
	/// Field name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Dotted path, for example `id.name`.
	pub fn qualified_name(&self) -> &str {
		&self.qualified_name
	}

	/// SDNA type name.
	pub fn type_name(&self) -> &str {
		&self.type_name
	}

	/// Type name of the structure that declares this field.
	pub fn parent_type(&self) -> &str {
		&self.parent_type
	}

	/// Bytes occupied.
	pub fn size_bytes(&self) -> usize {
		self.size
	}

	/// Whether the field holds addresses.
	pub fn is_pointer(&self) -> bool {
		self.ptr_depth > 0
	}

	/// Whether the field was declared with brackets.
	pub fn is_array(&self) -> bool {
		self.dims.is_array()
	}

	/// Whether the field was declared with two bracket pairs.
	pub fn is_2d_array(&self) -> bool {
		matches!(self.dims, ArrayDims::Two(..))
	}

	/// Flattened element count; `1` for scalars.
	pub fn length(&self) -> usize {
		self.dims.len()
	}

	/// Decoded payload.
	pub fn value(&self) -> &FieldValue {
		&self.value
	}

	/// Scalar primitive payload.
	pub fn as_primitive(&self) -> Option<Primitive> {
		match &self.value {
			FieldValue::Scalar(value) => Some(*value),
			_ => None,
		}
	}

	/// Primitive array payload.
	pub fn as_array(&self) -> Option<&PrimitiveArray> {
		match &self.value {
			FieldValue::Array(value) => Some(value),
			_ => None,
		}
	}

	/// Single address payload.
	pub fn as_pointer(&self) -> Option<u64> {
		match self.value {
			FieldValue::Pointer(addr) => Some(addr),
			_ => None,
		}
	}

	/// Every address held by a pointer or pointer-array field.
	///
	/// This is the accessor for pointer-to-pointer fields, which cannot be dereferenced.
	pub fn raw_addresses(&self) -> Option<Vec<u64>> {
		match &self.value {
			FieldValue::Pointer(addr) => Some(vec![*addr]),
			FieldValue::PointerArray(array) => Some(array.addrs.clone()),
			_ => None,
		}
	}

	/// Nested structure payload.
	pub fn as_struct(&self) -> Option<&Structure> {
		match &self.value {
			FieldValue::Struct(value) => Some(value),
			_ => None,
		}
	}

	fn fmt_addr(&self, addr: u64) -> String {
		if addr == 0 {
			return "0x0".to_owned();
		}
		let width = usize::from(self.pointer_size) * 2;
		format!("0x{addr:0width$x}")
	}
}

impl fmt::Display for Field {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.value {
			FieldValue::Scalar(value) => write!(f, "{value}"),
			FieldValue::Array(value) => write!(f, "{value}"),
			FieldValue::Pointer(addr) => f.write_str(&self.fmt_addr(*addr)),
			FieldValue::PointerArray(array) => {
				let render = |row: &[u64]| -> Vec<String> { row.iter().map(|addr| self.fmt_addr(*addr)).collect() };
				if matches!(array.dims, ArrayDims::Two(..)) {
					let rows: Vec<String> = array.rows().into_iter().map(|row| braced(&render(row))).collect();
					f.write_str(&braced(&rows))
				} else {
					f.write_str(&braced(&render(&array.addrs)))
				}
			}
			FieldValue::Struct(value) => write!(f, "{value}"),
		}
	}
}

/// One materialized structure instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Structure {
	/// SDNA type name.
	pub type_name: Box<str>,
	/// Field name in the parent, or the type name for a block-level root.
	pub name: Box<str>,
	/// Dotted path from the root; empty for the root itself.
	pub qualified_name: String,
	/// Declared size in bytes.
	pub size: usize,
	/// Fields in declaration order.
	pub fields: Vec<Field>,
	/// Old address of this element for block-level roots.
	pub origin: Option<u64>,
}

impl Structure {
	/// First field whose name equals `name`. Nested-array elements are named `base[i]`.
	pub fn get(&self, name: &str) -> Option<&Field> {
		self.fields.iter().find(|field| &*field.name == name)
	}

	/// Resolve a dotted path string. Malformed paths resolve to `None`.
	pub fn lookup_str(&self, path: &str) -> Option<&Field> {
		FieldPath::parse(path).ok().and_then(|path| self.lookup(&path))
	}

	/// Resolve a parsed path.
	///
	/// An `[i]` step selects the `base[i]` element of a nested-structure array.
	/// Indexing a primitive or pointer array resolves to `None`; read its value instead.
	pub fn lookup(&self, path: &FieldPath) -> Option<&Field> {
		let mut current = self;
		let mut found: Option<&Field> = None;
		let mut steps = path.steps.iter().peekable();

		while let Some(step) = steps.next() {
			if let Some(field) = found {
				current = field.as_struct()?;
			}

			let PathStep::Field(name) = step else {
				return None;
			};

			let mut field = current.get(name);
			while let Some(PathStep::Index(index)) = steps.peek() {
				steps.next();
				field = Some(current.get(&format!("{name}[{index}]"))?);
			}
			found = Some(field?);
		}

		found
	}

	/// Depth-first iterator over every non-structure field.
	pub fn leaves(&self) -> Leaves<'_> {
		Leaves {
			stack: vec![self.fields.iter()],
		}
	}

	/// Count of leaf fields.
	pub fn num_fields(&self) -> usize {
		self.leaves().count()
	}
}

impl fmt::Display for Structure {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} {{ {} fields }}", self.type_name, self.fields.len())
	}
}

/// Iterator returned by [`Structure::leaves`].
pub struct Leaves<'a> {
	stack: Vec<std::slice::Iter<'a, Field>>,
}

impl<'a> Iterator for Leaves<'a> {
	type Item = &'a Field;

	fn next(&mut self) -> Option<Self::Item> {
		loop {
			let iter = self.stack.last_mut()?;
			let Some(field) = iter.next() else {
				self.stack.pop();
				continue;
			};
			match &field.value {
				FieldValue::Struct(nested) => self.stack.push(nested.fields.iter()),
				_ => return Some(field),
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::{Field, FieldValue, PointerArray, Structure};
	use crate::blend::{ArrayDims, Primitive};

	fn leaf(name: &str, qualified: &str, value: FieldValue) -> Field {
		Field {
			name: name.into(),
			qualified_name: qualified.to_owned(),
			parent_type: "Test".into(),
			type_name: "int".into(),
			size: 4,
			ptr_depth: 0,
			dims: ArrayDims::Scalar,
			pointer_size: 8,
			value,
		}
	}

	fn nested(name: &str, fields: Vec<Field>) -> Field {
		let inner = Structure {
			type_name: "Inner".into(),
			name: name.into(),
			qualified_name: name.to_owned(),
			size: 4,
			fields,
			origin: None,
		};
		Field {
			type_name: "Inner".into(),
			..leaf(name, name, FieldValue::Struct(inner))
		}
	}

	fn root() -> Structure {
		Structure {
			type_name: "Test".into(),
			name: "Test".into(),
			qualified_name: String::new(),
			size: 16,
			fields: vec![
				leaf("a", "a", FieldValue::Scalar(Primitive::I32(1))),
				nested("slot[0]", vec![leaf("x", "slot[0].x", FieldValue::Scalar(Primitive::I32(2)))]),
				nested("slot[1]", vec![leaf("x", "slot[1].x", FieldValue::Scalar(Primitive::I32(3)))]),
			],
			origin: Some(0x1000),
		}
	}

	#[test]
	fn lookup_walks_nested_array_elements() {
		let root = root();
		let field = root.lookup_str("slot[1].x").expect("path resolves");
		assert_eq!(field.as_primitive(), Some(Primitive::I32(3)));
		assert_eq!(field.qualified_name(), "slot[1].x");
		assert!(root.lookup_str("slot[2].x").is_none());
		assert!(root.lookup_str("a.b").is_none());
	}

	#[test]
	fn leaves_flatten_depth_first() {
		let root = root();
		let names: Vec<&str> = root.leaves().map(Field::qualified_name).collect();
		assert_eq!(names, vec!["a", "slot[0].x", "slot[1].x"]);
		assert_eq!(root.num_fields(), 3);
		assert_eq!(root.to_string(), "Test { 3 fields }");
	}

	#[test]
	fn pointers_render_padded_to_pointer_width() {
		let mut field = leaf("next", "next", FieldValue::Pointer(0x1f0));
		field.ptr_depth = 1;
		field.pointer_size = 4;
		assert_eq!(field.to_string(), "0x000001f0");

		field.value = FieldValue::Pointer(0);
		assert_eq!(field.to_string(), "0x0");

		field.dims = ArrayDims::Two(2, 1);
		field.value = FieldValue::PointerArray(PointerArray {
			dims: ArrayDims::Two(2, 1),
			addrs: vec![0x10, 0],
		});
		assert_eq!(field.to_string(), "{ { 0x00000010 }, { 0x0 } }");
		assert_eq!(field.raw_addresses(), Some(vec![0x10, 0]));
	}
}
