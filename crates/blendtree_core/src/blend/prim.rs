use std::fmt;

use crate::blend::bytes::Cursor;
use crate::blend::{ArrayDims, BlendError, Endianness, Result};

/// Fixed-width wire type of a primitive SDNA field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimKind {
	/// 8-bit C `char`.
	Char,
	/// Signed 8-bit integer.
	I8,
	/// Unsigned 8-bit integer.
	U8,
	/// Signed 16-bit integer.
	I16,
	/// Unsigned 16-bit integer.
	U16,
	/// Signed 32-bit integer.
	I32,
	/// Unsigned 32-bit integer.
	U32,
	/// Signed 64-bit integer.
	I64,
	/// Unsigned 64-bit integer.
	U64,
	/// IEEE-754 single.
	F32,
	/// IEEE-754 double.
	F64,
}

impl PrimKind {
	/// Resolve the wire type for an SDNA primitive type name.
	///
	/// `long` and `ulong` follow the file's pointer width. When a known type's width
	/// disagrees with `declared`, the declared size wins so reads stay in step with the
	/// schema. Unknown names decode as an unsigned integer of the declared size.
	pub fn for_type(name: &str, declared: u16, pointer_size: usize) -> Result<Self> {
		let wide = pointer_size != 4;
		let known = match name {
			"char" => Some(Self::Char),
			"uchar" | "uint8_t" | "bool" => Some(Self::U8),
			"int8_t" => Some(Self::I8),
			"short" | "int16_t" => Some(Self::I16),
			"ushort" | "uint16_t" => Some(Self::U16),
			"int" | "int32_t" => Some(Self::I32),
			"uint" | "uint32_t" => Some(Self::U32),
			"long" => Some(if wide { Self::I64 } else { Self::I32 }),
			"ulong" => Some(if wide { Self::U64 } else { Self::U32 }),
			"int64_t" => Some(Self::I64),
			"uint64_t" => Some(Self::U64),
			"float" => Some(Self::F32),
			"double" => Some(Self::F64),
			_ => None,
		};

		match known {
			Some(kind) if kind.size() == usize::from(declared) => Ok(kind),
			Some(kind) => Self::int_of_size(name, declared, kind.is_signed()),
			None => Self::int_of_size(name, declared, false),
		}
	}

	fn int_of_size(name: &str, size: u16, signed: bool) -> Result<Self> {
		Ok(match (size, signed) {
			(1, true) => Self::I8,
			(1, false) => Self::U8,
			(2, true) => Self::I16,
			(2, false) => Self::U16,
			(4, true) => Self::I32,
			(4, false) => Self::U32,
			(8, true) => Self::I64,
			(8, false) => Self::U64,
			_ => {
				return Err(BlendError::UnsupportedPrimitive {
					type_name: name.to_owned(),
					size,
				});
			}
		})
	}

	/// Encoded width in bytes.
	pub fn size(self) -> usize {
		match self {
			Self::Char | Self::I8 | Self::U8 => 1,
			Self::I16 | Self::U16 => 2,
			Self::I32 | Self::U32 | Self::F32 => 4,
			Self::I64 | Self::U64 | Self::F64 => 8,
		}
	}

	/// Whether values of this kind carry a sign.
	pub fn is_signed(self) -> bool {
		matches!(self, Self::I8 | Self::I16 | Self::I32 | Self::I64 | Self::F32 | Self::F64)
	}

	/// Stable label such as `int32` or `float64`.
	pub fn label(self) -> &'static str {
		match self {
			Self::Char => "char",
			Self::I8 => "int8",
			Self::U8 => "uint8",
			Self::I16 => "int16",
			Self::U16 => "uint16",
			Self::I32 => "int32",
			Self::U32 => "uint32",
			Self::I64 => "int64",
			Self::U64 => "uint64",
			Self::F32 => "float32",
			Self::F64 => "float64",
		}
	}

	/// Read one value at the cursor.
	pub fn read(self, cursor: &mut Cursor<'_>) -> Result<Primitive> {
		Ok(match self {
			Self::Char => Primitive::Char(cursor.read_exact(1)?[0]),
			Self::I8 => Primitive::I8(cursor.read_exact(1)?[0] as i8),
			Self::U8 => Primitive::U8(cursor.read_exact(1)?[0]),
			Self::I16 => Primitive::I16(cursor.read_i16()?),
			Self::U16 => Primitive::U16(cursor.read_u16()?),
			Self::I32 => Primitive::I32(cursor.read_i32()?),
			Self::U32 => Primitive::U32(cursor.read_u32()?),
			Self::I64 => Primitive::I64(cursor.read_i64()?),
			Self::U64 => Primitive::U64(cursor.read_u64()?),
			Self::F32 => Primitive::F32(f32::from_bits(cursor.read_u32()?)),
			Self::F64 => Primitive::F64(f64::from_bits(cursor.read_u64()?)),
		})
	}
}

/// One decoded primitive value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
	/// C `char` byte.
	Char(u8),
	/// `int8`.
	I8(i8),
	/// `uint8`.
	U8(u8),
	/// `int16`.
	I16(i16),
	/// `uint16`.
	U16(u16),
	/// `int32`.
	I32(i32),
	/// `uint32`.
	U32(u32),
	/// `int64`.
	I64(i64),
	/// `uint64`.
	U64(u64),
	/// `float32`.
	F32(f32),
	/// `float64`.
	F64(f64),
}

impl Primitive {
	/// Wire type of this value.
	pub fn kind(self) -> PrimKind {
		match self {
			Self::Char(_) => PrimKind::Char,
			Self::I8(_) => PrimKind::I8,
			Self::U8(_) => PrimKind::U8,
			Self::I16(_) => PrimKind::I16,
			Self::U16(_) => PrimKind::U16,
			Self::I32(_) => PrimKind::I32,
			Self::U32(_) => PrimKind::U32,
			Self::I64(_) => PrimKind::I64,
			Self::U64(_) => PrimKind::U64,
			Self::F32(_) => PrimKind::F32,
			Self::F64(_) => PrimKind::F64,
		}
	}

	/// Integer value when it fits in `i64`. Floats return `None`.
	pub fn as_i64(self) -> Option<i64> {
		match self {
			Self::Char(v) | Self::U8(v) => Some(i64::from(v)),
			Self::I8(v) => Some(i64::from(v)),
			Self::I16(v) => Some(i64::from(v)),
			Self::U16(v) => Some(i64::from(v)),
			Self::I32(v) => Some(i64::from(v)),
			Self::U32(v) => Some(i64::from(v)),
			Self::I64(v) => Some(v),
			Self::U64(v) => i64::try_from(v).ok(),
			Self::F32(_) | Self::F64(_) => None,
		}
	}

	/// Integer value when it is non-negative. Floats return `None`.
	pub fn as_u64(self) -> Option<u64> {
		match self {
			Self::U64(v) => Some(v),
			other => other.as_i64().and_then(|v| u64::try_from(v).ok()),
		}
	}

	/// Numeric value widened to `f64`.
	pub fn as_f64(self) -> f64 {
		match self {
			Self::F32(v) => f64::from(v),
			Self::F64(v) => v,
			Self::U64(v) => v as f64,
			Self::I64(v) => v as f64,
			other => other.as_i64().map_or(0.0, |v| v as f64),
		}
	}

	/// Re-encode to the exact bytes it was read from.
	pub fn encode(self, endianness: Endianness) -> Vec<u8> {
		macro_rules! bytes {
			($v:expr) => {
				match endianness {
					Endianness::Little => $v.to_le_bytes().to_vec(),
					Endianness::Big => $v.to_be_bytes().to_vec(),
				}
			};
		}
		match self {
			Self::Char(v) | Self::U8(v) => vec![v],
			Self::I8(v) => vec![v as u8],
			Self::I16(v) => bytes!(v),
			Self::U16(v) => bytes!(v),
			Self::I32(v) => bytes!(v),
			Self::U32(v) => bytes!(v),
			Self::I64(v) => bytes!(v),
			Self::U64(v) => bytes!(v),
			Self::F32(v) => bytes!(v.to_bits()),
			Self::F64(v) => bytes!(v.to_bits()),
		}
	}
}

impl fmt::Display for Primitive {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match *self {
			Self::Char(v) => write!(f, "'{}' (0x{v:02x})", std::ascii::escape_default(v)),
			Self::I8(v) => write!(f, "{v}"),
			Self::U8(v) => write!(f, "{v}"),
			Self::I16(v) => write!(f, "{v}"),
			Self::U16(v) => write!(f, "{v}"),
			Self::I32(v) => write!(f, "{v}"),
			Self::U32(v) => write!(f, "{v}"),
			Self::I64(v) => write!(f, "{v}"),
			Self::U64(v) => write!(f, "{v}"),
			Self::F32(v) => write!(f, "{v}"),
			Self::F64(v) => write!(f, "{v}"),
		}
	}
}

/// Decoded 1D or 2D primitive array, stored flat in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveArray {
	/// Element wire type.
	pub kind: PrimKind,
	/// Declared shape.
	pub dims: ArrayDims,
	/// Flattened values.
	pub values: Vec<Primitive>,
}

impl PrimitiveArray {
	/// Read `dims.len()` values of `kind`.
	pub fn read(kind: PrimKind, dims: ArrayDims, cursor: &mut Cursor<'_>) -> Result<Self> {
		let count = dims.len();
		let mut values = Vec::with_capacity(count.min(cursor.remaining()));
		for _ in 0..count {
			values.push(kind.read(cursor)?);
		}
		Ok(Self { kind, dims, values })
	}

	/// Number of flattened elements.
	pub fn len(&self) -> usize {
		self.values.len()
	}

	/// Whether the array has no elements.
	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	/// Values grouped by outer index; a 1D array is a single row.
	pub fn rows(&self) -> Vec<&[Primitive]> {
		match self.dims {
			ArrayDims::Two(_, inner) if inner > 0 => self.values.chunks(inner).collect(),
			_ => vec![self.values.as_slice()],
		}
	}

	/// Values as `f32` for `float` arrays.
	pub fn as_f32_vec(&self) -> Option<Vec<f32>> {
		self.values
			.iter()
			.map(|value| match value {
				Primitive::F32(v) => Some(*v),
				_ => None,
			})
			.collect()
	}

	/// Values as `i32` for `int` arrays.
	pub fn as_i32_vec(&self) -> Option<Vec<i32>> {
		self.values
			.iter()
			.map(|value| match value {
				Primitive::I32(v) => Some(*v),
				_ => None,
			})
			.collect()
	}

	/// Raw bytes of a `char` array.
	pub fn char_bytes(&self) -> Option<Vec<u8>> {
		self.values
			.iter()
			.map(|value| match value {
				Primitive::Char(v) => Some(*v),
				_ => None,
			})
			.collect()
	}

	/// `char` array read as a C string: bytes up to the first NUL, lossy UTF-8.
	pub fn as_c_string(&self) -> Option<String> {
		let bytes = self.char_bytes()?;
		let end = bytes.iter().position(|byte| *byte == 0).unwrap_or(bytes.len());
		Some(String::from_utf8_lossy(&bytes[..end]).into_owned())
	}

	/// Re-encode every element in order.
	pub fn encode(&self, endianness: Endianness) -> Vec<u8> {
		self.values.iter().flat_map(|value| value.encode(endianness)).collect()
	}
}

impl fmt::Display for PrimitiveArray {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if let (ArrayDims::Two(..), Some(_)) = (self.dims, self.char_bytes()) {
			let rows: Vec<String> = self.rows().into_iter().map(|row| format!("{:?}", c_string(row))).collect();
			return write_braced(f, &rows);
		}

		if let Some(text) = self.as_c_string() {
			write!(f, "{text:?}")?;
			if self.values.len() < 64 {
				f.write_str(" ")?;
				let bytes: Vec<String> = self.values.iter().map(|value| format!("{}", value.as_i64().unwrap_or(0))).collect();
				write_braced(f, &bytes)?;
			}
			return Ok(());
		}

		match self.dims {
			ArrayDims::Two(..) => {
				let rows: Vec<String> = self
					.rows()
					.into_iter()
					.map(|row| {
						let items: Vec<String> = row.iter().map(ToString::to_string).collect();
						braced(&items)
					})
					.collect();
				write_braced(f, &rows)
			}
			_ => {
				let items: Vec<String> = self.values.iter().map(ToString::to_string).collect();
				write_braced(f, &items)
			}
		}
	}
}

fn c_string(row: &[Primitive]) -> String {
	let bytes: Vec<u8> = row
		.iter()
		.map_while(|value| match value {
			Primitive::Char(0) => None,
			Primitive::Char(v) => Some(*v),
			_ => None,
		})
		.collect();
	String::from_utf8_lossy(&bytes).into_owned()
}

pub(crate) fn braced(items: &[String]) -> String {
	if items.is_empty() {
		return "{ }".to_owned();
	}
	format!("{{ {} }}", items.join(", "))
}

fn write_braced(f: &mut fmt::Formatter<'_>, items: &[String]) -> fmt::Result {
	f.write_str(&braced(items))
}
