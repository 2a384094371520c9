use std::fmt;

use crate::blend::bytes::Cursor;
use crate::blend::dna::{DnaField, DnaStruct};
use crate::blend::{
	ArrayDims, BlendError, Block, Dna, Endianness, Field, FieldValue, PointerArray, PrimKind, PrimitiveArray, Result, Structure,
};

/// Runtime knobs for structure materialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterializeOptions {
	/// Maximum inline nesting depth below a block-level root.
	pub max_depth: u32,
	/// Fail when a structure's fields do not consume its declared size.
	pub strict_layout: bool,
}

impl Default for MaterializeOptions {
	fn default() -> Self {
		Self {
			max_depth: 64,
			strict_layout: false,
		}
	}
}

impl MaterializeOptions {
	/// Defaults with layout checking turned on.
	pub fn strict() -> Self {
		Self {
			strict_layout: true,
			..Self::default()
		}
	}
}

/// Diagnostic for a block whose payload does not match `struct size * count`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlock {
	/// Block position in file order.
	pub block_index: usize,
	/// Old address of the block.
	pub address: u64,
	/// Block code.
	pub code: [u8; 4],
	/// Declared SDNA struct index.
	pub sdna_nr: u32,
	/// `struct size * count`.
	pub expected_size: u64,
	/// Actual payload length.
	pub actual_size: u64,
	/// File pointer width, used when rendering the address.
	pub pointer_size: u8,
}

impl RawBlock {
	/// Block code as text, with non-printable bytes escaped.
	pub fn code_label(&self) -> String {
		code_label(self.code)
	}
}

impl fmt::Display for RawBlock {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let width = usize::from(self.pointer_size) * 2;
		write!(
			f,
			"{} {:0width$x} {} {} {} {}",
			self.block_index,
			self.address,
			self.code_label(),
			self.sdna_nr,
			self.expected_size,
			self.actual_size
		)
	}
}

/// Result of materializing one block.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockOutcome {
	/// Payload split into `count` structures.
	Structures(Vec<Structure>),
	/// Payload size mismatch; nothing was materialized.
	Raw(RawBlock),
	/// Block is not a materialization candidate (`DNA1`, `ENDB`, empty count, zero-sized struct).
	Skipped,
}

/// Render a 4-byte block code, trimming trailing NULs and escaping other bytes.
pub fn code_label(code: [u8; 4]) -> String {
	let end = code.iter().rposition(|byte| *byte != 0).map_or(0, |idx| idx + 1);
	code[..end]
		.iter()
		.flat_map(|byte| std::ascii::escape_default(*byte))
		.map(char::from)
		.collect()
}

/// Turns raw payload bytes into [`Structure`] trees using one file's catalog.
pub struct Materializer<'a> {
	dna: &'a Dna,
	pointer_size: usize,
	endianness: Endianness,
	options: MaterializeOptions,
}

impl<'a> Materializer<'a> {
	/// Bind a catalog to the file's pointer width and byte order.
	pub fn new(dna: &'a Dna, pointer_size: usize, endianness: Endianness, options: MaterializeOptions) -> Self {
		Self {
			dna,
			pointer_size,
			endianness,
			options,
		}
	}

	/// Materialize one block into its structures or a raw-block diagnostic.
	pub fn materialize_block(&self, block: &Block<'_>) -> Result<BlockOutcome> {
		let head = &block.head;
		if head.nr == 0 || head.is_dna() || head.is_endb() {
			return Ok(BlockOutcome::Skipped);
		}

		let item = self
			.dna
			.struct_by_sdna(head.sdna_nr)
			.ok_or(BlendError::DecodeMissingSdna { sdna_nr: head.sdna_nr })?;
		let size = usize::from(item.size);
		let expected_size = u64::from(item.size).saturating_mul(head.nr);

		if expected_size != head.len {
			let raw = RawBlock {
				block_index: block.index,
				address: head.old,
				code: head.code,
				sdna_nr: head.sdna_nr,
				expected_size,
				actual_size: head.len,
				pointer_size: self.pointer_size as u8,
			};
			tracing::warn!(
				block = block.index,
				code = %raw.code_label(),
				expected = expected_size,
				actual = head.len,
				"payload does not match struct size, keeping block raw"
			);
			return Ok(BlockOutcome::Raw(raw));
		}

		if size == 0 {
			tracing::debug!(block = block.index, "zero-sized struct block skipped");
			return Ok(BlockOutcome::Skipped);
		}

		let mut out = Vec::with_capacity(block.payload.len() / size);
		for (idx, chunk) in block.payload.chunks_exact(size).enumerate() {
			let mut structure = self.materialize_struct(head.sdna_nr, chunk)?;
			structure.origin = Some(head.old.wrapping_add((idx * size) as u64));
			out.push(structure);
		}
		Ok(BlockOutcome::Structures(out))
	}

	/// Materialize one root structure of SDNA index `sdna_nr` from `bytes`.
	pub fn materialize_struct(&self, sdna_nr: u32, bytes: &[u8]) -> Result<Structure> {
		let item = self.dna.struct_by_sdna(sdna_nr).ok_or(BlendError::DecodeMissingSdna { sdna_nr })?;
		let type_name = self.dna.type_name(item.type_idx);
		let mut cursor = Cursor::new(bytes, self.endianness);
		self.read_struct(item, &mut cursor, type_name, "", 0)
	}

	fn read_struct(&self, item: &DnaStruct, cursor: &mut Cursor<'_>, name: &str, qualified: &str, depth: u32) -> Result<Structure> {
		if depth > self.options.max_depth {
			return Err(BlendError::DecodeDepthExceeded {
				max_depth: self.options.max_depth,
			});
		}

		let type_name = self.dna.type_name(item.type_idx);
		let bytes = cursor.read_exact(usize::from(item.size))?;
		let mut local = Cursor::new(bytes, self.endianness);

		let mut fields = Vec::with_capacity(item.fields.len());
		for field in &item.fields {
			self.read_field(type_name, field, &mut local, qualified, depth, &mut fields)?;
		}

		let leftover = local.remaining();
		if self.options.strict_layout && leftover != 0 {
			return Err(BlendError::DecodeLayoutMismatch {
				type_name: type_name.to_owned(),
				leftover,
			});
		}

		Ok(Structure {
			type_name: type_name.into(),
			name: name.into(),
			qualified_name: qualified.to_owned(),
			size: usize::from(item.size),
			fields,
			origin: None,
		})
	}

	fn read_field(
		&self,
		parent_type: &str,
		field: &DnaField,
		cursor: &mut Cursor<'_>,
		prefix: &str,
		depth: u32,
		out: &mut Vec<Field>,
	) -> Result<()> {
		let decl = &field.decl;
		let type_name = self.dna.type_name(field.type_idx);
		let count = decl.dims.len();
		let base = Field {
			name: decl.ident.clone(),
			qualified_name: join(prefix, &decl.ident),
			parent_type: parent_type.into(),
			type_name: type_name.into(),
			size: 0,
			ptr_depth: decl.ptr_depth,
			dims: decl.dims,
			pointer_size: self.pointer_size as u8,
			value: FieldValue::Pointer(0),
		};

		if decl.is_pointer() {
			let mut addrs = Vec::with_capacity(count.min(cursor.remaining()));
			for _ in 0..count {
				addrs.push(cursor.read_ptr(self.pointer_size)?);
			}
			let value = match decl.dims {
				ArrayDims::Scalar => FieldValue::Pointer(addrs.first().copied().unwrap_or(0)),
				dims => FieldValue::PointerArray(PointerArray { dims, addrs }),
			};
			out.push(Field {
				size: self.pointer_size * count,
				value,
				..base
			});
			return Ok(());
		}

		if let Some(nested_nr) = field.nested {
			let nested = self
				.dna
				.struct_by_sdna(nested_nr)
				.ok_or(BlendError::DecodeMissingSdna { sdna_nr: nested_nr })?;
			tracing::trace!(parent = parent_type, field = %decl.ident, type_name, depth, "materializing nested structure");

			match decl.dims {
				ArrayDims::Scalar => {
					let value = self.read_struct(nested, cursor, &base.name, &base.qualified_name, depth + 1)?;
					out.push(Field {
						size: value.size,
						value: FieldValue::Struct(value),
						..base
					});
				}
				ArrayDims::One(len) => {
					for idx in 0..len {
						let name = format!("{}[{idx}]", decl.ident);
						let qualified = join(prefix, &name);
						let value = self.read_struct(nested, cursor, &name, &qualified, depth + 1)?;
						out.push(Field {
							name: name.into(),
							qualified_name: qualified,
							size: value.size,
							dims: ArrayDims::Scalar,
							value: FieldValue::Struct(value),
							..base.clone()
						});
					}
				}
				ArrayDims::Two(..) => {
					return Err(BlendError::NestedArray2dUnsupported {
						name: self.dna.field_name(field.name_idx).to_owned(),
						type_name: type_name.to_owned(),
					});
				}
			}
			return Ok(());
		}

		let size = self.dna.type_info(field.type_idx).map_or(0, |item| item.size);
		let kind = PrimKind::for_type(type_name, size, self.pointer_size)?;
		let value = match decl.dims {
			ArrayDims::Scalar => FieldValue::Scalar(kind.read(cursor)?),
			dims => FieldValue::Array(PrimitiveArray::read(kind, dims, cursor)?),
		};
		out.push(Field {
			size: kind.size() * count,
			value,
			..base
		});
		Ok(())
	}
}

fn join(prefix: &str, name: &str) -> String {
	if prefix.is_empty() {
		name.to_owned()
	} else {
		format!("{prefix}.{name}")
	}
}
