use crate::blend::bytes::Cursor;
use crate::blend::decl::{FieldDecl, parse_field_decl};
use crate::blend::{BlendError, Endianness, Result};

/// SDNA catalog: names, types, and struct layouts declared by one file.
///
/// Built in two phases. The first reads every table and derives type primitivity
/// from the struct list; the second parses each field declarator and links
/// inline struct fields to their struct index. Nothing is mutated afterwards.
#[derive(Debug)]
pub struct Dna {
	/// Field declarator strings from `NAME`.
	pub names: Vec<Box<str>>,
	/// Type descriptors from `TYPE` and `TLEN`.
	pub types: Vec<DnaType>,
	/// Struct declarations from `STRC`, indexed by SDNA struct number.
	pub structs: Vec<DnaStruct>,
	/// Mapping `type_idx -> sdna_struct_idx`.
	pub struct_for_type: Vec<Option<u32>>,
}

/// One entry of the type table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnaType {
	/// Type name.
	pub name: Box<str>,
	/// Size in bytes.
	pub size: u16,
	/// `false` when some struct declaration defines this type.
	pub is_primitive: bool,
}

/// One struct declaration.
#[derive(Debug)]
pub struct DnaStruct {
	/// Type table index of the struct's own name.
	pub type_idx: u16,
	/// Declared size, taken from `TLEN`.
	pub size: u16,
	/// Fields in declaration order.
	pub fields: Vec<DnaField>,
}

/// One field of a struct declaration.
#[derive(Debug, Clone)]
pub struct DnaField {
	/// Type table index.
	pub type_idx: u16,
	/// Name table index.
	pub name_idx: u16,
	/// Shape decoded from the declarator.
	pub decl: FieldDecl,
	/// Struct index for inline (non-pointer, non-primitive) fields.
	pub nested: Option<u32>,
}

impl DnaField {
	/// Whether this field embeds another struct by value.
	pub fn is_inline_struct(&self) -> bool {
		self.nested.is_some()
	}
}

struct RawStruct {
	type_idx: u16,
	fields: Vec<(u16, u16)>,
}

impl Dna {
	/// Parse `DNA1` payload bytes into the catalog.
	pub fn parse(payload: &[u8], endianness: Endianness) -> Result<Self> {
		let mut cursor = Cursor::new(payload, endianness);

		expect_tag(&mut cursor, *b"SDNA")?;
		expect_tag(&mut cursor, *b"NAME")?;
		let names = read_string_table(&mut cursor, "NAME")?;

		expect_tag(&mut cursor, *b"TYPE")?;
		let type_names = read_string_table(&mut cursor, "TYPE")?;

		expect_tag(&mut cursor, *b"TLEN")?;
		let mut sizes = Vec::with_capacity(type_names.len());
		for _ in 0..type_names.len() {
			sizes.push(cursor.read_u16()?);
		}
		cursor.align4()?;

		expect_tag(&mut cursor, *b"STRC")?;
		let struct_count = read_count(&mut cursor, "STRC")?;
		let mut raw_structs = Vec::with_capacity(struct_count.min(payload.len()));
		for _ in 0..struct_count {
			let type_idx = read_index(&mut cursor, "struct.type_idx", type_names.len())?;
			let field_count = cursor.read_i16()?;
			if field_count < 0 {
				return Err(BlendError::DnaNegativeCount {
					section: "STRC.fields",
					count: i64::from(field_count),
				});
			}

			let mut fields = Vec::with_capacity(field_count as usize);
			for _ in 0..field_count {
				let field_type = read_index(&mut cursor, "field.type_idx", type_names.len())?;
				let field_name = read_index(&mut cursor, "field.name_idx", names.len())?;
				fields.push((field_type, field_name));
			}
			raw_structs.push(RawStruct { type_idx, fields });
		}

		let mut struct_for_type = vec![None; type_names.len()];
		for (idx, item) in raw_structs.iter().enumerate() {
			let slot = &mut struct_for_type[item.type_idx as usize];
			if let Some(first) = *slot {
				return Err(BlendError::DnaDuplicateStructType {
					type_idx: item.type_idx,
					first,
					second: idx as u32,
				});
			}
			*slot = Some(idx as u32);
		}

		let types: Vec<DnaType> = type_names
			.into_iter()
			.zip(sizes)
			.enumerate()
			.map(|(idx, (name, size))| DnaType {
				name,
				size,
				is_primitive: struct_for_type[idx].is_none(),
			})
			.collect();

		let mut structs = Vec::with_capacity(raw_structs.len());
		for raw in raw_structs {
			let mut fields = Vec::with_capacity(raw.fields.len());
			for (type_idx, name_idx) in raw.fields {
				let decl = parse_field_decl(&names[name_idx as usize])?;
				let nested = if decl.is_pointer() {
					None
				} else {
					struct_for_type[type_idx as usize]
				};
				fields.push(DnaField {
					type_idx,
					name_idx,
					decl,
					nested,
				});
			}
			structs.push(DnaStruct {
				type_idx: raw.type_idx,
				size: types[raw.type_idx as usize].size,
				fields,
			});
		}

		tracing::debug!(names = names.len(), types = types.len(), structs = structs.len(), "parsed SDNA catalog");

		Ok(Self {
			names,
			types,
			structs,
			struct_for_type,
		})
	}

	/// Look up struct declaration by SDNA struct index.
	pub fn struct_by_sdna(&self, sdna_nr: u32) -> Option<&DnaStruct> {
		self.structs.get(sdna_nr as usize)
	}

	/// Look up SDNA struct index by struct type name.
	pub fn sdna_for_name(&self, name: &str) -> Option<u32> {
		let type_idx = self.types.iter().position(|item| &*item.name == name)?;
		self.struct_for_type.get(type_idx).copied().flatten()
	}

	/// Look up struct declaration by struct type name.
	pub fn struct_by_name(&self, name: &str) -> Option<&DnaStruct> {
		self.sdna_for_name(name).and_then(|sdna_nr| self.struct_by_sdna(sdna_nr))
	}

	/// Type descriptor by index.
	pub fn type_info(&self, type_idx: u16) -> Option<&DnaType> {
		self.types.get(type_idx as usize)
	}

	/// Type name by type index, empty for out-of-range indices.
	pub fn type_name(&self, type_idx: u16) -> &str {
		self.types.get(type_idx as usize).map(|item| &*item.name).unwrap_or("")
	}

	/// Raw field declarator by name index, empty for out-of-range indices.
	pub fn field_name(&self, name_idx: u16) -> &str {
		self.names.get(name_idx as usize).map(|item| &**item).unwrap_or("")
	}
}

fn expect_tag(cursor: &mut Cursor<'_>, expected: [u8; 4]) -> Result<()> {
	let at = cursor.pos();
	let got = cursor.read_code4()?;
	if got != expected {
		return Err(BlendError::DnaBadTag { expected, got, at });
	}
	Ok(())
}

fn read_count(cursor: &mut Cursor<'_>, section: &'static str) -> Result<usize> {
	let count = cursor.read_i32()?;
	if count < 0 {
		return Err(BlendError::DnaNegativeCount {
			section,
			count: i64::from(count),
		});
	}
	Ok(count as usize)
}

fn read_string_table(cursor: &mut Cursor<'_>, section: &'static str) -> Result<Vec<Box<str>>> {
	let count = read_count(cursor, section)?;
	let mut out = Vec::with_capacity(count.min(cursor.remaining()));
	for _ in 0..count {
		let bytes = cursor.read_cstring_bytes()?;
		out.push(String::from_utf8_lossy(bytes).into_owned().into_boxed_str());
	}
	cursor.align4()?;
	Ok(out)
}

fn read_index(cursor: &mut Cursor<'_>, kind: &'static str, len: usize) -> Result<u16> {
	let idx = cursor.read_i16()?;
	if idx < 0 || (idx as usize) >= len {
		return Err(BlendError::DnaIndexOutOfRange {
			kind,
			idx: i64::from(idx),
			max: len.saturating_sub(1) as u32,
		});
	}
	Ok(idx as u16)
}
