//! Shared test helpers for workspace crates.
//!
//! Builds synthetic `.blend` byte streams: a header, an SDNA block described by
//! [`SdnaBuilder`], arbitrary data blocks, and the terminal `ENDB` block.

use std::io::Write;

/// Byte order used when writing synthetic files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
	/// `v` marker.
	Little,
	/// `V` marker.
	Big,
}

/// Writes integers, floats, and pointers in a fixed byte order.
#[derive(Debug, Clone)]
pub struct PayloadWriter {
	order: ByteOrder,
	pointer_size: usize,
	buf: Vec<u8>,
}

macro_rules! put_num {
	($($name:ident: $ty:ty),* $(,)?) => {
		$(
			#[doc = concat!("Append a `", stringify!($ty), "`.")]
			pub fn $name(mut self, value: $ty) -> Self {
				match self.order {
					ByteOrder::Little => self.buf.extend_from_slice(&value.to_le_bytes()),
					ByteOrder::Big => self.buf.extend_from_slice(&value.to_be_bytes()),
				}
				self
			}
		)*
	};
}

impl PayloadWriter {
	/// Start an empty payload.
	pub fn new(order: ByteOrder, pointer_size: usize) -> Self {
		Self {
			order,
			pointer_size,
			buf: Vec::new(),
		}
	}

	put_num! {
		u8: u8,
		i8: i8,
		i16: i16,
		u16: u16,
		i32: i32,
		u32: u32,
		i64: i64,
		u64: u64,
		f32: f32,
		f64: f64,
	}

	/// Append a pointer at the configured width.
	pub fn ptr(self, addr: u64) -> Self {
		if self.pointer_size == 4 {
			self.u32(addr as u32)
		} else {
			self.u64(addr)
		}
	}

	/// Append raw bytes.
	pub fn bytes(mut self, bytes: &[u8]) -> Self {
		self.buf.extend_from_slice(bytes);
		self
	}

	/// Finish and return the bytes.
	pub fn finish(self) -> Vec<u8> {
		self.buf
	}
}

/// Declarative SDNA catalog writer.
///
/// Types are numbered in insertion order, primitives and structs sharing one table.
/// Struct SDNA indices follow the order of [`SdnaBuilder::structure`] calls.
#[derive(Debug, Clone, Default)]
pub struct SdnaBuilder {
	names: Vec<String>,
	types: Vec<(String, u16)>,
	structs: Vec<(u16, Vec<(u16, u16)>)>,
}

impl SdnaBuilder {
	/// Empty catalog.
	pub fn new() -> Self {
		Self::default()
	}

	/// Catalog preloaded with `char`, `short`, `int`, `long`, `float`, `double`, `int64_t`, `uint64_t`.
	pub fn with_basic_types() -> Self {
		Self::new()
			.primitive("char", 1)
			.primitive("short", 2)
			.primitive("int", 4)
			.primitive("long", 4)
			.primitive("float", 4)
			.primitive("double", 8)
			.primitive("int64_t", 8)
			.primitive("uint64_t", 8)
	}

	/// Declare a primitive type.
	pub fn primitive(mut self, name: &str, size: u16) -> Self {
		self.type_idx(name, size);
		self
	}

	/// Declare a struct of `size` bytes with `(type, declarator)` fields.
	///
	/// Field types not yet declared are added with size 0, so forward references work
	/// as long as the referenced struct is declared later with its real size.
	pub fn structure(mut self, name: &str, size: u16, fields: &[(&str, &str)]) -> Self {
		let own = self.type_idx(name, size);
		let mut out = Vec::with_capacity(fields.len());
		for (ty, decl) in fields {
			let type_idx = self.type_idx(ty, 0);
			let name_idx = self.name_idx(decl);
			out.push((type_idx, name_idx));
		}
		self.structs.push((own, out));
		self
	}

	/// SDNA struct index of a declared struct.
	pub fn sdna_index(&self, name: &str) -> Option<u32> {
		self.structs
			.iter()
			.position(|(type_idx, _)| self.types[*type_idx as usize].0 == name)
			.map(|idx| idx as u32)
	}

	/// Serialize the `DNA1` payload.
	pub fn build(&self, order: ByteOrder) -> Vec<u8> {
		let mut out = Vec::new();
		out.extend_from_slice(b"SDNA");

		out.extend_from_slice(b"NAME");
		push_i32(&mut out, order, self.names.len() as i32);
		for name in &self.names {
			out.extend_from_slice(name.as_bytes());
			out.push(0);
		}
		pad4(&mut out);

		out.extend_from_slice(b"TYPE");
		push_i32(&mut out, order, self.types.len() as i32);
		for (name, _) in &self.types {
			out.extend_from_slice(name.as_bytes());
			out.push(0);
		}
		pad4(&mut out);

		out.extend_from_slice(b"TLEN");
		for (_, size) in &self.types {
			push_u16(&mut out, order, *size);
		}
		pad4(&mut out);

		out.extend_from_slice(b"STRC");
		push_i32(&mut out, order, self.structs.len() as i32);
		for (type_idx, fields) in &self.structs {
			push_u16(&mut out, order, *type_idx);
			push_u16(&mut out, order, fields.len() as u16);
			for (field_type, field_name) in fields {
				push_u16(&mut out, order, *field_type);
				push_u16(&mut out, order, *field_name);
			}
		}
		out
	}

	fn type_idx(&mut self, name: &str, size: u16) -> u16 {
		if let Some(idx) = self.types.iter().position(|(item, _)| item == name) {
			if size != 0 {
				self.types[idx].1 = size;
			}
			return idx as u16;
		}
		self.types.push((name.to_owned(), size));
		(self.types.len() - 1) as u16
	}

	fn name_idx(&mut self, decl: &str) -> u16 {
		if let Some(idx) = self.names.iter().position(|item| item == decl) {
			return idx as u16;
		}
		self.names.push(decl.to_owned());
		(self.names.len() - 1) as u16
	}
}

#[derive(Debug, Clone)]
struct BlockSpec {
	code: [u8; 4],
	sdna_nr: u32,
	old: u64,
	nr: u64,
	payload: Vec<u8>,
}

/// Synthetic `.blend` stream builder.
#[derive(Debug, Clone)]
pub struct BlendBuilder {
	order: ByteOrder,
	pointer_size: usize,
	version: u16,
	modern: bool,
	blocks: Vec<BlockSpec>,
	terminate: bool,
}

impl BlendBuilder {
	/// Legacy 12-byte header file, for example `(4, Little, 271)` gives `BLENDER_v271`.
	pub fn legacy(pointer_size: usize, order: ByteOrder, version: u16) -> Self {
		Self {
			order,
			pointer_size,
			version,
			modern: false,
			blocks: Vec::new(),
			terminate: true,
		}
	}

	/// Modern 17-byte header file with 8-byte pointers and wide block headers.
	pub fn modern(order: ByteOrder, version: u16) -> Self {
		Self {
			order,
			pointer_size: 8,
			version,
			modern: true,
			blocks: Vec::new(),
			terminate: true,
		}
	}

	/// Payload writer matching this file's byte order and pointer width.
	pub fn payload(&self) -> PayloadWriter {
		PayloadWriter::new(self.order, self.pointer_size)
	}

	/// Append the `DNA1` block.
	pub fn dna(mut self, sdna: &SdnaBuilder) -> Self {
		let payload = sdna.build(self.order);
		self.blocks.push(BlockSpec {
			code: *b"DNA1",
			sdna_nr: 0,
			old: 0,
			nr: 1,
			payload,
		});
		self
	}

	/// Append a data block.
	pub fn block(mut self, code: &[u8; 4], sdna_nr: u32, old: u64, nr: u64, payload: Vec<u8>) -> Self {
		self.blocks.push(BlockSpec {
			code: *code,
			sdna_nr,
			old,
			nr,
			payload,
		});
		self
	}

	/// Leave out the trailing `ENDB` block.
	pub fn without_endb(mut self) -> Self {
		self.terminate = false;
		self
	}

	/// Serialize header, blocks, and `ENDB`.
	pub fn build(&self) -> Vec<u8> {
		let mut out = Vec::new();
		let marker = match self.order {
			ByteOrder::Little => 'v',
			ByteOrder::Big => 'V',
		};
		if self.modern {
			out.extend_from_slice(format!("BLENDER17-01{marker}{:04}", self.version).as_bytes());
		} else {
			let ptr = if self.pointer_size == 4 { '_' } else { '-' };
			out.extend_from_slice(format!("BLENDER{ptr}{marker}{:03}", self.version).as_bytes());
		}

		let header_len = out.len();
		let endb = BlockSpec {
			code: *b"ENDB",
			sdna_nr: 0,
			old: 0,
			nr: 0,
			payload: Vec::new(),
		};
		let tail = self.terminate.then_some(&endb);
		for block in self.blocks.iter().chain(tail) {
			self.write_block(&mut out, block);
			while (out.len() - header_len) % 4 != 0 {
				out.push(0);
			}
		}
		out
	}

	fn write_block(&self, out: &mut Vec<u8>, block: &BlockSpec) {
		out.extend_from_slice(&block.code);
		if self.modern {
			push_u32(out, self.order, block.sdna_nr);
			push_u64(out, self.order, block.old);
			push_u64(out, self.order, block.payload.len() as u64);
			push_u64(out, self.order, block.nr);
		} else {
			push_i32(out, self.order, block.payload.len() as i32);
			if self.pointer_size == 4 {
				push_u32(out, self.order, block.old as u32);
			} else {
				push_u64(out, self.order, block.old);
			}
			push_u32(out, self.order, block.sdna_nr);
			push_i32(out, self.order, block.nr as i32);
		}
		out.extend_from_slice(&block.payload);
	}
}

/// Write bytes to a named temporary `.blend` file that lives as long as the handle.
pub fn write_temp_blend(bytes: &[u8]) -> std::io::Result<tempfile::NamedTempFile> {
	let mut file = tempfile::Builder::new().prefix("blendtree-").suffix(".blend").tempfile()?;
	file.write_all(bytes)?;
	file.flush()?;
	Ok(file)
}

fn pad4(out: &mut Vec<u8>) {
	while out.len() % 4 != 0 {
		out.push(0);
	}
}

fn push_u16(out: &mut Vec<u8>, order: ByteOrder, value: u16) {
	match order {
		ByteOrder::Little => out.extend_from_slice(&value.to_le_bytes()),
		ByteOrder::Big => out.extend_from_slice(&value.to_be_bytes()),
	}
}

fn push_u32(out: &mut Vec<u8>, order: ByteOrder, value: u32) {
	match order {
		ByteOrder::Little => out.extend_from_slice(&value.to_le_bytes()),
		ByteOrder::Big => out.extend_from_slice(&value.to_be_bytes()),
	}
}

fn push_i32(out: &mut Vec<u8>, order: ByteOrder, value: i32) {
	push_u32(out, order, value as u32);
}

fn push_u64(out: &mut Vec<u8>, order: ByteOrder, value: u64) {
	match order {
		ByteOrder::Little => out.extend_from_slice(&value.to_le_bytes()),
		ByteOrder::Big => out.extend_from_slice(&value.to_be_bytes()),
	}
}
