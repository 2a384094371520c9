use std::path::PathBuf;

use blendtree::blend::{BlendError, BlendFile, Dna, DnaStruct, Result};
use serde::Serialize;

use crate::cmd::util::emit_json;

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	/// Show the layout of one struct.
	#[arg(long = "struct", value_name = "NAME")]
	pub struct_name: Option<String>,
	#[arg(long)]
	pub json: bool,
}

#[derive(Serialize)]
struct DnaSummaryJson {
	names: usize,
	types: usize,
	structs: usize,
}

#[derive(Serialize)]
struct StructJson {
	name: String,
	size: u16,
	fields: Vec<FieldJson>,
}

#[derive(Serialize)]
struct FieldJson {
	#[serde(rename = "type")]
	type_name: String,
	name: String,
	ident: String,
	ptr_depth: u8,
	dims: Vec<usize>,
	function_pointer: bool,
}

pub fn run(args: Args) -> Result<()> {
	let dna = BlendFile::open(&args.path)?.dna()?;

	let Some(name) = args.struct_name else {
		if args.json {
			emit_json(&DnaSummaryJson {
				names: dna.names.len(),
				types: dna.types.len(),
				structs: dna.structs.len(),
			})?;
		} else {
			println!("names: {}", dna.names.len());
			println!("types: {}", dna.types.len());
			println!("structs: {}", dna.structs.len());
		}
		return Ok(());
	};

	let item = dna
		.struct_by_name(&name)
		.ok_or_else(|| BlendError::DnaStructNotFound { name: name.clone() })?;
	let fields = struct_fields(&dna, item);

	if args.json {
		emit_json(&StructJson {
			name,
			size: item.size,
			fields,
		})?;
		return Ok(());
	}

	println!("struct {name} size={}", item.size);
	for field in fields {
		let dims: String = field.dims.iter().map(|dim| format!("[{dim}]")).collect();
		println!(
			"  {} {}  ptr={} dims={}",
			field.type_name,
			field.name,
			field.ptr_depth,
			if dims.is_empty() { "-" } else { dims.as_str() }
		);
	}
	Ok(())
}

fn struct_fields(dna: &Dna, item: &DnaStruct) -> Vec<FieldJson> {
	item.fields
		.iter()
		.map(|field| FieldJson {
			type_name: dna.type_name(field.type_idx).to_owned(),
			name: dna.field_name(field.name_idx).to_owned(),
			ident: field.decl.ident.to_string(),
			ptr_depth: field.decl.ptr_depth,
			dims: field.decl.dims.to_vec(),
			function_pointer: field.decl.is_func_ptr,
		})
		.collect()
}
