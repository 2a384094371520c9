use std::path::PathBuf;

use blendtree::blend::{BlendError, Field, FieldPath, FieldValue, Result, Structure};
use serde::Serialize;

use crate::cmd::util::{addr_hex, emit_json, load, parse_addr, parse_block_code};

#[derive(clap::Args)]
#[command(group(clap::ArgGroup::new("select").required(true).args(["type_name", "address", "code"])))]
pub struct Args {
	pub path: PathBuf,
	/// Every structure of this SDNA type.
	#[arg(long = "type", value_name = "NAME")]
	pub type_name: Option<String>,
	/// Structures of the block stored at this old address.
	#[arg(long, value_parser = parse_addr, value_name = "HEX")]
	pub address: Option<u64>,
	/// Structures of every block with this code.
	#[arg(long, value_parser = parse_block_code, value_name = "CODE")]
	pub code: Option<[u8; 4]>,
	/// Print only the field at this dotted path, e.g. `id.name` or `mtex[2].tex`.
	#[arg(long, value_name = "PATH")]
	pub field: Option<String>,
	#[arg(long, default_value_t = 16)]
	pub limit: usize,
	#[arg(long)]
	pub json: bool,
}

#[derive(Serialize)]
struct StructureJson {
	#[serde(rename = "type")]
	type_name: String,
	address: Option<String>,
	fields: Vec<FieldJson>,
}

#[derive(Serialize)]
struct FieldJson {
	name: String,
	#[serde(rename = "type")]
	type_name: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	value: Option<String>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	fields: Vec<FieldJson>,
}

pub fn run(args: Args) -> Result<()> {
	let parsed = load(&args.path)?;
	let pointer_size = parsed.pointer_size();

	let selected: Vec<&Structure> = if let Some(name) = &args.type_name {
		parsed.structures_of_type(name).take(args.limit).collect()
	} else if let Some(addr) = args.address {
		parsed
			.structures_by_address(addr)
			.map(|items| items.iter().take(args.limit).collect())
			.unwrap_or_default()
	} else if let Some(code) = args.code {
		parsed
			.memory()
			.blocks()
			.iter()
			.filter(|block| block.code == code)
			.flat_map(|block| block.structures.iter())
			.take(args.limit)
			.collect()
	} else {
		Vec::new()
	};
	tracing::debug!(selected = selected.len(), "dump selection");

	if let Some(path) = &args.field {
		return dump_field(&selected, path, pointer_size, args.json);
	}

	if args.json {
		let rows: Vec<StructureJson> = selected
			.iter()
			.map(|item| StructureJson {
				type_name: item.type_name.to_string(),
				address: item.origin.map(|addr| addr_hex(addr, pointer_size)),
				fields: item.fields.iter().map(field_json).collect(),
			})
			.collect();
		emit_json(&rows)?;
		return Ok(());
	}

	for item in selected {
		match item.origin {
			Some(addr) => println!("{} @ {}", item.type_name, addr_hex(addr, pointer_size)),
			None => println!("{}", item.type_name),
		}
		print_fields(&item.fields, 1);
	}
	Ok(())
}

fn dump_field(selected: &[&Structure], path: &str, pointer_size: usize, json: bool) -> Result<()> {
	let parsed_path = FieldPath::parse(path)?;
	let rows: Vec<(Option<u64>, &Field)> = selected
		.iter()
		.filter_map(|item| item.lookup(&parsed_path).map(|field| (item.origin, field)))
		.collect();
	if rows.is_empty() && !selected.is_empty() {
		return Err(BlendError::InvalidFieldPath { path: path.to_owned() });
	}

	if json {
		let rows: Vec<FieldJson> = rows.iter().map(|(_, field)| field_json(field)).collect();
		emit_json(&rows)?;
		return Ok(());
	}

	for (origin, field) in rows {
		let at = origin.map(|addr| format!(" @ {}", addr_hex(addr, pointer_size))).unwrap_or_default();
		match &field.value {
			FieldValue::Struct(nested) => {
				println!("{}: {}{at}", field.qualified_name(), field.type_name());
				print_fields(&nested.fields, 1);
			}
			_ => println!("{}: {} = {field}{at}", field.qualified_name(), field.type_name()),
		}
	}
	Ok(())
}

fn print_fields(fields: &[Field], depth: usize) {
	let indent = "  ".repeat(depth);
	for field in fields {
		match &field.value {
			FieldValue::Struct(nested) => {
				println!("{indent}{}: {}", field.qualified_name(), field.type_name());
				print_fields(&nested.fields, depth + 1);
			}
			_ => println!("{indent}{}: {} = {field}", field.qualified_name(), field.type_name()),
		}
	}
}

fn field_json(field: &Field) -> FieldJson {
	match &field.value {
		FieldValue::Struct(nested) => FieldJson {
			name: field.qualified_name().to_owned(),
			type_name: field.type_name().to_owned(),
			value: None,
			fields: nested.fields.iter().map(field_json).collect(),
		},
		_ => FieldJson {
			name: field.qualified_name().to_owned(),
			type_name: field.type_name().to_owned(),
			value: Some(field.to_string()),
			fields: Vec::new(),
		},
	}
}
