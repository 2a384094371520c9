use std::path::PathBuf;

use blendtree::blend::{Result, code_label};
use serde::Serialize;

use crate::cmd::util::{emit_json, load};

const TOP_CODES: usize = 12;

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub json: bool,
}

#[derive(Serialize)]
struct InfoJson {
	path: String,
	version: String,
	pointer_size: usize,
	endianness: &'static str,
	header_kind: &'static str,
	compression: &'static str,
	block_count: usize,
	has_dna1: bool,
	has_endb: bool,
	top_codes: Vec<CodeCountJson>,
	structure_count: usize,
	raw_block_count: usize,
}

#[derive(Serialize)]
struct CodeCountJson {
	code: String,
	count: usize,
}

pub fn run(args: Args) -> Result<()> {
	let parsed = load(&args.path)?;
	let header = parsed.header();
	let stats = parsed.block_stats();
	let top_codes = stats.top_codes(TOP_CODES);

	if args.json {
		let payload = InfoJson {
			path: args.path.display().to_string(),
			version: parsed.version_string(),
			pointer_size: parsed.pointer_size(),
			endianness: parsed.endianness().as_str(),
			header_kind: header.bhead_layout_label(),
			compression: parsed.compression().as_str(),
			block_count: stats.block_count,
			has_dna1: stats.has_dna1,
			has_endb: stats.has_endb,
			top_codes: top_codes
				.iter()
				.map(|(code, count)| CodeCountJson {
					code: code_label(*code),
					count: *count,
				})
				.collect(),
			structure_count: parsed.structure_count(),
			raw_block_count: parsed.raw_blocks().len(),
		};
		emit_json(&payload)?;
		return Ok(());
	}

	println!("path: {}", args.path.display());
	println!("version: {}", parsed.version_string());
	println!("pointer_size: {}", parsed.pointer_size());
	println!("endianness: {}", parsed.endianness().as_str());
	println!("header_kind: {}", header.bhead_layout_label());
	println!("compression: {}", parsed.compression().as_str());
	println!("block_count: {}", stats.block_count);
	println!("has_dna1: {}", stats.has_dna1);
	println!("has_endb: {}", stats.has_endb);
	println!("structure_count: {}", parsed.structure_count());
	println!("raw_block_count: {}", parsed.raw_blocks().len());
	println!("top_codes:");
	for (code, count) in top_codes {
		println!("  {}: {count}", code_label(code));
	}

	Ok(())
}
