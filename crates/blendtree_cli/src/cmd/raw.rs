use std::path::PathBuf;

use blendtree::blend::Result;
use serde::Serialize;

use crate::cmd::util::{addr_hex, emit_json, load};

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub json: bool,
}

#[derive(Serialize)]
struct RawBlockJson {
	block_index: usize,
	address: String,
	code: String,
	sdna_nr: u32,
	expected_size: u64,
	actual_size: u64,
}

pub fn run(args: Args) -> Result<()> {
	let parsed = load(&args.path)?;

	if args.json {
		let rows: Vec<RawBlockJson> = parsed
			.raw_blocks()
			.iter()
			.map(|raw| RawBlockJson {
				block_index: raw.block_index,
				address: addr_hex(raw.address, parsed.pointer_size()),
				code: raw.code_label(),
				sdna_nr: raw.sdna_nr,
				expected_size: raw.expected_size,
				actual_size: raw.actual_size,
			})
			.collect();
		emit_json(&rows)?;
		return Ok(());
	}

	for raw in parsed.raw_blocks() {
		println!("{raw}");
	}
	Ok(())
}
