#![allow(missing_docs)]

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cmd;

#[derive(Parser)]
#[command(name = "blendtree", about = "Inspect Blender .blend files through their embedded SDNA")]
struct Cli {
	/// Raise log verbosity (-v info, -vv debug, -vvv trace). Overrides RUST_LOG.
	#[arg(short, long, action = clap::ArgAction::Count, global = true)]
	verbose: u8,
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Header, block, and materialization summary.
	Info(cmd::info::Args),
	/// SDNA catalog sizes and struct layouts.
	Dna(cmd::dna::Args),
	/// Print materialized structures as field trees.
	Dump(cmd::dump::Args),
	/// List blocks whose payload does not match their struct.
	Raw(cmd::raw::Args),
}

fn main() {
	let cli = Cli::parse();
	init_tracing(cli.verbose);

	if let Err(err) = run(cli.command) {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run(command: Commands) -> blendtree::blend::Result<()> {
	match command {
		Commands::Info(args) => cmd::info::run(args),
		Commands::Dna(args) => cmd::dna::run(args),
		Commands::Dump(args) => cmd::dump::run(args),
		Commands::Raw(args) => cmd::raw::run(args),
	}
}

fn init_tracing(verbose: u8) {
	let filter = match verbose {
		0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
		1 => EnvFilter::new("info"),
		2 => EnvFilter::new("debug"),
		_ => EnvFilter::new("trace"),
	};
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(false)
		.init();
}
