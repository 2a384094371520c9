#![allow(missing_docs)]

use std::process::{Command, Output};

use blendtree_testkit::{BlendBuilder, ByteOrder, SdnaBuilder, write_temp_blend};
use serde_json::Value;
use tempfile::NamedTempFile;

fn host_order() -> ByteOrder {
	if cfg!(target_endian = "big") { ByteOrder::Big } else { ByteOrder::Little }
}

fn foreign_order() -> ByteOrder {
	if cfg!(target_endian = "big") { ByteOrder::Little } else { ByteOrder::Big }
}

fn scene_file() -> NamedTempFile {
	let sdna = SdnaBuilder::with_basic_types()
		.structure("ID", 12, &[("ID", "*next"), ("char", "name[4]")])
		.structure("Object", 16, &[("ID", "id"), ("float", "size")]);
	let object = sdna.sdna_index("Object").expect("Object declared");
	let builder = BlendBuilder::legacy(8, host_order(), 280);
	let first = builder.payload().ptr(0x600).bytes(b"OB1\0").f32(1.5).finish();
	let second = builder.payload().ptr(0).bytes(b"OB2\0").f32(3.0).finish();
	let bytes = builder
		.dna(&sdna)
		.block(b"OB\0\0", object, 0x500, 1, first)
		.block(b"OB\0\0", object, 0x600, 1, second)
		.block(b"DATA", object, 0x700, 1, vec![0; 6])
		.build();
	write_temp_blend(&bytes).expect("temp file")
}

fn run(args: &[&str]) -> Output {
	Command::new(env!("CARGO_BIN_EXE_blendtree")).args(args).output().expect("command executes")
}

fn run_ok(args: &[&str]) -> String {
	let output = run(args);
	assert!(
		output.status.success(),
		"command failed: {}",
		String::from_utf8_lossy(&output.stderr)
	);
	String::from_utf8(output.stdout).expect("utf8 stdout")
}

fn run_json(args: &[&str]) -> Value {
	serde_json::from_str(&run_ok(args)).expect("valid json")
}

fn path_of(file: &NamedTempFile) -> String {
	file.path().display().to_string()
}

#[test]
fn info_json_reports_header_and_counts() {
	let file = scene_file();
	let json = run_json(&["info", &path_of(&file), "--json"]);

	assert_eq!(json["version"], "2.80");
	assert_eq!(json["pointer_size"], 8);
	assert_eq!(json["header_kind"], "legacy");
	assert_eq!(json["compression"], "none");
	assert_eq!(json["block_count"], 5);
	assert_eq!(json["structure_count"], 2);
	assert_eq!(json["raw_block_count"], 1);
	assert_eq!(json["top_codes"][0]["code"], "OB");
	assert_eq!(json["top_codes"][0]["count"], 2);
}

#[test]
fn dna_struct_lists_fields() {
	let file = scene_file();
	let text = run_ok(&["dna", &path_of(&file), "--struct", "ID"]);
	assert!(text.starts_with("struct ID size=12"), "unexpected output: {text}");
	assert!(text.contains("  ID *next  ptr=1 dims=-"));
	assert!(text.contains("  char name[4]  ptr=0 dims=[4]"));

	let json = run_json(&["dna", &path_of(&file), "--json"]);
	assert_eq!(json["structs"], 2);
}

#[test]
fn dump_prints_qualified_field_tree() {
	let file = scene_file();
	let text = run_ok(&["dump", &path_of(&file), "--address", "0x500"]);

	assert!(text.contains("Object @ 0x0000000000000500"), "unexpected output: {text}");
	assert!(text.contains("  id: ID\n"));
	assert!(text.contains("    id.next: ID = 0x0000000000000600"));
	assert!(text.contains("  size: float = 1.5"));
}

#[test]
fn dump_json_selects_by_type_and_path() {
	let file = scene_file();
	let rows = run_json(&["dump", &path_of(&file), "--type", "Object", "--json"]);
	let rows = rows.as_array().expect("array of structures");
	assert_eq!(rows.len(), 2);
	assert_eq!(rows[1]["address"], "0x0000000000000600");
	assert_eq!(rows[1]["fields"][0]["fields"][0]["value"], "0x0");

	let limited = run_json(&["dump", &path_of(&file), "--code", "OB", "--limit", "1", "--json"]);
	assert_eq!(limited.as_array().map(Vec::len), Some(1));

	let sizes = run_ok(&["dump", &path_of(&file), "--type", "Object", "--field", "size"]);
	assert_eq!(sizes.lines().count(), 2);
	assert!(sizes.contains("size: float = 3 @ 0x0000000000000600"));
}

#[test]
fn raw_lists_mismatched_blocks() {
	let file = scene_file();
	let text = run_ok(&["raw", &path_of(&file)]);
	assert_eq!(text.trim_end(), "3 0000000000000700 DATA 1 16 6");
}

#[test]
fn errors_exit_nonzero_with_message() {
	let file = write_temp_blend(b"NOTBLEND").expect("temp file");
	let output = run(&["info", &path_of(&file)]);
	assert_eq!(output.status.code(), Some(1));
	assert!(String::from_utf8_lossy(&output.stderr).starts_with("error: "));

	let scene = scene_file();
	let output = run(&["dna", &path_of(&scene), "--struct", "Missing"]);
	assert_eq!(output.status.code(), Some(1));
}

#[test]
fn every_command_rejects_foreign_byte_order() {
	let sdna = SdnaBuilder::with_basic_types().structure("Pair", 8, &[("int", "a"), ("int", "b")]);
	let bytes = BlendBuilder::legacy(8, foreign_order(), 280).dna(&sdna).build();
	let file = write_temp_blend(&bytes).expect("temp file");

	for command in ["info", "dna", "dump", "raw"] {
		let mut args = vec![command, file.path().to_str().expect("utf8 path")];
		if command == "dump" {
			args.extend(["--type", "Pair"]);
		}
		let output = run(&args);
		assert_eq!(output.status.code(), Some(1), "{command} accepted a foreign file");
		let stderr = String::from_utf8_lossy(&output.stderr);
		assert!(stderr.contains("error: "), "{command} stderr: {stderr}");
	}
}
