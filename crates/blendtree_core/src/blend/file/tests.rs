use blendtree_testkit::{BlendBuilder, ByteOrder, SdnaBuilder};

use crate::blend::{BlendError, BlendFile, Compression, Endianness, ErrorKind, ParseOptions, Primitive, parse_file};

fn host_order() -> ByteOrder {
	match Endianness::HOST {
		Endianness::Little => ByteOrder::Little,
		Endianness::Big => ByteOrder::Big,
	}
}

fn foreign_order() -> ByteOrder {
	match Endianness::HOST {
		Endianness::Little => ByteOrder::Big,
		Endianness::Big => ByteOrder::Little,
	}
}

fn catalog() -> SdnaBuilder {
	SdnaBuilder::with_basic_types().structure("Counter", 8, &[("int", "value"), ("int", "step")])
}

fn counter_file(builder: BlendBuilder) -> Vec<u8> {
	let sdna = catalog();
	let idx = sdna.sdna_index("Counter").expect("Counter declared");
	let first = builder.payload().i32(10).i32(1).finish();
	let second = builder.payload().i32(20).i32(2).i32(30).i32(3).finish();
	builder
		.dna(&sdna)
		.block(b"CNT\0", idx, 0x100, 1, first)
		.block(b"CNT\0", idx, 0x200, 2, second)
		.block(b"TEST", idx, 0x300, 1, vec![0; 5])
		.build()
}

#[test]
fn block_queries_cover_every_block() {
	let parsed = parse_file(counter_file(BlendBuilder::legacy(8, host_order(), 280))).expect("parses");

	assert_eq!(parsed.blocks().count(), 5);
	assert_eq!(parsed.blocks_by_code(*b"CNT\0").len(), 2);
	let block = parsed.block_by_address(0x200).expect("block at 0x200");
	assert_eq!(block.index, 2);
	assert_eq!(block.head.nr, 2);
	assert_eq!(block.payload.len(), 16);
	assert!(parsed.block_by_address(0).is_none());

	let stats = parsed.block_stats();
	assert_eq!(stats.block_count, 5);
	assert!(stats.has_dna1);
	assert!(stats.has_endb);
	assert_eq!(stats.last_code, Some(*b"ENDB"));
	assert_eq!(stats.top_codes(1), vec![(*b"CNT\0", 2)]);
}

#[test]
fn structures_of_type_spans_blocks() {
	let parsed = parse_file(counter_file(BlendBuilder::legacy(8, host_order(), 280))).expect("parses");

	let values: Vec<Primitive> = parsed
		.structures_of_type("Counter")
		.filter_map(|item| item.get("value").and_then(|field| field.as_primitive()))
		.collect();
	assert_eq!(values, vec![Primitive::I32(10), Primitive::I32(20), Primitive::I32(30)]);
	assert_eq!(parsed.structure_count(), 3);
	assert_eq!(parsed.structures_of_type("Missing").count(), 0);
	assert_eq!(parsed.raw_blocks().len(), 1);
	assert_eq!(parsed.raw_blocks()[0].block_index, 3);
}

#[test]
fn modern_header_uses_wide_block_headers() {
	let parsed = parse_file(counter_file(BlendBuilder::modern(host_order(), 500))).expect("parses");

	assert_eq!(parsed.pointer_size(), 8);
	assert_eq!(parsed.version_string(), "5.00");
	assert_eq!(parsed.header().bhead_layout_label(), "large_bhead8");
	assert_eq!(parsed.structures_by_address(0x200).map(<[_]>::len), Some(2));
	assert_eq!(parsed.resolve(0x208).map(|hit| hit.element_index), Some(1));
}

#[test]
fn foreign_byte_order_needs_opt_in() {
	let bytes = counter_file(BlendBuilder::legacy(4, foreign_order(), 249));

	let err = parse_file(bytes.clone()).err().expect("foreign order rejected");
	assert!(matches!(err, BlendError::EndiannessMismatch { .. }));
	assert_eq!(err.kind(), ErrorKind::Format);

	let options = ParseOptions {
		allow_foreign_endianness: true,
		..ParseOptions::default()
	};
	let file = BlendFile::from_bytes(bytes.clone()).expect("opens");
	let err = file.dna().expect_err("catalog read rejects foreign order");
	assert!(matches!(err, BlendError::EndiannessMismatch { .. }));

	let parsed = BlendFile::from_bytes(bytes)
		.and_then(|file| file.parse_with(&options))
		.expect("opt-in parses");
	let first = parsed.structures_by_address(0x100).expect("first counter");
	assert_eq!(first[0].get("value").and_then(|field| field.as_primitive()), Some(Primitive::I32(10)));
}

#[test]
fn missing_dna_block_is_schema_error() {
	let bytes = BlendBuilder::legacy(8, host_order(), 280).block(b"DATA", 0, 0x10, 1, vec![0; 4]).build();
	let err = parse_file(bytes).err().expect("no catalog");
	assert!(matches!(err, BlendError::DnaNotFound));
	assert_eq!(err.kind(), ErrorKind::Schema);
}

#[test]
fn stream_without_endb_still_parses() {
	let sdna = catalog();
	let builder = BlendBuilder::legacy(8, host_order(), 280);
	let payload = builder.payload().i32(1).i32(2).finish();
	let bytes = builder.dna(&sdna).block(b"CNT\0", 0, 0x40, 1, payload).without_endb().build();

	let parsed = parse_file(bytes).expect("parses");
	assert!(!parsed.block_stats().has_endb);
	assert!(parsed.structures_by_address(0x40).is_some());
}

#[test]
fn truncated_block_header_is_format_error() {
	let mut bytes = counter_file(BlendBuilder::legacy(8, host_order(), 280));
	bytes.truncate(bytes.len() - 10);
	let err = parse_file(bytes).err().expect("truncation rejected");
	assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn zstd_wrapped_file_opens() {
	let bytes = counter_file(BlendBuilder::legacy(8, host_order(), 280));
	let packed = zstd::encode_all(bytes.as_slice(), 3).expect("compress");

	let file = BlendFile::from_bytes(packed).expect("opens");
	assert_eq!(file.compression, Compression::Zstd);
	assert_eq!(file.compression.as_str(), "zstd");
	let parsed = file.parse().expect("parses");
	assert_eq!(parsed.structure_count(), 3);
}
