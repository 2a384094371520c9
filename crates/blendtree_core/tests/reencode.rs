#![allow(missing_docs)]

use blendtree::blend::{Dna, Endianness, FieldValue, MaterializeOptions, Materializer};
use blendtree_testkit::{ByteOrder, PayloadWriter, SdnaBuilder};
use proptest::prelude::*;

fn catalog() -> SdnaBuilder {
	SdnaBuilder::with_basic_types()
		.primitive("ushort", 2)
		.primitive("uchar", 1)
		.primitive("long", 8)
		.structure(
			"Sample",
			2 + 2 + 4 + 4 + 8 + 8 + 1 + 4 + 4 * 4 + 6 * 4 + 8,
			&[
				("short", "s"),
				("ushort", "us"),
				("int", "i"),
				("float", "f"),
				("double", "d"),
				("int64_t", "big"),
				("uchar", "flag"),
				("char", "name[4]"),
				("int", "counts[4]"),
				("float", "mat[2][3]"),
				("long", "wide"),
			],
		)
}

fn catalog_dna(order: ByteOrder, endianness: Endianness) -> (Dna, u32) {
	let sdna = catalog();
	let idx = sdna.sdna_index("Sample").expect("Sample declared");
	(Dna::parse(&sdna.build(order), endianness).expect("dna parses"), idx)
}

proptest! {
	#[test]
	fn primitive_fields_reencode_to_source_bytes(
		big_endian in any::<bool>(),
		s in any::<i16>(),
		us in any::<u16>(),
		i in any::<i32>(),
		f in -1.0e6_f32..1.0e6,
		d in any::<f64>().prop_filter("finite", |v| v.is_finite()),
		big in any::<i64>(),
		flag in any::<u8>(),
		name in proptest::array::uniform4(any::<u8>()),
		counts in proptest::array::uniform4(any::<i32>()),
		mat in proptest::array::uniform6(-1.0e3_f32..1.0e3),
		wide in any::<i64>(),
	) {
		let (order, endianness) = if big_endian {
			(ByteOrder::Big, Endianness::Big)
		} else {
			(ByteOrder::Little, Endianness::Little)
		};
		let (dna, idx) = catalog_dna(order, endianness);

		let mut writer = PayloadWriter::new(order, 8)
			.i16(s)
			.u16(us)
			.i32(i)
			.f32(f)
			.f64(d)
			.i64(big)
			.u8(flag)
			.bytes(&name);
		for value in counts {
			writer = writer.i32(value);
		}
		for value in mat {
			writer = writer.f32(value);
		}
		let payload = writer.i64(wide).finish();

		let materializer = Materializer::new(&dna, 8, endianness, MaterializeOptions::strict());
		let item = materializer.materialize_struct(idx, &payload).expect("materializes");

		let mut encoded = Vec::new();
		for field in &item.fields {
			let bytes = match &field.value {
				FieldValue::Scalar(value) => value.encode(endianness),
				FieldValue::Array(array) => array.encode(endianness),
				other => panic!("unexpected value {other:?}"),
			};
			prop_assert_eq!(bytes.len(), field.size_bytes());
			encoded.extend(bytes);
		}
		prop_assert_eq!(encoded, payload);
	}
}
