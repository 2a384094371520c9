use thiserror::Error;

/// Crate-local result type.
pub type Result<T> = std::result::Result<T, BlendError>;

/// Coarse classification of [`BlendError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
	/// Filesystem or stream IO failure.
	Io,
	/// Container framing problem: magic, endianness, truncation.
	Format,
	/// SDNA catalog is missing or malformed.
	Schema,
	/// Field shape the reader refuses to interpret.
	UnsupportedShape,
	/// Wrong accessor used for a field's actual shape.
	Dereference,
}

impl ErrorKind {
	/// Stable lowercase label.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Io => "io",
			Self::Format => "format",
			Self::Schema => "schema",
			Self::UnsupportedShape => "unsupported_shape",
			Self::Dereference => "dereference",
		}
	}
}

/// Errors produced while reading, materializing, and navigating `.blend` data.
#[derive(Debug, Error)]
pub enum BlendError {
	/// Filesystem or stream IO failure.
	#[error("io: {0}")]
	Io(#[from] std::io::Error),
	/// Unknown leading file magic.
	#[error("unsupported compression or not a .blend (magic={magic:?})")]
	UnknownMagic {
		/// First up-to-4 bytes of the stream.
		magic: [u8; 4],
	},
	/// Decompressed stream did not start with `BLENDER`.
	#[error("decompressed data does not start with BLENDER magic")]
	NotBlendAfterDecompress,
	/// Decompression output exceeded configured safety limit.
	#[error("decompressed output exceeded limit {limit} bytes")]
	DecompressedTooLarge {
		/// Maximum allowed output bytes.
		limit: usize,
	},
	/// Invalid or malformed file header.
	#[error("invalid header")]
	InvalidHeader,
	/// Unsupported container format version.
	#[error("unsupported file format version {version} (expected 1)")]
	UnsupportedFormatVersion {
		/// Parsed format version.
		version: u16,
	},
	/// File byte order differs from the host byte order.
	#[error("file is {file} endian but this machine is {host} endian; open the file in Blender and save it to convert")]
	EndiannessMismatch {
		/// File byte order label.
		file: &'static str,
		/// Host byte order label.
		host: &'static str,
	},
	/// Pointer width other than 4 or 8.
	#[error("unsupported pointer size marker {header_size}")]
	UnsupportedPointerSize {
		/// Offending size or header marker.
		header_size: usize,
	},
	/// Not enough bytes remained for a requested read.
	#[error("unexpected eof at offset {at}, need {need} bytes, remaining {rem}")]
	UnexpectedEof {
		/// Byte offset where the read was attempted.
		at: usize,
		/// Requested bytes.
		need: usize,
		/// Bytes still available.
		rem: usize,
	},
	/// Block payload length was negative.
	#[error("negative block length {len}")]
	NegativeBlockLength {
		/// Parsed signed length.
		len: i64,
	},
	/// Block element count was negative.
	#[error("negative block count {nr}")]
	NegativeBlockCount {
		/// Parsed signed element count.
		nr: i64,
	},
	/// Block payload would exceed remaining file data.
	#[error("block length {len} at offset {at} exceeds remaining {rem}")]
	BlockLenOutOfRange {
		/// Block header file offset.
		at: usize,
		/// Declared payload length.
		len: u64,
		/// Remaining bytes in cursor.
		rem: usize,
	},
	/// Strict layout mode detected trailing unconsumed bytes.
	#[error("layout mismatch in {type_name}: leftover={leftover}")]
	DecodeLayoutMismatch {
		/// Struct type name being materialized.
		type_name: String,
		/// Unconsumed bytes.
		leftover: usize,
	},
	/// No DNA1 block was found.
	#[error("DNA1 block not found")]
	DnaNotFound,
	/// Requested struct name is not declared in the catalog.
	#[error("DNA struct not found: {name}")]
	DnaStructNotFound {
		/// Requested struct name.
		name: String,
	},
	/// Unexpected DNA section tag.
	#[error("DNA tag mismatch at {at}: expected {expected:?}, got {got:?}")]
	DnaBadTag {
		/// Expected section tag.
		expected: [u8; 4],
		/// Actual section tag.
		got: [u8; 4],
		/// Cursor offset of the tag read.
		at: usize,
	},
	/// A DNA section count was negative.
	#[error("DNA {section} count is negative: {count}")]
	DnaNegativeCount {
		/// Section whose count was read.
		section: &'static str,
		/// Parsed signed count.
		count: i64,
	},
	/// Out-of-range index inside DNA tables.
	#[error("DNA index out of range for {kind}: idx={idx}, max={max}")]
	DnaIndexOutOfRange {
		/// Logical index kind being validated.
		kind: &'static str,
		/// Offending index value.
		idx: i64,
		/// Maximum valid index.
		max: u32,
	},
	/// Duplicate type->struct mapping in DNA `STRC` section.
	#[error("DNA duplicate struct type index {type_idx}: first={first}, second={second}")]
	DnaDuplicateStructType {
		/// Duplicate type index.
		type_idx: u16,
		/// First struct index observed.
		first: u32,
		/// Second struct index observed.
		second: u32,
	},
	/// Field declarator text could not be parsed.
	#[error("malformed DNA field name {name:?}")]
	DnaBadFieldName {
		/// Raw declarator text.
		name: String,
	},
	/// SDNA struct id referenced by a block is missing.
	#[error("missing SDNA struct index {sdna_nr}")]
	DecodeMissingSdna {
		/// Missing SDNA struct index.
		sdna_nr: u32,
	},
	/// Materializer recursion depth exceeded configured limit.
	#[error("materialize depth exceeded (max={max_depth})")]
	DecodeDepthExceeded {
		/// Configured depth ceiling.
		max_depth: u32,
	},
	/// Path expression syntax is invalid.
	#[error("invalid field path: {path}")]
	InvalidFieldPath {
		/// Original user-provided path string.
		path: String,
	},
	/// Declarator has three or more pointer stars.
	#[error("field {name:?} has pointer depth {depth}; at most 2 is supported")]
	PointerDepthUnsupported {
		/// Raw declarator text.
		name: String,
		/// Counted pointer depth.
		depth: usize,
	},
	/// Declarator has three or more array dimensions.
	#[error("field {name:?} has {rank} array dimensions; at most 2 are supported")]
	ArrayRankUnsupported {
		/// Raw declarator text.
		name: String,
		/// Counted dimension count.
		rank: usize,
	},
	/// Two-dimensional array of nested structures.
	#[error("field {name:?} is a 2D array of {type_name} structures, which is not supported")]
	NestedArray2dUnsupported {
		/// Raw declarator text.
		name: String,
		/// Element struct type.
		type_name: String,
	},
	/// Primitive type with no known decoding.
	#[error("primitive type {type_name} of size {size} cannot be decoded")]
	UnsupportedPrimitive {
		/// SDNA type name.
		type_name: String,
		/// Declared size in bytes.
		size: u16,
	},
	/// Bulk dereference of a 2D pointer array.
	#[error("field {name} is a 2D pointer array and cannot be dereferenced in bulk")]
	PointerArray2dDereference {
		/// Field name.
		name: String,
	},
	/// Dereference requested on a non-pointer field.
	#[error("field {name} is not a pointer")]
	NotAPointer {
		/// Field name.
		name: String,
	},
	/// Dereference requested on a pointer-to-pointer field.
	#[error("field {name} is a pointer to a pointer and cannot resolve to a structure; read its raw addresses instead")]
	PointerToPointer {
		/// Field name.
		name: String,
	},
	/// Scalar dereference requested on a pointer array.
	#[error("field {name} is an array of pointers; use dereference_array")]
	PointerArrayNeedsArrayDereference {
		/// Field name.
		name: String,
	},
	/// Array dereference requested on a scalar pointer.
	#[error("field {name} is a single pointer; use dereference")]
	ScalarPointerNeedsScalarDereference {
		/// Field name.
		name: String,
	},
}

impl BlendError {
	/// Classify this error into its taxonomy bucket.
	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::Io(_) => ErrorKind::Io,
			Self::UnknownMagic { .. }
			| Self::NotBlendAfterDecompress
			| Self::DecompressedTooLarge { .. }
			| Self::InvalidHeader
			| Self::UnsupportedFormatVersion { .. }
			| Self::EndiannessMismatch { .. }
			| Self::UnsupportedPointerSize { .. }
			| Self::UnexpectedEof { .. }
			| Self::NegativeBlockLength { .. }
			| Self::NegativeBlockCount { .. }
			| Self::BlockLenOutOfRange { .. }
			| Self::DecodeLayoutMismatch { .. } => ErrorKind::Format,
			Self::DnaNotFound
			| Self::DnaStructNotFound { .. }
			| Self::DnaBadTag { .. }
			| Self::DnaNegativeCount { .. }
			| Self::DnaIndexOutOfRange { .. }
			| Self::DnaDuplicateStructType { .. }
			| Self::DnaBadFieldName { .. }
			| Self::DecodeMissingSdna { .. }
			| Self::DecodeDepthExceeded { .. }
			| Self::InvalidFieldPath { .. } => ErrorKind::Schema,
			Self::PointerDepthUnsupported { .. }
			| Self::ArrayRankUnsupported { .. }
			| Self::NestedArray2dUnsupported { .. }
			| Self::UnsupportedPrimitive { .. }
			| Self::PointerArray2dDereference { .. } => ErrorKind::UnsupportedShape,
			Self::NotAPointer { .. }
			| Self::PointerToPointer { .. }
			| Self::PointerArrayNeedsArrayDereference { .. }
			| Self::ScalarPointerNeedsScalarDereference { .. } => ErrorKind::Dereference,
		}
	}
}
