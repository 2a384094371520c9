mod bhead;
mod block;
mod bytes;
mod compression;
mod decl;
mod dna;
mod error;
mod file;
mod header;
mod materialize;
mod memory;
mod path;
mod prim;
mod value;

/// Parsed block header record.
pub use bhead::BHead;
/// Block view and iterator types.
pub use block::{Block, BlockIter};
/// Compression detection result and limits.
pub use compression::{Compression, MAX_DECOMPRESSED_BYTES, ZSTD_MAGIC};
/// Field declarator grammar.
pub use decl::{ArrayDims, FieldDecl, parse_field_decl};
/// SDNA catalog representation.
pub use dna::{Dna, DnaField, DnaStruct, DnaType};
/// Error taxonomy and result alias.
pub use error::{BlendError, ErrorKind, Result};
/// File orchestration and file-level queries.
pub use file::{BlendFile, BlockStats, ParseOptions, ParsedFile, parse_file};
/// File header representation.
pub use header::{BlendHeader, Endianness};
/// Structure materialization and raw-block diagnostics.
pub use materialize::{BlockOutcome, MaterializeOptions, Materializer, RawBlock, code_label};
/// Old-address index and dereferencing.
pub use memory::{MaterializedBlock, MemoryMap, Resolved};
/// Field path parser types.
pub use path::{FieldPath, PathStep};
/// Primitive wire types and decoded values.
pub use prim::{PrimKind, Primitive, PrimitiveArray};
/// Materialized field tree.
pub use value::{Field, FieldValue, Leaves, PointerArray, Structure};
