//! Reader for Blender `.blend` files driven by the schema each file carries.
//!
//! [`blend::BlendFile`] opens a file, [`blend::BlendFile::parse`] builds the SDNA
//! catalog and materializes every block into [`blend::Structure`] trees, and
//! [`blend::ParsedFile`] answers type, address, and pointer queries over the result.

/// Blend container parsing, SDNA catalog, materialization, and pointer resolution.
pub mod blend;
