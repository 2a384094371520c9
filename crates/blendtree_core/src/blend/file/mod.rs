use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::blend::compression::unwrap_stream;
use crate::blend::materialize::code_label;
use crate::blend::{
	BHead, BlendError, BlendHeader, Block, BlockIter, BlockOutcome, Compression, Dna, Endianness, Field, MaterializeOptions,
	MaterializedBlock, Materializer, MemoryMap, RawBlock, Resolved, Result, Structure,
};

/// Options for [`BlendFile::parse_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseOptions {
	/// Materializer knobs.
	pub materialize: MaterializeOptions,
	/// Read files whose byte order differs from the host instead of failing.
	pub allow_foreign_endianness: bool,
}

/// Opened blend container: decoded bytes and parsed header, nothing materialized yet.
pub struct BlendFile {
	/// Parsed file header.
	pub header: BlendHeader,
	/// Compression detected on the source bytes.
	pub compression: Compression,
	bytes: Vec<u8>,
}

impl BlendFile {
	/// Read, decompress, and parse the header of a file on disk.
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		Self::from_bytes(fs::read(path)?)
	}

	/// Wrap in-memory bytes, plain or zstd-compressed.
	pub fn from_bytes(raw: Vec<u8>) -> Result<Self> {
		let (compression, bytes) = unwrap_stream(raw)?;
		let header = BlendHeader::parse(&bytes)?;
		if header.header_size > bytes.len() {
			return Err(BlendError::InvalidHeader);
		}
		Ok(Self {
			header,
			compression,
			bytes,
		})
	}

	/// Decoded bytes backing this file.
	pub fn bytes(&self) -> &[u8] {
		&self.bytes
	}

	/// Iterate blocks after the header.
	pub fn blocks(&self) -> BlockIter<'_> {
		BlockIter::new(&self.bytes, self.header.header_size, self.header)
	}

	/// Parse the first `DNA1` block. Files in foreign byte order are rejected, as in [`Self::parse`].
	pub fn dna(&self) -> Result<Dna> {
		self.header.check_host_endianness()?;
		for block in self.blocks() {
			let block = block?;
			if block.head.is_dna() {
				return Dna::parse(block.payload, self.header.endianness);
			}
		}
		Err(BlendError::DnaNotFound)
	}

	/// Parse with default options.
	pub fn parse(self) -> Result<ParsedFile> {
		self.parse_with(&ParseOptions::default())
	}

	/// Build the catalog, materialize every block, and index old addresses.
	pub fn parse_with(self, options: &ParseOptions) -> Result<ParsedFile> {
		let header = self.header;
		if !options.allow_foreign_endianness {
			header.check_host_endianness()?;
		}

		let blocks: Vec<Block<'_>> = self.blocks().collect::<Result<_>>()?;
		for block in &blocks {
			tracing::debug!(
				index = block.index,
				code = %code_label(block.head.code),
				len = block.head.len,
				nr = block.head.nr,
				sdna = block.head.sdna_nr,
				"block"
			);
		}

		let dna_block = blocks.iter().find(|block| block.head.is_dna()).ok_or(BlendError::DnaNotFound)?;
		let dna = Dna::parse(dna_block.payload, header.endianness)?;

		let materializer = Materializer::new(&dna, header.pointer_size, header.endianness, options.materialize);
		let mut materialized = Vec::new();
		let mut raw_blocks = Vec::new();
		for block in &blocks {
			match materializer.materialize_block(block)? {
				BlockOutcome::Structures(structures) => materialized.push(MaterializedBlock {
					block_index: block.index,
					code: block.head.code,
					old: block.head.old,
					sdna_nr: block.head.sdna_nr,
					element_size: structures.first().map_or(0, |item| item.size),
					structures,
				}),
				BlockOutcome::Raw(raw) => raw_blocks.push(raw),
				BlockOutcome::Skipped => {}
			}
		}

		let infos = blocks
			.iter()
			.map(|block| BlockInfo {
				index: block.index,
				head: block.head,
				file_offset: block.file_offset,
			})
			.collect();

		tracing::debug!(
			materialized = materialized.len(),
			raw = raw_blocks.len(),
			"materialized blocks"
		);

		Ok(ParsedFile {
			file: self,
			dna,
			blocks: infos,
			memory: MemoryMap::build(materialized),
			raw_blocks,
		})
	}
}

/// Parse in-memory bytes with default options.
pub fn parse_file(bytes: Vec<u8>) -> Result<ParsedFile> {
	BlendFile::from_bytes(bytes)?.parse()
}

#[derive(Debug, Clone, Copy)]
struct BlockInfo {
	index: usize,
	head: BHead,
	file_offset: usize,
}

/// Fully parsed file: catalog, blocks, materialized structures, and raw-block diagnostics.
pub struct ParsedFile {
	file: BlendFile,
	dna: Dna,
	blocks: Vec<BlockInfo>,
	memory: MemoryMap,
	raw_blocks: Vec<RawBlock>,
}

impl ParsedFile {
	/// Parsed header.
	pub fn header(&self) -> BlendHeader {
		self.file.header
	}

	/// Compression detected on the source bytes.
	pub fn compression(&self) -> Compression {
		self.file.compression
	}

	/// Pointer width, 4 or 8.
	pub fn pointer_size(&self) -> usize {
		self.file.header.pointer_size
	}

	/// File byte order.
	pub fn endianness(&self) -> Endianness {
		self.file.header.endianness
	}

	/// Dotted version, for example `"2.71"`.
	pub fn version_string(&self) -> String {
		self.file.header.version_string()
	}

	/// SDNA catalog.
	pub fn dna(&self) -> &Dna {
		&self.dna
	}

	/// Old-address index.
	pub fn memory(&self) -> &MemoryMap {
		&self.memory
	}

	/// Blocks whose payload size did not match their struct.
	pub fn raw_blocks(&self) -> &[RawBlock] {
		&self.raw_blocks
	}

	/// Every block in file order, `ENDB` included.
	pub fn blocks(&self) -> impl Iterator<Item = Block<'_>> + '_ {
		self.blocks.iter().map(|info| self.view(info))
	}

	/// Block at file position `index`.
	pub fn block(&self, index: usize) -> Option<Block<'_>> {
		self.blocks.get(index).map(|info| self.view(info))
	}

	/// First block whose old address equals `addr`. Null never matches.
	pub fn block_by_address(&self, addr: u64) -> Option<Block<'_>> {
		if addr == 0 {
			return None;
		}
		self.blocks.iter().find(|info| info.head.old == addr).map(|info| self.view(info))
	}

	/// Blocks carrying `code`, in file order.
	pub fn blocks_by_code(&self, code: [u8; 4]) -> Vec<Block<'_>> {
		self.blocks
			.iter()
			.filter(|info| info.head.code == code)
			.map(|info| self.view(info))
			.collect()
	}

	/// Every materialized structure whose root type is `type_name`.
	pub fn structures_of_type<'a>(&'a self, type_name: &str) -> impl Iterator<Item = &'a Structure> + use<'a> {
		let sdna_nr = self.dna.sdna_for_name(type_name);
		self.memory
			.blocks()
			.iter()
			.filter(move |block| Some(block.sdna_nr) == sdna_nr)
			.flat_map(|block| block.structures.iter())
	}

	/// Element sequence whose block starts exactly at `addr`.
	pub fn structures_by_address(&self, addr: u64) -> Option<&[Structure]> {
		self.memory.get(addr)
	}

	/// Resolve an address that may point inside a materialized block.
	pub fn resolve(&self, addr: u64) -> Option<Resolved> {
		self.memory.resolve(addr)
	}

	/// Follow a single-pointer field. See [`MemoryMap::dereference`].
	pub fn dereference(&self, field: &Field) -> Result<Option<&[Structure]>> {
		self.memory.dereference(field)
	}

	/// Follow each address of a 1D pointer-array field. See [`MemoryMap::dereference_array`].
	pub fn dereference_array(&self, field: &Field) -> Result<Vec<Option<&[Structure]>>> {
		self.memory.dereference_array(field)
	}

	/// Count of materialized structures across all blocks.
	pub fn structure_count(&self) -> usize {
		self.memory.blocks().iter().map(|block| block.structures.len()).sum()
	}

	/// Block distribution summary.
	pub fn block_stats(&self) -> BlockStats {
		let mut stats = BlockStats::default();
		for info in &self.blocks {
			stats.block_count += 1;
			stats.last_code = Some(info.head.code);
			*stats.codes.entry(info.head.code).or_insert(0) += 1;
			stats.has_dna1 |= info.head.is_dna();
			stats.has_endb |= info.head.is_endb();
		}
		stats
	}

	fn view(&self, info: &BlockInfo) -> Block<'_> {
		let start = info.file_offset + BHead::encoded_size(self.file.header);
		let end = start + info.head.len as usize;
		Block {
			index: info.index,
			head: info.head,
			payload: self.file.bytes.get(start..end).unwrap_or(&[]),
			file_offset: info.file_offset,
		}
	}
}

/// Block counts from a parsed file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockStats {
	/// Number of blocks, `ENDB` included.
	pub block_count: usize,
	/// Whether a `DNA1` block was seen.
	pub has_dna1: bool,
	/// Whether the stream ended with `ENDB`.
	pub has_endb: bool,
	/// Code of the final block.
	pub last_code: Option<[u8; 4]>,
	/// Frequency by block code.
	pub codes: BTreeMap<[u8; 4], usize>,
}

impl BlockStats {
	/// The `limit` most frequent codes, ties broken by code.
	pub fn top_codes(&self, limit: usize) -> Vec<([u8; 4], usize)> {
		let mut codes: Vec<_> = self.codes.iter().map(|(code, count)| (*code, *count)).collect();
		codes.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
		codes.truncate(limit);
		codes
	}
}

#[cfg(test)]
mod tests;
