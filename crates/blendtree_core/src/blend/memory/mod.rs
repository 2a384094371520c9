use std::collections::HashMap;

use crate::blend::{ArrayDims, BlendError, Field, FieldValue, Result, Structure};

/// Structures materialized from one block.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterializedBlock {
	/// Block position in file order.
	pub block_index: usize,
	/// Block code.
	pub code: [u8; 4],
	/// Old address of the block.
	pub old: u64,
	/// SDNA struct index of every element.
	pub sdna_nr: u32,
	/// Size in bytes of one element.
	pub element_size: usize,
	/// Elements in payload order.
	pub structures: Vec<Structure>,
}

impl MaterializedBlock {
	/// One past the last old address covered by the payload.
	pub fn end(&self) -> u64 {
		let len = self.element_size.saturating_mul(self.structures.len()) as u64;
		self.old.saturating_add(len)
	}
}

/// Interior-pointer resolution result from [`MemoryMap::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
	/// Block position in file order.
	pub block_index: usize,
	/// Element containing the address.
	pub element_index: usize,
	/// Byte offset inside that element.
	pub byte_offset: usize,
}

/// Old-address index over materialized blocks.
///
/// Address `0` is never a key. When two blocks share an old address, the first one
/// in file order owns the key; the later one stays reachable through [`MemoryMap::blocks`].
#[derive(Debug, Default)]
pub struct MemoryMap {
	blocks: Vec<MaterializedBlock>,
	by_addr: HashMap<u64, usize>,
	starts: Vec<u64>,
	ranges: Vec<usize>,
}

impl MemoryMap {
	/// Index materialized blocks by their old address.
	pub fn build(blocks: Vec<MaterializedBlock>) -> Self {
		let mut by_addr = HashMap::with_capacity(blocks.len());
		for (slot, block) in blocks.iter().enumerate() {
			if block.old == 0 || block.structures.is_empty() {
				continue;
			}
			if let Some(first) = by_addr.get(&block.old) {
				let first: &MaterializedBlock = &blocks[*first];
				tracing::warn!(
					address = block.old,
					kept = first.block_index,
					ignored = block.block_index,
					"duplicate old address"
				);
				continue;
			}
			by_addr.insert(block.old, slot);
		}

		let mut ranges: Vec<usize> = by_addr.values().copied().collect();
		ranges.sort_by_key(|slot| blocks[*slot].old);
		let starts = ranges.iter().map(|slot| blocks[*slot].old).collect();

		Self {
			blocks,
			by_addr,
			starts,
			ranges,
		}
	}

	/// Element sequence whose block starts exactly at `addr`.
	pub fn get(&self, addr: u64) -> Option<&[Structure]> {
		self.block_at(addr).map(|block| block.structures.as_slice())
	}

	/// Materialized block whose old address equals `addr`.
	pub fn block_at(&self, addr: u64) -> Option<&MaterializedBlock> {
		if addr == 0 {
			return None;
		}
		self.by_addr.get(&addr).map(|slot| &self.blocks[*slot])
	}

	/// Resolve an address that may point inside a block payload.
	pub fn resolve(&self, addr: u64) -> Option<Resolved> {
		if addr == 0 {
			return None;
		}

		let idx = self.starts.partition_point(|start| *start <= addr);
		let block = &self.blocks[*self.ranges.get(idx.checked_sub(1)?)?];
		if addr >= block.end() || block.element_size == 0 {
			return None;
		}

		let offset = (addr - block.old) as usize;
		Some(Resolved {
			block_index: block.block_index,
			element_index: offset / block.element_size,
			byte_offset: offset % block.element_size,
		})
	}

	/// Follow a single-pointer field one hop.
	///
	/// Null and unmapped addresses resolve to `Ok(None)`. Pointer-to-pointer and
	/// pointer-array fields are rejected so callers pick the matching accessor.
	pub fn dereference(&self, field: &Field) -> Result<Option<&[Structure]>> {
		let name = || field.qualified_name.clone();
		match &field.value {
			_ if !field.is_pointer() => Err(BlendError::NotAPointer { name: name() }),
			_ if field.ptr_depth > 1 => Err(BlendError::PointerToPointer { name: name() }),
			FieldValue::Pointer(addr) => Ok(self.get(*addr)),
			_ => Err(BlendError::PointerArrayNeedsArrayDereference { name: name() }),
		}
	}

	/// Follow every address of a 1D pointer-array field, one entry per element.
	pub fn dereference_array(&self, field: &Field) -> Result<Vec<Option<&[Structure]>>> {
		let name = || field.qualified_name.clone();
		match &field.value {
			_ if !field.is_pointer() => Err(BlendError::NotAPointer { name: name() }),
			_ if field.ptr_depth > 1 => Err(BlendError::PointerToPointer { name: name() }),
			FieldValue::PointerArray(array) if matches!(array.dims, ArrayDims::Two(..)) => {
				Err(BlendError::PointerArray2dDereference { name: name() })
			}
			FieldValue::PointerArray(array) => Ok(array.addrs.iter().map(|addr| self.get(*addr)).collect()),
			_ => Err(BlendError::ScalarPointerNeedsScalarDereference { name: name() }),
		}
	}

	/// Every materialized block in file order, duplicates included.
	pub fn blocks(&self) -> &[MaterializedBlock] {
		&self.blocks
	}

	/// Number of distinct addresses.
	pub fn len(&self) -> usize {
		self.by_addr.len()
	}

	/// Whether no address is indexed.
	pub fn is_empty(&self) -> bool {
		self.by_addr.is_empty()
	}
}
