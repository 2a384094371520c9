use crate::blend::bytes::Cursor;
use crate::blend::{BHead, BlendError, BlendHeader, Result};

/// Borrowed view over one parsed blend block.
#[derive(Debug, Clone, Copy)]
pub struct Block<'a> {
	/// Zero-based position of this block in file order.
	pub index: usize,
	/// Parsed block header.
	pub head: BHead,
	/// Raw payload bytes.
	pub payload: &'a [u8],
	/// Absolute byte offset where this block header starts.
	pub file_offset: usize,
}

/// Iterator over contiguous block records.
///
/// After each payload the cursor skips to the next 4-byte boundary of the block stream.
pub struct BlockIter<'a> {
	cursor: Cursor<'a>,
	offset_base: usize,
	header: BlendHeader,
	next_index: usize,
	done: bool,
}

impl<'a> BlockIter<'a> {
	/// Create a block iterator starting at `offset`.
	pub fn new(bytes: &'a [u8], offset: usize, header: BlendHeader) -> Self {
		let slice = bytes.get(offset..).unwrap_or(&[]);
		Self {
			cursor: Cursor::new(slice, header.endianness),
			offset_base: offset,
			header,
			next_index: 0,
			done: false,
		}
	}

	fn read_block(&mut self) -> Result<Block<'a>> {
		let file_offset = self.offset_base + self.cursor.pos();
		let head = BHead::parse(&mut self.cursor, self.header)?;

		let rem = self.cursor.remaining();
		let payload_len = usize::try_from(head.len)
			.ok()
			.filter(|len| *len <= rem)
			.ok_or(BlendError::BlockLenOutOfRange {
				at: file_offset,
				len: head.len,
				rem,
			})?;
		let payload = self.cursor.read_exact(payload_len)?;
		self.cursor.align4_lenient();

		let index = self.next_index;
		self.next_index += 1;
		Ok(Block {
			index,
			head,
			payload,
			file_offset,
		})
	}
}

impl<'a> Iterator for BlockIter<'a> {
	type Item = Result<Block<'a>>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.done {
			return None;
		}

		if self.cursor.remaining() == 0 {
			self.done = true;
			return None;
		}

		let block = match self.read_block() {
			Ok(value) => value,
			Err(err) => {
				self.done = true;
				return Some(Err(err));
			}
		};

		if block.head.is_endb() {
			self.done = true;
		}

		Some(Ok(block))
	}
}
