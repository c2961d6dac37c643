//! Block framing for `array` and `map` values
//!
//! Items are grouped into blocks, each headed by a signed varint count. A
//! negative count advertises `|count|` items followed by a byte-length hint
//! which consumers discard. A zero count terminates the sequence.
//!
//! The encoder side always emits a single positive-count block followed by
//! the terminator (or just the terminator for an empty collection); the
//! decoder accepts any framing a conforming encoder may produce.

use super::{read_long, read_raw_varint, write_long};
use crate::{
	error::{Error, ErrorKind},
	rw::{Sink, Source},
};

/// Write the header of the single block the encoder uses, when non-empty
pub(crate) fn write_block_header(sink: &mut dyn Sink, len: usize) -> Result<(), Error> {
	if len > 0 {
		let len: i64 = len
			.try_into()
			.map_err(|_| Error::new(ErrorKind::Conversion, "array or map length overflows i64"))?;
		write_long(sink, len)?;
	}
	Ok(())
}

/// Write the zero-count block that terminates a sequence
pub(crate) fn write_block_end(sink: &mut dyn Sink) -> Result<(), Error> {
	write_long(sink, 0)
}

enum BlockState {
	NeedHeader,
	NeedBlockBody { remaining: usize },
	Done,
}

/// Reader for the block-framed item stream of one array or map value
pub(crate) struct BlockReader<'r> {
	source: &'r mut dyn Source,
	state: BlockState,
}

impl<'r> BlockReader<'r> {
	pub(crate) fn new(source: &'r mut dyn Source) -> Self {
		Self {
			source,
			state: BlockState::NeedHeader,
		}
	}

	/// Whether one more item should be decoded from [`Self::source`]
	pub(crate) fn next_item(&mut self) -> Result<bool, Error> {
		loop {
			match self.state {
				BlockState::Done => return Ok(false),
				BlockState::NeedBlockBody { remaining } => {
					self.state = match remaining - 1 {
						0 => BlockState::NeedHeader,
						remaining => BlockState::NeedBlockBody { remaining },
					};
					return Ok(true);
				}
				BlockState::NeedHeader => {
					let count = read_long(self.source)?;
					if count == 0 {
						self.state = BlockState::Done;
						return Ok(false);
					}
					if count < 0 {
						// Negative counts are followed by the byte length of the
						// block; we read items one by one so the hint is dropped.
						// It is a plain varint, not zig-zag.
						let _byte_len = read_raw_varint(self.source)?;
					}
					let remaining = usize::try_from(count.unsigned_abs()).map_err(|_| {
						Error::custom(
							ErrorKind::Wire,
							format_args!("block count {count} does not fit this platform"),
						)
					})?;
					self.state = BlockState::NeedBlockBody { remaining };
				}
			}
		}
	}

	pub(crate) fn source(&mut self) -> &mut dyn Source {
		&mut *self.source
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::rw::SliceSource;

	fn drain(bytes: &[u8]) -> Result<Vec<i64>, Error> {
		let mut source = SliceSource::new(bytes);
		let mut blocks = BlockReader::new(&mut source);
		let mut items = Vec::new();
		while blocks.next_item()? {
			items.push(read_long(blocks.source())?);
		}
		Ok(items)
	}

	#[test]
	fn single_positive_block() {
		// count 2, items 3 and 27, terminator
		assert_eq!(drain(&[0x04, 0x06, 0x36, 0x00]).unwrap(), [3, 27]);
	}

	#[test]
	fn empty_sequence() {
		assert_eq!(drain(&[0x00]).unwrap(), Vec::<i64>::new());
	}

	#[test]
	fn multiple_positive_blocks() {
		// two blocks of one item each
		assert_eq!(drain(&[0x02, 0x06, 0x02, 0x36, 0x00]).unwrap(), [3, 27]);
	}

	#[test]
	fn negative_count_with_byte_length_hint() {
		// count -2 (zig-zag 0x03), byte-length hint 2 (plain varint 0x02)
		assert_eq!(drain(&[0x03, 0x02, 0x06, 0x36, 0x00]).unwrap(), [3, 27]);
	}

	#[test]
	fn truncated_sequence_is_eof() {
		assert_eq!(drain(&[0x04, 0x06]).unwrap_err().kind(), ErrorKind::Eof);
	}
}
