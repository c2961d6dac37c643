//! Byte sinks and byte sources the compiled codecs run against
//!
//! The codecs are compiled down to closures over `&mut dyn Sink` and
//! `&mut dyn Source`, so both traits are deliberately minimal and object
//! safe. Adapters are provided for `Vec<u8>`, slices and the `std::io`
//! traits.

use crate::error::Error;

/// Destination for encoded bytes
///
/// Partial writes on a non-seekable destination are not recoverable: if an
/// encode call errors halfway through, callers that need atomicity should
/// write to a buffer they can discard (e.g. a `Vec<u8>`).
pub trait Sink {
	fn write_byte(&mut self, byte: u8) -> Result<(), Error>;
	fn write_all(&mut self, bytes: &[u8]) -> Result<(), Error>;
}

impl Sink for Vec<u8> {
	fn write_byte(&mut self, byte: u8) -> Result<(), Error> {
		self.push(byte);
		Ok(())
	}

	fn write_all(&mut self, bytes: &[u8]) -> Result<(), Error> {
		self.extend_from_slice(bytes);
		Ok(())
	}
}

/// [`Sink`] adapter over any [`std::io::Write`]
pub struct WriteSink<W> {
	writer: W,
}

impl<W: std::io::Write> WriteSink<W> {
	pub fn new(writer: W) -> Self {
		Self { writer }
	}

	pub fn into_inner(self) -> W {
		self.writer
	}
}

impl<W: std::io::Write> Sink for WriteSink<W> {
	fn write_byte(&mut self, byte: u8) -> Result<(), Error> {
		self.writer.write_all(&[byte]).map_err(Error::io)
	}

	fn write_all(&mut self, bytes: &[u8]) -> Result<(), Error> {
		self.writer.write_all(bytes).map_err(Error::io)
	}
}

/// Origin of encoded bytes
///
/// A `Source` is position-tracked: after a successful decode it is
/// positioned exactly at the first byte the value did not use. After a
/// failed decode its position is undefined.
pub trait Source {
	fn read_byte(&mut self) -> Result<u8, Error>;
	fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), Error>;
}

/// [`Source`] reading from a byte slice
pub struct SliceSource<'a> {
	slice: &'a [u8],
}

impl<'a> SliceSource<'a> {
	pub fn new(slice: &'a [u8]) -> Self {
		Self { slice }
	}

	/// The bytes that have not been consumed yet
	pub fn remaining(&self) -> &'a [u8] {
		self.slice
	}
}

impl Source for SliceSource<'_> {
	fn read_byte(&mut self) -> Result<u8, Error> {
		match self.slice.split_first() {
			None => Err(Error::eof()),
			Some((&byte, rest)) => {
				self.slice = rest;
				Ok(byte)
			}
		}
	}

	fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), Error> {
		if self.slice.len() < buf.len() {
			return Err(Error::eof());
		}
		let (just_read, rest) = self.slice.split_at(buf.len());
		buf.copy_from_slice(just_read);
		self.slice = rest;
		Ok(())
	}
}

/// [`Source`] adapter over any [`std::io::Read`]
///
/// If reading from a slice or a `Vec`, prefer [`SliceSource`]: it is faster
/// and lets you observe the unconsumed suffix.
pub struct ReaderSource<R> {
	reader: R,
}

impl<R: std::io::Read> ReaderSource<R> {
	pub fn new(reader: R) -> Self {
		Self { reader }
	}

	pub fn into_inner(self) -> R {
		self.reader
	}
}

impl<R: std::io::Read> Source for ReaderSource<R> {
	fn read_byte(&mut self) -> Result<u8, Error> {
		let mut buf = [0u8; 1];
		self.reader.read_exact(&mut buf).map_err(Error::io)?;
		Ok(buf[0])
	}

	fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), Error> {
		self.reader.read_exact(buf).map_err(Error::io)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn slice_source_tracks_position() {
		let mut source = SliceSource::new(&[1, 2, 3, 4]);
		assert_eq!(source.read_byte().unwrap(), 1);
		let mut buf = [0u8; 2];
		source.read_exact(&mut buf).unwrap();
		assert_eq!(buf, [2, 3]);
		assert_eq!(source.remaining(), &[4]);
	}

	#[test]
	fn slice_source_eof() {
		let mut source = SliceSource::new(&[1]);
		let mut buf = [0u8; 2];
		assert_eq!(
			source.read_exact(&mut buf).unwrap_err().kind(),
			crate::ErrorKind::Eof
		);
	}

	#[test]
	fn reader_source_maps_eof() {
		let mut source = ReaderSource::new(std::io::Cursor::new(vec![1u8]));
		assert_eq!(source.read_byte().unwrap(), 1);
		assert_eq!(
			source.read_byte().unwrap_err().kind(),
			crate::ErrorKind::Eof
		);
	}
}
