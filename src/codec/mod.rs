//! The primitive wire codec: zig-zag varints, IEEE-754 floats, booleans,
//! length-delimited bytes and block-framed sequences
//!
//! Everything here is a pure function over a [`Sink`] or a [`Source`]; the
//! builder composes these into per-type closures.

pub(crate) mod blocks;

use crate::{
	error::{Error, ErrorKind},
	rw::{Sink, Source},
};

use integer_encoding::VarInt;

/// A zig-zag varint never takes more than this many bytes on the wire
pub const MAX_VARINT_LEN: usize = 10;

/// Write a signed 64-bit integer in the zig-zag base-128 form
///
/// This is the wire form of both the `int` and `long` schemas; `int` range
/// enforcement happens in the builder cases, not here.
pub fn write_long(sink: &mut dyn Sink, value: i64) -> Result<(), Error> {
	// `integer-encoding` applies the zig-zag transform for signed integers
	let mut buf = [0u8; MAX_VARINT_LEN];
	let n_bytes = value.encode_var(&mut buf);
	sink.write_all(&buf[..n_bytes])
}

/// Read the unsigned base-128 form without the zig-zag mapping
///
/// Consumes bytes until one with a clear continuation bit; more than
/// [`MAX_VARINT_LEN`] continuation bytes is an [`ErrorKind::Overflow`].
pub(crate) fn read_raw_varint(source: &mut dyn Source) -> Result<u64, Error> {
	let mut value = 0u64;
	for i in 0..MAX_VARINT_LEN {
		let byte = source.read_byte()?;
		value |= u64::from(byte & 0x7f) << (7 * i as u32);
		if byte & 0x80 == 0 {
			return Ok(value);
		}
	}
	Err(Error::new(
		ErrorKind::Overflow,
		"varint did not terminate within its 10-byte bound",
	))
}

/// Read a signed 64-bit integer from its zig-zag base-128 form
pub fn read_long(source: &mut dyn Source) -> Result<i64, Error> {
	let unsigned = read_raw_varint(source)?;
	Ok(((unsigned >> 1) as i64) ^ -((unsigned & 1) as i64))
}

pub fn write_bool(sink: &mut dyn Sink, value: bool) -> Result<(), Error> {
	sink.write_byte(value as u8)
}

/// Read a boolean: `0x00` is false, any other byte is true
pub fn read_bool(source: &mut dyn Source) -> Result<bool, Error> {
	Ok(source.read_byte()? != 0)
}

pub fn write_f32(sink: &mut dyn Sink, value: f32) -> Result<(), Error> {
	sink.write_all(&value.to_le_bytes())
}

pub fn read_f32(source: &mut dyn Source) -> Result<f32, Error> {
	let mut buf = [0u8; 4];
	source.read_exact(&mut buf)?;
	Ok(f32::from_le_bytes(buf))
}

pub fn write_f64(sink: &mut dyn Sink, value: f64) -> Result<(), Error> {
	sink.write_all(&value.to_le_bytes())
}

pub fn read_f64(source: &mut dyn Source) -> Result<f64, Error> {
	let mut buf = [0u8; 8];
	source.read_exact(&mut buf)?;
	Ok(f64::from_le_bytes(buf))
}

/// Write a length prefix (used by `bytes`, `string` and decimal-over-bytes)
pub fn write_len(sink: &mut dyn Sink, len: usize) -> Result<(), Error> {
	let len: i64 = len.try_into().map_err(|_| {
		Error::new(
			ErrorKind::Conversion,
			"buffer length does not fit i64 for encoding as a length prefix",
		)
	})?;
	write_long(sink, len)
}

/// Read a length prefix, rejecting negative values
pub fn read_len(source: &mut dyn Source) -> Result<usize, Error> {
	let len = read_long(source)?;
	usize::try_from(len).map_err(|_| {
		Error::custom(
			ErrorKind::Wire,
			format_args!("invalid length prefix in stream: {len}"),
		)
	})
}

pub fn write_bytes(sink: &mut dyn Sink, bytes: &[u8]) -> Result<(), Error> {
	write_len(sink, bytes.len())?;
	sink.write_all(bytes)
}

/// Grow the buffer chunk by chunk so a malformed length prefix cannot force
/// a huge up-front allocation
const READ_CHUNK: usize = 64 * 1024;

pub fn read_bytes(source: &mut dyn Source) -> Result<Vec<u8>, Error> {
	let total = read_len(source)?;
	let mut buf = Vec::with_capacity(total.min(READ_CHUNK));
	let mut remaining = total;
	while remaining > 0 {
		let chunk = remaining.min(READ_CHUNK);
		let start = buf.len();
		buf.resize(start + chunk, 0);
		source.read_exact(&mut buf[start..])?;
		remaining -= chunk;
	}
	Ok(buf)
}

pub fn write_str(sink: &mut dyn Sink, value: &str) -> Result<(), Error> {
	write_bytes(sink, value.as_bytes())
}

pub fn read_string(source: &mut dyn Source) -> Result<String, Error> {
	let bytes = read_bytes(source)?;
	String::from_utf8(bytes).map_err(|e| {
		Error::custom(
			ErrorKind::Utf8,
			format_args!("string on the wire is not valid utf-8: {e}"),
		)
	})
}
