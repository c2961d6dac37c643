//! # Getting started
//!
//! ```
//! use avro_bind::schema::SchemaNode;
//!
//! let schema = avro_bind::Schema::from_node(SchemaNode::Long).expect("schema is valid");
//!
//! let mut encoded = Vec::new();
//! avro_bind::to_datum(&150i64, &mut encoded, &schema).expect("failed to serialize");
//! assert_eq!(encoded, [0xAC, 0x02]);
//!
//! assert_eq!(
//! 	avro_bind::from_datum_slice::<i64>(&encoded, &schema).expect("failed to deserialize"),
//! 	150
//! );
//! ```
//!
//! # A schema-to-type binding compiler for the Avro binary encoding
//!
//! This crate pairs an Avro [`Schema`] with a statically known Rust type and
//! compiles the pair into a `(encode, decode)` closure pair implementing the
//! [Avro binary encoding](https://avro.apache.org/docs/current/specification/#binary-encoding):
//! zig-zag varints, little-endian IEEE-754 floats, length-prefixed bytes and
//! strings, block-framed arrays and maps, varint-indexed unions, and the
//! decimal / duration / timestamp logical types.
//!
//! The pairing happens once, up front: [`build_encoder`] and
//! [`build_decoder`] resolve the target type into a
//! [`TypeResolution`](resolution::TypeResolution) (through the [`Bind`]
//! trait), dispatch every (schema node, resolution) pair over an ordered
//! rule registry, and hand back [`Encoder`] / [`Decoder`] values that do no
//! further matching at run time. Self-referential record schemas compile
//! through cached forward references, so linked lists and trees work with
//! memory linear in the value depth. Compiled closures can be shared across
//! builds and threads through a [`BindingCache`].
//!
//! Schema documents themselves (JSON parsing, container files, registries,
//! RPC framing) are out of scope: schemas are assembled programmatically
//! with [`schema::SchemaBuilder`], and the only I/O the codecs perform is
//! reading and writing raw bytes through the [`rw::Source`] and
//! [`rw::Sink`] traits.

pub mod build;
pub mod codec;
pub mod error;
pub mod resolution;
pub mod rw;
pub mod schema;

pub use {
	build::{build_decoder, build_encoder, Binder, BindingCache, Decoder, Encoder},
	error::{Error, ErrorKind, SchemaError},
	resolution::{
		Bind, Bytes, EnumBinding, FieldValues, MapKey, RecordBinding, TypeResolution, UnionBinding,
	},
	schema::Schema,
};

/// Serialize one avro "datum" (raw data, no headers) to the provided writer
///
/// Compiles a fresh codec on every call; when serializing more than one
/// value, build an [`Encoder`] once instead.
pub fn to_datum<T, W>(value: &T, writer: W, schema: &Schema) -> Result<(), Error>
where
	T: Bind,
	W: std::io::Write,
{
	build_encoder::<T>(schema)?.encode(value, &mut rw::WriteSink::new(writer))
}

/// Deserialize one avro "datum" (raw data, no headers) from a slice
///
/// Trailing bytes are not an error. Compiles a fresh codec on every call;
/// when deserializing more than one value, build a [`Decoder`] once
/// instead.
pub fn from_datum_slice<T>(slice: &[u8], schema: &Schema) -> Result<T, Error>
where
	T: Bind,
{
	build_decoder::<T>(schema)?.decode_slice(slice)
}

/// Deserialize one avro "datum" (raw data, no headers) from an `impl Read`
pub fn from_datum_reader<T, R>(reader: R, schema: &Schema) -> Result<T, Error>
where
	T: Bind,
	R: std::io::Read,
{
	build_decoder::<T>(schema)?.decode(&mut rw::ReaderSource::new(reader))
}
