//! The Avro schema graph the codec builder compiles against
//!
//! A [`Schema`] is an arena of [`SchemaNode`]s referencing each other
//! through [`SchemaKey`] indices, so recursive records (linked lists,
//! trees...) are expressible without self-referential ownership. The first
//! node of the arena is the root.
//!
//! Schemas are assembled programmatically through a [`SchemaBuilder`];
//! parsing a JSON schema document is the responsibility of an outer layer
//! and is not provided here.

mod builder;
mod check_for_cycles;

pub use builder::SchemaBuilder;

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SCHEMA_ID: AtomicU64 = AtomicU64::new(0);

/// A validated Avro schema
///
/// Invariants guaranteed after construction:
/// - every [`SchemaKey`] is in range;
/// - a union has at least one branch, at most one `null` branch, and no
///   directly nested union;
/// - enum symbols are non-empty and unique, record field names are unique;
/// - decimals have `precision >= 1` and `scale <= precision`;
/// - no record reaches itself through record fields alone (such a value
///   could never be finite).
#[derive(Debug)]
pub struct Schema {
	// First node in the array is the root
	nodes: Vec<SchemaNode>,
	id: u64,
}

impl Schema {
	/// Start assembling a schema
	pub fn builder() -> SchemaBuilder {
		SchemaBuilder::new()
	}

	/// Build a single-node schema
	///
	/// Equivalent to pushing `node` as the root of a fresh [`SchemaBuilder`];
	/// any [`SchemaKey`] inside `node` would be out of range, so this is only
	/// useful for leaf nodes.
	pub fn from_node(node: SchemaNode) -> Result<Self, crate::error::SchemaError> {
		let mut builder = SchemaBuilder::new();
		builder.push(node);
		builder.build()
	}

	pub(crate) fn from_validated_nodes(nodes: Vec<SchemaNode>) -> Self {
		Self {
			nodes,
			id: NEXT_SCHEMA_ID.fetch_add(1, Ordering::Relaxed),
		}
	}

	/// The node the whole schema describes
	pub fn root(&self) -> &SchemaNode {
		&self.nodes[0]
	}

	pub(crate) fn root_key(&self) -> SchemaKey {
		SchemaKey::from_idx(0)
	}

	/// Navigate to the node a key points to
	pub fn node(&self, key: SchemaKey) -> &SchemaNode {
		&self.nodes[key.idx]
	}

	/// Identity of this schema instance, used to key shared codec caches
	pub(crate) fn id(&self) -> u64 {
		self.id
	}
}

impl std::ops::Index<SchemaKey> for Schema {
	type Output = SchemaNode;
	fn index(&self, key: SchemaKey) -> &Self::Output {
		&self.nodes[key.idx]
	}
}

/// The location of a node in a [`Schema`] (or in the [`SchemaBuilder`]
/// assembling one)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SchemaKey {
	pub(crate) idx: usize,
}

impl SchemaKey {
	pub fn from_idx(idx: usize) -> Self {
		Self { idx }
	}

	pub fn idx(self) -> usize {
		self.idx
	}
}

/// One node of a [`Schema`]
///
/// Logical types are dedicated nodes rather than annotations on their
/// underlying type: a [`Decimal`] carries its `bytes`/`fixed`
/// representation, `Duration` is implicitly a `fixed` of size 12, and the
/// timestamp variants are implicitly `long`s. The invariants "decimal only
/// overlays bytes or fixed" and "duration is a 12-byte fixed" are therefore
/// structural.
#[derive(Clone, Debug)]
pub enum SchemaNode {
	/// A `null` Avro schema.
	Null,
	/// A `boolean` Avro schema.
	Boolean,
	/// An `int` Avro schema.
	Int,
	/// A `long` Avro schema.
	Long,
	/// A `float` Avro schema.
	Float,
	/// A `double` Avro schema.
	Double,
	/// A `bytes` Avro schema: a length-prefixed sequence of 8-bit bytes.
	Bytes,
	/// A `string` Avro schema: a length-prefixed UTF-8 character sequence.
	String,
	/// A `fixed` Avro schema: exactly `size` raw bytes, no length prefix.
	Fixed(Fixed),
	/// An `enum` Avro schema. The position of a symbol in `symbols` is its
	/// wire index.
	Enum(Enum),
	/// An `array` Avro schema; all elements share the pointed-to schema.
	Array(SchemaKey),
	/// A `map` Avro schema; keys are always strings, values share the
	/// pointed-to schema.
	Map(SchemaKey),
	/// A `record` Avro schema; fields are encoded in declaration order.
	Record(Record),
	/// A `union` Avro schema; the wire form is the varint branch index
	/// followed by the branch's encoding.
	Union(Union),
	/// The `decimal` logical type over `bytes` or `fixed`: a scaled integer
	/// in two's-complement big-endian minimum-length form.
	Decimal(Decimal),
	/// The `duration` logical type: a `fixed` of 12 bytes holding three
	/// little-endian unsigned 32-bit integers (months, days, milliseconds).
	Duration,
	/// The `timestamp-millis` logical type over `long`.
	TimestampMillis,
	/// The `timestamp-micros` logical type over `long`.
	TimestampMicros,
}

impl SchemaNode {
	/// Lowercase name of the node's shape, for diagnostics
	pub(crate) fn kind_name(&self) -> &'static str {
		match self {
			SchemaNode::Null => "null",
			SchemaNode::Boolean => "boolean",
			SchemaNode::Int => "int",
			SchemaNode::Long => "long",
			SchemaNode::Float => "float",
			SchemaNode::Double => "double",
			SchemaNode::Bytes => "bytes",
			SchemaNode::String => "string",
			SchemaNode::Fixed(_) => "fixed",
			SchemaNode::Enum(_) => "enum",
			SchemaNode::Array(_) => "array",
			SchemaNode::Map(_) => "map",
			SchemaNode::Record(_) => "record",
			SchemaNode::Union(_) => "union",
			SchemaNode::Decimal(_) => "decimal",
			SchemaNode::Duration => "duration",
			SchemaNode::TimestampMillis => "timestamp-millis",
			SchemaNode::TimestampMicros => "timestamp-micros",
		}
	}

	/// The name of the node, if its shape is named
	pub(crate) fn name(&self) -> Option<&Name> {
		match self {
			SchemaNode::Fixed(fixed) => Some(&fixed.name),
			SchemaNode::Enum(enum_) => Some(&enum_.name),
			SchemaNode::Record(record) => Some(&record.name),
			SchemaNode::Decimal(Decimal {
				repr: DecimalRepr::Fixed(fixed),
				..
			}) => Some(&fixed.name),
			_ => None,
		}
	}
}

/// Component of a [`SchemaNode`]
#[derive(Clone, Debug)]
pub struct Fixed {
	pub name: Name,
	pub size: usize,
}

/// Component of a [`SchemaNode`]
#[derive(Clone, Debug)]
pub struct Enum {
	pub name: Name,
	pub symbols: Vec<String>,
}

/// Component of a [`SchemaNode`]
#[derive(Clone, Debug)]
pub struct Record {
	pub name: Name,
	pub fields: Vec<RecordField>,
}

/// Component of a [`SchemaNode`]
#[derive(Clone, Debug)]
pub struct RecordField {
	pub name: String,
	pub schema: SchemaKey,
}

/// Component of a [`SchemaNode`]
#[derive(Clone, Debug)]
pub struct Union {
	pub variants: Vec<SchemaKey>,
}

/// Component of a [`SchemaNode`]
#[derive(Clone, Debug)]
pub struct Decimal {
	pub precision: usize,
	pub scale: u32,
	pub repr: DecimalRepr,
}

/// Underlying representation of a [`Decimal`]
#[derive(Clone, Debug)]
pub enum DecimalRepr {
	/// Length-prefixed, minimum-length two's complement
	Bytes,
	/// Sign-extended to exactly `size` bytes
	Fixed(Fixed),
}

/// Schema component for named variants of a [`SchemaNode`]
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Name {
	fully_qualified_name: String,
	namespace_delimiter_idx: Option<usize>,
}

impl std::fmt::Debug for Name {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		std::fmt::Debug::fmt(&self.fully_qualified_name, f)
	}
}

impl Name {
	/// Build a name from its fully qualified form: everything up to the last
	/// `.` is the namespace
	pub fn new(fully_qualified_name: impl Into<String>) -> Self {
		let fully_qualified_name = fully_qualified_name.into();
		let namespace_delimiter_idx = fully_qualified_name.rfind('.');
		Self {
			fully_qualified_name,
			namespace_delimiter_idx,
		}
	}

	pub fn name(&self) -> &str {
		match self.namespace_delimiter_idx {
			None => &self.fully_qualified_name,
			Some(delimiter_idx) => &self.fully_qualified_name[delimiter_idx + 1..],
		}
	}

	pub fn namespace(&self) -> Option<&str> {
		self.namespace_delimiter_idx
			.map(|idx| &self.fully_qualified_name[..idx])
	}

	pub fn fully_qualified_name(&self) -> &str {
		&self.fully_qualified_name
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn name_splits_namespace() {
		let name = Name::new("com.example.LongList");
		assert_eq!(name.name(), "LongList");
		assert_eq!(name.namespace(), Some("com.example"));
		assert_eq!(name.fully_qualified_name(), "com.example.LongList");

		let bare = Name::new("LongList");
		assert_eq!(bare.name(), "LongList");
		assert_eq!(bare.namespace(), None);
	}

	#[test]
	fn schema_ids_are_distinct() {
		let a = Schema::from_node(SchemaNode::Long).unwrap();
		let b = Schema::from_node(SchemaNode::Long).unwrap();
		assert_ne!(a.id(), b.id());
	}
}
