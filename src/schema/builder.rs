//! Programmatic construction of a [`Schema`], with validation

use super::{check_for_cycles, DecimalRepr, Schema, SchemaKey, SchemaNode};
use crate::error::SchemaError;

use std::collections::HashSet;

/// Assembles the node arena of a [`Schema`]
///
/// The first node pushed (or reserved) becomes the root. Recursive schemas
/// are wired by [`reserve`](Self::reserve)-ing a key before the nodes that
/// reference it are pushed, then [`fill`](Self::fill)-ing it:
///
/// ```
/// use avro_bind::schema::{Name, Record, RecordField, Schema, SchemaNode, Union};
///
/// let mut builder = Schema::builder();
/// let list = builder.reserve();
/// let long = builder.push(SchemaNode::Long);
/// let null = builder.push(SchemaNode::Null);
/// let next = builder.push(SchemaNode::Union(Union {
/// 	variants: vec![list, null],
/// }));
/// builder.fill(
/// 	list,
/// 	SchemaNode::Record(Record {
/// 		name: Name::new("LongList"),
/// 		fields: vec![
/// 			RecordField { name: "value".to_owned(), schema: long },
/// 			RecordField { name: "next".to_owned(), schema: next },
/// 		],
/// 	}),
/// );
/// let schema = builder.build().unwrap();
/// ```
pub struct SchemaBuilder {
	nodes: Vec<Option<SchemaNode>>,
}

impl Default for SchemaBuilder {
	fn default() -> Self {
		Self::new()
	}
}

impl SchemaBuilder {
	pub fn new() -> Self {
		Self { nodes: Vec::new() }
	}

	/// Append a node, returning the key other nodes may reference it by
	pub fn push(&mut self, node: SchemaNode) -> SchemaKey {
		let key = SchemaKey::from_idx(self.nodes.len());
		self.nodes.push(Some(node));
		key
	}

	/// Reserve a key to be [`fill`](Self::fill)-ed later
	///
	/// This is how cycles are introduced: the reserved key may be referenced
	/// by nodes pushed before it is filled.
	pub fn reserve(&mut self) -> SchemaKey {
		let key = SchemaKey::from_idx(self.nodes.len());
		self.nodes.push(None);
		key
	}

	/// Fill a [`reserve`](Self::reserve)-d key
	///
	/// Filling a key twice, or one that was not reserved, is a programmer
	/// error and panics.
	pub fn fill(&mut self, key: SchemaKey, node: SchemaNode) {
		let slot = &mut self.nodes[key.idx];
		assert!(slot.is_none(), "schema builder key filled twice");
		*slot = Some(node);
	}

	/// Validate the graph and freeze it into a [`Schema`]
	pub fn build(self) -> Result<Schema, SchemaError> {
		let nodes: Vec<SchemaNode> = self
			.nodes
			.into_iter()
			.collect::<Option<_>>()
			.ok_or_else(|| SchemaError::new("schema has a reserved key that was never filled"))?;
		if nodes.is_empty() {
			return Err(SchemaError::new("schema has no root node"));
		}

		let in_range = |key: SchemaKey| -> Result<(), SchemaError> {
			if key.idx < nodes.len() {
				Ok(())
			} else {
				Err(SchemaError::msg(format_args!(
					"schema key {} is out of range ({} nodes)",
					key.idx,
					nodes.len()
				)))
			}
		};

		for node in &nodes {
			match node {
				SchemaNode::Array(item) | SchemaNode::Map(item) => in_range(*item)?,
				SchemaNode::Union(union) => {
					if union.variants.is_empty() {
						return Err(SchemaError::new("union has no branches"));
					}
					let mut n_nulls = 0usize;
					for &variant in &union.variants {
						in_range(variant)?;
						match &nodes[variant.idx] {
							SchemaNode::Null => n_nulls += 1,
							SchemaNode::Union(_) => {
								return Err(SchemaError::new(
									"union may not directly contain another union",
								));
							}
							_ => {}
						}
					}
					if n_nulls > 1 {
						return Err(SchemaError::new("union has more than one null branch"));
					}
				}
				SchemaNode::Record(record) => {
					let mut field_names = HashSet::new();
					for field in &record.fields {
						in_range(field.schema)?;
						if !field_names.insert(field.name.as_str()) {
							return Err(SchemaError::msg(format_args!(
								"record {:?} declares field {:?} twice",
								record.name, field.name
							)));
						}
					}
				}
				SchemaNode::Enum(enum_) => {
					if enum_.symbols.is_empty() {
						return Err(SchemaError::msg(format_args!(
							"enum {:?} has no symbols",
							enum_.name
						)));
					}
					let mut symbols = HashSet::new();
					for symbol in &enum_.symbols {
						if !symbols.insert(symbol.as_str()) {
							return Err(SchemaError::msg(format_args!(
								"enum {:?} declares symbol {symbol:?} twice",
								enum_.name
							)));
						}
					}
				}
				SchemaNode::Decimal(decimal) => {
					if decimal.precision == 0 {
						return Err(SchemaError::new("decimal precision must be at least 1"));
					}
					if decimal.scale as usize > decimal.precision {
						return Err(SchemaError::msg(format_args!(
							"decimal scale {} exceeds precision {}",
							decimal.scale, decimal.precision
						)));
					}
					if let DecimalRepr::Fixed(fixed) = &decimal.repr {
						if fixed.size == 0 {
							return Err(SchemaError::new("decimal over fixed of size 0"));
						}
					}
				}
				SchemaNode::Fixed(_)
				| SchemaNode::Null
				| SchemaNode::Boolean
				| SchemaNode::Int
				| SchemaNode::Long
				| SchemaNode::Float
				| SchemaNode::Double
				| SchemaNode::Bytes
				| SchemaNode::String
				| SchemaNode::Duration
				| SchemaNode::TimestampMillis
				| SchemaNode::TimestampMicros => {}
			}
		}

		check_for_cycles::check_for_unconditional_cycles(&nodes)?;

		Ok(Schema::from_validated_nodes(nodes))
	}
}

#[cfg(test)]
mod tests {
	use crate::schema::*;

	fn named(name: &str) -> Name {
		Name::new(name)
	}

	#[test]
	fn rejects_unfilled_reservation() {
		let mut builder = Schema::builder();
		let _hole = builder.reserve();
		assert!(builder.build().is_err());
	}

	#[test]
	fn rejects_empty_union() {
		let mut builder = Schema::builder();
		builder.push(SchemaNode::Union(Union { variants: vec![] }));
		assert!(builder.build().is_err());
	}

	#[test]
	fn rejects_two_nulls_in_union() {
		let mut builder = Schema::builder();
		let root = builder.reserve();
		let a = builder.push(SchemaNode::Null);
		let b = builder.push(SchemaNode::Null);
		builder.fill(root, SchemaNode::Union(Union { variants: vec![a, b] }));
		assert!(builder.build().is_err());
	}

	#[test]
	fn rejects_nested_union() {
		let mut builder = Schema::builder();
		let root = builder.reserve();
		let long = builder.push(SchemaNode::Long);
		let inner = builder.push(SchemaNode::Union(Union {
			variants: vec![long],
		}));
		builder.fill(root, SchemaNode::Union(Union { variants: vec![inner] }));
		assert!(builder.build().is_err());
	}

	#[test]
	fn rejects_duplicate_enum_symbols() {
		let result = Schema::from_node(SchemaNode::Enum(Enum {
			name: named("Suit"),
			symbols: vec!["HEARTS".to_owned(), "HEARTS".to_owned()],
		}));
		assert!(result.is_err());
	}

	#[test]
	fn rejects_out_of_range_key() {
		let mut builder = Schema::builder();
		builder.push(SchemaNode::Array(SchemaKey::from_idx(7)));
		assert!(builder.build().is_err());
	}

	#[test]
	fn rejects_scale_above_precision() {
		let result = Schema::from_node(SchemaNode::Decimal(Decimal {
			precision: 2,
			scale: 3,
			repr: DecimalRepr::Bytes,
		}));
		assert!(result.is_err());
	}

	#[test]
	fn rejects_unconditional_record_cycle() {
		let mut builder = Schema::builder();
		let root = builder.reserve();
		builder.fill(
			root,
			SchemaNode::Record(Record {
				name: named("Ouroboros"),
				fields: vec![RecordField {
					name: "tail".to_owned(),
					schema: root,
				}],
			}),
		);
		assert!(builder.build().is_err());
	}

	#[test]
	fn accepts_cycle_guarded_by_union() {
		let mut builder = Schema::builder();
		let list = builder.reserve();
		let long = builder.push(SchemaNode::Long);
		let null = builder.push(SchemaNode::Null);
		let next = builder.push(SchemaNode::Union(Union {
			variants: vec![list, null],
		}));
		builder.fill(
			list,
			SchemaNode::Record(Record {
				name: named("LongList"),
				fields: vec![
					RecordField {
						name: "value".to_owned(),
						schema: long,
					},
					RecordField {
						name: "next".to_owned(),
						schema: next,
					},
				],
			}),
		);
		assert!(builder.build().is_ok());
	}
}
