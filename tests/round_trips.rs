//! Round-trip and wire-byte checks for the primitive and collection codecs

use pretty_assertions::assert_eq;

use avro_bind::{
	build_decoder, build_encoder,
	rw::SliceSource,
	schema::{Fixed, Name, SchemaNode, Union},
	Bytes, ErrorKind, Schema,
};

use std::collections::{BTreeMap, HashMap};

fn leaf(node: SchemaNode) -> Schema {
	Schema::from_node(node).expect("leaf schema is valid")
}

fn array_of(item: SchemaNode) -> Schema {
	let mut builder = Schema::builder();
	let root = builder.reserve();
	let item = builder.push(item);
	builder.fill(root, SchemaNode::Array(item));
	builder.build().expect("array schema is valid")
}

fn map_of(value: SchemaNode) -> Schema {
	let mut builder = Schema::builder();
	let root = builder.reserve();
	let value = builder.push(value);
	builder.fill(root, SchemaNode::Map(value));
	builder.build().expect("map schema is valid")
}

fn round_trip<T>(schema: &Schema, value: T) -> Vec<u8>
where
	T: avro_bind::Bind + PartialEq + std::fmt::Debug + Clone,
{
	let encoded = build_encoder::<T>(schema)
		.expect("failed to build encoder")
		.encode_to_vec(&value)
		.expect("failed to encode");
	let decoded: T = build_decoder::<T>(schema)
		.expect("failed to build decoder")
		.decode_slice(&encoded)
		.expect("failed to decode");
	assert_eq!(decoded, value);
	encoded
}

#[test]
fn long_wire_bytes() {
	let schema = leaf(SchemaNode::Long);
	assert_eq!(round_trip(&schema, 150i64), [0xAC, 0x02]);
	assert_eq!(round_trip(&schema, 0i64), [0x00]);
	assert_eq!(round_trip(&schema, -1i64), [0x01]);
	for extreme in [i64::MIN, i64::MAX] {
		assert_eq!(round_trip(&schema, extreme).len(), 10);
	}
}

#[test]
fn int_schema_uses_the_long_wire_form() {
	let schema = leaf(SchemaNode::Int);
	assert_eq!(round_trip(&schema, 150i32), [0xAC, 0x02]);
	assert_eq!(round_trip(&schema, -1i8), [0x01]);
	assert_eq!(round_trip(&schema, 3u16), [0x06]);
}

#[test]
fn int_schema_rejects_out_of_range_values_on_encode() {
	let schema = leaf(SchemaNode::Int);
	let encoder = build_encoder::<i64>(&schema).unwrap();
	let error = encoder.encode_to_vec(&(i64::from(i32::MAX) + 1)).unwrap_err();
	assert_eq!(error.kind(), ErrorKind::Conversion);
}

#[test]
fn narrowing_decode_is_checked() {
	let schema = leaf(SchemaNode::Long);
	let encoded = build_encoder::<i64>(&schema)
		.unwrap()
		.encode_to_vec(&40_000)
		.unwrap();
	let error = build_decoder::<i16>(&schema)
		.unwrap()
		.decode_slice(&encoded)
		.unwrap_err();
	assert_eq!(error.kind(), ErrorKind::Conversion);
	let decoded: u32 = build_decoder::<u32>(&schema)
		.unwrap()
		.decode_slice(&encoded)
		.unwrap();
	assert_eq!(decoded, 40_000);
}

#[test]
fn unsigned_values_above_i64_max_are_rejected() {
	let schema = leaf(SchemaNode::Long);
	let encoder = build_encoder::<u64>(&schema).unwrap();
	let error = encoder.encode_to_vec(&(u64::MAX)).unwrap_err();
	assert_eq!(error.kind(), ErrorKind::Conversion);
}

#[test]
fn boolean_and_floats() {
	assert_eq!(round_trip(&leaf(SchemaNode::Boolean), true), [0x01]);
	assert_eq!(round_trip(&leaf(SchemaNode::Boolean), false), [0x00]);
	assert_eq!(
		round_trip(&leaf(SchemaNode::Float), 1234.0f32),
		1234.0f32.to_le_bytes()
	);
	assert_eq!(
		round_trip(&leaf(SchemaNode::Double), 1234.5f64),
		1234.5f64.to_le_bytes()
	);
}

#[test]
fn double_schema_accepts_f32_on_encode_only() {
	let schema = leaf(SchemaNode::Double);
	let encoded = build_encoder::<f32>(&schema)
		.unwrap()
		.encode_to_vec(&1.5f32)
		.unwrap();
	assert_eq!(encoded, 1.5f64.to_le_bytes());
	let error = build_decoder::<f32>(&schema).unwrap_err();
	assert_eq!(error.kind(), ErrorKind::UnsupportedType);
}

#[test]
fn string_wire_bytes() {
	let schema = leaf(SchemaNode::String);
	assert_eq!(
		round_trip(&schema, "foo".to_owned()),
		[0x06, 0x66, 0x6F, 0x6F]
	);
	assert_eq!(round_trip(&schema, String::new()), [0x00]);
}

#[test]
fn bytes_and_fixed() {
	let schema = leaf(SchemaNode::Bytes);
	assert_eq!(
		round_trip(&schema, Bytes(vec![1, 2, 3])),
		[0x06, 0x01, 0x02, 0x03]
	);

	let fixed = leaf(SchemaNode::Fixed(Fixed {
		name: Name::new("Opaque"),
		size: 3,
	}));
	assert_eq!(round_trip(&fixed, Bytes(vec![7, 8, 9])), [7, 8, 9]);

	let encoder = build_encoder::<Bytes>(&fixed).unwrap();
	let error = encoder.encode_to_vec(&Bytes(vec![1])).unwrap_err();
	assert_eq!(error.kind(), ErrorKind::SizeMismatch);
}

#[test]
fn array_wire_bytes() {
	let schema = array_of(SchemaNode::Int);
	assert_eq!(
		round_trip(&schema, vec![3i32, 27]),
		[0x04, 0x06, 0x36, 0x00]
	);
	assert_eq!(round_trip(&schema, Vec::<i32>::new()), [0x00]);
}

#[test]
fn array_decoder_accepts_any_conforming_block_layout() {
	let schema = array_of(SchemaNode::Int);
	let decoder = build_decoder::<Vec<i32>>(&schema).unwrap();
	// single positive block
	assert_eq!(decoder.decode_slice(&[0x04, 0x06, 0x36, 0x00]).unwrap(), [3, 27]);
	// two blocks of one item
	assert_eq!(
		decoder.decode_slice(&[0x02, 0x06, 0x02, 0x36, 0x00]).unwrap(),
		[3, 27]
	);
	// negative count with a byte-length hint
	assert_eq!(
		decoder
			.decode_slice(&[0x03, 0x02, 0x06, 0x36, 0x00])
			.unwrap(),
		[3, 27]
	);
}

#[test]
fn nested_arrays() {
	let mut builder = Schema::builder();
	let root = builder.reserve();
	let inner = builder.reserve();
	let long = builder.push(SchemaNode::Long);
	builder.fill(inner, SchemaNode::Array(long));
	builder.fill(root, SchemaNode::Array(inner));
	let schema = builder.build().unwrap();
	round_trip(&schema, vec![vec![1i64, 2], vec![], vec![3]]);
}

#[test]
fn other_sequence_containers_bind_as_arrays() {
	let schema = array_of(SchemaNode::Long);
	round_trip(
		&schema,
		std::collections::VecDeque::from([1i64, 2, 3]),
	);
	let encoded = round_trip(
		&schema,
		std::collections::BTreeSet::from([27i64, 3]),
	);
	// sets iterate sorted, so the wire order is ascending
	assert_eq!(encoded, [0x04, 0x06, 0x36, 0x00]);
}

#[test]
fn map_round_trips() {
	let schema = map_of(SchemaNode::Long);
	let mut value = HashMap::new();
	value.insert("a".to_owned(), 1i64);
	value.insert("b".to_owned(), 3i64);
	round_trip(&schema, value);
}

#[test]
fn btree_map_wire_bytes_are_deterministic() {
	let schema = map_of(SchemaNode::Long);
	let mut value = BTreeMap::new();
	value.insert("a".to_owned(), 1i64);
	value.insert("b".to_owned(), 2i64);
	let encoded = round_trip(&schema, value);
	assert_eq!(
		encoded,
		[0x04, 0x02, 0x61, 0x02, 0x02, 0x62, 0x04, 0x00]
	);
}

#[test]
fn integer_map_keys_use_their_decimal_string_form() {
	let schema = map_of(SchemaNode::Long);
	let mut value = BTreeMap::new();
	value.insert(7i32, 1i64);
	let encoded = round_trip(&schema, value);
	assert_eq!(encoded, [0x02, 0x02, 0x37, 0x02, 0x00]);
}

#[test]
fn encoding_is_deterministic() {
	let schema = array_of(SchemaNode::Long);
	let encoder = build_encoder::<Vec<i64>>(&schema).unwrap();
	let value = vec![5i64, -3, 150];
	assert_eq!(
		encoder.encode_to_vec(&value).unwrap(),
		encoder.encode_to_vec(&value).unwrap()
	);
}

#[test]
fn decode_leaves_the_source_at_the_first_unused_byte() {
	let schema = leaf(SchemaNode::Long);
	let decoder = build_decoder::<i64>(&schema).unwrap();
	let bytes = [0xAC, 0x02, 0xDE, 0xAD];
	let mut source = SliceSource::new(&bytes);
	assert_eq!(decoder.decode(&mut source).unwrap(), 150);
	assert_eq!(source.remaining(), &[0xDE, 0xAD]);
}

#[test]
fn truncated_input_is_an_eof_error() {
	let schema = leaf(SchemaNode::String);
	let decoder = build_decoder::<String>(&schema).unwrap();
	// length prefix of 3 but only one byte follows
	let error = decoder.decode_slice(&[0x06, 0x66]).unwrap_err();
	assert_eq!(error.kind(), ErrorKind::Eof);
}

#[test]
fn mismatched_pairs_fail_at_build_time() {
	let schema = leaf(SchemaNode::Boolean);
	let error = build_encoder::<String>(&schema).unwrap_err();
	assert_eq!(error.kind(), ErrorKind::UnsupportedType);
	assert!(!error.causes().is_empty());
}

#[test]
fn reader_source_decodes_like_a_slice() {
	let schema = array_of(SchemaNode::Long);
	let encoded = build_encoder::<Vec<i64>>(&schema)
		.unwrap()
		.encode_to_vec(&vec![1i64, 2, 3])
		.unwrap();
	let decoded: Vec<i64> =
		avro_bind::from_datum_reader(std::io::Cursor::new(encoded), &schema).unwrap();
	assert_eq!(decoded, [1, 2, 3]);
}

#[test]
fn union_schema_reached_through_a_plain_type() {
	// a non-optional target against [null, string] picks the string branch
	let mut builder = Schema::builder();
	let root = builder.reserve();
	let null = builder.push(SchemaNode::Null);
	let string = builder.push(SchemaNode::String);
	builder.fill(
		root,
		SchemaNode::Union(Union {
			variants: vec![null, string],
		}),
	);
	let schema = builder.build().unwrap();
	let encoded = build_encoder::<String>(&schema)
		.unwrap()
		.encode_to_vec(&"x".to_owned())
		.unwrap();
	assert_eq!(encoded, [0x02, 0x02, 0x78]);
	// decoding the null branch into a non-nullable target is a conversion error
	let decoder = build_decoder::<String>(&schema).unwrap();
	assert_eq!(
		decoder.decode_slice(&[0x00]).unwrap_err().kind(),
		ErrorKind::Conversion
	);
	assert_eq!(decoder.decode_slice(&encoded).unwrap(), "x");
}
