//! Byte-level cross-checks against the apache-avro reference implementation

use pretty_assertions::assert_eq;

use apache_avro::types::Value;
use lazy_static::lazy_static;

use avro_bind::{
	build_decoder, build_encoder,
	schema::{Name, Record, RecordField, SchemaNode, Union},
	Bind, RecordBinding, Schema, TypeResolution,
};

lazy_static! {
	static ref LONG: apache_avro::Schema = apache_avro::Schema::parse_str(r#""long""#).unwrap();
	static ref STRING: apache_avro::Schema =
		apache_avro::Schema::parse_str(r#""string""#).unwrap();
	static ref INT_ARRAY: apache_avro::Schema =
		apache_avro::Schema::parse_str(r#"{"type": "array", "items": "int"}"#).unwrap();
	static ref NULLABLE_STRING: apache_avro::Schema =
		apache_avro::Schema::parse_str(r#"["null", "string"]"#).unwrap();
	static ref RECORD: apache_avro::Schema = apache_avro::Schema::parse_str(
		r#"{"type": "record", "name": "Test", "fields": [
			{"name": "f", "type": "long"},
			{"name": "g", "type": "string"}
		]}"#
	)
	.unwrap();
}

fn reference_bytes(schema: &apache_avro::Schema, value: Value) -> Vec<u8> {
	apache_avro::to_avro_datum(schema, value).expect("reference encoder failed")
}

#[test]
fn long_matches_reference() {
	let schema = Schema::from_node(SchemaNode::Long).unwrap();
	for value in [0i64, 1, -1, 150, -150, 1 << 40] {
		assert_eq!(
			build_encoder::<i64>(&schema)
				.unwrap()
				.encode_to_vec(&value)
				.unwrap(),
			reference_bytes(&LONG, Value::Long(value))
		);
	}
}

#[test]
fn string_matches_reference() -> anyhow::Result<()> {
	let schema = Schema::from_node(SchemaNode::String)?;
	let value = "adsfasdf09809dsf-=adsf".to_owned();
	let ours = build_encoder::<String>(&schema)?.encode_to_vec(&value)?;
	assert_eq!(ours, reference_bytes(&STRING, Value::String(value.clone())));
	// and the reference bytes decode back through our side
	assert_eq!(build_decoder::<String>(&schema)?.decode_slice(&ours)?, value);
	Ok(())
}

#[test]
fn int_array_matches_reference() {
	let mut builder = Schema::builder();
	let root = builder.reserve();
	let int = builder.push(SchemaNode::Int);
	builder.fill(root, SchemaNode::Array(int));
	let schema = builder.build().unwrap();

	let ours = build_encoder::<Vec<i32>>(&schema)
		.unwrap()
		.encode_to_vec(&vec![3, 27])
		.unwrap();
	let reference = reference_bytes(
		&INT_ARRAY,
		Value::Array(vec![Value::Int(3), Value::Int(27)]),
	);
	assert_eq!(ours, reference);
	assert_eq!(
		build_decoder::<Vec<i32>>(&schema)
			.unwrap()
			.decode_slice(&reference)
			.unwrap(),
		[3, 27]
	);
}

#[test]
fn nullable_string_matches_reference() {
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
	let encoder = build_encoder::<Option<String>>(&schema).unwrap();

	assert_eq!(
		encoder.encode_to_vec(&None).unwrap(),
		reference_bytes(&NULLABLE_STRING, Value::Union(0, Box::new(Value::Null)))
	);
	assert_eq!(
		encoder.encode_to_vec(&Some("x".to_owned())).unwrap(),
		reference_bytes(
			&NULLABLE_STRING,
			Value::Union(1, Box::new(Value::String("x".to_owned())))
		)
	);
}

#[derive(Clone, Debug, PartialEq)]
struct Test {
	f: i64,
	g: String,
}

impl Bind for Test {
	fn resolution() -> TypeResolution {
		RecordBinding::<Test>::new()
			.field("f", |test| &test.f)
			.field("g", |test| &test.g)
			.construct(|fields| {
				Ok(Test {
					f: fields.take("f")?,
					g: fields.take("g")?,
				})
			})
	}
}

#[test]
fn record_matches_reference() {
	let mut builder = Schema::builder();
	let root = builder.reserve();
	let long = builder.push(SchemaNode::Long);
	let string = builder.push(SchemaNode::String);
	builder.fill(
		root,
		SchemaNode::Record(Record {
			name: Name::new("Test"),
			fields: vec![
				RecordField {
					name: "f".to_owned(),
					schema: long,
				},
				RecordField {
					name: "g".to_owned(),
					schema: string,
				},
			],
		}),
	);
	let schema = builder.build().unwrap();

	let value = Test {
		f: 150,
		g: "Abc".to_owned(),
	};
	let ours = build_encoder::<Test>(&schema)
		.unwrap()
		.encode_to_vec(&value)
		.unwrap();
	let reference = reference_bytes(
		&RECORD,
		Value::Record(vec![
			("f".to_owned(), Value::Long(150)),
			("g".to_owned(), Value::String("Abc".to_owned())),
		]),
	);
	assert_eq!(ours, reference);
	assert_eq!(
		build_decoder::<Test>(&schema)
			.unwrap()
			.decode_slice(&reference)
			.unwrap(),
		value
	);
}
