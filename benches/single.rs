#![allow(missing_docs)]

use criterion::{criterion_group, criterion_main, Criterion};

use avro_bind::{
	build_decoder, build_encoder,
	schema::{Name, Record, RecordField, SchemaNode, Union},
	Bind, RecordBinding, Schema, TypeResolution,
};

#[derive(Clone, Debug, PartialEq)]
struct UserInfo {
	username: String,
	age: i32,
	phone: Option<String>,
	scores: Vec<i64>,
}

impl Bind for UserInfo {
	fn resolution() -> TypeResolution {
		RecordBinding::<UserInfo>::new()
			.field("username", |user| &user.username)
			.field("age", |user| &user.age)
			.field("phone", |user| &user.phone)
			.field("scores", |user| &user.scores)
			.construct(|fields| {
				Ok(UserInfo {
					username: fields.take("username")?,
					age: fields.take("age")?,
					phone: fields.take("phone")?,
					scores: fields.take("scores")?,
				})
			})
	}
}

fn user_info_schema() -> Schema {
	let mut builder = Schema::builder();
	let root = builder.reserve();
	let string = builder.push(SchemaNode::String);
	let int = builder.push(SchemaNode::Int);
	let null = builder.push(SchemaNode::Null);
	let phone = builder.push(SchemaNode::Union(Union {
		variants: vec![null, string],
	}));
	let long = builder.push(SchemaNode::Long);
	let scores = builder.push(SchemaNode::Array(long));
	builder.fill(
		root,
		SchemaNode::Record(Record {
			name: Name::new("bench.UserInfo"),
			fields: vec![
				RecordField {
					name: "username".to_owned(),
					schema: string,
				},
				RecordField {
					name: "age".to_owned(),
					schema: int,
				},
				RecordField {
					name: "phone".to_owned(),
					schema: phone,
				},
				RecordField {
					name: "scores".to_owned(),
					schema: scores,
				},
			],
		}),
	);
	builder.build().expect("bench schema is valid")
}

fn bench_single(c: &mut Criterion) {
	let schema = user_info_schema();
	let encoder = build_encoder::<UserInfo>(&schema).unwrap();
	let decoder = build_decoder::<UserInfo>(&schema).unwrap();
	let value = UserInfo {
		username: "venkat".to_owned(),
		age: 34,
		phone: Some("0123456789".to_owned()),
		scores: vec![150, -3, 1 << 40],
	};
	let encoded = encoder.encode_to_vec(&value).unwrap();

	let mut buf = Vec::with_capacity(encoded.len());
	c.bench_function("encode/user_info", |b| {
		b.iter(|| {
			buf.clear();
			encoder.encode(&value, &mut buf).unwrap();
		})
	});

	c.bench_function("decode/user_info", |b| {
		b.iter(|| decoder.decode_slice(&encoded).unwrap())
	});

	c.bench_function("build/user_info", |b| {
		b.iter(|| build_encoder::<UserInfo>(&schema).unwrap())
	});
}

criterion_group!(benches, bench_single);
criterion_main!(benches);
