//! Logical types: decimal, duration and the two timestamp flavors

use pretty_assertions::assert_eq;

use avro_bind::{
	build_decoder, build_encoder,
	schema::{Decimal, DecimalRepr, Fixed, Name, SchemaNode},
	Bytes, ErrorKind, Schema,
};

use chrono::{DateTime, Utc};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

fn decimal_bytes_schema(precision: usize, scale: u32) -> Schema {
	Schema::from_node(SchemaNode::Decimal(Decimal {
		precision,
		scale,
		repr: DecimalRepr::Bytes,
	}))
	.expect("decimal schema is valid")
}

fn decimal_fixed_schema(precision: usize, scale: u32, size: usize) -> Schema {
	Schema::from_node(SchemaNode::Decimal(Decimal {
		precision,
		scale,
		repr: DecimalRepr::Fixed(Fixed {
			name: Name::new("DecimalFixed"),
			size,
		}),
	}))
	.expect("decimal schema is valid")
}

#[test]
fn decimal_over_bytes_wire_form() {
	let schema = decimal_bytes_schema(5, 2);
	let value: rust_decimal::Decimal = "123.45".parse().unwrap();
	let encoded = build_encoder::<rust_decimal::Decimal>(&schema)
		.unwrap()
		.encode_to_vec(&value)
		.unwrap();
	// 12345 in big-endian two's complement, length-prefixed
	assert_eq!(encoded, [0x04, 0x30, 0x39]);
	assert_eq!(
		build_decoder::<rust_decimal::Decimal>(&schema)
			.unwrap()
			.decode_slice(&encoded)
			.unwrap(),
		value
	);
}

#[test]
fn decimal_never_rounds() {
	let schema = decimal_bytes_schema(5, 2);
	let value: rust_decimal::Decimal = "123.456".parse().unwrap();
	let error = build_encoder::<rust_decimal::Decimal>(&schema)
		.unwrap()
		.encode_to_vec(&value)
		.unwrap_err();
	assert_eq!(error.kind(), ErrorKind::Conversion);
}

#[test]
fn negative_decimals_round_trip() {
	let schema = decimal_bytes_schema(10, 3);
	for text in ["-0.001", "-123.456", "0.000", "9999999.999"] {
		let value: rust_decimal::Decimal = text.parse().unwrap();
		let encoded = build_encoder::<rust_decimal::Decimal>(&schema)
			.unwrap()
			.encode_to_vec(&value)
			.unwrap();
		assert_eq!(
			build_decoder::<rust_decimal::Decimal>(&schema)
				.unwrap()
				.decode_slice(&encoded)
				.unwrap(),
			value
		);
	}
}

#[test]
fn decimal_over_fixed_is_sign_extended() {
	let schema = decimal_fixed_schema(5, 0, 4);
	let value: rust_decimal::Decimal = "-2".parse().unwrap();
	let encoded = build_encoder::<rust_decimal::Decimal>(&schema)
		.unwrap()
		.encode_to_vec(&value)
		.unwrap();
	assert_eq!(encoded, [0xFF, 0xFF, 0xFF, 0xFE]);
	assert_eq!(
		build_decoder::<rust_decimal::Decimal>(&schema)
			.unwrap()
			.decode_slice(&encoded)
			.unwrap(),
		value
	);
}

#[test]
fn decimal_over_fixed_rejects_values_wider_than_the_size() {
	let schema = decimal_fixed_schema(12, 0, 2);
	let value: rust_decimal::Decimal = "40000".parse().unwrap();
	let error = build_encoder::<rust_decimal::Decimal>(&schema)
		.unwrap()
		.encode_to_vec(&value)
		.unwrap_err();
	assert_eq!(error.kind(), ErrorKind::SizeMismatch);
}

#[test]
fn integers_scale_into_decimals() {
	let schema = decimal_bytes_schema(7, 2);
	let encoded = build_encoder::<i64>(&schema)
		.unwrap()
		.encode_to_vec(&5)
		.unwrap();
	// 5 * 10^2 = 500 = 0x01F4
	assert_eq!(encoded, [0x04, 0x01, 0xF4]);
	assert_eq!(
		build_decoder::<i64>(&schema)
			.unwrap()
			.decode_slice(&encoded)
			.unwrap(),
		5
	);
}

#[test]
fn fractional_decimal_into_integer_is_a_conversion_error() {
	let schema = decimal_bytes_schema(7, 2);
	let value: rust_decimal::Decimal = "1.25".parse().unwrap();
	let encoded = build_encoder::<rust_decimal::Decimal>(&schema)
		.unwrap()
		.encode_to_vec(&value)
		.unwrap();
	let error = build_decoder::<i64>(&schema)
		.unwrap()
		.decode_slice(&encoded)
		.unwrap_err();
	assert_eq!(error.kind(), ErrorKind::Conversion);
}

#[test]
fn f64_travels_through_decimal() {
	let schema = decimal_bytes_schema(7, 2);
	let encoded = build_encoder::<f64>(&schema)
		.unwrap()
		.encode_to_vec(&123.45)
		.unwrap();
	assert_eq!(encoded, [0x04, 0x30, 0x39]);
	assert_eq!(
		build_decoder::<f64>(&schema)
			.unwrap()
			.decode_slice(&encoded)
			.unwrap(),
		123.45
	);
}

#[test]
fn duration_wire_form() {
	let schema = Schema::from_node(SchemaNode::Duration).unwrap();
	let value = Duration::from_millis(86_400_000 + 1);
	let encoded = build_encoder::<Duration>(&schema)
		.unwrap()
		.encode_to_vec(&value)
		.unwrap();
	// months = 0, days = 1, milliseconds = 1, each little-endian u32
	assert_eq!(encoded, [0, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0]);
	assert_eq!(
		build_decoder::<Duration>(&schema)
			.unwrap()
			.decode_slice(&encoded)
			.unwrap(),
		value
	);
}

#[test]
fn duration_with_calendar_months_cannot_decode() {
	let schema = Schema::from_node(SchemaNode::Duration).unwrap();
	let decoder = build_decoder::<Duration>(&schema).unwrap();
	let mut wire = [0u8; 12];
	wire[0..4].copy_from_slice(&2u32.to_le_bytes());
	let error = decoder.decode_slice(&wire).unwrap_err();
	assert_eq!(error.kind(), ErrorKind::Conversion);
}

#[test]
fn duration_day_counter_overflow() {
	let schema = Schema::from_node(SchemaNode::Duration).unwrap();
	let encoder = build_encoder::<Duration>(&schema).unwrap();
	let error = encoder
		.encode_to_vec(&Duration::from_secs(u64::MAX))
		.unwrap_err();
	assert_eq!(error.kind(), ErrorKind::Overflow);
}

#[test]
fn chrono_duration_rejects_negative_values() {
	let schema = Schema::from_node(SchemaNode::Duration).unwrap();
	let encoder = build_encoder::<chrono::Duration>(&schema).unwrap();
	assert!(encoder
		.encode_to_vec(&chrono::Duration::milliseconds(1500))
		.is_ok());
	let error = encoder
		.encode_to_vec(&chrono::Duration::milliseconds(-1))
		.unwrap_err();
	assert_eq!(error.kind(), ErrorKind::Conversion);
}

#[test]
fn timestamp_millis_wire_form() {
	let schema = Schema::from_node(SchemaNode::TimestampMillis).unwrap();
	let value = DateTime::<Utc>::from_timestamp(0, 150_000_000).unwrap();
	let encoded = build_encoder::<DateTime<Utc>>(&schema)
		.unwrap()
		.encode_to_vec(&value)
		.unwrap();
	// 150 milliseconds since the epoch
	assert_eq!(encoded, [0xAC, 0x02]);
	assert_eq!(
		build_decoder::<DateTime<Utc>>(&schema)
			.unwrap()
			.decode_slice(&encoded)
			.unwrap(),
		value
	);
}

#[test]
fn timestamp_micros_round_trips_pre_epoch_instants() {
	let schema = Schema::from_node(SchemaNode::TimestampMicros).unwrap();
	let encoder = build_encoder::<DateTime<Utc>>(&schema).unwrap();
	let decoder = build_decoder::<DateTime<Utc>>(&schema).unwrap();
	for (seconds, nanos) in [(0, 0), (1, 500_000), (-1, 250_000), (-86_400, 0)] {
		let value = DateTime::<Utc>::from_timestamp(seconds, nanos).unwrap();
		let encoded = encoder.encode_to_vec(&value).unwrap();
		assert_eq!(decoder.decode_slice(&encoded).unwrap(), value);
	}
}

#[test]
fn naive_datetime_is_treated_as_utc() {
	let schema = Schema::from_node(SchemaNode::TimestampMicros).unwrap();
	let value = DateTime::<Utc>::from_timestamp(1_600_000_000, 123_456_000)
		.unwrap()
		.naive_utc();
	let encoded = build_encoder::<chrono::NaiveDateTime>(&schema)
		.unwrap()
		.encode_to_vec(&value)
		.unwrap();
	// the wire bytes agree with the zone-aware binding of the same instant
	assert_eq!(
		encoded,
		build_encoder::<DateTime<Utc>>(&schema)
			.unwrap()
			.encode_to_vec(&value.and_utc())
			.unwrap()
	);
	assert_eq!(
		build_decoder::<chrono::NaiveDateTime>(&schema)
			.unwrap()
			.decode_slice(&encoded)
			.unwrap(),
		value
	);
}

#[test]
fn system_time_round_trips_at_millisecond_precision() {
	let schema = Schema::from_node(SchemaNode::TimestampMillis).unwrap();
	let value = UNIX_EPOCH + Duration::from_millis(86_400_123);
	let encoded = build_encoder::<SystemTime>(&schema)
		.unwrap()
		.encode_to_vec(&value)
		.unwrap();
	assert_eq!(
		build_decoder::<SystemTime>(&schema)
			.unwrap()
			.decode_slice(&encoded)
			.unwrap(),
		value
	);
}

#[test]
fn instants_bind_to_string_schemas_as_iso_8601() {
	let schema = Schema::from_node(SchemaNode::String).unwrap();
	let value = DateTime::<Utc>::from_timestamp(1_600_000_000, 123_000_000).unwrap();
	let encoded = build_encoder::<DateTime<Utc>>(&schema)
		.unwrap()
		.encode_to_vec(&value)
		.unwrap();
	// the payload is a plain string; check it reads back as the instant
	assert_eq!(
		build_decoder::<DateTime<Utc>>(&schema)
			.unwrap()
			.decode_slice(&encoded)
			.unwrap(),
		value
	);
	let as_text: String = build_decoder::<String>(&schema)
		.unwrap()
		.decode_slice(&encoded)
		.unwrap();
	assert!(as_text.starts_with("2020-09-13T12:26:40.123"));
	assert!(as_text.ends_with('Z'));
}

#[test]
fn durations_bind_to_string_schemas_as_iso_periods() {
	let schema = Schema::from_node(SchemaNode::String).unwrap();
	let value = Duration::from_millis(3 * 86_400_000 + 4 * 3_600_000 + 5 * 60_000 + 6_007);
	let encoded = build_encoder::<Duration>(&schema)
		.unwrap()
		.encode_to_vec(&value)
		.unwrap();
	let as_text: String = build_decoder::<String>(&schema)
		.unwrap()
		.decode_slice(&encoded)
		.unwrap();
	assert_eq!(as_text, "P3DT4H5M6.007S");
	assert_eq!(
		build_decoder::<Duration>(&schema)
			.unwrap()
			.decode_slice(&encoded)
			.unwrap(),
		value
	);
}

#[test]
fn uuids_travel_as_bytes_fixed_and_string() {
	let value: uuid::Uuid = "67e55044-10b1-426f-9247-bb680e5fe0c8".parse().unwrap();

	let bytes_schema = Schema::from_node(SchemaNode::Bytes).unwrap();
	let encoded = build_encoder::<uuid::Uuid>(&bytes_schema)
		.unwrap()
		.encode_to_vec(&value)
		.unwrap();
	assert_eq!(encoded.len(), 17);
	assert_eq!(encoded[0], 0x20);
	assert_eq!(&encoded[1..], value.to_bytes_le());
	assert_eq!(
		build_decoder::<uuid::Uuid>(&bytes_schema)
			.unwrap()
			.decode_slice(&encoded)
			.unwrap(),
		value
	);

	let fixed_schema = Schema::from_node(SchemaNode::Fixed(Fixed {
		name: Name::new("Guid"),
		size: 16,
	}))
	.unwrap();
	let encoded = build_encoder::<uuid::Uuid>(&fixed_schema)
		.unwrap()
		.encode_to_vec(&value)
		.unwrap();
	assert_eq!(encoded, value.to_bytes_le());

	let string_schema = Schema::from_node(SchemaNode::String).unwrap();
	let encoded = build_encoder::<uuid::Uuid>(&string_schema)
		.unwrap()
		.encode_to_vec(&value)
		.unwrap();
	assert_eq!(
		build_decoder::<String>(&string_schema)
			.unwrap()
			.decode_slice(&encoded)
			.unwrap(),
		"67e55044-10b1-426f-9247-bb680e5fe0c8"
	);
	assert_eq!(
		build_decoder::<uuid::Uuid>(&string_schema)
			.unwrap()
			.decode_slice(&encoded)
			.unwrap(),
		value
	);
}

#[test]
fn uuid_needs_a_16_byte_fixed() {
	let schema = Schema::from_node(SchemaNode::Fixed(Fixed {
		name: Name::new("Small"),
		size: 8,
	}))
	.unwrap();
	let error = build_encoder::<uuid::Uuid>(&schema).unwrap_err();
	assert_eq!(error.kind(), ErrorKind::UnsupportedType);
	assert!(error
		.causes()
		.iter()
		.any(|cause| cause.kind() == ErrorKind::SizeMismatch));
}

#[test]
fn urls_bind_to_string_schemas() {
	let schema = Schema::from_node(SchemaNode::String).unwrap();
	let value = url::Url::parse("https://example.com/a?b=c").unwrap();
	let encoded = build_encoder::<url::Url>(&schema)
		.unwrap()
		.encode_to_vec(&value)
		.unwrap();
	assert_eq!(
		build_decoder::<url::Url>(&schema)
			.unwrap()
			.decode_slice(&encoded)
			.unwrap(),
		value
	);
}

#[test]
fn fixed_bytes_target_still_works_alongside_logical_fixed() {
	// a Bytes value through a fixed schema is untouched by the decimal rules
	let schema = Schema::from_node(SchemaNode::Fixed(Fixed {
		name: Name::new("Raw"),
		size: 2,
	}))
	.unwrap();
	let encoded = build_encoder::<Bytes>(&schema)
		.unwrap()
		.encode_to_vec(&Bytes(vec![0xAB, 0xCD]))
		.unwrap();
	assert_eq!(encoded, [0xAB, 0xCD]);
}
