use super::*;
use crate::{
	codec,
	resolution::{downcast_ref, ErasedValue, PrimitiveKind},
};

use std::{any::Any, sync::Arc};

/// Bridges every integer primitive to the `int` and `long` schemas
///
/// Both schemas use the zig-zag long wire form; `int` additionally enforces
/// the 32-bit range when encoding, as any value outside it could not have
/// been produced by a conforming writer. Narrowing on decode is checked and
/// surfaces a conversion error, never a wrap.
pub(super) struct IntegerCase;

impl BuilderCase for IntegerCase {
	fn name(&self) -> &'static str {
		"integer"
	}

	fn encoder(
		&self,
		_ctx: &BuildContext<'_>,
		_key: SchemaKey,
		node: &SchemaNode,
		_resolver: &Resolver,
		resolution: &TypeResolution,
	) -> CaseOutcome<EncodeFn> {
		let int32 = match node {
			SchemaNode::Int => true,
			SchemaNode::Long => false,
			_ => return CaseOutcome::NoMatch,
		};
		let primitive = match resolution {
			TypeResolution::Primitive(primitive) => primitive,
			_ => return CaseOutcome::Failed(cannot_bridge(node, resolution)),
		};
		match primitive.kind {
			PrimitiveKind::I8 => encode_integer::<i8>(int32),
			PrimitiveKind::I16 => encode_integer::<i16>(int32),
			PrimitiveKind::I32 => encode_integer::<i32>(int32),
			PrimitiveKind::I64 => encode_integer::<i64>(int32),
			PrimitiveKind::U8 => encode_integer::<u8>(int32),
			PrimitiveKind::U16 => encode_integer::<u16>(int32),
			PrimitiveKind::U32 => encode_integer::<u32>(int32),
			PrimitiveKind::U64 => encode_integer::<u64>(int32),
			_ => CaseOutcome::Failed(cannot_bridge(node, resolution)),
		}
	}

	fn decoder(
		&self,
		_ctx: &BuildContext<'_>,
		_key: SchemaKey,
		node: &SchemaNode,
		_resolver: &Resolver,
		resolution: &TypeResolution,
	) -> CaseOutcome<DecodeFn> {
		if !matches!(node, SchemaNode::Int | SchemaNode::Long) {
			return CaseOutcome::NoMatch;
		}
		let primitive = match resolution {
			TypeResolution::Primitive(primitive) => primitive,
			_ => return CaseOutcome::Failed(cannot_bridge(node, resolution)),
		};
		match primitive.kind {
			PrimitiveKind::I8 => decode_integer::<i8>(),
			PrimitiveKind::I16 => decode_integer::<i16>(),
			PrimitiveKind::I32 => decode_integer::<i32>(),
			PrimitiveKind::I64 => decode_integer::<i64>(),
			PrimitiveKind::U8 => decode_integer::<u8>(),
			PrimitiveKind::U16 => decode_integer::<u16>(),
			PrimitiveKind::U32 => decode_integer::<u32>(),
			PrimitiveKind::U64 => decode_integer::<u64>(),
			_ => CaseOutcome::Failed(cannot_bridge(node, resolution)),
		}
	}
}

fn encode_integer<T>(int32: bool) -> CaseOutcome<EncodeFn>
where
	T: Any + Copy + TryInto<i64>,
{
	CaseOutcome::Built(Arc::new(move |value, sink| {
		let value: i64 = (*downcast_ref::<T>(value)).try_into().map_err(|_| {
			Error::new(
				ErrorKind::Conversion,
				"integer does not fit the signed 64-bit wire form",
			)
		})?;
		if int32 && i32::try_from(value).is_err() {
			return Err(Error::custom(
				ErrorKind::Conversion,
				format_args!("value {value} does not fit the int schema"),
			));
		}
		codec::write_long(sink, value)
	}))
}

fn decode_integer<T>() -> CaseOutcome<DecodeFn>
where
	T: Any + TryFrom<i64>,
{
	CaseOutcome::Built(Arc::new(|source| {
		let wire = codec::read_long(source)?;
		let value = T::try_from(wire).map_err(|_| {
			Error::custom(
				ErrorKind::Conversion,
				format_args!("decoded integer {wire} is out of range for the target type"),
			)
		})?;
		Ok(Box::new(value) as ErasedValue)
	}))
}
