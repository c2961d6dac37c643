use super::*;
use crate::{
	codec,
	resolution::{downcast_ref, ErasedValue, PrimitiveKind},
	schema::DecimalRepr,
};

use std::{any::Any, sync::Arc};

use num_traits::{FromPrimitive as _, ToPrimitive as _};

/// Bridges the `decimal` logical type to exact decimals, floats and
/// integers
///
/// The wire form is the value scaled by `10^scale`, written as a
/// two's-complement big-endian integer of minimum length: length-prefixed
/// under a `bytes` representation, sign-extended to the exact size under a
/// `fixed` representation. Values are never rounded - anything that cannot
/// be rescaled losslessly is a conversion error.
pub(super) struct DecimalCase;

/// The unscaled intermediate form is an `i128`, so decimals needing more
/// than this many bytes are not representable here
const MAX_UNSCALED_LEN: usize = 16;

#[derive(Clone, Copy)]
enum Repr {
	Bytes,
	Fixed(usize),
}

fn repr_of(repr: &DecimalRepr) -> Result<Repr, Error> {
	match repr {
		DecimalRepr::Bytes => Ok(Repr::Bytes),
		DecimalRepr::Fixed(fixed) => {
			if fixed.size > MAX_UNSCALED_LEN {
				Err(Error::custom(
					ErrorKind::SizeMismatch,
					format_args!(
						"decimals wider than {MAX_UNSCALED_LEN} bytes are not supported \
							(fixed size is {})",
						fixed.size
					),
				))
			} else {
				Ok(Repr::Fixed(fixed.size))
			}
		}
	}
}

impl BuilderCase for DecimalCase {
	fn name(&self) -> &'static str {
		"decimal"
	}

	fn encoder(
		&self,
		_ctx: &BuildContext<'_>,
		_key: SchemaKey,
		node: &SchemaNode,
		_resolver: &Resolver,
		resolution: &TypeResolution,
	) -> CaseOutcome<EncodeFn> {
		let decimal = match node {
			SchemaNode::Decimal(decimal) => decimal,
			_ => return CaseOutcome::NoMatch,
		};
		let repr = match repr_of(&decimal.repr) {
			Ok(repr) => repr,
			Err(error) => return CaseOutcome::Failed(error),
		};
		let scale = decimal.scale;
		match resolution {
			TypeResolution::Decimal(res) => {
				let as_decimal = Arc::clone(&res.as_decimal);
				CaseOutcome::Built(Arc::new(move |value, sink| {
					let unscaled = unscaled_from_decimal(as_decimal(value)?, scale)?;
					write_unscaled(sink, unscaled, repr)
				}))
			}
			TypeResolution::Primitive(primitive) => match primitive.kind {
				PrimitiveKind::F64 => CaseOutcome::Built(Arc::new(move |value, sink| {
					let float = *downcast_ref::<f64>(value);
					let decimal = rust_decimal::Decimal::from_f64(float).ok_or_else(|| {
						Error::custom(
							ErrorKind::Conversion,
							format_args!("f64 value {float} has no exact decimal form"),
						)
					})?;
					write_unscaled(sink, unscaled_from_decimal(decimal, scale)?, repr)
				})),
				PrimitiveKind::I8 => encode_integer::<i8>(scale, repr),
				PrimitiveKind::I16 => encode_integer::<i16>(scale, repr),
				PrimitiveKind::I32 => encode_integer::<i32>(scale, repr),
				PrimitiveKind::I64 => encode_integer::<i64>(scale, repr),
				PrimitiveKind::U8 => encode_integer::<u8>(scale, repr),
				PrimitiveKind::U16 => encode_integer::<u16>(scale, repr),
				PrimitiveKind::U32 => encode_integer::<u32>(scale, repr),
				PrimitiveKind::U64 => encode_integer::<u64>(scale, repr),
				_ => CaseOutcome::Failed(cannot_bridge(node, resolution)),
			},
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
		let decimal = match node {
			SchemaNode::Decimal(decimal) => decimal,
			_ => return CaseOutcome::NoMatch,
		};
		let repr = match repr_of(&decimal.repr) {
			Ok(repr) => repr,
			Err(error) => return CaseOutcome::Failed(error),
		};
		let scale = decimal.scale;
		match resolution {
			TypeResolution::Decimal(res) => {
				let from_decimal = Arc::clone(&res.from_decimal);
				CaseOutcome::Built(Arc::new(move |source| {
					from_decimal(decimal_from_unscaled(read_unscaled(source, repr)?, scale)?)
				}))
			}
			TypeResolution::Primitive(primitive) => match primitive.kind {
				PrimitiveKind::F64 => CaseOutcome::Built(Arc::new(move |source| {
					let decimal = decimal_from_unscaled(read_unscaled(source, repr)?, scale)?;
					let float = decimal.to_f64().ok_or_else(|| {
						Error::custom(
							ErrorKind::Conversion,
							format_args!("decimal {decimal} has no f64 form"),
						)
					})?;
					Ok(Box::new(float) as ErasedValue)
				})),
				PrimitiveKind::I8 => decode_integer::<i8>(scale, repr),
				PrimitiveKind::I16 => decode_integer::<i16>(scale, repr),
				PrimitiveKind::I32 => decode_integer::<i32>(scale, repr),
				PrimitiveKind::I64 => decode_integer::<i64>(scale, repr),
				PrimitiveKind::U8 => decode_integer::<u8>(scale, repr),
				PrimitiveKind::U16 => decode_integer::<u16>(scale, repr),
				PrimitiveKind::U32 => decode_integer::<u32>(scale, repr),
				PrimitiveKind::U64 => decode_integer::<u64>(scale, repr),
				_ => CaseOutcome::Failed(cannot_bridge(node, resolution)),
			},
			_ => CaseOutcome::Failed(cannot_bridge(node, resolution)),
		}
	}
}

fn pow10(scale: u32) -> Result<i128, Error> {
	10i128.checked_pow(scale).ok_or_else(|| {
		Error::new(
			ErrorKind::Conversion,
			"10^scale overflows the unscaled intermediate form",
		)
	})
}

/// Rescale losslessly and extract the unscaled mantissa
fn unscaled_from_decimal(value: rust_decimal::Decimal, scale: u32) -> Result<i128, Error> {
	let mut rescaled = value;
	rescaled.rescale(scale);
	// rescale rounds when reducing the scale and caps the scale when the
	// mantissa would overflow; both are loss
	if rescaled != value || rescaled.scale() != scale {
		return Err(Error::custom(
			ErrorKind::Conversion,
			format_args!("decimal {value} cannot be represented at scale {scale} without loss"),
		));
	}
	Ok(rescaled.mantissa())
}

fn decimal_from_unscaled(unscaled: i128, scale: u32) -> Result<rust_decimal::Decimal, Error> {
	rust_decimal::Decimal::try_from_i128_with_scale(unscaled, scale).map_err(|e| {
		Error::custom(
			ErrorKind::Conversion,
			format_args!("wire value {unscaled} at scale {scale} has no decimal form: {e}"),
		)
	})
}

/// Strip redundant leading bytes, keeping the sign bit intact
fn minimal_twos_complement(bytes: &[u8; MAX_UNSCALED_LEN]) -> &[u8] {
	let mut start = 0;
	while start < MAX_UNSCALED_LEN - 1 {
		let (lead, next) = (bytes[start], bytes[start + 1]);
		let redundant =
			(lead == 0x00 && next & 0x80 == 0) || (lead == 0xff && next & 0x80 != 0);
		if !redundant {
			break;
		}
		start += 1;
	}
	&bytes[start..]
}

fn write_unscaled(sink: &mut dyn crate::rw::Sink, unscaled: i128, repr: Repr) -> Result<(), Error> {
	let bytes = unscaled.to_be_bytes();
	let minimal = minimal_twos_complement(&bytes);
	match repr {
		Repr::Bytes => {
			codec::write_len(sink, minimal.len())?;
			sink.write_all(minimal)
		}
		Repr::Fixed(size) => {
			let pad_len = size.checked_sub(minimal.len()).ok_or_else(|| {
				Error::custom(
					ErrorKind::SizeMismatch,
					format_args!(
						"unscaled decimal {unscaled} needs {} bytes, more than the fixed \
							schema's {size}",
						minimal.len()
					),
				)
			})?;
			let pad = if unscaled < 0 { 0xff } else { 0x00 };
			for _ in 0..pad_len {
				sink.write_byte(pad)?;
			}
			sink.write_all(minimal)
		}
	}
}

fn read_unscaled(source: &mut dyn crate::rw::Source, repr: Repr) -> Result<i128, Error> {
	let bytes = match repr {
		Repr::Bytes => codec::read_bytes(source)?,
		Repr::Fixed(size) => {
			let mut bytes = vec![0u8; size];
			source.read_exact(&mut bytes)?;
			bytes
		}
	};
	if bytes.len() > MAX_UNSCALED_LEN {
		return Err(Error::custom(
			ErrorKind::SizeMismatch,
			format_args!(
				"wire carries an unscaled decimal of {} bytes, more than the supported \
					{MAX_UNSCALED_LEN}",
				bytes.len()
			),
		));
	}
	let negative = bytes.first().is_some_and(|&lead| lead & 0x80 != 0);
	let mut wide = if negative {
		[0xffu8; MAX_UNSCALED_LEN]
	} else {
		[0x00u8; MAX_UNSCALED_LEN]
	};
	wide[MAX_UNSCALED_LEN - bytes.len()..].copy_from_slice(&bytes);
	Ok(i128::from_be_bytes(wide))
}

fn encode_integer<T>(scale: u32, repr: Repr) -> CaseOutcome<EncodeFn>
where
	T: Any + Copy + TryInto<i128>,
{
	let factor = match pow10(scale) {
		Ok(factor) => factor,
		Err(error) => return CaseOutcome::Failed(error),
	};
	CaseOutcome::Built(Arc::new(move |value, sink| {
		let value: i128 = (*downcast_ref::<T>(value)).try_into().map_err(|_| {
			Error::new(
				ErrorKind::Conversion,
				"integer does not fit the unscaled decimal intermediate form",
			)
		})?;
		let unscaled = value.checked_mul(factor).ok_or_else(|| {
			Error::custom(
				ErrorKind::Conversion,
				format_args!("{value} times 10^{scale} overflows the unscaled form"),
			)
		})?;
		write_unscaled(sink, unscaled, repr)
	}))
}

fn decode_integer<T>(scale: u32, repr: Repr) -> CaseOutcome<DecodeFn>
where
	T: Any + TryFrom<i128>,
{
	let factor = match pow10(scale) {
		Ok(factor) => factor,
		Err(error) => return CaseOutcome::Failed(error),
	};
	CaseOutcome::Built(Arc::new(move |source| {
		let unscaled = read_unscaled(source, repr)?;
		if unscaled % factor != 0 {
			return Err(Error::custom(
				ErrorKind::Conversion,
				format_args!(
					"decimal wire value {unscaled} at scale {scale} has a fractional part; \
						an integer target cannot represent it without loss"
				),
			));
		}
		let value = T::try_from(unscaled / factor).map_err(|_| {
			Error::custom(
				ErrorKind::Conversion,
				format_args!("decoded decimal is out of range for the integer target"),
			)
		})?;
		Ok(Box::new(value) as ErasedValue)
	}))
}
