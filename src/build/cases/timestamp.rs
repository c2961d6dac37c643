use super::*;
use crate::codec;

use std::sync::Arc;

/// Bridges the timestamp logical types (over `long`) to instant targets
///
/// Instants travel through the builder as 100-nanosecond ticks relative to
/// the epoch; the wire unit is obtained by dividing by the logical factor
/// (10 000 for `timestamp-millis`, 10 for `timestamp-micros`), flooring so
/// that pre-epoch instants keep a consistent ordering. Instants whose wire
/// unit does not fit a signed 64-bit integer are a conversion error.
pub(super) struct TimestampCase;

const TICKS_PER_MILLI: i128 = 10_000;
const TICKS_PER_MICRO: i128 = 10;

fn factor_of(node: &SchemaNode) -> Option<i128> {
	match node {
		SchemaNode::TimestampMillis => Some(TICKS_PER_MILLI),
		SchemaNode::TimestampMicros => Some(TICKS_PER_MICRO),
		_ => None,
	}
}

impl BuilderCase for TimestampCase {
	fn name(&self) -> &'static str {
		"timestamp"
	}

	fn encoder(
		&self,
		_ctx: &BuildContext<'_>,
		_key: SchemaKey,
		node: &SchemaNode,
		_resolver: &Resolver,
		resolution: &TypeResolution,
	) -> CaseOutcome<EncodeFn> {
		let Some(factor) = factor_of(node) else {
			return CaseOutcome::NoMatch;
		};
		let res = match resolution {
			TypeResolution::Timestamp(res) => res,
			_ => return CaseOutcome::Failed(cannot_bridge(node, resolution)),
		};
		let as_ticks = Arc::clone(&res.as_ticks);
		CaseOutcome::Built(Arc::new(move |value, sink| {
			let ticks = as_ticks(value)?;
			let units: i64 = ticks.div_euclid(factor).try_into().map_err(|_| {
				Error::new(
					ErrorKind::Conversion,
					"instant is outside the range of the timestamp wire form",
				)
			})?;
			codec::write_long(sink, units)
		}))
	}

	fn decoder(
		&self,
		_ctx: &BuildContext<'_>,
		_key: SchemaKey,
		node: &SchemaNode,
		_resolver: &Resolver,
		resolution: &TypeResolution,
	) -> CaseOutcome<DecodeFn> {
		let Some(factor) = factor_of(node) else {
			return CaseOutcome::NoMatch;
		};
		let res = match resolution {
			TypeResolution::Timestamp(res) => res,
			_ => return CaseOutcome::Failed(cannot_bridge(node, resolution)),
		};
		let from_ticks = Arc::clone(&res.from_ticks);
		CaseOutcome::Built(Arc::new(move |source| {
			let units = codec::read_long(source)?;
			from_ticks(i128::from(units) * factor)
		}))
	}
}
