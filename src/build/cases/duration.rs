use super::*;
use crate::resolution::{DurationParts, MILLIS_PER_DAY};

use std::sync::Arc;

/// Bridges the `duration` logical type (a 12-byte fixed holding months,
/// days and milliseconds as little-endian unsigned 32-bit counters) to
/// elapsed-time targets
///
/// The bound target types measure elapsed time only, so the months counter
/// is always written as zero and a decoded value with a non-zero months
/// counter is a conversion error; wire values that carried calendar months
/// therefore do not round-trip through these targets.
pub(super) struct DurationCase;

const WIRE_LEN: usize = 12;

impl BuilderCase for DurationCase {
	fn name(&self) -> &'static str {
		"duration"
	}

	fn encoder(
		&self,
		_ctx: &BuildContext<'_>,
		_key: SchemaKey,
		node: &SchemaNode,
		_resolver: &Resolver,
		resolution: &TypeResolution,
	) -> CaseOutcome<EncodeFn> {
		if !matches!(node, SchemaNode::Duration) {
			return CaseOutcome::NoMatch;
		}
		let res = match resolution {
			TypeResolution::Duration(res) => res,
			_ => return CaseOutcome::Failed(cannot_bridge(node, resolution)),
		};
		let as_millis = Arc::clone(&res.as_millis);
		CaseOutcome::Built(Arc::new(move |value, sink| {
			let total = as_millis(value)?;
			let days = u32::try_from(total / MILLIS_PER_DAY).map_err(|_| {
				Error::custom(
					ErrorKind::Overflow,
					format_args!("duration of {total} milliseconds overflows the wire's day counter"),
				)
			})?;
			let milliseconds = (total % MILLIS_PER_DAY) as u32;
			let mut wire = [0u8; WIRE_LEN];
			wire[4..8].copy_from_slice(&days.to_le_bytes());
			wire[8..12].copy_from_slice(&milliseconds.to_le_bytes());
			sink.write_all(&wire)
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
		if !matches!(node, SchemaNode::Duration) {
			return CaseOutcome::NoMatch;
		}
		let res = match resolution {
			TypeResolution::Duration(res) => res,
			_ => return CaseOutcome::Failed(cannot_bridge(node, resolution)),
		};
		let from_parts = Arc::clone(&res.from_parts);
		CaseOutcome::Built(Arc::new(move |source| {
			let mut wire = [0u8; WIRE_LEN];
			source.read_exact(&mut wire)?;
			from_parts(DurationParts {
				months: u32::from_le_bytes(wire[0..4].try_into().expect("slice is 4 bytes")),
				days: u32::from_le_bytes(wire[4..8].try_into().expect("slice is 4 bytes")),
				milliseconds: u32::from_le_bytes(wire[8..12].try_into().expect("slice is 4 bytes")),
			})
		}))
	}
}
