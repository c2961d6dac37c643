use super::*;
use crate::{codec, codec::blocks};

use std::sync::Arc;

/// Bridges the `map` schema to string-keyed mapping targets
///
/// The wire layout is the array layout with (key string, value) items.
/// Keys are written in the container's iteration order; on decode the
/// container's own insertion semantics apply.
pub(super) struct MapCase;

impl BuilderCase for MapCase {
	fn name(&self) -> &'static str {
		"map"
	}

	fn encoder(
		&self,
		ctx: &BuildContext<'_>,
		_key: SchemaKey,
		node: &SchemaNode,
		_resolver: &Resolver,
		resolution: &TypeResolution,
	) -> CaseOutcome<EncodeFn> {
		let value_key = match node {
			SchemaNode::Map(value) => *value,
			_ => return CaseOutcome::NoMatch,
		};
		let res = match resolution {
			TypeResolution::Map(res) => res,
			_ => return CaseOutcome::Failed(cannot_bridge(node, resolution)),
		};
		let encode_value = match ctx.encoder(value_key, &res.value) {
			Ok(codec) => codec,
			Err(error) => return CaseOutcome::Failed(error),
		};
		let len = Arc::clone(&res.len);
		let visit = Arc::clone(&res.visit);
		CaseOutcome::Built(Arc::new(move |value, sink| {
			let len = len(value);
			blocks::write_block_header(sink, len)?;
			if len > 0 {
				visit(value, &mut |entry_key, entry_value| {
					codec::write_str(&mut *sink, entry_key)?;
					encode_value(entry_value, &mut *sink)
				})?;
			}
			blocks::write_block_end(sink)
		}))
	}

	fn decoder(
		&self,
		ctx: &BuildContext<'_>,
		_key: SchemaKey,
		node: &SchemaNode,
		_resolver: &Resolver,
		resolution: &TypeResolution,
	) -> CaseOutcome<DecodeFn> {
		let value_key = match node {
			SchemaNode::Map(value) => *value,
			_ => return CaseOutcome::NoMatch,
		};
		let res = match resolution {
			TypeResolution::Map(res) => res,
			_ => return CaseOutcome::Failed(cannot_bridge(node, resolution)),
		};
		let decode_value = match ctx.decoder(value_key, &res.value) {
			Ok(codec) => codec,
			Err(error) => return CaseOutcome::Failed(error),
		};
		let empty = Arc::clone(&res.empty);
		let insert = Arc::clone(&res.insert);
		CaseOutcome::Built(Arc::new(move |source| {
			let mut container = empty(0);
			let mut blocks = blocks::BlockReader::new(source);
			while blocks.next_item()? {
				let entry_key = codec::read_string(blocks.source())?;
				let entry_value = decode_value(blocks.source())?;
				insert(container.as_mut(), entry_key, entry_value)?;
			}
			Ok(container)
		}))
	}
}
