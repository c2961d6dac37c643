use super::*;
use crate::codec::blocks;

use std::sync::Arc;

/// Bridges the `array` schema to ordered-sequence targets
///
/// The container knows its length up front, so the encoder always emits a
/// single positive-count block followed by the zero terminator (or only the
/// terminator when empty). The decoder accepts any conforming block layout.
pub(super) struct ArrayCase;

impl BuilderCase for ArrayCase {
	fn name(&self) -> &'static str {
		"array"
	}

	fn encoder(
		&self,
		ctx: &BuildContext<'_>,
		_key: SchemaKey,
		node: &SchemaNode,
		_resolver: &Resolver,
		resolution: &TypeResolution,
	) -> CaseOutcome<EncodeFn> {
		let item_key = match node {
			SchemaNode::Array(item) => *item,
			_ => return CaseOutcome::NoMatch,
		};
		let res = match resolution {
			TypeResolution::Array(res) => res,
			_ => return CaseOutcome::Failed(cannot_bridge(node, resolution)),
		};
		let encode_item = match ctx.encoder(item_key, &res.item) {
			Ok(codec) => codec,
			Err(error) => return CaseOutcome::Failed(error),
		};
		let len = Arc::clone(&res.len);
		let visit = Arc::clone(&res.visit);
		CaseOutcome::Built(Arc::new(move |value, sink| {
			let len = len(value);
			blocks::write_block_header(sink, len)?;
			if len > 0 {
				visit(value, &mut |item| encode_item(item, &mut *sink))?;
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
		let item_key = match node {
			SchemaNode::Array(item) => *item,
			_ => return CaseOutcome::NoMatch,
		};
		let res = match resolution {
			TypeResolution::Array(res) => res,
			_ => return CaseOutcome::Failed(cannot_bridge(node, resolution)),
		};
		let decode_item = match ctx.decoder(item_key, &res.item) {
			Ok(codec) => codec,
			Err(error) => return CaseOutcome::Failed(error),
		};
		let empty = Arc::clone(&res.empty);
		let push = Arc::clone(&res.push);
		CaseOutcome::Built(Arc::new(move |source| {
			let mut container = empty(0);
			let mut blocks = blocks::BlockReader::new(source);
			while blocks.next_item()? {
				let item = decode_item(blocks.source())?;
				push(container.as_mut(), item)?;
			}
			Ok(container)
		}))
	}
}
