use super::*;
use crate::resolution::{ErasedValue, PrimitiveKind};

use std::sync::Arc;

pub(super) struct NullCase;

impl BuilderCase for NullCase {
	fn name(&self) -> &'static str {
		"null"
	}

	fn encoder(
		&self,
		_ctx: &BuildContext<'_>,
		_key: SchemaKey,
		node: &SchemaNode,
		_resolver: &Resolver,
		resolution: &TypeResolution,
	) -> CaseOutcome<EncodeFn> {
		if !matches!(node, SchemaNode::Null) {
			return CaseOutcome::NoMatch;
		}
		match resolution {
			TypeResolution::Primitive(primitive) if primitive.kind == PrimitiveKind::Unit => {
				// null carries no bytes at all
				CaseOutcome::Built(Arc::new(|_value, _sink| Ok(())))
			}
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
		if !matches!(node, SchemaNode::Null) {
			return CaseOutcome::NoMatch;
		}
		match resolution {
			TypeResolution::Primitive(primitive) if primitive.kind == PrimitiveKind::Unit => {
				CaseOutcome::Built(Arc::new(|_source| Ok(Box::new(()) as ErasedValue)))
			}
			_ => CaseOutcome::Failed(cannot_bridge(node, resolution)),
		}
	}
}
