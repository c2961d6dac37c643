use super::*;
use crate::{
	codec,
	resolution::{downcast_ref, ErasedValue, PrimitiveKind},
};

use std::sync::Arc;

pub(super) struct BooleanCase;

impl BuilderCase for BooleanCase {
	fn name(&self) -> &'static str {
		"boolean"
	}

	fn encoder(
		&self,
		_ctx: &BuildContext<'_>,
		_key: SchemaKey,
		node: &SchemaNode,
		_resolver: &Resolver,
		resolution: &TypeResolution,
	) -> CaseOutcome<EncodeFn> {
		if !matches!(node, SchemaNode::Boolean) {
			return CaseOutcome::NoMatch;
		}
		match resolution {
			TypeResolution::Primitive(primitive) if primitive.kind == PrimitiveKind::Bool => {
				CaseOutcome::Built(Arc::new(|value, sink| {
					codec::write_bool(sink, *downcast_ref::<bool>(value))
				}))
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
		if !matches!(node, SchemaNode::Boolean) {
			return CaseOutcome::NoMatch;
		}
		match resolution {
			TypeResolution::Primitive(primitive) if primitive.kind == PrimitiveKind::Bool => {
				CaseOutcome::Built(Arc::new(|source| {
					codec::read_bool(source).map(|value| Box::new(value) as ErasedValue)
				}))
			}
			_ => CaseOutcome::Failed(cannot_bridge(node, resolution)),
		}
	}
}
