use super::*;
use crate::{
	codec,
	resolution::{downcast_ref, ErasedValue, PrimitiveKind},
};

use std::sync::Arc;

pub(super) struct FloatCase;

impl BuilderCase for FloatCase {
	fn name(&self) -> &'static str {
		"float"
	}

	fn encoder(
		&self,
		_ctx: &BuildContext<'_>,
		_key: SchemaKey,
		node: &SchemaNode,
		_resolver: &Resolver,
		resolution: &TypeResolution,
	) -> CaseOutcome<EncodeFn> {
		if !matches!(node, SchemaNode::Float) {
			return CaseOutcome::NoMatch;
		}
		match resolution {
			TypeResolution::Primitive(primitive) => match primitive.kind {
				PrimitiveKind::F32 => CaseOutcome::Built(Arc::new(|value, sink| {
					codec::write_f32(sink, *downcast_ref::<f32>(value))
				})),
				// Narrowing to the schema's precision mirrors what a float
				// schema demands of every producer
				PrimitiveKind::F64 => CaseOutcome::Built(Arc::new(|value, sink| {
					codec::write_f32(sink, *downcast_ref::<f64>(value) as f32)
				})),
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
		if !matches!(node, SchemaNode::Float) {
			return CaseOutcome::NoMatch;
		}
		match resolution {
			TypeResolution::Primitive(primitive) => match primitive.kind {
				PrimitiveKind::F32 => CaseOutcome::Built(Arc::new(|source| {
					codec::read_f32(source).map(|value| Box::new(value) as ErasedValue)
				})),
				PrimitiveKind::F64 => CaseOutcome::Built(Arc::new(|source| {
					codec::read_f32(source).map(|value| Box::new(f64::from(value)) as ErasedValue)
				})),
				_ => CaseOutcome::Failed(cannot_bridge(node, resolution)),
			},
			_ => CaseOutcome::Failed(cannot_bridge(node, resolution)),
		}
	}
}

pub(super) struct DoubleCase;

impl BuilderCase for DoubleCase {
	fn name(&self) -> &'static str {
		"double"
	}

	fn encoder(
		&self,
		_ctx: &BuildContext<'_>,
		_key: SchemaKey,
		node: &SchemaNode,
		_resolver: &Resolver,
		resolution: &TypeResolution,
	) -> CaseOutcome<EncodeFn> {
		if !matches!(node, SchemaNode::Double) {
			return CaseOutcome::NoMatch;
		}
		match resolution {
			TypeResolution::Primitive(primitive) => match primitive.kind {
				PrimitiveKind::F64 => CaseOutcome::Built(Arc::new(|value, sink| {
					codec::write_f64(sink, *downcast_ref::<f64>(value))
				})),
				PrimitiveKind::F32 => CaseOutcome::Built(Arc::new(|value, sink| {
					codec::write_f64(sink, f64::from(*downcast_ref::<f32>(value)))
				})),
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
		if !matches!(node, SchemaNode::Double) {
			return CaseOutcome::NoMatch;
		}
		match resolution {
			TypeResolution::Primitive(primitive) => match primitive.kind {
				PrimitiveKind::F64 => CaseOutcome::Built(Arc::new(|source| {
					codec::read_f64(source).map(|value| Box::new(value) as ErasedValue)
				})),
				PrimitiveKind::F32 => CaseOutcome::Failed(Error::new(
					ErrorKind::UnsupportedType,
					"f32 cannot represent a double schema's values without loss; use f64",
				)),
				_ => CaseOutcome::Failed(cannot_bridge(node, resolution)),
			},
			_ => CaseOutcome::Failed(cannot_bridge(node, resolution)),
		}
	}
}
