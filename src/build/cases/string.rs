use super::*;
use crate::{
	codec,
	resolution::{downcast_ref, ErasedValue, PrimitiveKind},
};

use std::sync::Arc;

/// Bridges the `string` schema to strings and to the types with a
/// culture-invariant canonical string form: UUIDs (hyphenated), URIs
/// (canonical form), instants (ISO-8601 extended) and elapsed times
/// (ISO-8601 period notation)
pub(super) struct StringCase;

impl BuilderCase for StringCase {
	fn name(&self) -> &'static str {
		"string"
	}

	fn encoder(
		&self,
		_ctx: &BuildContext<'_>,
		_key: SchemaKey,
		node: &SchemaNode,
		_resolver: &Resolver,
		resolution: &TypeResolution,
	) -> CaseOutcome<EncodeFn> {
		if !matches!(node, SchemaNode::String) {
			return CaseOutcome::NoMatch;
		}
		match resolution {
			TypeResolution::Primitive(primitive) => match primitive.kind {
				PrimitiveKind::Str => CaseOutcome::Built(Arc::new(|value, sink| {
					codec::write_str(sink, downcast_ref::<String>(value))
				})),
				PrimitiveKind::Uuid => CaseOutcome::Built(Arc::new(|value, sink| {
					let mut buf = uuid::Uuid::encode_buffer();
					let text = downcast_ref::<uuid::Uuid>(value)
						.hyphenated()
						.encode_lower(&mut buf);
					codec::write_str(sink, text)
				})),
				PrimitiveKind::Url => CaseOutcome::Built(Arc::new(|value, sink| {
					codec::write_str(sink, downcast_ref::<url::Url>(value).as_str())
				})),
				_ => CaseOutcome::Failed(cannot_bridge(node, resolution)),
			},
			TypeResolution::Timestamp(timestamp) => {
				let format_iso = Arc::clone(&timestamp.format_iso);
				CaseOutcome::Built(Arc::new(move |value, sink| {
					codec::write_str(sink, &format_iso(value)?)
				}))
			}
			TypeResolution::Duration(duration) => {
				let format_iso = Arc::clone(&duration.format_iso);
				CaseOutcome::Built(Arc::new(move |value, sink| {
					codec::write_str(sink, &format_iso(value)?)
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
		if !matches!(node, SchemaNode::String) {
			return CaseOutcome::NoMatch;
		}
		match resolution {
			TypeResolution::Primitive(primitive) => match primitive.kind {
				PrimitiveKind::Str => CaseOutcome::Built(Arc::new(|source| {
					codec::read_string(source).map(|text| Box::new(text) as ErasedValue)
				})),
				PrimitiveKind::Uuid => CaseOutcome::Built(Arc::new(|source| {
					let text = codec::read_string(source)?;
					let value: uuid::Uuid = text.parse().map_err(|e| {
						Error::custom(
							ErrorKind::Conversion,
							format_args!("{text:?} is not a valid uuid: {e}"),
						)
					})?;
					Ok(Box::new(value) as ErasedValue)
				})),
				PrimitiveKind::Url => CaseOutcome::Built(Arc::new(|source| {
					let text = codec::read_string(source)?;
					let value = url::Url::parse(&text).map_err(|e| {
						Error::custom(
							ErrorKind::Conversion,
							format_args!("{text:?} is not a valid url: {e}"),
						)
					})?;
					Ok(Box::new(value) as ErasedValue)
				})),
				_ => CaseOutcome::Failed(cannot_bridge(node, resolution)),
			},
			TypeResolution::Timestamp(timestamp) => {
				let parse_iso = Arc::clone(&timestamp.parse_iso);
				CaseOutcome::Built(Arc::new(move |source| {
					parse_iso(&codec::read_string(source)?)
				}))
			}
			TypeResolution::Duration(duration) => {
				let parse_iso = Arc::clone(&duration.parse_iso);
				CaseOutcome::Built(Arc::new(move |source| {
					parse_iso(&codec::read_string(source)?)
				}))
			}
			_ => CaseOutcome::Failed(cannot_bridge(node, resolution)),
		}
	}
}
