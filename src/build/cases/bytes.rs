use super::*;
use crate::{
	codec,
	resolution::{downcast_ref, Bytes, ErasedValue, PrimitiveKind},
	schema::Fixed,
};

use std::sync::Arc;

/// UUIDs travel through `bytes` and `fixed` in their little-endian
/// byte-array form (`to_bytes_le`), 16 bytes
const UUID_WIRE_LEN: usize = 16;

pub(super) struct BytesCase;

impl BuilderCase for BytesCase {
	fn name(&self) -> &'static str {
		"bytes"
	}

	fn encoder(
		&self,
		_ctx: &BuildContext<'_>,
		_key: SchemaKey,
		node: &SchemaNode,
		_resolver: &Resolver,
		resolution: &TypeResolution,
	) -> CaseOutcome<EncodeFn> {
		if !matches!(node, SchemaNode::Bytes) {
			return CaseOutcome::NoMatch;
		}
		match resolution {
			TypeResolution::Primitive(primitive) => match primitive.kind {
				PrimitiveKind::Bytes => CaseOutcome::Built(Arc::new(|value, sink| {
					codec::write_bytes(sink, downcast_ref::<Bytes>(value))
				})),
				PrimitiveKind::Uuid => CaseOutcome::Built(Arc::new(|value, sink| {
					codec::write_bytes(sink, &downcast_ref::<uuid::Uuid>(value).to_bytes_le())
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
		if !matches!(node, SchemaNode::Bytes) {
			return CaseOutcome::NoMatch;
		}
		match resolution {
			TypeResolution::Primitive(primitive) => match primitive.kind {
				PrimitiveKind::Bytes => CaseOutcome::Built(Arc::new(|source| {
					codec::read_bytes(source).map(|bytes| Box::new(Bytes(bytes)) as ErasedValue)
				})),
				PrimitiveKind::Uuid => CaseOutcome::Built(Arc::new(|source| {
					let bytes = codec::read_bytes(source)?;
					let bytes: [u8; UUID_WIRE_LEN] = bytes.as_slice().try_into().map_err(|_| {
						Error::custom(
							ErrorKind::SizeMismatch,
							format_args!(
								"a uuid needs exactly {UUID_WIRE_LEN} bytes, the wire carried {}",
								bytes.len()
							),
						)
					})?;
					Ok(Box::new(uuid::Uuid::from_bytes_le(bytes)) as ErasedValue)
				})),
				_ => CaseOutcome::Failed(cannot_bridge(node, resolution)),
			},
			_ => CaseOutcome::Failed(cannot_bridge(node, resolution)),
		}
	}
}

pub(super) struct FixedCase;

impl BuilderCase for FixedCase {
	fn name(&self) -> &'static str {
		"fixed"
	}

	fn encoder(
		&self,
		_ctx: &BuildContext<'_>,
		_key: SchemaKey,
		node: &SchemaNode,
		_resolver: &Resolver,
		resolution: &TypeResolution,
	) -> CaseOutcome<EncodeFn> {
		let Fixed { size, .. } = match node {
			SchemaNode::Fixed(fixed) => fixed,
			_ => return CaseOutcome::NoMatch,
		};
		let size = *size;
		match resolution {
			TypeResolution::Primitive(primitive) => match primitive.kind {
				PrimitiveKind::Bytes => CaseOutcome::Built(Arc::new(move |value, sink| {
					let bytes = downcast_ref::<Bytes>(value);
					if bytes.len() != size {
						return Err(Error::custom(
							ErrorKind::SizeMismatch,
							format_args!(
								"fixed schema of size {size} cannot hold {} bytes",
								bytes.len()
							),
						));
					}
					sink.write_all(bytes)
				})),
				PrimitiveKind::Uuid => {
					if size != UUID_WIRE_LEN {
						return CaseOutcome::Failed(Error::custom(
							ErrorKind::SizeMismatch,
							format_args!(
								"a uuid needs a fixed schema of size {UUID_WIRE_LEN}, got {size}"
							),
						));
					}
					CaseOutcome::Built(Arc::new(|value, sink| {
						sink.write_all(&downcast_ref::<uuid::Uuid>(value).to_bytes_le())
					}))
				}
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
		let Fixed { size, .. } = match node {
			SchemaNode::Fixed(fixed) => fixed,
			_ => return CaseOutcome::NoMatch,
		};
		let size = *size;
		match resolution {
			TypeResolution::Primitive(primitive) => match primitive.kind {
				PrimitiveKind::Bytes => CaseOutcome::Built(Arc::new(move |source| {
					let mut bytes = vec![0u8; size];
					source.read_exact(&mut bytes)?;
					Ok(Box::new(Bytes(bytes)) as ErasedValue)
				})),
				PrimitiveKind::Uuid => {
					if size != UUID_WIRE_LEN {
						return CaseOutcome::Failed(Error::custom(
							ErrorKind::SizeMismatch,
							format_args!(
								"a uuid needs a fixed schema of size {UUID_WIRE_LEN}, got {size}"
							),
						));
					}
					CaseOutcome::Built(Arc::new(|source| {
						let mut bytes = [0u8; UUID_WIRE_LEN];
						source.read_exact(&mut bytes)?;
						Ok(Box::new(uuid::Uuid::from_bytes_le(bytes)) as ErasedValue)
					}))
				}
				_ => CaseOutcome::Failed(cannot_bridge(node, resolution)),
			},
			_ => CaseOutcome::Failed(cannot_bridge(node, resolution)),
		}
	}
}
