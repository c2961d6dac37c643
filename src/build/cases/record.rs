use super::*;
use crate::{
	resolution::{FieldValues, RecordFieldResolution, RecordResolution},
	schema::Record,
};

use std::sync::Arc;

use once_cell::sync::OnceCell;

/// Bridges the `record` schema to struct targets
///
/// Fields are encoded and decoded in the schema's declaration order; every
/// schema field must match exactly one member of the binding. Recursion is
/// handled with a forward reference: a closure reading a shared slot is
/// cached before the body is compiled, so a field of the same (type,
/// schema) pair finds the reference instead of expanding forever. The slot
/// is bound exactly once, before any closure of the build can run.
pub(super) struct RecordCase;

/// The single binding member matching a schema field
fn member_for<'r>(
	field_name: &str,
	record: &Record,
	res: &'r RecordResolution,
	resolution: &TypeResolution,
) -> Result<(usize, &'r RecordFieldResolution), Error> {
	let mut matches = res
		.fields
		.iter()
		.enumerate()
		.filter(|(_, member)| member.name.is_match(field_name));
	let Some(found) = matches.next() else {
		return Err(Error::custom(
			ErrorKind::UnsupportedType,
			format_args!(
				"no member of {:?} matches field {:?} of record {:?}",
				resolution, field_name, record.name
			),
		));
	};
	if let Some((_, other)) = matches.next() {
		return Err(Error::custom(
			ErrorKind::AmbiguousField,
			format_args!(
				"members {:?} and {:?} of {:?} both match field {:?} of record {:?}",
				found.1.name, other.name, resolution, field_name, record.name
			),
		));
	}
	Ok(found)
}

impl BuilderCase for RecordCase {
	fn name(&self) -> &'static str {
		"record"
	}

	fn encoder(
		&self,
		ctx: &BuildContext<'_>,
		key: SchemaKey,
		node: &SchemaNode,
		_resolver: &Resolver,
		resolution: &TypeResolution,
	) -> CaseOutcome<EncodeFn> {
		let record = match node {
			SchemaNode::Record(record) => record,
			_ => return CaseOutcome::NoMatch,
		};
		let res = match resolution {
			TypeResolution::Record(res) => res,
			_ => return CaseOutcome::Failed(cannot_bridge(node, resolution)),
		};

		let mark = ctx.journal_mark();
		let cache_key = ctx.cache_key(key, resolution);
		let slot: Arc<OnceCell<EncodeFn>> = Arc::new(OnceCell::new());
		let forward: EncodeFn = {
			let slot = Arc::clone(&slot);
			Arc::new(move |value, sink| {
				slot.get()
					.expect("recursive record encoder invoked before its body was bound")(
					value, sink,
				)
			})
		};
		if let Some(existing) = ctx.install_forward_encoder(cache_key, Arc::clone(&forward)) {
			return CaseOutcome::Built(existing);
		}
		tracing::debug!(record = ?record.name, ty = resolution.ty().name(), "installed encoder forward reference");

		let mut members = Vec::with_capacity(record.fields.len());
		let mut used = vec![false; res.fields.len()];
		for field in &record.fields {
			let (member_idx, member) = match member_for(&field.name, record, res, resolution) {
				Ok(found) => found,
				Err(error) => {
					ctx.rollback_to(mark);
					return CaseOutcome::Failed(error);
				}
			};
			if used[member_idx] {
				ctx.rollback_to(mark);
				return CaseOutcome::Failed(Error::custom(
					ErrorKind::AmbiguousField,
					format_args!(
						"two fields of record {:?} both match member {:?} of {:?}",
						record.name, member.name, resolution
					),
				));
			}
			used[member_idx] = true;
			match ctx.encoder(field.schema, &member.binding) {
				Ok(codec) => members.push((Arc::clone(&member.get), codec)),
				Err(error) => {
					ctx.rollback_to(mark);
					return CaseOutcome::Failed(error);
				}
			}
		}

		let body: EncodeFn = Arc::new(move |value, sink| {
			for (get, encode) in &members {
				encode(get(value), sink)?;
			}
			Ok(())
		});
		assert!(
			slot.set(body).is_ok(),
			"record encoder forward reference bound twice"
		);
		CaseOutcome::Built(forward)
	}

	fn decoder(
		&self,
		ctx: &BuildContext<'_>,
		key: SchemaKey,
		node: &SchemaNode,
		_resolver: &Resolver,
		resolution: &TypeResolution,
	) -> CaseOutcome<DecodeFn> {
		let record = match node {
			SchemaNode::Record(record) => record,
			_ => return CaseOutcome::NoMatch,
		};
		let res = match resolution {
			TypeResolution::Record(res) => res,
			_ => return CaseOutcome::Failed(cannot_bridge(node, resolution)),
		};

		let mark = ctx.journal_mark();
		let cache_key = ctx.cache_key(key, resolution);
		let slot: Arc<OnceCell<DecodeFn>> = Arc::new(OnceCell::new());
		let forward: DecodeFn = {
			let slot = Arc::clone(&slot);
			Arc::new(move |source| {
				slot.get()
					.expect("recursive record decoder invoked before its body was bound")(source)
			})
		};
		if let Some(existing) = ctx.install_forward_decoder(cache_key, Arc::clone(&forward)) {
			return CaseOutcome::Built(existing);
		}
		tracing::debug!(record = ?record.name, ty = resolution.ty().name(), "installed decoder forward reference");

		// slot index per schema field, in schema order
		let mut members = Vec::with_capacity(record.fields.len());
		let mut covered = vec![false; res.fields.len()];
		for field in &record.fields {
			let (member_idx, member) = match member_for(&field.name, record, res, resolution) {
				Ok(found) => found,
				Err(error) => {
					ctx.rollback_to(mark);
					return CaseOutcome::Failed(error);
				}
			};
			if covered[member_idx] {
				ctx.rollback_to(mark);
				return CaseOutcome::Failed(Error::custom(
					ErrorKind::AmbiguousField,
					format_args!(
						"two fields of record {:?} both match member {:?} of {:?}",
						record.name, member.name, resolution
					),
				));
			}
			covered[member_idx] = true;
			match ctx.decoder(field.schema, &member.binding) {
				Ok(codec) => members.push((member_idx, codec)),
				Err(error) => {
					ctx.rollback_to(mark);
					return CaseOutcome::Failed(error);
				}
			}
		}
		if let Some(missing) = covered.iter().position(|&covered| !covered) {
			ctx.rollback_to(mark);
			return CaseOutcome::Failed(Error::custom(
				ErrorKind::UnsupportedType,
				format_args!(
					"member {:?} of {:?} is not covered by any field of record {:?}, so the \
						record cannot be constructed from the wire",
					res.fields[missing].name, resolution, record.name
				),
			));
		}

		let names: Arc<[String]> = res
			.fields
			.iter()
			.map(|member| member.name.as_str().to_owned())
			.collect::<Vec<_>>()
			.into();
		let construct = Arc::clone(&res.construct);
		let body: DecodeFn = Arc::new(move |source| {
			let mut values = FieldValues::new(Arc::clone(&names));
			for (member_idx, decode) in &members {
				values.put(*member_idx, decode(source)?);
			}
			construct(&mut values)
		});
		assert!(
			slot.set(body).is_ok(),
			"record decoder forward reference bound twice"
		);
		CaseOutcome::Built(forward)
	}
}
