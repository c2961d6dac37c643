use super::*;
use crate::{
	codec,
	resolution::{BindingName, NullableResolution, UnionResolution, UnionVariantResolution},
	rw::Source,
	schema::Union,
};

use std::sync::Arc;

/// Bridges the `union` schema to optional targets, variant-enum targets and
/// plain targets
///
/// On encode, a null value writes the varint index of the null branch and
/// nothing else. Otherwise the branch is selected for the non-null form of
/// the value: at build time when the target is one concrete type (first
/// branch whose sub-build succeeds, in schema order), or through a runtime
/// variant-discriminated dispatch chain when the target has several
/// runtime shapes - with a terminal dispatch error for a variant no branch
/// was compiled for.
///
/// On decode, the varint index delegates to a per-branch sub-decoder.
/// Branches the target type cannot absorb still get an arm, one that
/// reports a conversion error if the wire ever announces them.
pub(super) struct UnionCase;

impl BuilderCase for UnionCase {
	fn name(&self) -> &'static str {
		"union"
	}

	fn encoder(
		&self,
		ctx: &BuildContext<'_>,
		key: SchemaKey,
		node: &SchemaNode,
		resolver: &Resolver,
		resolution: &TypeResolution,
	) -> CaseOutcome<EncodeFn> {
		let union = match node {
			SchemaNode::Union(union) => union,
			_ => return CaseOutcome::NoMatch,
		};
		match resolution {
			TypeResolution::Nullable(nullable) => {
				encode_nullable(ctx, key, union, nullable, resolution)
			}
			TypeResolution::Union(variants) => encode_variants(ctx, union, variants, resolution),
			_ => encode_single(ctx, union, resolver, resolution),
		}
	}

	fn decoder(
		&self,
		ctx: &BuildContext<'_>,
		_key: SchemaKey,
		node: &SchemaNode,
		resolver: &Resolver,
		resolution: &TypeResolution,
	) -> CaseOutcome<DecodeFn> {
		let union = match node {
			SchemaNode::Union(union) => union,
			_ => return CaseOutcome::NoMatch,
		};
		match resolution {
			TypeResolution::Nullable(nullable) => decode_nullable(ctx, union, nullable, resolution),
			TypeResolution::Union(variants) => decode_variants(ctx, union, variants, resolution),
			_ => decode_single(ctx, union, resolver, resolution),
		}
	}
}

fn null_branch_index(ctx: &BuildContext<'_>, union: &Union) -> Option<usize> {
	union
		.variants
		.iter()
		.position(|&branch| matches!(ctx.schema.node(branch), SchemaNode::Null))
}

fn branch_name_matches(ctx: &BuildContext<'_>, branch: SchemaKey, name: &BindingName) -> bool {
	ctx.schema.node(branch).name().is_some_and(|branch_name| {
		name.is_match(branch_name.name()) || name.is_match(branch_name.fully_qualified_name())
	})
}

fn encode_nullable(
	ctx: &BuildContext<'_>,
	key: SchemaKey,
	union: &Union,
	nullable: &NullableResolution,
	resolution: &TypeResolution,
) -> CaseOutcome<EncodeFn> {
	let Some(null_index) = null_branch_index(ctx, union) else {
		return CaseOutcome::Failed(Error::custom(
			ErrorKind::UnsupportedType,
			format_args!("{resolution:?} needs a union with a null branch, this union has none"),
		));
	};
	// Compiling the inner resolution against the same union node selects the
	// branch (and writes the discriminant) exactly as if the non-null value
	// were bound directly.
	let encode_some = match ctx.encoder(key, &nullable.inner) {
		Ok(codec) => codec,
		Err(error) => return CaseOutcome::Failed(error),
	};
	let project = Arc::clone(&nullable.project);
	let null_discriminant = null_index as i64;
	CaseOutcome::Built(Arc::new(move |value, sink| match project(value) {
		None => codec::write_long(sink, null_discriminant),
		Some(inner) => encode_some(inner, sink),
	}))
}

fn encode_variants(
	ctx: &BuildContext<'_>,
	union: &Union,
	variants: &UnionResolution,
	resolution: &TypeResolution,
) -> CaseOutcome<EncodeFn> {
	let mut arms = Vec::with_capacity(variants.variants.len());
	for variant in &variants.variants {
		match select_encode_branch(ctx, union, variant) {
			Some((discriminant, encode_branch)) => {
				arms.push((Arc::clone(&variant.project), discriminant, encode_branch));
			}
			None => {
				tracing::debug!(
					variant = variant.name.as_str(),
					"union variant matches no branch; encoding it will be a dispatch error"
				);
			}
		}
	}
	if arms.is_empty() {
		return CaseOutcome::Failed(Error::custom(
			ErrorKind::UnsupportedType,
			format_args!("no variant of {resolution:?} is compatible with any branch of the union"),
		));
	}
	let ty_name = resolution.ty().name();
	CaseOutcome::Built(Arc::new(move |value, sink| {
		for (project, discriminant, encode_branch) in &arms {
			if let Some(payload) = project(value) {
				codec::write_long(sink, *discriminant)?;
				return encode_branch(payload, sink);
			}
		}
		Err(Error::custom(
			ErrorKind::Dispatch,
			format_args!("runtime value of {ty_name} is a variant no union branch was compiled for"),
		))
	}))
}

/// First compatible branch for one variant: branches whose name matches the
/// variant's name are preferred, then the rest in schema order
fn select_encode_branch(
	ctx: &BuildContext<'_>,
	union: &Union,
	variant: &UnionVariantResolution,
) -> Option<(i64, EncodeFn)> {
	let try_branch = |index: usize, branch: SchemaKey| -> Option<(i64, EncodeFn)> {
		let mark = ctx.journal_mark();
		match ctx.encoder(branch, &variant.binding) {
			Ok(encode_branch) => Some((index as i64, encode_branch)),
			Err(error) => {
				tracing::trace!(
					variant = variant.name.as_str(),
					branch = index,
					error = %error,
					"branch rejected for variant"
				);
				ctx.rollback_to(mark);
				None
			}
		}
	};
	for (index, &branch) in union.variants.iter().enumerate() {
		if branch_name_matches(ctx, branch, &variant.name) {
			if let Some(found) = try_branch(index, branch) {
				return Some(found);
			}
		}
	}
	for (index, &branch) in union.variants.iter().enumerate() {
		if !branch_name_matches(ctx, branch, &variant.name) {
			if let Some(found) = try_branch(index, branch) {
				return Some(found);
			}
		}
	}
	None
}

fn encode_single(
	ctx: &BuildContext<'_>,
	union: &Union,
	resolver: &Resolver,
	resolution: &TypeResolution,
) -> CaseOutcome<EncodeFn> {
	let mut failures = Vec::new();
	for (index, &branch) in union.variants.iter().enumerate() {
		let mark = ctx.journal_mark();
		match ctx.encoder(branch, resolver) {
			Ok(encode_branch) => {
				let discriminant = index as i64;
				return CaseOutcome::Built(Arc::new(move |value, sink| {
					codec::write_long(sink, discriminant)?;
					encode_branch(value, sink)
				}));
			}
			Err(error) => {
				ctx.rollback_to(mark);
				failures.push(error);
			}
		}
	}
	CaseOutcome::Failed(Error::aggregate(
		ErrorKind::UnsupportedType,
		format_args!("{resolution:?} matches no branch of the union"),
		failures,
	))
}

/// Arm that reports an error if the wire ever announces its branch
fn error_arm(kind: ErrorKind, message: String) -> DecodeFn {
	Arc::new(move |_source: &mut dyn Source| Err(Error::custom(kind, &message)))
}

/// Dispatch on the decoded branch index
fn read_branch_dispatch(arms: Vec<DecodeFn>) -> DecodeFn {
	Arc::new(move |source: &mut dyn Source| {
		let wire = codec::read_long(source)?;
		let index = usize::try_from(wire)
			.ok()
			.filter(|&index| index < arms.len())
			.ok_or_else(|| {
				Error::custom(
					ErrorKind::Wire,
					format_args!(
						"union branch index {wire} is out of range ({} branches)",
						arms.len()
					),
				)
			})?;
		arms[index](source)
	})
}

fn decode_nullable(
	ctx: &BuildContext<'_>,
	union: &Union,
	nullable: &NullableResolution,
	resolution: &TypeResolution,
) -> CaseOutcome<DecodeFn> {
	let Some(null_index) = null_branch_index(ctx, union) else {
		return CaseOutcome::Failed(Error::custom(
			ErrorKind::UnsupportedType,
			format_args!("{resolution:?} needs a union with a null branch, this union has none"),
		));
	};
	let inner_resolution = nullable.inner.resolution();
	let mut arms: Vec<DecodeFn> = Vec::with_capacity(union.variants.len());
	let mut n_live = 0usize;
	let mut failures = Vec::new();
	for (index, &branch) in union.variants.iter().enumerate() {
		if index == null_index {
			let lift = Arc::clone(&nullable.lift);
			arms.push(Arc::new(move |_source: &mut dyn Source| lift(None)));
			continue;
		}
		match branch_decoder(ctx, branch, &inner_resolution, &nullable.inner) {
			Ok(decode_branch) => {
				let lift = Arc::clone(&nullable.lift);
				n_live += 1;
				arms.push(Arc::new(move |source: &mut dyn Source| {
					lift(Some(decode_branch(source)?))
				}));
			}
			Err(error) => {
				arms.push(error_arm(
					ErrorKind::Conversion,
					format!(
						"wire announces the {} branch, which cannot produce {:?}",
						ctx.schema.node(branch).kind_name(),
						resolution
					),
				));
				failures.push(error);
			}
		}
	}
	if n_live == 0 && union.variants.len() > 1 {
		return CaseOutcome::Failed(Error::aggregate(
			ErrorKind::UnsupportedType,
			format_args!("no non-null branch of the union can produce {resolution:?}"),
			failures,
		));
	}
	CaseOutcome::Built(read_branch_dispatch(arms))
}

fn decode_variants(
	ctx: &BuildContext<'_>,
	union: &Union,
	variants: &UnionResolution,
	resolution: &TypeResolution,
) -> CaseOutcome<DecodeFn> {
	let mut arms: Vec<DecodeFn> = Vec::with_capacity(union.variants.len());
	let mut n_live = 0usize;
	let mut failures = Vec::new();
	for &branch in &union.variants {
		match variant_decoder_for_branch(ctx, branch, variants, resolution) {
			Ok(decode_branch) => {
				n_live += 1;
				arms.push(decode_branch);
			}
			Err(error) => {
				arms.push(error_arm(
					ErrorKind::Conversion,
					format!(
						"wire announces the {} branch, which no variant of {:?} can produce",
						ctx.schema.node(branch).kind_name(),
						resolution
					),
				));
				failures.push(error);
			}
		}
	}
	if n_live == 0 {
		return CaseOutcome::Failed(Error::aggregate(
			ErrorKind::UnsupportedType,
			format_args!("no branch of the union can be produced into {resolution:?}"),
			failures,
		));
	}
	CaseOutcome::Built(read_branch_dispatch(arms))
}

fn decode_single(
	ctx: &BuildContext<'_>,
	union: &Union,
	resolver: &Resolver,
	resolution: &TypeResolution,
) -> CaseOutcome<DecodeFn> {
	let mut arms: Vec<DecodeFn> = Vec::with_capacity(union.variants.len());
	let mut n_live = 0usize;
	let mut failures = Vec::new();
	for &branch in &union.variants {
		let mark = ctx.journal_mark();
		match ctx.decoder(branch, resolver) {
			Ok(decode_branch) => {
				n_live += 1;
				arms.push(decode_branch);
			}
			Err(error) => {
				ctx.rollback_to(mark);
				arms.push(error_arm(
					ErrorKind::Conversion,
					format!(
						"wire announces the {} branch, which cannot produce {:?}",
						ctx.schema.node(branch).kind_name(),
						resolution
					),
				));
				failures.push(error);
			}
		}
	}
	if n_live == 0 {
		return CaseOutcome::Failed(Error::aggregate(
			ErrorKind::UnsupportedType,
			format_args!("no branch of the union can be produced into {resolution:?}"),
			failures,
		));
	}
	CaseOutcome::Built(read_branch_dispatch(arms))
}

/// Decode one branch into a variant-enum target: the first variant whose
/// sub-decoder builds claims the branch, name-matching variants first
fn branch_decoder(
	ctx: &BuildContext<'_>,
	branch: SchemaKey,
	resolution: &TypeResolution,
	resolver: &Resolver,
) -> Result<DecodeFn, Error> {
	match resolution {
		TypeResolution::Union(variants) => {
			variant_decoder_for_branch(ctx, branch, variants, resolution)
		}
		// nested optionals share the union's null branch; a non-null payload
		// decodes through the innermost type and lifts back out
		TypeResolution::Nullable(nullable) => {
			let inner_resolution = nullable.inner.resolution();
			let decode_inner = branch_decoder(ctx, branch, &inner_resolution, &nullable.inner)?;
			let lift = Arc::clone(&nullable.lift);
			Ok(Arc::new(move |source: &mut dyn Source| {
				lift(Some(decode_inner(source)?))
			}))
		}
		_ => {
			let mark = ctx.journal_mark();
			ctx.decoder(branch, resolver).map_err(|error| {
				ctx.rollback_to(mark);
				error
			})
		}
	}
}

fn variant_decoder_for_branch(
	ctx: &BuildContext<'_>,
	branch: SchemaKey,
	variants: &UnionResolution,
	resolution: &TypeResolution,
) -> Result<DecodeFn, Error> {
	let mut failures = Vec::new();
	for name_pass in [true, false] {
		for variant in &variants.variants {
			if branch_name_matches(ctx, branch, &variant.name) != name_pass {
				continue;
			}
			let mark = ctx.journal_mark();
			match ctx.decoder(branch, &variant.binding) {
				Ok(decode_branch) => {
					let lift = Arc::clone(&variant.lift);
					return Ok(Arc::new(move |source: &mut dyn Source| {
						lift(decode_branch(source)?)
					}));
				}
				Err(error) => {
					ctx.rollback_to(mark);
					failures.push(error);
				}
			}
		}
	}
	Err(Error::aggregate(
		ErrorKind::UnsupportedType,
		format_args!(
			"no variant of {resolution:?} can produce the {} branch",
			ctx.schema.node(branch).kind_name()
		),
		failures,
	))
}
