//! The ordered rule registry the builder dispatches over
//!
//! Every rule answers for one schema shape (and, for the logical types, one
//! overlay) paired with the resolution shapes it knows how to bridge. Rules
//! are tried first to last and the first one to produce a closure wins, so
//! the order is load-bearing: the logical-type rules come before the
//! primitive rules that share their wire shape.
//!
//! A rule whose schema shape does not match reports
//! [`CaseOutcome::NoMatch`] and costs nothing; a rule whose schema shape
//! matches but cannot bridge the resolution reports
//! [`CaseOutcome::Failed`], and those errors are aggregated by the
//! dispatcher when no rule applies at all.

mod array;
mod boolean;
mod bytes;
mod decimal;
mod duration;
mod enums;
mod float;
mod integer;
mod map;
mod null;
mod record;
mod string;
mod timestamp;
mod union;

pub(crate) use super::{BuildContext, DecodeFn, EncodeFn};
pub(crate) use crate::{
	error::{Error, ErrorKind},
	resolution::{Resolver, TypeResolution},
	schema::{SchemaKey, SchemaNode},
};

pub(crate) enum CaseOutcome<F> {
	Built(F),
	NoMatch,
	Failed(Error),
}

pub(crate) trait BuilderCase: Send + Sync {
	fn name(&self) -> &'static str;

	fn encoder(
		&self,
		ctx: &BuildContext<'_>,
		key: SchemaKey,
		node: &SchemaNode,
		resolver: &Resolver,
		resolution: &TypeResolution,
	) -> CaseOutcome<EncodeFn>;

	fn decoder(
		&self,
		ctx: &BuildContext<'_>,
		key: SchemaKey,
		node: &SchemaNode,
		resolver: &Resolver,
		resolution: &TypeResolution,
	) -> CaseOutcome<DecodeFn>;
}

/// First applicable rule wins; logical types shadow their wire primitives
pub(crate) static REGISTRY: &[&dyn BuilderCase] = &[
	&decimal::DecimalCase,
	&duration::DurationCase,
	&timestamp::TimestampCase,
	&boolean::BooleanCase,
	&bytes::BytesCase,
	&float::DoubleCase,
	&bytes::FixedCase,
	&float::FloatCase,
	&integer::IntegerCase,
	&null::NullCase,
	&string::StringCase,
	&array::ArrayCase,
	&map::MapCase,
	&enums::EnumCase,
	&record::RecordCase,
	&union::UnionCase,
];

/// The standard "schema shape matched, resolution did not" failure
pub(crate) fn cannot_bridge(node: &SchemaNode, resolution: &TypeResolution) -> Error {
	Error::custom(
		ErrorKind::UnsupportedType,
		format_args!(
			"a {} schema cannot be bridged to {:?}",
			node.kind_name(),
			resolution
		),
	)
}
