use super::*;
use crate::{
	codec,
	resolution::{EnumResolution, ErasedValue},
	schema::Enum,
};

use std::sync::Arc;

/// Bridges the `enum` schema to C-like enum targets
///
/// Symbols are matched by name at build time. Every resolution symbol must
/// match exactly one schema symbol; two schema symbols matching the same
/// resolution symbol (or two resolution symbols claiming the same schema
/// symbol) is an ambiguity error. Wire indices come from the schema's
/// declaration order.
pub(super) struct EnumCase;

/// Wire index of the single schema symbol matching `name`
fn schema_index(
	enum_: &Enum,
	symbol: &crate::resolution::EnumSymbolResolution,
	ty: &TypeResolution,
) -> Result<usize, Error> {
	let mut matches = enum_
		.symbols
		.iter()
		.enumerate()
		.filter(|(_, schema_symbol)| symbol.name.is_match(schema_symbol));
	let Some((index, _)) = matches.next() else {
		return Err(Error::custom(
			ErrorKind::UnsupportedType,
			format_args!(
				"no symbol of enum {:?} matches {:?} declared by {:?}",
				enum_.name, symbol.name, ty
			),
		));
	};
	if let Some((other, _)) = matches.next() {
		return Err(Error::custom(
			ErrorKind::AmbiguousSymbol,
			format_args!(
				"symbols {:?} and {:?} of enum {:?} both match {:?} declared by {:?}",
				enum_.symbols[index], enum_.symbols[other], enum_.name, symbol.name, ty
			),
		));
	}
	Ok(index)
}

impl BuilderCase for EnumCase {
	fn name(&self) -> &'static str {
		"enum"
	}

	fn encoder(
		&self,
		_ctx: &BuildContext<'_>,
		_key: SchemaKey,
		node: &SchemaNode,
		_resolver: &Resolver,
		resolution: &TypeResolution,
	) -> CaseOutcome<EncodeFn> {
		let enum_ = match node {
			SchemaNode::Enum(enum_) => enum_,
			_ => return CaseOutcome::NoMatch,
		};
		let res: &EnumResolution = match resolution {
			TypeResolution::Enum(res) => res,
			_ => return CaseOutcome::Failed(cannot_bridge(node, resolution)),
		};
		let mut arms = Vec::with_capacity(res.symbols.len());
		for symbol in &res.symbols {
			let index = match schema_index(enum_, symbol, resolution) {
				Ok(index) => index,
				Err(error) => return CaseOutcome::Failed(error),
			};
			arms.push((Arc::clone(&symbol.is), index as i64));
		}
		let ty_name = resolution.ty().name();
		CaseOutcome::Built(Arc::new(move |value, sink| {
			for (is, discriminant) in &arms {
				if is(value) {
					return codec::write_long(sink, *discriminant);
				}
			}
			Err(Error::custom(
				ErrorKind::Dispatch,
				format_args!("value of {ty_name} matches none of its declared enum symbols"),
			))
		}))
	}

	fn decoder(
		&self,
		_ctx: &BuildContext<'_>,
		_key: SchemaKey,
		node: &SchemaNode,
		_resolver: &Resolver,
		resolution: &TypeResolution,
	) -> CaseOutcome<DecodeFn> {
		let enum_ = match node {
			SchemaNode::Enum(enum_) => enum_,
			_ => return CaseOutcome::NoMatch,
		};
		let res: &EnumResolution = match resolution {
			TypeResolution::Enum(res) => res,
			_ => return CaseOutcome::Failed(cannot_bridge(node, resolution)),
		};
		let mut table: Vec<Option<Arc<dyn Fn() -> ErasedValue + Send + Sync>>> =
			vec![None; enum_.symbols.len()];
		for symbol in &res.symbols {
			let index = match schema_index(enum_, symbol, resolution) {
				Ok(index) => index,
				Err(error) => return CaseOutcome::Failed(error),
			};
			if table[index].is_some() {
				return CaseOutcome::Failed(Error::custom(
					ErrorKind::AmbiguousSymbol,
					format_args!(
						"two symbols declared by {:?} both match schema symbol {:?} of enum {:?}",
						resolution, enum_.symbols[index], enum_.name
					),
				));
			}
			table[index] = Some(Arc::clone(&symbol.make));
		}
		let symbols: Arc<[String]> = enum_.symbols.clone().into();
		CaseOutcome::Built(Arc::new(move |source| {
			let wire = codec::read_long(source)?;
			let index = usize::try_from(wire)
				.ok()
				.filter(|&index| index < table.len())
				.ok_or_else(|| {
					Error::custom(
						ErrorKind::Wire,
						format_args!(
							"enum wire index {wire} is out of range ({} symbols)",
							table.len()
						),
					)
				})?;
			match &table[index] {
				Some(make) => Ok(make()),
				None => Err(Error::custom(
					ErrorKind::Wire,
					format_args!(
						"schema symbol {:?} has no counterpart on the target type",
						symbols[index]
					),
				)),
			}
		}))
	}
}
