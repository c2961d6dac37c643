//! Describing target types to the codec builder
//!
//! A [`TypeResolution`] is the abstract shape of a Rust type as the builder
//! consumes it: what kind of value it is, how to reach its members, how to
//! construct it back from decoded parts. Member access and construction are
//! type-erased closures over [`std::any::Any`], so one compiled codec can
//! be stored, cached and shared without generics leaking into it.
//!
//! Resolutions are obtained through the [`Bind`] trait; composite
//! resolutions reference their children lazily through [`Resolver`] thunks
//! so that self-referential types (linked lists, trees) terminate.

mod bind;
mod builders;

pub use bind::{Bind, Bytes, MapKey};
pub use builders::{EnumBinding, FieldValues, RecordBinding, UnionBinding};

use crate::error::Error;

use std::{
	any::{Any, TypeId},
	sync::Arc,
};

/// A decoded value on its way to being downcast to the target type
pub type ErasedValue = Box<dyn Any>;

pub(crate) const MILLIS_PER_DAY: u128 = 86_400_000;

/// Identity and display name of a target type
#[derive(Clone, Copy)]
pub struct TypeInfo {
	id: TypeId,
	name: &'static str,
}

impl TypeInfo {
	pub fn of<T: 'static>() -> Self {
		Self {
			id: TypeId::of::<T>(),
			name: std::any::type_name::<T>(),
		}
	}

	pub fn id(&self) -> TypeId {
		self.id
	}

	pub fn name(&self) -> &'static str {
		self.name
	}
}

impl std::fmt::Debug for TypeInfo {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.name)
	}
}

/// A deferred [`TypeResolution`]
///
/// Composite resolutions hold these instead of resolved children: resolving
/// eagerly would never terminate for self-referential types. The builder
/// resolves a thunk right before compiling the child codec, at which point
/// the compilation cache breaks the recursion.
#[derive(Clone)]
pub struct Resolver {
	ty: TypeInfo,
	resolve: fn() -> TypeResolution,
}

impl Resolver {
	pub fn of<T: Bind>() -> Self {
		Self {
			ty: TypeInfo::of::<T>(),
			resolve: T::resolution,
		}
	}

	pub fn resolution(&self) -> TypeResolution {
		(self.resolve)()
	}

	/// The type this resolver was created for
	///
	/// Note that smart-pointer types resolve to their pointee's resolution,
	/// so this may differ from the resolved [`TypeResolution::ty`].
	pub fn ty(&self) -> TypeInfo {
		self.ty
	}
}

impl std::fmt::Debug for Resolver {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_tuple("Resolver").field(&self.ty).finish()
	}
}

/// The abstract shape of a target type, as consumed by the codec builder
pub enum TypeResolution {
	Primitive(PrimitiveResolution),
	Nullable(NullableResolution),
	Array(ArrayResolution),
	Map(MapResolution),
	Enum(EnumResolution),
	Record(RecordResolution),
	Union(UnionResolution),
	Timestamp(TimestampResolution),
	Duration(DurationResolution),
	Decimal(DecimalResolution),
}

impl TypeResolution {
	/// The concrete type this resolution describes
	pub fn ty(&self) -> TypeInfo {
		match self {
			TypeResolution::Primitive(r) => r.ty,
			TypeResolution::Nullable(r) => r.ty,
			TypeResolution::Array(r) => r.ty,
			TypeResolution::Map(r) => r.ty,
			TypeResolution::Enum(r) => r.ty,
			TypeResolution::Record(r) => r.ty,
			TypeResolution::Union(r) => r.ty,
			TypeResolution::Timestamp(r) => r.ty,
			TypeResolution::Duration(r) => r.ty,
			TypeResolution::Decimal(r) => r.ty,
		}
	}

	pub(crate) fn kind_name(&self) -> &'static str {
		match self {
			TypeResolution::Primitive(_) => "primitive",
			TypeResolution::Nullable(_) => "nullable",
			TypeResolution::Array(_) => "array",
			TypeResolution::Map(_) => "map",
			TypeResolution::Enum(_) => "enum",
			TypeResolution::Record(_) => "record",
			TypeResolution::Union(_) => "union",
			TypeResolution::Timestamp(_) => "timestamp",
			TypeResolution::Duration(_) => "duration",
			TypeResolution::Decimal(_) => "decimal",
		}
	}
}

impl std::fmt::Debug for TypeResolution {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{} resolution of {:?}", self.kind_name(), self.ty())
	}
}

/// The concrete primitives the value cases know how to pair with schemas
///
/// Each kind maps to exactly one Rust type, so the cases downcast directly
/// instead of going through accessor closures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum PrimitiveKind {
	/// `()`
	Unit,
	/// `bool`
	Bool,
	I8,
	I16,
	I32,
	I64,
	U8,
	U16,
	U32,
	U64,
	F32,
	F64,
	/// `String`
	Str,
	/// [`Bytes`]
	Bytes,
	/// [`uuid::Uuid`]
	Uuid,
	/// [`url::Url`]
	Url,
}

/// Resolution of a primitive target
#[derive(Clone, Copy, Debug)]
pub struct PrimitiveResolution {
	pub ty: TypeInfo,
	pub kind: PrimitiveKind,
}

/// Resolution of an optional target (`Option<T>`)
pub struct NullableResolution {
	pub ty: TypeInfo,
	pub inner: Resolver,
	/// `Some(inner value)` when the value is present
	pub project: Arc<dyn for<'a> Fn(&'a dyn Any) -> Option<&'a dyn Any> + Send + Sync>,
	/// Rebuild the optional from a decoded inner value (or from null)
	pub lift: Arc<dyn Fn(Option<ErasedValue>) -> Result<ErasedValue, Error> + Send + Sync>,
}

/// Resolution of an ordered-sequence target
pub struct ArrayResolution {
	pub ty: TypeInfo,
	pub item: Resolver,
	pub len: Arc<dyn Fn(&dyn Any) -> usize + Send + Sync>,
	/// Call the visitor once per item, in order
	pub visit:
		Arc<dyn Fn(&dyn Any, &mut dyn FnMut(&dyn Any) -> Result<(), Error>) -> Result<(), Error> + Send + Sync>,
	/// Fresh container, with a capacity hint
	pub empty: Arc<dyn Fn(usize) -> ErasedValue + Send + Sync>,
	pub push: Arc<dyn Fn(&mut dyn Any, ErasedValue) -> Result<(), Error> + Send + Sync>,
}

/// Resolution of a string-keyed mapping target
///
/// Keys are always strings on the wire; the visit and insert closures carry
/// the target-key-to-string conversion (see [`MapKey`]).
pub struct MapResolution {
	pub ty: TypeInfo,
	pub value: Resolver,
	pub len: Arc<dyn Fn(&dyn Any) -> usize + Send + Sync>,
	/// Call the visitor once per entry, in the container's iteration order
	pub visit: Arc<
		dyn Fn(&dyn Any, &mut dyn FnMut(&str, &dyn Any) -> Result<(), Error>) -> Result<(), Error>
			+ Send
			+ Sync,
	>,
	pub empty: Arc<dyn Fn(usize) -> ErasedValue + Send + Sync>,
	pub insert: Arc<dyn Fn(&mut dyn Any, String, ErasedValue) -> Result<(), Error> + Send + Sync>,
}

/// Resolution of a C-like enum target
pub struct EnumResolution {
	pub ty: TypeInfo,
	/// Declaration order; wire indices come from the schema, not from here
	pub symbols: Vec<EnumSymbolResolution>,
}

/// One symbol of an [`EnumResolution`]
pub struct EnumSymbolResolution {
	pub name: BindingName,
	/// Whether a runtime value is this symbol
	pub is: Arc<dyn Fn(&dyn Any) -> bool + Send + Sync>,
	pub make: Arc<dyn Fn() -> ErasedValue + Send + Sync>,
}

/// Resolution of a record (struct) target
pub struct RecordResolution {
	pub ty: TypeInfo,
	pub fields: Vec<RecordFieldResolution>,
	/// Rebuild the record from decoded member values
	pub construct: Arc<dyn Fn(&mut FieldValues) -> Result<ErasedValue, Error> + Send + Sync>,
}

/// One member of a [`RecordResolution`]
pub struct RecordFieldResolution {
	pub name: BindingName,
	pub binding: Resolver,
	pub get: Arc<dyn for<'a> Fn(&'a dyn Any) -> (&'a dyn Any) + Send + Sync>,
}

/// Resolution of a target with several runtime shapes (a Rust enum with
/// payloads), dispatched against union branches by runtime variant
pub struct UnionResolution {
	pub ty: TypeInfo,
	pub variants: Vec<UnionVariantResolution>,
}

/// One variant of a [`UnionResolution`]
pub struct UnionVariantResolution {
	pub name: BindingName,
	pub binding: Resolver,
	/// `Some(payload)` when the runtime value is this variant
	pub project: Arc<dyn for<'a> Fn(&'a dyn Any) -> Option<&'a dyn Any> + Send + Sync>,
	/// Wrap a decoded payload back into the enum
	pub lift: Arc<dyn Fn(ErasedValue) -> Result<ErasedValue, Error> + Send + Sync>,
}

/// Resolution of an instant-in-time target
///
/// Ticks are 100-nanosecond units relative to 1970-01-01T00:00:00Z, carried
/// as `i128` so that no representable instant overflows the intermediate
/// form; range enforcement happens where the wire form is produced.
pub struct TimestampResolution {
	pub ty: TypeInfo,
	pub as_ticks: Arc<dyn Fn(&dyn Any) -> Result<i128, Error> + Send + Sync>,
	pub from_ticks: Arc<dyn Fn(i128) -> Result<ErasedValue, Error> + Send + Sync>,
	/// ISO-8601 extended form, culture-invariant, for `string` schemas
	pub format_iso: Arc<dyn Fn(&dyn Any) -> Result<String, Error> + Send + Sync>,
	pub parse_iso: Arc<dyn Fn(&str) -> Result<ErasedValue, Error> + Send + Sync>,
}

/// Resolution of an elapsed-time target
pub struct DurationResolution {
	pub ty: TypeInfo,
	pub as_millis: Arc<dyn Fn(&dyn Any) -> Result<u128, Error> + Send + Sync>,
	pub from_parts: Arc<dyn Fn(DurationParts) -> Result<ErasedValue, Error> + Send + Sync>,
	/// ISO-8601 period form, culture-invariant, for `string` schemas
	pub format_iso: Arc<dyn Fn(&dyn Any) -> Result<String, Error> + Send + Sync>,
	pub parse_iso: Arc<dyn Fn(&str) -> Result<ErasedValue, Error> + Send + Sync>,
}

/// The three unsigned counters of the `duration` wire form
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DurationParts {
	pub months: u32,
	pub days: u32,
	pub milliseconds: u32,
}

/// Resolution of an exact decimal target
pub struct DecimalResolution {
	pub ty: TypeInfo,
	pub as_decimal: Arc<dyn Fn(&dyn Any) -> Result<rust_decimal::Decimal, Error> + Send + Sync>,
	pub from_decimal: Arc<dyn Fn(rust_decimal::Decimal) -> Result<ErasedValue, Error> + Send + Sync>,
}

/// A member or symbol name on the resolution side, with its match predicate
///
/// Matching against schema names is ASCII-case-insensitive and ignores
/// underscores, so a `next_node` member matches a `NextNode` field without
/// either side renaming. Several schema names may match one resolution
/// name; ambiguity is detected (and rejected) per schema entity by the
/// builder cases.
#[derive(Clone)]
pub struct BindingName {
	name: String,
}

impl BindingName {
	pub fn new(name: impl Into<String>) -> Self {
		Self { name: name.into() }
	}

	pub fn as_str(&self) -> &str {
		&self.name
	}

	/// Case-insensitive, underscore-insensitive equality with a schema name
	pub fn is_match(&self, schema_name: &str) -> bool {
		let mut ours = self
			.name
			.chars()
			.filter(|&c| c != '_')
			.map(|c| c.to_ascii_lowercase());
		let mut theirs = schema_name
			.chars()
			.filter(|&c| c != '_')
			.map(|c| c.to_ascii_lowercase());
		loop {
			match (ours.next(), theirs.next()) {
				(None, None) => return true,
				(Some(a), Some(b)) if a == b => {}
				_ => return false,
			}
		}
	}
}

impl std::fmt::Debug for BindingName {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		std::fmt::Debug::fmt(&self.name, f)
	}
}

/// Downcast a borrowed value the builder guaranteed to be a `T`
///
/// The builder only ever pairs a closure with values of the type it was
/// compiled for, so a failure here is a bug in the builder, not bad input.
pub(crate) fn downcast_ref<T: Any>(value: &dyn Any) -> &T {
	value
		.downcast_ref::<T>()
		.expect("compiled codec invoked with a value of the wrong type")
}

pub(crate) fn downcast_mut<T: Any>(value: &mut dyn Any) -> &mut T {
	value
		.downcast_mut::<T>()
		.expect("compiled codec invoked with a value of the wrong type")
}
