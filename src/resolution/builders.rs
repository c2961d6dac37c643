//! Typed builders for describing records, enums and union enums to the
//! codec builder without hand-writing erased closures

use super::{
	downcast_ref, Bind, BindingName, EnumResolution, EnumSymbolResolution, ErasedValue,
	RecordFieldResolution, RecordResolution, Resolver, TypeInfo, TypeResolution, UnionResolution,
	UnionVariantResolution,
};
use crate::error::{Error, ErrorKind};

use std::{marker::PhantomData, sync::Arc};

/// Describes a struct as a record resolution
///
/// Field getters are plain `fn` pointers so the resulting resolution stays
/// `Send + Sync` with no extra bounds on the struct.
pub struct RecordBinding<T> {
	fields: Vec<RecordFieldResolution>,
	_marker: PhantomData<fn(&T)>,
}

impl<T: Bind> RecordBinding<T> {
	#[allow(clippy::new_without_default)]
	pub fn new() -> Self {
		Self {
			fields: Vec::new(),
			_marker: PhantomData,
		}
	}

	/// Declare a member, in any order; schema fields are matched to members
	/// by name (case-insensitive, underscore-insensitive)
	pub fn field<F: Bind>(mut self, name: &str, get: fn(&T) -> &F) -> Self {
		self.fields.push(RecordFieldResolution {
			name: BindingName::new(name),
			binding: Resolver::of::<F>(),
			get: Arc::new(move |value| get(downcast_ref::<T>(value)).as_bound()),
		});
		self
	}

	/// Finish with the closure that rebuilds the struct from decoded members
	pub fn construct(self, construct: fn(&mut FieldValues) -> Result<T, Error>) -> TypeResolution {
		TypeResolution::Record(RecordResolution {
			ty: TypeInfo::of::<T>(),
			fields: self.fields,
			construct: Arc::new(move |values| {
				construct(values).map(|record| Box::new(record) as ErasedValue)
			}),
		})
	}
}

/// The decoded members of one record value, keyed by the names declared on
/// its [`RecordBinding`]
pub struct FieldValues {
	names: Arc<[String]>,
	slots: Vec<Option<ErasedValue>>,
}

impl FieldValues {
	pub(crate) fn new(names: Arc<[String]>) -> Self {
		let slots = (0..names.len()).map(|_| None).collect();
		Self { names, slots }
	}

	pub(crate) fn put(&mut self, idx: usize, value: ErasedValue) {
		debug_assert!(self.slots[idx].is_none(), "record member decoded twice");
		self.slots[idx] = Some(value);
	}

	/// Move one decoded member out, by its declared name
	pub fn take<F: Bind>(&mut self, name: &str) -> Result<F, Error> {
		let idx = self
			.names
			.iter()
			.position(|n| n == name)
			.ok_or_else(|| {
				Error::custom(
					ErrorKind::UnsupportedType,
					format_args!("record constructor requested undeclared member {name:?}"),
				)
			})?;
		let value = self.slots[idx].take().ok_or_else(|| {
			Error::custom(
				ErrorKind::UnsupportedType,
				format_args!("record constructor requested member {name:?} twice"),
			)
		})?;
		F::from_erased(value)
	}
}

/// Describes a C-like enum as an enum resolution
///
/// Symbols are matched to schema symbols by name; the schema's declaration
/// order provides the wire indices.
pub struct EnumBinding<T> {
	symbols: Vec<EnumSymbolResolution>,
	_marker: PhantomData<fn(&T)>,
}

impl<T> EnumBinding<T>
where
	T: Bind + PartialEq + Clone + Send + Sync,
{
	#[allow(clippy::new_without_default)]
	pub fn new() -> Self {
		Self {
			symbols: Vec::new(),
			_marker: PhantomData,
		}
	}

	pub fn symbol(mut self, name: &str, value: T) -> Self {
		let witness = value.clone();
		self.symbols.push(EnumSymbolResolution {
			name: BindingName::new(name),
			is: Arc::new(move |candidate| downcast_ref::<T>(candidate) == &witness),
			make: Arc::new(move || Box::new(value.clone()) as ErasedValue),
		});
		self
	}

	pub fn finish(self) -> TypeResolution {
		TypeResolution::Enum(EnumResolution {
			ty: TypeInfo::of::<T>(),
			symbols: self.symbols,
		})
	}
}

/// Describes a Rust enum with payloads as a union resolution
///
/// Each variant pairs a projection (is the runtime value this variant, and
/// if so where is its payload) with a lift (wrap a decoded payload back
/// into the enum). The codec builder matches variants to union branches at
/// build time and compiles a runtime dispatch chain from the projections.
pub struct UnionBinding<T> {
	variants: Vec<UnionVariantResolution>,
	_marker: PhantomData<fn(&T)>,
}

impl<T: Bind> UnionBinding<T> {
	#[allow(clippy::new_without_default)]
	pub fn new() -> Self {
		Self {
			variants: Vec::new(),
			_marker: PhantomData,
		}
	}

	pub fn variant<F: Bind>(
		mut self,
		name: &str,
		project: fn(&T) -> Option<&F>,
		lift: fn(F) -> T,
	) -> Self {
		self.variants.push(UnionVariantResolution {
			name: BindingName::new(name),
			binding: Resolver::of::<F>(),
			project: Arc::new(move |value| {
				project(downcast_ref::<T>(value)).map(Bind::as_bound)
			}),
			lift: Arc::new(move |payload| {
				Ok(Box::new(lift(F::from_erased(payload)?)) as ErasedValue)
			}),
		});
		self
	}

	pub fn finish(self) -> TypeResolution {
		TypeResolution::Union(UnionResolution {
			ty: TypeInfo::of::<T>(),
			variants: self.variants,
		})
	}
}
