//! Compiling a (schema, type) pair into encode and decode closures
//!
//! [`build_encoder`] and [`build_decoder`] walk the schema and the
//! [`TypeResolution`](crate::resolution::TypeResolution) of the target type
//! together, dispatching every (schema node, resolution) pair to an ordered
//! registry of rules (see [`cases`]). The result is a pair of erased
//! closures wrapped in the typed [`Encoder`] / [`Decoder`] handles.
//!
//! Compilation maintains a cache of one closure per (type, schema node)
//! pair. Recursive records are compiled through a forward reference: a
//! closure reading a shared slot is cached before the record body is
//! compiled, so the body's own sub-builds find the reference instead of
//! recursing forever. A [`BindingCache`] may be shared across builds (and
//! threads); a build only publishes into it on success, and when two builds
//! race on the same pair exactly one compiled closure is retained.

pub(crate) mod cases;

use crate::{
	error::{Error, ErrorKind},
	resolution::{Bind, ErasedValue, Resolver, TypeResolution},
	rw::{Sink, SliceSource, Source},
	schema::{Schema, SchemaKey},
};

use std::{
	any::{Any, TypeId},
	cell::RefCell,
	collections::HashMap,
	marker::PhantomData,
	sync::{Arc, Mutex},
};

pub(crate) type EncodeFn = Arc<dyn Fn(&dyn Any, &mut dyn Sink) -> Result<(), Error> + Send + Sync>;
pub(crate) type DecodeFn =
	Arc<dyn Fn(&mut dyn Source) -> Result<ErasedValue, Error> + Send + Sync>;

/// Build an [`Encoder`] for `T` against the root of `schema`
///
/// One-shot form of [`Binder::encoder`].
pub fn build_encoder<T: Bind>(schema: &Schema) -> Result<Encoder<T>, Error> {
	Binder::new(schema).encoder()
}

/// Build a [`Decoder`] for `T` against the root of `schema`
///
/// One-shot form of [`Binder::decoder`].
pub fn build_decoder<T: Bind>(schema: &Schema) -> Result<Decoder<T>, Error> {
	Binder::new(schema).decoder()
}

/// Configures codec compilation against one schema
///
/// ```
/// let schema = avro_bind::Schema::from_node(avro_bind::schema::SchemaNode::Long).unwrap();
/// let cache = avro_bind::BindingCache::new();
/// let encoder = avro_bind::Binder::new(&schema)
/// 	.with_cache(&cache)
/// 	.encoder::<i64>()
/// 	.unwrap();
/// let mut buf = Vec::new();
/// encoder.encode(&150, &mut buf).unwrap();
/// assert_eq!(buf, [0xAC, 0x02]);
/// ```
pub struct Binder<'a> {
	schema: &'a Schema,
	cache: Option<&'a BindingCache>,
}

impl<'a> Binder<'a> {
	pub fn new(schema: &'a Schema) -> Self {
		Self {
			schema,
			cache: None,
		}
	}

	/// Share compiled closures with other builds through `cache`
	pub fn with_cache(mut self, cache: &'a BindingCache) -> Self {
		self.cache = Some(cache);
		self
	}

	pub fn encoder<T: Bind>(&self) -> Result<Encoder<T>, Error> {
		let ctx = BuildContext::new(self.schema, self.cache);
		let erased = ctx.encoder(self.schema.root_key(), &Resolver::of::<T>())?;
		ctx.publish();
		Ok(Encoder {
			erased,
			_marker: PhantomData,
		})
	}

	pub fn decoder<T: Bind>(&self) -> Result<Decoder<T>, Error> {
		let ctx = BuildContext::new(self.schema, self.cache);
		let erased = ctx.decoder(self.schema.root_key(), &Resolver::of::<T>())?;
		ctx.publish();
		Ok(Decoder {
			erased,
			_marker: PhantomData,
		})
	}
}

/// A compiled encode closure for values of type `T`
///
/// Cheap to clone; pure function of `(value, sink)` with no state between
/// calls, so one encoder may be used from several threads at once.
pub struct Encoder<T> {
	erased: EncodeFn,
	_marker: PhantomData<fn(&T)>,
}

impl<T> std::fmt::Debug for Encoder<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Encoder").finish()
	}
}

impl<T> Clone for Encoder<T> {
	fn clone(&self) -> Self {
		Self {
			erased: Arc::clone(&self.erased),
			_marker: PhantomData,
		}
	}
}

impl<T: Bind> Encoder<T> {
	pub fn encode<S: Sink>(&self, value: &T, sink: &mut S) -> Result<(), Error> {
		(self.erased)(value.as_bound(), sink)
	}

	pub fn encode_to_vec(&self, value: &T) -> Result<Vec<u8>, Error> {
		let mut buf = Vec::new();
		self.encode(value, &mut buf)?;
		Ok(buf)
	}
}

/// A compiled decode closure producing values of type `T`
///
/// Cheap to clone; pure function of the source, usable from several threads
/// at once.
pub struct Decoder<T> {
	erased: DecodeFn,
	_marker: PhantomData<fn() -> T>,
}

impl<T> std::fmt::Debug for Decoder<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Decoder").finish()
	}
}

impl<T> Clone for Decoder<T> {
	fn clone(&self) -> Self {
		Self {
			erased: Arc::clone(&self.erased),
			_marker: PhantomData,
		}
	}
}

impl<T: Bind> Decoder<T> {
	pub fn decode<S: Source>(&self, source: &mut S) -> Result<T, Error> {
		T::from_erased((self.erased)(source)?)
	}

	/// Decode from the start of `slice`
	///
	/// Trailing bytes are not an error; use [`Self::decode`] with a
	/// [`SliceSource`] to observe how much input was consumed.
	pub fn decode_slice(&self, slice: &[u8]) -> Result<T, Error> {
		self.decode(&mut SliceSource::new(slice))
	}
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub(crate) struct CacheKey {
	ty: TypeId,
	schema: u64,
	node: usize,
}

/// Compiled-closure cache, shareable across builds and threads
///
/// Keys are (target type, schema instance, schema node); insertion is
/// at-most-once, so when two builds compile the same pair concurrently
/// exactly one closure is retained and the loser is discarded. A failed
/// build publishes nothing.
#[derive(Default)]
pub struct BindingCache {
	encoders: Mutex<HashMap<CacheKey, EncodeFn>>,
	decoders: Mutex<HashMap<CacheKey, DecodeFn>>,
}

impl BindingCache {
	pub fn new() -> Self {
		Self::default()
	}

	/// How many closures are currently cached
	pub fn len(&self) -> usize {
		self.lock_encoders().len() + self.lock_decoders().len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn lock_encoders(&self) -> std::sync::MutexGuard<'_, HashMap<CacheKey, EncodeFn>> {
		self.encoders.lock().expect("binding cache lock poisoned")
	}

	fn lock_decoders(&self) -> std::sync::MutexGuard<'_, HashMap<CacheKey, DecodeFn>> {
		self.decoders.lock().expect("binding cache lock poisoned")
	}

	fn encoder(&self, key: CacheKey) -> Option<EncodeFn> {
		self.lock_encoders().get(&key).cloned()
	}

	fn decoder(&self, key: CacheKey) -> Option<DecodeFn> {
		self.lock_decoders().get(&key).cloned()
	}

	/// Insert unless present; the retained closure is returned either way
	fn retain_encoder(&self, key: CacheKey, codec: EncodeFn) -> EncodeFn {
		Arc::clone(self.lock_encoders().entry(key).or_insert(codec))
	}

	fn retain_decoder(&self, key: CacheKey, codec: DecodeFn) -> DecodeFn {
		Arc::clone(self.lock_decoders().entry(key).or_insert(codec))
	}

	fn remove(&self, key: CacheKey) {
		self.lock_encoders().remove(&key);
		self.lock_decoders().remove(&key);
	}
}

/// State of one compilation: the schema, the shared cache (if any) and the
/// build-local scratch cache
///
/// Everything compiled during the build lands in the scratch cache first,
/// journaled so that an abandoned sub-build (a union branch that did not
/// apply, a failed record) can be rolled back precisely. [`Self::publish`]
/// moves the scratch entries into the shared cache once the whole build has
/// succeeded.
pub(crate) struct BuildContext<'a> {
	pub(crate) schema: &'a Schema,
	shared: Option<&'a BindingCache>,
	scratch: BindingCache,
	journal: RefCell<Vec<CacheKey>>,
}

impl<'a> BuildContext<'a> {
	fn new(schema: &'a Schema, shared: Option<&'a BindingCache>) -> Self {
		Self {
			schema,
			shared,
			scratch: BindingCache::new(),
			journal: RefCell::new(Vec::new()),
		}
	}

	pub(crate) fn cache_key(&self, key: SchemaKey, resolution: &TypeResolution) -> CacheKey {
		CacheKey {
			ty: resolution.ty().id(),
			schema: self.schema.id(),
			node: key.idx(),
		}
	}

	/// Compile (or reuse) the encoder for `resolver` against the node at `key`
	pub(crate) fn encoder(&self, key: SchemaKey, resolver: &Resolver) -> Result<EncodeFn, Error> {
		let resolution = resolver.resolution();
		let cache_key = self.cache_key(key, &resolution);
		if let Some(hit) = self
			.shared
			.and_then(|shared| shared.encoder(cache_key))
			.or_else(|| self.scratch.encoder(cache_key))
		{
			tracing::trace!(
				ty = resolution.ty().name(),
				node = key.idx(),
				"reusing cached encoder"
			);
			return Ok(hit);
		}
		let node = self.schema.node(key);
		let mut failures = Vec::new();
		for case in cases::REGISTRY {
			match case.encoder(self, key, node, resolver, &resolution) {
				cases::CaseOutcome::Built(codec) => {
					tracing::trace!(
						case = case.name(),
						ty = resolution.ty().name(),
						node = key.idx(),
						"compiled encoder"
					);
					return Ok(self.insert_encoder(cache_key, codec));
				}
				cases::CaseOutcome::NoMatch => {}
				cases::CaseOutcome::Failed(error) => {
					tracing::trace!(case = case.name(), error = %error, "case did not apply");
					failures.push(error);
				}
			}
		}
		if failures.is_empty() {
			return Err(Error::custom(
				ErrorKind::UnsupportedSchema,
				format_args!("no rule recognizes a {} schema", node.kind_name()),
			));
		}
		Err(Error::aggregate(
			ErrorKind::UnsupportedType,
			format_args!(
				"no rule can encode {:?} as a {} schema",
				resolution,
				node.kind_name()
			),
			failures,
		))
	}

	/// Compile (or reuse) the decoder for `resolver` against the node at `key`
	pub(crate) fn decoder(&self, key: SchemaKey, resolver: &Resolver) -> Result<DecodeFn, Error> {
		let resolution = resolver.resolution();
		let cache_key = self.cache_key(key, &resolution);
		if let Some(hit) = self
			.shared
			.and_then(|shared| shared.decoder(cache_key))
			.or_else(|| self.scratch.decoder(cache_key))
		{
			tracing::trace!(
				ty = resolution.ty().name(),
				node = key.idx(),
				"reusing cached decoder"
			);
			return Ok(hit);
		}
		let node = self.schema.node(key);
		let mut failures = Vec::new();
		for case in cases::REGISTRY {
			match case.decoder(self, key, node, resolver, &resolution) {
				cases::CaseOutcome::Built(codec) => {
					tracing::trace!(
						case = case.name(),
						ty = resolution.ty().name(),
						node = key.idx(),
						"compiled decoder"
					);
					return Ok(self.insert_decoder(cache_key, codec));
				}
				cases::CaseOutcome::NoMatch => {}
				cases::CaseOutcome::Failed(error) => {
					tracing::trace!(case = case.name(), error = %error, "case did not apply");
					failures.push(error);
				}
			}
		}
		if failures.is_empty() {
			return Err(Error::custom(
				ErrorKind::UnsupportedSchema,
				format_args!("no rule recognizes a {} schema", node.kind_name()),
			));
		}
		Err(Error::aggregate(
			ErrorKind::UnsupportedType,
			format_args!(
				"no rule can decode a {} schema into {:?}",
				node.kind_name(),
				resolution
			),
			failures,
		))
	}

	fn insert_encoder(&self, key: CacheKey, codec: EncodeFn) -> EncodeFn {
		self.journal.borrow_mut().push(key);
		self.scratch.retain_encoder(key, codec)
	}

	fn insert_decoder(&self, key: CacheKey, codec: DecodeFn) -> DecodeFn {
		self.journal.borrow_mut().push(key);
		self.scratch.retain_decoder(key, codec)
	}

	/// Install a record forward reference ahead of compiling its body
	///
	/// Returns the already-cached closure instead when the pair is present
	/// (the installing build lost a race); installing twice from the same
	/// build is a programmer error caught by the caller's cache lookup.
	pub(crate) fn install_forward_encoder(
		&self,
		key: CacheKey,
		forward: EncodeFn,
	) -> Option<EncodeFn> {
		let existing = self.scratch.encoder(key);
		if existing.is_some() {
			return existing;
		}
		self.insert_encoder(key, forward);
		None
	}

	pub(crate) fn install_forward_decoder(
		&self,
		key: CacheKey,
		forward: DecodeFn,
	) -> Option<DecodeFn> {
		let existing = self.scratch.decoder(key);
		if existing.is_some() {
			return existing;
		}
		self.insert_decoder(key, forward);
		None
	}

	/// Position in the insertion journal, for [`Self::rollback_to`]
	pub(crate) fn journal_mark(&self) -> usize {
		self.journal.borrow().len()
	}

	/// Drop every scratch entry inserted since `mark`
	///
	/// Called when a speculative sub-build (union branch selection, record
	/// body) is abandoned, so that no closure referencing a never-bound
	/// forward reference can be observed by the rest of the build.
	pub(crate) fn rollback_to(&self, mark: usize) {
		let mut journal = self.journal.borrow_mut();
		for key in journal.drain(mark..) {
			self.scratch.remove(key);
		}
	}

	/// Move everything this build compiled into the shared cache
	fn publish(&self) {
		let Some(shared) = self.shared else { return };
		for (key, codec) in self.scratch.lock_encoders().drain() {
			shared.retain_encoder(key, codec);
		}
		for (key, codec) in self.scratch.lock_decoders().drain() {
			shared.retain_decoder(key, codec);
		}
	}
}
