//! The [`Bind`] trait and its implementations for std and ecosystem types

use super::{
	downcast_mut, downcast_ref, ArrayResolution, DecimalResolution, DurationParts,
	DurationResolution, ErasedValue, MapResolution, NullableResolution, PrimitiveKind,
	PrimitiveResolution, Resolver, TimestampResolution, TypeInfo, TypeResolution, MILLIS_PER_DAY,
};
use crate::error::{Error, ErrorKind};

use std::{
	any::Any,
	borrow::Cow,
	collections::{BTreeMap, BTreeSet, HashMap, VecDeque},
	sync::Arc,
	time::{SystemTime, UNIX_EPOCH},
};

use chrono::{DateTime, SecondsFormat, Utc};

/// A type the codec builder can pair with a schema
///
/// This is the resolution entry point: `T::resolution()` describes the
/// shape of `T` and how to traverse and construct it. Records, enums and
/// union enums implement it through the [`RecordBinding`](super::RecordBinding),
/// [`EnumBinding`](super::EnumBinding) and [`UnionBinding`](super::UnionBinding)
/// builders:
///
/// ```
/// use avro_bind::{Bind, RecordBinding, TypeResolution};
///
/// struct Point {
/// 	x: i32,
/// 	y: i32,
/// }
///
/// impl Bind for Point {
/// 	fn resolution() -> TypeResolution {
/// 		RecordBinding::<Point>::new()
/// 			.field("x", |p| &p.x)
/// 			.field("y", |p| &p.y)
/// 			.construct(|f| {
/// 				Ok(Point {
/// 					x: f.take("x")?,
/// 					y: f.take("y")?,
/// 				})
/// 			})
/// 	}
/// }
/// ```
pub trait Bind: Sized + 'static {
	/// Describe this type to the builder
	fn resolution() -> TypeResolution;

	/// The value as seen through the resolution
	///
	/// Smart pointers resolve to their pointee's resolution and deref here,
	/// so compiled codecs always receive the pointee.
	fn as_bound(&self) -> &dyn Any {
		self
	}

	/// Recover a value from what the compiled decoder produced
	fn from_erased(value: ErasedValue) -> Result<Self, Error> {
		match value.downcast::<Self>() {
			Ok(boxed) => Ok(*boxed),
			Err(_) => unreachable!("compiled decoder produced a value of the wrong type"),
		}
	}
}

/// A `bytes`-schema payload
///
/// `Vec<u8>` resolves as a sequence of integers (an `array` of `int`s on
/// the wire); wrap it in `Bytes` to bind it to the `bytes` and `fixed`
/// schemas instead.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bytes(pub Vec<u8>);

impl Bytes {
	pub fn into_inner(self) -> Vec<u8> {
		self.0
	}
}

impl From<Vec<u8>> for Bytes {
	fn from(bytes: Vec<u8>) -> Self {
		Self(bytes)
	}
}

impl std::ops::Deref for Bytes {
	type Target = [u8];
	fn deref(&self) -> &[u8] {
		&self.0
	}
}

macro_rules! bind_primitive {
	($($ty:ty => $kind:ident,)*) => {
		$(
			impl Bind for $ty {
				fn resolution() -> TypeResolution {
					TypeResolution::Primitive(PrimitiveResolution {
						ty: TypeInfo::of::<$ty>(),
						kind: PrimitiveKind::$kind,
					})
				}
			}
		)*
	};
}

bind_primitive! {
	() => Unit,
	bool => Bool,
	i8 => I8,
	i16 => I16,
	i32 => I32,
	i64 => I64,
	u8 => U8,
	u16 => U16,
	u32 => U32,
	u64 => U64,
	f32 => F32,
	f64 => F64,
	String => Str,
	Bytes => Bytes,
	uuid::Uuid => Uuid,
	url::Url => Url,
}

impl<T: Bind> Bind for Option<T> {
	fn resolution() -> TypeResolution {
		TypeResolution::Nullable(NullableResolution {
			ty: TypeInfo::of::<Self>(),
			inner: Resolver::of::<T>(),
			project: Arc::new(|value| {
				downcast_ref::<Option<T>>(value).as_ref().map(Bind::as_bound)
			}),
			lift: Arc::new(|value| {
				Ok(Box::new(match value {
					None => None::<T>,
					Some(inner) => Some(T::from_erased(inner)?),
				}) as ErasedValue)
			}),
		})
	}
}

impl<T: Bind> Bind for Box<T> {
	fn resolution() -> TypeResolution {
		T::resolution()
	}

	fn as_bound(&self) -> &dyn Any {
		(**self).as_bound()
	}

	fn from_erased(value: ErasedValue) -> Result<Self, Error> {
		T::from_erased(value).map(Box::new)
	}
}

impl<T: Bind> Bind for Arc<T> {
	fn resolution() -> TypeResolution {
		T::resolution()
	}

	fn as_bound(&self) -> &dyn Any {
		(**self).as_bound()
	}

	fn from_erased(value: ErasedValue) -> Result<Self, Error> {
		T::from_erased(value).map(Arc::new)
	}
}

impl<T: Bind> Bind for Vec<T> {
	fn resolution() -> TypeResolution {
		TypeResolution::Array(ArrayResolution {
			ty: TypeInfo::of::<Self>(),
			item: Resolver::of::<T>(),
			len: Arc::new(|value| downcast_ref::<Vec<T>>(value).len()),
			visit: Arc::new(|value, visitor| {
				for item in downcast_ref::<Vec<T>>(value) {
					visitor(item.as_bound())?;
				}
				Ok(())
			}),
			empty: Arc::new(|capacity| Box::new(Vec::<T>::with_capacity(capacity))),
			push: Arc::new(|container, item| {
				downcast_mut::<Vec<T>>(container).push(T::from_erased(item)?);
				Ok(())
			}),
		})
	}
}

impl<T: Bind> Bind for VecDeque<T> {
	fn resolution() -> TypeResolution {
		TypeResolution::Array(ArrayResolution {
			ty: TypeInfo::of::<Self>(),
			item: Resolver::of::<T>(),
			len: Arc::new(|value| downcast_ref::<VecDeque<T>>(value).len()),
			visit: Arc::new(|value, visitor| {
				for item in downcast_ref::<VecDeque<T>>(value) {
					visitor(item.as_bound())?;
				}
				Ok(())
			}),
			empty: Arc::new(|capacity| Box::new(VecDeque::<T>::with_capacity(capacity))),
			push: Arc::new(|container, item| {
				downcast_mut::<VecDeque<T>>(container).push_back(T::from_erased(item)?);
				Ok(())
			}),
		})
	}
}

/// Sets bind as arrays; encode order is the set's iteration order, decode
/// collapses duplicates the way the set itself does
impl<T: Bind + Ord> Bind for BTreeSet<T> {
	fn resolution() -> TypeResolution {
		TypeResolution::Array(ArrayResolution {
			ty: TypeInfo::of::<Self>(),
			item: Resolver::of::<T>(),
			len: Arc::new(|value| downcast_ref::<BTreeSet<T>>(value).len()),
			visit: Arc::new(|value, visitor| {
				for item in downcast_ref::<BTreeSet<T>>(value) {
					visitor(item.as_bound())?;
				}
				Ok(())
			}),
			empty: Arc::new(|_capacity| Box::new(BTreeSet::<T>::new())),
			push: Arc::new(|container, item| {
				downcast_mut::<BTreeSet<T>>(container).insert(T::from_erased(item)?);
				Ok(())
			}),
		})
	}
}

/// A map-key type, convertible to and from the string form Avro requires
///
/// Conversions are culture-invariant: integers use plain decimal digits, no
/// separators.
pub trait MapKey: Sized + 'static {
	fn as_key(&self) -> Cow<'_, str>;
	fn from_key(key: String) -> Result<Self, Error>;
}

impl MapKey for String {
	fn as_key(&self) -> Cow<'_, str> {
		Cow::Borrowed(self)
	}

	fn from_key(key: String) -> Result<Self, Error> {
		Ok(key)
	}
}

macro_rules! map_key_integer {
	($($ty:ty)*) => {
		$(
			impl MapKey for $ty {
				fn as_key(&self) -> Cow<'_, str> {
					Cow::Owned(self.to_string())
				}

				fn from_key(key: String) -> Result<Self, Error> {
					key.parse().map_err(|e| {
						Error::custom(
							ErrorKind::Conversion,
							format_args!("map key {key:?} is not a valid integer: {e}"),
						)
					})
				}
			}
		)*
	};
}

map_key_integer! { i8 i16 i32 i64 u8 u16 u32 u64 }

impl MapKey for uuid::Uuid {
	fn as_key(&self) -> Cow<'_, str> {
		Cow::Owned(self.to_string())
	}

	fn from_key(key: String) -> Result<Self, Error> {
		key.parse().map_err(|e| {
			Error::custom(
				ErrorKind::Conversion,
				format_args!("map key {key:?} is not a valid uuid: {e}"),
			)
		})
	}
}

macro_rules! bind_map {
	($container:ident, $($extra_bounds:tt)*) => {
		impl<K, V> Bind for $container<K, V>
		where
			K: MapKey + $($extra_bounds)*,
			V: Bind,
		{
			fn resolution() -> TypeResolution {
				TypeResolution::Map(MapResolution {
					ty: TypeInfo::of::<Self>(),
					value: Resolver::of::<V>(),
					len: Arc::new(|value| downcast_ref::<$container<K, V>>(value).len()),
					visit: Arc::new(|value, visitor| {
						for (key, item) in downcast_ref::<$container<K, V>>(value) {
							visitor(&key.as_key(), item.as_bound())?;
						}
						Ok(())
					}),
					empty: Arc::new(|_capacity| Box::new($container::<K, V>::new())),
					insert: Arc::new(|container, key, item| {
						downcast_mut::<$container<K, V>>(container)
							.insert(K::from_key(key)?, V::from_erased(item)?);
						Ok(())
					}),
				})
			}
		}
	};
}

bind_map!(HashMap, Eq + std::hash::Hash);
bind_map!(BTreeMap, Ord);

impl Bind for std::time::Duration {
	fn resolution() -> TypeResolution {
		TypeResolution::Duration(DurationResolution {
			ty: TypeInfo::of::<Self>(),
			as_millis: Arc::new(|value| {
				Ok(downcast_ref::<std::time::Duration>(value).as_millis())
			}),
			from_parts: Arc::new(|parts| {
				let millis = duration_parts_to_millis(parts)?;
				let millis: u64 = millis.try_into().map_err(|_| {
					Error::new(
						ErrorKind::Conversion,
						"decoded duration overflows std::time::Duration",
					)
				})?;
				Ok(Box::new(std::time::Duration::from_millis(millis)) as ErasedValue)
			}),
			format_iso: Arc::new(|value| {
				Ok(format_iso_period(
					downcast_ref::<std::time::Duration>(value).as_millis(),
				))
			}),
			parse_iso: Arc::new(|text| {
				let millis = parse_iso_period(text)?;
				let millis: u64 = millis.try_into().map_err(|_| {
					Error::new(
						ErrorKind::Conversion,
						"parsed duration overflows std::time::Duration",
					)
				})?;
				Ok(Box::new(std::time::Duration::from_millis(millis)) as ErasedValue)
			}),
		})
	}
}

impl Bind for chrono::Duration {
	fn resolution() -> TypeResolution {
		TypeResolution::Duration(DurationResolution {
			ty: TypeInfo::of::<Self>(),
			as_millis: Arc::new(|value| {
				let millis = downcast_ref::<chrono::Duration>(value).num_milliseconds();
				u128::try_from(millis).map_err(|_| {
					Error::new(
						ErrorKind::Conversion,
						"negative durations have no avro duration form",
					)
				})
			}),
			from_parts: Arc::new(|parts| {
				let millis = duration_parts_to_millis(parts)?;
				let millis: i64 = millis.try_into().map_err(|_| {
					Error::new(
						ErrorKind::Conversion,
						"decoded duration overflows chrono::Duration",
					)
				})?;
				Ok(Box::new(chrono::Duration::milliseconds(millis)) as ErasedValue)
			}),
			format_iso: Arc::new(|value| {
				let millis = downcast_ref::<chrono::Duration>(value).num_milliseconds();
				let millis = u128::try_from(millis).map_err(|_| {
					Error::new(
						ErrorKind::Conversion,
						"negative durations have no iso period form here",
					)
				})?;
				Ok(format_iso_period(millis))
			}),
			parse_iso: Arc::new(|text| {
				let millis = parse_iso_period(text)?;
				let millis: i64 = millis.try_into().map_err(|_| {
					Error::new(
						ErrorKind::Conversion,
						"parsed duration overflows chrono::Duration",
					)
				})?;
				Ok(Box::new(chrono::Duration::milliseconds(millis)) as ErasedValue)
			}),
		})
	}
}

fn duration_parts_to_millis(parts: DurationParts) -> Result<u128, Error> {
	if parts.months != 0 {
		return Err(Error::custom(
			ErrorKind::Conversion,
			format_args!(
				"decoded duration carries {} calendar month(s), which this target type \
					cannot represent",
				parts.months
			),
		));
	}
	Ok(u128::from(parts.days) * MILLIS_PER_DAY + u128::from(parts.milliseconds))
}

const TICKS_PER_SECOND: i128 = 10_000_000;

impl Bind for DateTime<Utc> {
	fn resolution() -> TypeResolution {
		TypeResolution::Timestamp(TimestampResolution {
			ty: TypeInfo::of::<Self>(),
			as_ticks: Arc::new(|value| Ok(datetime_ticks(downcast_ref::<DateTime<Utc>>(value)))),
			from_ticks: Arc::new(|ticks| {
				datetime_from_ticks(ticks).map(|dt| Box::new(dt) as ErasedValue)
			}),
			format_iso: Arc::new(|value| {
				Ok(downcast_ref::<DateTime<Utc>>(value)
					.to_rfc3339_opts(SecondsFormat::AutoSi, true))
			}),
			parse_iso: Arc::new(|text| {
				parse_iso_instant(text).map(|dt| Box::new(dt) as ErasedValue)
			}),
		})
	}
}

/// Treated as an instant in UTC, the convention Avro timestamps carry
impl Bind for chrono::NaiveDateTime {
	fn resolution() -> TypeResolution {
		TypeResolution::Timestamp(TimestampResolution {
			ty: TypeInfo::of::<Self>(),
			as_ticks: Arc::new(|value| {
				Ok(datetime_ticks(
					&downcast_ref::<chrono::NaiveDateTime>(value).and_utc(),
				))
			}),
			from_ticks: Arc::new(|ticks| {
				datetime_from_ticks(ticks).map(|dt| Box::new(dt.naive_utc()) as ErasedValue)
			}),
			format_iso: Arc::new(|value| {
				Ok(downcast_ref::<chrono::NaiveDateTime>(value)
					.and_utc()
					.to_rfc3339_opts(SecondsFormat::AutoSi, true))
			}),
			parse_iso: Arc::new(|text| {
				parse_iso_instant(text).map(|dt| Box::new(dt.naive_utc()) as ErasedValue)
			}),
		})
	}
}

impl Bind for SystemTime {
	fn resolution() -> TypeResolution {
		TypeResolution::Timestamp(TimestampResolution {
			ty: TypeInfo::of::<Self>(),
			as_ticks: Arc::new(|value| {
				Ok(system_time_ticks(downcast_ref::<SystemTime>(value)))
			}),
			from_ticks: Arc::new(|ticks| {
				system_time_from_ticks(ticks).map(|st| Box::new(st) as ErasedValue)
			}),
			format_iso: Arc::new(|value| {
				let dt = DateTime::<Utc>::from(*downcast_ref::<SystemTime>(value));
				Ok(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
			}),
			parse_iso: Arc::new(|text| {
				parse_iso_instant(text).map(|dt| Box::new(SystemTime::from(dt)) as ErasedValue)
			}),
		})
	}
}

fn datetime_ticks(dt: &DateTime<Utc>) -> i128 {
	i128::from(dt.timestamp()) * TICKS_PER_SECOND + i128::from(dt.timestamp_subsec_nanos() / 100)
}

fn datetime_from_ticks(ticks: i128) -> Result<DateTime<Utc>, Error> {
	let seconds = ticks.div_euclid(TICKS_PER_SECOND);
	let sub_second_ticks = ticks.rem_euclid(TICKS_PER_SECOND);
	let seconds: i64 = seconds.try_into().map_err(|_| {
		Error::new(
			ErrorKind::Conversion,
			"decoded timestamp is outside the representable datetime range",
		)
	})?;
	DateTime::from_timestamp(seconds, (sub_second_ticks * 100) as u32).ok_or_else(|| {
		Error::new(
			ErrorKind::Conversion,
			"decoded timestamp is outside the representable datetime range",
		)
	})
}

fn system_time_ticks(time: &SystemTime) -> i128 {
	match time.duration_since(UNIX_EPOCH) {
		Ok(since) => (since.as_nanos() / 100) as i128,
		Err(before) => -((before.duration().as_nanos() / 100) as i128),
	}
}

fn system_time_from_ticks(ticks: i128) -> Result<SystemTime, Error> {
	let out_of_range =
		|| Error::new(ErrorKind::Conversion, "decoded timestamp is outside SystemTime range");
	let nanos = ticks.unsigned_abs().checked_mul(100).ok_or_else(out_of_range)?;
	let seconds: u64 = (nanos / 1_000_000_000).try_into().map_err(|_| out_of_range())?;
	let offset = std::time::Duration::new(seconds, (nanos % 1_000_000_000) as u32);
	if ticks >= 0 {
		UNIX_EPOCH.checked_add(offset).ok_or_else(out_of_range)
	} else {
		UNIX_EPOCH.checked_sub(offset).ok_or_else(out_of_range)
	}
}

fn parse_iso_instant(text: &str) -> Result<DateTime<Utc>, Error> {
	DateTime::parse_from_rfc3339(text)
		.map(|dt| dt.with_timezone(&Utc))
		.map_err(|e| {
			Error::custom(
				ErrorKind::Conversion,
				format_args!("{text:?} is not an iso-8601 instant: {e}"),
			)
		})
}

impl Bind for rust_decimal::Decimal {
	fn resolution() -> TypeResolution {
		TypeResolution::Decimal(DecimalResolution {
			ty: TypeInfo::of::<Self>(),
			as_decimal: Arc::new(|value| Ok(*downcast_ref::<rust_decimal::Decimal>(value))),
			from_decimal: Arc::new(|decimal| Ok(Box::new(decimal) as ErasedValue)),
		})
	}
}

/// Format a millisecond count as an ISO-8601 period (`P3DT4H5M6.007S`)
fn format_iso_period(total_millis: u128) -> String {
	use std::fmt::Write as _;

	if total_millis == 0 {
		return "PT0S".to_owned();
	}
	let days = total_millis / MILLIS_PER_DAY;
	let rem = total_millis % MILLIS_PER_DAY;
	let hours = rem / 3_600_000;
	let rem = rem % 3_600_000;
	let minutes = rem / 60_000;
	let rem = rem % 60_000;
	let seconds = rem / 1000;
	let millis = rem % 1000;

	let mut out = String::from("P");
	if days > 0 {
		write!(out, "{days}D").expect("writing to a String cannot fail");
	}
	if hours > 0 || minutes > 0 || seconds > 0 || millis > 0 {
		out.push('T');
		if hours > 0 {
			write!(out, "{hours}H").expect("writing to a String cannot fail");
		}
		if minutes > 0 {
			write!(out, "{minutes}M").expect("writing to a String cannot fail");
		}
		if millis > 0 {
			write!(out, "{seconds}.{millis:03}S").expect("writing to a String cannot fail");
		} else if seconds > 0 {
			write!(out, "{seconds}S").expect("writing to a String cannot fail");
		}
	}
	out
}

/// Parse the subset of ISO-8601 periods that carries no calendar component:
/// `P[nD][T[nH][nM][n[.fff]S]]`
fn parse_iso_period(text: &str) -> Result<u128, Error> {
	let bad = |why: &str| {
		Error::custom(
			ErrorKind::Conversion,
			format_args!("{text:?} is not a supported iso-8601 period: {why}"),
		)
	};

	let rest = text.strip_prefix('P').ok_or_else(|| bad("missing P prefix"))?;
	if rest.is_empty() {
		return Err(bad("empty period"));
	}
	let (date_part, time_part) = match rest.split_once('T') {
		Some((date, time)) => (date, Some(time)),
		None => (rest, None),
	};

	let mut total: u128 = 0;
	let mut add = |amount: u128, unit_millis: u128| -> Result<(), Error> {
		total = amount
			.checked_mul(unit_millis)
			.and_then(|add| total.checked_add(add))
			.ok_or_else(|| {
				Error::new(ErrorKind::Conversion, "iso-8601 period overflows the millisecond form")
			})?;
		Ok(())
	};

	let mut chars = date_part.chars().peekable();
	while chars.peek().is_some() {
		let number = take_number(&mut chars).ok_or_else(|| bad("expected a number"))?;
		match chars.next() {
			Some('D') => add(number, MILLIS_PER_DAY)?,
			Some('Y') | Some('M') | Some('W') => {
				return Err(bad("calendar components cannot be represented by this target type"));
			}
			_ => return Err(bad("unknown date designator")),
		}
	}

	if let Some(time_part) = time_part {
		if time_part.is_empty() {
			return Err(bad("empty time part"));
		}
		let mut chars = time_part.chars().peekable();
		while chars.peek().is_some() {
			let number = take_number(&mut chars).ok_or_else(|| bad("expected a number"))?;
			match chars.next() {
				Some('H') => add(number, 3_600_000)?,
				Some('M') => add(number, 60_000)?,
				Some('S') => add(number, 1000)?,
				Some('.') => {
					add(number, 1000)?;
					let mut fraction = 0u128;
					let mut digits = 0u32;
					while let Some(c) = chars.peek().copied().filter(|c| c.is_ascii_digit()) {
						chars.next();
						if digits >= 3 {
							if c != '0' {
								return Err(bad(
									"sub-millisecond precision cannot be represented by this \
										target type",
								));
							}
							continue;
						}
						fraction = fraction * 10 + u128::from(c as u8 - b'0');
						digits += 1;
					}
					while digits < 3 {
						fraction *= 10;
						digits += 1;
					}
					if chars.next() != Some('S') {
						return Err(bad("fraction must be followed by S"));
					}
					add(fraction, 1)?;
				}
				_ => return Err(bad("unknown time designator")),
			}
		}
	}

	Ok(total)
}

fn take_number(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<u128> {
	let mut number: Option<u128> = None;
	while let Some(digit) = chars.peek().copied().filter(|c| c.is_ascii_digit()) {
		chars.next();
		number = Some(
			number
				.unwrap_or(0)
				.saturating_mul(10)
				.saturating_add(u128::from(digit as u8 - b'0')),
		);
	}
	number
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn iso_period_formats() {
		assert_eq!(format_iso_period(0), "PT0S");
		assert_eq!(format_iso_period(1000), "PT1S");
		assert_eq!(format_iso_period(1500), "PT1.500S");
		assert_eq!(format_iso_period(61_000), "PT1M1S");
		assert_eq!(
			format_iso_period(3 * MILLIS_PER_DAY + 4 * 3_600_000 + 5 * 60_000 + 6007),
			"P3DT4H5M6.007S"
		);
		assert_eq!(format_iso_period(2 * MILLIS_PER_DAY), "P2D");
	}

	#[test]
	fn iso_period_parses_what_it_formats() {
		for millis in [0u128, 1, 999, 1000, 1500, 61_000, 90_061_500, 3 * MILLIS_PER_DAY + 42] {
			assert_eq!(parse_iso_period(&format_iso_period(millis)).unwrap(), millis);
		}
	}

	#[test]
	fn iso_period_rejects_calendar_components() {
		assert!(parse_iso_period("P1Y").is_err());
		assert!(parse_iso_period("P1M").is_err());
		// minutes in the time part are fine
		assert_eq!(parse_iso_period("PT1M").unwrap(), 60_000);
	}

	#[test]
	fn iso_period_rejects_garbage() {
		assert!(parse_iso_period("").is_err());
		assert!(parse_iso_period("P").is_err());
		assert!(parse_iso_period("PT").is_err());
		assert!(parse_iso_period("P1X").is_err());
		assert!(parse_iso_period("PT1.5").is_err());
	}

	#[test]
	fn ticks_round_trip_through_datetime() {
		for ticks in [0i128, 1, -1, 15_000_000, -15_000_000, 1_234_567_890_123_456] {
			let dt = datetime_from_ticks(ticks).unwrap();
			assert_eq!(datetime_ticks(&dt), ticks);
		}
	}

	#[test]
	fn ticks_round_trip_through_system_time() {
		for ticks in [0i128, 1, -10, 15_000_000, 1_234_567_890_123_456] {
			let st = system_time_from_ticks(ticks).unwrap();
			assert_eq!(system_time_ticks(&st), ticks);
		}
	}
}
