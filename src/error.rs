//! The error type shared by the builder and the compiled codecs

use std::borrow::Cow;

/// Classification of everything that can go wrong while building a codec or
/// running one
///
/// Build-time failures ([`UnsupportedSchema`](ErrorKind::UnsupportedSchema),
/// [`UnsupportedType`](ErrorKind::UnsupportedType),
/// [`AmbiguousSymbol`](ErrorKind::AmbiguousSymbol),
/// [`AmbiguousField`](ErrorKind::AmbiguousField)) aggregate the per-case
/// causes that were collected while the registry was searched - see
/// [`Error::causes`]. Runtime failures propagate to the caller immediately:
/// the codecs never retry and never panic on schema-conforming input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ErrorKind {
	/// The schema shape is incompatible with this codec
	#[error("unsupported schema")]
	UnsupportedSchema,
	/// The target type cannot be paired with this schema
	#[error("unsupported type")]
	UnsupportedType,
	/// A runtime value exceeds the representable range of the target type or
	/// of an intermediate form
	#[error("conversion out of range")]
	Conversion,
	/// A fixed-size constraint was violated
	#[error("size mismatch")]
	SizeMismatch,
	/// Two schema symbols match the same resolution symbol (or conversely)
	#[error("ambiguous symbol")]
	AmbiguousSymbol,
	/// Two record members match the same schema field (or conversely)
	#[error("ambiguous field")]
	AmbiguousField,
	/// Varint decoding exceeded its 10-byte bound
	#[error("varint overflow")]
	Overflow,
	/// The input stream is malformed (unknown union index, bad block count...)
	#[error("malformed input")]
	Wire,
	/// The source was exhausted in the middle of a value
	#[error("unexpected end of input")]
	Eof,
	/// A string on the wire is not valid UTF-8
	#[error("invalid utf-8")]
	Utf8,
	/// A union encoder reached a runtime value no branch was compiled for
	#[error("no dispatch for runtime type")]
	Dispatch,
	/// An I/O error surfaced by the sink or source
	#[error("io error")]
	Io,
}

/// Any error that may happen while building or running a codec
#[derive(thiserror::Error)]
#[error("{}: {}", inner.kind, inner.message)]
pub struct Error {
	inner: Box<ErrorInner>,
}

struct ErrorInner {
	kind: ErrorKind,
	message: Cow<'static, str>,
	io_error: Option<std::io::Error>,
	causes: Vec<Error>,
}

impl Error {
	/// If you need a dynamic string use `Error::custom(kind, format_args!(...))`
	pub(crate) fn new(kind: ErrorKind, message: &'static str) -> Self {
		Self {
			inner: Box::new(ErrorInner {
				kind,
				message: Cow::Borrowed(message),
				io_error: None,
				causes: Vec::new(),
			}),
		}
	}

	pub(crate) fn custom(kind: ErrorKind, message: impl std::fmt::Display) -> Self {
		Self {
			inner: Box::new(ErrorInner {
				kind,
				message: Cow::Owned(message.to_string()),
				io_error: None,
				causes: Vec::new(),
			}),
		}
	}

	pub(crate) fn io(io_error: std::io::Error) -> Self {
		if io_error.kind() == std::io::ErrorKind::UnexpectedEof {
			return Self::eof();
		}
		Self {
			inner: Box::new(ErrorInner {
				kind: ErrorKind::Io,
				message: Cow::Borrowed("encountered io error when reading or writing"),
				io_error: Some(io_error),
				causes: Vec::new(),
			}),
		}
	}

	pub(crate) fn eof() -> Self {
		Self::new(ErrorKind::Eof, "source ended in the middle of a value")
	}

	pub(crate) fn aggregate(
		kind: ErrorKind,
		message: impl std::fmt::Display,
		causes: Vec<Error>,
	) -> Self {
		Self {
			inner: Box::new(ErrorInner {
				kind,
				message: Cow::Owned(message.to_string()),
				io_error: None,
				causes,
			}),
		}
	}

	/// What failed, independently of how the message is worded
	pub fn kind(&self) -> ErrorKind {
		self.inner.kind
	}

	/// The per-case errors that were collected before this error surfaced
	///
	/// Empty unless this is an aggregated build failure.
	pub fn causes(&self) -> &[Error] {
		&self.inner.causes
	}

	/// If this error was caused by an I/O error, return it
	pub fn io_error(&self) -> Option<&std::io::Error> {
		self.inner.io_error.as_ref()
	}
}

impl std::fmt::Debug for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}: {}", self.inner.kind, self.inner.message)?;
		if let Some(io_error) = &self.inner.io_error {
			write!(f, " ({io_error})")?;
		}
		if !self.inner.causes.is_empty() {
			write!(f, " - collected causes: {:?}", self.inner.causes)?;
		}
		Ok(())
	}
}

/// An error raised while assembling a [`Schema`](crate::Schema)
///
/// Construction-time only: once a schema builds successfully its invariants
/// hold for the lifetime of the value, and the codec builder relies on them.
#[derive(thiserror::Error)]
#[error("{}", inner)]
pub struct SchemaError {
	inner: Box<Cow<'static, str>>,
}

impl SchemaError {
	pub(crate) fn new(message: &'static str) -> Self {
		Self {
			inner: Box::new(Cow::Borrowed(message)),
		}
	}

	pub(crate) fn msg(message: std::fmt::Arguments<'_>) -> Self {
		Self {
			inner: Box::new(Cow::Owned(message.to_string())),
		}
	}
}

impl std::fmt::Debug for SchemaError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		std::fmt::Debug::fmt(&**self.inner, f)
	}
}
