//! Error types for RestHelper Rust.
//!
//! Every failure a lookup can produce falls into one of four families:
//!
//! - [`SessionError`]: no unit-of-work handle could be obtained. Always fatal.
//! - [`BindingError`]: a predicate referenced an attribute the entity does not have.
//! - [`TypeMismatchError`]: a record resolved by key is not of the requested type.
//! - [`QueryError`]: the engine failed to execute a query or a row failed to decode.
//!
//! "Not found" is never an error: single-result lookups return `Ok(None)`.

use std::fmt;

/// Result alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error source.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The main error type.
#[derive(Debug)]
pub enum Error {
    /// Obtaining the current unit of work failed.
    Session(SessionError),
    /// An attribute name could not be bound against the target entity.
    Binding(BindingError),
    /// A resolved record is not an instance of the requested entity type.
    TypeMismatch(TypeMismatchError),
    /// Query execution or result decoding failed.
    Query(QueryError),
}

impl Error {
    /// Whether this error is an unrecoverable configuration failure.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Session(_))
    }

    /// Shorthand for a decode failure.
    pub fn decode(message: impl Into<String>) -> Self {
        Error::Query(QueryError {
            kind: QueryErrorKind::Decode,
            message: message.into(),
            source: None,
        })
    }

    /// Shorthand for an execution failure reported by an engine.
    pub fn execution(message: impl Into<String>, source: Option<BoxError>) -> Self {
        Error::Query(QueryError {
            kind: QueryErrorKind::Execution,
            message: message.into(),
            source,
        })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Session(e) => write!(f, "Session error: {}", e),
            Error::Binding(e) => write!(f, "Binding error: {}", e),
            Error::TypeMismatch(e) => write!(f, "Type mismatch: {}", e),
            Error::Query(e) => write!(f, "Query error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Session(e) => e
                .source
                .as_deref()
                .map(|s| s as &(dyn std::error::Error + 'static)),
            Error::Query(e) => e
                .source
                .as_deref()
                .map(|s| s as &(dyn std::error::Error + 'static)),
            _ => None,
        }
    }
}

impl From<SessionError> for Error {
    fn from(e: SessionError) -> Self {
        Error::Session(e)
    }
}

impl From<BindingError> for Error {
    fn from(e: BindingError) -> Self {
        Error::Binding(e)
    }
}

impl From<TypeMismatchError> for Error {
    fn from(e: TypeMismatchError) -> Self {
        Error::TypeMismatch(e)
    }
}

impl From<QueryError> for Error {
    fn from(e: QueryError) -> Self {
        Error::Query(e)
    }
}

/// Failure to obtain a unit-of-work handle.
#[derive(Debug)]
pub struct SessionError {
    pub kind: SessionErrorKind,
    pub message: String,
    pub source: Option<BoxError>,
}

/// Why no unit-of-work handle could be obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionErrorKind {
    /// No session provider has been configured.
    NoProvider,
    /// The provider exposes neither the direct nor the introspected entry point.
    EntryPointMissing,
    /// An entry point exists but invoking it failed.
    EntryPointFailed,
    /// The introspected entry point returned something that is not a session handle.
    IncompatibleHandle,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(source) = &self.source {
            write!(f, " (caused by: {})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|s| s as &(dyn std::error::Error + 'static))
    }
}

/// An attribute name that does not exist on the target entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingError {
    /// Entity the predicate was built against.
    pub entity: String,
    /// The attribute name that failed to resolve.
    pub attribute: String,
}

impl fmt::Display for BindingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "could not resolve attribute '{}' of entity '{}'",
            self.attribute, self.entity
        )
    }
}

impl std::error::Error for BindingError {}

/// A record whose concrete entity type cannot be viewed as the requested one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeMismatchError {
    /// The entity type the caller asked for.
    pub expected: String,
    /// The entity type actually stored.
    pub found: String,
}

impl fmt::Display for TypeMismatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot cast {} to {}", self.found, self.expected)
    }
}

impl std::error::Error for TypeMismatchError {}

/// Engine-side failure.
#[derive(Debug)]
pub struct QueryError {
    pub kind: QueryErrorKind,
    pub message: String,
    pub source: Option<BoxError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorKind {
    /// The engine could not execute the query.
    Execution,
    /// A returned row could not be converted into the requested model.
    Decode,
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for QueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|s| s as &(dyn std::error::Error + 'static))
    }
}
