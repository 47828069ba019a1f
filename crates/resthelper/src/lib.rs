//! RestHelper Rust: typed, read-only entity lookups over a pluggable
//! unit-of-work persistence engine.
//!
//! The facade crate ties the workspace together:
//!
//! - [`RestHelperService`] resolves the current session per call and runs
//!   one of five lookups (by unique identifier, by surrogate key, by a set of
//!   field constraints, a patient batch, and a patient identifier prefix).
//! - [`Lookup`] runs the same lookups against a unit of work the caller
//!   already holds.
//! - Engines plug in through [`UnitOfWork`] and [`SessionProvider`]; the
//!   optional `memory` feature re-exports an in-memory engine.
//!
//! # Example
//!
//! ```ignore
//! use resthelper::prelude::*;
//!
//! let service = RestHelperService::from_provider(provider);
//! let patient = service.get_object_by_uuid(Patient::entity(), "8d0f...")?;
//! let matching = service.get_objects_by_fields(
//!     Location::entity(),
//!     [Some(FieldConstraint::new("name", "Ward 3"))],
//! )?;
//! ```

pub mod config;
pub mod lookup;
pub mod patient;
pub mod service;

pub use config::HelperConfig;
pub use lookup::Lookup;
pub use patient::PatientModel;
pub use service::RestHelperService;

pub use resthelper_core::{
    BindingError, EntityType, Error, FieldConstraint, FieldInfo, FromValue, Model, QueryError,
    QueryErrorKind, Record, Result, Row, SessionError, SessionErrorKind, SqlType,
    TypeMismatchError, Value,
};
pub use resthelper_query::{CacheMode, Dialect, EntityRef, Expr, Query, QueryHints, Select};
pub use resthelper_session::{
    DispatchPath, EntryPoint, LegacyObject, ProviderError, ResolverConfig, SessionHandle,
    SessionProvider, SessionResolver, UnitOfWork, global_resolver, install_global_resolver,
};

#[cfg(feature = "memory")]
pub use resthelper_memory as memory;

/// Everything an application needs to declare models and run lookups.
pub mod prelude {
    pub use crate::{
        EntityType, Error, FieldConstraint, FieldInfo, HelperConfig, Lookup, Model,
        PatientModel, RestHelperService, Result, Row, SessionProvider, SessionResolver, SqlType,
        UnitOfWork, Value,
    };
}
