//! Unit-of-work capability and session resolution for RestHelper Rust.
//!
//! The persistence engine is opaque to this workspace. It is reached through
//! two traits:
//!
//! - [`UnitOfWork`]: a live handle that executes built queries and resolves
//!   records by surrogate key.
//! - [`SessionProvider`]: hands out the current unit of work. Two deployed
//!   provider generations expose that entry point differently; the
//!   [`SessionResolver`] adapts to whichever one is present, once.
//!
//! # Design Philosophy
//!
//! - **Handles are borrowed, not owned**: the engine scopes a unit of work;
//!   nothing here commits, flushes or closes it.
//! - **Probe once**: the resolver memoizes which entry point works and never
//!   probes again for the lifetime of the resolver.
//! - **Fatal means fatal**: failing to obtain a session is a configuration
//!   error and is never retried.

pub mod global;
pub mod provider;
pub mod resolver;

use std::sync::Arc;

use resthelper_core::{Record, Result, Row, Value};
use resthelper_query::{EntityRef, Query};

pub use global::{global_resolver, install_global_resolver};
pub use provider::{EntryPoint, LegacyObject, ProviderError, SessionProvider};
pub use resolver::{DispatchPath, ResolverConfig, SessionResolver};

/// A live unit of work in the persistence engine.
///
/// Implementations are expected to honour `Query::hints` (for example by
/// skipping their second-level cache when the cache mode asks for it).
pub trait UnitOfWork: Send + Sync {
    /// Execute `query` against its entity's extent and collect every row.
    fn execute(&self, query: &Query) -> Result<Vec<Row>>;

    /// Resolve a single record by surrogate key, tagged with its concrete entity.
    fn get(&self, entity: &EntityRef, key: &Value) -> Result<Option<Record>>;
}

/// Shared handle to the current unit of work.
pub type SessionHandle = Arc<dyn UnitOfWork>;
