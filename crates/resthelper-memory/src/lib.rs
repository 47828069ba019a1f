//! In-memory persistence engine for RestHelper Rust.
//!
//! `MemoryStore` implements `UnitOfWork` by evaluating built queries directly
//! against stored rows, and `MemorySessionFactory` serves it through either
//! session provider shape. Useful for embedding, demos and tests; every
//! executed query is logged with its hints so callers can inspect what was
//! asked of the engine.

pub mod factory;
pub mod store;

pub use factory::{ApiShape, LEGACY_ENTRY_POINT, MemorySessionFactory};
pub use store::{DEFAULT_QUERY_LOG_CAPACITY, MemoryStore};
