//! Typed predicate and query builder for RestHelper Rust.
//!
//! `resthelper-query` turns attribute-level constraints into a `Query` a
//! persistence engine can execute: attribute names are bound against `Model`
//! metadata (failing fast on unknown names), predicates are ANDed, and hints
//! such as cache bypass travel with the query.
//!
//! A `Query` can be rendered to parameterized SQL for SQL-backed engines, or
//! evaluated row by row through `Query::matches` for engines that filter in
//! memory.

pub mod expr;
pub mod select;

pub use expr::{Column, Dialect, Expr, LIKE_ESCAPE, escape_like};
pub use select::{CacheMode, EntityRef, Query, QueryHints, Select, bind};
