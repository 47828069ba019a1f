//! Core types and traits for RestHelper Rust.
//!
//! `resthelper-core` is the **contract layer** shared by every other crate in the
//! workspace. It defines what an entity looks like to the lookup machinery and
//! the values that flow between callers, query builders and persistence engines.
//!
//! # Role In The Architecture
//!
//! - **Type descriptors**: `Model` describes a persisted entity (name, table,
//!   attributes) and `EntityType<M>` carries that description as a value.
//! - **Data model**: `Value`, `Row` and `Record` are the engine-neutral shapes
//!   of parameters and results.
//! - **Constraints**: `FieldConstraint` is one `(attribute, value)` equality
//!   predicate as supplied by callers.
//! - **Errors**: `Error` separates fatal session configuration failures,
//!   attribute binding failures, type mismatches and engine failures.
//!
//! # Who Uses This Crate
//!
//! - `resthelper-query` binds `FieldConstraint`s against `Model` metadata.
//! - `resthelper-session` hands out unit-of-work handles returning `Row`/`Record`.
//! - `resthelper-memory` stores `Row`s per table.
//! - `resthelper` decodes results into models and returns them to callers.

pub mod constraint;
pub mod error;
pub mod field;
pub mod model;
pub mod row;
pub mod value;

pub use constraint::FieldConstraint;
pub use error::{
    BindingError, Error, QueryError, QueryErrorKind, Result, SessionError, SessionErrorKind,
    TypeMismatchError,
};
pub use field::{FieldInfo, SqlType};
pub use model::{EntityType, Model};
pub use row::{FromValue, Record, Row};
pub use value::Value;
