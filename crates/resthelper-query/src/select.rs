//! Typed SELECT builder and the engine-facing `Query`.

use std::fmt;
use std::marker::PhantomData;

use resthelper_core::{BindingError, EntityType, Model, Result, Value};
use serde::{Deserialize, Serialize};

use crate::expr::{Column, Dialect, Expr};

/// How a query interacts with the engine's second-level cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CacheMode {
    /// Read from and write to the cache as the engine sees fit.
    #[default]
    Normal,
    /// Bypass the cache entirely; results reflect current storage state.
    Ignore,
}

impl CacheMode {
    /// Whether results must come from storage rather than a cache.
    pub const fn bypasses_cache(&self) -> bool {
        matches!(self, CacheMode::Ignore)
    }
}

/// Execution hints attached to a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QueryHints {
    pub cache_mode: CacheMode,
    /// The caller promises not to modify the results within this unit of work.
    pub read_only: bool,
}

/// Type-erased identity of the entity a query targets.
#[derive(Debug, Clone, Copy)]
pub struct EntityRef {
    pub name: &'static str,
    pub table: &'static str,
    /// Column holding the surrogate key.
    pub primary_key_column: &'static str,
    /// Which stored entity names this target may be loaded from.
    pub accepts: fn(&str) -> bool,
}

impl EntityRef {
    pub fn of<M: Model>() -> Self {
        Self {
            name: M::ENTITY_NAME,
            table: M::TABLE_NAME,
            primary_key_column: M::field(M::PRIMARY_KEY)
                .map_or(M::PRIMARY_KEY, |f| f.column_name),
            accepts: M::accepts_entity,
        }
    }

    /// Whether a row stored as `entity` belongs to this target's extent.
    pub fn accepts(&self, entity: &str) -> bool {
        (self.accepts)(entity)
    }
}

// Identity is the entity name and its storage; the acceptance hook follows from it.
impl PartialEq for EntityRef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.table == other.table
            && self.primary_key_column == other.primary_key_column
    }
}

impl Eq for EntityRef {}

/// Resolve an attribute of `M` to its column.
///
/// Fails with `Error::Binding` when `M` has no such attribute; no engine is
/// consulted.
pub fn bind<M: Model>(attribute: &str) -> Result<Column> {
    match M::field(attribute) {
        Some(field) => Ok(Column::new(field.column_name)),
        None => {
            tracing::debug!(
                entity = M::ENTITY_NAME,
                attribute = attribute,
                "Unknown attribute in predicate"
            );
            Err(BindingError {
                entity: M::ENTITY_NAME.to_string(),
                attribute: attribute.to_string(),
            }
            .into())
        }
    }
}

/// A fully built query, ready for a persistence engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub entity: EntityRef,
    /// `None` selects the entity's whole extent.
    pub filter: Option<Expr>,
    pub hints: QueryHints,
}

impl Query {
    /// Render with the default dialect (Postgres).
    pub fn to_sql(&self) -> (String, Vec<Value>) {
        self.to_sql_with_dialect(Dialect::default())
    }

    pub fn to_sql_with_dialect(&self, dialect: Dialect) -> (String, Vec<Value>) {
        let mut params = Vec::new();
        let mut sql = format!("SELECT * FROM {}", self.entity.table);
        if let Some(filter) = &self.filter {
            sql.push_str(" WHERE ");
            sql.push_str(&filter.build_with_dialect(dialect, &mut params));
        }
        (sql, params)
    }

    /// Whether this query is unfiltered.
    pub fn is_full_scan(&self) -> bool {
        self.filter.is_none()
    }

    /// Whether a stored row satisfies the filter.
    pub fn matches(&self, row: &resthelper_core::Row) -> bool {
        self.filter.as_ref().is_none_or(|f| f.matches(row))
    }
}

/// SELECT builder rooted at model `M`.
///
/// # Example
///
/// ```ignore
/// let query = Select::<Patient>::new()
///     .where_in("patientId", [1, 2, 3])?
///     .where_eq("voided", false)?
///     .cache_mode(CacheMode::Ignore)
///     .build();
/// ```
pub struct Select<M: Model> {
    filters: Vec<Expr>,
    hints: QueryHints,
    _marker: PhantomData<fn() -> M>,
}

impl<M: Model> Select<M> {
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
            hints: QueryHints::default(),
            _marker: PhantomData,
        }
    }

    /// Start from an explicit type descriptor.
    pub fn from_entity(_entity: EntityType<M>) -> Self {
        Self::new()
    }

    /// AND a pre-built predicate.
    pub fn filter(mut self, expr: Expr) -> Self {
        self.filters.push(expr);
        self
    }

    /// AND `attribute = value`.
    pub fn where_eq(self, attribute: &str, value: impl Into<Value>) -> Result<Self> {
        let expr = bind::<M>(attribute)?.eq(value);
        Ok(self.filter(expr))
    }

    /// AND `attribute IN (values...)`.
    pub fn where_in<I, V>(self, attribute: &str, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let expr = bind::<M>(attribute)?.in_list(values);
        Ok(self.filter(expr))
    }

    /// AND `attribute LIKE 'prefix%'`.
    pub fn where_starts_with(self, attribute: &str, prefix: &str) -> Result<Self> {
        let expr = bind::<M>(attribute)?.starts_with(prefix);
        Ok(self.filter(expr))
    }

    pub fn cache_mode(mut self, mode: CacheMode) -> Self {
        self.hints.cache_mode = mode;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.hints.read_only = true;
        self
    }

    pub fn hints(&self) -> QueryHints {
        self.hints
    }

    /// Number of ANDed predicates so far.
    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }

    pub fn build(&self) -> Query {
        Query {
            entity: EntityRef::of::<M>(),
            filter: Expr::all(self.filters.iter().cloned()),
            hints: self.hints,
        }
    }

    pub fn to_sql(&self) -> (String, Vec<Value>) {
        self.build().to_sql()
    }
}

impl<M: Model> Default for Select<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Model> fmt::Debug for Select<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Select")
            .field("entity", &M::ENTITY_NAME)
            .field("filters", &self.filters)
            .field("hints", &self.hints)
            .finish()
    }
}
