//! Table storage and query evaluation.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, RwLock};

use resthelper_core::{Error, Model, Record, Result, Row, Value};
use resthelper_query::{EntityRef, Query};
use resthelper_session::UnitOfWork;

/// Queries kept in the execution log by default.
pub const DEFAULT_QUERY_LOG_CAPACITY: usize = 1024;

/// A stored row plus the concrete entity it was saved as.
#[derive(Debug, Clone)]
struct StoredRow {
    entity: String,
    row: Row,
}

/// An in-memory persistence engine.
///
/// Tables are keyed by name; each row remembers the concrete entity type it
/// was stored as, so several entity types can share one table the way joined
/// inheritance hierarchies do. A query sees every row whose entity its target
/// accepts (`Model::accepts_entity`), so a base-type query also returns
/// subtype rows; get-by-key sees every row in the table.
///
/// The most recent executed queries are kept for inspection, up to the log
/// capacity; a capacity of zero turns the log off.
#[derive(Debug)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Vec<StoredRow>>>,
    executed: Mutex<VecDeque<Query>>,
    log_capacity: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_query_log_capacity(DEFAULT_QUERY_LOG_CAPACITY)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that keeps at most `capacity` executed queries.
    pub fn with_query_log_capacity(capacity: usize) -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            executed: Mutex::new(VecDeque::new()),
            log_capacity: capacity,
        }
    }

    /// Store a model instance, replacing any row with the same surrogate key.
    pub fn insert<M: Model>(&self, obj: &M) -> Result<()> {
        let entity = EntityRef::of::<M>();
        let mut row = obj.to_row();
        row.set(entity.primary_key_column, obj.primary_key_value());
        self.insert_row(entity.table, entity.name, entity.primary_key_column, row)
    }

    /// Store a raw row as entity `entity`, keyed by `key_column`.
    pub fn insert_row(&self, table: &str, entity: &str, key_column: &str, row: Row) -> Result<()> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| poisoned("tables"))?;
        let rows = tables.entry(table.to_string()).or_default();

        let key = row.get(key_column).cloned().unwrap_or(Value::Null);
        rows.retain(|stored| {
            !stored
                .row
                .get(key_column)
                .is_some_and(|existing| existing.sql_eq(&key))
        });
        rows.push(StoredRow {
            entity: entity.to_string(),
            row,
        });

        tracing::trace!(table = table, entity = entity, "Stored row");
        Ok(())
    }

    /// Number of rows in `table`, across all entity types.
    pub fn row_count(&self, table: &str) -> usize {
        self.tables
            .read()
            .map(|tables| tables.get(table).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    /// The logged queries, oldest first.
    pub fn executed_queries(&self) -> Vec<Query> {
        self.executed
            .lock()
            .map(|log| log.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of queries currently in the log.
    pub fn execution_count(&self) -> usize {
        self.executed.lock().map(|log| log.len()).unwrap_or(0)
    }

    pub fn query_log_capacity(&self) -> usize {
        self.log_capacity
    }

    pub fn clear_log(&self) {
        if let Ok(mut log) = self.executed.lock() {
            log.clear();
        }
    }

    fn record(&self, query: &Query) -> Result<()> {
        if self.log_capacity == 0 {
            return Ok(());
        }
        let mut log = self.executed.lock().map_err(|_| poisoned("query log"))?;
        while log.len() >= self.log_capacity {
            log.pop_front();
        }
        log.push_back(query.clone());
        Ok(())
    }
}

impl UnitOfWork for MemoryStore {
    fn execute(&self, query: &Query) -> Result<Vec<Row>> {
        self.record(query)?;

        let tables = self.tables.read().map_err(|_| poisoned("tables"))?;
        let rows: Vec<Row> = tables
            .get(query.entity.table)
            .map(|rows| {
                rows.iter()
                    .filter(|stored| query.entity.accepts(&stored.entity))
                    .filter(|stored| query.matches(&stored.row))
                    .map(|stored| stored.row.clone())
                    .collect()
            })
            .unwrap_or_default();

        tracing::debug!(
            entity = query.entity.name,
            cache_mode = ?query.hints.cache_mode,
            read_only = query.hints.read_only,
            rows = rows.len(),
            "Executed in-memory query"
        );
        Ok(rows)
    }

    fn get(&self, entity: &EntityRef, key: &Value) -> Result<Option<Record>> {
        let tables = self.tables.read().map_err(|_| poisoned("tables"))?;
        let found = tables.get(entity.table).and_then(|rows| {
            rows.iter().find(|stored| {
                stored
                    .row
                    .get(entity.primary_key_column)
                    .is_some_and(|v| v.sql_eq(key))
            })
        });
        Ok(found.map(|stored| Record::new(stored.entity.clone(), stored.row.clone())))
    }
}

fn poisoned(what: &str) -> Error {
    Error::execution(format!("in-memory {} lock poisoned", what), None)
}
