//! Result rows and typed column access.

use crate::error::{Error, Result};
use crate::value::Value;

/// A single row returned by a persistence engine, keyed by column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    /// Create an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row from `(column, value)` pairs.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, Value)>,
        S: Into<String>,
    {
        let mut row = Self::new();
        for (column, value) in pairs {
            row.set(column, value);
        }
        row
    }

    /// Set a column, replacing any previous value.
    pub fn set(&mut self, column: impl Into<String>, value: Value) {
        let column = column.into();
        if let Some(idx) = self.columns.iter().position(|c| *c == column) {
            self.values[idx] = value;
        } else {
            self.columns.push(column);
            self.values.push(value);
        }
    }

    /// Builder-style `set`.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(column, value.into());
        self
    }

    /// Raw value of a column.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|idx| &self.values[idx])
    }

    /// Typed value of a column.
    pub fn try_get<T: FromValue>(&self, column: &str) -> Result<T> {
        let value = self
            .get(column)
            .ok_or_else(|| Error::decode(format!("column '{}' not present in row", column)))?;
        T::from_value(value).map_err(|e| match e {
            Error::Query(mut q) => {
                q.message = format!("column '{}': {}", column, q.message);
                Error::Query(q)
            }
            other => other,
        })
    }

    /// Column names in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterate `(column, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
}

/// A row tagged with the concrete entity type it was stored as.
///
/// Returned by get-by-key so callers can verify the record really is an
/// instance of the type they asked for.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Concrete entity name of the stored record.
    pub entity: String,
    pub row: Row,
}

impl Record {
    pub fn new(entity: impl Into<String>, row: Row) -> Self {
        Self {
            entity: entity.into(),
            row,
        }
    }
}

/// Conversion from a [`Value`] into a Rust type.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self>;
}

fn mismatch(expected: &str, value: &Value) -> Error {
    Error::decode(format!("expected {}, found {}", expected, value.type_name()))
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self> {
        Ok(value.clone())
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(*b),
            Value::Int(i) => Ok(*i != 0),
            Value::BigInt(i) => Ok(*i != 0),
            other => Err(mismatch("BOOLEAN", other)),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Int(i) => Ok(*i),
            Value::BigInt(i) => {
                i32::try_from(*i).map_err(|_| Error::decode(format!("{} out of range for INTEGER", i)))
            }
            other => Err(mismatch("INTEGER", other)),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self> {
        value.as_i64().ok_or_else(|| mismatch("BIGINT", value))
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Double(d) => Ok(*d),
            Value::Int(i) => Ok(f64::from(*i)),
            Value::BigInt(i) => Ok(*i as f64),
            other => Err(mismatch("DOUBLE", other)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| mismatch("TEXT", value))
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Bytes(b) => Ok(b.clone()),
            other => Err(mismatch("BYTES", other)),
        }
    }
}

impl FromValue for serde_json::Value {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Json(j) => Ok(j.clone()),
            Value::Text(s) => serde_json::from_str(s)
                .map_err(|e| Error::decode(format!("invalid JSON text: {}", e))),
            other => Err(mismatch("JSON", other)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{QueryError, QueryErrorKind};

    #[test]
    fn test_set_replaces_existing_column() {
        let mut row = Row::new().with("id", 1_i64);
        row.set("id", Value::BigInt(2));
        assert_eq!(row.len(), 1);
        assert_eq!(row.try_get::<i64>("id").unwrap(), 2);
    }

    #[test]
    fn test_try_get_missing_column_is_decode_error() {
        let row = Row::new().with("id", 1_i64);
        let err = row.try_get::<String>("name").unwrap_err();
        assert!(matches!(
            err,
            Error::Query(QueryError { kind: QueryErrorKind::Decode, .. })
        ));
    }

    #[test]
    fn test_try_get_type_mismatch_names_column() {
        let row = Row::new().with("voided", "yes");
        let err = row.try_get::<bool>("voided").unwrap_err();
        assert!(err.to_string().contains("voided"));
    }

    #[test]
    fn test_optional_columns() {
        let row = Row::from_pairs([("a", Value::Null), ("b", Value::Int(4))]);
        assert_eq!(row.try_get::<Option<i32>>("a").unwrap(), None);
        assert_eq!(row.try_get::<Option<i32>>("b").unwrap(), Some(4));
    }
}
