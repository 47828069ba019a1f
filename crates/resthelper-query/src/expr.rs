//! Predicate expressions.
//!
//! An `Expr` is built from bound `Column`s and rendered either to SQL
//! (`build_with_dialect`) or evaluated directly against a `Row` (`matches`),
//! which is how engines without a SQL layer apply it.

use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

use regex::Regex;
use resthelper_core::{Row, Value};

/// Escape character used in rendered LIKE patterns.
pub const LIKE_ESCAPE: char = '\\';

/// SQL dialect used for placeholder rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// `$1, $2, ...`
    #[default]
    Postgres,
    /// `?1, ?2, ...`
    Sqlite,
    /// `?, ?, ...`
    Mysql,
}

impl Dialect {
    /// Placeholder for the 1-based parameter `index`.
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Dialect::Postgres => format!("${}", index),
            Dialect::Sqlite => format!("?{}", index),
            Dialect::Mysql => "?".to_string(),
        }
    }
}

/// A column reference that predicates can be built from.
///
/// Obtain one from an attribute name via [`crate::bind`] so the name is
/// checked against the entity first; `Expr::col` skips that check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    name: String,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `column = value` (`column IS NULL` for a NULL value).
    pub fn eq(self, value: impl Into<Value>) -> Expr {
        Expr::Eq {
            column: self.name,
            value: value.into(),
        }
    }

    /// `column IN (values...)`
    pub fn in_list<I, V>(self, values: I) -> Expr
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Expr::In {
            column: self.name,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// `column LIKE pattern` with `%`/`_` wildcards.
    pub fn like(self, pattern: impl Into<String>) -> Expr {
        Expr::Like {
            column: self.name,
            pattern: pattern.into(),
        }
    }

    /// `column LIKE 'prefix%'`, with wildcards inside `prefix` escaped.
    pub fn starts_with(self, prefix: &str) -> Expr {
        let mut pattern = escape_like(prefix);
        pattern.push('%');
        self.like(pattern)
    }
}

/// A boolean predicate over one entity's columns.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Eq { column: String, value: Value },
    In { column: String, values: Vec<Value> },
    Like { column: String, pattern: String },
    And(Vec<Expr>),
}

impl Expr {
    /// Unchecked column reference.
    pub fn col(name: impl Into<String>) -> Column {
        Column::new(name)
    }

    /// Conjunction of `self` and `other`, flattening nested ANDs.
    pub fn and(self, other: Expr) -> Expr {
        let mut parts = match self {
            Expr::And(parts) => parts,
            single => vec![single],
        };
        match other {
            Expr::And(more) => parts.extend(more),
            single => parts.push(single),
        }
        Expr::And(parts)
    }

    /// Conjunction of all `exprs`; `None` when there are none.
    pub fn all(exprs: impl IntoIterator<Item = Expr>) -> Option<Expr> {
        let mut iter = exprs.into_iter();
        let first = iter.next()?;
        Some(iter.fold(first, Expr::and))
    }

    /// Render to SQL, appending bound parameters to `params`.
    pub fn build_with_dialect(&self, dialect: Dialect, params: &mut Vec<Value>) -> String {
        match self {
            Expr::Eq { column, value } => {
                if value.is_null() {
                    format!("{} IS NULL", column)
                } else {
                    params.push(value.clone());
                    format!("{} = {}", column, dialect.placeholder(params.len()))
                }
            }
            Expr::In { column, values } => {
                if values.is_empty() {
                    return "1 = 0".to_string();
                }
                let placeholders: Vec<String> = values
                    .iter()
                    .map(|v| {
                        params.push(v.clone());
                        dialect.placeholder(params.len())
                    })
                    .collect();
                format!("{} IN ({})", column, placeholders.join(", "))
            }
            Expr::Like { column, pattern } => {
                params.push(Value::Text(pattern.clone()));
                let placeholder = dialect.placeholder(params.len());
                match dialect {
                    // backslash is already MySQL's default LIKE escape
                    Dialect::Mysql => format!("{} LIKE {}", column, placeholder),
                    _ => format!("{} LIKE {} ESCAPE '{}'", column, placeholder, LIKE_ESCAPE),
                }
            }
            Expr::And(parts) => match parts.len() {
                0 => "1 = 1".to_string(),
                1 => parts[0].build_with_dialect(dialect, params),
                _ => parts
                    .iter()
                    .map(|p| format!("({})", p.build_with_dialect(dialect, params)))
                    .collect::<Vec<_>>()
                    .join(" AND "),
            },
        }
    }

    /// Evaluate against a row keyed by column name.
    ///
    /// A column missing from the row behaves as NULL. LIKE is case-sensitive.
    pub fn matches(&self, row: &Row) -> bool {
        match self {
            Expr::Eq { column, value } => match row.get(column) {
                None | Some(Value::Null) => value.is_null(),
                Some(actual) => actual.sql_eq(value),
            },
            Expr::In { column, values } => row
                .get(column)
                .is_some_and(|actual| values.iter().any(|v| actual.sql_eq(v))),
            Expr::Like { column, pattern } => match row.get(column) {
                Some(Value::Text(text)) => like_matches(pattern, text),
                _ => false,
            },
            Expr::And(parts) => parts.iter().all(|p| p.matches(row)),
        }
    }
}

/// Escape LIKE metacharacters so `input` matches literally.
pub fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        if ch == LIKE_ESCAPE || ch == '%' || ch == '_' {
            out.push(LIKE_ESCAPE);
        }
        out.push(ch);
    }
    out
}

/// Translate a LIKE pattern into an anchored regex.
fn like_to_regex(pattern: &str) -> String {
    let mut out = String::from("(?s)^");
    let mut chars = pattern.chars();
    while let Some(ch) = chars.next() {
        match ch {
            LIKE_ESCAPE => {
                if let Some(next) = chars.next() {
                    out.push_str(&regex::escape(&next.to_string()));
                }
            }
            '%' => out.push_str(".*"),
            '_' => out.push('.'),
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }
    out.push('$');
    out
}

/// Most compiled patterns kept at once; the cache is emptied when full.
const PATTERN_CACHE_CAPACITY: usize = 256;

/// Compiled LIKE patterns, shared for the life of the process.
fn pattern_cache() -> &'static RwLock<HashMap<String, Regex>> {
    static CACHE: OnceLock<RwLock<HashMap<String, Regex>>> = OnceLock::new();
    CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// The literal text of a pattern of the form `prefix%`, unescaped.
fn literal_prefix(pattern: &str) -> Option<String> {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(ch) = chars.next() {
        match ch {
            LIKE_ESCAPE => out.push(chars.next()?),
            '%' => return chars.as_str().is_empty().then_some(out),
            '_' => return None,
            other => out.push(other),
        }
    }
    None
}

fn like_matches(pattern: &str, text: &str) -> bool {
    if let Some(prefix) = literal_prefix(pattern) {
        return text.starts_with(&prefix);
    }

    if let Ok(cache) = pattern_cache().read() {
        if let Some(re) = cache.get(pattern) {
            return re.is_match(text);
        }
    }

    match Regex::new(&like_to_regex(pattern)) {
        Ok(re) => {
            let matched = re.is_match(text);
            if let Ok(mut cache) = pattern_cache().write() {
                if cache.len() >= PATTERN_CACHE_CAPACITY {
                    tracing::debug!(
                        capacity = PATTERN_CACHE_CAPACITY,
                        "LIKE pattern cache full, clearing"
                    );
                    cache.clear();
                }
                cache.insert(pattern.to_string(), re);
            }
            matched
        }
        Err(e) => {
            tracing::warn!(
                pattern = pattern,
                error = %e,
                "Untranslatable LIKE pattern, treating as non-match"
            );
            false
        }
    }
}
