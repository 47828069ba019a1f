//! Attribute and column metadata.

/// Storage type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Boolean,
    Integer,
    BigInt,
    Double,
    Text,
    Blob,
    Json,
}

/// Metadata about one persisted attribute of an entity.
///
/// `name` is the attribute name callers use in constraints (`patientId`);
/// `column_name` is what the engine stores (`patient_id`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    /// Attribute name
    pub name: &'static str,
    /// Database column name (may differ from the attribute name)
    pub column_name: &'static str,
    /// SQL type for this attribute
    pub sql_type: SqlType,
    /// Whether this attribute is nullable
    pub nullable: bool,
    /// Whether this is the surrogate key
    pub primary_key: bool,
    /// Whether values are unique across the entity's extent
    pub unique: bool,
}

impl FieldInfo {
    /// Create a new field info with minimal required data.
    pub const fn new(name: &'static str, column_name: &'static str, sql_type: SqlType) -> Self {
        Self {
            name,
            column_name,
            sql_type,
            nullable: false,
            primary_key: false,
            unique: false,
        }
    }

    /// Set the database column name.
    pub const fn column(mut self, name: &'static str) -> Self {
        self.column_name = name;
        self
    }

    /// Set nullable flag.
    pub const fn nullable(mut self, value: bool) -> Self {
        self.nullable = value;
        self
    }

    /// Set primary key flag.
    pub const fn primary_key(mut self, value: bool) -> Self {
        self.primary_key = value;
        self
    }

    /// Set unique flag.
    pub const fn unique(mut self, value: bool) -> Self {
        self.unique = value;
        self
    }
}
