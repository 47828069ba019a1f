//! The `Model` trait and the `EntityType` descriptor.
//!
//! Entities are defined by the application, not by this workspace. Anything
//! implementing `Model` can be looked up by key, by uuid or by field set.

use std::fmt;
use std::marker::PhantomData;

use crate::error::Result;
use crate::field::FieldInfo;
use crate::row::Row;
use crate::value::Value;

/// A persisted entity type.
///
/// # Example
///
/// ```ignore
/// impl Model for Location {
///     const ENTITY_NAME: &'static str = "Location";
///     const TABLE_NAME: &'static str = "location";
///     const PRIMARY_KEY: &'static str = "locationId";
///
///     fn fields() -> &'static [FieldInfo] {
///         static FIELDS: &[FieldInfo] = &[
///             FieldInfo::new("locationId", "location_id", SqlType::Integer).primary_key(true),
///             FieldInfo::new("uuid", "uuid", SqlType::Text).unique(true),
///             FieldInfo::new("name", "name", SqlType::Text),
///         ];
///         FIELDS
///     }
///     // from_row / to_row / primary_key_value ...
/// }
/// ```
pub trait Model: Sized + Send + Sync + 'static {
    /// Entity name as the persistence engine knows it.
    const ENTITY_NAME: &'static str;
    /// Table the entity's extent lives in.
    const TABLE_NAME: &'static str;
    /// Attribute name of the surrogate key.
    const PRIMARY_KEY: &'static str;

    /// Attribute metadata.
    fn fields() -> &'static [FieldInfo];

    /// Decode an instance from a row keyed by column name.
    fn from_row(row: &Row) -> Result<Self>;

    /// Encode this instance as a row keyed by column name.
    fn to_row(&self) -> Row;

    /// Surrogate key of this instance.
    fn primary_key_value(&self) -> Value;

    /// Look up an attribute by name.
    fn field(name: &str) -> Option<&'static FieldInfo> {
        Self::fields().iter().find(|f| f.name == name)
    }

    /// Whether a record stored as `entity` may be viewed as `Self`.
    ///
    /// Override to accept subtypes.
    fn accepts_entity(entity: &str) -> bool {
        entity == Self::ENTITY_NAME
    }

    /// The type descriptor for this model.
    fn entity() -> EntityType<Self> {
        EntityType::new()
    }
}

/// A type descriptor carried as a value.
///
/// Zero-sized; it only pins the target model so generic lookups can be called
/// with an explicit "which entity" argument.
pub struct EntityType<M: Model> {
    _marker: PhantomData<fn() -> M>,
}

impl<M: Model> EntityType<M> {
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        M::ENTITY_NAME
    }

    pub fn table(&self) -> &'static str {
        M::TABLE_NAME
    }

    pub fn primary_key(&self) -> &'static str {
        M::PRIMARY_KEY
    }

    pub fn fields(&self) -> &'static [FieldInfo] {
        M::fields()
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldInfo> {
        M::field(name)
    }
}

impl<M: Model> Default for EntityType<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Model> Clone for EntityType<M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M: Model> Copy for EntityType<M> {}

impl<M: Model> fmt::Debug for EntityType<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EntityType").field(&M::ENTITY_NAME).finish()
    }
}
