#![allow(dead_code)]

use std::sync::Arc;

use resthelper::prelude::*;
use resthelper::{EntityRef, ProviderError, Query, Record, SessionHandle};
use resthelper_memory::{MemorySessionFactory, MemoryStore};

/// Base entity of the person/patient hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub id: i32,
    pub uuid: String,
    pub gender: Option<String>,
}

impl Model for Person {
    const ENTITY_NAME: &'static str = "Person";
    const TABLE_NAME: &'static str = "person";
    const PRIMARY_KEY: &'static str = "personId";

    fn fields() -> &'static [FieldInfo] {
        static FIELDS: &[FieldInfo] = &[
            FieldInfo::new("personId", "person_id", SqlType::Integer).primary_key(true),
            FieldInfo::new("uuid", "uuid", SqlType::Text).unique(true),
            FieldInfo::new("gender", "gender", SqlType::Text).nullable(true),
        ];
        FIELDS
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.try_get("person_id")?,
            uuid: row.try_get("uuid")?,
            gender: row.try_get("gender")?,
        })
    }

    fn to_row(&self) -> Row {
        Row::new()
            .with("person_id", self.id)
            .with("uuid", self.uuid.as_str())
            .with("gender", self.gender.clone())
    }

    fn primary_key_value(&self) -> Value {
        Value::Int(self.id)
    }

    fn accepts_entity(entity: &str) -> bool {
        matches!(entity, "Person" | "Patient")
    }
}

/// A person with a patient record, stored in the same table.
#[derive(Debug, Clone, PartialEq)]
pub struct Patient {
    pub id: i32,
    pub uuid: String,
    pub identifier: String,
    pub gender: Option<String>,
    pub voided: bool,
}

impl Patient {
    pub fn new(id: i32, identifier: &str) -> Self {
        Self {
            id,
            uuid: format!("patient-uuid-{id}"),
            identifier: identifier.to_string(),
            gender: None,
            voided: false,
        }
    }

    pub fn voided(mut self) -> Self {
        self.voided = true;
        self
    }
}

impl Model for Patient {
    const ENTITY_NAME: &'static str = "Patient";
    const TABLE_NAME: &'static str = "person";
    const PRIMARY_KEY: &'static str = "patientId";

    fn fields() -> &'static [FieldInfo] {
        static FIELDS: &[FieldInfo] = &[
            FieldInfo::new("patientId", "person_id", SqlType::Integer).primary_key(true),
            FieldInfo::new("uuid", "uuid", SqlType::Text).unique(true),
            FieldInfo::new("identifier", "identifier", SqlType::Text),
            FieldInfo::new("gender", "gender", SqlType::Text).nullable(true),
            FieldInfo::new("voided", "voided", SqlType::Boolean),
        ];
        FIELDS
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.try_get("person_id")?,
            uuid: row.try_get("uuid")?,
            identifier: row.try_get("identifier")?,
            gender: row.try_get("gender")?,
            voided: row.try_get("voided")?,
        })
    }

    fn to_row(&self) -> Row {
        Row::new()
            .with("person_id", self.id)
            .with("uuid", self.uuid.as_str())
            .with("identifier", self.identifier.as_str())
            .with("gender", self.gender.clone())
            .with("voided", self.voided)
    }

    fn primary_key_value(&self) -> Value {
        Value::Int(self.id)
    }
}

impl PatientModel for Patient {}

#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub id: i32,
    pub uuid: String,
    pub name: String,
}

impl Location {
    pub fn new(id: i32, name: &str) -> Self {
        Self {
            id,
            uuid: format!("location-uuid-{id}"),
            name: name.to_string(),
        }
    }
}

impl Model for Location {
    const ENTITY_NAME: &'static str = "Location";
    const TABLE_NAME: &'static str = "location";
    const PRIMARY_KEY: &'static str = "locationId";

    fn fields() -> &'static [FieldInfo] {
        static FIELDS: &[FieldInfo] = &[
            FieldInfo::new("locationId", "location_id", SqlType::Integer).primary_key(true),
            FieldInfo::new("uuid", "uuid", SqlType::Text).unique(true),
            FieldInfo::new("name", "name", SqlType::Text),
        ];
        FIELDS
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.try_get("location_id")?,
            uuid: row.try_get("uuid")?,
            name: row.try_get("name")?,
        })
    }

    fn to_row(&self) -> Row {
        Row::new()
            .with("location_id", self.id)
            .with("uuid", self.uuid.as_str())
            .with("name", self.name.as_str())
    }

    fn primary_key_value(&self) -> Value {
        Value::Int(self.id)
    }
}

/// A service over a fresh in-memory store, plus the store for seeding and inspection.
pub fn memory_service() -> (RestHelperService, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let provider = Arc::new(MemorySessionFactory::new(store.clone()));
    (RestHelperService::from_provider(provider), store)
}

/// A provider that must never be asked for a session.
pub struct PanickingProvider;

impl SessionProvider for PanickingProvider {
    fn current_session(&self) -> std::result::Result<SessionHandle, ProviderError> {
        panic!("session resolved for a call that should not need one");
    }
}

/// A unit of work that must never be used.
pub struct PanickingSession;

impl UnitOfWork for PanickingSession {
    fn execute(&self, _query: &Query) -> Result<Vec<Row>> {
        panic!("query executed for a call that should not need one");
    }

    fn get(&self, _entity: &EntityRef, _key: &Value) -> Result<Option<Record>> {
        panic!("key lookup for a call that should not need one");
    }
}
