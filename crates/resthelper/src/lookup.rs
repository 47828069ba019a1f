//! The lookups, run against an explicitly supplied unit of work.

use resthelper_core::{EntityType, FieldConstraint, Model, Result, Row, TypeMismatchError, Value};
use resthelper_query::{CacheMode, EntityRef, Select};
use resthelper_session::UnitOfWork;

use crate::config::HelperConfig;
use crate::patient::PatientModel;

/// Read-only lookups bound to one unit of work.
///
/// `Lookup` never opens, commits or closes the session it is given; the
/// engine that handed it out owns its lifetime.
///
/// # Example
///
/// ```ignore
/// let session = resolver.current_session()?;
/// let lookup = Lookup::new(session.as_ref(), &config);
/// let patient = lookup.object_by_uuid(Patient::entity(), "8d0f...")?;
/// ```
pub struct Lookup<'a> {
    session: &'a dyn UnitOfWork,
    config: &'a HelperConfig,
}

impl<'a> Lookup<'a> {
    pub fn new(session: &'a dyn UnitOfWork, config: &'a HelperConfig) -> Self {
        Self { session, config }
    }

    /// First instance whose unique identifier equals `uuid`, if any.
    #[tracing::instrument(level = "debug", skip(self, entity), fields(model = M::ENTITY_NAME))]
    pub fn object_by_uuid<M: Model>(&self, entity: EntityType<M>, uuid: &str) -> Result<Option<M>> {
        let query = Select::from_entity(entity)
            .where_eq(self.config.uuid_attribute, uuid)?
            .read_only()
            .build();

        let rows = self.session.execute(&query)?;
        rows.first().map(M::from_row).transpose()
    }

    /// Instance with surrogate key `key`, if any.
    ///
    /// A stored record of an entity type `M` does not accept is an
    /// `Error::TypeMismatch`, not `None`.
    #[tracing::instrument(level = "debug", skip(self, entity, key), fields(model = M::ENTITY_NAME))]
    pub fn object_by_id<M: Model>(
        &self,
        entity: EntityType<M>,
        key: impl Into<Value>,
    ) -> Result<Option<M>> {
        let key = key.into();
        let Some(record) = self.session.get(&EntityRef::of::<M>(), &key)? else {
            return Ok(None);
        };

        if !M::accepts_entity(&record.entity) {
            return Err(TypeMismatchError {
                expected: entity.name().to_string(),
                found: record.entity,
            }
            .into());
        }
        M::from_row(&record.row).map(Some)
    }

    /// Every instance matching all non-`None` constraints.
    ///
    /// With no constraints this scans the whole extent. Result order is
    /// whatever the engine returns.
    pub fn objects_by_fields<M, I>(&self, entity: EntityType<M>, constraints: I) -> Result<Vec<M>>
    where
        M: Model,
        I: IntoIterator,
        I::Item: Into<Option<FieldConstraint>>,
    {
        let filters: Vec<FieldConstraint> = constraints.into_iter().filter_map(Into::into).collect();
        self.objects_matching(entity, &filters)
    }

    #[tracing::instrument(
        level = "debug",
        skip(self, entity, filters),
        fields(model = M::ENTITY_NAME, constraints = filters.len())
    )]
    fn objects_matching<M: Model>(
        &self,
        entity: EntityType<M>,
        filters: &[FieldConstraint],
    ) -> Result<Vec<M>> {
        let mut select = Select::from_entity(entity);
        for constraint in filters {
            select = select.where_eq(&constraint.name, constraint.value.clone())?;
        }

        if filters.is_empty() && self.config.warn_on_unfiltered_scan {
            tracing::warn!(
                entity = entity.name(),
                table = entity.table(),
                "Field lookup without constraints, scanning entire extent"
            );
        }

        let rows = self.session.execute(&select.build())?;
        decode_all(&rows)
    }

    /// Non-voided patients among `keys`, read past any cache.
    ///
    /// Missing and voided patients are omitted. An empty key set returns
    /// immediately without touching the engine.
    pub fn patients<P, I>(&self, keys: I) -> Result<Vec<P>>
    where
        P: PatientModel,
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let ids: Vec<Value> = keys.into_iter().map(Into::into).collect();
        if ids.is_empty() {
            tracing::debug!(model = P::ENTITY_NAME, "Empty patient key set, skipping query");
            return Ok(Vec::new());
        }
        self.patient_batch(ids)
    }

    #[tracing::instrument(
        level = "debug",
        skip(self, ids),
        fields(model = P::ENTITY_NAME, keys = ids.len())
    )]
    fn patient_batch<P: PatientModel>(&self, ids: Vec<Value>) -> Result<Vec<P>> {
        let requested = ids.len();
        let query = Select::<P>::new()
            .where_in(P::ID_ATTRIBUTE, ids)?
            .where_eq(P::VOIDED_ATTRIBUTE, false)?
            .cache_mode(CacheMode::Ignore)
            .build();

        let patients: Vec<P> = decode_all(&self.session.execute(&query)?)?;
        tracing::debug!(requested, found = patients.len(), "Patient batch resolved");
        Ok(patients)
    }

    /// Patients whose identifier starts with `prefix`.
    ///
    /// `include_all` is accepted for API compatibility and does not change the
    /// query: voided patients are returned either way.
    #[tracing::instrument(level = "debug", skip(self), fields(model = P::ENTITY_NAME))]
    pub fn patients_by_identifier_prefix<P: PatientModel>(
        &self,
        prefix: &str,
        include_all: bool,
    ) -> Result<Vec<P>> {
        if include_all {
            tracing::debug!("include_all has no effect on identifier prefix lookups");
        }
        let query = Select::<P>::new()
            .where_starts_with(P::IDENTIFIER_ATTRIBUTE, prefix)?
            .build();

        let rows = self.session.execute(&query)?;
        decode_all(&rows)
    }
}

fn decode_all<M: Model>(rows: &[Row]) -> Result<Vec<M>> {
    rows.iter().map(M::from_row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use resthelper_core::{Error, FieldInfo, Record, SqlType};
    use resthelper_query::Query;
    use std::fmt;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::{Arc, Mutex};
    use tracing::field::{Field, Visit};
    use tracing::span::{Attributes, Id, Record as SpanRecord};
    use tracing::{Event, Metadata, Subscriber};

    #[derive(Debug)]
    struct Encounter {
        id: i64,
    }

    impl Model for Encounter {
        const ENTITY_NAME: &'static str = "Encounter";
        const TABLE_NAME: &'static str = "encounter";
        const PRIMARY_KEY: &'static str = "encounterId";

        fn fields() -> &'static [FieldInfo] {
            static FIELDS: &[FieldInfo] = &[
                FieldInfo::new("encounterId", "encounter_id", SqlType::BigInt).primary_key(true),
                FieldInfo::new("uuid", "uuid", SqlType::Text).unique(true),
                FieldInfo::new("patientId", "patient_id", SqlType::Integer),
                FieldInfo::new("identifier", "identifier", SqlType::Text),
                FieldInfo::new("voided", "voided", SqlType::Boolean),
            ];
            FIELDS
        }

        fn from_row(row: &Row) -> Result<Self> {
            Ok(Self {
                id: row.try_get("encounter_id")?,
            })
        }

        fn to_row(&self) -> Row {
            Row::new().with("encounter_id", self.id)
        }

        fn primary_key_value(&self) -> Value {
            Value::BigInt(self.id)
        }
    }

    // Good enough to exercise the patient lookups' query shapes.
    impl PatientModel for Encounter {}

    /// Records queries and answers with canned rows.
    #[derive(Default)]
    struct RecordingSession {
        queries: Mutex<Vec<Query>>,
        rows: Vec<Row>,
    }

    impl RecordingSession {
        fn last(&self) -> Query {
            self.queries.lock().unwrap().last().cloned().unwrap()
        }

        fn count(&self) -> usize {
            self.queries.lock().unwrap().len()
        }
    }

    impl UnitOfWork for RecordingSession {
        fn execute(&self, query: &Query) -> Result<Vec<Row>> {
            self.queries.lock().unwrap().push(query.clone());
            Ok(self.rows.clone())
        }

        fn get(&self, _entity: &EntityRef, key: &Value) -> Result<Option<Record>> {
            Ok(self
                .rows
                .iter()
                .find(|r| r.get("encounter_id").is_some_and(|v| v.sql_eq(key)))
                .map(|r| Record::new("Encounter", r.clone())))
        }
    }

    fn rows(ids: &[i64]) -> Vec<Row> {
        ids.iter()
            .map(|id| Row::new().with("encounter_id", *id))
            .collect()
    }

    #[test]
    fn test_uuid_lookup_is_read_only_and_takes_first() {
        let session = RecordingSession {
            rows: rows(&[4, 5]),
            ..Default::default()
        };
        let config = HelperConfig::default();
        let found = Lookup::new(&session, &config)
            .object_by_uuid(Encounter::entity(), "abc")
            .unwrap();
        assert_eq!(found.map(|e| e.id), Some(4));

        let query = session.last();
        assert!(query.hints.read_only);
        assert_eq!(
            query.to_sql(),
            (
                "SELECT * FROM encounter WHERE uuid = $1".to_string(),
                vec![Value::Text("abc".to_string())]
            )
        );
    }

    #[test]
    fn test_custom_uuid_attribute_must_exist() {
        let session = RecordingSession::default();
        let config = HelperConfig::default().with_uuid_attribute("externalId");
        let err = Lookup::new(&session, &config)
            .object_by_uuid(Encounter::entity(), "abc")
            .unwrap_err();
        assert!(matches!(err, Error::Binding(_)));
        assert_eq!(session.count(), 0);
    }

    #[test]
    fn test_id_lookup_does_not_query() {
        let session = RecordingSession {
            rows: rows(&[9]),
            ..Default::default()
        };
        let config = HelperConfig::default();
        let lookup = Lookup::new(&session, &config);
        assert_eq!(
            lookup.object_by_id(Encounter::entity(), 9_i64).unwrap().map(|e| e.id),
            Some(9)
        );
        assert!(lookup.object_by_id(Encounter::entity(), 10_i64).unwrap().is_none());
        assert_eq!(session.count(), 0);
    }

    #[test]
    fn test_field_lookup_skips_none_entries() {
        let session = RecordingSession::default();
        let config = HelperConfig::default();
        Lookup::new(&session, &config)
            .objects_by_fields(
                Encounter::entity(),
                vec![None, Some(FieldConstraint::new("patientId", 3_i32))],
            )
            .unwrap();
        assert_eq!(
            session.last().to_sql().0,
            "SELECT * FROM encounter WHERE patient_id = $1"
        );
    }

    #[test]
    fn test_patient_batch_query_shape() {
        let session = RecordingSession::default();
        let config = HelperConfig::default();
        Lookup::new(&session, &config)
            .patients::<Encounter, _>([1_i32, 2, 3])
            .unwrap();
        let query = session.last();
        assert_eq!(query.hints.cache_mode, CacheMode::Ignore);
        assert_eq!(
            query.to_sql().0,
            "SELECT * FROM encounter WHERE (patient_id IN ($1, $2, $3)) AND (voided = $4)"
        );
    }

    #[test]
    fn test_prefix_query_ignores_include_all() {
        let session = RecordingSession::default();
        let config = HelperConfig::default();
        let lookup = Lookup::new(&session, &config);
        lookup
            .patients_by_identifier_prefix::<Encounter>("ABC", true)
            .unwrap();
        let with_all = session.last();
        lookup
            .patients_by_identifier_prefix::<Encounter>("ABC", false)
            .unwrap();
        assert_eq!(with_all, session.last());
        assert_eq!(with_all.hints.cache_mode, CacheMode::Normal);
    }

    type SpanLog = Arc<Mutex<Vec<(String, Vec<(String, String)>)>>>;

    /// Keeps the name and initial fields of every span opened.
    struct SpanCapture {
        spans: SpanLog,
        next_id: AtomicU64,
    }

    struct FieldVisitor<'a>(&'a mut Vec<(String, String)>);

    impl Visit for FieldVisitor<'_> {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.0.push((field.name().to_string(), format!("{value:?}")));
        }
    }

    impl Subscriber for SpanCapture {
        fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
            true
        }

        fn new_span(&self, attrs: &Attributes<'_>) -> Id {
            let mut fields = Vec::new();
            attrs.record(&mut FieldVisitor(&mut fields));
            self.spans
                .lock()
                .unwrap()
                .push((attrs.metadata().name().to_string(), fields));
            Id::from_u64(self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
        }

        fn record(&self, _span: &Id, _values: &SpanRecord<'_>) {}

        fn record_follows_from(&self, _span: &Id, _follows: &Id) {}

        fn event(&self, _event: &Event<'_>) {}

        fn enter(&self, _span: &Id) {}

        fn exit(&self, _span: &Id) {}
    }

    fn span_field(spans: &SpanLog, span: &str, field: &str) -> Option<String> {
        spans
            .lock()
            .unwrap()
            .iter()
            .find(|(name, _)| name == span)
            .and_then(|(_, fields)| fields.iter().find(|(n, _)| n == field))
            .map(|(_, value)| value.clone())
    }

    #[test]
    fn test_spans_carry_constraint_and_key_counts() {
        let spans = SpanLog::default();
        let capture = SpanCapture {
            spans: Arc::clone(&spans),
            next_id: AtomicU64::new(0),
        };
        let session = RecordingSession::default();
        let config = HelperConfig::default();

        tracing::subscriber::with_default(capture, || {
            let lookup = Lookup::new(&session, &config);
            lookup
                .objects_by_fields(
                    Encounter::entity(),
                    [
                        Some(FieldConstraint::new("patientId", 3_i32)),
                        None,
                        Some(FieldConstraint::new("voided", false)),
                    ],
                )
                .unwrap();
            lookup.patients::<Encounter, _>([1_i32, 2, 3, 4]).unwrap();
        });

        assert_eq!(
            span_field(&spans, "objects_matching", "constraints").as_deref(),
            Some("2")
        );
        assert_eq!(
            span_field(&spans, "patient_batch", "keys").as_deref(),
            Some("4")
        );
        assert_eq!(
            span_field(&spans, "patient_batch", "model").as_deref(),
            Some("\"Encounter\"")
        );
    }
}
