//! The lookup service resolving its session per call.

use std::sync::Arc;

use resthelper_core::{
    EntityType, Error, FieldConstraint, Model, Result, SessionError, SessionErrorKind, Value,
};
use resthelper_session::{SessionHandle, SessionProvider, SessionResolver, global_resolver};

use crate::config::HelperConfig;
use crate::lookup::Lookup;
use crate::patient::PatientModel;

/// Typed, read-only entity lookups against the current unit of work.
///
/// Each operation asks the resolver for the current session, runs one query
/// or key lookup and hands back detached model values. The service holds no
/// per-call state and is safe to share across threads.
#[derive(Debug, Clone)]
pub struct RestHelperService {
    resolver: Arc<SessionResolver>,
    config: HelperConfig,
}

impl RestHelperService {
    pub fn new(resolver: Arc<SessionResolver>) -> Self {
        Self::with_config(resolver, HelperConfig::default())
    }

    pub fn with_config(resolver: Arc<SessionResolver>, config: HelperConfig) -> Self {
        Self { resolver, config }
    }

    /// Build a service with its own resolver around `provider`.
    pub fn from_provider(provider: Arc<dyn SessionProvider>) -> Self {
        Self::new(Arc::new(SessionResolver::new(provider)))
    }

    /// Build a service sharing the process-wide resolver.
    pub fn from_global() -> Result<Self> {
        let resolver = global_resolver().ok_or_else(|| {
            Error::Session(SessionError {
                kind: SessionErrorKind::NoProvider,
                message: "no global session resolver installed".to_string(),
                source: None,
            })
        })?;
        Ok(Self::new(resolver))
    }

    pub fn config(&self) -> &HelperConfig {
        &self.config
    }

    pub fn resolver(&self) -> &Arc<SessionResolver> {
        &self.resolver
    }

    fn session(&self) -> Result<SessionHandle> {
        self.resolver.current_session()
    }

    /// Look an object up by its unique identifier.
    pub fn get_object_by_uuid<M: Model>(
        &self,
        entity: EntityType<M>,
        uuid: &str,
    ) -> Result<Option<M>> {
        let session = self.session()?;
        Lookup::new(session.as_ref(), &self.config).object_by_uuid(entity, uuid)
    }

    /// Look an object up by its surrogate key.
    pub fn get_object_by_id<M: Model>(
        &self,
        entity: EntityType<M>,
        id: impl Into<Value>,
    ) -> Result<Option<M>> {
        let session = self.session()?;
        Lookup::new(session.as_ref(), &self.config).object_by_id(entity, id)
    }

    /// Every object matching all given field constraints; `None` entries are ignored.
    pub fn get_objects_by_fields<M, I>(&self, entity: EntityType<M>, fields: I) -> Result<Vec<M>>
    where
        M: Model,
        I: IntoIterator,
        I::Item: Into<Option<FieldConstraint>>,
    {
        let session = self.session()?;
        Lookup::new(session.as_ref(), &self.config).objects_by_fields(entity, fields)
    }

    /// Non-voided patients among `ids`.
    ///
    /// An empty id set returns an empty list without resolving a session.
    pub fn get_patients<P, I>(&self, ids: I) -> Result<Vec<P>>
    where
        P: PatientModel,
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let mut ids = ids.into_iter().peekable();
        if ids.peek().is_none() {
            return Ok(Vec::new());
        }
        let session = self.session()?;
        Lookup::new(session.as_ref(), &self.config).patients(ids)
    }

    /// Patients whose identifier begins with `prefix`.
    pub fn find_patients_by_identifier_starting_with<P: PatientModel>(
        &self,
        prefix: &str,
        include_all: bool,
    ) -> Result<Vec<P>> {
        let session = self.session()?;
        Lookup::new(session.as_ref(), &self.config)
            .patients_by_identifier_prefix(prefix, include_all)
    }
}
