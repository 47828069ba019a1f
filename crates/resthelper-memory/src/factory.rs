//! Session providers over a `MemoryStore`, in either API shape.

use std::sync::Arc;

use resthelper_session::{EntryPoint, LegacyObject, ProviderError, SessionHandle, SessionProvider};

use crate::store::MemoryStore;

/// Name under which the legacy shape publishes its entry point.
pub const LEGACY_ENTRY_POINT: &str = "current_session";

/// Which provider generation to imitate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiShape {
    /// Implements `SessionProvider::current_session` directly.
    #[default]
    Current,
    /// Only reachable through `find_entry_point`.
    Legacy,
}

/// Hands out the shared `MemoryStore` as the current unit of work.
#[derive(Debug, Clone)]
pub struct MemorySessionFactory {
    store: Arc<MemoryStore>,
    shape: ApiShape,
}

impl MemorySessionFactory {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self::with_shape(store, ApiShape::Current)
    }

    pub fn with_shape(store: Arc<MemoryStore>, shape: ApiShape) -> Self {
        Self { store, shape }
    }

    pub fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }

    pub fn shape(&self) -> ApiShape {
        self.shape
    }

    fn handle(&self) -> SessionHandle {
        self.store.clone()
    }
}

impl SessionProvider for MemorySessionFactory {
    fn current_session(&self) -> Result<SessionHandle, ProviderError> {
        match self.shape {
            ApiShape::Current => Ok(self.handle()),
            ApiShape::Legacy => Err(ProviderError::MissingEntryPoint {
                name: "current_session".to_string(),
            }),
        }
    }

    fn find_entry_point(&self, name: &str) -> Option<EntryPoint> {
        if self.shape != ApiShape::Legacy || name != LEGACY_ENTRY_POINT {
            return None;
        }
        let handle = self.handle();
        Some(EntryPoint::new(name, move || {
            Ok(Box::new(handle.clone()) as LegacyObject)
        }))
    }
}
