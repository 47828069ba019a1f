//! Session provider shapes.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use resthelper_core::error::BoxError;

use crate::SessionHandle;

/// What an introspected entry point returns before it is checked.
pub type LegacyObject = Box<dyn Any + Send>;

type Invoker = dyn Fn() -> Result<LegacyObject, ProviderError> + Send + Sync;

/// Failure reported by a session provider.
#[derive(Debug)]
pub enum ProviderError {
    /// The provider does not expose this entry point at all.
    MissingEntryPoint { name: String },
    /// The entry point exists but failed.
    Failed(BoxError),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::MissingEntryPoint { name } => {
                write!(f, "provider has no entry point '{}'", name)
            }
            ProviderError::Failed(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProviderError::Failed(e) => Some(e.as_ref()),
            ProviderError::MissingEntryPoint { .. } => None,
        }
    }
}

/// An entry point found by name on a provider's concrete type.
///
/// Invoking it yields an untyped object; the resolver checks that it really is
/// a [`SessionHandle`] before handing it out.
#[derive(Clone)]
pub struct EntryPoint {
    name: String,
    invoke: Arc<Invoker>,
}

impl EntryPoint {
    pub fn new<F>(name: impl Into<String>, invoke: F) -> Self
    where
        F: Fn() -> Result<LegacyObject, ProviderError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            invoke: Arc::new(invoke),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn invoke(&self) -> Result<LegacyObject, ProviderError> {
        (self.invoke)()
    }
}

impl fmt::Debug for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryPoint")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Source of the current unit of work.
///
/// Current providers implement [`current_session`](Self::current_session).
/// Older providers report `ProviderError::MissingEntryPoint` there and instead
/// publish an equivalently named entry point through
/// [`find_entry_point`](Self::find_entry_point).
pub trait SessionProvider: Send + Sync {
    /// Direct entry point.
    fn current_session(&self) -> Result<SessionHandle, ProviderError>;

    /// Look up an entry point by name on the concrete provider.
    fn find_entry_point(&self, name: &str) -> Option<EntryPoint> {
        let _ = name;
        None
    }

    /// Name used in diagnostics.
    fn provider_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_point_invokes_closure() {
        let entry = EntryPoint::new("current_session", || Ok(Box::new(7_u32) as LegacyObject));
        assert_eq!(entry.name(), "current_session");
        let obj = entry.invoke().unwrap();
        assert_eq!(obj.downcast_ref::<u32>(), Some(&7));
        assert!(format!("{:?}", entry).contains("current_session"));
    }

    #[test]
    fn test_provider_error_display() {
        let missing = ProviderError::MissingEntryPoint {
            name: "current_session".to_string(),
        };
        assert_eq!(
            missing.to_string(),
            "provider has no entry point 'current_session'"
        );
        let failed = ProviderError::Failed("pool exhausted".into());
        assert_eq!(failed.to_string(), "pool exhausted");
    }
}
