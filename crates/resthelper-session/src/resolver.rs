//! Adaptive resolution of the current unit of work.
//!
//! # Lifecycle
//!
//! A `SessionResolver` starts with no dispatch decision. The first successful
//! `current_session` call records which entry point worked (`DispatchPath`);
//! every later call goes straight through that path. The decision is written
//! at most once. Two threads racing on the first call may both probe, but the
//! probe is deterministic so both reach the same path and only the first write
//! is kept.

use std::fmt;
use std::sync::{Arc, OnceLock};

use resthelper_core::error::BoxError;
use resthelper_core::{Error, Result, SessionError, SessionErrorKind};

use crate::SessionHandle;
use crate::provider::{EntryPoint, ProviderError, SessionProvider};

/// Resolver configuration.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Name looked up on the provider when the direct entry point is missing.
    pub entry_point: String,
    /// Whether the introspected fallback may be used at all.
    pub allow_introspection: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            entry_point: "current_session".to_string(),
            allow_introspection: true,
        }
    }
}

impl ResolverConfig {
    pub fn with_entry_point(mut self, name: impl Into<String>) -> Self {
        self.entry_point = name.into();
        self
    }

    pub fn without_introspection(mut self) -> Self {
        self.allow_introspection = false;
        self
    }
}

/// The entry point a resolver has settled on.
#[derive(Debug, Clone)]
pub enum DispatchPath {
    /// `SessionProvider::current_session`.
    Direct,
    /// An entry point found through `SessionProvider::find_entry_point`.
    Introspected(EntryPoint),
}

impl DispatchPath {
    pub fn label(&self) -> &'static str {
        match self {
            DispatchPath::Direct => "direct",
            DispatchPath::Introspected(_) => "introspected",
        }
    }
}

/// Obtains the current unit of work from a [`SessionProvider`].
pub struct SessionResolver {
    provider: Option<Arc<dyn SessionProvider>>,
    config: ResolverConfig,
    dispatch: OnceLock<DispatchPath>,
}

impl SessionResolver {
    pub fn new(provider: Arc<dyn SessionProvider>) -> Self {
        Self::with_config(provider, ResolverConfig::default())
    }

    pub fn with_config(provider: Arc<dyn SessionProvider>, config: ResolverConfig) -> Self {
        Self {
            provider: Some(provider),
            config,
            dispatch: OnceLock::new(),
        }
    }

    /// A resolver with no provider; every resolution fails fatally.
    pub fn unconfigured() -> Self {
        Self {
            provider: None,
            config: ResolverConfig::default(),
            dispatch: OnceLock::new(),
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// The memoized path, once one has succeeded.
    pub fn dispatch_path(&self) -> Option<&DispatchPath> {
        self.dispatch.get()
    }

    /// Return the current unit of work.
    ///
    /// Every failure is an `Error::Session` and is fatal.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn current_session(&self) -> Result<SessionHandle> {
        let Some(provider) = self.provider.as_deref() else {
            return Err(session_error(
                SessionErrorKind::NoProvider,
                "no session provider configured".to_string(),
                None,
            ));
        };

        match self.dispatch.get() {
            Some(DispatchPath::Direct) => provider
                .current_session()
                .map_err(|e| provider_failure(provider, e)),
            Some(DispatchPath::Introspected(entry)) => invoke_entry_point(provider, entry),
            None => self.probe(provider),
        }
    }

    fn probe(&self, provider: &dyn SessionProvider) -> Result<SessionHandle> {
        match provider.current_session() {
            Ok(handle) => {
                self.memoize(provider, DispatchPath::Direct);
                Ok(handle)
            }
            Err(missing @ ProviderError::MissingEntryPoint { .. }) => {
                tracing::debug!(
                    provider = provider.provider_name(),
                    missing = %missing,
                    "Direct session entry point missing, trying introspection"
                );
                if !self.config.allow_introspection {
                    return Err(session_error(
                        SessionErrorKind::EntryPointMissing,
                        format!(
                            "{} has no direct session entry point and introspection is disabled",
                            provider.provider_name()
                        ),
                        Some(Box::new(missing)),
                    ));
                }

                let Some(entry) = provider.find_entry_point(&self.config.entry_point) else {
                    return Err(session_error(
                        SessionErrorKind::EntryPointMissing,
                        format!(
                            "{} exposes no '{}' entry point",
                            provider.provider_name(),
                            self.config.entry_point
                        ),
                        Some(Box::new(missing)),
                    ));
                };
                let handle = invoke_entry_point(provider, &entry)?;
                self.memoize(provider, DispatchPath::Introspected(entry));
                Ok(handle)
            }
            Err(other) => Err(provider_failure(provider, other)),
        }
    }

    fn memoize(&self, provider: &dyn SessionProvider, path: DispatchPath) {
        let label = path.label();
        if self.dispatch.set(path).is_ok() {
            tracing::info!(
                provider = provider.provider_name(),
                path = label,
                "Session dispatch path memoized"
            );
        }
    }
}

impl fmt::Debug for SessionResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionResolver")
            .field(
                "provider",
                &self.provider.as_deref().map(|p| p.provider_name()),
            )
            .field("config", &self.config)
            .field("dispatch", &self.dispatch.get().map(DispatchPath::label))
            .finish()
    }
}

fn invoke_entry_point(provider: &dyn SessionProvider, entry: &EntryPoint) -> Result<SessionHandle> {
    let object = entry
        .invoke()
        .map_err(|e| provider_failure(provider, e))?;
    match object.downcast::<SessionHandle>() {
        Ok(handle) => Ok(*handle),
        Err(_) => Err(session_error(
            SessionErrorKind::IncompatibleHandle,
            format!(
                "entry point '{}' of {} did not return a session handle",
                entry.name(),
                provider.provider_name()
            ),
            None,
        )),
    }
}

fn provider_failure(provider: &dyn SessionProvider, err: ProviderError) -> Error {
    let kind = match err {
        ProviderError::MissingEntryPoint { .. } => SessionErrorKind::EntryPointMissing,
        ProviderError::Failed(_) => SessionErrorKind::EntryPointFailed,
    };
    session_error(
        kind,
        format!(
            "failed to obtain current session from {}",
            provider.provider_name()
        ),
        Some(Box::new(err)),
    )
}

fn session_error(kind: SessionErrorKind, message: String, source: Option<BoxError>) -> Error {
    tracing::error!(kind = ?kind, detail = %message, "Session resolution failed");
    Error::Session(SessionError {
        kind,
        message,
        source,
    })
}
