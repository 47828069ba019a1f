//! Process-wide resolver slot.
//!
//! Applications normally build one `SessionResolver` at startup and install it
//! here so every service shares the same memoized dispatch decision. The slot
//! is set once; later installs are ignored.

use std::sync::{Arc, OnceLock};

use crate::resolver::SessionResolver;

static GLOBAL_RESOLVER: OnceLock<Arc<SessionResolver>> = OnceLock::new();

/// Install the process-wide resolver.
///
/// Returns `false` (and keeps the existing resolver) if one was already installed.
pub fn install_global_resolver(resolver: Arc<SessionResolver>) -> bool {
    let installed = GLOBAL_RESOLVER.set(resolver).is_ok();
    if !installed {
        tracing::warn!("Global session resolver already installed, ignoring replacement");
    }
    installed
}

/// The process-wide resolver, if one has been installed.
pub fn global_resolver() -> Option<Arc<SessionResolver>> {
    GLOBAL_RESOLVER.get().cloned()
}
