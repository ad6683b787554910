//! Process-wide session registry.
//!
//! The [`SessionStore`] is the sole owner of session lifetime: it allocates
//! identifiers, hands out shared handles, and evicts. Each session sits
//! behind its own `tokio::sync::Mutex`, so operations on different sessions
//! run in parallel while operations on the same session serialize. The
//! registry map itself is guarded by a short-lived `parking_lot` lock that
//! is never held across an await point.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::dialogue::Session;
use crate::types::DiagError;

/// Opaque session identifier, safe to hand to callers.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Allocates a fresh identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Shared handle to one live session.
pub type SessionHandle = Arc<Mutex<Session>>;

/// Registry mapping session identifiers to their state machines.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<FxHashMap<SessionId, SessionHandle>>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a fresh `AwaitingProfile` session and returns its identifier.
    pub fn create(&self, config: &EngineConfig) -> SessionId {
        let id = SessionId::generate();
        let session = Session::new(id.clone(), config);
        self.sessions
            .write()
            .insert(id.clone(), Arc::new(Mutex::new(session)));
        debug!(session = %id, "created session");
        id
    }

    /// Looks up a live session.
    pub fn get(&self, id: &SessionId) -> Result<SessionHandle, DiagError> {
        self.sessions
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| DiagError::UnknownSession { id: id.to_string() })
    }

    /// Evicts a session. Idempotent: absent identifiers are not an error.
    pub fn remove(&self, id: &SessionId) {
        if self.sessions.write().remove(id).is_some() {
            debug!(session = %id, "removed session");
        }
    }

    /// Number of live sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}
