//! Revocation store seam.
//!
//! The guard never talks to a concrete store client. It asks a
//! [`ConnectionProvider`] for a [`StoreConnection`] on every check and, when a
//! lookup capability is available, reads `revoked:session:<id>` through it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::resilience::timeouts::DeadlineExceeded;

/// Default prefix of revocation keys.
pub const DEFAULT_KEY_PREFIX: &str = "revoked:session:";

/// Build the store key for a session.
pub fn revocation_key(prefix: &str, session_id: &str) -> String {
    format!("{}{}", prefix, session_id)
}

/// A stored record marks the session revoked only when it is present and non-empty.
pub fn is_revocation_record(record: Option<&str>) -> bool {
    record.is_some_and(|value| !value.is_empty())
}

/// Errors raised by a store lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Store could not be reached (connection refused, reset, DNS).
    #[error("store unreachable: {0}")]
    Unreachable(String),

    /// Store answered with something that is not a valid reply.
    #[error("store protocol error: {0}")]
    Protocol(String),

    /// Lookup did not finish in time.
    #[error("store lookup timed out after {0:?}")]
    Timeout(Duration),
}

impl From<DeadlineExceeded> for StoreError {
    fn from(e: DeadlineExceeded) -> Self {
        StoreError::Timeout(e.0)
    }
}

/// Read access to revocation records (string-or-absence semantics).
#[async_trait]
pub trait RevocationLookup: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
}

/// Outcome of asking for a store connection.
#[derive(Clone)]
pub enum StoreConnection {
    /// A live lookup capability.
    Available(Arc<dyn RevocationLookup>),
    /// No client exists right now. Not an error, but never "safe".
    Unavailable { reason: String },
}

impl StoreConnection {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        StoreConnection::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, StoreConnection::Available(_))
    }
}

impl std::fmt::Debug for StoreConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreConnection::Available(_) => f.write_str("Available"),
            StoreConnection::Unavailable { reason } => {
                f.debug_struct("Unavailable").field("reason", reason).finish()
            }
        }
    }
}

/// Hands out store connections. Acquired per check, never cached by the guard.
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    async fn connection(&self) -> StoreConnection;
}

/// Provider for deployments with no store client configured.
#[derive(Debug, Clone)]
pub struct Disconnected {
    reason: String,
}

impl Disconnected {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Default for Disconnected {
    fn default() -> Self {
        Self::new("store client not initialized")
    }
}

#[async_trait]
impl ConnectionProvider for Disconnected {
    async fn connection(&self) -> StoreConnection {
        StoreConnection::unavailable(self.reason.clone())
    }
}
