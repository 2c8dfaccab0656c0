//! Fail-closed session revocation checks.
//!
//! # Responsibilities
//! - Answer "is this session revoked?" for the authentication layer
//! - Route every store lookup through the shared circuit breaker
//! - Collapse every failure path to "revoked"
//!
//! # Design Decisions
//! - No error path resolves to "not revoked"; callers only ever see a bool
//! - An unavailable connection short-circuits before the breaker and does not
//!   count against it
//! - The lookup deadline sits inside the breaker call, so a hung store is a
//!   breaker failure like any other

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::config::GuardConfig;
use crate::observability::metrics;
use crate::resilience::timeouts::with_deadline;
use crate::resilience::{BreakerError, BreakerSnapshot, CircuitBreaker, CircuitState};
use crate::session::store::{
    is_revocation_record, revocation_key, ConnectionProvider, StoreConnection, StoreError,
    DEFAULT_KEY_PREFIX,
};

/// Why a decision came out the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionReason {
    /// Lookup succeeded and found no revocation record.
    NotRevoked,
    /// Lookup succeeded and found a revocation record.
    RecordFound,
    /// Session id was empty.
    InvalidSessionId,
    /// The provider had no store connection.
    StoreUnavailable,
    /// The breaker refused the lookup.
    CircuitOpen,
    /// The lookup ran and failed.
    LookupFailed,
}

impl DecisionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionReason::NotRevoked => "not_revoked",
            DecisionReason::RecordFound => "record_found",
            DecisionReason::InvalidSessionId => "invalid_session_id",
            DecisionReason::StoreUnavailable => "store_unavailable",
            DecisionReason::CircuitOpen => "circuit_open",
            DecisionReason::LookupFailed => "lookup_failed",
        }
    }

    /// Only a completed lookup without a record is safe.
    pub fn is_revoked(&self) -> bool {
        !matches!(self, DecisionReason::NotRevoked)
    }
}

impl fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one revocation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevocationDecision {
    pub revoked: bool,
    pub reason: DecisionReason,
}

impl From<DecisionReason> for RevocationDecision {
    fn from(reason: DecisionReason) -> Self {
        Self {
            revoked: reason.is_revoked(),
            reason,
        }
    }
}

/// Revocation checks against a store behind one shared breaker.
pub struct RevocationGuard {
    breaker: Arc<CircuitBreaker>,
    provider: Arc<dyn ConnectionProvider>,
    key_prefix: String,
    lookup_timeout: Option<Duration>,
}

impl RevocationGuard {
    pub fn new(breaker: Arc<CircuitBreaker>, provider: Arc<dyn ConnectionProvider>) -> Self {
        Self {
            breaker,
            provider,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            lookup_timeout: None,
        }
    }

    /// Build the guard and its dedicated breaker from configuration.
    pub fn from_config(config: &GuardConfig, provider: Arc<dyn ConnectionProvider>) -> Self {
        let breaker = Arc::new(CircuitBreaker::new((&config.breaker).into()));
        Self::new(breaker, provider)
            .with_key_prefix(config.revocation.key_prefix.clone())
            .with_lookup_timeout(config.revocation.lookup_timeout())
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    pub fn with_lookup_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }

    pub fn breaker_state(&self) -> CircuitState {
        self.breaker.state()
    }

    pub fn breaker_snapshot(&self) -> BreakerSnapshot {
        self.breaker.snapshot()
    }

    /// True unless the store confirmed there is no revocation record.
    pub async fn is_token_revoked(&self, session_id: &str) -> bool {
        self.check(session_id).await.revoked
    }

    /// Full decision including the reason.
    pub async fn check(&self, session_id: &str) -> RevocationDecision {
        if session_id.trim().is_empty() {
            tracing::warn!("Empty session id, failing closed");
            return decide(DecisionReason::InvalidSessionId);
        }

        let lookup = match self.provider.connection().await {
            StoreConnection::Available(lookup) => lookup,
            StoreConnection::Unavailable { reason } => {
                tracing::error!(
                    breaker = %self.breaker.name(),
                    reason = %reason,
                    "Revocation store unavailable, failing closed"
                );
                return decide(DecisionReason::StoreUnavailable);
            }
        };

        let key = revocation_key(&self.key_prefix, session_id);
        let deadline = self.lookup_timeout;
        let started = Instant::now();

        let outcome = self
            .breaker
            .execute(|| async move {
                let record = with_deadline(deadline, lookup.get(&key)).await??;
                Ok::<_, StoreError>(record)
            })
            .await;

        let reason = match outcome {
            Ok(record) => {
                metrics::record_lookup_duration(started.elapsed());
                if is_revocation_record(record.as_deref()) {
                    DecisionReason::RecordFound
                } else {
                    DecisionReason::NotRevoked
                }
            }
            Err(BreakerError::Open { name }) => {
                tracing::error!(breaker = %name, "Circuit open, failing closed");
                DecisionReason::CircuitOpen
            }
            Err(BreakerError::Operation(e)) => {
                metrics::record_lookup_duration(started.elapsed());
                tracing::error!(
                    breaker = %self.breaker.name(),
                    error = %e,
                    "Revocation lookup failed, failing closed"
                );
                DecisionReason::LookupFailed
            }
        };

        tracing::debug!(reason = %reason, "Revocation check complete");
        decide(reason)
    }
}

fn decide(reason: DecisionReason) -> RevocationDecision {
    metrics::record_decision(reason.as_str());
    reason.into()
}
