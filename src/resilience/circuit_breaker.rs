//! Circuit breaker for the revocation store.
//!
//! # States
//! - Closed: normal operation, calls pass through
//! - Open: store assumed down, calls fail fast without being attempted
//! - Half-Open: a single probe call tests whether the store recovered
//!
//! # State Transitions
//! ```text
//! Closed → Open: failure_count >= failure_threshold
//! Open → Half-Open: first execute() after the cooldown elapsed (lazy, no timer)
//! Half-Open → Closed: probe succeeds
//! Half-Open → Open: probe fails (cooldown window recomputed from now)
//! ```
//!
//! # Design Decisions
//! - One breaker per dependency, shared by every caller through `Arc`
//! - State lives behind one mutex; the lock is never held across the wrapped call
//! - Any success resets the failure count to zero, no gradual decay
//! - The wrapped error is returned untouched; only `BreakerError::Open` means "not attempted"

use std::fmt;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;

use crate::observability::metrics;

/// Externally observable breaker state.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed = 0,
    Open = 1,
    HalfOpen = 2,
}

impl CircuitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half-open",
        }
    }
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Construction-time breaker settings.
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Label used in logs and metrics.
    pub name: String,
    /// Consecutive failures before the circuit opens (at least 1).
    pub failure_threshold: u32,
    /// How long the circuit stays open before a probe is allowed.
    pub cooldown: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            name: "redis-token-revocation".to_string(),
            failure_threshold: 5,
            cooldown: Duration::from_secs(60),
        }
    }
}

/// Error returned by [`CircuitBreaker::execute`].
#[derive(Debug, Error)]
pub enum BreakerError<E> {
    /// The circuit rejected the call; the operation was never invoked.
    #[error("circuit '{name}' is open")]
    Open { name: String },

    /// The operation ran and failed with its own error.
    #[error("{0}")]
    Operation(E),
}

impl<E> BreakerError<E> {
    /// True when the call was rejected without being attempted.
    pub fn is_open(&self) -> bool {
        matches!(self, BreakerError::Open { .. })
    }

    /// The wrapped operation's error, if the operation actually ran.
    pub fn into_operation(self) -> Option<E> {
        match self {
            BreakerError::Operation(e) => Some(e),
            BreakerError::Open { .. } => None,
        }
    }
}

/// Point-in-time view of a breaker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakerSnapshot {
    pub name: String,
    pub state: CircuitState,
    pub failure_count: u32,
    /// Time left before a probe is admitted, while open.
    pub retry_after: Option<Duration>,
}

#[derive(Debug, Clone, Copy)]
enum Phase {
    Closed,
    Open { until: Instant },
    HalfOpen { probing: bool },
}

impl Phase {
    fn state(&self) -> CircuitState {
        match self {
            Phase::Closed => CircuitState::Closed,
            Phase::Open { .. } => CircuitState::Open,
            Phase::HalfOpen { .. } => CircuitState::HalfOpen,
        }
    }
}

#[derive(Debug)]
struct BreakerInner {
    phase: Phase,
    failure_count: u32,
    /// Bumped for every admitted probe; a permit only frees its own slot.
    probe_generation: u64,
}

impl BreakerInner {
    fn start_probe(&mut self) -> u64 {
        self.probe_generation = self.probe_generation.wrapping_add(1);
        self.phase = Phase::HalfOpen { probing: true };
        self.probe_generation
    }
}

/// Guards calls to one dependency.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerInner>,
}

impl CircuitBreaker {
    /// Create a closed breaker. A zero threshold is treated as 1.
    pub fn new(mut config: CircuitBreakerConfig) -> Self {
        config.failure_threshold = config.failure_threshold.max(1);
        metrics::record_breaker_state(&config.name, CircuitState::Closed);
        Self {
            config,
            inner: Mutex::new(BreakerInner {
                phase: Phase::Closed,
                failure_count: 0,
                probe_generation: 0,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Stored state. The Open → Half-Open move only happens inside `execute`.
    pub fn state(&self) -> CircuitState {
        self.lock().phase.state()
    }

    pub fn failure_count(&self) -> u32 {
        self.lock().failure_count
    }

    pub fn snapshot(&self) -> BreakerSnapshot {
        let inner = self.lock();
        let retry_after = match inner.phase {
            Phase::Open { until } => Some(until.saturating_duration_since(Instant::now())),
            _ => None,
        };
        BreakerSnapshot {
            name: self.config.name.clone(),
            state: inner.phase.state(),
            failure_count: inner.failure_count,
            retry_after,
        }
    }

    /// Run `operation` if the circuit allows it and record the outcome.
    ///
    /// Returns `BreakerError::Open` without calling `operation` while the
    /// circuit is open (or a half-open probe is already in flight). Otherwise
    /// the operation's own result is returned, its error wrapped in
    /// `BreakerError::Operation`.
    pub async fn execute<F, Fut, T, E>(&self, operation: F) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let permit = match self.admit() {
            Some(permit) => permit,
            None => {
                metrics::record_breaker_rejection(&self.config.name);
                return Err(BreakerError::Open {
                    name: self.config.name.clone(),
                });
            }
        };

        match operation().await {
            Ok(value) => {
                permit.settle();
                self.on_success();
                Ok(value)
            }
            Err(e) => {
                permit.settle();
                self.on_failure();
                Err(BreakerError::Operation(e))
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, BreakerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn admit(&self) -> Option<CallPermit<'_>> {
        let mut inner = self.lock();
        let phase = inner.phase;
        match phase {
            Phase::Closed => Some(CallPermit::new(self, None)),
            Phase::Open { until } if Instant::now() < until => None,
            Phase::Open { .. } => {
                let generation = inner.start_probe();
                tracing::info!(
                    breaker = %self.config.name,
                    failures = inner.failure_count,
                    "Circuit half-open, admitting probe"
                );
                metrics::record_breaker_state(&self.config.name, CircuitState::HalfOpen);
                Some(CallPermit::new(self, Some(generation)))
            }
            Phase::HalfOpen { probing: true } => None,
            Phase::HalfOpen { probing: false } => {
                let generation = inner.start_probe();
                Some(CallPermit::new(self, Some(generation)))
            }
        }
    }

    fn on_success(&self) {
        let mut inner = self.lock();
        let previous = inner.phase.state();
        inner.failure_count = 0;
        inner.phase = Phase::Closed;

        if previous != CircuitState::Closed {
            tracing::info!(breaker = %self.config.name, from = %previous, "Circuit closed");
            metrics::record_breaker_state(&self.config.name, CircuitState::Closed);
        }
    }

    fn on_failure(&self) {
        let mut inner = self.lock();
        inner.failure_count = inner.failure_count.saturating_add(1);

        let probe_failed = matches!(inner.phase, Phase::HalfOpen { .. });
        if probe_failed || inner.failure_count >= self.config.failure_threshold {
            inner.phase = Phase::Open {
                until: cooldown_deadline(Instant::now(), self.config.cooldown),
            };
            tracing::warn!(
                breaker = %self.config.name,
                failures = inner.failure_count,
                cooldown = ?self.config.cooldown,
                probe_failed,
                "Circuit is now OPEN"
            );
            metrics::record_breaker_state(&self.config.name, CircuitState::Open);
        }
    }

    fn release_probe(&self, generation: u64) {
        let mut inner = self.lock();
        if let Phase::HalfOpen { probing: true } = inner.phase {
            if inner.probe_generation == generation {
                inner.phase = Phase::HalfOpen { probing: false };
            }
        }
    }
}

/// Roughly 30 years, used when `now + cooldown` does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

fn cooldown_deadline(now: Instant, cooldown: Duration) -> Instant {
    now.checked_add(cooldown).unwrap_or_else(|| now + FAR_FUTURE)
}

/// Admission ticket for one call. A probe that is dropped before it
/// settles (caller cancelled) frees the half-open slot, but only if that
/// slot still belongs to it.
struct CallPermit<'a> {
    breaker: &'a CircuitBreaker,
    probe: Option<u64>,
}

impl<'a> CallPermit<'a> {
    fn new(breaker: &'a CircuitBreaker, probe: Option<u64>) -> Self {
        Self { breaker, probe }
    }

    fn settle(mut self) {
        self.probe = None;
    }
}

impl Drop for CallPermit<'_> {
    fn drop(&mut self) {
        if let Some(generation) = self.probe {
            self.breaker.release_probe(generation);
        }
    }
}
