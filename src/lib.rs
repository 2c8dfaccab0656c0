//! Fail-closed session revocation behind a circuit breaker.
//!
//! # Architecture Overview
//!
//! ```text
//!   auth layer
//!       │  is_token_revoked(session_id) -> bool
//!       ▼
//!  ┌──────────────────────┐      Unavailable       ┌──────────────┐
//!  │  session::revocation │◀──────────────────────│  connection  │
//!  │   (fail-closed)      │      Available(lookup) │   provider   │
//!  └──────────┬───────────┘                        └──────────────┘
//!             │ execute(lookup)
//!             ▼
//!  ┌──────────────────────┐   ┌───────────────┐   ┌──────────────┐
//!  │ resilience::circuit_ │──▶│  timeouts     │──▶│ store lookup │
//!  │ breaker (shared)     │   │  (deadline)   │   │ revoked:...  │
//!  └──────────────────────┘   └───────────────┘   └──────────────┘
//!
//!  cross-cutting: config (TOML), observability (tracing + metrics)
//! ```
//!
//! Every path that cannot positively confirm "no revocation record" ends in
//! `revoked = true`.

pub mod config;
pub mod observability;
pub mod resilience;
pub mod session;

pub use config::GuardConfig;
pub use resilience::{BreakerError, CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use session::{RevocationDecision, RevocationGuard};
