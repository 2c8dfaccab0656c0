//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Revocation lookup:
//!     → circuit_breaker.rs (fail fast while the store is known to be down)
//!     → timeouts.rs (deadline on the lookup itself)
//!     → store client
//! ```
//!
//! # Design Decisions
//! - One breaker per dependency, shared by all callers
//! - The breaker gates calls but never retries them
//! - Deadlines belong to the wrapped call, not to the breaker

pub mod circuit_breaker;
pub mod timeouts;

pub use circuit_breaker::{BreakerError, BreakerSnapshot, CircuitBreaker, CircuitBreakerConfig, CircuitState};
