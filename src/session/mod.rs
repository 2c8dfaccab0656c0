//! Session revocation subsystem.
//!
//! # Data Flow
//! ```text
//! is_token_revoked(session_id)
//!     → revocation.rs (validate id, fail-closed policy)
//!     → store.rs ConnectionProvider (Available | Unavailable)
//!     → resilience::CircuitBreaker::execute
//!     → RevocationLookup::get("revoked:session:<id>")
//! ```
//!
//! # Design Decisions
//! - Callers get a bool, never an error
//! - The store connection is acquired per check and never cached
//! - memory.rs backs the CLI and tests; real clients plug in through store.rs

pub mod memory;
pub mod revocation;
pub mod store;

pub use memory::MemoryStore;
pub use revocation::{DecisionReason, RevocationDecision, RevocationGuard};
pub use store::{ConnectionProvider, Disconnected, RevocationLookup, StoreConnection, StoreError};
