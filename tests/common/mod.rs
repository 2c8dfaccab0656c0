//! Shared doubles for integration tests.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use session_guard::session::{ConnectionProvider, RevocationLookup, StoreConnection, StoreError};

/// What the scripted store answers.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// No revocation record.
    Absent = 0,
    /// A revocation record exists.
    #[allow(dead_code)]
    Revoked = 1,
    /// The store cannot be reached.
    Failing = 2,
}

/// A store whose answer can be changed mid-test; counts every lookup.
#[derive(Debug)]
pub struct ScriptedStore {
    behavior: AtomicU8,
    calls: AtomicU32,
}

impl ScriptedStore {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior: AtomicU8::new(behavior as u8),
            calls: AtomicU32::new(0),
        })
    }

    #[allow(dead_code)]
    pub fn set(&self, behavior: Behavior) {
        self.behavior.store(behavior as u8, Ordering::SeqCst);
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RevocationLookup for ScriptedStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior.load(Ordering::SeqCst) {
            0 => Ok(None),
            1 => Ok(Some(format!("revoked ({})", key))),
            _ => Err(StoreError::Unreachable("connection refused".into())),
        }
    }
}

/// Provider that can drop its connection.
pub struct ScriptedProvider {
    store: Arc<ScriptedStore>,
    connected: AtomicBool,
}

impl ScriptedProvider {
    pub fn new(store: Arc<ScriptedStore>) -> Arc<Self> {
        Arc::new(Self {
            store,
            connected: AtomicBool::new(true),
        })
    }

    #[allow(dead_code)]
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }
}

#[async_trait]
impl ConnectionProvider for ScriptedProvider {
    async fn connection(&self) -> StoreConnection {
        if self.connected.load(Ordering::SeqCst) {
            StoreConnection::Available(self.store.clone())
        } else {
            StoreConnection::unavailable("client not initialized")
        }
    }
}
