//! In-process revocation store with optional JSON persistence.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::session::store::{
    is_revocation_record, revocation_key, ConnectionProvider, RevocationLookup, StoreConnection,
    StoreError, DEFAULT_KEY_PREFIX,
};

/// A thread-safe revocation store keyed by full revocation key.
///
/// Clones share the same records.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    records: Arc<DashMap<String, String>>,
    key_prefix: String,
    persistence_path: Option<PathBuf>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(None)
    }
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new(persistence_path: Option<PathBuf>) -> Self {
        Self {
            records: Arc::new(DashMap::new()),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            persistence_path,
        }
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Load revocations (session id → reason) from a JSON file, if it exists.
    pub fn load_from_file(path: &Path, key_prefix: &str) -> std::io::Result<Self> {
        let store = Self::new(Some(path.to_path_buf())).with_key_prefix(key_prefix);
        if path.exists() {
            let reader = BufReader::new(File::open(path)?);
            let entries: HashMap<String, String> = serde_json::from_reader(reader)?;
            for (session_id, reason) in entries {
                store.revoke(&session_id, reason);
            }
            tracing::info!(path = %path.display(), count = store.count(), "Loaded revocations");
        }
        Ok(store)
    }

    /// Write all revocations back to the persistence path, if one is set.
    pub fn save_to_file(&self) -> std::io::Result<()> {
        if let Some(path) = &self.persistence_path {
            let entries: HashMap<String, String> = self
                .records
                .iter()
                .filter_map(|r| {
                    r.key()
                        .strip_prefix(&self.key_prefix)
                        .map(|id| (id.to_string(), r.value().clone()))
                })
                .collect();

            let writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(writer, &entries)?;
            tracing::info!(path = %path.display(), count = entries.len(), "Saved revocations");
        }
        Ok(())
    }

    /// Mark a session revoked.
    pub fn revoke(&self, session_id: &str, reason: impl Into<String>) {
        self.records
            .insert(revocation_key(&self.key_prefix, session_id), reason.into());
    }

    /// Remove a revocation. Returns true if one existed.
    pub fn restore(&self, session_id: &str) -> bool {
        self.records
            .remove(&revocation_key(&self.key_prefix, session_id))
            .is_some()
    }

    pub fn reason(&self, session_id: &str) -> Option<String> {
        self.records
            .get(&revocation_key(&self.key_prefix, session_id))
            .map(|r| r.value().clone())
    }

    /// Same rule the guard applies: a present, non-empty record.
    pub fn is_revoked_locally(&self, session_id: &str) -> bool {
        is_revocation_record(self.reason(session_id).as_deref())
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }
}

#[async_trait]
impl RevocationLookup for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.records.get(key).map(|r| r.value().clone()))
    }
}

#[async_trait]
impl ConnectionProvider for MemoryStore {
    async fn connection(&self) -> StoreConnection {
        StoreConnection::Available(Arc::new(self.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_revoke_and_restore() {
        let store = MemoryStore::default();
        assert_eq!(store.get("revoked:session:s1").await.unwrap(), None);

        store.revoke("s1", "logout");
        assert_eq!(
            store.get("revoked:session:s1").await.unwrap(),
            Some("logout".to_string())
        );
        assert_eq!(store.reason("s1").as_deref(), Some("logout"));
        assert_eq!(store.count(), 1);

        assert!(store.restore("s1"));
        assert!(!store.restore("s1"));
        assert_eq!(store.get("revoked:session:s1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clones_share_records() {
        let store = MemoryStore::default();
        let StoreConnection::Available(lookup) = store.connection().await else {
            panic!("memory store is always available");
        };

        store.revoke("s2", "compromised");
        assert_eq!(
            lookup.get("revoked:session:s2").await.unwrap(),
            Some("compromised".to_string())
        );
    }

    #[test]
    fn test_is_revoked_locally() {
        let store = MemoryStore::default();
        assert!(!store.is_revoked_locally("s1"));

        store.revoke("s1", "logout");
        store.revoke("s2", "");
        assert!(store.is_revoked_locally("s1"));
        assert!(!store.is_revoked_locally("s2"));

        store.restore("s1");
        assert!(!store.is_revoked_locally("s1"));
    }

    #[test]
    fn test_custom_prefix() {
        let store = MemoryStore::default().with_key_prefix("rv:");
        store.revoke("abc", "x");
        assert!(store.records.contains_key("rv:abc"));
    }

    #[test]
    fn test_persistence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("revocations.json");

        let store = MemoryStore::new(Some(path.clone()));
        store.revoke("s1", "logout");
        store.revoke("s2", "password reset");
        store.save_to_file().unwrap();

        let loaded = MemoryStore::load_from_file(&path, DEFAULT_KEY_PREFIX).unwrap();
        assert_eq!(loaded.count(), 2);
        assert_eq!(loaded.reason("s2").as_deref(), Some("password reset"));
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::load_from_file(&dir.path().join("absent.json"), DEFAULT_KEY_PREFIX)
            .unwrap();
        assert_eq!(store.count(), 0);
    }
}
