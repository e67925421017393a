use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;

use super::ObjectStore;
use crate::error::{BucketError, BucketResult};

/// In-memory bucket for tests. Keys listed in `broken` fail every operation.
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
    broken: HashSet<String>,
    pub probes: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn with_keys(keys: &[&str]) -> Self {
        let store = MemoryStore::default();
        for key in keys {
            store.insert(key, key.as_bytes());
        }
        store
    }

    pub fn insert(&self, key: &str, body: &[u8]) {
        self.objects.lock().unwrap().insert(key.to_string(), body.to_vec());
    }

    pub fn break_key(mut self, key: &str) -> Self {
        self.broken.insert(key.to_string());
        self
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    pub fn body(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    fn check(&self, op: &'static str, key: &str) -> BucketResult<()> {
        if self.broken.contains(key) {
            return Err(BucketError::storage(op, key, "access denied"));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn exists(&self, key: &str) -> BucketResult<bool> {
        self.probes.lock().unwrap().push(key.to_string());
        self.check("head", key)?;
        Ok(self.objects.lock().unwrap().contains_key(key))
    }

    async fn put_file(&self, local: &Path, key: &str) -> BucketResult<()> {
        self.check("put", key)?;
        let body = tokio::fs::read(local).await?;
        self.insert(key, &body);
        Ok(())
    }

    async fn list_keys(&self, prefix: &str) -> BucketResult<Vec<String>> {
        self.check("list", prefix)?;
        Ok(self.keys().into_iter().filter(|k| k.starts_with(prefix)).collect())
    }

    async fn download(&self, key: &str, local: &Path) -> BucketResult<()> {
        self.check("get", key)?;
        let body = self
            .body(key)
            .ok_or_else(|| BucketError::storage("get", key, "no such key"))?;
        tokio::fs::write(local, body).await?;
        Ok(())
    }
}
