use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::{StorageClient, StorageError, StoredObject};

/// In-process content store keyed by a sha256-derived identifier.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    objects: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    failing: Arc<AtomicBool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent uploads fail
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn get(&self, hash: &str) -> Option<Vec<u8>> {
        self.objects.lock().ok()?.get(hash).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().map(|o| o.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl StorageClient for MemoryStorage {
    async fn upload(
        &self,
        _api_key: &str,
        name: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredObject, StorageError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("simulated storage outage".into()));
        }
        let hash = format!("mem{}", hex::encode(Sha256::digest(&bytes)));
        let size = bytes.len() as u64;
        self.objects
            .lock()
            .map_err(|_| StorageError::Unavailable("storage lock poisoned".into()))?
            .insert(hash.clone(), bytes);
        Ok(StoredObject {
            name: name.to_string(),
            hash,
            size,
        })
    }

    fn gateway_url(&self, hash: &str) -> String {
        format!("memory://ipfs/{hash}")
    }
}
