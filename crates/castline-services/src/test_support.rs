//! Test doubles shared by the service tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use castline_core::models::{FinalizeMetadata, Podcast};
use castline_db::{InMemoryStore, PodcastStore};
use castline_storage::{Storage, StorageBackend, StorageError, StorageResult};
use chrono::Utc;
use uuid::Uuid;

/// Object store kept in a map, with switches to make copies or presigning fail
#[derive(Default)]
pub struct MemoryStorage {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    pub fail_copy: AtomicBool,
    pub fail_presign: AtomicBool,
    pub copies: AtomicUsize,
}

impl MemoryStorage {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn insert(&self, key: &str, data: &[u8]) {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), data.to_vec());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .lock()
            .unwrap()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn put(&self, storage_key: &str, data: Vec<u8>, _content_type: &str) -> StorageResult<()> {
        self.objects
            .lock()
            .unwrap()
            .insert(storage_key.to_string(), data);
        Ok(())
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(storage_key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(storage_key.to_string()))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        self.objects.lock().unwrap().remove(storage_key);
        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        Ok(self.contains(storage_key))
    }

    async fn copy(&self, from_key: &str, to_key: &str) -> StorageResult<()> {
        if self.fail_copy.load(Ordering::SeqCst) {
            return Err(StorageError::BackendError("copy timed out".to_string()));
        }
        let mut objects = self.objects.lock().unwrap();
        let data = objects
            .get(from_key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(from_key.to_string()))?;
        objects.insert(to_key.to_string(), data);
        self.copies.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn presigned_get_url(
        &self,
        storage_key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        if self.fail_presign.load(Ordering::SeqCst) {
            return Err(StorageError::BackendError("signer unavailable".to_string()));
        }
        Ok(format!(
            "https://objects.test/{}?method=GET&ttl={}",
            storage_key,
            expires_in.as_secs()
        ))
    }

    async fn presigned_put_url(
        &self,
        storage_key: &str,
        _content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        if self.fail_presign.load(Ordering::SeqCst) {
            return Err(StorageError::BackendError("signer unavailable".to_string()));
        }
        Ok(format!(
            "https://objects.test/{}?method=PUT&ttl={}",
            storage_key,
            expires_in.as_secs()
        ))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

pub fn allowed_content_types() -> Vec<String> {
    vec!["audio/mpeg".to_string(), "audio/mp4".to_string()]
}

pub async fn seed_podcast(store: &InMemoryStore, owner_id: Uuid) -> Podcast {
    let podcast = Podcast {
        id: Uuid::new_v4(),
        owner_id,
        title: "Castline Weekly".to_string(),
        external_show_ids: HashMap::new(),
        created_at: Utc::now(),
    };
    store.create_podcast(&podcast).await.unwrap();
    podcast
}

pub fn finalize_metadata(title: &str) -> FinalizeMetadata {
    FinalizeMetadata {
        title: title.to_string(),
        description: "Show notes".to_string(),
        duration_sec: 1800,
        explicit: false,
        keywords: vec!["rust".to_string()],
        episode_number: Some(1),
        season_number: None,
    }
}
