use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::ObjectStore;
use crate::errors::Result;

#[derive(Debug, Clone)]
struct StoredObject {
    body: String,
    content_type: String,
}

/// Process-local object store; contents vanish on restart
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<String, StoredObject>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Content type recorded by the last `put` of `key`
    pub fn content_type(&self, key: &str) -> Option<String> {
        self.objects
            .read()
            .get(key)
            .map(|o| o.content_type.clone())
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.objects.read().contains_key(key))
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.objects.read().get(key).map(|o| o.body.clone()))
    }

    async fn put(&self, key: &str, body: String, content_type: &str) -> Result<()> {
        self.objects.write().insert(
            key.to_string(),
            StoredObject {
                body,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("memory://{}", key)
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}
