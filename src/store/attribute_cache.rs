use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::model::{attribute_cache_key, Attribute};

/// Flattened attributes per `model@version`. Entries live for the whole
/// process; there is no eviction.
#[derive(Debug, Default)]
pub struct AttributeCache {
    entries: Arc<RwLock<HashMap<String, Arc<Vec<Attribute>>>>>,
}

impl AttributeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, model: &str, version: &str) -> Option<Arc<Vec<Attribute>>> {
        let entries = self.entries.read().await;
        entries.get(&attribute_cache_key(model, version)).cloned()
    }

    pub async fn put(
        &self,
        model: &str,
        version: &str,
        attributes: Vec<Attribute>,
    ) -> Arc<Vec<Attribute>> {
        let attributes = Arc::new(attributes);
        let mut entries = self.entries.write().await;
        entries.insert(attribute_cache_key(model, version), attributes.clone());
        attributes
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}
