use crate::error::Result;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

/// Options that identify one loadable model configuration.
pub trait ModelOptions {
    /// A string uniquely identifying the model this options value loads.
    fn cache_key(&self) -> String;
}

// Cache stores WEAK references - models are freed when all pipelines using them drop.
// The map lock is held across loading, so concurrent first access performs a single
// one-time initialization per key instead of racing loaders.
type CacheStorage = HashMap<(TypeId, String), Box<dyn Any + Send + Sync>>;

pub struct ModelCache {
    cache: Mutex<CacheStorage>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self {
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn get_or_create<M, F>(&self, key: &str, loader: F) -> Result<Arc<M>>
    where
        M: Send + Sync + 'static,
        F: FnOnce() -> Result<M>,
    {
        let type_id = TypeId::of::<M>();
        let cache_key = (type_id, key.to_string());

        let mut cache = self.cache.lock().unwrap();
        if let Some(boxed) = cache.get(&cache_key) {
            // Try to upgrade weak ref
            if let Some(weak) = boxed.downcast_ref::<Weak<M>>() {
                if let Some(strong) = weak.upgrade() {
                    return Ok(strong);
                }
            }
            // Weak ref dead, remove stale entry
            cache.remove(&cache_key);
        }

        let model = Arc::new(loader()?);
        let weak: Weak<M> = Arc::downgrade(&model);
        cache.insert(cache_key, Box::new(weak));

        Ok(model)
    }

    #[allow(dead_code)]
    pub fn clear(&self) {
        let mut cache = self.cache.lock().unwrap();
        cache.clear();
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        let cache = self.cache.lock().unwrap();
        cache.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        let cache = self.cache.lock().unwrap();
        cache.is_empty()
    }
}

impl Default for ModelCache {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_MODEL_CACHE: once_cell::sync::Lazy<ModelCache> =
    once_cell::sync::Lazy::new(ModelCache::new);

pub fn global_cache() -> &'static ModelCache {
    &GLOBAL_MODEL_CACHE
}
