use crate::error::{Error, Result};
use crate::model::TypeModel;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use terser_models::{FieldDefinition, TypeDescriptor};
use tracing::debug;

const DEFAULT_CAPACITY: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FieldKey {
    type_name: String,
    field: String,
}

/// LRU-cached field lookups over another [`TypeModel`].
///
/// Both hits and misses are remembered, so repeated lookups of an unknown
/// field do not reach the inner model either. Unknown types are not cached.
pub struct CachingTypeModel<M> {
    inner: M,
    field_cache: Mutex<LruCache<FieldKey, Option<FieldDefinition>>>,
}

impl<M: TypeModel> CachingTypeModel<M> {
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            field_cache: Mutex::new(LruCache::new(capacity(DEFAULT_CAPACITY))),
        }
    }

    pub fn with_cache_capacity(self, capacity_hint: usize) -> Self {
        {
            let mut cache = self
                .field_cache
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            *cache = LruCache::new(capacity(capacity_hint));
        }
        self
    }

    pub fn clear_cache(&self) {
        let mut cache = self
            .field_cache
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        cache.clear();
    }

    /// Number of cached lookups
    pub fn cached_len(&self) -> usize {
        self.field_cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }
}

fn capacity(requested: usize) -> NonZeroUsize {
    NonZeroUsize::new(requested.max(1)).unwrap_or(NonZeroUsize::MIN)
}

impl<M: TypeModel> TypeModel for CachingTypeModel<M> {
    fn get_type(&self, type_name: &str) -> Option<Arc<TypeDescriptor>> {
        self.inner.get_type(type_name)
    }

    fn child_field(&self, type_name: &str, field_name: &str) -> Result<FieldDefinition> {
        let key = FieldKey {
            type_name: type_name.to_string(),
            field: field_name.to_string(),
        };

        {
            let mut cache = self
                .field_cache
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            if let Some(entry) = cache.get(&key) {
                debug!("Field cache hit: {}.{}", type_name, field_name);
                return entry.clone().ok_or_else(|| Error::UnknownField {
                    type_name: type_name.to_string(),
                    field: field_name.to_string(),
                });
            }
        }

        debug!("Field cache miss: {}.{}", type_name, field_name);
        let resolved = self.inner.child_field(type_name, field_name);
        let entry = match &resolved {
            Ok(field) => Some(Some(field.clone())),
            Err(Error::UnknownField { .. }) => Some(None),
            Err(_) => None,
        };
        if let Some(entry) = entry {
            let mut cache = self
                .field_cache
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            cache.put(key, entry);
        }
        resolved
    }
}
