//! In-process memoization of collaborator lookups

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};

/// Memoizes the results of slow external lookups (base environments, image
/// digests) for the lifetime of one run.
///
/// Only successful results are cached; a failed lookup is retried the next
/// time it is asked for.
#[derive(Debug, Clone)]
pub struct LookupCache<V> {
    name: &'static str,
    entries: Arc<Mutex<HashMap<String, V>>>,
}

impl<V: Clone> LookupCache<V> {
    /// Create a new empty cache. `name` shows up in lock errors.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Get a cached value, or compute and cache it if not present
    pub fn get_or_fetch<F>(&self, key: &str, fetch: F) -> Result<V>
    where
        F: FnOnce() -> Result<V>,
    {
        if let Some(cached) = self.get(key)? {
            log::debug!("{} cache hit: {}", self.name, key);
            return Ok(cached);
        }

        let value = fetch()?;

        self.lock()?.insert(key.to_string(), value.clone());

        Ok(value)
    }

    /// Get a value from cache without computing
    pub fn get(&self, key: &str) -> Result<Option<V>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, V>>> {
        self.entries.lock().map_err(|_| Error::LockPoisoned {
            context: format!("{} cache", self.name),
        })
    }
}
