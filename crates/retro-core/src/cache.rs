//! Query-result cache keyed by (entity type, filter).
//!
//! Reads go through [`QueryCache::get_or_fetch`]; mutations call the
//! invalidation methods, which mark entries stale and fire the callbacks
//! registered for the key. The mapping from keys to subscribers is explicit:
//! nothing refetches unless a caller registered interest and re-runs the
//! fetch on its next read.

use crate::error::Result;
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// QueryKey
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// The sprint list.
    Sprints,
    /// Retro items of one sprint.
    Items(String),
    /// Count of legacy items lacking a sprint.
    OrphanCount,
}

type Subscriber = Box<dyn Fn(&QueryKey) + Send>;

struct Entry {
    value: serde_json::Value,
    stale: bool,
}

// ---------------------------------------------------------------------------
// QueryCache
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct QueryCache {
    entries: HashMap<QueryKey, Entry>,
    subscribers: HashMap<QueryKey, Vec<Subscriber>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key`, running `fetch` only when the
    /// entry is missing or stale. A failed fetch caches nothing.
    pub fn get_or_fetch<F>(&mut self, key: QueryKey, fetch: F) -> Result<serde_json::Value>
    where
        F: FnOnce() -> Result<serde_json::Value>,
    {
        if let Some(entry) = self.entries.get(&key) {
            if !entry.stale {
                return Ok(entry.value.clone());
            }
        }
        let value = fetch()?;
        self.entries.insert(
            key,
            Entry {
                value: value.clone(),
                stale: false,
            },
        );
        Ok(value)
    }

    /// True when a fresh value is cached for `key`.
    pub fn is_fresh(&self, key: &QueryKey) -> bool {
        self.entries.get(key).is_some_and(|e| !e.stale)
    }

    /// Mark `key` stale and notify its subscribers.
    pub fn invalidate(&mut self, key: &QueryKey) {
        if let Some(entry) = self.entries.get_mut(key) {
            entry.stale = true;
        }
        self.notify(key);
    }

    /// Mark every `Items(..)` entry stale, whatever sprint it belongs to.
    /// Used by sprint deletion, which can affect any sprint's item list.
    pub fn invalidate_all_items(&mut self) {
        let item_keys: std::collections::HashSet<QueryKey> = self
            .entries
            .keys()
            .chain(self.subscribers.keys())
            .filter(|k| matches!(k, QueryKey::Items(_)))
            .cloned()
            .collect();
        for key in item_keys {
            self.invalidate(&key);
        }
    }

    /// Register a callback fired whenever `key` is invalidated.
    pub fn subscribe<F>(&mut self, key: QueryKey, callback: F)
    where
        F: Fn(&QueryKey) + Send + 'static,
    {
        self.subscribers
            .entry(key)
            .or_default()
            .push(Box::new(callback));
    }

    fn notify(&self, key: &QueryKey) {
        if let Some(callbacks) = self.subscribers.get(key) {
            for cb in callbacks {
                cb(key);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
