//! Identifiers generated for `guid` modifiers.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use uuid::Uuid;

/// Per-run cache of generated identifiers, keyed by the full modifier string.
///
/// Every token using the same key receives the same identifier for the
/// lifetime of the cache. Any string, the empty one included, is a valid key.
#[derive(Debug, Default)]
pub struct GuidCache {
    guids: Mutex<HashMap<String, Uuid>>,
}

impl GuidCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the identifier stored for `key`, generating one on first use.
    pub fn get_or_create(&self, key: &str) -> Uuid {
        // The map stays consistent even if a holder panicked.
        let mut guids = self.guids.lock().unwrap_or_else(PoisonError::into_inner);
        *guids.entry(key.to_string()).or_insert_with(Uuid::new_v4)
    }

    pub fn len(&self) -> usize {
        self.guids.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
