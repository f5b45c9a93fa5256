//! Remote inventory
//!
//! A snapshot of the objects under the destination prefix, taken once before
//! traversal. Entries are removed as local files claim them; whatever is left
//! afterwards exists only remotely.

use std::collections::HashMap;

use crate::error::Result;
use crate::traits::{ListOptions, ObjectStore, RemoteObjectInfo};

/// Page size requested from the store
pub const LIST_PAGE_SIZE: i32 = 1000;

/// Remote key to object mapping
#[derive(Debug, Clone, Default)]
pub struct RemoteInventory {
    entries: HashMap<String, RemoteObjectInfo>,
}

impl RemoteInventory {
    /// List every object under `prefix`, following continuation tokens
    ///
    /// Transport errors propagate; a partially listed inventory is never
    /// returned.
    pub async fn load<S: ObjectStore + ?Sized>(store: &S, prefix: &str) -> Result<Self> {
        let mut inventory = Self::default();
        let mut continuation_token: Option<String> = None;

        loop {
            let options = ListOptions {
                prefix: prefix.to_string(),
                max_keys: Some(LIST_PAGE_SIZE),
                continuation_token: continuation_token.take(),
            };

            let page = store.list_objects(options).await?;
            tracing::debug!(
                "listed {} objects under '{prefix}' (truncated: {})",
                page.items.len(),
                page.truncated
            );
            inventory.extend(page.items);

            match page.continuation_token {
                Some(token) if page.truncated => continuation_token = Some(token),
                _ => break,
            }
        }

        Ok(inventory)
    }

    /// Add objects; a later entry for the same key replaces the earlier one
    pub fn extend(&mut self, items: impl IntoIterator<Item = RemoteObjectInfo>) {
        for item in items {
            self.entries.insert(item.key.clone(), item);
        }
    }

    /// Remove and return the entry for `key`, marking it as matched
    pub fn take(&mut self, key: &str) -> Option<RemoteObjectInfo> {
        self.entries.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the inventory, returning unmatched entries sorted by key
    pub fn into_orphans(self) -> Vec<RemoteObjectInfo> {
        let mut orphans: Vec<_> = self.entries.into_values().collect();
        orphans.sort_by(|a, b| a.key.cmp(&b.key));
        orphans
    }
}

impl FromIterator<RemoteObjectInfo> for RemoteInventory {
    fn from_iter<I: IntoIterator<Item = RemoteObjectInfo>>(iter: I) -> Self {
        let mut inventory = Self::default();
        inventory.extend(iter);
        inventory
    }
}
