use std::collections::HashSet;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use super::{EphemeralStore, StoreResult};

struct Entry {
    value: Vec<u8>,
    expires_at: Instant,
}

struct SetEntry {
    members: HashSet<String>,
    expires_at: Option<Instant>,
}

/// In-process store with real TTL semantics (deadline per key, checked on
/// read). Backs the e2e test fixture and local development without a Redis.
#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, Entry>,
    sets: DashMap<String, SetEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EphemeralStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        if let Some(entry) = self.entries.get(key) {
            if entry.expires_at > Instant::now() {
                return Ok(Some(entry.value.clone()));
            }
            drop(entry);
            self.entries.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> StoreResult<()> {
        self.entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn set_add(&self, key: &str, member: &str) -> StoreResult<()> {
        self.sets
            .entry(key.to_string())
            .or_insert_with(|| SetEntry {
                members: HashSet::new(),
                expires_at: None,
            })
            .members
            .insert(member.to_string());
        Ok(())
    }

    async fn set_members(&self, key: &str) -> StoreResult<Vec<String>> {
        if let Some(entry) = self.sets.get(key) {
            let expired = entry.expires_at.is_some_and(|d| d <= Instant::now());
            if !expired {
                return Ok(entry.members.iter().cloned().collect());
            }
            drop(entry);
            self.sets.remove(key);
        }
        Ok(Vec::new())
    }

    async fn set_remove(&self, key: &str, member: &str) -> StoreResult<()> {
        if let Some(mut entry) = self.sets.get_mut(key) {
            entry.members.remove(member);
            if entry.members.is_empty() {
                drop(entry);
                self.sets.remove(key);
            }
        }
        Ok(())
    }

    async fn expire(&self, key: &str, ttl: Duration) -> StoreResult<()> {
        if let Some(mut entry) = self.sets.get_mut(key) {
            entry.expires_at = Some(Instant::now() + ttl);
        }
        Ok(())
    }
}
