use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub mod memory;
pub mod redis;

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

/// Infrastructure failure talking to the ephemeral store. A missing key is
/// `Ok(None)` from `get`, never an error; collapsing connectivity failures
/// into "not found" would corrupt the state machine's notion of session
/// existence.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("ephemeral store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// TTL-bound key-value store used as the system of record for in-progress
/// assessments. Schema-agnostic: callers serialize at the boundary.
/// Injected everywhere, never a singleton: sessions must survive process
/// restarts.
#[async_trait]
pub trait EphemeralStore: Send + Sync {
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> StoreResult<()>;
    async fn delete(&self, key: &str) -> StoreResult<()>;

    /// Set-based secondary index operations.
    async fn set_add(&self, key: &str, member: &str) -> StoreResult<()>;
    async fn set_members(&self, key: &str) -> StoreResult<Vec<String>>;
    async fn set_remove(&self, key: &str, member: &str) -> StoreResult<()>;
    async fn expire(&self, key: &str, ttl: Duration) -> StoreResult<()>;
}
