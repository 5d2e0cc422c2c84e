//! Key-value cache store used by the emote proxy.
//!
//! The proxy only needs three operations: GET, SET without expiry and
//! SET with a TTL. Any backend that makes each of them atomic per key
//! satisfies the contract.

pub mod memory;
pub mod redis_store;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;

/// URL scheme that selects the in-process store.
pub const MEMORY_URL: &str = "memory://";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Unsupported cache store URL: {0}")]
    UnsupportedUrl(String),
}

/// Narrow key-value interface over the cache backend.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read a value; expired or missing keys yield `None`.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value with no expiry.
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Write a value that expires after `ttl`.
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;
}

/// Open a store from a URL: `memory://` or `redis://` / `rediss://`.
pub async fn open(url: &str) -> Result<Arc<dyn CacheStore>, StoreError> {
    if url.starts_with(MEMORY_URL) {
        tracing::info!("Using in-process cache store");
        return Ok(Arc::new(MemoryStore::new()));
    }
    if url.starts_with("redis://") || url.starts_with("rediss://") {
        let store = RedisStore::connect(url).await?;
        return Ok(Arc::new(store));
    }
    Err(StoreError::UnsupportedUrl(url.to_string()))
}
