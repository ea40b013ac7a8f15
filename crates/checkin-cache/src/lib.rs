//! [`TokenCache`] backends for Checkin.
//!
//! [`MemoryCache`] keeps everything in-process and is what tests and
//! single-node deployments use. [`RedisCache`] shares tokens and admission
//! markers between server instances. [`Cache`] picks one at runtime.

pub mod error;
pub mod memory;
pub mod redis_cache;

use std::time::Duration;

use checkin_core::cache::TokenCache;

pub use error::{Error, Result};
pub use memory::MemoryCache;
pub use redis_cache::RedisCache;

/// A cache backend chosen from configuration.
pub enum Cache {
  Memory(MemoryCache),
  Redis(RedisCache),
}

impl TokenCache for Cache {
  type Error = Error;

  async fn get(&self, key: &str) -> Result<Option<String>> {
    match self {
      Self::Memory(c) => c.get(key).await,
      Self::Redis(c) => c.get(key).await,
    }
  }

  async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
    match self {
      Self::Memory(c) => c.set(key, value, ttl).await,
      Self::Redis(c) => c.set(key, value, ttl).await,
    }
  }

  async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool> {
    match self {
      Self::Memory(c) => c.set_if_absent(key, value, ttl).await,
      Self::Redis(c) => c.set_if_absent(key, value, ttl).await,
    }
  }

  async fn exists(&self, key: &str) -> Result<bool> {
    match self {
      Self::Memory(c) => c.exists(key).await,
      Self::Redis(c) => c.exists(key).await,
    }
  }

  async fn delete(&self, key: &str) -> Result<()> {
    match self {
      Self::Memory(c) => c.delete(key).await,
      Self::Redis(c) => c.delete(key).await,
    }
  }

  async fn ttl(&self, key: &str) -> Result<Option<Duration>> {
    match self {
      Self::Memory(c) => c.ttl(key).await,
      Self::Redis(c) => c.ttl(key).await,
    }
  }
}
