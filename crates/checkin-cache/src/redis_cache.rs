//! Redis-backed [`TokenCache`].
//!
//! Every command runs through a shared [`ConnectionManager`] and is bounded by
//! a timeout, so a stalled Redis turns into an error instead of a hung request.

use std::time::Duration;

use checkin_core::cache::TokenCache;
use redis::{Client, FromRedisValue, aio::ConnectionManager};
use tokio::time::timeout;

use crate::{Error, Result};

#[derive(Clone)]
pub struct RedisCache {
  conn:    ConnectionManager,
  timeout: Duration,
}

impl RedisCache {
  /// Connect to `url`, bounding the initial connection and every later
  /// command by `op_timeout`.
  pub async fn connect(url: &str, op_timeout: Duration) -> Result<Self> {
    let client = Client::open(url)?;
    let conn = timeout(op_timeout, client.get_connection_manager())
      .await
      .map_err(|_| Error::Timeout(op_timeout))??;
    tracing::info!("connected to redis");
    Ok(Self { conn, timeout: op_timeout })
  }

  async fn run<T: FromRedisValue>(&self, cmd: redis::Cmd) -> Result<T> {
    let mut conn = self.conn.clone();
    match timeout(self.timeout, cmd.query_async(&mut conn)).await {
      Ok(reply) => Ok(reply?),
      Err(_) => {
        tracing::warn!(timeout = ?self.timeout, "redis command timed out");
        Err(Error::Timeout(self.timeout))
      }
    }
  }
}

/// Redis rejects a zero expiry; round sub-millisecond TTLs up.
fn px(ttl: Duration) -> u64 { u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1) }

/// `PTTL` answers `-2` for a missing key and `-1` for a key without expiry.
fn pttl_to_duration(ms: i64) -> Option<Duration> {
  u64::try_from(ms).ok().map(Duration::from_millis)
}

impl TokenCache for RedisCache {
  type Error = Error;

  async fn get(&self, key: &str) -> Result<Option<String>> {
    self.run(redis::cmd("GET").arg(key).clone()).await
  }

  async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
    self
      .run(redis::cmd("SET").arg(key).arg(value).arg("PX").arg(px(ttl)).clone())
      .await
  }

  async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool> {
    let reply: Option<String> = self
      .run(
        redis::cmd("SET")
          .arg(key)
          .arg(value)
          .arg("NX")
          .arg("PX")
          .arg(px(ttl))
          .clone(),
      )
      .await?;
    Ok(reply.is_some())
  }

  async fn exists(&self, key: &str) -> Result<bool> {
    self.run(redis::cmd("EXISTS").arg(key).clone()).await
  }

  async fn delete(&self, key: &str) -> Result<()> {
    let _removed: i64 = self.run(redis::cmd("DEL").arg(key).clone()).await?;
    Ok(())
  }

  async fn ttl(&self, key: &str) -> Result<Option<Duration>> {
    let ms: i64 = self.run(redis::cmd("PTTL").arg(key).clone()).await?;
    Ok(pttl_to_duration(ms))
  }
}
