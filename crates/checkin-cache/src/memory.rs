//! In-process [`TokenCache`].

use std::{
  collections::HashMap,
  sync::{Mutex, PoisonError},
  time::{Duration, Instant},
};

use checkin_core::cache::TokenCache;

use crate::Result;

struct Entry {
  value:      String,
  expires_at: Instant,
}

/// A mutex-guarded map with per-key expiry.
///
/// A lookup drops its own key once expired, and every write sweeps all expired
/// entries, so keys that are never read again do not accumulate. The single
/// lock makes [`set_if_absent`](TokenCache::set_if_absent) atomic.
#[derive(Default)]
pub struct MemoryCache {
  entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryCache {
  pub fn new() -> Self { Self::default() }

  fn with_live<T>(&self, key: &str, f: impl FnOnce(&mut HashMap<String, Entry>, Instant) -> T) -> T {
    let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
    let now = Instant::now();
    if entries.get(key).is_some_and(|e| e.expires_at <= now) {
      entries.remove(key);
    }
    f(&mut entries, now)
  }

  fn sweep(entries: &mut HashMap<String, Entry>, now: Instant) {
    entries.retain(|_, e| e.expires_at > now);
  }
}

impl TokenCache for MemoryCache {
  type Error = crate::Error;

  async fn get(&self, key: &str) -> Result<Option<String>> {
    Ok(self.with_live(key, |entries, _| entries.get(key).map(|e| e.value.clone())))
  }

  async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
    self.with_live(key, |entries, now| {
      Self::sweep(entries, now);
      entries.insert(key.to_owned(), Entry { value: value.to_owned(), expires_at: now + ttl });
    });
    Ok(())
  }

  async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool> {
    Ok(self.with_live(key, |entries, now| {
      if entries.contains_key(key) {
        return false;
      }
      Self::sweep(entries, now);
      entries.insert(key.to_owned(), Entry { value: value.to_owned(), expires_at: now + ttl });
      true
    }))
  }

  async fn exists(&self, key: &str) -> Result<bool> {
    Ok(self.with_live(key, |entries, _| entries.contains_key(key)))
  }

  async fn delete(&self, key: &str) -> Result<()> {
    self.with_live(key, |entries, _| entries.remove(key));
    Ok(())
  }

  async fn ttl(&self, key: &str) -> Result<Option<Duration>> {
    Ok(self.with_live(key, |entries, now| {
      entries.get(key).map(|e| e.expires_at.saturating_duration_since(now))
    }))
  }
}
