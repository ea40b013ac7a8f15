//! The `TokenCache` trait and the key layout shared by the issuer and the
//! admission controller.

use std::{future::Future, time::Duration};

use uuid::Uuid;

/// A key/value store with per-key expiry and an atomic set-if-absent.
///
/// Implementations must make [`set_if_absent`](Self::set_if_absent) atomic
/// across concurrent callers: for any key, exactly one caller observes `true`
/// until the key expires or is deleted.
pub trait TokenCache: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn get<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;

  /// Unconditionally set `key` with the given TTL.
  fn set<'a>(
    &'a self,
    key: &'a str,
    value: &'a str,
    ttl: Duration,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Set `key` only if it does not exist. Returns whether the write happened.
  fn set_if_absent<'a>(
    &'a self,
    key: &'a str,
    value: &'a str,
    ttl: Duration,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  fn exists<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  fn delete<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Remaining time to live. `None` when the key is absent or has no expiry.
  fn ttl<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<Duration>, Self::Error>> + Send + 'a;
}

// ─── Key layout ──────────────────────────────────────────────────────────────

/// Value stored under token and guard keys.
pub const TOKEN_VALID: &str = "valid";
pub const GUARD_DONE: &str = "done";

/// Key holding the cached QR artifact for the current window.
pub const CURRENT_QR_KEY: &str = "checkin:qr_code_current";

pub fn token_key(token: &str) -> String { format!("checkin:token:{token}") }

/// Authoritative per-volunteer, per-token admission marker.
pub fn admission_key(volunteer_id: Uuid, token: &str) -> String {
  format!("checkin:checkin:{volunteer_id}:{token}")
}

/// Per-volunteer fast-path marker, set after a successful admission.
pub fn volunteer_key(volunteer_id: Uuid) -> String {
  format!("checkin:user_checkin:{volunteer_id}")
}
