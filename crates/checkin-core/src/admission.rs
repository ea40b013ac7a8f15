//! Check-in admission controller.
//!
//! Each request runs a fixed chain of gates. The atomic set-if-absent on the
//! per-volunteer, per-token key is the only thing that orders concurrent
//! attempts; the per-volunteer marker checked earlier is a fast path that
//! saves a store round-trip for repeat scans.

use std::{sync::Arc, time::Duration};

use uuid::Uuid;

use crate::{
  Error, Result,
  cache::{GUARD_DONE, TOKEN_VALID, TokenCache, admission_key, token_key, volunteer_key},
  checkin::Checkin,
  store::AttendanceStore,
};

pub struct Admission<S, C> {
  store:  Arc<S>,
  cache:  Arc<C>,
  window: Duration,
}

impl<S, C> Admission<S, C>
where
  S: AttendanceStore,
  C: TokenCache,
{
  pub fn new(store: Arc<S>, cache: Arc<C>, window: Duration) -> Self {
    Self { store, cache, window }
  }

  /// Admit `volunteer` with `token`, recording at most one check-in per
  /// volunteer per token window.
  pub async fn admit(&self, token: &str, volunteer: Option<Uuid>) -> Result<Checkin> {
    if token.is_empty() {
      return Err(Error::MissingToken);
    }

    // A token that cannot be confirmed is not admitted, whether the cache
    // says no or cannot answer.
    match self.cache.get(&token_key(token)).await {
      Ok(Some(v)) if v == TOKEN_VALID => {}
      Ok(_) => return Err(Error::InvalidOrExpiredToken),
      Err(e) => {
        tracing::warn!(error = %e, "token lookup failed");
        return Err(Error::InvalidOrExpiredToken);
      }
    }

    let volunteer_id = volunteer.ok_or(Error::Unauthenticated)?;

    let marker = volunteer_key(volunteer_id);
    if self.cache.exists(&marker).await.map_err(Error::cache)? {
      tracing::info!(%volunteer_id, "duplicate check-in (fast path)");
      return Err(Error::DuplicateAdmission(volunteer_id));
    }

    let volunteer = self
      .store
      .get_volunteer(volunteer_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::VolunteerNotFound(volunteer_id))?;

    let guard = admission_key(volunteer_id, token);
    let won = self
      .cache
      .set_if_absent(&guard, GUARD_DONE, self.window)
      .await
      .map_err(Error::cache)?;
    if !won {
      tracing::info!(%volunteer_id, "duplicate check-in");
      return Err(Error::DuplicateAdmission(volunteer_id));
    }

    let checkin = match self.store.record_checkin(volunteer_id).await {
      Ok(c) => c,
      Err(e) => {
        if let Err(del) = self.cache.delete(&guard).await {
          tracing::warn!(%volunteer_id, error = %del, "failed to roll back admission marker");
        }
        return Err(Error::store(e));
      }
    };

    if let Err(e) = self.cache.set(&marker, GUARD_DONE, self.window).await {
      tracing::warn!(%volunteer_id, error = %e, "failed to set check-in marker");
    }

    tracing::info!(%volunteer_id, name = %volunteer.name, checkin_id = checkin.id, "check-in recorded");
    Ok(checkin)
  }
}
