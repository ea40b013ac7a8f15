//! The `AttendanceStore` trait and supporting query types.
//!
//! Implemented by storage backends (e.g. `checkin-store-sqlite`). The issuer,
//! the admission controller and the HTTP layer depend on this abstraction, not
//! on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  checkin::{Checkin, CheckinCount, CheckinRecord},
  volunteer::{NewVolunteer, Volunteer},
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for [`AttendanceStore::list_volunteers`].
#[derive(Debug, Clone, Default)]
pub struct VolunteerFilter {
  /// Case-insensitive substring match on the display name.
  pub name: Option<String>,
  /// Only volunteers carrying this role label.
  pub role: Option<String>,
}

/// Parameters for [`AttendanceStore::list_checkins`].
#[derive(Debug, Clone, Default)]
pub struct CheckinQuery {
  /// Inclusive lower bound on `checkin_time`.
  pub since:        Option<DateTime<Utc>>,
  pub volunteer_id: Option<Uuid>,
}

// ─── Error classification ────────────────────────────────────────────────────

/// Backend errors must say whether they are a uniqueness violation, so callers
/// never have to look at driver messages.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn is_conflict(&self) -> bool;
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Durable storage for volunteers and their check-ins.
///
/// Check-ins are append-only. All methods return `Send` futures so the trait
/// can be used from axum handlers on a multi-threaded runtime.
pub trait AttendanceStore: Send + Sync {
  type Error: StoreError;

  // ── Volunteers ────────────────────────────────────────────────────────

  /// Persist a new volunteer. A taken email yields an error whose
  /// [`StoreError::is_conflict`] is `true`.
  fn create_volunteer(
    &self,
    input: NewVolunteer,
  ) -> impl Future<Output = Result<Volunteer, Self::Error>> + Send + '_;

  fn get_volunteer(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Volunteer>, Self::Error>> + Send + '_;

  fn find_volunteer_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<Volunteer>, Self::Error>> + Send + 'a;

  /// Overwrite every mutable field of an existing volunteer. Same conflict
  /// rule as [`create_volunteer`](Self::create_volunteer) for the email.
  fn update_volunteer<'a>(
    &'a self,
    volunteer: &'a Volunteer,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn list_volunteers<'a>(
    &'a self,
    filter: &'a VolunteerFilter,
  ) -> impl Future<Output = Result<Vec<Volunteer>, Self::Error>> + Send + 'a;

  /// Grant or revoke the admin flag. Returns `false` if no volunteer has the
  /// given email.
  fn set_admin<'a>(
    &'a self,
    email: &'a str,
    is_admin: bool,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  // ── Check-ins ─────────────────────────────────────────────────────────

  /// Append a check-in. The timestamp is taken from the server clock.
  fn record_checkin(
    &self,
    volunteer_id: Uuid,
  ) -> impl Future<Output = Result<Checkin, Self::Error>> + Send + '_;

  /// Check-ins joined with volunteer display fields, oldest first.
  fn list_checkins<'a>(
    &'a self,
    query: &'a CheckinQuery,
  ) -> impl Future<Output = Result<Vec<CheckinRecord>, Self::Error>> + Send + 'a;

  /// The most recent check-in of `volunteer_id`, or globally when `None`.
  fn latest_checkin(
    &self,
    volunteer_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Option<Checkin>, Self::Error>> + Send + '_;

  /// Check-in totals per volunteer, highest first.
  fn checkin_counts(
    &self,
  ) -> impl Future<Output = Result<Vec<CheckinCount>, Self::Error>> + Send + '_;
}
