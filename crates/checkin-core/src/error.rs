//! Error types for `checkin-core`.

use thiserror::Error;
use uuid::Uuid;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  // ── Admission ─────────────────────────────────────────────────────────

  #[error("check-in token missing")]
  MissingToken,

  #[error("check-in token is invalid or expired")]
  InvalidOrExpiredToken,

  #[error("not authenticated")]
  Unauthenticated,

  #[error("volunteer {0} already checked in for this service")]
  DuplicateAdmission(Uuid),

  // ── Records ───────────────────────────────────────────────────────────

  #[error("volunteer not found: {0}")]
  VolunteerNotFound(Uuid),

  #[error("full name required (at least two words)")]
  InvalidName,

  #[error("email already registered: {0}")]
  EmailTaken(String),

  // ── Dependencies ──────────────────────────────────────────────────────

  #[error("cache error: {0}")]
  Cache(#[source] BoxError),

  #[error("store error: {0}")]
  Store(#[source] BoxError),

  #[error("qr render error: {0}")]
  Render(#[source] BoxError),

  #[error("artifact publish error: {0}")]
  Publish(#[source] BoxError),

  #[error("notification error: {0}")]
  Notify(#[source] BoxError),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  pub fn cache(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Cache(Box::new(e))
  }

  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
