//! Error type for `checkin-store-sqlite`.

use checkin_core::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A UNIQUE constraint on `volunteers.email` rejected the write.
  #[error("email already registered: {0}")]
  EmailTaken(String),

  #[error("volunteer not found: {0}")]
  VolunteerNotFound(uuid::Uuid),
}

impl StoreError for Error {
  fn is_conflict(&self) -> bool { matches!(self, Error::EmailTaken(_)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
