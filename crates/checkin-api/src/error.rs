//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use checkin_core::store::StoreError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("unauthorized: {0}")]
  Unauthorized(String),

  #[error("admin privileges required")]
  Forbidden,

  #[error("not found: {0}")]
  NotFound(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("internal error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Map a store failure, keeping uniqueness violations distinct.
  pub fn store(e: impl StoreError) -> Self {
    if e.is_conflict() {
      return Self::Conflict("email already registered".into());
    }
    Self::Internal(Box::new(e))
  }
}

impl From<checkin_core::Error> for ApiError {
  fn from(e: checkin_core::Error) -> Self {
    use checkin_core::Error as E;
    match e {
      E::MissingToken => Self::BadRequest("check-in token missing".into()),
      E::InvalidOrExpiredToken => Self::Unauthorized("check-in token is invalid or expired".into()),
      E::Unauthenticated => Self::Unauthorized("not authenticated".into()),
      E::DuplicateAdmission(_) => Self::Conflict("check-in already recorded for this service".into()),
      E::VolunteerNotFound(id) => Self::NotFound(format!("volunteer {id} not found")),
      E::InvalidName => Self::BadRequest("full name required (at least two words)".into()),
      E::EmailTaken(_) => Self::Conflict("email already registered".into()),
      other => Self::Internal(Box::new(other)),
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(r: JsonRejection) -> Self { Self::BadRequest(r.body_text()) }
}

impl From<QueryRejection> for ApiError {
  fn from(r: QueryRejection) -> Self { Self::BadRequest(r.body_text()) }
}

impl From<PathRejection> for ApiError {
  fn from(r: PathRejection) -> Self { Self::BadRequest(r.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m.clone()),
      ApiError::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Internal(e) => {
        tracing::error!(error = %e, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_owned())
      }
    };
    (status, Json(json!({ "message": message }))).into_response()
  }
}
