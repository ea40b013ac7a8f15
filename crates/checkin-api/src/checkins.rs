//! Handlers for check-in endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/checkin?token=` | Admit the caller with a scanned token |
//! | `GET`  | `/checkins` | Every check-in, oldest first |
//! | `GET`  | `/checkin/last` | The caller's most recent check-in |
//! | `GET`  | `/ranking` | Check-in totals per volunteer |

use axum::{
  Json,
  extract::{Query, State, rejection::QueryRejection},
};
use checkin_core::{
  checkin::{CheckinCount, CheckinRecord},
  store::{AttendanceStore, CheckinQuery},
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{AppState, Backend, auth::Identity, error::ApiError};

// ─── Admit ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CheckinParams {
  pub token: Option<String>,
}

/// `POST /checkin?token=<token>`
///
/// The session is read optionally so that token problems are reported before
/// authentication problems.
pub async fn check_in<B: Backend>(
  State(state): State<AppState<B>>,
  caller: Option<Identity>,
  params: Result<Query<CheckinParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
  let Query(params) = params?;
  let token = params.token.unwrap_or_default();

  let checkin = state
    .admission
    .admit(token.trim(), caller.map(|c| c.id))
    .await?;

  Ok(Json(json!({
    "message": "check-in recorded",
    "checkin_time": checkin.checkin_time,
  })))
}

// ─── Listing ─────────────────────────────────────────────────────────────────

/// `GET /checkins`
pub async fn list<B: Backend>(
  State(state): State<AppState<B>>,
  _caller: Identity,
) -> Result<Json<Vec<CheckinRecord>>, ApiError> {
  let records = state
    .store
    .list_checkins(&CheckinQuery::default())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(records))
}

/// `GET /checkin/last`
pub async fn last<B: Backend>(
  State(state): State<AppState<B>>,
  caller: Identity,
) -> Result<Json<Value>, ApiError> {
  let latest = state
    .store
    .latest_checkin(Some(caller.id))
    .await
    .map_err(ApiError::store)?;
  Ok(Json(json!({ "last_checkin": latest.map(|c| c.checkin_time) })))
}

/// `GET /ranking`
pub async fn ranking<B: Backend>(
  State(state): State<AppState<B>>,
  _caller: Identity,
) -> Result<Json<Vec<CheckinCount>>, ApiError> {
  let counts = state.store.checkin_counts().await.map_err(ApiError::store)?;
  Ok(Json(counts))
}
