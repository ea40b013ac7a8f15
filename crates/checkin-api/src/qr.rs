//! Handlers for QR issuance.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/generate/qr` | Admin. Current artifact, minted on demand |
//! | `POST` | `/generate/qr/reset` | Admin. Next issuance mints a new token |

use std::time::Duration;

use axum::{Json, extract::State};
use chrono::Utc;
use serde::Serialize;
use serde_json::{Value, json};

use crate::{AppState, Backend, auth::Admin, error::ApiError};

#[derive(Debug, Serialize)]
pub struct QrResponse {
  pub url:        String,
  pub token:      String,
  /// Remaining validity as `HHh:MMm:SSs`.
  pub expires_in: String,
  /// Unix epoch milliseconds.
  pub expires_at: i64,
}

/// Format a remaining duration as `HHh:MMm:SSs`.
pub fn format_remaining(d: Duration) -> String {
  let secs = d.as_secs();
  format!("{:02}h:{:02}m:{:02}s", secs / 3600, (secs / 60) % 60, secs % 60)
}

/// `GET /generate/qr`
pub async fn issue<B: Backend>(
  State(state): State<AppState<B>>,
  Admin(caller): Admin,
) -> Result<Json<QrResponse>, ApiError> {
  let artifact = state.issuer.issue_or_reuse().await?;
  let expires_in_ms = i64::try_from(artifact.expires_in.as_millis()).unwrap_or(i64::MAX);
  tracing::debug!(admin = %caller.id, "qr artifact served");

  Ok(Json(QrResponse {
    expires_in: format_remaining(artifact.expires_in),
    expires_at: Utc::now().timestamp_millis().saturating_add(expires_in_ms),
    url:        artifact.url,
    token:      artifact.token,
  }))
}

/// `POST /generate/qr/reset`
pub async fn reset<B: Backend>(
  State(state): State<AppState<B>>,
  Admin(caller): Admin,
) -> Result<Json<Value>, ApiError> {
  state.issuer.regenerate().await?;
  tracing::info!(admin = %caller.id, "qr reset requested");
  Ok(Json(json!({ "message": "QR code reset; the next request issues a new one" })))
}
