//! Handlers for the caller's own profile.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/me` | |
//! | `PUT`  | `/me` | Partial update; absent fields are left alone |

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use checkin_core::{
  store::AttendanceStore,
  volunteer::{ProfilePatch, Volunteer, normalize_email, validate_full_name},
};
use serde_json::{Value, json};

use crate::{AppState, Backend, auth::Identity, error::ApiError, password::hash_password};

async fn load<B: Backend>(state: &AppState<B>, caller: Identity) -> Result<Volunteer, ApiError> {
  state
    .store
    .get_volunteer(caller.id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("volunteer {} not found", caller.id)))
}

/// `GET /me`
pub async fn get_me<B: Backend>(
  State(state): State<AppState<B>>,
  caller: Identity,
) -> Result<Json<Volunteer>, ApiError> {
  Ok(Json(load(&state, caller).await?))
}

/// `PUT /me`
///
/// Every field is validated before anything is written, so a rejected update
/// leaves the stored profile untouched.
pub async fn update_me<B: Backend>(
  State(state): State<AppState<B>>,
  caller: Identity,
  body: Result<Json<ProfilePatch>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
  let Json(patch) = body?;
  let mut volunteer = load(&state, caller).await?;

  if let Some(name) = patch.name {
    validate_full_name(&name)?;
    volunteer.name = name;
  }
  if let Some(email) = patch.email {
    let email = normalize_email(&email);
    if email.is_empty() {
      return Err(ApiError::BadRequest("email must not be empty".into()));
    }
    volunteer.email = email;
  }
  if let Some(roles) = patch.roles {
    volunteer.roles = roles;
  }
  if let Some(photo_url) = patch.photo_url {
    volunteer.photo_url = Some(photo_url);
  }
  if let Some(password) = patch.password {
    if password.is_empty() {
      return Err(ApiError::BadRequest("password must not be empty".into()));
    }
    volunteer.password_hash = hash_password(&password)?;
  }

  state.store.update_volunteer(&volunteer).await.map_err(ApiError::store)?;
  tracing::info!(volunteer_id = %volunteer.id, "profile updated");
  Ok(Json(json!({ "message": "profile updated" })))
}
