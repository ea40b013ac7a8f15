//! Account handlers: signup, login and password reset.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/signup` | `{name, email, password, roles?, photo_url?}` |
//! | `POST` | `/login` | `{email, password}` → `{token, user}` |
//! | `POST` | `/forgot-password` | `{email}`; always 200 |
//! | `POST` | `/reset-password` | `{token, new_password}` |

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use checkin_core::{
  media::Notifier,
  store::AttendanceStore,
  volunteer::{NewVolunteer, Volunteer, normalize_email},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
  AppState, Backend,
  error::ApiError,
  password::{hash_password, verify_password},
};

fn require(field: &str, value: &str) -> Result<(), ApiError> {
  if value.trim().is_empty() {
    return Err(ApiError::BadRequest(format!("{field} is required")));
  }
  Ok(())
}

// ─── Signup ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SignupBody {
  pub name:      String,
  pub email:     String,
  pub password:  String,
  #[serde(default)]
  pub roles:     Vec<String>,
  #[serde(default)]
  pub photo_url: Option<String>,
}

/// `POST /signup`
pub async fn signup<B: Backend>(
  State(state): State<AppState<B>>,
  body: Result<Json<SignupBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let Json(body) = body?;
  require("email", &body.email)?;
  require("password", &body.password)?;

  let mut input = NewVolunteer {
    name:          body.name,
    email:         body.email,
    roles:         body.roles,
    password_hash: String::new(),
    is_admin:      false,
    photo_url:     body.photo_url,
  }
  .validated()?;
  input.password_hash = hash_password(&body.password)?;

  let volunteer = state.store.create_volunteer(input).await.map_err(ApiError::store)?;
  tracing::info!(volunteer_id = %volunteer.id, "volunteer signed up");

  Ok((
    StatusCode::CREATED,
    Json(json!({ "message": "volunteer created", "id": volunteer.id })),
  ))
}

// ─── Login ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub email:    String,
  pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
  pub token: String,
  pub user:  Volunteer,
}

/// `POST /login`
pub async fn login<B: Backend>(
  State(state): State<AppState<B>>,
  body: Result<Json<LoginBody>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
  let Json(body) = body?;
  let rejected = || ApiError::Unauthorized("invalid email or password".into());

  let volunteer = state
    .store
    .find_volunteer_by_email(&normalize_email(&body.email))
    .await
    .map_err(ApiError::store)?
    .ok_or_else(rejected)?;

  if !verify_password(&body.password, &volunteer.password_hash) {
    tracing::info!(volunteer_id = %volunteer.id, "login rejected");
    return Err(rejected());
  }

  let token = state.sessions.issue_session(&volunteer)?;
  Ok(Json(LoginResponse { token, user: volunteer }))
}

// ─── Password reset ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ForgotBody {
  pub email: String,
}

/// `POST /forgot-password`
///
/// Answers the same whether or not the email is registered. The mail is sent
/// from a background task so response time does not reveal it either.
pub async fn forgot_password<B: Backend>(
  State(state): State<AppState<B>>,
  body: Result<Json<ForgotBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
  let Json(body) = body?;
  require("email", &body.email)?;

  let email = normalize_email(&body.email);
  let found = state
    .store
    .find_volunteer_by_email(&email)
    .await
    .map_err(ApiError::store)?;

  if let Some(volunteer) = found {
    let token = state.sessions.issue_reset(volunteer.id)?;
    let link = format!("{}/reset-password?token={token}", state.front_url);
    let notifier = state.notifier.clone();
    tokio::spawn(async move {
      if let Err(e) = notifier.send_password_reset(&email, &link).await {
        tracing::warn!(volunteer_id = %volunteer.id, error = %e, "failed to send reset mail");
      }
    });
  }

  Ok(Json(json!({
    "message": "if the email is registered, a reset link has been sent",
  })))
}

#[derive(Debug, Deserialize)]
pub struct ResetBody {
  pub token:        String,
  pub new_password: String,
}

/// `POST /reset-password`
pub async fn reset_password<B: Backend>(
  State(state): State<AppState<B>>,
  body: Result<Json<ResetBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
  let Json(body) = body?;
  require("token", &body.token)?;
  require("new_password", &body.new_password)?;

  let id = state.sessions.verify_reset(&body.token)?;
  let mut volunteer = state
    .store
    .get_volunteer(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("volunteer {id} not found")))?;

  volunteer.password_hash = hash_password(&body.new_password)?;
  state.store.update_volunteer(&volunteer).await.map_err(ApiError::store)?;
  tracing::info!(volunteer_id = %id, "password reset");

  Ok(Json(json!({ "message": "password updated" })))
}
