//! Handlers for `/volunteers` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/volunteers` | Optional `?name=` substring and `?roles=` label |
//! | `POST` | `/volunteers` | Admin |
//! | `GET`  | `/volunteers/{id}` | Profile, check-ins (newest first) and totals |

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, PathRejection, QueryRejection},
  },
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Utc;
use checkin_core::{
  checkin::{AttendanceSummary, Checkin},
  store::{AttendanceStore, CheckinQuery, VolunteerFilter},
  volunteer::{NewVolunteer, Volunteer},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  AppState, Backend,
  auth::{Admin, Identity},
  error::ApiError,
  password::hash_password,
};

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub name:  Option<String>,
  pub roles: Option<String>,
}

fn non_empty(s: Option<String>) -> Option<String> {
  s.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty())
}

/// `GET /volunteers[?name=<substring>][&roles=<label>]`
pub async fn list<B: Backend>(
  State(state): State<AppState<B>>,
  _caller: Identity,
  params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<Volunteer>>, ApiError> {
  let Query(params) = params?;
  let filter = VolunteerFilter {
    name: non_empty(params.name),
    role: non_empty(params.roles),
  };
  let volunteers = state.store.list_volunteers(&filter).await.map_err(ApiError::store)?;
  Ok(Json(volunteers))
}

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name:      String,
  pub email:     String,
  pub password:  String,
  #[serde(default)]
  pub roles:     Vec<String>,
  #[serde(default)]
  pub is_admin:  bool,
  #[serde(default)]
  pub photo_url: Option<String>,
}

/// `POST /volunteers`
pub async fn create<B: Backend>(
  State(state): State<AppState<B>>,
  Admin(caller): Admin,
  body: Result<Json<CreateBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
  let Json(body) = body?;
  if body.email.trim().is_empty() || body.password.is_empty() {
    return Err(ApiError::BadRequest("email and password are required".into()));
  }

  let mut input = NewVolunteer {
    name:          body.name,
    email:         body.email,
    roles:         body.roles,
    password_hash: String::new(),
    is_admin:      body.is_admin,
    photo_url:     body.photo_url,
  }
  .validated()?;
  input.password_hash = hash_password(&body.password)?;

  let volunteer = state.store.create_volunteer(input).await.map_err(ApiError::store)?;
  tracing::info!(admin = %caller.id, volunteer_id = %volunteer.id, "volunteer created");
  Ok((StatusCode::CREATED, Json(volunteer)))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct VolunteerDetail {
  #[serde(flatten)]
  pub volunteer:  Volunteer,
  pub checkins:   Vec<Checkin>,
  #[serde(flatten)]
  pub attendance: AttendanceSummary,
}

/// `GET /volunteers/{id}`
pub async fn get_one<B: Backend>(
  State(state): State<AppState<B>>,
  _caller: Identity,
  id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<VolunteerDetail>, ApiError> {
  let Path(id) = id?;
  let volunteer = state
    .store
    .get_volunteer(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("volunteer {id} not found")))?;

  let records = state
    .store
    .list_checkins(&CheckinQuery { since: None, volunteer_id: Some(id) })
    .await
    .map_err(ApiError::store)?;
  let times: Vec<_> = records.iter().map(|r| r.checkin_time).collect();
  let checkins = records
    .into_iter()
    .rev()
    .map(|r| Checkin { id: r.checkin_id, volunteer_id: r.volunteer_id, checkin_time: r.checkin_time })
    .collect();

  Ok(Json(VolunteerDetail {
    attendance: AttendanceSummary::from_times(&times, Utc::now(), state.rules.tz),
    volunteer,
    checkins,
  }))
}
