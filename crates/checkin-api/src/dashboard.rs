//! Dashboard handlers: the caller's summary, punctuality statistics and the
//! roles distribution.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/dashboard` | Caller summary with ranking position |
//! | `GET`  | `/dashboard/punctuality-ranking` | `?period&scope&sort_by` |
//! | `GET`  | `/dashboard/punctuality-meter` | `?period` |
//! | `GET`  | `/dashboard/punctuality-scatter` | `?period&scope` |
//! | `GET`  | `/dashboard/roles-distribution` | Role label counts |

use axum::{
  Json,
  extract::{Query, State, rejection::QueryRejection},
};
use chrono::{DateTime, Utc};
use checkin_core::{
  checkin::{AttendanceSummary, CheckinRecord},
  punctuality::{self, Period, RankingEntry, ScatterPoint, Scope, SortKey},
  store::{AttendanceStore, CheckinQuery, VolunteerFilter},
  volunteer::{RoleCount, roles_distribution as count_roles},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{AppState, Backend, auth::Identity, error::ApiError};

// ─── Parameters ──────────────────────────────────────────────────────────────

/// Query parameters shared by the punctuality endpoints. Absent values take
/// their defaults; unknown values are rejected.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PunctualityParams {
  pub period:  Period,
  pub scope:   Scope,
  pub sort_by: SortKey,
}

/// Records in `period`, optionally for a single volunteer.
async fn records_in<B: Backend>(
  state: &AppState<B>,
  period: Period,
  volunteer_id: Option<Uuid>,
) -> Result<Vec<CheckinRecord>, ApiError> {
  let latest = match period {
    Period::LastEvent => state
      .store
      .latest_checkin(None)
      .await
      .map_err(ApiError::store)?
      .map(|c| c.checkin_time),
    Period::Monthly | Period::Total => None,
  };
  let since = state.rules.period_start(period, Utc::now(), latest);

  state
    .store
    .list_checkins(&CheckinQuery { since, volunteer_id })
    .await
    .map_err(ApiError::store)
}

// ─── Punctuality ─────────────────────────────────────────────────────────────

/// `GET /dashboard/punctuality-ranking`
pub async fn punctuality_ranking<B: Backend>(
  State(state): State<AppState<B>>,
  caller: Identity,
  params: Result<Query<PunctualityParams>, QueryRejection>,
) -> Result<Json<Vec<RankingEntry>>, ApiError> {
  let Query(params) = params?;
  let records = records_in(&state, params.period, params.scope.restrict_to(caller.id)).await?;
  Ok(Json(punctuality::rank(&records, &state.rules, params.sort_by)))
}

/// `GET /dashboard/punctuality-meter`
pub async fn punctuality_meter<B: Backend>(
  State(state): State<AppState<B>>,
  _caller: Identity,
  params: Result<Query<PunctualityParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
  let Query(params) = params?;
  let records = records_in(&state, params.period, None).await?;
  Ok(Json(json!({ "average": punctuality::meter(&records, &state.rules) })))
}

/// `GET /dashboard/punctuality-scatter`
pub async fn punctuality_scatter<B: Backend>(
  State(state): State<AppState<B>>,
  caller: Identity,
  params: Result<Query<PunctualityParams>, QueryRejection>,
) -> Result<Json<Vec<ScatterPoint>>, ApiError> {
  let Query(params) = params?;
  let records = records_in(&state, params.period, params.scope.restrict_to(caller.id)).await?;
  Ok(Json(punctuality::scatter(&records, &state.rules)))
}

// ─── Summary ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct DashboardSummary {
  pub id:               Uuid,
  pub name:             String,
  pub roles:            Vec<String>,
  pub created_at:       DateTime<Utc>,
  #[serde(flatten)]
  pub attendance:       AttendanceSummary,
  /// 1-based position in the attendance ranking; `None` before the first
  /// check-in.
  pub ranking_position: Option<usize>,
}

/// `GET /dashboard`
pub async fn summary<B: Backend>(
  State(state): State<AppState<B>>,
  caller: Identity,
) -> Result<Json<DashboardSummary>, ApiError> {
  let volunteer = state
    .store
    .get_volunteer(caller.id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("volunteer {} not found", caller.id)))?;

  let records = state
    .store
    .list_checkins(&CheckinQuery { since: None, volunteer_id: Some(volunteer.id) })
    .await
    .map_err(ApiError::store)?;
  let times: Vec<_> = records.iter().map(|r| r.checkin_time).collect();

  let ranking_position = state
    .store
    .checkin_counts()
    .await
    .map_err(ApiError::store)?
    .iter()
    .position(|c| c.id == volunteer.id)
    .map(|i| i + 1);

  Ok(Json(DashboardSummary {
    id: volunteer.id,
    name: volunteer.name,
    roles: volunteer.roles,
    created_at: volunteer.created_at,
    attendance: AttendanceSummary::from_times(&times, Utc::now(), state.rules.tz),
    ranking_position,
  }))
}

/// `GET /dashboard/roles-distribution`
pub async fn roles_distribution<B: Backend>(
  State(state): State<AppState<B>>,
  _caller: Identity,
) -> Result<Json<Vec<RoleCount>>, ApiError> {
  let volunteers = state
    .store
    .list_volunteers(&VolunteerFilter::default())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(count_roles(&volunteers)))
}
