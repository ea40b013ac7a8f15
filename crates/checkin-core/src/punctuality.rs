//! Punctuality engine.
//!
//! Pure functions over [`CheckinRecord`]s. Nothing here touches the store;
//! callers fetch the records for a period (see [`period_start`]) and pass
//! them in. Everything is computed on demand.
//!
//! A check-in is punctual when it happens at least [`PUNCTUAL_LEAD`] before
//! the first ideal time of its local weekday. Days without an ideal time
//! still count as attendance.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeDelta, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{checkin::CheckinRecord, schedule::IdealSchedule};

/// Minimum lead over the ideal time for an arrival to be punctual.
pub const PUNCTUAL_LEAD: TimeDelta = TimeDelta::minutes(45);

/// Fallback look-back for [`Period::LastEvent`] when nothing was recorded.
pub const LAST_EVENT_FALLBACK: TimeDelta = TimeDelta::days(7);

// ─── Query parameters ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
  #[default]
  Monthly,
  LastEvent,
  Total,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
  #[default]
  Team,
  Individual,
}

impl Scope {
  /// The volunteer the query must be restricted to, if any.
  pub fn restrict_to(self, caller: Uuid) -> Option<Uuid> {
    match self {
      Scope::Team => None,
      Scope::Individual => Some(caller),
    }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
  #[default]
  Punctuality,
  Attendance,
}

// ─── Rules ───────────────────────────────────────────────────────────────────

/// Time zone and schedule every computation is judged in.
#[derive(Debug, Clone)]
pub struct PunctualityRules {
  pub tz:       Tz,
  pub schedule: IdealSchedule,
}

impl PunctualityRules {
  pub fn new(tz: Tz, schedule: IdealSchedule) -> Self { Self { tz, schedule } }

  /// `Some(true)` if punctual, `Some(false)` if late, `None` when the local
  /// weekday has no ideal time.
  pub fn classify(&self, at: DateTime<Utc>) -> Option<bool> {
    let local = at.with_timezone(&self.tz);
    let ideal = self.schedule.first(local.weekday())?;
    let scheduled = local.date_naive().and_time(ideal);
    Some(scheduled - local.naive_local() >= PUNCTUAL_LEAD)
  }

  /// Lower bound on check-in time for `period`, or `None` for no bound.
  ///
  /// `latest` is the most recent check-in across all volunteers; it is only
  /// consulted for [`Period::LastEvent`].
  pub fn period_start(
    &self,
    period: Period,
    now: DateTime<Utc>,
    latest: Option<DateTime<Utc>>,
  ) -> Option<DateTime<Utc>> {
    match period {
      Period::Monthly => {
        let local = now.with_timezone(&self.tz);
        let first = NaiveDate::from_ymd_opt(local.year(), local.month(), 1)
          .unwrap_or_else(|| local.date_naive());
        Some(self.local_midnight(first))
      }
      Period::LastEvent => Some(match latest {
        Some(at) => self.local_midnight(at.with_timezone(&self.tz).date_naive()),
        None => now - LAST_EVENT_FALLBACK,
      }),
      Period::Total => None,
    }
  }

  /// Start of `date` in the configured zone. Zones that skip midnight on a
  /// DST change start that day at the first valid instant.
  fn local_midnight(&self, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    (0..=2)
      .find_map(|h| {
        self
          .tz
          .from_local_datetime(&(midnight + TimeDelta::hours(h)))
          .earliest()
      })
      .map(|dt| dt.with_timezone(&Utc))
      .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
  }
}

// ─── Ranking ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
  pub id:         Uuid,
  pub name:       String,
  pub avatar_url: Option<String>,
  pub checkins:   u32,
  pub punctual:   u32,
  pub percentage: f64,
}

/// Aggregate `records` per volunteer and sort by `sort`.
///
/// Volunteers appear in the order of their first record before sorting, and
/// the sort is stable, so ties keep that order.
pub fn rank(records: &[CheckinRecord], rules: &PunctualityRules, sort: SortKey) -> Vec<RankingEntry> {
  let mut entries: Vec<RankingEntry> = Vec::new();
  let mut index: HashMap<Uuid, usize> = HashMap::new();

  for record in records {
    let slot = *index.entry(record.volunteer_id).or_insert_with(|| {
      entries.push(RankingEntry {
        id:         record.volunteer_id,
        name:       record.name.clone(),
        avatar_url: record.photo_url.clone(),
        checkins:   0,
        punctual:   0,
        percentage: 0.0,
      });
      entries.len() - 1
    });

    let entry = &mut entries[slot];
    entry.checkins += 1;
    if rules.classify(record.checkin_time) == Some(true) {
      entry.punctual += 1;
    }
  }

  for entry in &mut entries {
    entry.percentage = f64::from(entry.punctual) / f64::from(entry.checkins) * 100.0;
  }

  match sort {
    SortKey::Punctuality => entries.sort_by(|a, b| b.percentage.total_cmp(&a.percentage)),
    SortKey::Attendance => entries.sort_by(|a, b| b.checkins.cmp(&a.checkins)),
  }
  entries
}

/// Unweighted mean of per-volunteer percentages; `0.0` when there are none.
pub fn meter(records: &[CheckinRecord], rules: &PunctualityRules) -> f64 {
  let ranking = rank(records, rules, SortKey::Punctuality);
  if ranking.is_empty() {
    return 0.0;
  }
  ranking.iter().map(|e| e.percentage).sum::<f64>() / ranking.len() as f64
}

// ─── Scatter ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScatterPoint {
  pub id:         Uuid,
  pub name:       String,
  pub avatar_url: Option<String>,
  /// 0 = Sunday.
  pub weekday:    u32,
  /// Minutes since local midnight.
  pub minutes:    u32,
  /// Local `HH:MM`.
  pub time:       String,
  /// Local `YYYY-MM-DD`.
  pub date:       String,
}

pub fn scatter(records: &[CheckinRecord], rules: &PunctualityRules) -> Vec<ScatterPoint> {
  records
    .iter()
    .map(|r| {
      let local = r.checkin_time.with_timezone(&rules.tz);
      ScatterPoint {
        id:         r.volunteer_id,
        name:       r.name.clone(),
        avatar_url: r.photo_url.clone(),
        weekday:    local.weekday().num_days_from_sunday(),
        minutes:    local.hour() * 60 + local.minute(),
        time:       local.format("%H:%M").to_string(),
        date:       local.format("%Y-%m-%d").to_string(),
      }
    })
    .collect()
}
