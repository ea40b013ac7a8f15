//! Attendance events.
//!
//! Check-ins are append-only: the store assigns the id and the timestamp at
//! recording time and never updates or deletes a row.

use chrono::{DateTime, Datelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One recorded attendance event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkin {
  pub id:           i64,
  pub volunteer_id: Uuid,
  pub checkin_time: DateTime<Utc>,
}

/// A check-in joined with the display fields of its volunteer.
///
/// This is the input of the punctuality engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckinRecord {
  pub checkin_id:   i64,
  pub volunteer_id: Uuid,
  pub name:         String,
  pub photo_url:    Option<String>,
  pub checkin_time: DateTime<Utc>,
}

/// Per-volunteer attendance count, used by the plain attendance ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckinCount {
  pub id:             Uuid,
  pub name:           String,
  pub total_checkins: u64,
}

/// Attendance totals shown on a volunteer's profile and dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceSummary {
  pub total_checkins:      usize,
  /// Check-ins in the current calendar month of `tz`.
  pub checkins_this_month: usize,
  pub first_checkin:       Option<DateTime<Utc>>,
  pub last_checkin:        Option<DateTime<Utc>>,
}

impl AttendanceSummary {
  pub fn from_times(times: &[DateTime<Utc>], now: DateTime<Utc>, tz: Tz) -> Self {
    let today = now.with_timezone(&tz);
    let checkins_this_month = times
      .iter()
      .map(|t| t.with_timezone(&tz))
      .filter(|t| t.year() == today.year() && t.month() == today.month())
      .count();

    Self {
      total_checkins: times.len(),
      checkins_this_month,
      first_checkin: times.iter().min().copied(),
      last_checkin: times.iter().max().copied(),
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn summary_counts_the_local_month() {
    let tz = chrono_tz::America::Sao_Paulo;
    let now = Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();
    let times = [
      Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap(),
      // 23:30 on May 31st in São Paulo.
      Utc.with_ymd_and_hms(2024, 6, 1, 2, 30, 0).unwrap(),
      Utc.with_ymd_and_hms(2024, 6, 2, 12, 0, 0).unwrap(),
    ];

    let summary = AttendanceSummary::from_times(&times, now, tz);
    assert_eq!(summary.total_checkins, 3);
    assert_eq!(summary.checkins_this_month, 1);
    assert_eq!(summary.first_checkin, Some(times[0]));
    assert_eq!(summary.last_checkin, Some(times[2]));
  }

  #[test]
  fn empty_summary() {
    let summary = AttendanceSummary::from_times(&[], Utc::now(), chrono_tz::UTC);
    assert_eq!(summary.total_checkins, 0);
    assert_eq!(summary.first_checkin, None);
    assert_eq!(summary.last_checkin, None);
  }
}
