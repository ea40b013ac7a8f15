//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings with microsecond
//! precision so lexical order matches chronological order. Roles are a compact
//! JSON array. UUIDs are hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use checkin_core::{
  checkin::{Checkin, CheckinCount, CheckinRecord},
  volunteer::Volunteer,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Micros, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Roles ────────────────────────────────────────────────────────────────────

pub fn encode_roles(roles: &[String]) -> Result<String> { Ok(serde_json::to_string(roles)?) }

pub fn decode_roles(s: &str) -> Result<Vec<String>> { Ok(serde_json::from_str(s)?) }

// ─── LIKE patterns ────────────────────────────────────────────────────────────

/// Substring pattern for `LIKE ? ESCAPE '\'` that matches `needle` literally.
pub fn like_contains(needle: &str) -> String {
  let mut pattern = String::with_capacity(needle.len() + 2);
  pattern.push('%');
  for c in needle.chars() {
    if matches!(c, '\\' | '%' | '_') {
      pattern.push('\\');
    }
    pattern.push(c);
  }
  pattern.push('%');
  pattern
}

// ─── Raw rows ─────────────────────────────────────────────────────────────────

/// Column list matching [`RawVolunteer::from_row`].
pub const VOLUNTEER_COLUMNS: &str =
  "id, name, email, roles, password_hash, is_admin, photo_url, created_at";

/// A `volunteers` row as read from SQLite.
pub struct RawVolunteer {
  pub id:            String,
  pub name:          String,
  pub email:         String,
  pub roles:         String,
  pub password_hash: String,
  pub is_admin:      bool,
  pub photo_url:     Option<String>,
  pub created_at:    String,
}

impl RawVolunteer {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      name:          row.get(1)?,
      email:         row.get(2)?,
      roles:         row.get(3)?,
      password_hash: row.get(4)?,
      is_admin:      row.get(5)?,
      photo_url:     row.get(6)?,
      created_at:    row.get(7)?,
    })
  }

  pub fn into_volunteer(self) -> Result<Volunteer> {
    Ok(Volunteer {
      id:            decode_uuid(&self.id)?,
      name:          self.name,
      email:         self.email,
      roles:         decode_roles(&self.roles)?,
      password_hash: self.password_hash,
      is_admin:      self.is_admin,
      photo_url:     self.photo_url,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// A `checkins` row.
pub struct RawCheckin {
  pub id:           i64,
  pub volunteer_id: String,
  pub checkin_time: String,
}

impl RawCheckin {
  pub fn into_checkin(self) -> Result<Checkin> {
    Ok(Checkin {
      id:           self.id,
      volunteer_id: decode_uuid(&self.volunteer_id)?,
      checkin_time: decode_dt(&self.checkin_time)?,
    })
  }
}

/// A `checkins` row joined with its volunteer.
pub struct RawCheckinRecord {
  pub checkin_id:   i64,
  pub volunteer_id: String,
  pub name:         String,
  pub photo_url:    Option<String>,
  pub checkin_time: String,
}

impl RawCheckinRecord {
  pub fn into_record(self) -> Result<CheckinRecord> {
    Ok(CheckinRecord {
      checkin_id:   self.checkin_id,
      volunteer_id: decode_uuid(&self.volunteer_id)?,
      name:         self.name,
      photo_url:    self.photo_url,
      checkin_time: decode_dt(&self.checkin_time)?,
    })
  }
}

pub struct RawCheckinCount {
  pub id:    String,
  pub name:  String,
  pub total: i64,
}

impl RawCheckinCount {
  pub fn into_count(self) -> Result<CheckinCount> {
    Ok(CheckinCount {
      id:             decode_uuid(&self.id)?,
      name:           self.name,
      total_checkins: self.total.max(0) as u64,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn timestamps_are_fixed_width_and_sortable() {
    let a = Utc.with_ymd_and_hms(2024, 5, 15, 9, 0, 0).unwrap();
    let b = a + chrono::TimeDelta::microseconds(1);
    let (ea, eb) = (encode_dt(a), encode_dt(b));
    assert_eq!(ea, "2024-05-15T09:00:00.000000Z");
    assert_eq!(ea.len(), eb.len());
    assert!(ea < eb);
    assert_eq!(decode_dt(&eb).unwrap(), b);
  }

  #[test]
  fn like_wildcards_are_escaped() {
    assert_eq!(like_contains("souza"), "%souza%");
    assert_eq!(like_contains("50%_a\\b"), r"%50\%\_a\\b%");
  }

  #[test]
  fn bad_timestamp_is_a_parse_error() {
    assert!(matches!(decode_dt("yesterday"), Err(Error::DateParse(_))));
  }
}
