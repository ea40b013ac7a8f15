//! Volunteer — the subject that checks in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// A registered volunteer.
///
/// `password_hash` is an argon2 PHC string and is never serialised.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Volunteer {
  pub id:            Uuid,
  pub name:          String,
  pub email:         String,
  pub roles:         Vec<String>,
  #[serde(skip_serializing, default)]
  pub password_hash: String,
  pub is_admin:      bool,
  pub photo_url:     Option<String>,
  pub created_at:    DateTime<Utc>,
}

/// Input for [`AttendanceStore::create_volunteer`](crate::store::AttendanceStore::create_volunteer).
#[derive(Debug, Clone)]
pub struct NewVolunteer {
  pub name:          String,
  pub email:         String,
  pub roles:         Vec<String>,
  pub password_hash: String,
  pub is_admin:      bool,
  pub photo_url:     Option<String>,
}

impl NewVolunteer {
  /// Validate the name policy and normalise the email.
  pub fn validated(mut self) -> Result<Self> {
    validate_full_name(&self.name)?;
    self.email = normalize_email(&self.email);
    Ok(self)
  }
}

/// A partial profile update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfilePatch {
  pub name:      Option<String>,
  pub email:     Option<String>,
  pub roles:     Option<Vec<String>>,
  pub photo_url: Option<String>,
  pub password:  Option<String>,
}

/// Full-name policy: at least two whitespace-separated components.
pub fn validate_full_name(name: &str) -> Result<()> {
  if name.split_whitespace().count() < 2 {
    return Err(Error::InvalidName);
  }
  Ok(())
}

pub fn normalize_email(email: &str) -> String { email.trim().to_lowercase() }

/// One row of the roles distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleCount {
  pub role:  String,
  pub count: usize,
}

/// Count volunteers per role label, most common first, then by label.
pub fn roles_distribution(volunteers: &[Volunteer]) -> Vec<RoleCount> {
  let mut counts: std::collections::BTreeMap<&str, usize> = Default::default();
  for v in volunteers {
    for role in &v.roles {
      *counts.entry(role.as_str()).or_default() += 1;
    }
  }
  let mut out: Vec<RoleCount> = counts
    .into_iter()
    .map(|(role, count)| RoleCount { role: role.to_owned(), count })
    .collect();
  out.sort_by(|a, b| b.count.cmp(&a.count));
  out
}
