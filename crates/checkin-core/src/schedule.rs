//! The weekly ideal-arrival table.

use std::{collections::BTreeMap, str::FromStr};

use chrono::{NaiveTime, Weekday};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScheduleError {
  #[error("unknown weekday: {0:?}")]
  Weekday(String),
  #[error("invalid time of day {0:?} (expected HH:MM)")]
  Time(String),
}

/// Ideal service start times per weekday, earliest first.
///
/// Only the first entry of a day is used for punctuality; later ones are kept
/// for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdealSchedule {
  days: BTreeMap<u8, Vec<NaiveTime>>,
}

impl IdealSchedule {
  pub fn empty() -> Self { Self { days: BTreeMap::new() } }

  /// Set the times for `day`, replacing any previous entry.
  pub fn with_day(mut self, day: Weekday, mut times: Vec<NaiveTime>) -> Self {
    times.sort();
    if times.is_empty() {
      self.days.remove(&day_index(day));
    } else {
      self.days.insert(day_index(day), times);
    }
    self
  }

  pub fn times(&self, day: Weekday) -> &[NaiveTime] {
    self.days.get(&day_index(day)).map(Vec::as_slice).unwrap_or(&[])
  }

  /// The time punctuality is judged against on `day`.
  pub fn first(&self, day: Weekday) -> Option<NaiveTime> { self.times(day).first().copied() }

  /// Build a schedule from `weekday name -> ["HH:MM", ...]`, starting from
  /// [`Default`] and replacing only the days that appear.
  pub fn from_overrides(overrides: &BTreeMap<String, Vec<String>>) -> Result<Self, ScheduleError> {
    let mut schedule = Self::default();
    for (day, times) in overrides {
      let weekday =
        Weekday::from_str(day.trim()).map_err(|_| ScheduleError::Weekday(day.clone()))?;
      let times = times
        .iter()
        .map(|t| {
          NaiveTime::parse_from_str(t.trim(), "%H:%M").map_err(|_| ScheduleError::Time(t.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;
      schedule = schedule.with_day(weekday, times);
    }
    Ok(schedule)
  }
}

impl Default for IdealSchedule {
  /// Sunday 09:00 and 17:00, weekdays 19:00, Saturday 18:00.
  fn default() -> Self {
    let hm = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap_or(NaiveTime::MIN);
    Self::empty()
      .with_day(Weekday::Sun, vec![hm(9, 0), hm(17, 0)])
      .with_day(Weekday::Mon, vec![hm(19, 0)])
      .with_day(Weekday::Tue, vec![hm(19, 0)])
      .with_day(Weekday::Wed, vec![hm(19, 0)])
      .with_day(Weekday::Thu, vec![hm(19, 0)])
      .with_day(Weekday::Fri, vec![hm(19, 0)])
      .with_day(Weekday::Sat, vec![hm(18, 0)])
  }
}

fn day_index(day: Weekday) -> u8 { day.num_days_from_sunday() as u8 }

#[cfg(test)]
mod tests {
  use super::*;

  fn t(h: u32, m: u32) -> NaiveTime { NaiveTime::from_hms_opt(h, m, 0).unwrap() }

  #[test]
  fn default_table() {
    let s = IdealSchedule::default();
    assert_eq!(s.times(Weekday::Sun), &[t(9, 0), t(17, 0)]);
    assert_eq!(s.first(Weekday::Wed), Some(t(19, 0)));
    assert_eq!(s.first(Weekday::Sat), Some(t(18, 0)));
  }

  #[test]
  fn overrides_replace_only_named_days() {
    let mut o = BTreeMap::new();
    o.insert("saturday".to_string(), vec!["20:30".to_string()]);
    o.insert("Mon".to_string(), vec![]);
    let s = IdealSchedule::from_overrides(&o).unwrap();
    assert_eq!(s.first(Weekday::Sat), Some(t(20, 30)));
    assert_eq!(s.first(Weekday::Mon), None);
    assert_eq!(s.first(Weekday::Tue), Some(t(19, 0)));
  }

  #[test]
  fn times_are_sorted() {
    let s = IdealSchedule::empty().with_day(Weekday::Sun, vec![t(17, 0), t(9, 0)]);
    assert_eq!(s.first(Weekday::Sun), Some(t(9, 0)));
  }

  #[test]
  fn bad_overrides_are_rejected() {
    let mut o = BTreeMap::new();
    o.insert("someday".to_string(), vec!["10:00".to_string()]);
    assert!(matches!(IdealSchedule::from_overrides(&o), Err(ScheduleError::Weekday(_))));

    let mut o = BTreeMap::new();
    o.insert("sunday".to_string(), vec!["25:99".to_string()]);
    assert!(matches!(IdealSchedule::from_overrides(&o), Err(ScheduleError::Time(_))));
  }
}
