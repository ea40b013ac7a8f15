//! [`SqliteStore`] — the SQLite implementation of [`AttendanceStore`].

use std::path::Path;

use chrono::{SubsecRound as _, Utc};
use rusqlite::{OptionalExtension as _, ffi};
use uuid::Uuid;

use checkin_core::{
  checkin::{Checkin, CheckinCount, CheckinRecord},
  store::{AttendanceStore, CheckinQuery, VolunteerFilter},
  volunteer::{NewVolunteer, Volunteer},
};

use crate::{
  Error, Result,
  encode::{
    RawCheckin, RawCheckinCount, RawCheckinRecord, RawVolunteer, VOLUNTEER_COLUMNS, encode_dt,
    encode_roles, encode_uuid, like_contains,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An attendance store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// Outcome of a write that may hit a constraint.
enum Write {
  Done,
  Unique,
  ForeignKey,
}

fn classify(result: rusqlite::Result<usize>) -> tokio_rusqlite::Result<Write> {
  match result {
    Ok(_) => Ok(Write::Done),
    Err(rusqlite::Error::SqliteFailure(f, _))
      if f.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE =>
    {
      Ok(Write::Unique)
    }
    Err(rusqlite::Error::SqliteFailure(f, _))
      if f.extended_code == ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
    {
      Ok(Write::ForeignKey)
    }
    Err(e) => Err(e.into()),
  }
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn volunteer_where(
    &self,
    clause: &'static str,
    param: String,
  ) -> Result<Option<Volunteer>> {
    let raw: Option<RawVolunteer> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {VOLUNTEER_COLUMNS} FROM volunteers WHERE {clause}"),
            rusqlite::params![param],
            RawVolunteer::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawVolunteer::into_volunteer).transpose()
  }
}

// ─── AttendanceStore impl ────────────────────────────────────────────────────

impl AttendanceStore for SqliteStore {
  type Error = Error;

  // ── Volunteers ────────────────────────────────────────────────────────────

  async fn create_volunteer(&self, input: NewVolunteer) -> Result<Volunteer> {
    let volunteer = Volunteer {
      id:            Uuid::new_v4(),
      name:          input.name,
      email:         input.email,
      roles:         input.roles,
      password_hash: input.password_hash,
      is_admin:      input.is_admin,
      photo_url:     input.photo_url,
      created_at:    Utc::now().trunc_subsecs(6),
    };

    let id_str    = encode_uuid(volunteer.id);
    let name      = volunteer.name.clone();
    let email     = volunteer.email.clone();
    let roles_str = encode_roles(&volunteer.roles)?;
    let hash      = volunteer.password_hash.clone();
    let is_admin  = volunteer.is_admin;
    let photo_url = volunteer.photo_url.clone();
    let at_str    = encode_dt(volunteer.created_at);

    let outcome = self
      .conn
      .call(move |conn| {
        classify(conn.execute(
          "INSERT INTO volunteers (
             id, name, email, roles, password_hash, is_admin, photo_url, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![id_str, name, email, roles_str, hash, is_admin, photo_url, at_str],
        ))
      })
      .await?;

    match outcome {
      Write::Done => Ok(volunteer),
      Write::Unique | Write::ForeignKey => Err(Error::EmailTaken(volunteer.email)),
    }
  }

  async fn get_volunteer(&self, id: Uuid) -> Result<Option<Volunteer>> {
    self.volunteer_where("id = ?1", encode_uuid(id)).await
  }

  async fn find_volunteer_by_email(&self, email: &str) -> Result<Option<Volunteer>> {
    self.volunteer_where("email = ?1", email.trim().to_owned()).await
  }

  async fn update_volunteer(&self, volunteer: &Volunteer) -> Result<()> {
    let id        = volunteer.id;
    let id_str    = encode_uuid(id);
    let name      = volunteer.name.clone();
    let email     = volunteer.email.clone();
    let roles_str = encode_roles(&volunteer.roles)?;
    let hash      = volunteer.password_hash.clone();
    let is_admin  = volunteer.is_admin;
    let photo_url = volunteer.photo_url.clone();

    let (outcome, changed) = self
      .conn
      .call(move |conn| {
        let result = conn.execute(
          "UPDATE volunteers
              SET name = ?2, email = ?3, roles = ?4, password_hash = ?5,
                  is_admin = ?6, photo_url = ?7
            WHERE id = ?1",
          rusqlite::params![id_str, name, email, roles_str, hash, is_admin, photo_url],
        );
        let changed = matches!(result, Ok(n) if n > 0);
        Ok((classify(result)?, changed))
      })
      .await?;

    match outcome {
      Write::Unique | Write::ForeignKey => Err(Error::EmailTaken(volunteer.email.clone())),
      Write::Done if !changed => Err(Error::VolunteerNotFound(id)),
      Write::Done => Ok(()),
    }
  }

  async fn list_volunteers(&self, filter: &VolunteerFilter) -> Result<Vec<Volunteer>> {
    let name_pattern = filter.name.as_deref().map(like_contains);
    let role         = filter.role.clone();

    let raws: Vec<RawVolunteer> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {VOLUNTEER_COLUMNS}
             FROM volunteers v
            WHERE (?1 IS NULL OR v.name LIKE ?1 ESCAPE '\\')
              AND (?2 IS NULL OR EXISTS (
                    SELECT 1 FROM json_each(v.roles) r WHERE r.value = ?2))
            ORDER BY v.name COLLATE NOCASE"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![name_pattern, role], RawVolunteer::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawVolunteer::into_volunteer).collect()
  }

  async fn set_admin(&self, email: &str, is_admin: bool) -> Result<bool> {
    let email = email.trim().to_owned();
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE volunteers SET is_admin = ?2 WHERE email = ?1",
          rusqlite::params![email, is_admin],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }

  // ── Check-ins ─────────────────────────────────────────────────────────────

  async fn record_checkin(&self, volunteer_id: Uuid) -> Result<Checkin> {
    let checkin_time = Utc::now().trunc_subsecs(6);
    let vid_str      = encode_uuid(volunteer_id);
    let at_str       = encode_dt(checkin_time);

    let (outcome, id) = self
      .conn
      .call(move |conn| {
        let outcome = classify(conn.execute(
          "INSERT INTO checkins (volunteer_id, checkin_time) VALUES (?1, ?2)",
          rusqlite::params![vid_str, at_str],
        ))?;
        Ok((outcome, conn.last_insert_rowid()))
      })
      .await?;

    match outcome {
      Write::Done => Ok(Checkin { id, volunteer_id, checkin_time }),
      Write::Unique | Write::ForeignKey => Err(Error::VolunteerNotFound(volunteer_id)),
    }
  }

  async fn list_checkins(&self, query: &CheckinQuery) -> Result<Vec<CheckinRecord>> {
    let since_str = query.since.map(encode_dt);
    let vid_str   = query.volunteer_id.map(encode_uuid);

    let raws: Vec<RawCheckinRecord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT c.id, c.volunteer_id, v.name, v.photo_url, c.checkin_time
             FROM checkins c
             JOIN volunteers v ON v.id = c.volunteer_id
            WHERE (?1 IS NULL OR c.checkin_time >= ?1)
              AND (?2 IS NULL OR c.volunteer_id = ?2)
            ORDER BY c.checkin_time, c.id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![since_str, vid_str], |row| {
            Ok(RawCheckinRecord {
              checkin_id:   row.get(0)?,
              volunteer_id: row.get(1)?,
              name:         row.get(2)?,
              photo_url:    row.get(3)?,
              checkin_time: row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCheckinRecord::into_record).collect()
  }

  async fn latest_checkin(&self, volunteer_id: Option<Uuid>) -> Result<Option<Checkin>> {
    let vid_str = volunteer_id.map(encode_uuid);

    let raw: Option<RawCheckin> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT id, volunteer_id, checkin_time
               FROM checkins
              WHERE (?1 IS NULL OR volunteer_id = ?1)
              ORDER BY checkin_time DESC, id DESC
              LIMIT 1",
            rusqlite::params![vid_str],
            |row| {
              Ok(RawCheckin {
                id:           row.get(0)?,
                volunteer_id: row.get(1)?,
                checkin_time: row.get(2)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawCheckin::into_checkin).transpose()
  }

  async fn checkin_counts(&self) -> Result<Vec<CheckinCount>> {
    let raws: Vec<RawCheckinCount> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT v.id, v.name, COUNT(c.id) AS total
             FROM checkins c
             JOIN volunteers v ON v.id = c.volunteer_id
            GROUP BY v.id, v.name
            ORDER BY total DESC, MIN(c.id)",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawCheckinCount {
              id:    row.get(0)?,
              name:  row.get(1)?,
              total: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCheckinCount::into_count).collect()
  }
}

