//! SQL schema for the Checkin SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS volunteers (
    id            TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    email         TEXT NOT NULL UNIQUE COLLATE NOCASE,
    roles         TEXT NOT NULL DEFAULT '[]',   -- JSON array of labels
    password_hash TEXT NOT NULL,                -- argon2 PHC string
    is_admin      INTEGER NOT NULL DEFAULT 0,
    photo_url     TEXT,
    created_at    TEXT NOT NULL
);

-- Check-ins are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS checkins (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    volunteer_id  TEXT NOT NULL REFERENCES volunteers(id),
    checkin_time  TEXT NOT NULL                 -- RFC 3339 UTC, fixed width
);

CREATE INDEX IF NOT EXISTS checkins_volunteer_idx ON checkins(volunteer_id);
CREATE INDEX IF NOT EXISTS checkins_time_idx      ON checkins(checkin_time);

PRAGMA user_version = 1;
";
