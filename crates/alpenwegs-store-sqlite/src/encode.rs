//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings so they sort
//! lexically, UUIDs as hyphenated lowercase strings, and track categories as
//! their numeric code.

use alpenwegs_core::{
  track::{Track, TrackCategory},
  user::{Group, User},
};
use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Nanos, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── TrackCategory ───────────────────────────────────────────────────────────

pub fn decode_category(code: i64) -> Result<TrackCategory> {
  TrackCategory::from_code(code).ok_or(Error::UnknownCategory(code))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// A row type that can be read positionally from a `SELECT` whose column
/// list is the matching [`Table::columns`](crate::sql::Table::columns).
pub trait FromRow: Sized + Send + 'static {
  fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self>;
}

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:     String,
  pub username:    String,
  pub email:       String,
  pub first_name:  String,
  pub last_name:   String,
  pub date_joined: String,
}

impl FromRow for RawUser {
  fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:     row.get(0)?,
      username:    row.get(1)?,
      email:       row.get(2)?,
      first_name:  row.get(3)?,
      last_name:   row.get(4)?,
      date_joined: row.get(5)?,
    })
  }
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:     decode_uuid(&self.user_id)?,
      username:    self.username,
      email:       self.email,
      first_name:  self.first_name,
      last_name:   self.last_name,
      date_joined: decode_dt(&self.date_joined)?,
    })
  }
}

/// Raw strings read directly from a `user_groups` row.
pub struct RawGroup {
  pub group_id: String,
  pub name:     String,
}

impl FromRow for RawGroup {
  fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self { group_id: row.get(0)?, name: row.get(1)? })
  }
}

impl RawGroup {
  pub fn into_group(self) -> Result<Group> {
    Ok(Group { group_id: decode_uuid(&self.group_id)?, name: self.name })
  }
}

/// Raw values read directly from a `tracks` row.
pub struct RawTrack {
  pub track_id:       String,
  pub name:           String,
  pub snippet:        Option<String>,
  pub category:       i64,
  pub difficulty:     Option<String>,
  pub total_distance: f64,
  pub elevation_gain: f64,
  pub average_speed:  Option<f64>,
  pub maximum_speed:  Option<f64>,
  pub total_time:     Option<i64>,
  pub is_public:      bool,
  pub creator_id:     Option<String>,
  pub created_at:     String,
}

impl FromRow for RawTrack {
  fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      track_id:       row.get(0)?,
      name:           row.get(1)?,
      snippet:        row.get(2)?,
      category:       row.get(3)?,
      difficulty:     row.get(4)?,
      total_distance: row.get(5)?,
      elevation_gain: row.get(6)?,
      average_speed:  row.get(7)?,
      maximum_speed:  row.get(8)?,
      total_time:     row.get(9)?,
      is_public:      row.get(10)?,
      creator_id:     row.get(11)?,
      created_at:     row.get(12)?,
    })
  }
}

impl RawTrack {
  pub fn into_track(self) -> Result<Track> {
    Ok(Track {
      track_id:       decode_uuid(&self.track_id)?,
      name:           self.name,
      snippet:        self.snippet,
      category:       decode_category(self.category)?,
      difficulty:     self.difficulty,
      total_distance: self.total_distance,
      elevation_gain: self.elevation_gain,
      average_speed:  self.average_speed,
      maximum_speed:  self.maximum_speed,
      total_time:     self.total_time,
      is_public:      self.is_public,
      creator_id:     self.creator_id.as_deref().map(decode_uuid).transpose()?,
      created_at:     decode_dt(&self.created_at)?,
    })
  }
}
