//! [`SqliteStore`], the SQLite implementation of [`Store`].

use std::path::Path;

use alpenwegs_core::{
  store::{ListQuery, Listing, Store},
  track::{NewTrack, Track},
  user::{Credentials, Group, IdentityConflicts, NewUser, User},
};
use chrono::Utc;
use rusqlite::{OptionalExtension as _, types::Value};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{FromRow, RawGroup, RawTrack, RawUser, decode_uuid, encode_dt, encode_uuid},
  schema::SCHEMA,
  sql::{self, GROUPS, TRACKS, Table, USERS},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An AlpenWegs store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
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

  /// Run a listing against `table`: one `COUNT(*)` plus one windowed `SELECT`.
  async fn select<R: FromRow>(&self, table: &'static Table, query: &ListQuery) -> Result<Listing<R>> {
    let select = sql::build(table, query)?;
    let (limit, offset) = match query.window {
      Some(w) => (sql_int(w.limit), sql_int(w.offset)),
      None => (-1, 0),
    };

    tracing::debug!(
      table = table.name,
      scope = ?query.scope,
      where_clause = %select.where_clause,
      limit,
      offset,
      "listing rows"
    );

    let (items, total) = self
      .conn
      .call(move |conn| {
        let total: i64 = conn.query_row(
          &select.count_sql(table),
          rusqlite::params_from_iter(select.params.iter()),
          |row| row.get(0),
        )?;

        let mut values = select.params.clone();
        values.push(Value::Integer(limit));
        values.push(Value::Integer(offset));

        let mut stmt = conn.prepare(&select.rows_sql(table))?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(values.iter()), R::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((rows, total))
      })
      .await?;

    Ok(Listing { items, total: total.max(0) as u64 })
  }
}

/// Which `users` uniqueness constraint an insert tripped, if any.
///
/// SQLite names the column in the message, e.g.
/// `UNIQUE constraint failed: users.email`.
fn user_conflicts(err: &tokio_rusqlite::Error) -> Option<IdentityConflicts> {
  let tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, msg)) = err else {
    return None;
  };
  if e.code != rusqlite::ErrorCode::ConstraintViolation {
    return None;
  }
  let msg       = msg.as_deref().unwrap_or_default();
  let conflicts = IdentityConflicts {
    username: msg.contains("users.username"),
    email:    msg.contains("users.email"),
  };
  (conflicts.username || conflicts.email).then_some(conflicts)
}

/// Clamp a window bound into SQLite's signed integer range.
fn sql_int(n: u64) -> i64 { i64::try_from(n).unwrap_or(i64::MAX) }

// ─── Store impl ──────────────────────────────────────────────────────────────

impl Store for SqliteStore {
  type Error = Error;

  // ── Accounts ──────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<User> {
    let user = User {
      user_id:     Uuid::new_v4(),
      username:    input.username,
      email:       input.email,
      first_name:  input.first_name,
      last_name:   input.last_name,
      date_joined: Utc::now(),
    };

    let id_str     = encode_uuid(user.user_id);
    let username   = user.username.clone();
    let email      = user.email.clone();
    let first_name = user.first_name.clone();
    let last_name  = user.last_name.clone();
    let hash       = input.password_hash;
    let joined_str = encode_dt(user.date_joined);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (
             user_id, username, email, first_name, last_name, password_hash, date_joined
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![id_str, username, email, first_name, last_name, hash, joined_str],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| match user_conflicts(&e) {
        Some(conflicts) => Error::DuplicateUser { username: user.username.clone(), conflicts },
        None => Error::Database(e),
      })?;

    Ok(user)
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(id);
    let sql    = format!("SELECT {} FROM users WHERE user_id = ?1", USERS.columns);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawUser::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn find_credentials(&self, username: &str) -> Result<Option<Credentials>> {
    let username = username.to_owned();

    let raw: Option<(String, String)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, password_hash FROM users WHERE username = ?1",
              rusqlite::params![username],
              |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?,
        )
      })
      .await?;

    raw
      .map(|(id, password_hash)| {
        Ok(Credentials { user_id: decode_uuid(&id)?, password_hash })
      })
      .transpose()
  }

  async fn identity_conflicts(&self, username: &str, email: &str) -> Result<IdentityConflicts> {
    let username = username.to_owned();
    let email    = email.to_owned();

    let conflicts = self
      .conn
      .call(move |conn| {
        let username: bool = conn.query_row(
          "SELECT EXISTS (SELECT 1 FROM users WHERE username = ?1)",
          rusqlite::params![username],
          |row| row.get(0),
        )?;
        let email: bool = conn.query_row(
          "SELECT EXISTS (SELECT 1 FROM users WHERE email = ?1 COLLATE NOCASE)",
          rusqlite::params![email],
          |row| row.get(0),
        )?;
        Ok(IdentityConflicts { username, email })
      })
      .await?;

    Ok(conflicts)
  }

  // ── Groups ────────────────────────────────────────────────────────────────

  async fn get_or_create_group(&self, name: &str) -> Result<Group> {
    let name       = name.to_owned();
    let candidate  = encode_uuid(Uuid::new_v4());

    let raw: RawGroup = self
      .conn
      .call(move |conn| {
        // The UNIQUE(name) constraint turns a racing second insert into a no-op.
        conn.execute(
          "INSERT OR IGNORE INTO user_groups (group_id, name) VALUES (?1, ?2)",
          rusqlite::params![candidate, name],
        )?;
        Ok(conn.query_row(
          "SELECT group_id, name FROM user_groups WHERE name = ?1",
          rusqlite::params![name],
          RawGroup::from_row,
        )?)
      })
      .await?;

    raw.into_group()
  }

  async fn add_member(&self, user_id: Uuid, group_id: Uuid) -> Result<()> {
    let user_str  = encode_uuid(user_id);
    let group_str = encode_uuid(group_id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR IGNORE INTO group_members (user_id, group_id) VALUES (?1, ?2)",
          rusqlite::params![user_str, group_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn groups_for_user(&self, user_id: Uuid) -> Result<Vec<Group>> {
    let user_str = encode_uuid(user_id);

    let raws: Vec<RawGroup> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT g.group_id, g.name
           FROM user_groups g
           JOIN group_members m ON m.group_id = g.group_id
           WHERE m.user_id = ?1
           ORDER BY g.name",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_str], RawGroup::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawGroup::into_group).collect()
  }

  // ── Tracks ────────────────────────────────────────────────────────────────

  async fn create_track(&self, input: NewTrack) -> Result<Track> {
    let track = Track {
      track_id:       Uuid::new_v4(),
      name:           input.name,
      snippet:        input.snippet,
      category:       input.category,
      difficulty:     input.difficulty,
      total_distance: input.total_distance,
      elevation_gain: input.elevation_gain,
      average_speed:  input.average_speed,
      maximum_speed:  input.maximum_speed,
      total_time:     input.total_time,
      is_public:      input.is_public,
      creator_id:     input.creator_id,
      created_at:     Utc::now(),
    };

    let params: Vec<Value> = vec![
      Value::Text(encode_uuid(track.track_id)),
      Value::Text(track.name.clone()),
      track.snippet.clone().map_or(Value::Null, Value::Text),
      Value::Integer(track.category.code()),
      track.difficulty.clone().map_or(Value::Null, Value::Text),
      Value::Real(track.total_distance),
      Value::Real(track.elevation_gain),
      track.average_speed.map_or(Value::Null, Value::Real),
      track.maximum_speed.map_or(Value::Null, Value::Real),
      track.total_time.map_or(Value::Null, Value::Integer),
      Value::Integer(i64::from(track.is_public)),
      track.creator_id.map_or(Value::Null, |id| Value::Text(encode_uuid(id))),
      Value::Text(encode_dt(track.created_at)),
    ];

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO tracks (
             track_id, name, snippet, category, difficulty, total_distance,
             elevation_gain, average_speed, maximum_speed, total_time,
             is_public, creator_id, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
          rusqlite::params_from_iter(params.iter()),
        )?;
        Ok(())
      })
      .await?;

    Ok(track)
  }

  // ── Listings ──────────────────────────────────────────────────────────────

  async fn list_users(&self, query: &ListQuery) -> Result<Listing<User>> {
    let listing = self.select::<RawUser>(&USERS, query).await?;
    let items   = listing.items.into_iter().map(RawUser::into_user).collect::<Result<_>>()?;
    Ok(Listing { items, total: listing.total })
  }

  async fn list_tracks(&self, query: &ListQuery) -> Result<Listing<Track>> {
    let listing = self.select::<RawTrack>(&TRACKS, query).await?;
    let items   = listing.items.into_iter().map(RawTrack::into_track).collect::<Result<_>>()?;
    Ok(Listing { items, total: listing.total })
  }

  async fn list_groups(&self, query: &ListQuery) -> Result<Listing<Group>> {
    let listing = self.select::<RawGroup>(&GROUPS, query).await?;
    let items   = listing.items.into_iter().map(RawGroup::into_group).collect::<Result<_>>()?;
    Ok(Listing { items, total: listing.total })
  }
}
