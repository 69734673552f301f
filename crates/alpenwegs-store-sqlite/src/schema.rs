//! SQL schema for the AlpenWegs SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    username      TEXT NOT NULL UNIQUE COLLATE NOCASE,
    email         TEXT NOT NULL,
    first_name    TEXT NOT NULL DEFAULT '',
    last_name     TEXT NOT NULL DEFAULT '',
    password_hash TEXT NOT NULL,   -- argon2 PHC string
    date_joined   TEXT NOT NULL    -- ISO 8601 UTC
);

CREATE UNIQUE INDEX IF NOT EXISTS users_email_idx ON users(email COLLATE NOCASE);

-- The UNIQUE name constraint is what makes get-or-create idempotent.
CREATE TABLE IF NOT EXISTS user_groups (
    group_id TEXT PRIMARY KEY,
    name     TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS group_members (
    user_id  TEXT NOT NULL REFERENCES users(user_id),
    group_id TEXT NOT NULL REFERENCES user_groups(group_id),
    PRIMARY KEY (user_id, group_id)
);

CREATE TABLE IF NOT EXISTS tracks (
    track_id       TEXT PRIMARY KEY,
    name           TEXT NOT NULL,
    snippet        TEXT,
    category       INTEGER NOT NULL,   -- 110 running | 120 hike | 130 climbing
    difficulty     TEXT,
    total_distance REAL NOT NULL DEFAULT 0,
    elevation_gain REAL NOT NULL DEFAULT 0,
    average_speed  REAL,
    maximum_speed  REAL,
    total_time     INTEGER,
    is_public      INTEGER NOT NULL DEFAULT 0,
    creator_id     TEXT REFERENCES users(user_id),
    created_at     TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS tracks_public_idx  ON tracks(is_public);
CREATE INDEX IF NOT EXISTS tracks_creator_idx ON tracks(creator_id);

PRAGMA user_version = 1;
";
