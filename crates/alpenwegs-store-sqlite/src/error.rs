//! Error type for `alpenwegs-store-sqlite`.

use alpenwegs_core::{store::StoreError, user::IdentityConflicts};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown track category code: {0}")]
  UnknownCategory(i64),

  /// The username or email of a new user is already taken.
  #[error("user {username:?} already exists")]
  DuplicateUser {
    username:  String,
    conflicts: IdentityConflicts,
  },

  /// A visibility scope referenced columns the table does not have.
  #[error("table {table} cannot be restricted by {scope}")]
  UnsupportedScope {
    table: &'static str,
    scope: &'static str,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl StoreError for Error {
  fn identity_conflict(&self) -> Option<IdentityConflicts> {
    match self {
      Self::DuplicateUser { conflicts, .. } => Some(*conflicts),
      _ => None,
    }
  }
}
