//! The `Store` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `alpenwegs-store-sqlite`). Higher layers depend on this abstraction, not on
//! any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  filter::Filter,
  page::Window,
  track::{NewTrack, Track},
  user::{Credentials, Group, IdentityConflicts, NewUser, User},
  visibility::Scope,
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// A fully-resolved listing request. Stores must apply `scope` and every
/// condition in `filter` conjunctively.
#[derive(Debug, Clone)]
pub struct ListQuery {
  pub scope:  Scope,
  pub filter: Filter,
  /// `None` returns every matching row.
  pub window: Option<Window>,
}

/// One window of rows plus the number of rows matching overall.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
  pub items: Vec<T>,
  pub total: u64,
}

impl<T> Listing<T> {
  pub fn map<U>(self, f: impl FnMut(T) -> U) -> Listing<U> {
    Listing { items: self.items.into_iter().map(f).collect(), total: self.total }
  }
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// What the layers above need to know about a backend error.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// `Some` when a write failed because the username or email is already
  /// taken, reporting which.
  fn identity_conflict(&self) -> Option<IdentityConflicts> { None }
}

impl StoreError for std::convert::Infallible {}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over an AlpenWegs storage backend.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait Store: Send + Sync {
  type Error: StoreError;

  // ── Accounts ──────────────────────────────────────────────────────────

  /// Persist a new user. Fails if the username or email is already taken, with
  /// an error whose [`StoreError::identity_conflict`] says which.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Look up the password hash for `username`.
  fn find_credentials<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<Credentials>, Self::Error>> + Send + 'a;

  /// Report which of `username` / `email` (case-insensitive) are in use.
  fn identity_conflicts<'a>(
    &'a self,
    username: &'a str,
    email: &'a str,
  ) -> impl Future<Output = Result<IdentityConflicts, Self::Error>> + Send + 'a;

  // ── Groups ────────────────────────────────────────────────────────────

  /// Return the group called `name`, creating it if absent. Concurrent calls
  /// never produce two groups with the same name.
  fn get_or_create_group<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Group, Self::Error>> + Send + 'a;

  /// Add a user to a group. Adding an existing member is a no-op.
  fn add_member(
    &self,
    user_id: Uuid,
    group_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn groups_for_user(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Group>, Self::Error>> + Send + '_;

  // ── Tracks ────────────────────────────────────────────────────────────

  fn create_track(
    &self,
    input: NewTrack,
  ) -> impl Future<Output = Result<Track, Self::Error>> + Send + '_;

  // ── Listings ──────────────────────────────────────────────────────────

  fn list_users<'a>(
    &'a self,
    query: &'a ListQuery,
  ) -> impl Future<Output = Result<Listing<User>, Self::Error>> + Send + 'a;

  fn list_tracks<'a>(
    &'a self,
    query: &'a ListQuery,
  ) -> impl Future<Output = Result<Listing<Track>, Self::Error>> + Send + 'a;

  /// Groups have no visibility columns and are not the self-model; backends
  /// reject every scope except [`Scope::Nothing`].
  fn list_groups<'a>(
    &'a self,
    query: &'a ListQuery,
  ) -> impl Future<Output = Result<Listing<Group>, Self::Error>> + Send + 'a;
}
