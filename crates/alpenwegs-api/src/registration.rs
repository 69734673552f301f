//! Handler for `POST /auth/registration/`.
//!
//! Account creation validates the input, rejects taken usernames and emails,
//! hashes the password and persists the user. Every new account then joins
//! the [`DEFAULT_GROUP`], which is created on first use.

use alpenwegs_core::{
  Error, FieldErrors,
  registration::{DEFAULT_GROUP, Registration},
  resource::Resource as _,
  store::{Store, StoreError as _},
  user::{Group, IdentityConflicts, NewUser, User, UserRelation},
};
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::StatusCode,
};
use rand_core::OsRng;
use serde::Serialize;

use crate::{AppState, error::ApiError};

/// Body of a successful registration.
#[derive(Debug, Serialize)]
pub struct Registered {
  pub user:   UserRelation,
  pub groups: Vec<String>,
}

/// Argon2 PHC string for `password`.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| ApiError::Hash(e.to_string()))
}

/// Validate, check uniqueness, hash, and persist a new account.
pub async fn create_account<S: Store>(store: &S, input: Registration) -> Result<User, ApiError> {
  input.validate()?;

  let username = input.username.trim();
  let email    = input.email.trim();

  let conflicts = store
    .identity_conflicts(username, email)
    .await
    .map_err(ApiError::store)?;

  conflict_errors(conflicts).into_result()?;

  let password_hash = hash_password(&input.password1)?;

  // A concurrent registration can still win the race to the UNIQUE index.
  store
    .create_user(NewUser {
      username: username.to_owned(),
      email: email.to_owned(),
      first_name: input.first_name.unwrap_or_default(),
      last_name: input.last_name.unwrap_or_default(),
      password_hash,
    })
    .await
    .map_err(|e| match e.identity_conflict() {
      Some(conflicts) => Error::Validation(conflict_errors(conflicts)).into(),
      None => ApiError::store(e),
    })
}

fn conflict_errors(conflicts: IdentityConflicts) -> FieldErrors {
  let mut errors = FieldErrors::new();
  if conflicts.username {
    errors.add("username", "A user with that username already exists.");
  }
  if conflicts.email {
    errors.add("email", "A user is already registered with this e-mail address.");
  }
  errors
}

/// Ensure the default group exists and add `user` to it.
pub async fn enroll_in_default_group<S: Store>(store: &S, user: &User) -> Result<Group, S::Error> {
  let group = store.get_or_create_group(DEFAULT_GROUP).await?;
  store.add_member(user.user_id, group.group_id).await?;
  Ok(group)
}

/// Create the account, then enrol it.
///
/// Enrolment failure leaves the account in place and surfaces as a server
/// error.
pub async fn register<S: Store>(store: &S, input: Registration) -> Result<Registered, ApiError> {
  let user = create_account(store, input).await?;
  tracing::info!(user_id = %user.user_id, username = %user.username, "registered account");

  if let Err(e) = enroll_in_default_group(store, &user).await {
    tracing::error!(
      user_id = %user.user_id,
      group = DEFAULT_GROUP,
      error = %e,
      "account created but default group enrolment failed"
    );
    return Err(ApiError::store(e));
  }

  let groups = store
    .groups_for_user(user.user_id)
    .await
    .map_err(ApiError::store)?
    .into_iter()
    .map(|g| g.name)
    .collect();

  Ok(Registered { user: user.relation(), groups })
}

/// `POST /auth/registration/`
pub async fn handler<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<Registration>, JsonRejection>,
) -> Result<(StatusCode, Json<Registered>), ApiError>
where
  S: Store + Clone + 'static,
{
  let Json(input) = body?;
  let registered  = register(state.store.as_ref(), input).await?;
  Ok((StatusCode::CREATED, Json(registered)))
}

#[cfg(test)]
mod tests {
  use alpenwegs_core::{
    store::{ListQuery, Listing},
    track::{NewTrack, Track},
    user::Credentials,
  };
  use alpenwegs_store_sqlite::SqliteStore;

  use super::*;

  fn input(username: &str, email: &str) -> Registration {
    Registration {
      username:   username.into(),
      email:      email.into(),
      password1:  "correct horse battery".into(),
      password2:  "correct horse battery".into(),
      first_name: None,
      last_name:  None,
    }
  }

  #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
  async fn concurrent_duplicate_registration_is_a_validation_error() {
    let store = SqliteStore::open_in_memory().await.unwrap();

    let handles: Vec<_> = ["alice@example.com", "alice@example.org"]
      .into_iter()
      .map(|email| {
        let store = store.clone();
        tokio::spawn(async move { register(&store, input("alice", email)).await })
      })
      .collect();

    let mut ok = 0;
    for handle in handles {
      match handle.await.unwrap() {
        Ok(registered) => {
          ok += 1;
          assert_eq!(registered.groups, vec![DEFAULT_GROUP.to_string()]);
        }
        Err(err) => {
          assert_eq!(err.status(), StatusCode::BAD_REQUEST, "{err}");
          assert_eq!(err.code(), "validation_error");
          let ApiError::Domain(Error::Validation(fields)) = &err else {
            panic!("expected field errors, got {err:?}");
          };
          assert!(fields.get("username").is_some());
        }
      }
    }
    assert_eq!(ok, 1);
  }

  // Reports every identity as free, the way a racing request sees it.
  #[derive(Clone)]
  struct StaleCheckStore(SqliteStore);

  impl Store for StaleCheckStore {
    type Error = alpenwegs_store_sqlite::Error;
    async fn create_user(&self, input: NewUser) -> Result<User, Self::Error> { self.0.create_user(input).await }
    async fn get_user(&self, id: uuid::Uuid) -> Result<Option<User>, Self::Error> { self.0.get_user(id).await }
    async fn find_credentials(&self, username: &str) -> Result<Option<Credentials>, Self::Error> { self.0.find_credentials(username).await }
    async fn identity_conflicts(&self, _: &str, _: &str) -> Result<IdentityConflicts, Self::Error> { Ok(IdentityConflicts::default()) }
    async fn get_or_create_group(&self, name: &str) -> Result<Group, Self::Error> { self.0.get_or_create_group(name).await }
    async fn add_member(&self, user_id: uuid::Uuid, group_id: uuid::Uuid) -> Result<(), Self::Error> { self.0.add_member(user_id, group_id).await }
    async fn groups_for_user(&self, user_id: uuid::Uuid) -> Result<Vec<Group>, Self::Error> { self.0.groups_for_user(user_id).await }
    async fn create_track(&self, input: NewTrack) -> Result<Track, Self::Error> { self.0.create_track(input).await }
    async fn list_users(&self, query: &ListQuery) -> Result<Listing<User>, Self::Error> { self.0.list_users(query).await }
    async fn list_tracks(&self, query: &ListQuery) -> Result<Listing<Track>, Self::Error> { self.0.list_tracks(query).await }
    async fn list_groups(&self, query: &ListQuery) -> Result<Listing<Group>, Self::Error> { self.0.list_groups(query).await }
  }

  #[tokio::test]
  async fn insert_conflict_after_passing_precheck_is_a_validation_error() {
    let store = StaleCheckStore(SqliteStore::open_in_memory().await.unwrap());
    register(&store, input("alice", "alice@example.com")).await.unwrap();

    let err = register(&store, input("ALICE", "other@example.com")).await.unwrap_err();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    let ApiError::Domain(Error::Validation(fields)) = &err else {
      panic!("expected field errors, got {err:?}");
    };
    assert_eq!(
      fields.get("username"),
      Some(&["A user with that username already exists.".to_string()][..])
    );
  }
}
