//! Users and groups.
//!
//! [`User`] is the self-model type: listing users only ever yields the
//! requester's own row. [`Group`] declares no listing semantics at all.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  filter::{FieldKind, FieldSpec},
  resource::{Resource, ResourceKind},
  store::{ListQuery, Listing, Store},
  visibility::Visibility,
};

/// A registered account. The password hash never leaves the store except
/// through [`Credentials`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub user_id:     Uuid,
  pub username:    String,
  pub email:       String,
  pub first_name:  String,
  pub last_name:   String,
  pub date_joined: DateTime<Utc>,
}

/// Input to [`Store::create_user`]. `password_hash` is a PHC string.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub username:      String,
  pub email:         String,
  pub first_name:    String,
  pub last_name:     String,
  pub password_hash: String,
}

/// What the authenticator needs to verify a login.
#[derive(Debug, Clone)]
pub struct Credentials {
  pub user_id:       Uuid,
  pub password_hash: String,
}

/// Whether a registration would collide with an existing account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdentityConflicts {
  pub username: bool,
  pub email:    bool,
}

/// A named collection of users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
  pub group_id: Uuid,
  pub name:     String,
}

// ─── Relation representations ────────────────────────────────────────────────

/// Summary fields rendered in list responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRelation {
  pub user_id:    Uuid,
  pub username:   String,
  pub first_name: String,
  pub last_name:  String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupRelation {
  pub group_id: Uuid,
  pub name:     String,
}

// ─── Resource impls ──────────────────────────────────────────────────────────

impl Resource for User {
  type Relation = UserRelation;

  const FIELDS: &'static [FieldSpec] = &[
    FieldSpec::new("username", FieldKind::Text).sortable(),
    FieldSpec::new("first_name", FieldKind::Text).sortable(),
    FieldSpec::new("last_name", FieldKind::Text).sortable(),
  ];
  const KIND: ResourceKind = ResourceKind::User;
  const VISIBILITY: Visibility = Visibility::SelfOnly;

  fn relation(&self) -> UserRelation {
    UserRelation {
      user_id:    self.user_id,
      username:   self.username.clone(),
      first_name: self.first_name.clone(),
      last_name:  self.last_name.clone(),
    }
  }

  fn fetch<'a, S: Store>(
    store: &'a S,
    query: &'a ListQuery,
  ) -> impl Future<Output = Result<Listing<Self>, S::Error>> + Send + 'a {
    store.list_users(query)
  }
}

impl Resource for Group {
  type Relation = GroupRelation;

  const FIELDS: &'static [FieldSpec] = &[FieldSpec::new("name", FieldKind::Text).sortable()];
  const KIND: ResourceKind = ResourceKind::Group;
  const VISIBILITY: Visibility = Visibility::Unsupported;

  fn relation(&self) -> GroupRelation {
    GroupRelation { group_id: self.group_id, name: self.name.clone() }
  }

  fn fetch<'a, S: Store>(
    store: &'a S,
    query: &'a ListQuery,
  ) -> impl Future<Output = Result<Listing<Self>, S::Error>> + Send + 'a {
    store.list_groups(query)
  }
}
