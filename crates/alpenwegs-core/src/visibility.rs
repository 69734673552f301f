//! The visibility policy: which rows a principal may list.
//!
//! Visibility is never stored. It is a predicate computed per request from the
//! principal and the [`Visibility`] capability the resource type declares, and
//! handed to the store as a [`Scope`].

use uuid::Uuid;

use crate::{Error, Result, principal::Principal};

/// Message reported when a type without list semantics is listed.
pub const LIST_NOT_SUPPORTED: &str = "Model does not support list access.";

/// The listing capability a resource type declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
  /// The type represents principals themselves; each sees only their own row.
  SelfOnly,
  /// The type carries `is_public` and an optional `creator`.
  OwnedOrPublic,
  /// The type carries neither; listing it is a configuration error.
  Unsupported,
}

/// The restriction applied to a listing, as a predicate over rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
  /// No row is visible.
  Nothing,
  /// Only the row with this primary key.
  OnlyId(Uuid),
  /// Rows with `is_public = true`.
  Public,
  /// Rows with `is_public = true` or `creator = id`.
  PublicOrCreator(Uuid),
}

impl Scope {
  /// Evaluate the scope against a single row.
  pub fn admits(&self, id: Uuid, creator: Option<Uuid>, is_public: bool) -> bool {
    match *self {
      Self::Nothing => false,
      Self::OnlyId(only) => id == only,
      Self::Public => is_public,
      Self::PublicOrCreator(user) => is_public || creator == Some(user),
    }
  }
}

/// Signature of an injectable visibility policy.
pub type Policy = fn(Visibility, &Principal) -> Result<Scope>;

/// The default policy.
pub fn restrict(visibility: Visibility, principal: &Principal) -> Result<Scope> {
  match (visibility, principal) {
    (Visibility::SelfOnly, Principal::Anonymous) => Ok(Scope::Nothing),
    (Visibility::SelfOnly, Principal::Authenticated { user_id }) => {
      Ok(Scope::OnlyId(*user_id))
    }
    (Visibility::OwnedOrPublic, Principal::Anonymous) => Ok(Scope::Public),
    (Visibility::OwnedOrPublic, Principal::Authenticated { user_id }) => {
      Ok(Scope::PublicOrCreator(*user_id))
    }
    (Visibility::Unsupported, _) => {
      Err(Error::permission_denied(LIST_NOT_SUPPORTED))
    }
  }
}
