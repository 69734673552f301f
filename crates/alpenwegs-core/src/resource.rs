//! The [`Resource`] trait: what a type must declare to be listable.

use std::future::Future;

use serde::Serialize;

use crate::{
  filter::FieldSpec,
  store::{ListQuery, Listing, Store},
  visibility::Visibility,
};

/// Every type that can appear behind a list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
  User,
  Track,
  Group,
}

impl ResourceKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::User => "user",
      Self::Track => "track",
      Self::Group => "group",
    }
  }
}

/// A listable record type.
///
/// The [`Visibility`] capability is an associated constant, so which policy
/// branch applies is fixed when the type is declared.
pub trait Resource: Sized + Send + Sync + 'static {
  /// The summary representation used in list responses.
  type Relation: Serialize + Send;

  /// Fields that may be filtered on or ordered by.
  const FIELDS: &'static [FieldSpec];
  const KIND: ResourceKind;
  const VISIBILITY: Visibility;

  fn relation(&self) -> Self::Relation;

  /// Run `query` against the store table holding this type.
  fn fetch<'a, S: Store>(
    store: &'a S,
    query: &'a ListQuery,
  ) -> impl Future<Output = Result<Listing<Self>, S::Error>> + Send + 'a;
}
