//! Handlers for the visibility-restricted list endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/users/`  | Self only: anonymous sees nothing |
//! | `GET`  | `/tracks/` | Public rows, plus the requester's own |
//! | `GET`  | `/explorers/track/` | Same as `/tracks/` |
//! | `GET`  | `/groups/` | Always 403 |
//!
//! Query parameters are filters (`field[__lookup]=value`), `ordering`, and
//! the pagination pair `page_number` / `page_size`.

use std::marker::PhantomData;

use alpenwegs_core::{
  filter::Filter,
  page::{Page, PageRequest, Paginator},
  principal::Principal,
  resource::Resource,
  store::{ListQuery, Store},
  visibility::Policy,
};
use axum::{
  Json,
  extract::{Query, State},
};
use serde::Serialize;

use crate::{AppState, auth::RequestPrincipal, error::ApiError};

// ─── Rendering ────────────────────────────────────────────────────────────────

/// How a listing is shaped in the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Render {
  Paginated(Paginator),
  Unpaginated,
}

impl From<Option<Paginator>> for Render {
  fn from(pagination: Option<Paginator>) -> Self {
    pagination.map_or(Self::Unpaginated, Self::Paginated)
  }
}

/// Response body of a list endpoint.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ListBody<T> {
  Page(Page<T>),
  Items(Vec<T>),
}

// ─── Endpoint ─────────────────────────────────────────────────────────────────

/// A list endpoint for resource type `R`, with the visibility policy and the
/// renderer injected.
pub struct ListEndpoint<R> {
  policy:   Policy,
  render:   Render,
  resource: PhantomData<fn() -> R>,
}

impl<R: Resource> ListEndpoint<R> {
  pub fn new(policy: Policy, render: Render) -> Self {
    Self { policy, render, resource: PhantomData }
  }

  /// Run one listing request.
  ///
  /// The policy runs first; a denial returns before the store is touched.
  pub async fn list<S: Store>(
    &self,
    store: &S,
    principal: &Principal,
    params: &[(String, String)],
  ) -> Result<ListBody<R::Relation>, ApiError> {
    let scope = (self.policy)(R::VISIBILITY, principal)?;
    tracing::debug!(
      resource = R::KIND.as_str(),
      user_id = ?principal.user_id(),
      ?scope,
      "computed visibility scope"
    );

    let pairs  = || params.iter().map(|(k, v)| (k.as_str(), v.as_str()));
    let filter = Filter::parse(R::FIELDS, pairs())?;

    match self.render {
      Render::Paginated(paginator) => {
        let request = PageRequest::parse(pairs())?;
        let query   = ListQuery { scope, filter, window: Some(paginator.window(&request)) };
        let listing = R::fetch(store, &query)
          .await
          .map_err(ApiError::store)?
          .map(|row| row.relation());
        Ok(ListBody::Page(paginator.page(&request, listing.total, listing.items)?))
      }
      Render::Unpaginated => {
        let query   = ListQuery { scope, filter, window: None };
        let listing = R::fetch(store, &query)
          .await
          .map_err(ApiError::store)?
          .map(|row| row.relation());
        Ok(ListBody::Items(listing.items))
      }
    }
  }
}

/// `GET` handler shared by every list route.
pub async fn handler<S, R>(
  State(state): State<AppState<S>>,
  RequestPrincipal(principal): RequestPrincipal,
  Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<ListBody<R::Relation>>, ApiError>
where
  S: Store + Clone + 'static,
  R: Resource,
{
  let endpoint = ListEndpoint::<R>::new(state.config.policy, state.config.pagination.into());
  endpoint
    .list(state.store.as_ref(), &principal, &params)
    .await
    .map(Json)
}
