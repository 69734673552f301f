//! JSON REST API for AlpenWegs.
//!
//! Exposes an axum [`Router`] backed by any [`alpenwegs_core::store::Store`].
//! TLS and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", alpenwegs_api::api_router(state))
//! ```

pub mod auth;
pub mod error;
pub mod list;
pub mod registration;

use std::sync::Arc;

use alpenwegs_core::{
  page::Paginator,
  store::Store,
  track::Track,
  user::{Group, User},
  visibility::{self, Policy},
};
use axum::{
  Router,
  routing::{get, post},
};

pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Per-router settings shared by every handler.
#[derive(Clone, Copy)]
pub struct ApiConfig {
  /// `None` renders list responses as bare arrays.
  pub pagination: Option<Paginator>,
  pub policy:     Policy,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self { pagination: Some(Paginator::default()), policy: visibility::restrict }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S> {
  pub store:  Arc<S>,
  pub config: Arc<ApiConfig>,
}

impl<S> AppState<S> {
  pub fn new(store: S, config: ApiConfig) -> Self {
    Self { store: Arc::new(store), config: Arc::new(config) }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: Store + Clone + 'static,
{
  Router::new()
    // Listings
    .route("/users/", get(list::handler::<S, User>))
    .route("/tracks/", get(list::handler::<S, Track>))
    // Path the track explorer front end requests.
    .route("/explorers/track/", get(list::handler::<S, Track>))
    .route("/groups/", get(list::handler::<S, Group>))
    // Accounts
    .route("/auth/registration/", post(registration::handler::<S>))
    .with_state(state)
}
