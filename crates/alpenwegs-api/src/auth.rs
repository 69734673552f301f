//! HTTP Basic-auth principal extractor.
//!
//! Authentication is optional: a request without an `Authorization` header is
//! anonymous. A header that is present but malformed, or whose credentials do
//! not verify, is rejected with 401 rather than downgraded to anonymous.

use alpenwegs_core::{principal::Principal, store::Store};
use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header, request::Parts};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;

use crate::{AppState, error::ApiError};

/// The principal behind the current request.
///
/// A local newtype so it can implement axum's extractor trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestPrincipal(pub Principal);

/// Split a `Basic` header value into username and password.
fn basic_credentials(headers: &HeaderMap) -> Result<Option<(String, String)>, ApiError> {
  let Some(value) = headers.get(header::AUTHORIZATION) else {
    return Ok(None);
  };

  let value   = value.to_str().map_err(|_| ApiError::Unauthorized)?;
  let encoded = value.strip_prefix("Basic ").ok_or(ApiError::Unauthorized)?;
  let decoded = B64.decode(encoded.trim()).map_err(|_| ApiError::Unauthorized)?;
  let creds   = String::from_utf8(decoded).map_err(|_| ApiError::Unauthorized)?;

  let (username, password) = creds.split_once(':').ok_or(ApiError::Unauthorized)?;
  Ok(Some((username.to_owned(), password.to_owned())))
}

/// Resolve the request's principal against the accounts in `store`.
pub async fn authenticate<S: Store>(headers: &HeaderMap, store: &S) -> Result<Principal, ApiError> {
  let Some((username, password)) = basic_credentials(headers)? else {
    return Ok(Principal::Anonymous);
  };

  let creds = store
    .find_credentials(&username)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::Unauthorized)?;

  let parsed_hash = PasswordHash::new(&creds.password_hash)
    .map_err(|_| ApiError::Unauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| ApiError::Unauthorized)?;

  tracing::debug!(user_id = %creds.user_id, "authenticated request");
  Ok(Principal::authenticated(creds.user_id))
}

impl<S> FromRequestParts<AppState<S>> for RequestPrincipal
where
  S: Store + Clone + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    authenticate(&parts.headers, state.store.as_ref()).await.map(Self)
  }
}
