//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every error body has the shape `{"error_message": ..., "error_code": ...}`;
//! validation failures add a `field_errors` map.

use alpenwegs_core::Error as DomainError;
use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler or extractor.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Domain(#[from] DomainError),

  /// The request body was not the JSON the endpoint expects.
  #[error("{}", .0.body_text())]
  Body(#[from] JsonRejection),

  /// An `Authorization` header was sent but did not identify a user.
  #[error("Invalid username/password.")]
  Unauthorized,

  #[error("password hashing failed: {0}")]
  Hash(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn store(err: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(err))
  }

  pub fn status(&self) -> StatusCode {
    match self {
      Self::Domain(DomainError::PermissionDenied { .. }) => StatusCode::FORBIDDEN,
      Self::Domain(DomainError::Parse(_) | DomainError::Validation(_)) => StatusCode::BAD_REQUEST,
      Self::Domain(DomainError::InvalidPage) => StatusCode::NOT_FOUND,
      Self::Body(_) => StatusCode::BAD_REQUEST,
      Self::Unauthorized => StatusCode::UNAUTHORIZED,
      Self::Hash(_) | Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  pub fn code(&self) -> &'static str {
    match self {
      Self::Domain(e) => e.code(),
      Self::Body(_) => "parse_error",
      Self::Unauthorized => "not_authenticated",
      Self::Hash(_) | Self::Store(_) => "server_error",
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();

    let body = match &self {
      ApiError::Hash(_) | ApiError::Store(_) => {
        tracing::error!(error = %self, "request failed");
        json!({
          "error_message": "A server error occurred.",
          "error_code":    self.code(),
        })
      }
      ApiError::Domain(DomainError::Validation(fields)) => json!({
        "error_message": "Invalid input.",
        "error_code":    self.code(),
        "field_errors":  fields,
      }),
      _ => json!({
        "error_message": self.to_string(),
        "error_code":    self.code(),
      }),
    };

    let mut res = (status, Json(body)).into_response();
    if matches!(self, ApiError::Unauthorized) {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"alpenwegs\""),
      );
    }
    res
  }
}
