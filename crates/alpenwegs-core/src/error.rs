//! Error types for `alpenwegs-core`.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

/// Stable machine-readable code carried by [`Error::PermissionDenied`].
pub const PERMISSION_DENIED: &str = "permission_denied";

#[derive(Debug, Error)]
pub enum Error {
  /// The resource type cannot be listed through the generic path.
  #[error("{message}")]
  PermissionDenied { message: String },

  /// Malformed filter, ordering, or pagination input.
  #[error("parse error: {0}")]
  Parse(String),

  /// A page number past the end of the listing.
  #[error("Invalid page.")]
  InvalidPage,

  #[error("validation failed: {0}")]
  Validation(FieldErrors),
}

impl Error {
  pub fn permission_denied(message: impl Into<String>) -> Self {
    Self::PermissionDenied { message: message.into() }
  }

  /// The `error_code` reported alongside the message.
  pub fn code(&self) -> &'static str {
    match self {
      Self::PermissionDenied { .. } => PERMISSION_DENIED,
      Self::Parse(_) => "parse_error",
      Self::InvalidPage => "not_found",
      Self::Validation(_) => "validation_error",
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

// ─── Field errors ────────────────────────────────────────────────────────────

/// Per-field validation messages, serialised as `{"field": ["msg", ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
  pub fn new() -> Self { Self::default() }

  pub fn add(&mut self, field: &str, message: impl Into<String>) {
    self.0.entry(field.to_owned()).or_default().push(message.into());
  }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn get(&self, field: &str) -> Option<&[String]> {
    self.0.get(field).map(Vec::as_slice)
  }

  /// `Ok(())` when nothing was recorded, otherwise [`Error::Validation`].
  pub fn into_result(self) -> Result<()> {
    if self.is_empty() { Ok(()) } else { Err(Error::Validation(self)) }
  }
}

impl std::fmt::Display for FieldErrors {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let fields: Vec<&str> = self.0.keys().map(String::as_str).collect();
    write!(f, "invalid fields: {}", fields.join(", "))
  }
}
