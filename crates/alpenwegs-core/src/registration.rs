//! Registration input and its validation rules.
//!
//! Uniqueness, hashing, and persistence happen in the API layer; this module
//! only checks what can be decided from the input alone.

use serde::Deserialize;

use crate::{FieldErrors, Result};

/// Every newly registered account joins this group.
pub const DEFAULT_GROUP: &str = "Members";

pub const USERNAME_MAX_LEN: usize = 150;
pub const PASSWORD_MIN_LEN: usize = 8;

/// Body accepted by the registration endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
  pub username:   String,
  pub email:      String,
  pub password1:  String,
  pub password2:  String,
  #[serde(default)]
  pub first_name: Option<String>,
  #[serde(default)]
  pub last_name:  Option<String>,
}

impl Registration {
  /// Check every field, collecting all failures into one
  /// [`Error::Validation`](crate::Error::Validation).
  pub fn validate(&self) -> Result<()> {
    let mut errors = FieldErrors::new();

    let username = self.username.trim();
    if username.is_empty() {
      errors.add("username", "This field may not be blank.");
    } else if username.chars().count() > USERNAME_MAX_LEN {
      errors.add(
        "username",
        format!("Ensure this field has no more than {USERNAME_MAX_LEN} characters."),
      );
    } else if !username.chars().all(is_username_char) {
      errors.add(
        "username",
        "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
      );
    }

    if self.email.trim().is_empty() {
      errors.add("email", "This field may not be blank.");
    } else if !is_plausible_email(self.email.trim()) {
      errors.add("email", "Enter a valid email address.");
    }

    if self.password1.chars().count() < PASSWORD_MIN_LEN {
      errors.add(
        "password1",
        format!("This password is too short. It must contain at least {PASSWORD_MIN_LEN} characters."),
      );
    }
    if !self.password1.is_empty() && self.password1.chars().all(|c| c.is_ascii_digit()) {
      errors.add("password1", "This password is entirely numeric.");
    }
    if self.password1 != self.password2 {
      errors.add("non_field_errors", "The two password fields didn't match.");
    }

    errors.into_result()
  }
}

fn is_username_char(c: char) -> bool {
  c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_')
}

fn is_plausible_email(email: &str) -> bool {
  let Some((local, domain)) = email.split_once('@') else {
    return false;
  };
  !local.is_empty()
    && !domain.contains('@')
    && !email.contains(char::is_whitespace)
    && domain.contains('.')
    && domain.split('.').all(|label| !label.is_empty())
}
