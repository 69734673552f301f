//! Principal: the actor making a request.

use uuid::Uuid;

/// The current requester. Anonymous principals carry no identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Principal {
  #[default]
  Anonymous,
  Authenticated { user_id: Uuid },
}

impl Principal {
  pub fn authenticated(user_id: Uuid) -> Self { Self::Authenticated { user_id } }

  pub fn user_id(&self) -> Option<Uuid> {
    match self {
      Self::Anonymous => None,
      Self::Authenticated { user_id } => Some(*user_id),
    }
  }
}
