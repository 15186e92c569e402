use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An authenticated user. Absence of an `Identity` means the session is a
/// guest: guests may read everything but cannot create, rate, comment or
/// delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    /// Role claims attached by the gateway adapter at sign-in. Privilege is
    /// an explicit claim, never derived from the email inside this crate.
    #[serde(default)]
    pub roles: Vec<String>,
}

impl Identity {
    pub const ADMIN_ROLE: &'static str = "admin";

    pub fn new(id: Uuid, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            roles: Vec::new(),
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }

    /// Whether this identity carries the global admin claim.
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| r == Self::ADMIN_ROLE)
    }
}
