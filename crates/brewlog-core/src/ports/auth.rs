use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::domain::Identity;
use crate::error::GatewayError;

/// Email/password credentials.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Session-based authentication port.
///
/// Besides the request/response calls, the gateway exposes a broadcast feed
/// of session changes (`Some(identity)` on sign-in, `None` on sign-out)
/// that [`crate::session::SessionState`] subscribes to for the process
/// lifetime.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn sign_in(&self, credentials: &Credentials) -> Result<Identity, GatewayError>;

    /// Create an account. Returns `None` when the account exists but still
    /// awaits email confirmation; confirmation itself is the gateway's
    /// concern.
    async fn sign_up(&self, credentials: &Credentials) -> Result<Option<Identity>, GatewayError>;

    async fn sign_out(&self) -> Result<(), GatewayError>;

    /// Subscribe to session changes.
    fn subscribe(&self) -> broadcast::Receiver<Option<Identity>>;
}
