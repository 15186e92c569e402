//! Session/identity state.

use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::domain::Identity;
use crate::error::GatewayError;
use crate::ports::{AuthGateway, Credentials};

/// The current authenticated identity, `None` for a guest session.
///
/// Sign-in sets the identity immediately from the response rather than
/// waiting for the gateway's session feed, so dependent state reacts
/// without a round trip; the feed (see [`SessionState::watch`]) keeps the
/// state aligned with session changes originating elsewhere (token expiry,
/// sign-out from another task).
pub struct SessionState {
    auth: Arc<dyn AuthGateway>,
    identity: RwLock<Option<Identity>>,
}

impl SessionState {
    pub fn new(auth: Arc<dyn AuthGateway>) -> Self {
        Self {
            auth,
            identity: RwLock::new(None),
        }
    }

    pub async fn identity(&self) -> Option<Identity> {
        self.identity.read().await.clone()
    }

    pub async fn is_signed_in(&self) -> bool {
        self.identity.read().await.is_some()
    }

    /// Whether the current identity carries the admin claim. Pure
    /// derivation from the identity alone.
    pub async fn is_admin(&self) -> bool {
        self.identity
            .read()
            .await
            .as_ref()
            .is_some_and(Identity::is_admin)
    }

    pub async fn sign_in(&self, credentials: &Credentials) -> Result<Identity, GatewayError> {
        let identity = self.auth.sign_in(credentials).await?;
        *self.identity.write().await = Some(identity.clone());
        tracing::info!(user = %identity.email, "signed in");
        Ok(identity)
    }

    /// Create an account. The identity may still be unconfirmed, in which
    /// case the session stays signed out until the feed delivers it.
    pub async fn sign_up(&self, credentials: &Credentials) -> Result<Option<Identity>, GatewayError> {
        let identity = self.auth.sign_up(credentials).await?;
        if let Some(identity) = &identity {
            *self.identity.write().await = Some(identity.clone());
            tracing::info!(user = %identity.email, "signed up");
        }
        Ok(identity)
    }

    /// Sign out. The local identity reverts to guest synchronously even if
    /// the remote call fails; the session is gone either way.
    pub async fn sign_out(&self) -> Result<(), GatewayError> {
        *self.identity.write().await = None;
        let result = self.auth.sign_out().await;
        tracing::info!("signed out");
        result
    }

    /// Subscribe to the gateway's session feed and mirror every change
    /// into this state. Call once; the returned guard aborts the watcher
    /// task when dropped.
    pub fn watch(self: &Arc<Self>) -> SessionWatch {
        let state = Arc::clone(self);
        let mut feed = self.auth.subscribe();

        let handle = tokio::spawn(async move {
            loop {
                match feed.recv().await {
                    Ok(change) => {
                        *state.identity.write().await = change;
                    }
                    Err(broadcast::error::RecvError::Lagged(count)) => {
                        tracing::warn!(lagged = count, "session feed lagged, resyncing");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::debug!("session feed closed");
                        break;
                    }
                }
            }
        });

        SessionWatch { handle }
    }
}

/// Guard for the session feed watcher; dropping it unsubscribes.
pub struct SessionWatch {
    handle: JoinHandle<()>,
}

impl Drop for SessionWatch {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
