use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

use shared::{
    error::ClientError,
    protocol::{AuthRequest, AuthResponse},
};
use storage::SessionStore;

use crate::gateway::ApiGateway;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    Authenticating,
    Authenticated,
}

/// Navigation signals for whatever front end is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    NavigateHome,
    NavigateLogin,
}

/// Owns every mutation of the session store and the 401 teardown policy.
pub struct SessionController {
    gateway: Arc<ApiGateway>,
    store: SessionStore,
    state: Mutex<AuthState>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionController {
    pub fn new(gateway: Arc<ApiGateway>, store: SessionStore) -> Arc<Self> {
        let (events, _) = broadcast::channel(16);
        Arc::new(Self {
            gateway,
            store,
            state: Mutex::new(AuthState::Anonymous),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub async fn state(&self) -> AuthState {
        *self.state.lock().await
    }

    /// Startup path: a persisted token yields optimistic Authenticated
    /// without re-validating against the server. A stale token surfaces as
    /// a 401 on the first real request.
    pub async fn bootstrap(&self) -> AuthState {
        let session = self.store.load().await;
        let state = if session.is_authenticated() {
            AuthState::Authenticated
        } else {
            AuthState::Anonymous
        };
        *self.state.lock().await = state;
        state
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<()> {
        *self.state.lock().await = AuthState::Authenticating;

        let request = AuthRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response: Result<AuthResponse, ClientError> =
            self.gateway.post("/auth/login", &request).await;

        match response {
            Ok(auth) => {
                if let Err(err) = self.store.save(&auth.token, email).await {
                    *self.state.lock().await = AuthState::Anonymous;
                    return Err(err);
                }
                *self.state.lock().await = AuthState::Authenticated;
                let _ = self.events.send(SessionEvent::NavigateHome);
                info!("session established for {email}");
                Ok(())
            }
            Err(err) => {
                *self.state.lock().await = AuthState::Anonymous;
                Err(err.into())
            }
        }
    }

    /// Creates the account, then logs in with the same credentials. A login
    /// failure after successful creation surfaces as-is; the account is not
    /// rolled back server-side.
    pub async fn register(&self, email: &str, password: &str) -> Result<()> {
        let request = AuthRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.gateway.post_discard("/auth/register", &request).await?;
        self.login(email, password).await
    }

    /// User-initiated logout never appears to fail: remote revocation is
    /// best-effort, local teardown always proceeds.
    pub async fn logout(&self) -> Result<()> {
        let session = self.store.load().await;
        if session.is_authenticated() {
            if let Err(err) = self
                .gateway
                .post_discard("/auth/logout", &serde_json::json!({}))
                .await
            {
                warn!("remote token revocation failed, continuing local logout: {err}");
            }
        }
        self.teardown().await
    }

    /// Single policy point for session-invalidating responses: any 401
    /// observed by a caller routes through here, tearing the session down
    /// without a revocation call (the server already rejects the token).
    pub async fn guard<T>(&self, result: Result<T, ClientError>) -> Result<T, ClientError> {
        if let Err(err) = &result {
            if err.is_unauthorized() {
                warn!("server rejected bearer token, clearing session");
                if let Err(teardown_err) = self.teardown().await {
                    warn!("session teardown failed: {teardown_err}");
                }
            }
        }
        result
    }

    async fn teardown(&self) -> Result<()> {
        self.store.clear().await?;
        *self.state.lock().await = AuthState::Anonymous;
        let _ = self.events.send(SessionEvent::NavigateLogin);
        Ok(())
    }
}
