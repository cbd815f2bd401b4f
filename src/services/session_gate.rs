//! Tracks one client's authentication state.
//!
//! A gate is mounted with an optional session token: it resolves the session
//! once, then follows the identity event stream until it is unmounted or
//! dropped, which releases the subscription.

use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::error::Result;
use crate::models::{AuthEvent, AuthEventKind, AuthSession};
use crate::services::identity::IdentityService;

/// What the gate lets a client see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateView {
    Dashboard,
    CredentialForm,
}

impl GateView {
    pub fn for_session(session: Option<&AuthSession>) -> Self {
        match session {
            Some(_) => GateView::Dashboard,
            None => GateView::CredentialForm,
        }
    }
}

/// Result of a credential form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Succeeded(String),
    Failed(String),
}

impl AuthOutcome {
    pub fn message(&self) -> &str {
        match self {
            AuthOutcome::Succeeded(msg) | AuthOutcome::Failed(msg) => msg,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AuthOutcome::Succeeded(_))
    }
}

pub struct SessionGate {
    identity: IdentityService,
    current: Arc<RwLock<Option<AuthSession>>>,
    listener: Option<JoinHandle<()>>,
}

impl SessionGate {
    pub async fn mount(identity: IdentityService, token: Option<&str>) -> Result<Self> {
        // Subscribe before the initial lookup so a sign-out in between is not missed.
        let mut subscription = identity.on_auth_state_change();

        let initial = match token {
            Some(token) => identity.get_session(token).await?,
            None => None,
        };

        let current = Arc::new(RwLock::new(initial));
        let held = current.clone();
        let listener = tokio::spawn(async move {
            while let Some(event) = subscription.next().await {
                apply_event(&held, &event).await;
            }
        });

        Ok(Self {
            identity,
            current,
            listener: Some(listener),
        })
    }

    pub async fn current(&self) -> Option<AuthSession> {
        self.current.read().await.clone()
    }

    pub async fn view(&self) -> GateView {
        GateView::for_session(self.current.read().await.as_ref())
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> AuthOutcome {
        match self.identity.sign_in_with_password(email, password).await {
            Ok(session) => {
                *self.current.write().await = Some(session);
                AuthOutcome::Succeeded("Signed in".to_string())
            }
            Err(e) => AuthOutcome::Failed(e.user_message()),
        }
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> AuthOutcome {
        match self.identity.sign_up(email, password).await {
            Ok(_) => AuthOutcome::Succeeded("Account created. You can sign in now.".to_string()),
            Err(e) => AuthOutcome::Failed(e.user_message()),
        }
    }

    pub async fn sign_out(&self) -> Result<()> {
        let held = self.current.write().await.take();
        if let Some(session) = held {
            self.identity.sign_out(&session.token).await?;
        }
        Ok(())
    }

    /// Stops following auth events and waits until the subscription is released.
    pub async fn unmount(mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
            let _ = listener.await;
        }
    }
}

impl Drop for SessionGate {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
    }
}

async fn apply_event(current: &RwLock<Option<AuthSession>>, event: &AuthEvent) {
    if event.kind != AuthEventKind::SignedOut {
        return;
    }

    let mut held = current.write().await;
    if held.as_ref().map(|s| s.session_id) == Some(event.session_id) {
        tracing::debug!(session_id = %event.session_id, "Held session signed out elsewhere");
        *held = None;
    }
}
