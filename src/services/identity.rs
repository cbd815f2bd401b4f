//! Identity provider: accounts, password sign-in, sessions and the auth event stream.

use tokio::sync::broadcast::{self, error::RecvError};
use uuid::Uuid;

use crate::auth::{generate_token, hash_password, hash_token, verify_password};
use crate::error::{AppError, Result};
use crate::models::{AuthEvent, AuthEventKind, AuthSession, Session, User};
use crate::repo::{session::SessionRepository, user::UserRepository};

const MIN_PASSWORD_LENGTH: usize = 6;
const EVENT_BUFFER: usize = 64;

#[derive(Clone)]
pub struct IdentityService {
    users: UserRepository,
    sessions: SessionRepository,
    events: broadcast::Sender<AuthEvent>,
}

impl IdentityService {
    pub fn new(users: UserRepository, sessions: SessionRepository) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            users,
            sessions,
            events,
        }
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<User> {
        let email = normalize_email(email);

        if !email.contains('@') {
            return Err(AppError::Auth(
                "Unable to validate email address: invalid format".to_string(),
            ));
        }

        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AppError::Auth(format!(
                "Password should be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }

        if self.users.email_exists(&email).await? {
            return Err(AppError::Auth("User already registered".to_string()));
        }

        let password_hash = hash_password(password)?;
        let user = self
            .users
            .create(Uuid::new_v4(), &email, &password_hash)
            .await?;

        tracing::info!(user_id = %user.id, "User signed up");
        Ok(user)
    }

    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession> {
        let invalid = || AppError::Auth("Invalid login credentials".to_string());

        let user = self
            .users
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or_else(invalid)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(invalid());
        }

        let token = generate_token();
        let session = self.sessions.create(user.id, &hash_token(&token)).await?;

        self.publish(AuthEventKind::SignedIn, &session);
        Ok(to_auth_session(session, token, user))
    }

    /// Signing out an unknown or expired token is not an error.
    pub async fn sign_out(&self, token: &str) -> Result<()> {
        if let Some(session) = self.sessions.delete_by_token_hash(&hash_token(token)).await? {
            self.publish(AuthEventKind::SignedOut, &session);
        }
        Ok(())
    }

    pub async fn get_session(&self, token: &str) -> Result<Option<AuthSession>> {
        let Some(session) = self.sessions.find_by_token_hash(&hash_token(token)).await? else {
            return Ok(None);
        };

        let user = self.users.find_by_id(session.user_id).await?;
        Ok(user.map(|user| to_auth_session(session, token.to_string(), user)))
    }

    pub async fn get_user(&self, token: &str) -> Result<Option<User>> {
        let Some(session) = self.sessions.find_by_token_hash(&hash_token(token)).await? else {
            return Ok(None);
        };

        self.users.find_by_id(session.user_id).await
    }

    pub fn on_auth_state_change(&self) -> AuthSubscription {
        AuthSubscription {
            receiver: self.events.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }

    pub async fn purge_expired_sessions(&self) -> Result<u64> {
        self.sessions.delete_expired().await
    }

    fn publish(&self, kind: AuthEventKind, session: &Session) {
        let event = AuthEvent {
            kind,
            session_id: session.id,
            user_id: session.user_id,
        };
        // No live subscribers is fine.
        let _ = self.events.send(event);
    }
}

/// Live subscription to auth state changes. Dropping it unsubscribes.
pub struct AuthSubscription {
    receiver: broadcast::Receiver<AuthEvent>,
}

impl AuthSubscription {
    /// Next event, or `None` once the identity service is gone.
    pub async fn next(&mut self) -> Option<AuthEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Auth subscriber lagged behind");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn to_auth_session(session: Session, token: String, user: User) -> AuthSession {
    AuthSession {
        session_id: session.id,
        token,
        user: user.into(),
        expires_at: session.expires_at,
    }
}
