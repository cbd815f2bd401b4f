use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::AuthSession;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "session";

pub struct AuthUser {
    pub session: AuthSession,
}

impl AuthUser {
    pub fn user_id(&self) -> Uuid {
        self.session.user.id
    }

    pub fn email(&self) -> &str {
        &self.session.user.email
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let cookies = CookieJar::from_headers(&parts.headers);

        let token = cookies
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(AppError::Unauthorized)?;

        match state.identity.get_session(&token).await? {
            Some(session) => Ok(AuthUser { session }),
            None => Err(AppError::Unauthorized),
        }
    }
}

pub struct OptionalAuthUser(pub Option<AuthUser>);

impl<S> FromRequestParts<S> for OptionalAuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match AuthUser::from_request_parts(parts, state).await {
            Ok(user) => Ok(OptionalAuthUser(Some(user))),
            Err(AppError::Unauthorized) => Ok(OptionalAuthUser(None)),
            Err(e) => Err(e),
        }
    }
}
