use axum::{extract::State, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;

use crate::auth::{AuthUser, OptionalAuthUser, SESSION_COOKIE};
use crate::error::Result;
use crate::models::{AuthSession, Credentials, UserResponse};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session: Option<AuthSession>,
}

pub(crate) fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

pub(crate) fn cleared_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .max_age(time::Duration::seconds(0))
        .build()
}

pub async fn signup(
    State(state): State<AppState>,
    Json(input): Json<Credentials>,
) -> Result<Json<UserResponse>> {
    let user = state.identity.sign_up(&input.email, &input.password).await?;
    Ok(Json(user.into()))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(input): Json<Credentials>,
) -> Result<(CookieJar, Json<AuthSession>)> {
    let session = state
        .identity
        .sign_in_with_password(&input.email, &input.password)
        .await?;

    let jar = jar.add(session_cookie(session.token.clone()));
    Ok((jar, Json(session)))
}

pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    auth: AuthUser,
) -> Result<CookieJar> {
    state.identity.sign_out(&auth.session.token).await?;
    Ok(jar.add(cleared_session_cookie()))
}

pub async fn current_session(auth: OptionalAuthUser) -> Json<SessionResponse> {
    Json(SessionResponse {
        session: auth.0.map(|a| a.session),
    })
}

pub async fn current_user(auth: AuthUser) -> Json<UserResponse> {
    Json(auth.session.user)
}
