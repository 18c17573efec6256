use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use super::{
    repo_types::User,
    session::{SessionKeys, SESSION_COOKIE},
};
use crate::{app::internal, state::AppState};

/// Resolves the session cookie to a live user. Bad, expired or orphaned
/// tokens are simply "no user".
pub async fn current_user(state: &AppState, headers: &HeaderMap) -> anyhow::Result<Option<User>> {
    let jar = CookieJar::from_headers(headers);
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        return Ok(None);
    };
    let keys = SessionKeys::from_ref(state);
    let claims = match keys.verify(cookie.value()) {
        Ok(c) => c,
        Err(e) => {
            debug!(error = %e, "rejected session token");
            return Ok(None);
        }
    };
    state.users.find_by_id(claims.sub).await
}

/// Gate for every protected route: no session, no entry.
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    match current_user(&state, req.headers()).await {
        Ok(Some(user)) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Ok(None) => Redirect::to("/login").into_response(),
        Err(e) => internal(e).into_response(),
    }
}

/// The user attached by [`require_session`].
pub struct AuthUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<User>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| Redirect::to("/login"))
    }
}

/// Session user on public routes, if any.
pub struct MaybeUser(pub Option<User>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = current_user(state, &parts.headers).await.map_err(internal)?;
        Ok(MaybeUser(user))
    }
}
