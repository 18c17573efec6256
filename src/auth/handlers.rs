use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, instrument, warn};

use crate::{
    app::internal,
    auth::{
        dto::{LoginForm, SignupForm},
        extractors::{AuthUser, MaybeUser},
        services::{authenticate, signup},
        session::SessionKeys,
    },
    flash::{self, Flash},
    state::AppState,
    views::{self, AuthPage, AuthTab},
};

const LOGIN_FAILED: &str = "Please check your login details and try again.";

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/login", get(login_page).post(login))
        .route("/signup", post(signup_post))
        .route("/forgot_password", get(forgot_password))
}

pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/home", get(landing))
        .route("/logout", get(logout))
}

pub async fn root(MaybeUser(user): MaybeUser) -> Redirect {
    match user {
        Some(_) => Redirect::to("/home"),
        None => Redirect::to("/login"),
    }
}

pub async fn login_page(MaybeUser(user): MaybeUser, jar: CookieJar) -> Response {
    if user.is_some() {
        return Redirect::to("/home").into_response();
    }
    let (jar, flashes) = flash::take(jar);
    (jar, views::auth_page(&AuthPage::default(), &flashes)).into_response()
}

#[instrument(skip_all, fields(username = %payload.username))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(payload): Form<LoginForm>,
) -> Result<Response, (StatusCode, String)> {
    let user = authenticate(state.users.as_ref(), &payload.username, &payload.password)
        .await
        .map_err(internal)?;

    let Some(user) = user else {
        let page = AuthPage {
            active_tab: AuthTab::Login,
            login_error: Some(LOGIN_FAILED),
            ..Default::default()
        };
        return Ok(views::auth_page(&page, &[]).into_response());
    };

    let keys = SessionKeys::from_ref(&state);
    let token = keys.sign(user.id).map_err(internal)?;
    info!(user_id = user.id, "user logged in");
    Ok((jar.add(keys.cookie(token)), Redirect::to("/home")).into_response())
}

#[instrument(skip_all, fields(username = %payload.username))]
pub async fn signup_post(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(payload): Form<SignupForm>,
) -> Result<Response, (StatusCode, String)> {
    match signup(state.users.as_ref(), &payload).await {
        Ok(_) => {
            let jar = flash::push(jar, Flash::success("Signup successful! Please login."));
            Ok((jar, Redirect::to("/login")).into_response())
        }
        Err(e) if e.is_rejection() => {
            warn!(reason = %e, "signup rejected");
            let reason = e.to_string();
            let page = AuthPage {
                active_tab: AuthTab::Signup,
                signup_error: Some(&reason),
                ..Default::default()
            };
            Ok(views::auth_page(&page, &[]).into_response())
        }
        Err(e) => Err(internal(e.into())),
    }
}

pub async fn logout(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    info!(user_id = user.id, "user logged out");
    let keys = SessionKeys::from_ref(&state);
    (jar.remove(keys.removal()), Redirect::to("/login"))
}

pub async fn landing(AuthUser(user): AuthUser) -> Html<String> {
    views::home(&user.username)
}

pub async fn forgot_password() -> Html<String> {
    views::forgot_password()
}
