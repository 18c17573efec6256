use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod password;
pub mod repo;
pub mod repo_types;
pub mod services;
pub mod session;

/// Login, signup and static auth views.
pub fn public_router() -> Router<AppState> {
    handlers::public_routes()
}

/// Landing page and logout; mounted behind the session gate.
pub fn router() -> Router<AppState> {
    handlers::protected_routes()
}
