pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;

use crate::state::AppState;
use axum::Router;

/// Entry routes that require a signed-in user.
pub fn router() -> Router<AppState> {
    handlers::protected_routes()
}

pub fn public_router() -> Router<AppState> {
    handlers::public_routes()
}
