//! Route modules.

pub mod health;
pub mod search;

use axum::Router;

use crate::state::AppState;

/// The full application router, without transport layers.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(search::router())
        .with_state(state)
}
