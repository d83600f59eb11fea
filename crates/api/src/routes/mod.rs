pub mod analytics;
pub mod auth;
pub mod calendar;
pub mod content;
pub mod health;
pub mod overview;
pub mod products;
pub mod settings;

use axum::{middleware::from_fn_with_state, Router};

use crate::middleware::session::require_session;
use crate::state::AppState;

/// Assemble the full router. Everything but health, ping and login/logout
/// requires a live session.
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .merge(auth::session_routes())
        .merge(overview::routes())
        .merge(products::routes())
        .merge(content::routes())
        .merge(calendar::routes())
        .merge(analytics::routes())
        .merge(settings::routes())
        .route_layer(from_fn_with_state(state.clone(), require_session));

    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(protected)
        .with_state(state)
}
