/**
 * Server Initialization
 *
 * Builds the Axum router for the dev server.
 */

use crate::backend::routes::health::health;
use crate::backend::server::state::AppState;
use crate::shared::config::DEFAULT_HEALTH_PATH;
use axum::routing::get;
use axum::Router;

/// Create and configure the Axum application
pub fn create_app() -> Router<()> {
    create_app_with_state(AppState::new())
}

pub fn create_app_with_state(state: AppState) -> Router<()> {
    tracing::info!("Initializing StudyMate dev server");
    Router::new()
        .route(DEFAULT_HEALTH_PATH, get(health))
        .with_state(state)
}
