use crate::middleware::{auth::auth_middleware, role::admin_guard};
use crate::state::AppState;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;

pub mod dto;
pub mod encoder;
pub mod handler;
pub mod model;
pub mod registry;

/// Conversion routes, mounted alongside the movie routes.
pub fn router(state: AppState) -> Router<AppState> {
    let public_routes = Router::new()
        .route("/local-videos", get(handler::list_local_videos))
        .route("/convert-local-video", post(handler::convert_local_video))
        .route("/conversion-status/{conversion_id}", get(handler::conversion_status));

    let admin_routes = Router::new()
        .route("/{id}/convert", post(handler::convert_movie))
        .route_layer(middleware::from_fn(admin_guard))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    public_routes.merge(admin_routes)
}
