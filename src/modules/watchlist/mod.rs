use crate::middleware::auth::auth_middleware;
use crate::state::AppState;
use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;

pub mod dto;
pub mod handler;
pub mod repository;
pub mod service;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handler::get_watchlist))
        .route("/add/{movie_id}", post(handler::add_to_watchlist))
        .route("/remove/{movie_id}", delete(handler::remove_from_watchlist))
        .route("/clear", delete(handler::clear_watchlist))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
