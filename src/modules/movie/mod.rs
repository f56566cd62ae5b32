use crate::middleware::{auth::auth_middleware, role::admin_guard};
use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderName, HeaderValue};
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;

pub mod dto;
pub mod handler;
pub mod model;
pub mod repository;
pub mod service;
pub mod stream_handler;

const MULTIPART_OVERHEAD: u64 = 1024 * 1024;

pub fn router(state: AppState) -> Router<AppState> {
    let no_store = ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static(stream_handler::NO_STORE),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::PRAGMA,
            HeaderValue::from_static("no-cache"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::EXPIRES,
            HeaderValue::from_static("0"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("surrogate-control"),
            HeaderValue::from_static("no-store"),
        ));

    let body_limit = usize::try_from(state.config.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD))
        .unwrap_or(usize::MAX);
    let upload_limits = ServiceBuilder::new()
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit));

    let public_routes = Router::new()
        .route("/", get(handler::list_movies))
        .route("/category/{type}", get(handler::list_by_category))
        .route("/{id}", get(handler::get_movie))
        .route("/{id}/stream", get(stream_handler::stream_movie).layer(no_store));

    let protected_routes = Router::new()
        .route("/", post(handler::create_movie))
        .route(
            "/{id}",
            axum::routing::patch(handler::update_movie).delete(handler::delete_movie),
        )
        .route(
            "/{id}/upload",
            post(handler::upload_movie_video).layer(upload_limits),
        )
        .route_layer(middleware::from_fn(admin_guard))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    public_routes.merge(protected_routes)
}
