use crate::docs::ApiDoc;
use crate::state::AppState;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;

pub fn configure_routes(state: AppState) -> Router<AppState> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let movies = crate::modules::movie::router(state.clone())
        .merge(crate::modules::conversion::router(state.clone()));

    Router::new()
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .route("/api", get(api_root))
        .nest("/api/auth", crate::modules::auth::router(state.clone()))
        .nest("/api/movies", movies)
        .nest("/api/watchlist", crate::modules::watchlist::router(state))
        .fallback(not_found)
        .layer(cors)
}

async fn api_root() -> impl IntoResponse {
    Json(json!({ "message": "VOD catalog API is running" }))
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "message": "Route not found" })))
}
