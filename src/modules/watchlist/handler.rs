use super::dto::{WatchlistAddResponse, WatchlistClearResponse, WatchlistRemoveResponse};
use super::service::WatchlistService;
use crate::modules::auth::dto::TokenClaims;
use crate::modules::movie::dto::MovieResponse;
use crate::state::AppState;
use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

#[utoipa::path(
    get,
    path = "/api/watchlist",
    responses(
        (status = 200, description = "Movies in the caller's watchlist, oldest first", body = Vec<MovieResponse>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Watchlist",
    security(("bearer_auth" = []))
)]
pub async fn get_watchlist(
    State(state): State<AppState>,
    Extension(claims): Extension<TokenClaims>,
) -> impl IntoResponse {
    match WatchlistService::list(state, claims.sub).await {
        Ok(res) => (StatusCode::OK, Json(res)).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/watchlist/add/{movieId}",
    params(
        ("movieId" = String, Path, description = "Movie ID")
    ),
    responses(
        (status = 200, description = "Movie added", body = WatchlistAddResponse),
        (status = 404, description = "Movie Not Found")
    ),
    tag = "Watchlist",
    security(("bearer_auth" = []))
)]
pub async fn add_to_watchlist(
    State(state): State<AppState>,
    Extension(claims): Extension<TokenClaims>,
    Path(movie_id): Path<String>,
) -> impl IntoResponse {
    match WatchlistService::add(state, claims.sub, movie_id).await {
        Ok(res) => (StatusCode::OK, Json(res)).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/watchlist/remove/{movieId}",
    params(
        ("movieId" = String, Path, description = "Movie ID")
    ),
    responses(
        (status = 200, description = "Removal result", body = WatchlistRemoveResponse)
    ),
    tag = "Watchlist",
    security(("bearer_auth" = []))
)]
pub async fn remove_from_watchlist(
    State(state): State<AppState>,
    Extension(claims): Extension<TokenClaims>,
    Path(movie_id): Path<String>,
) -> impl IntoResponse {
    match WatchlistService::remove(state, claims.sub, movie_id).await {
        Ok(res) => (StatusCode::OK, Json(res)).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    delete,
    path = "/api/watchlist/clear",
    responses(
        (status = 200, description = "Watchlist cleared", body = WatchlistClearResponse)
    ),
    tag = "Watchlist",
    security(("bearer_auth" = []))
)]
pub async fn clear_watchlist(
    State(state): State<AppState>,
    Extension(claims): Extension<TokenClaims>,
) -> impl IntoResponse {
    match WatchlistService::clear(state, claims.sub).await {
        Ok(res) => (StatusCode::OK, Json(res)).into_response(),
        Err(e) => e.into_response(),
    }
}
