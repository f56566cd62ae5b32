use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistAddResponse {
    pub message: String,
    pub success: bool,
    pub movie_id: String,
    pub movie_title: String,
    pub watchlist_size: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistRemoveResponse {
    pub message: String,
    pub success: bool,
    pub movie_id: String,
    pub removed: bool,
    pub watchlist_size: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WatchlistClearResponse {
    pub message: String,
    pub success: bool,
}
