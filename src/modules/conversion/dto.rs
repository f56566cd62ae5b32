use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConvertLocalVideoRequest {
    pub movie_id: Option<String>,
    /// Path of a staged file, as listed by `GET /api/movies/local-videos`.
    pub video_path: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversionStartedResponse {
    pub message: String,
    pub status: String,
    pub conversion_id: String,
    pub movie_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReencodeStartedResponse {
    pub message: String,
    pub status: String,
    pub video_source: String,
}
