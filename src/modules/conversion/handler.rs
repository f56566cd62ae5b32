use super::dto::{ConversionStartedResponse, ConvertLocalVideoRequest, ReencodeStartedResponse};
use super::model::ConversionJob;
use crate::common::error::{AppError, AppResult};
use crate::modules::movie::dto::LocalVideosResponse;
use crate::modules::movie::service::parse_movie_id;
use crate::state::AppState;
use crate::workers::transcoder::Transcoder;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

async fn start_local_conversion(state: AppState, req: ConvertLocalVideoRequest) -> AppResult<ConversionStartedResponse> {
    let (Some(movie_id), Some(video_path)) = (
        req.movie_id.filter(|s| !s.trim().is_empty()),
        req.video_path.filter(|s| !s.trim().is_empty()),
    ) else {
        return Err(AppError::Validation("movieId and videoPath are required".to_string()));
    };

    let movie_id = parse_movie_id(&movie_id)?;
    let job = Transcoder::from_state(&state).start_tracked(movie_id, &video_path).await?;

    Ok(ConversionStartedResponse {
        message: "Conversion started".to_string(),
        status: "processing".to_string(),
        conversion_id: job.id,
        movie_id,
    })
}

/// Convert a staged file into HD and SD renditions
#[utoipa::path(
    post,
    path = "/api/movies/convert-local-video",
    request_body = ConvertLocalVideoRequest,
    responses(
        (status = 202, description = "Conversion started", body = ConversionStartedResponse),
        (status = 400, description = "Missing movieId or videoPath"),
        (status = 404, description = "Movie or staged file not found")
    ),
    tag = "Conversion"
)]
pub async fn convert_local_video(
    State(state): State<AppState>,
    Json(req): Json<ConvertLocalVideoRequest>,
) -> impl IntoResponse {
    match start_local_conversion(state, req).await {
        Ok(res) => (StatusCode::ACCEPTED, Json(res)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Poll the state of a tracked conversion
#[utoipa::path(
    get,
    path = "/api/movies/conversion-status/{conversionId}",
    params(
        ("conversionId" = String, Path, description = "Conversion job ID")
    ),
    responses(
        (status = 200, description = "Job snapshot", body = ConversionJob),
        (status = 404, description = "Unknown or expired job")
    ),
    tag = "Conversion"
)]
pub async fn conversion_status(
    State(state): State<AppState>,
    Path(conversion_id): Path<String>,
) -> impl IntoResponse {
    match state.jobs.get(&conversion_id).await {
        Some(job) => (StatusCode::OK, Json(job)).into_response(),
        None => AppError::ConversionNotFound { conversion_id }.into_response(),
    }
}

/// Re-encode a title's source rendition
#[utoipa::path(
    post,
    path = "/api/movies/{id}/convert",
    params(
        ("id" = String, Path, description = "Movie ID")
    ),
    responses(
        (status = 202, description = "Re-encode started", body = ReencodeStartedResponse),
        (status = 404, description = "Movie, source rendition or file not found")
    ),
    tag = "Conversion",
    security(("bearer_auth" = []))
)]
pub async fn convert_movie(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    let result = match parse_movie_id(&id) {
        Ok(movie_id) => Transcoder::from_state(&state).start_strict(movie_id).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(video_source) => (
            StatusCode::ACCEPTED,
            Json(ReencodeStartedResponse {
                message: "Video conversion started".to_string(),
                status: "processing".to_string(),
                video_source,
            }),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// List staged files available for conversion
#[utoipa::path(
    get,
    path = "/api/movies/local-videos",
    responses(
        (status = 200, description = "Staged video files", body = LocalVideosResponse)
    ),
    tag = "Conversion"
)]
pub async fn list_local_videos(State(state): State<AppState>) -> impl IntoResponse {
    match state.media.list_staged_videos().await {
        Ok(videos) => (StatusCode::OK, Json(LocalVideosResponse { videos })).into_response(),
        Err(e) => AppError::from(e).into_response(),
    }
}
