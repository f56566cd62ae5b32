use super::model::{Quality, RenditionSet};
use super::service::{parse_movie_id, MovieService};
use crate::common::error::{AppError, AppResult};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderName, StatusCode},
    response::{IntoResponse, Response},
};
use axum_extra::headers::{HeaderMapExt, Range};
use serde::Deserialize;
use std::io::SeekFrom;
use std::ops::Bound;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;
use tracing::debug;
use utoipa::IntoParams;

pub const VIDEO_QUALITY_HEADER: HeaderName = HeaderName::from_static("x-video-quality");
pub const NO_STORE: &str = "no-store, no-cache, must-revalidate, proxy-revalidate, max-age=0";

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StreamQuery {
    /// `sd`, `hd` or `fhd` (`source` is accepted for `fhd`).
    pub quality: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteRange {
    /// Header absent, malformed or multi-range: serve the whole file.
    Full,
    /// Inclusive byte span.
    Partial { start: u64, end: u64 },
    Unsatisfiable,
}

/// Reads the request's `Range` header against a file of `size` bytes.
pub fn requested_range(headers: &HeaderMap, size: u64) -> ByteRange {
    headers
        .typed_get::<Range>()
        .map_or(ByteRange::Full, |range| byte_range(&range, size))
}

fn byte_range(range: &Range, size: u64) -> ByteRange {
    let mut specs = range.satisfiable_ranges(size);
    let (Some((start, end)), None) = (specs.next(), specs.next()) else {
        return ByteRange::Full;
    };

    // Suffix specs arrive already rebased onto `size`.
    let Bound::Included(start) = start else {
        return ByteRange::Full;
    };
    let last = match end {
        Bound::Included(end) if end < start => return ByteRange::Full,
        Bound::Included(end) => Some(end),
        Bound::Excluded(end) if end <= start => return ByteRange::Full,
        Bound::Excluded(end) => Some(end - 1),
        Bound::Unbounded => None,
    };
    if start >= size {
        return ByteRange::Unsatisfiable;
    }

    ByteRange::Partial {
        start,
        end: last.map_or(size - 1, |e| e.min(size - 1)),
    }
}

/// Picks the requested rendition (HD when none is named), falling back to the source.
pub fn select_rendition(videos: &RenditionSet, requested: Option<&str>) -> Option<(Quality, String)> {
    let wanted = requested.map_or(Some(Quality::Hd), Quality::parse);
    wanted
        .and_then(|q| videos.get(q).map(|path| (q, path.to_string())))
        .or_else(|| videos.get(Quality::Source).map(|path| (Quality::Source, path.to_string())))
}

pub fn content_type_for(path: &str) -> &'static str {
    let ext = std::path::Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("webm") => "video/webm",
        Some("mkv") => "video/x-matroska",
        Some("avi") => "video/x-msvideo",
        Some("mov") => "video/quicktime",
        Some("wmv") => "video/x-ms-wmv",
        Some("flv") => "video/x-flv",
        _ => "video/mp4",
    }
}

/// Stream video content with support for Range requests
#[utoipa::path(
    get,
    path = "/api/movies/{id}/stream",
    params(
        ("id" = String, Path, description = "Movie ID"),
        StreamQuery
    ),
    responses(
        (status = 200, description = "Full content"),
        (status = 206, description = "Partial content"),
        (status = 404, description = "Movie, rendition or file not found"),
        (status = 416, description = "Range not satisfiable")
    ),
    tag = "Movies"
)]
pub async fn stream_movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<StreamQuery>,
    headers: HeaderMap,
) -> Response {
    match serve(&state, &id, query.quality.as_deref(), &headers).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}

async fn serve(state: &AppState, id: &str, requested: Option<&str>, headers: &HeaderMap) -> AppResult<Response> {
    let movie_id = parse_movie_id(id)?;
    let movie = MovieService::find_movie(state, movie_id).await?;

    let Some((quality, stored)) = select_rendition(&movie.videos, requested) else {
        return Err(AppError::VideoNotFound {
            movie_id: id.to_string(),
            requested_quality: requested.unwrap_or(Quality::Hd.as_str()).to_string(),
            available_qualities: movie.videos.available(),
        });
    };

    let not_found = || AppError::FileNotFound {
        movie_id: id.to_string(),
        video_path: stored.clone(),
    };
    let path = state.media.resolve(&stored).ok_or_else(not_found)?;
    let metadata = match tokio::fs::metadata(&path).await {
        Ok(m) if m.is_file() => m,
        Ok(_) => return Err(not_found()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(not_found()),
        Err(e) => return Err(e.into()),
    };
    let size = metadata.len();

    let range = requested_range(headers, size);

    let mut file = tokio::fs::File::open(&path).await?;
    let builder = Response::builder()
        .header(header::CONTENT_TYPE, content_type_for(&stored))
        .header(header::ACCEPT_RANGES, "bytes")
        .header(VIDEO_QUALITY_HEADER, quality.as_str());

    let response = match range {
        ByteRange::Unsatisfiable => return Err(AppError::RangeNotSatisfiable { size }),
        ByteRange::Full => {
            debug!("Streaming {} ({} bytes) for movie {}", stored, size, movie_id);
            builder
                .status(StatusCode::OK)
                .header(header::CONTENT_LENGTH, size)
                .body(Body::from_stream(ReaderStream::new(file)))
        }
        ByteRange::Partial { start, end } => {
            let length = end - start + 1;
            debug!("Streaming {} bytes {}-{}/{} for movie {}", stored, start, end, size, movie_id);
            file.seek(SeekFrom::Start(start)).await?;
            builder
                .status(StatusCode::PARTIAL_CONTENT)
                .header(header::CONTENT_RANGE, format!("bytes {}-{}/{}", start, end, size))
                .header(header::CONTENT_LENGTH, length)
                .body(Body::from_stream(ReaderStream::new(file.take(length))))
        }
    };

    response.map_err(|e| AppError::Internal(e.into()))
}
