use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Movie not found")]
    MovieNotFound { movie_id: String },

    #[error("No playable video found for this movie")]
    VideoNotFound {
        movie_id: String,
        requested_quality: String,
        available_qualities: Vec<&'static str>,
    },

    #[error("Video file not found on server")]
    FileNotFound { movie_id: String, video_path: String },

    #[error("Conversion job not found")]
    ConversionNotFound { conversion_id: String },

    #[error("User not found")]
    UserNotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Invalid file type. Only MP4, AVI, MOV and MKV are supported")]
    InvalidFileType { content_type: String },

    #[error("File exceeds the upload limit of {} MiB", .limit_bytes / (1024 * 1024))]
    FileTooLarge { limit_bytes: u64 },

    #[error("Requested range not satisfiable")]
    RangeNotSatisfiable { size: u64 },

    #[error("{0}")]
    Unauthorized(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Access denied. Admin role required")]
    Forbidden,

    #[error("{0}")]
    Conflict(String),

    #[error("Database error")]
    Store(#[source] anyhow::Error),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("Internal server error")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::MovieNotFound { .. } => "MOVIE_NOT_FOUND",
            AppError::VideoNotFound { .. } => "VIDEO_NOT_FOUND",
            AppError::FileNotFound { .. } => "FILE_NOT_FOUND",
            AppError::ConversionNotFound { .. } => "CONVERSION_NOT_FOUND",
            AppError::UserNotFound => "USER_NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::InvalidFileType { .. } => "INVALID_FILE_TYPE",
            AppError::FileTooLarge { .. } => "FILE_TOO_LARGE",
            AppError::RangeNotSatisfiable { .. } => "RANGE_NOT_SATISFIABLE",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::TokenExpired => "TOKEN_EXPIRED",
            AppError::Forbidden => "FORBIDDEN",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Store(_) => "DATABASE_ERROR",
            AppError::Internal(_) | AppError::Io(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MovieNotFound { .. }
            | AppError::VideoNotFound { .. }
            | AppError::FileNotFound { .. }
            | AppError::ConversionNotFound { .. }
            | AppError::UserNotFound => StatusCode::NOT_FOUND,
            AppError::Validation(_)
            | AppError::InvalidFileType { .. }
            | AppError::FileTooLarge { .. } => StatusCode::BAD_REQUEST,
            AppError::RangeNotSatisfiable { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
            AppError::Unauthorized(_) | AppError::TokenExpired => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::Store(_) | AppError::Internal(_) | AppError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn context(&self) -> Map<String, Value> {
        let mut ctx = Map::new();
        match self {
            AppError::MovieNotFound { movie_id } => {
                ctx.insert("movieId".into(), json!(movie_id));
            }
            AppError::VideoNotFound {
                movie_id,
                requested_quality,
                available_qualities,
            } => {
                ctx.insert("movieId".into(), json!(movie_id));
                ctx.insert("requestedQuality".into(), json!(requested_quality));
                ctx.insert("availableQualities".into(), json!(available_qualities));
            }
            AppError::FileNotFound { movie_id, video_path } => {
                ctx.insert("movieId".into(), json!(movie_id));
                ctx.insert("videoPath".into(), json!(video_path));
            }
            AppError::ConversionNotFound { conversion_id } => {
                ctx.insert("conversionId".into(), json!(conversion_id));
            }
            AppError::InvalidFileType { content_type } => {
                ctx.insert("contentType".into(), json!(content_type));
            }
            AppError::FileTooLarge { limit_bytes } => {
                ctx.insert("limitBytes".into(), json!(limit_bytes));
            }
            AppError::TokenExpired => {
                ctx.insert("expired".into(), json!(true));
            }
            _ => {}
        }
        ctx
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Store(e) => error!("store failure: {:#}", e),
            AppError::Internal(e) => error!("internal failure: {:#}", e),
            AppError::Io(e) => error!("io failure: {}", e),
            _ => {}
        }

        let status = self.status();
        let mut body = Map::new();
        body.insert("status".into(), json!("error"));
        body.insert("message".into(), json!(self.to_string()));
        body.insert("error".into(), json!(self.code()));
        body.extend(self.context());

        let mut response = (status, Json(Value::Object(body))).into_response();
        if let AppError::RangeNotSatisfiable { size } = self {
            if let Ok(value) = HeaderValue::from_str(&format!("bytes */{}", size)) {
                response.headers_mut().insert(header::CONTENT_RANGE, value);
            }
        }
        response
    }
}
