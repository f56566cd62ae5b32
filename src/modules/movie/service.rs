use super::dto::{CreateMovieRequest, MovieResponse, UpdateMovieRequest};
use super::model::{Movie, Quality};
use crate::common::error::{AppError, AppResult};
use crate::common::upload::{
    partial_path, remove_quietly, stored_extension, stream_to_disk, validate_video_mime,
};
use crate::state::AppState;
use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

/// Malformed ids are reported the same way as unknown ones.
pub fn parse_movie_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::MovieNotFound {
        movie_id: raw.to_string(),
    })
}

pub(crate) fn validation_message(errors: &validator::ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(msg) => msg.to_string(),
                None => format!("{} is invalid", field),
            })
        })
        .collect();
    messages.sort();
    messages.join(", ")
}

fn multipart_error(err: MultipartError, limit: u64) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::FileTooLarge { limit_bytes: limit }
    } else {
        AppError::Validation(format!("Malformed multipart body: {}", err.body_text()))
    }
}

pub struct MovieService;

impl MovieService {
    pub async fn find_movie(state: &AppState, movie_id: Uuid) -> AppResult<Movie> {
        state
            .catalog
            .find(movie_id)
            .await
            .map_err(AppError::Store)?
            .ok_or_else(|| AppError::MovieNotFound {
                movie_id: movie_id.to_string(),
            })
    }

    pub async fn list_movies(state: AppState) -> AppResult<Vec<MovieResponse>> {
        let movies = state.catalog.list().await.map_err(AppError::Store)?;
        Ok(movies.into_iter().map(MovieResponse::from).collect())
    }

    pub async fn list_by_category(state: AppState, category: String) -> AppResult<Vec<MovieResponse>> {
        let movies = state
            .catalog
            .list_by_category(&category)
            .await
            .map_err(AppError::Store)?;
        Ok(movies.into_iter().map(MovieResponse::from).collect())
    }

    pub async fn get_movie(state: AppState, id: String) -> AppResult<MovieResponse> {
        let movie_id = parse_movie_id(&id)?;
        Self::find_movie(&state, movie_id).await.map(MovieResponse::from)
    }

    pub async fn create_movie(state: AppState, req: CreateMovieRequest) -> AppResult<MovieResponse> {
        req.validate()
            .map_err(|e| AppError::Validation(validation_message(&e)))?;

        let movie = state
            .catalog
            .create(req.into_movie())
            .await
            .map_err(AppError::Store)?;
        info!("🎞️ Movie created: {} ({})", movie.title, movie.id);
        Ok(movie.into())
    }

    pub async fn update_movie(state: AppState, id: String, req: UpdateMovieRequest) -> AppResult<MovieResponse> {
        req.validate()
            .map_err(|e| AppError::Validation(validation_message(&e)))?;

        let movie_id = parse_movie_id(&id)?;
        let mut movie = Self::find_movie(&state, movie_id).await?;
        req.apply_to(&mut movie);

        let saved = state.catalog.save(&movie).await.map_err(AppError::Store)?;
        Ok(saved.into())
    }

    pub async fn delete_movie(state: AppState, id: String) -> AppResult<()> {
        let movie_id = parse_movie_id(&id)?;
        let deleted = state.catalog.delete(movie_id).await.map_err(AppError::Store)?;
        if !deleted {
            return Err(AppError::MovieNotFound { movie_id: id });
        }
        info!("🗑️ Movie deleted: {}", movie_id);
        Ok(())
    }

    /// Streams the `video` field to disk and records it as the source rendition.
    ///
    /// Nothing is written for an unknown movie. Bytes land in a `.part` sibling
    /// that replaces the stored source only once the record has been updated,
    /// so a failed upload leaves the previous source untouched.
    pub async fn upload_video(state: AppState, id: String, mut multipart: Multipart) -> AppResult<MovieResponse> {
        let movie_id = parse_movie_id(&id)?;
        Self::find_movie(&state, movie_id).await?;

        let limit = state.config.max_upload_bytes;
        let mut stored = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| multipart_error(e, limit))?
        {
            if field.name() != Some("video") {
                continue;
            }

            let content_type = field.content_type().unwrap_or_default().to_string();
            validate_video_mime(&content_type)?;

            let extension = stored_extension(field.file_name(), &content_type);
            let target = state.media.original_upload(movie_id, &extension);
            let partial = partial_path(&target.absolute);

            let bytes = stream_to_disk(field, partial.clone(), limit).await?;
            info!("📥 Received {} bytes for movie {}", bytes, movie_id);
            stored = Some((target, partial));
            break;
        }

        let Some((target, partial)) = stored else {
            return Err(AppError::Validation("No video file uploaded".to_string()));
        };

        let record = match state.catalog.find(movie_id).await {
            Ok(Some(movie)) => Ok(movie),
            Ok(None) => Err(AppError::MovieNotFound { movie_id: id }),
            Err(e) => Err(AppError::Store(e)),
        };
        let result = match record {
            Ok(previous) => {
                let mut movie = previous.clone();
                movie.videos.set(Quality::Source, target.relative.clone());
                match state.catalog.save(&movie).await {
                    Ok(saved) => Ok((saved, previous)),
                    Err(e) => Err(AppError::Store(e)),
                }
            }
            Err(e) => Err(e),
        };

        let (saved, previous) = match result {
            Ok(pair) => pair,
            Err(e) => {
                warn!("Discarding upload {} for movie {}: {}", target.relative, movie_id, e);
                remove_quietly(&partial).await;
                return Err(e);
            }
        };

        if let Err(e) = tokio::fs::rename(&partial, &target.absolute).await {
            error!("Failed to move upload into {}: {}", target.relative, e);
            remove_quietly(&partial).await;
            if let Err(restore) = state.catalog.save(&previous).await {
                error!("Failed to restore record for movie {}: {:#}", movie_id, restore);
            }
            return Err(e.into());
        }

        info!("✅ Source for movie {} stored at {}", movie_id, target.relative);
        Ok(saved.into())
    }
}
