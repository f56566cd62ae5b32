use super::dto::{WatchlistAddResponse, WatchlistClearResponse, WatchlistRemoveResponse};
use crate::common::error::{AppError, AppResult};
use crate::modules::movie::dto::MovieResponse;
use crate::modules::movie::service::{parse_movie_id, MovieService};
use crate::state::AppState;
use tracing::{debug, warn};
use uuid::Uuid;

pub struct WatchlistService;

impl WatchlistService {
    pub async fn list(state: AppState, user_id: Uuid) -> AppResult<Vec<MovieResponse>> {
        let ids = state.watchlist.movie_ids(user_id).await.map_err(AppError::Store)?;

        let mut movies = Vec::with_capacity(ids.len());
        for id in ids {
            match state.catalog.find(id).await.map_err(AppError::Store)? {
                Some(movie) => movies.push(MovieResponse::from(movie)),
                None => warn!("Watchlist of {} references missing movie {}", user_id, id),
            }
        }
        Ok(movies)
    }

    pub async fn add(state: AppState, user_id: Uuid, raw_movie_id: String) -> AppResult<WatchlistAddResponse> {
        let movie_id = parse_movie_id(&raw_movie_id)?;
        let movie = MovieService::find_movie(&state, movie_id).await?;

        state.watchlist.add(user_id, movie_id).await.map_err(AppError::Store)?;
        let size = state.watchlist.count(user_id).await.map_err(AppError::Store)?;
        debug!("User {} watchlist now holds {} movies", user_id, size);

        Ok(WatchlistAddResponse {
            message: "Movie added to watchlist".to_string(),
            success: true,
            movie_id: movie.id.to_string(),
            movie_title: movie.title,
            watchlist_size: size,
        })
    }

    /// Unknown or malformed ids simply report `removed: false`.
    pub async fn remove(state: AppState, user_id: Uuid, raw_movie_id: String) -> AppResult<WatchlistRemoveResponse> {
        let removed = match Uuid::parse_str(raw_movie_id.trim()) {
            Ok(movie_id) => state
                .watchlist
                .remove(user_id, movie_id)
                .await
                .map_err(AppError::Store)?,
            Err(_) => false,
        };
        let size = state.watchlist.count(user_id).await.map_err(AppError::Store)?;

        Ok(WatchlistRemoveResponse {
            message: "Movie removed from watchlist".to_string(),
            success: true,
            movie_id: raw_movie_id,
            removed,
            watchlist_size: size,
        })
    }

    pub async fn clear(state: AppState, user_id: Uuid) -> AppResult<WatchlistClearResponse> {
        state.watchlist.clear(user_id).await.map_err(AppError::Store)?;
        Ok(WatchlistClearResponse {
            message: "Watchlist cleared".to_string(),
            success: true,
        })
    }
}
