use super::model::{Movie, MovieCategory, QualityBadge, RenditionSet};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateMovieRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Poster is required"))]
    pub poster: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(length(min = 1, message = "Genres are required"))]
    pub genres: String,
    #[serde(default)]
    pub cast: String,
    #[serde(default)]
    pub director: String,
    pub rating: Option<String>,
    #[validate(length(min = 1, message = "Year is required"))]
    pub year: String,
    pub duration: Option<String>,
    #[serde(default)]
    pub quality: QualityBadge,
    #[serde(rename = "type", default)]
    pub category: MovieCategory,
    #[serde(default)]
    pub videos: RenditionSet,
}

impl CreateMovieRequest {
    pub fn into_movie(self) -> Movie {
        Movie {
            id: Uuid::new_v4(),
            title: self.title.trim().to_string(),
            poster: self.poster,
            description: self.description,
            genres: self.genres,
            cast: self.cast,
            director: self.director,
            rating: self.rating.unwrap_or_else(|| "16+".to_string()),
            year: self.year,
            duration: self.duration.unwrap_or_else(|| "1h 30m".to_string()),
            quality: self.quality,
            category: self.category,
            videos: self.videos,
            created_at: OffsetDateTime::now_utc(),
        }
    }
}

/// Shallow merge: every supplied field replaces the stored one wholesale.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateMovieRequest {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,
    pub poster: Option<String>,
    pub description: Option<String>,
    pub genres: Option<String>,
    pub cast: Option<String>,
    pub director: Option<String>,
    pub rating: Option<String>,
    pub year: Option<String>,
    pub duration: Option<String>,
    pub quality: Option<QualityBadge>,
    #[serde(rename = "type")]
    pub category: Option<MovieCategory>,
    pub videos: Option<RenditionSet>,
}

impl UpdateMovieRequest {
    pub fn apply_to(self, movie: &mut Movie) {
        if let Some(title) = self.title {
            movie.title = title.trim().to_string();
        }
        if let Some(poster) = self.poster {
            movie.poster = poster;
        }
        if let Some(description) = self.description {
            movie.description = description;
        }
        if let Some(genres) = self.genres {
            movie.genres = genres;
        }
        if let Some(cast) = self.cast {
            movie.cast = cast;
        }
        if let Some(director) = self.director {
            movie.director = director;
        }
        if let Some(rating) = self.rating {
            movie.rating = rating;
        }
        if let Some(year) = self.year {
            movie.year = year;
        }
        if let Some(duration) = self.duration {
            movie.duration = duration;
        }
        if let Some(quality) = self.quality {
            movie.quality = quality;
        }
        if let Some(category) = self.category {
            movie.category = category;
        }
        if let Some(videos) = self.videos {
            movie.videos = videos;
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MovieResponse {
    #[serde(flatten)]
    pub movie: Movie,
    /// Legacy alias of `videos.fhd`.
    pub video_path: Option<String>,
}

impl From<Movie> for MovieResponse {
    fn from(movie: Movie) -> Self {
        Self {
            video_path: movie.videos.source.clone(),
            movie,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LocalVideosResponse {
    pub videos: Vec<String>,
}
