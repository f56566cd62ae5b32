use super::model::{Movie, MovieRow};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Read/update access to catalog records.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Movie>>;

    async fn list_by_category(&self, category: &str) -> Result<Vec<Movie>>;

    async fn find(&self, id: Uuid) -> Result<Option<Movie>>;

    async fn create(&self, movie: Movie) -> Result<Movie>;

    /// Persists every field of an existing record. Fails if the record is gone.
    async fn save(&self, movie: &Movie) -> Result<Movie>;

    async fn delete(&self, id: Uuid) -> Result<bool>;
}

const MOVIE_COLUMNS: &str = "id, title, poster, description, genres, cast_list, director, rating, \
     release_year, duration, quality, category, video_fhd, video_hd, video_sd, created_at";

pub struct MovieRepository {
    pool: PgPool,
}

impl MovieRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for MovieRepository {
    async fn list(&self) -> Result<Vec<Movie>> {
        let rows = sqlx::query_as::<_, MovieRow>(&format!(
            "SELECT {} FROM movies ORDER BY created_at DESC",
            MOVIE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Movie::from).collect())
    }

    async fn list_by_category(&self, category: &str) -> Result<Vec<Movie>> {
        let rows = sqlx::query_as::<_, MovieRow>(&format!(
            "SELECT {} FROM movies WHERE category = $1 ORDER BY created_at DESC",
            MOVIE_COLUMNS
        ))
        .bind(category)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Movie::from).collect())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Movie>> {
        let row = sqlx::query_as::<_, MovieRow>(&format!(
            "SELECT {} FROM movies WHERE id = $1",
            MOVIE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Movie::from))
    }

    async fn create(&self, movie: Movie) -> Result<Movie> {
        let row = sqlx::query_as::<_, MovieRow>(&format!(
            r#"
            INSERT INTO movies ({})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING {}
            "#,
            MOVIE_COLUMNS, MOVIE_COLUMNS
        ))
        .bind(movie.id)
        .bind(&movie.title)
        .bind(&movie.poster)
        .bind(&movie.description)
        .bind(&movie.genres)
        .bind(&movie.cast)
        .bind(&movie.director)
        .bind(&movie.rating)
        .bind(&movie.year)
        .bind(&movie.duration)
        .bind(movie.quality.as_str())
        .bind(movie.category.as_str())
        .bind(&movie.videos.source)
        .bind(&movie.videos.hd)
        .bind(&movie.videos.sd)
        .bind(movie.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn save(&self, movie: &Movie) -> Result<Movie> {
        let row = sqlx::query_as::<_, MovieRow>(&format!(
            r#"
            UPDATE movies SET
                title = $2, poster = $3, description = $4, genres = $5, cast_list = $6,
                director = $7, rating = $8, release_year = $9, duration = $10, quality = $11,
                category = $12, video_fhd = $13, video_hd = $14, video_sd = $15
            WHERE id = $1
            RETURNING {}
            "#,
            MOVIE_COLUMNS
        ))
        .bind(movie.id)
        .bind(&movie.title)
        .bind(&movie.poster)
        .bind(&movie.description)
        .bind(&movie.genres)
        .bind(&movie.cast)
        .bind(&movie.director)
        .bind(&movie.rating)
        .bind(&movie.year)
        .bind(&movie.duration)
        .bind(movie.quality.as_str())
        .bind(movie.category.as_str())
        .bind(&movie.videos.source)
        .bind(&movie.videos.hd)
        .bind(&movie.videos.sd)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Movie::from)
            .ok_or_else(|| anyhow!("Movie {} no longer exists", movie.id))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
