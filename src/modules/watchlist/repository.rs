use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

/// Per-user ordered set of catalog ids.
#[async_trait]
pub trait WatchlistStore: Send + Sync {
    /// Movie ids in the order they were added.
    async fn movie_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>>;

    /// Adding an id that is already present is a no-op.
    async fn add(&self, user_id: Uuid, movie_id: Uuid) -> Result<()>;

    async fn remove(&self, user_id: Uuid, movie_id: Uuid) -> Result<bool>;

    async fn clear(&self, user_id: Uuid) -> Result<()>;

    async fn count(&self, user_id: Uuid) -> Result<i64>;
}

pub struct WatchlistRepository {
    pool: PgPool,
}

impl WatchlistRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WatchlistStore for WatchlistRepository {
    async fn movie_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT movie_id FROM watchlist_entries WHERE user_id = $1 ORDER BY added_at, movie_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn add(&self, user_id: Uuid, movie_id: Uuid) -> Result<()> {
        sqlx::query(
            "INSERT INTO watchlist_entries (user_id, movie_id) VALUES ($1, $2) \
             ON CONFLICT (user_id, movie_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(movie_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove(&self, user_id: Uuid, movie_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM watchlist_entries WHERE user_id = $1 AND movie_id = $2")
            .bind(user_id)
            .bind(movie_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn clear(&self, user_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM watchlist_entries WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn count(&self, user_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM watchlist_entries WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
