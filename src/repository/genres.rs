//! Genres repository

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{error::AppResult, models::genre::Genre};

#[async_trait]
pub trait GenresRepository: Send + Sync {
    async fn count(&self) -> AppResult<i64>;

    async fn list(&self) -> AppResult<Vec<Genre>>;

    /// Fetch the genres with the given ids; unknown ids are simply absent
    async fn get_many(&self, ids: &[i32]) -> AppResult<Vec<Genre>>;
}

#[derive(Clone)]
pub struct PgGenresRepository {
    pool: Pool<Postgres>,
}

impl PgGenresRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GenresRepository for PgGenresRepository {
    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM genres")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn list(&self) -> AppResult<Vec<Genre>> {
        let rows = sqlx::query_as::<_, Genre>("SELECT * FROM genres ORDER BY name COLLATE \"C\"")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn get_many(&self, ids: &[i32]) -> AppResult<Vec<Genre>> {
        let rows = sqlx::query_as::<_, Genre>("SELECT * FROM genres WHERE id = ANY($1) ORDER BY name COLLATE \"C\"")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
