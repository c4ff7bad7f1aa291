//! Authors repository

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::{is_foreign_key_violation, AppError, AppResult},
    models::author::{Author, AuthorForm},
};

#[async_trait]
pub trait AuthorsRepository: Send + Sync {
    async fn count(&self) -> AppResult<i64>;

    /// List authors ordered by last name then first name
    async fn list(&self, offset: i64, limit: i64) -> AppResult<Vec<Author>>;

    async fn get_by_id(&self, id: i32) -> AppResult<Author>;

    async fn create(&self, form: &AuthorForm) -> AppResult<Author>;

    async fn update(&self, id: i32, form: &AuthorForm) -> AppResult<Author>;

    /// Delete an author; fails with `ReferentialDelete` while books still reference them
    async fn delete(&self, id: i32) -> AppResult<()>;
}

#[derive(Clone)]
pub struct PgAuthorsRepository {
    pool: Pool<Postgres>,
}

impl PgAuthorsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthorsRepository for PgAuthorsRepository {
    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM authors")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn list(&self, offset: i64, limit: i64) -> AppResult<Vec<Author>> {
        let rows = sqlx::query_as::<_, Author>(
            "SELECT * FROM authors ORDER BY last_name COLLATE \"C\", first_name COLLATE \"C\", id LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Author> {
        sqlx::query_as::<_, Author>("SELECT * FROM authors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Author with id {} not found", id)))
    }

    async fn create(&self, form: &AuthorForm) -> AppResult<Author> {
        let row = sqlx::query_as::<_, Author>(
            r#"
            INSERT INTO authors (first_name, last_name, date_of_birth, date_of_death)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&form.first_name)
        .bind(&form.last_name)
        .bind(form.date_of_birth)
        .bind(form.date_of_death)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update(&self, id: i32, form: &AuthorForm) -> AppResult<Author> {
        sqlx::query_as::<_, Author>(
            r#"
            UPDATE authors
            SET first_name = $1, last_name = $2, date_of_birth = $3, date_of_death = $4
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(&form.first_name)
        .bind(&form.last_name)
        .bind(form.date_of_birth)
        .bind(form.date_of_death)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Author with id {} not found", id)))
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = match sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
        {
            Ok(result) => result,
            Err(e) if is_foreign_key_violation(&e) => {
                let dependents: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE author_id = $1")
                    .bind(id)
                    .fetch_one(&self.pool)
                    .await?;
                return Err(AppError::ReferentialDelete {
                    resource: "author",
                    id,
                    dependents,
                });
            }
            Err(e) => return Err(e.into()),
        };

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Author with id {} not found", id)));
        }
        Ok(())
    }
}
