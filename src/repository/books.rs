//! Books repository

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::{is_foreign_key_violation, map_write_error, AppError, AppResult},
    models::book::{Book, BookForm, BookShort},
};

#[async_trait]
pub trait BooksRepository: Send + Sync {
    async fn count(&self) -> AppResult<i64>;

    /// Count books whose title contains `word` as a case-sensitive literal substring
    async fn count_title_containing(&self, word: &str) -> AppResult<i64>;

    /// List books ordered by title, one page at a time
    async fn list(&self, offset: i64, limit: i64) -> AppResult<Vec<BookShort>>;

    async fn list_by_author(&self, author_id: i32) -> AppResult<Vec<BookShort>>;

    async fn count_by_author(&self, author_id: i32) -> AppResult<i64>;

    async fn get_by_id(&self, id: i32) -> AppResult<Book>;

    async fn create(&self, form: &BookForm) -> AppResult<Book>;

    async fn update(&self, id: i32, form: &BookForm) -> AppResult<Book>;

    /// Delete a book; fails with `ReferentialDelete` while copies still exist
    async fn delete(&self, id: i32) -> AppResult<()>;
}

const BOOK_COLUMNS: &str = r#"
    b.id, b.title, b.author_id, b.summary, b.isbn, b.language,
    ARRAY(SELECT bg.genre_id FROM book_genres bg WHERE bg.book_id = b.id ORDER BY bg.genre_id) AS genre_ids
"#;

const BOOK_SHORT_COLUMNS: &str = r#"
    b.id, b.title, b.author_id, b.isbn,
    CASE WHEN a.id IS NULL THEN NULL ELSE a.last_name || ', ' || a.first_name END AS author_name
"#;

#[derive(Clone)]
pub struct PgBooksRepository {
    pool: Pool<Postgres>,
}

impl PgBooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn replace_genres(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        book_id: i32,
        genre_ids: &[i32],
    ) -> AppResult<()> {
        sqlx::query("DELETE FROM book_genres WHERE book_id = $1")
            .bind(book_id)
            .execute(&mut **tx)
            .await?;

        sqlx::query(
            "INSERT INTO book_genres (book_id, genre_id) SELECT $1, UNNEST($2::int[]) ON CONFLICT DO NOTHING",
        )
        .bind(book_id)
        .bind(genre_ids)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl BooksRepository for PgBooksRepository {
    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_title_containing(&self, word: &str) -> AppResult<i64> {
        // strpos is an exact, case-sensitive match: no LIKE wildcards to escape
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE strpos(title, $1) > 0")
            .bind(word)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn list(&self, offset: i64, limit: i64) -> AppResult<Vec<BookShort>> {
        let query = format!(
            "SELECT {} FROM books b LEFT JOIN authors a ON a.id = b.author_id ORDER BY b.title COLLATE \"C\", b.id LIMIT $1 OFFSET $2",
            BOOK_SHORT_COLUMNS
        );
        let rows = sqlx::query_as::<_, BookShort>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn list_by_author(&self, author_id: i32) -> AppResult<Vec<BookShort>> {
        let query = format!(
            "SELECT {} FROM books b LEFT JOIN authors a ON a.id = b.author_id WHERE b.author_id = $1 ORDER BY b.title COLLATE \"C\", b.id",
            BOOK_SHORT_COLUMNS
        );
        let rows = sqlx::query_as::<_, BookShort>(&query)
            .bind(author_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn count_by_author(&self, author_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        let query = format!("SELECT {} FROM books b WHERE b.id = $1", BOOK_COLUMNS);
        sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    async fn create(&self, form: &BookForm) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO books (title, author_id, summary, isbn, language)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&form.title)
        .bind(form.author_id)
        .bind(&form.summary)
        .bind(&form.isbn)
        .bind(&form.language)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, "A book with this ISBN"))?;

        Self::replace_genres(&mut tx, id, &form.genre_ids).await?;
        tx.commit().await?;

        self.get_by_id(id).await
    }

    async fn update(&self, id: i32, form: &BookForm) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE books
            SET title = $1, author_id = $2, summary = $3, isbn = $4, language = $5
            WHERE id = $6
            "#,
        )
        .bind(&form.title)
        .bind(form.author_id)
        .bind(&form.summary)
        .bind(&form.isbn)
        .bind(&form.language)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, "A book with this ISBN"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }

        Self::replace_genres(&mut tx, id, &form.genre_ids).await?;
        tx.commit().await?;

        self.get_by_id(id).await
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = match sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
        {
            Ok(result) => result,
            Err(e) if is_foreign_key_violation(&e) => {
                let dependents: i64 =
                    sqlx::query_scalar("SELECT COUNT(*) FROM book_instances WHERE book_id = $1")
                        .bind(id)
                        .fetch_one(&self.pool)
                        .await?;
                return Err(AppError::ReferentialDelete {
                    resource: "book",
                    id,
                    dependents,
                });
            }
            Err(e) => return Err(e.into()),
        };

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }
}
