//! Book instances repository (copies and their loans)

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::instance::{BookInstance, LoanStatus, LoanedInstance},
};

#[async_trait]
pub trait InstancesRepository: Send + Sync {
    async fn count(&self) -> AppResult<i64>;

    async fn count_by_status(&self, status: LoanStatus) -> AppResult<i64>;

    async fn get_by_id(&self, id: Uuid) -> AppResult<BookInstance>;

    async fn list_for_book(&self, book_id: i32) -> AppResult<Vec<BookInstance>>;

    async fn count_for_book(&self, book_id: i32) -> AppResult<i64>;

    /// Count copies on loan, to one borrower when given, otherwise to anyone
    async fn count_on_loan(&self, borrower_id: Option<i32>) -> AppResult<i64>;

    /// List copies on loan ordered by due date ascending, undated copies last
    async fn list_on_loan(
        &self,
        borrower_id: Option<i32>,
        offset: i64,
        limit: i64,
    ) -> AppResult<Vec<LoanedInstance>>;

    /// Store a new due date; the only write the loan workflow performs
    async fn set_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<BookInstance>;
}

#[derive(Clone)]
pub struct PgInstancesRepository {
    pool: Pool<Postgres>,
}

impl PgInstancesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InstancesRepository for PgInstancesRepository {
    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_instances")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_by_status(&self, status: LoanStatus) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_instances WHERE status = $1")
            .bind(status)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<BookInstance> {
        sqlx::query_as::<_, BookInstance>("SELECT * FROM book_instances WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))
    }

    async fn list_for_book(&self, book_id: i32) -> AppResult<Vec<BookInstance>> {
        let rows = sqlx::query_as::<_, BookInstance>(
            "SELECT * FROM book_instances WHERE book_id = $1 ORDER BY due_back ASC NULLS LAST, id",
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn count_for_book(&self, book_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_instances WHERE book_id = $1")
            .bind(book_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_on_loan(&self, borrower_id: Option<i32>) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM book_instances WHERE status = $1 AND ($2::int IS NULL OR borrower_id = $2)",
        )
        .bind(LoanStatus::OnLoan)
        .bind(borrower_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn list_on_loan(
        &self,
        borrower_id: Option<i32>,
        offset: i64,
        limit: i64,
    ) -> AppResult<Vec<LoanedInstance>> {
        let rows = sqlx::query_as::<_, LoanedInstance>(
            r#"
            SELECT bi.id, bi.book_id, b.title AS book_title, bi.imprint,
                   bi.due_back, bi.status, bi.borrower_id
            FROM book_instances bi
            JOIN books b ON b.id = bi.book_id
            WHERE bi.status = $1 AND ($2::int IS NULL OR bi.borrower_id = $2)
            ORDER BY bi.due_back ASC NULLS LAST, bi.id
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(LoanStatus::OnLoan)
        .bind(borrower_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn set_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<BookInstance> {
        sqlx::query_as::<_, BookInstance>(
            "UPDATE book_instances SET due_back = $1 WHERE id = $2 RETURNING *",
        )
        .bind(due_back)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book instance {} not found", id)))
    }
}
