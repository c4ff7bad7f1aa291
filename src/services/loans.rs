//! Loan listings

use chrono::{Local, NaiveDate};

use crate::{
    error::AppResult,
    models::{
        instance::LoanedInstance,
        pagination::{PageWindow, Paginated, LOANS_PER_PAGE},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
}

impl LoansService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Copies on loan to one borrower, soonest due first
    pub async fn list_for_borrower(
        &self,
        borrower_id: i32,
        page: Option<i64>,
    ) -> AppResult<Paginated<LoanedInstance>> {
        self.list(Some(borrower_id), page).await
    }

    /// Every copy on loan, soonest due first
    pub async fn list_all_active(&self, page: Option<i64>) -> AppResult<Paginated<LoanedInstance>> {
        self.list(None, page).await
    }

    async fn list(
        &self,
        borrower_id: Option<i32>,
        page: Option<i64>,
    ) -> AppResult<Paginated<LoanedInstance>> {
        let total = self.repository.instances.count_on_loan(borrower_id).await?;
        let window = PageWindow::resolve(page, LOANS_PER_PAGE, total)?;
        let mut loans = self
            .repository
            .instances
            .list_on_loan(borrower_id, window.offset, window.per_page)
            .await?;

        mark_overdue(&mut loans, Local::now().date_naive());
        Ok(window.wrap(loans, total))
    }
}

fn mark_overdue(loans: &mut [LoanedInstance], today: NaiveDate) {
    for loan in loans {
        loan.is_overdue = loan.is_overdue_on(today);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;

    use super::*;
    use crate::{
        error::AppError,
        models::{author::AuthorForm, book::BookForm, instance::LoanStatus},
        repository::{AuthorsRepository, BooksRepository, MemoryStore},
    };

    async fn store_with_book() -> (Arc<MemoryStore>, i32) {
        let store = Arc::new(MemoryStore::new());
        let author = AuthorsRepository::create(
            store.as_ref(),
            &AuthorForm {
                first_name: "Ursula".to_string(),
                last_name: "Le Guin".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let book = BooksRepository::create(
            store.as_ref(),
            &BookForm {
                title: "The Dispossessed".to_string(),
                author_id: Some(author.id),
                summary: "Anarres and Urras".to_string(),
                isbn: "9780061054884".to_string(),
                genre_ids: vec![1],
                language: None,
            },
        )
        .await
        .unwrap();
        (store, book.id)
    }

    #[tokio::test]
    async fn borrower_sees_only_own_active_loans_in_due_order() {
        let (store, book_id) = store_with_book().await;
        let today = Local::now().date_naive();
        let late = Some(today - Duration::days(3));
        let soon = Some(today + Duration::days(5));
        let later = Some(today + Duration::days(12));

        store.add_instance(book_id, "a", LoanStatus::OnLoan, later, Some(7)).await.unwrap();
        store.add_instance(book_id, "b", LoanStatus::OnLoan, None, Some(7)).await.unwrap();
        store.add_instance(book_id, "c", LoanStatus::OnLoan, late, Some(7)).await.unwrap();
        store.add_instance(book_id, "d", LoanStatus::Reserved, soon, Some(7)).await.unwrap();
        store.add_instance(book_id, "e", LoanStatus::OnLoan, soon, Some(8)).await.unwrap();

        let service = LoansService::new(Repository::in_memory(store));
        let page = service.list_for_borrower(7, None).await.unwrap();

        assert_eq!(page.total, 3);
        assert!(page.items.iter().all(|l| l.status == LoanStatus::OnLoan));
        assert!(page.items.iter().all(|l| l.borrower_id == Some(7)));
        let dates: Vec<_> = page.items.iter().map(|l| l.due_back).collect();
        assert_eq!(dates, vec![late, later, None]);
        assert!(page.items[0].is_overdue);
        assert!(!page.items[1].is_overdue);
        assert!(!page.items[2].is_overdue);
        assert_eq!(page.items[0].book_title, "The Dispossessed");
    }

    #[tokio::test]
    async fn all_active_loans_span_borrowers_and_paginate() {
        let (store, book_id) = store_with_book().await;
        let today = Local::now().date_naive();
        for i in 0..12 {
            store
                .add_instance(
                    book_id,
                    "copy",
                    LoanStatus::OnLoan,
                    Some(today + Duration::days(i)),
                    Some(100 + i as i32),
                )
                .await
                .unwrap();
        }
        store.add_instance(book_id, "shelf", LoanStatus::Available, None, None).await.unwrap();

        let service = LoansService::new(Repository::in_memory(store));
        let first = service.list_all_active(None).await.unwrap();
        assert_eq!(first.total, 12);
        assert_eq!(first.items.len(), 10);
        assert_eq!(first.num_pages, 2);

        let second = service.list_all_active(Some(2)).await.unwrap();
        assert_eq!(second.items.len(), 2);
        assert!(first.items.last().unwrap().due_back <= second.items[0].due_back);

        assert!(matches!(
            service.list_all_active(Some(3)).await,
            Err(AppError::NotFound(_))
        ));
    }
}
