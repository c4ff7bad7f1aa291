//! Renewal workflow: choose a new due date for one copy

use chrono::{Duration, Local, NaiveDate};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::instance::{BookInstance, RenewalForm, RenewalFormView},
    repository::Repository,
};

/// Days between today and the date proposed by a fresh renewal form
pub const DEFAULT_RENEWAL_DAYS: i64 = 21;
/// Furthest a renewal may push the due date
pub const MAX_RENEWAL_WEEKS: i64 = 4;

/// Why a proposed renewal date was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RenewalError {
    #[error("This field is required.")]
    Missing,
    #[error("Invalid date - renewal in past")]
    PastDate,
    #[error("Invalid date - renewal more than 4 weeks ahead")]
    TooFarAhead,
}

impl RenewalError {
    pub fn code(&self) -> &'static str {
        match self {
            RenewalError::Missing => "required",
            RenewalError::PastDate => "past_date",
            RenewalError::TooFarAhead => "too_far_ahead",
        }
    }
}

impl From<RenewalError> for AppError {
    fn from(e: RenewalError) -> Self {
        AppError::field("renewal_date", e.code(), e.to_string())
    }
}

pub fn default_renewal_date(today: NaiveDate) -> NaiveDate {
    today + Duration::days(DEFAULT_RENEWAL_DAYS)
}

/// Accept dates from today up to and including four weeks from today
pub fn check_renewal_date(proposed: Option<NaiveDate>, today: NaiveDate) -> Result<NaiveDate, RenewalError> {
    let proposed = proposed.ok_or(RenewalError::Missing)?;

    if proposed < today {
        return Err(RenewalError::PastDate);
    }
    if proposed > today + Duration::weeks(MAX_RENEWAL_WEEKS) {
        return Err(RenewalError::TooFarAhead);
    }
    Ok(proposed)
}

#[derive(Clone)]
pub struct RenewalService {
    repository: Repository,
}

impl RenewalService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    fn today() -> NaiveDate {
        Local::now().date_naive()
    }

    /// The form as first shown: the copy plus a proposed date three weeks out
    pub async fn render_form(&self, instance_id: Uuid) -> AppResult<RenewalFormView> {
        let instance = self.repository.instances.get_by_id(instance_id).await?;
        Ok(RenewalFormView {
            instance,
            form: RenewalForm {
                renewal_date: Some(default_renewal_date(Self::today())),
            },
        })
    }

    /// Validate the proposed date and store it as the copy's new due date
    pub async fn submit(&self, instance_id: Uuid, form: &RenewalForm) -> AppResult<BookInstance> {
        // Resolve the copy first so an unknown id is a 404 even with a bad date
        self.repository.instances.get_by_id(instance_id).await?;

        let due_back = check_renewal_date(form.renewal_date, Self::today())?;
        let instance = self
            .repository
            .instances
            .set_due_back(instance_id, due_back)
            .await?;

        tracing::info!(
            instance_id = %instance_id,
            due_back = %due_back,
            "Book instance renewed"
        );
        Ok(instance)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        models::{author::AuthorForm, book::BookForm, instance::LoanStatus},
        repository::{AuthorsRepository, BooksRepository, MemoryStore},
    };

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn boundaries_of_the_renewal_window() {
        let today = day(2024, 2, 10);
        assert_eq!(check_renewal_date(Some(today), today), Ok(today));
        assert_eq!(
            check_renewal_date(Some(today - Duration::days(1)), today),
            Err(RenewalError::PastDate)
        );
        assert_eq!(
            check_renewal_date(Some(today + Duration::days(28)), today),
            Ok(today + Duration::days(28))
        );
        assert_eq!(
            check_renewal_date(Some(today + Duration::days(29)), today),
            Err(RenewalError::TooFarAhead)
        );
        assert_eq!(check_renewal_date(None, today), Err(RenewalError::Missing));
    }

    #[test]
    fn default_date_is_three_weeks_out() {
        assert_eq!(default_renewal_date(day(2024, 12, 20)), day(2025, 1, 10));
    }

    #[test]
    fn refusal_becomes_a_renewal_date_field_error() {
        let AppError::InvalidFields(errors) = AppError::from(RenewalError::PastDate) else {
            panic!("expected field errors");
        };
        let fields = errors.field_errors();
        let errs = fields.get("renewal_date").unwrap();
        assert_eq!(errs[0].code, "past_date");
    }

    async fn store_with_copy() -> (Arc<MemoryStore>, BookInstance) {
        let store = Arc::new(MemoryStore::new());
        let author = AuthorsRepository::create(
            store.as_ref(),
            &AuthorForm {
                first_name: "Mary".to_string(),
                last_name: "Shelley".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let book = BooksRepository::create(
            store.as_ref(),
            &BookForm {
                title: "Frankenstein".to_string(),
                author_id: Some(author.id),
                summary: "A modern Prometheus".to_string(),
                isbn: "9780141439471".to_string(),
                genre_ids: vec![1],
                language: Some("English".to_string()),
            },
        )
        .await
        .unwrap();
        let copy = store
            .add_instance(book.id, "Penguin", LoanStatus::OnLoan, Some(Local::now().date_naive()), Some(3))
            .await
            .unwrap();
        (store, copy)
    }

    #[tokio::test]
    async fn accepted_date_is_persisted() {
        let (store, copy) = store_with_copy().await;
        let service = RenewalService::new(Repository::in_memory(store.clone()));
        let proposed = Local::now().date_naive() + Duration::days(14);

        let renewed = service
            .submit(copy.id, &RenewalForm { renewal_date: Some(proposed) })
            .await
            .unwrap();
        assert_eq!(renewed.due_back, Some(proposed));

        let stored = crate::repository::InstancesRepository::get_by_id(store.as_ref(), copy.id)
            .await
            .unwrap();
        assert_eq!(stored.due_back, Some(proposed));
    }

    #[tokio::test]
    async fn refused_date_leaves_due_date_untouched() {
        let (store, copy) = store_with_copy().await;
        let service = RenewalService::new(Repository::in_memory(store.clone()));
        let proposed = Local::now().date_naive() + Duration::days(60);

        let err = service
            .submit(copy.id, &RenewalForm { renewal_date: Some(proposed) })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidFields(_)));

        let stored = crate::repository::InstancesRepository::get_by_id(store.as_ref(), copy.id)
            .await
            .unwrap();
        assert_eq!(stored.due_back, copy.due_back);
    }

    #[tokio::test]
    async fn unknown_copy_is_not_found() {
        let (store, _) = store_with_copy().await;
        let service = RenewalService::new(Repository::in_memory(store));
        assert!(matches!(
            service.render_form(Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.submit(Uuid::new_v4(), &RenewalForm::default()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn form_proposes_default_date() {
        let (store, copy) = store_with_copy().await;
        let service = RenewalService::new(Repository::in_memory(store));
        let view = service.render_form(copy.id).await.unwrap();
        assert_eq!(view.instance.id, copy.id);
        assert_eq!(
            view.form.renewal_date,
            Some(default_renewal_date(Local::now().date_naive()))
        );
    }
}
