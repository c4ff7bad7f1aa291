//! Dashboard counters

use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use super::sessions::SessionStore;
use crate::{error::AppResult, models::instance::LoanStatus, repository::Repository};

/// Counts shown on the catalog home page
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardCounts {
    pub book_count: i64,
    pub instance_count: i64,
    pub available_instance_count: i64,
    pub author_count: i64,
    pub genre_count: i64,
    /// Word searched for in book titles
    pub title_word: String,
    /// Books whose title contains `title_word` (case-sensitive)
    pub titles_containing_word: i64,
    /// Visits to the dashboard earlier in this session
    pub visit_count: i64,
}

#[derive(Clone)]
pub struct DashboardService {
    repository: Repository,
    sessions: Arc<dyn SessionStore>,
    title_word: String,
}

impl DashboardService {
    pub fn new(repository: Repository, sessions: Arc<dyn SessionStore>, title_word: String) -> Self {
        Self {
            repository,
            sessions,
            title_word,
        }
    }

    /// Read every counter from the store and record this visit for the session
    pub async fn compute_counts(&self, session_id: &str) -> AppResult<DashboardCounts> {
        let book_count = self.repository.books.count().await?;
        let instance_count = self.repository.instances.count().await?;
        let available_instance_count = self
            .repository
            .instances
            .count_by_status(LoanStatus::Available)
            .await?;
        let author_count = self.repository.authors.count().await?;
        let genre_count = self.repository.genres.count().await?;
        let titles_containing_word = self
            .repository
            .books
            .count_title_containing(&self.title_word)
            .await?;

        let visit_count = self.sessions.record_visit(session_id).await?;

        tracing::debug!(session_id, visit_count, "Dashboard visit recorded");

        Ok(DashboardCounts {
            book_count,
            instance_count,
            available_instance_count,
            author_count,
            genre_count,
            title_word: self.title_word.clone(),
            titles_containing_word,
            visit_count,
        })
    }
}
