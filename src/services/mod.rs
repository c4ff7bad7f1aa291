//! Business logic services

pub mod catalog;
pub mod dashboard;
pub mod loans;
pub mod redis;
pub mod renewal;
pub mod sessions;

use std::sync::Arc;

use crate::{config::CatalogConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub dashboard: dashboard::DashboardService,
    pub loans: loans::LoansService,
    pub renewal: renewal::RenewalService,
}

impl Services {
    /// Create all services with the given repository and session store
    pub fn new(
        repository: Repository,
        sessions: Arc<dyn sessions::SessionStore>,
        catalog_config: CatalogConfig,
    ) -> Self {
        Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            dashboard: dashboard::DashboardService::new(
                repository.clone(),
                sessions,
                catalog_config.title_word,
            ),
            loans: loans::LoansService::new(repository.clone()),
            renewal: renewal::RenewalService::new(repository),
        }
    }
}
