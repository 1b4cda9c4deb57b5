//! Business logic services

pub mod catalog;
pub mod identity;
pub mod ledger;
pub mod stats;

use crate::{config::AppConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub identity: identity::IdentityService,
    pub catalog: catalog::CatalogService,
    pub ledger: ledger::LedgerService,
    pub stats: stats::StatsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, config: &AppConfig) -> Self {
        Self {
            identity: identity::IdentityService::new(repository.clone(), config.auth.clone()),
            catalog: catalog::CatalogService::new(repository.clone()),
            ledger: ledger::LedgerService::new(repository.clone(), config.loans.clone()),
            stats: stats::StatsService::new(repository, config.loans.clone()),
        }
    }
}
