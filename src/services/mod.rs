//! Business logic services

pub mod catalog;
pub mod events;
pub mod loan_requests;
pub mod loans;
pub mod stats;
pub mod users;

use std::sync::Arc;

use crate::{config::AuthConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub users: users::UsersService,
    pub catalog: catalog::CatalogService,
    pub loans: loans::LoansService,
    pub loan_requests: loan_requests::LoanRequestsService,
    pub stats: stats::StatsService,
    pub events: Arc<events::BroadcastEmitter>,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig) -> Self {
        let events = Arc::new(events::BroadcastEmitter::new(64));
        let emitter: Arc<dyn events::EventEmitter> = events.clone();

        Self {
            users: users::UsersService::new(repository.clone(), auth_config),
            catalog: catalog::CatalogService::new(repository.clone()),
            loans: loans::LoansService::new(repository.clone(), emitter.clone()),
            loan_requests: loan_requests::LoanRequestsService::new(repository.clone(), emitter),
            stats: stats::StatsService::new(repository),
            events,
        }
    }
}
