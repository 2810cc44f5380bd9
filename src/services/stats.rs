//! Dashboard statistics service

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::user::UserClaims,
    policy::{ScopeFilter, ScopeRequest},
    repository::Repository,
};

/// Campus-scoped dashboard counters
#[derive(Debug, Serialize, ToSchema)]
pub struct StatsOverview {
    pub books: i64,
    pub active_loans: i64,
    pub overdue_loans: i64,
    pub pending_requests: i64,
}

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn overview(
        &self,
        claims: &UserClaims,
        scope: Option<ScopeRequest>,
    ) -> AppResult<StatsOverview> {
        let filter = ScopeFilter::scope_for(Some(claims), scope, false);

        Ok(StatsOverview {
            books: self.repository.books.count(&filter).await?,
            active_loans: self.repository.loans.count_active(&filter).await?,
            overdue_loans: self.repository.loans.count_overdue(&filter).await?,
            pending_requests: self.repository.loan_requests.count_pending(&filter).await?,
        })
    }
}
