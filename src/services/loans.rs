//! Loan management service

use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{
        events::LoanClosed,
        loan::{LoanDetails, LoanQuery, LoanStatus},
        user::UserClaims,
        DomainEvent,
    },
    policy::ScopeFilter,
    repository::Repository,
};

use super::events::EventEmitter;

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
    emitter: Arc<dyn EventEmitter>,
}

impl LoansService {
    pub fn new(repository: Repository, emitter: Arc<dyn EventEmitter>) -> Self {
        Self {
            repository,
            emitter,
        }
    }

    /// Scoped loan list for staff/admin screens
    pub async fn search(
        &self,
        claims: &UserClaims,
        query: &LoanQuery,
    ) -> AppResult<(Vec<LoanDetails>, i64)> {
        claims.require_staff()?;
        let filter = ScopeFilter::scope_for(Some(claims), query.scope, false);
        self.repository.loans.search(&filter, query).await
    }

    /// Loans of a single user; readers may only see their own
    pub async fn user_loans(&self, user_id: i32, claims: &UserClaims) -> AppResult<Vec<LoanDetails>> {
        if claims.user_id != user_id {
            claims.require_staff()?;
        }
        self.repository.users.get_by_id(user_id).await?;
        self.repository.loans.list_for_user(user_id).await
    }

    /// Return a borrowed book, restoring its availability
    pub async fn return_loan(&self, loan_id: i32, claims: &UserClaims) -> AppResult<LoanDetails> {
        self.close(loan_id, claims, LoanStatus::Returned).await
    }

    /// Void a loan (lost book, data-entry error), restoring availability
    pub async fn cancel_loan(&self, loan_id: i32, claims: &UserClaims) -> AppResult<LoanDetails> {
        self.close(loan_id, claims, LoanStatus::Canceled).await
    }

    async fn close(
        &self,
        loan_id: i32,
        claims: &UserClaims,
        to: LoanStatus,
    ) -> AppResult<LoanDetails> {
        claims.require_staff()?;

        let loan = self.repository.loans.close(loan_id, to).await?;

        tracing::info!(
            loan_id = loan.id,
            book_id = loan.book_id,
            status = %to,
            "loan closed"
        );

        let details = self.repository.loans.details(loan.id).await?;
        self.emitter
            .emit(DomainEvent::LoanClosed(LoanClosed {
                loan: details.clone(),
            }))
            .await;

        Ok(details)
    }
}
