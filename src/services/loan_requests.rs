//! Loan request workflow service.
//!
//! Owns the pending → approved | rejected lifecycle. Role gates live here;
//! the locked transaction itself lives in the repository.

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult, ErrorCode},
    models::{
        book::Book,
        events::{LoanRequestCreated, LoanRequestDecided},
        loan::LoanDetails,
        loan_request::{Decision, LoanRequestDetails, LoanRequestQuery},
        user::UserClaims,
        DomainEvent,
    },
    policy::ScopeFilter,
    repository::Repository,
};

use super::events::EventEmitter;

#[derive(Clone)]
pub struct LoanRequestsService {
    repository: Repository,
    emitter: Arc<dyn EventEmitter>,
}

impl LoanRequestsService {
    pub fn new(repository: Repository, emitter: Arc<dyn EventEmitter>) -> Self {
        Self {
            repository,
            emitter,
        }
    }

    /// Submit a request to borrow a book.
    ///
    /// Deliberately lock-free: availability may flip between this check and
    /// the insert, and the decision path resolves that race under its row
    /// locks. The partial unique index backstops the duplicate check.
    pub async fn submit(
        &self,
        book_id: i32,
        claims: &UserClaims,
    ) -> AppResult<LoanRequestDetails> {
        claims.require_regular_user()?;

        let book = self.repository.books.get_by_id(book_id).await?;
        check_submittable(&book)?;

        if self
            .repository
            .loan_requests
            .pending_exists(book_id, claims.user_id)
            .await?
        {
            return Err(AppError::validation_code(
                "book",
                ErrorCode::Duplicate,
                "You already have a pending request for this book",
            ));
        }

        let request = self
            .repository
            .loan_requests
            .insert_pending(book_id, claims.user_id, claims.campus_id)
            .await?;

        tracing::info!(
            request_id = request.id,
            book_id,
            requester_id = claims.user_id,
            "loan request created"
        );

        let details = self.repository.loan_requests.details(request.id).await?;
        self.emitter
            .emit(DomainEvent::LoanRequestCreated(LoanRequestCreated {
                request: details.clone(),
            }))
            .await;

        Ok(details)
    }

    /// Approve or reject a pending request.
    ///
    /// The repository runs the locked transaction; the event fires only
    /// after the commit succeeded.
    pub async fn decide(
        &self,
        request_id: i32,
        claims: &UserClaims,
        decision: Decision,
    ) -> AppResult<(LoanRequestDetails, Option<LoanDetails>)> {
        claims.require_staff()?;

        let (request, loan) = self
            .repository
            .loan_requests
            .decide(request_id, claims.user_id, decision)
            .await?;

        tracing::info!(
            request_id = request.id,
            approver_id = claims.user_id,
            decision = ?decision,
            loan_id = loan.as_ref().map(|l| l.id),
            "loan request decided"
        );

        let details = self.repository.loan_requests.details(request.id).await?;
        let loan_details = match &loan {
            Some(loan) => Some(self.repository.loans.details(loan.id).await?),
            None => None,
        };

        self.emitter
            .emit(DomainEvent::LoanRequestDecided(LoanRequestDecided {
                request: details.clone(),
                loan: loan_details.clone(),
            }))
            .await;

        Ok((details, loan_details))
    }

    /// Cancel one of the caller's own pending requests
    pub async fn cancel(&self, request_id: i32, claims: &UserClaims) -> AppResult<LoanRequestDetails> {
        let request = self
            .repository
            .loan_requests
            .cancel(request_id, claims.user_id)
            .await?;

        tracing::info!(request_id = request.id, requester_id = claims.user_id, "loan request canceled");

        let details = self.repository.loan_requests.details(request.id).await?;
        self.emitter
            .emit(DomainEvent::LoanRequestDecided(LoanRequestDecided {
                request: details.clone(),
                loan: None,
            }))
            .await;

        Ok(details)
    }

    /// Scoped request list for staff/admin screens
    pub async fn search(
        &self,
        claims: &UserClaims,
        query: &LoanRequestQuery,
    ) -> AppResult<(Vec<LoanRequestDetails>, i64)> {
        claims.require_staff()?;
        let filter = ScopeFilter::scope_for(Some(claims), query.scope, false);
        self.repository.loan_requests.search(&filter, query).await
    }

    /// The caller's own request history
    pub async fn mine(&self, claims: &UserClaims) -> AppResult<Vec<LoanRequestDetails>> {
        self.repository
            .loan_requests
            .list_for_requester(claims.user_id)
            .await
    }
}

/// Submission preconditions over the book itself, in evaluation order:
/// requestable (physical and not deleted) before available.
fn check_submittable(book: &Book) -> AppResult<()> {
    if !book.is_requestable() {
        return Err(AppError::validation_code(
            "book",
            ErrorCode::BookNotRequestable,
            "Book cannot be requested",
        ));
    }
    if !book.is_available {
        return Err(AppError::validation_code(
            "book",
            ErrorCode::BookNotAvailable,
            "Book is not available",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::book::BookKind;
    use chrono::Utc;

    fn book(kind: BookKind, is_deleted: bool, is_available: bool) -> Book {
        Book {
            id: 1,
            title: "Test".to_string(),
            author: None,
            isbn: None,
            kind,
            campus_id: 1,
            category_id: None,
            shelf_id: None,
            is_available,
            is_deleted,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn field_and_code(err: AppError) -> (&'static str, ErrorCode) {
        match err {
            AppError::Validation { field, code, .. } => (field, code),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn ebooks_are_not_requestable() {
        let err = check_submittable(&book(BookKind::Ebook, false, true)).unwrap_err();
        assert_eq!(field_and_code(err), ("book", ErrorCode::BookNotRequestable));
    }

    #[test]
    fn deleted_books_are_not_requestable() {
        let err = check_submittable(&book(BookKind::Physical, true, true)).unwrap_err();
        assert_eq!(field_and_code(err), ("book", ErrorCode::BookNotRequestable));
    }

    #[test]
    fn requestable_is_checked_before_availability() {
        // A deleted, unavailable book reports "not requestable" first
        let err = check_submittable(&book(BookKind::Physical, true, false)).unwrap_err();
        assert_eq!(field_and_code(err), ("book", ErrorCode::BookNotRequestable));
    }

    #[test]
    fn borrowed_books_report_unavailable() {
        let err = check_submittable(&book(BookKind::Physical, false, false)).unwrap_err();
        assert_eq!(field_and_code(err), ("book", ErrorCode::BookNotAvailable));
    }

    #[test]
    fn live_available_physical_books_pass() {
        assert!(check_submittable(&book(BookKind::Physical, false, true)).is_ok());
    }
}
