//! Loan requests repository: persistence for the request state machine.
//!
//! The decide and cancel paths are the only writers of `status`,
//! `approver_id` and `decided_at`, and the only code (together with
//! `LoansRepository::close`) that may flip `books.is_available`. Both run
//! inside a single transaction holding row locks in a fixed order: the
//! request row, then the book row. A precondition failure returns before
//! any write is staged; dropping the transaction rolls it back.

use chrono::Utc;
use sqlx::{Pool, Postgres, Row, Transaction};

use crate::{
    error::{AppError, AppResult, ErrorCode},
    models::{
        book::Book,
        loan::{return_date_from, BookLoan},
        loan_request::{
            Decision, LoanRequest, LoanRequestDetails, LoanRequestQuery, RequestStatus,
        },
    },
    policy::ScopeFilter,
};

#[derive(Clone)]
pub struct LoanRequestsRepository {
    pool: Pool<Postgres>,
}

const DETAILS_SELECT: &str = r#"
    SELECT r.id, r.book_id, b.title AS book_title, r.requester_id,
           u.display_name AS requester_name, r.approver_id, r.campus_id,
           r.status, r.decided_at, r.created_at
    FROM book_loan_requests r
    JOIN books b ON r.book_id = b.id
    JOIN users u ON r.requester_id = u.id
"#;

impl LoanRequestsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get request by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<LoanRequest> {
        sqlx::query_as::<_, LoanRequest>("SELECT * FROM book_loan_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan request with id {} not found", id)))
    }

    /// Get display details for a single request
    pub async fn details(&self, id: i32) -> AppResult<LoanRequestDetails> {
        let query = format!("{} WHERE r.id = $1", DETAILS_SELECT);
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan request with id {} not found", id)))?;

        Ok(details_from_row(&row))
    }

    /// Whether the requester already has a pending request for this book
    pub async fn pending_exists(&self, book_id: i32, requester_id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM book_loan_requests
                WHERE book_id = $1 AND requester_id = $2 AND status = 'pending'
            )
            "#,
        )
        .bind(book_id)
        .bind(requester_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Insert a new pending request.
    ///
    /// The partial unique index on (book_id, requester_id) WHERE pending is
    /// the race backstop behind the service-level pre-check; a violation
    /// maps to the same duplicate-request error the pre-check produces.
    pub async fn insert_pending(
        &self,
        book_id: i32,
        requester_id: i32,
        campus_id: i32,
    ) -> AppResult<LoanRequest> {
        sqlx::query_as::<_, LoanRequest>(
            r#"
            INSERT INTO book_loan_requests (book_id, requester_id, campus_id, status, created_at)
            VALUES ($1, $2, $3, 'pending', $4)
            RETURNING *
            "#,
        )
        .bind(book_id)
        .bind(requester_id)
        .bind(campus_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db)
                if db.constraint() == Some("uniq_pending_loan_request") =>
            {
                AppError::validation_code(
                    "book",
                    ErrorCode::Duplicate,
                    "You already have a pending request for this book",
                )
            }
            other => AppError::Database(other),
        })
    }

    /// Apply a staff/admin decision to a pending request.
    ///
    /// One unit of work: lock the request row, re-check pending, lock the
    /// book row, re-check deleted/available, then transition and (on
    /// approval) create the loan and clear availability in one commit.
    pub async fn decide(
        &self,
        request_id: i32,
        approver_id: i32,
        decision: Decision,
    ) -> AppResult<(LoanRequest, Option<BookLoan>)> {
        let mut tx = self.pool.begin().await?;

        let request = lock_request(&mut tx, request_id).await?;
        ensure_pending(&request)?;
        let book = lock_book(&mut tx, request.book_id).await?;

        if book.is_deleted {
            return Err(AppError::validation_code(
                "book",
                ErrorCode::NoSuchBook,
                "Book is no longer available",
            ));
        }

        if decision == Decision::Approved && !book.is_available {
            return Err(AppError::validation_code(
                "book",
                ErrorCode::BookNotAvailable,
                "Book is already borrowed",
            ));
        }

        let now = Utc::now();
        let status = match decision {
            Decision::Approved => RequestStatus::Approved,
            Decision::Rejected => RequestStatus::Rejected,
        };

        let updated = sqlx::query_as::<_, LoanRequest>(
            r#"
            UPDATE book_loan_requests
            SET status = $1, approver_id = $2, decided_at = $3
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(status)
        .bind(approver_id)
        .bind(now)
        .bind(request_id)
        .fetch_one(&mut *tx)
        .await?;

        let loan = if decision == Decision::Approved {
            let loan = sqlx::query_as::<_, BookLoan>(
                r#"
                INSERT INTO book_loans
                    (book_id, user_id, campus_id, return_date, status, is_deleted, created_at)
                VALUES ($1, $2, $3, $4, 'processing', FALSE, $5)
                RETURNING *
                "#,
            )
            .bind(request.book_id)
            .bind(request.requester_id)
            .bind(request.campus_id)
            .bind(return_date_from(now))
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;

            sqlx::query("UPDATE books SET is_available = FALSE, updated_at = $1 WHERE id = $2")
                .bind(now)
                .bind(book.id)
                .execute(&mut *tx)
                .await?;

            Some(loan)
        } else {
            None
        };

        tx.commit().await?;

        Ok((updated, loan))
    }

    /// Cancel a pending request on behalf of its requester.
    ///
    /// Takes the same request-row lock as `decide`, so a cancel racing a
    /// decision observes the post-transition state and fails cleanly.
    pub async fn cancel(&self, request_id: i32, requester_id: i32) -> AppResult<LoanRequest> {
        let mut tx = self.pool.begin().await?;

        let request = lock_request(&mut tx, request_id).await?;

        if request.requester_id != requester_id {
            return Err(AppError::Authorization(
                "You can only cancel your own loan requests".to_string(),
            ));
        }
        ensure_pending(&request)?;

        let updated = sqlx::query_as::<_, LoanRequest>(
            r#"
            UPDATE book_loan_requests
            SET status = 'rejected', approver_id = NULL, decided_at = $1
            WHERE id = $2
            RETURNING *
            "#,
        )
        .bind(Utc::now())
        .bind(request_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(updated)
    }

    /// Search requests under the given scope, newest first
    pub async fn search(
        &self,
        filter: &ScopeFilter,
        query: &LoanRequestQuery,
    ) -> AppResult<(Vec<LoanRequestDetails>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let mut conditions = vec!["TRUE".to_string()];
        let mut params: Vec<String> = Vec::new();

        if let Some(status) = query.status {
            params.push(status.as_str().to_string());
            conditions.push(format!("r.status = ${}", params.len()));
        }

        // Requests are audit history and never soft-deleted; scope the
        // deleted filter on the joined book instead.
        let campus_bind =
            filter.push_conditions(&mut conditions, "r.campus_id", "b.is_deleted", params.len());

        let where_clause = conditions.join(" AND ");

        let count_query = format!(
            "SELECT COUNT(*) FROM book_loan_requests r JOIN books b ON r.book_id = b.id WHERE {}",
            where_clause
        );
        let mut count = sqlx::query_scalar::<_, i64>(&count_query);
        for p in &params {
            count = count.bind(p);
        }
        if let Some(campus_id) = campus_bind {
            count = count.bind(campus_id);
        }
        let total = count.fetch_one(&self.pool).await?;

        let select_query = format!(
            "{} WHERE {} ORDER BY r.created_at DESC LIMIT {} OFFSET {}",
            DETAILS_SELECT, where_clause, per_page, offset
        );
        let mut select = sqlx::query(&select_query);
        for p in &params {
            select = select.bind(p);
        }
        if let Some(campus_id) = campus_bind {
            select = select.bind(campus_id);
        }
        let rows = select.fetch_all(&self.pool).await?;

        Ok((rows.iter().map(details_from_row).collect(), total))
    }

    /// All requests submitted by one user, newest first
    pub async fn list_for_requester(&self, requester_id: i32) -> AppResult<Vec<LoanRequestDetails>> {
        let query = format!(
            "{} WHERE r.requester_id = $1 ORDER BY r.created_at DESC",
            DETAILS_SELECT
        );
        let rows = sqlx::query(&query)
            .bind(requester_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(details_from_row).collect())
    }

    /// Count pending requests under the given scope
    pub async fn count_pending(&self, filter: &ScopeFilter) -> AppResult<i64> {
        let mut conditions = vec!["r.status = 'pending'".to_string()];
        let campus_bind =
            filter.push_conditions(&mut conditions, "r.campus_id", "b.is_deleted", 0);
        let query = format!(
            "SELECT COUNT(*) FROM book_loan_requests r JOIN books b ON r.book_id = b.id WHERE {}",
            conditions.join(" AND ")
        );

        let mut count = sqlx::query_scalar::<_, i64>(&query);
        if let Some(campus_id) = campus_bind {
            count = count.bind(campus_id);
        }
        Ok(count.fetch_one(&self.pool).await?)
    }
}

/// Lock the request row, re-reading its current state
async fn lock_request(
    tx: &mut Transaction<'_, Postgres>,
    request_id: i32,
) -> AppResult<LoanRequest> {
    sqlx::query_as::<_, LoanRequest>(
        "SELECT * FROM book_loan_requests WHERE id = $1 FOR UPDATE",
    )
    .bind(request_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Loan request with id {} not found", request_id)))
}

/// Terminal states are immutable; only a pending request may transition
fn ensure_pending(request: &LoanRequest) -> AppResult<()> {
    if request.is_pending() {
        Ok(())
    } else {
        Err(AppError::validation_code(
            "request",
            ErrorCode::AlreadyProcessed,
            "Request has already been processed",
        ))
    }
}

/// Lock the book row referenced by a request
async fn lock_book(tx: &mut Transaction<'_, Postgres>, book_id: i32) -> AppResult<Book> {
    sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
        .bind(book_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book_id)))
}

fn details_from_row(row: &sqlx::postgres::PgRow) -> LoanRequestDetails {
    let request = LoanRequest {
        id: row.get("id"),
        book_id: row.get("book_id"),
        requester_id: row.get("requester_id"),
        approver_id: row.get("approver_id"),
        campus_id: row.get("campus_id"),
        status: row.get("status"),
        decided_at: row.get("decided_at"),
        created_at: row.get("created_at"),
    };
    LoanRequestDetails::from_request(&request, row.get("book_title"), row.get("requester_name"))
}
