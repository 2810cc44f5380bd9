//! Loans repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult, ErrorCode},
    models::loan::{BookLoan, LoanDetails, LoanQuery, LoanStatus},
    policy::ScopeFilter,
};

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

const DETAILS_SELECT: &str = r#"
    SELECT l.id, l.book_id, b.title AS book_title, l.user_id, u.display_name AS user_name,
           l.campus_id, l.return_date, l.returned_at, l.status
    FROM book_loans l
    JOIN books b ON l.book_id = b.id
    JOIN users u ON l.user_id = u.id
"#;

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<BookLoan> {
        sqlx::query_as::<_, BookLoan>("SELECT * FROM book_loans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// Get display details for a single loan
    pub async fn details(&self, id: i32) -> AppResult<LoanDetails> {
        let query = format!("{} WHERE l.id = $1", DETAILS_SELECT);
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))?;

        Ok(details_from_row(&row))
    }

    /// Search loans under the given scope, newest first
    pub async fn search(
        &self,
        filter: &ScopeFilter,
        query: &LoanQuery,
    ) -> AppResult<(Vec<LoanDetails>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let mut conditions = vec!["TRUE".to_string()];
        let mut params: Vec<String> = Vec::new();

        if let Some(status) = query.status {
            params.push(status.as_str().to_string());
            conditions.push(format!("l.status = ${}", params.len()));
        }

        let campus_bind =
            filter.push_conditions(&mut conditions, "l.campus_id", "l.is_deleted", params.len());

        let where_clause = conditions.join(" AND ");

        let count_query = format!(
            "SELECT COUNT(*) FROM book_loans l WHERE {}",
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
            "{} WHERE {} ORDER BY l.created_at DESC LIMIT {} OFFSET {}",
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

    /// Loans of one user, current and historical, oldest first
    pub async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<LoanDetails>> {
        let query = format!(
            "{} WHERE l.user_id = $1 AND l.is_deleted = FALSE ORDER BY l.created_at",
            DETAILS_SELECT
        );
        let rows = sqlx::query(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(details_from_row).collect())
    }

    /// Move a processing loan to a terminal state and restore the book's
    /// availability, atomically.
    ///
    /// Lock order matches the decision protocol: loan row first, then the
    /// book row. The availability flip and the status transition commit
    /// together or not at all.
    pub async fn close(&self, loan_id: i32, to: LoanStatus) -> AppResult<BookLoan> {
        debug_assert!(to.is_terminal());

        let mut tx = self.pool.begin().await?;

        let loan = sqlx::query_as::<_, BookLoan>(
            "SELECT * FROM book_loans WHERE id = $1 FOR UPDATE",
        )
        .bind(loan_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", loan_id)))?;

        if loan.status.is_terminal() {
            return Err(AppError::validation_code(
                "loan",
                ErrorCode::AlreadyProcessed,
                "Loan has already been closed",
            ));
        }

        sqlx::query("SELECT id FROM books WHERE id = $1 FOR UPDATE")
            .bind(loan.book_id)
            .fetch_one(&mut *tx)
            .await?;

        let now = Utc::now();
        let updated = sqlx::query_as::<_, BookLoan>(
            "UPDATE book_loans SET status = $1, returned_at = $2 WHERE id = $3 RETURNING *",
        )
        .bind(to)
        .bind(now)
        .bind(loan_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE books SET is_available = TRUE, updated_at = $1 WHERE id = $2")
            .bind(now)
            .bind(loan.book_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(updated)
    }

    /// Count active loans under the given scope
    pub async fn count_active(&self, filter: &ScopeFilter) -> AppResult<i64> {
        let mut conditions = vec!["status = 'processing'".to_string()];
        let campus_bind = filter.push_conditions(&mut conditions, "campus_id", "is_deleted", 0);
        let query = format!(
            "SELECT COUNT(*) FROM book_loans WHERE {}",
            conditions.join(" AND ")
        );

        let mut count = sqlx::query_scalar::<_, i64>(&query);
        if let Some(campus_id) = campus_bind {
            count = count.bind(campus_id);
        }
        Ok(count.fetch_one(&self.pool).await?)
    }

    /// Count overdue loans under the given scope
    pub async fn count_overdue(&self, filter: &ScopeFilter) -> AppResult<i64> {
        let mut conditions = vec![
            "status = 'processing'".to_string(),
            "return_date < NOW()".to_string(),
        ];
        let campus_bind = filter.push_conditions(&mut conditions, "campus_id", "is_deleted", 0);
        let query = format!(
            "SELECT COUNT(*) FROM book_loans WHERE {}",
            conditions.join(" AND ")
        );

        let mut count = sqlx::query_scalar::<_, i64>(&query);
        if let Some(campus_id) = campus_bind {
            count = count.bind(campus_id);
        }
        Ok(count.fetch_one(&self.pool).await?)
    }
}

fn details_from_row(row: &sqlx::postgres::PgRow) -> LoanDetails {
    let status: LoanStatus = row.get("status");
    let return_date: chrono::DateTime<Utc> = row.get("return_date");

    LoanDetails {
        id: row.get("id"),
        book_id: row.get("book_id"),
        book_title: row.get("book_title"),
        user_id: row.get("user_id"),
        user_name: row.get("user_name"),
        campus_id: row.get("campus_id"),
        return_date,
        returned_at: row.get("returned_at"),
        status,
        is_overdue: status == LoanStatus::Processing && return_date < Utc::now(),
    }
}
