//! Loan (borrow) model and related types

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};

use crate::policy::ScopeRequest;

/// Loan period in days. Fixed policy, no configuration surface.
pub const LOAN_PERIOD_DAYS: i64 = 14;

/// Compute the due date for a loan created at `from`
pub fn return_date_from(from: DateTime<Utc>) -> DateTime<Utc> {
    from + Duration::days(LOAN_PERIOD_DAYS)
}

/// Loan status slugs, stored as text in the `book_loans` table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Processing,
    Returned,
    Canceled,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Processing => "processing",
            LoanStatus::Returned => "returned",
            LoanStatus::Canceled => "canceled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, LoanStatus::Processing)
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "processing" => Ok(LoanStatus::Processing),
            "returned" => Ok(LoanStatus::Returned),
            "canceled" => Ok(LoanStatus::Canceled),
            _ => Err(format!("Invalid loan status: {}", s)),
        }
    }
}

// SQLx conversion for LoanStatus
impl sqlx::Type<Postgres> for LoanStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for LoanStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for LoanStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Loan model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookLoan {
    pub id: i32,
    pub book_id: i32,
    pub user_id: i32,
    pub campus_id: i32,
    pub return_date: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub status: LoanStatus,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

/// Loan with display details for list views
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoanDetails {
    pub id: i32,
    pub book_id: i32,
    pub book_title: String,
    pub user_id: i32,
    pub user_name: String,
    pub campus_id: i32,
    pub return_date: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub status: LoanStatus,
    pub is_overdue: bool,
}

/// Loan query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct LoanQuery {
    pub status: Option<LoanStatus>,
    pub scope: Option<ScopeRequest>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn return_date_is_fourteen_days_out() {
        let now = Utc::now();
        assert_eq!(return_date_from(now) - now, Duration::days(14));
    }

    #[test]
    fn only_processing_is_non_terminal() {
        assert!(!LoanStatus::Processing.is_terminal());
        assert!(LoanStatus::Returned.is_terminal());
        assert!(LoanStatus::Canceled.is_terminal());
    }
}
