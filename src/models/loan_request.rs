//! Loan request model: a regular user's ask to borrow a physical book,
//! pending staff approval.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};

use crate::policy::ScopeRequest;

/// Request status slugs, stored as text in the `book_loan_requests` table.
///
/// Transitions are pending → approved or pending → rejected only; terminal
/// states are immutable. A requester cancellation also lands in `rejected`,
/// with a NULL approver (see [`LoanRequest::outcome`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(RequestStatus::Pending),
            "approved" => Ok(RequestStatus::Approved),
            "rejected" => Ok(RequestStatus::Rejected),
            _ => Err(format!("Invalid request status: {}", s)),
        }
    }
}

// SQLx conversion for RequestStatus
impl sqlx::Type<Postgres> for RequestStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for RequestStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for RequestStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Who rejected a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectedBy {
    Staff(i32),
    Requester,
}

/// Decided lifecycle state of a request, derived from the stored columns.
///
/// The "canceled by requester" case is not a stored flag; it is exactly
/// `status = rejected AND approver_id IS NULL`. Call sites match on this
/// variant instead of re-deriving the nullability rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Pending,
    Approved { approver_id: i32 },
    Rejected(RejectedBy),
}

/// Loan request model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LoanRequest {
    pub id: i32,
    pub book_id: i32,
    pub requester_id: i32,
    pub approver_id: Option<i32>,
    pub campus_id: i32,
    pub status: RequestStatus,
    pub decided_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl LoanRequest {
    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    /// Derive the tagged outcome from the stored (status, approver) pair
    pub fn outcome(&self) -> RequestOutcome {
        match (self.status, self.approver_id) {
            (RequestStatus::Pending, _) => RequestOutcome::Pending,
            (RequestStatus::Approved, Some(approver_id)) => {
                RequestOutcome::Approved { approver_id }
            }
            // An approved request always has an approver; a missing one can
            // only come from manual data edits, treat it as staff-less.
            (RequestStatus::Approved, None) => RequestOutcome::Approved { approver_id: 0 },
            (RequestStatus::Rejected, Some(approver_id)) => {
                RequestOutcome::Rejected(RejectedBy::Staff(approver_id))
            }
            (RequestStatus::Rejected, None) => RequestOutcome::Rejected(RejectedBy::Requester),
        }
    }

    pub fn canceled_by_requester(&self) -> bool {
        matches!(self.outcome(), RequestOutcome::Rejected(RejectedBy::Requester))
    }
}

/// Loan request with display details for list views and event payloads
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoanRequestDetails {
    pub id: i32,
    pub book_id: i32,
    pub book_title: String,
    pub requester_id: i32,
    pub requester_name: String,
    pub approver_id: Option<i32>,
    pub campus_id: i32,
    pub status: RequestStatus,
    pub canceled_by_requester: bool,
    pub decided_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl LoanRequestDetails {
    /// Build the display view from a request row plus its joined names.
    /// The cancel/reject distinction comes from [`LoanRequest::outcome`].
    pub fn from_request(request: &LoanRequest, book_title: String, requester_name: String) -> Self {
        Self {
            id: request.id,
            book_id: request.book_id,
            book_title,
            requester_id: request.requester_id,
            requester_name,
            approver_id: request.approver_id,
            campus_id: request.campus_id,
            status: request.status,
            canceled_by_requester: request.canceled_by_requester(),
            decided_at: request.decided_at,
            created_at: request.created_at,
        }
    }
}

/// A staff/admin decision over a pending request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approved,
    Rejected,
}

/// Decide request body
#[derive(Debug, Deserialize, ToSchema)]
pub struct DecideRequest {
    pub decision: Decision,
}

/// Loan request query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct LoanRequestQuery {
    pub status: Option<RequestStatus>,
    pub scope: Option<ScopeRequest>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(status: RequestStatus, approver_id: Option<i32>) -> LoanRequest {
        LoanRequest {
            id: 1,
            book_id: 10,
            requester_id: 20,
            approver_id,
            campus_id: 1,
            status,
            decided_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn outcome_distinguishes_cancel_from_staff_rejection() {
        let canceled = request(RequestStatus::Rejected, None);
        assert_eq!(
            canceled.outcome(),
            RequestOutcome::Rejected(RejectedBy::Requester)
        );
        assert!(canceled.canceled_by_requester());

        let rejected = request(RequestStatus::Rejected, Some(7));
        assert_eq!(
            rejected.outcome(),
            RequestOutcome::Rejected(RejectedBy::Staff(7))
        );
        assert!(!rejected.canceled_by_requester());
    }

    #[test]
    fn approved_outcome_carries_the_approver() {
        let approved = request(RequestStatus::Approved, Some(5));
        assert_eq!(approved.outcome(), RequestOutcome::Approved { approver_id: 5 });
        assert!(!approved.canceled_by_requester());
    }

    #[test]
    fn pending_outcome_is_pending() {
        assert_eq!(request(RequestStatus::Pending, None).outcome(), RequestOutcome::Pending);
    }
}
