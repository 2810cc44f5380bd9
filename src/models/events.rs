//! Domain events produced by the loan subsystem.
//!
//! Events carry the already-serialized request and loan views so consumers
//! never touch the database. Delivery is fire-and-forget; see
//! `services::events`.

use serde::{Deserialize, Serialize};

use super::loan::LoanDetails;
use super::loan_request::LoanRequestDetails;

/// Event: a regular user created a loan request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanRequestCreated {
    pub request: LoanRequestDetails,
}

/// Event: a pending request was decided (approved, rejected or canceled)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanRequestDecided {
    pub request: LoanRequestDetails,
    /// The loan created by an approval, if any
    pub loan: Option<LoanDetails>,
}

/// Event: an active loan reached a terminal state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanClosed {
    pub loan: LoanDetails,
}

/// Domain event union type
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DomainEvent {
    LoanRequestCreated(LoanRequestCreated),
    LoanRequestDecided(LoanRequestDecided),
    LoanClosed(LoanClosed),
}

impl DomainEvent {
    /// Event type discriminator for logs and consumers
    pub fn kind(&self) -> &'static str {
        match self {
            DomainEvent::LoanRequestCreated(_) => "loan_request.created",
            DomainEvent::LoanRequestDecided(_) => "loan_request.decided",
            DomainEvent::LoanClosed(_) => "loan.closed",
        }
    }
}
