//! Book (catalog entry) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::policy::ScopeRequest;

/// Catalog item kind, stored as text in the `books` table.
///
/// Only physical books move through the loan-request workflow; ebooks are
/// catalog-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookKind {
    Physical,
    Ebook,
}

impl BookKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookKind::Physical => "physical",
            BookKind::Ebook => "ebook",
        }
    }
}

impl std::fmt::Display for BookKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BookKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "physical" => Ok(BookKind::Physical),
            "ebook" => Ok(BookKind::Ebook),
            _ => Err(format!("Invalid book kind: {}", s)),
        }
    }
}

// SQLx conversion for BookKind
impl sqlx::Type<Postgres> for BookKind {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for BookKind {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for BookKind {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub kind: BookKind,
    pub campus_id: i32,
    pub category_id: Option<i32>,
    pub shelf_id: Option<i32>,
    /// Single source of truth for "can this book be requested/loaned".
    /// Mutated only by the loan-request and loan subsystems.
    pub is_available: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// A book can enter the loan-request workflow only if it is a physical,
    /// non-deleted catalog entry.
    pub fn is_requestable(&self) -> bool {
        self.kind == BookKind::Physical && !self.is_deleted
    }
}

/// Book query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct BookQuery {
    pub title: Option<String>,
    pub kind: Option<BookKind>,
    pub category_id: Option<i32>,
    pub available: Option<bool>,
    pub scope: Option<ScopeRequest>,
    pub include_deleted: Option<bool>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub author: Option<String>,
    #[validate(length(min = 10, max = 17, message = "Invalid ISBN"))]
    pub isbn: Option<String>,
    pub kind: BookKind,
    pub campus_id: i32,
    pub category_id: Option<i32>,
    pub shelf_id: Option<i32>,
}

/// Update book request.
///
/// `is_available` is accepted for the manual correction flow but is guarded:
/// it cannot be forced to `true` while a processing loan exists.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: Option<String>,
    pub author: Option<String>,
    #[validate(length(min = 10, max = 17, message = "Invalid ISBN"))]
    pub isbn: Option<String>,
    pub category_id: Option<i32>,
    pub shelf_id: Option<i32>,
    pub is_available: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn book(kind: BookKind, is_deleted: bool) -> Book {
        Book {
            id: 1,
            title: "Test".to_string(),
            author: None,
            isbn: None,
            kind,
            campus_id: 1,
            category_id: None,
            shelf_id: None,
            is_available: true,
            is_deleted,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn only_live_physical_books_are_requestable() {
        assert!(book(BookKind::Physical, false).is_requestable());
        assert!(!book(BookKind::Ebook, false).is_requestable());
        assert!(!book(BookKind::Physical, true).is_requestable());
    }
}
