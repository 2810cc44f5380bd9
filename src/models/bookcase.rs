//! Bookcase and shelf models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Bookcase model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Bookcase {
    pub id: i32,
    pub campus_id: i32,
    pub name: String,
    /// Free-form placement hint ("west wing, 2nd floor")
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Shelf within a bookcase
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Shelf {
    pub id: i32,
    pub bookcase_id: i32,
    pub name: String,
    /// Ordering position within the bookcase, top to bottom
    pub position: i16,
}

/// Create bookcase request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBookcase {
    pub campus_id: i32,
    #[validate(length(min = 1, message = "Bookcase name is required"))]
    pub name: String,
    pub location: Option<String>,
}

/// Update bookcase request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBookcase {
    #[validate(length(min = 1, message = "Bookcase name is required"))]
    pub name: Option<String>,
    pub location: Option<String>,
}

/// Create shelf request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateShelf {
    #[validate(length(min = 1, message = "Shelf name is required"))]
    pub name: String,
    pub position: i16,
}
