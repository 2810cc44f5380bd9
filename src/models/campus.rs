//! Campus model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Campus model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Campus {
    pub id: i32,
    pub name: String,
    /// Short code used in barcodes and exports
    pub code: String,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Create campus request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCampus {
    #[validate(length(min = 1, message = "Campus name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 8, message = "Campus code must be 1-8 characters"))]
    pub code: String,
    pub address: Option<String>,
}

/// Update campus request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCampus {
    pub name: Option<String>,
    #[validate(length(min = 1, max = 8, message = "Campus code must be 1-8 characters"))]
    pub code: Option<String>,
    pub address: Option<String>,
}
