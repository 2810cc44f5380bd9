//! Category model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Book category from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Category {
    pub id: i32,
    pub name: String,
    /// Campus owning the category; `None` for network-wide categories
    pub campus_id: Option<i32>,
}

/// Create category request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCategory {
    #[validate(length(min = 1, message = "Category name is required"))]
    pub name: String,
    pub campus_id: Option<i32>,
}

/// Update category request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCategory {
    #[validate(length(min = 1, message = "Category name is required"))]
    pub name: Option<String>,
    pub campus_id: Option<i32>,
}
