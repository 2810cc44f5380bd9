//! Campuses repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::campus::{Campus, CreateCampus, UpdateCampus},
};

#[derive(Clone)]
pub struct CampusesRepository {
    pool: Pool<Postgres>,
}

impl CampusesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Campus> {
        sqlx::query_as::<_, Campus>("SELECT * FROM campuses WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Campus with id {} not found", id)))
    }

    pub async fn list(&self) -> AppResult<Vec<Campus>> {
        let campuses = sqlx::query_as::<_, Campus>("SELECT * FROM campuses ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(campuses)
    }

    pub async fn create(&self, campus: &CreateCampus) -> AppResult<Campus> {
        sqlx::query_as::<_, Campus>(
            r#"
            INSERT INTO campuses (name, code, address, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&campus.name)
        .bind(&campus.code)
        .bind(&campus.address)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(unique_to_conflict)
    }

    pub async fn update(&self, id: i32, update: &UpdateCampus) -> AppResult<Campus> {
        sqlx::query_as::<_, Campus>(
            r#"
            UPDATE campuses SET
                name = COALESCE($1, name),
                code = COALESCE($2, code),
                address = COALESCE($3, address)
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(&update.name)
        .bind(&update.code)
        .bind(&update.address)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unique_to_conflict)?
        .ok_or_else(|| AppError::NotFound(format!("Campus with id {} not found", id)))
    }
}

fn unique_to_conflict(e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::Database(db) if db.constraint().is_some() => {
            AppError::Conflict("Campus name or code already exists".to_string())
        }
        other => AppError::Database(other),
    }
}
