//! Bookcases and shelves repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::bookcase::{Bookcase, CreateBookcase, CreateShelf, Shelf, UpdateBookcase},
};

#[derive(Clone)]
pub struct BookcasesRepository {
    pool: Pool<Postgres>,
}

impl BookcasesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Bookcase> {
        sqlx::query_as::<_, Bookcase>("SELECT * FROM bookcases WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Bookcase with id {} not found", id)))
    }

    /// List bookcases, optionally restricted to one campus
    pub async fn list(&self, campus_id: Option<i32>) -> AppResult<Vec<Bookcase>> {
        let bookcases = if let Some(campus_id) = campus_id {
            sqlx::query_as::<_, Bookcase>(
                "SELECT * FROM bookcases WHERE campus_id = $1 ORDER BY name",
            )
            .bind(campus_id)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, Bookcase>("SELECT * FROM bookcases ORDER BY name")
                .fetch_all(&self.pool)
                .await?
        };
        Ok(bookcases)
    }

    pub async fn create(&self, bookcase: &CreateBookcase) -> AppResult<Bookcase> {
        let created = sqlx::query_as::<_, Bookcase>(
            r#"
            INSERT INTO bookcases (campus_id, name, location, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(bookcase.campus_id)
        .bind(&bookcase.name)
        .bind(&bookcase.location)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn update(&self, id: i32, update: &UpdateBookcase) -> AppResult<Bookcase> {
        sqlx::query_as::<_, Bookcase>(
            r#"
            UPDATE bookcases SET
                name = COALESCE($1, name),
                location = COALESCE($2, location)
            WHERE id = $3
            RETURNING *
            "#,
        )
        .bind(&update.name)
        .bind(&update.location)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Bookcase with id {} not found", id)))
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM bookcases WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Bookcase with id {} not found", id)));
        }
        Ok(())
    }

    /// List shelves of a bookcase in position order
    pub async fn list_shelves(&self, bookcase_id: i32) -> AppResult<Vec<Shelf>> {
        let shelves = sqlx::query_as::<_, Shelf>(
            "SELECT * FROM shelves WHERE bookcase_id = $1 ORDER BY position",
        )
        .bind(bookcase_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(shelves)
    }

    pub async fn create_shelf(&self, bookcase_id: i32, shelf: &CreateShelf) -> AppResult<Shelf> {
        let created = sqlx::query_as::<_, Shelf>(
            "INSERT INTO shelves (bookcase_id, name, position) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(bookcase_id)
        .bind(&shelf.name)
        .bind(shelf.position)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    pub async fn delete_shelf(&self, shelf_id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM shelves WHERE id = $1")
            .bind(shelf_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Shelf with id {} not found", shelf_id)));
        }
        Ok(())
    }
}
