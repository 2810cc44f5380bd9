//! Users repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, UpdateUser, User, UserQuery, UserShort},
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 AND is_deleted = FALSE")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Get user by login (authentication lookup)
    pub async fn get_by_login(&self, login: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE LOWER(login) = LOWER($1) AND is_deleted = FALSE",
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Check if login already exists
    pub async fn login_exists(&self, login: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(login) = LOWER($1) AND id != $2)",
            )
            .bind(login)
            .bind(id)
            .fetch_one(&self.pool)
            .await?
        } else {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(login) = LOWER($1))")
                .bind(login)
                .fetch_one(&self.pool)
                .await?
        };
        Ok(exists)
    }

    /// Search users with pagination
    pub async fn search(&self, query: &UserQuery) -> AppResult<(Vec<UserShort>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let mut conditions = vec!["is_deleted = FALSE".to_string()];
        let mut params: Vec<String> = Vec::new();

        if let Some(ref name) = query.name {
            params.push(format!("%{}%", name.to_lowercase()));
            conditions.push(format!(
                "(LOWER(display_name) LIKE ${} OR LOWER(login) LIKE ${})",
                params.len(),
                params.len()
            ));
        }
        if let Some(role) = query.role {
            params.push(role.as_str().to_string());
            conditions.push(format!("role = ${}", params.len()));
        }

        let where_clause = conditions.join(" AND ");

        let count_query = format!("SELECT COUNT(*) FROM users WHERE {}", where_clause);
        let mut count = sqlx::query_scalar::<_, i64>(&count_query);
        for p in &params {
            count = count.bind(p);
        }
        let total = count.fetch_one(&self.pool).await?;

        let select_query = format!(
            "SELECT id, display_name, role, campus_id FROM users WHERE {} ORDER BY display_name LIMIT {} OFFSET {}",
            where_clause, per_page, offset
        );
        let mut select = sqlx::query_as::<_, UserShort>(&select_query);
        for p in &params {
            select = select.bind(p);
        }
        let users = select.fetch_all(&self.pool).await?;

        Ok((users, total))
    }

    /// Create a new user; `password_hash` is produced by the service
    pub async fn create(&self, user: &CreateUser, password_hash: &str) -> AppResult<User> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (login, password, display_name, email, role, campus_id, is_deleted, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, FALSE, $7)
            RETURNING *
            "#,
        )
        .bind(&user.login)
        .bind(password_hash)
        .bind(&user.display_name)
        .bind(&user.email)
        .bind(user.role)
        .bind(user.campus_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Update an existing user; `password_hash` replaces the stored hash when set
    pub async fn update(
        &self,
        id: i32,
        update: &UpdateUser,
        password_hash: Option<String>,
    ) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                login = COALESCE($1, login),
                password = COALESCE($2, password),
                display_name = COALESCE($3, display_name),
                email = COALESCE($4, email),
                role = COALESCE($5, role),
                campus_id = COALESCE($6, campus_id)
            WHERE id = $7 AND is_deleted = FALSE
            RETURNING *
            "#,
        )
        .bind(&update.login)
        .bind(password_hash)
        .bind(&update.display_name)
        .bind(&update.email)
        .bind(update.role)
        .bind(update.campus_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Soft-delete a user
    pub async fn soft_delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("UPDATE users SET is_deleted = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }
        Ok(())
    }
}
