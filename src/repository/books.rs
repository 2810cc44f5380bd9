//! Books repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookQuery, CreateBook, UpdateBook},
    policy::ScopeFilter,
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Search books with campus scope and pagination
    pub async fn search(&self, filter: &ScopeFilter, query: &BookQuery) -> AppResult<(Vec<Book>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let mut conditions = vec!["TRUE".to_string()];
        let mut text_params: Vec<String> = Vec::new();

        if let Some(ref title) = query.title {
            text_params.push(format!("%{}%", title.to_lowercase()));
            conditions.push(format!("LOWER(title) LIKE ${}", text_params.len()));
        }
        if let Some(kind) = query.kind {
            text_params.push(kind.as_str().to_string());
            conditions.push(format!("kind = ${}", text_params.len()));
        }
        if let Some(category_id) = query.category_id {
            conditions.push(format!("category_id = {}", category_id));
        }
        if let Some(available) = query.available {
            conditions.push(format!("is_available = {}", available));
        }

        let campus_bind = filter.push_conditions(
            &mut conditions,
            "campus_id",
            "is_deleted",
            text_params.len(),
        );

        let where_clause = conditions.join(" AND ");

        let count_query = format!("SELECT COUNT(*) FROM books WHERE {}", where_clause);
        let mut count = sqlx::query_scalar::<_, i64>(&count_query);
        for p in &text_params {
            count = count.bind(p);
        }
        if let Some(campus_id) = campus_bind {
            count = count.bind(campus_id);
        }
        let total = count.fetch_one(&self.pool).await?;

        let select_query = format!(
            "SELECT * FROM books WHERE {} ORDER BY title LIMIT {} OFFSET {}",
            where_clause, per_page, offset
        );
        let mut select = sqlx::query_as::<_, Book>(&select_query);
        for p in &text_params {
            select = select.bind(p);
        }
        if let Some(campus_id) = campus_bind {
            select = select.bind(campus_id);
        }
        let books = select.fetch_all(&self.pool).await?;

        Ok((books, total))
    }

    /// Create a new book; new catalog entries start available
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let now = Utc::now();
        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, isbn, kind, campus_id, category_id, shelf_id,
                               is_available, is_deleted, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, TRUE, FALSE, $8, $8)
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(book.kind)
        .bind(book.campus_id)
        .bind(book.category_id)
        .bind(book.shelf_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Update a book's catalog fields.
    ///
    /// The caller (service) enforces the availability-ledger guard before
    /// allowing `is_available` through here.
    pub async fn update(&self, id: i32, update: &UpdateBook) -> AppResult<Book> {
        let now = Utc::now();
        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books SET
                title = COALESCE($1, title),
                author = COALESCE($2, author),
                isbn = COALESCE($3, isbn),
                category_id = COALESCE($4, category_id),
                shelf_id = COALESCE($5, shelf_id),
                is_available = COALESCE($6, is_available),
                updated_at = $7
            WHERE id = $8
            RETURNING *
            "#,
        )
        .bind(&update.title)
        .bind(&update.author)
        .bind(&update.isbn)
        .bind(update.category_id)
        .bind(update.shelf_id)
        .bind(update.is_available)
        .bind(now)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Soft-delete a book (kept while referenced by loans and requests)
    pub async fn soft_delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("UPDATE books SET is_deleted = TRUE, updated_at = $1 WHERE id = $2")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }

    /// Whether an active (processing) loan exists for this book
    pub async fn has_processing_loan(&self, book_id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM book_loans WHERE book_id = $1 AND status = 'processing')",
        )
        .bind(book_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Count books visible under the given scope
    pub async fn count(&self, filter: &ScopeFilter) -> AppResult<i64> {
        let mut conditions = vec!["TRUE".to_string()];
        let campus_bind = filter.push_conditions(&mut conditions, "campus_id", "is_deleted", 0);
        let query = format!("SELECT COUNT(*) FROM books WHERE {}", conditions.join(" AND "));

        let mut count = sqlx::query_scalar::<_, i64>(&query);
        if let Some(campus_id) = campus_bind {
            count = count.bind(campus_id);
        }
        Ok(count.fetch_one(&self.pool).await?)
    }
}
