//! Catalog service: books, categories, campuses, bookcases and shelves

use validator::Validate;

use crate::{
    error::{AppError, AppResult, ErrorCode},
    models::{
        book::{Book, BookQuery, CreateBook, UpdateBook},
        bookcase::{Bookcase, CreateBookcase, CreateShelf, Shelf, UpdateBookcase},
        campus::{Campus, CreateCampus, UpdateCampus},
        category::{Category, CreateCategory, UpdateCategory},
        user::UserClaims,
    },
    policy::ScopeFilter,
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    // --- Books ---

    pub async fn search_books(
        &self,
        claims: &UserClaims,
        query: &BookQuery,
    ) -> AppResult<(Vec<Book>, i64)> {
        let filter = ScopeFilter::scope_for(
            Some(claims),
            query.scope,
            query.include_deleted.unwrap_or(false),
        );
        self.repository.books.search(&filter, query).await
    }

    pub async fn get_book(&self, id: i32, claims: &UserClaims) -> AppResult<Book> {
        let book = self.repository.books.get_by_id(id).await?;
        let filter = ScopeFilter::scope_for(Some(claims), None, false);
        // A reader probing another campus sees "not found", not "forbidden"
        if claims.role == crate::models::Role::RegularUser
            && !filter.permits(book.campus_id, book.is_deleted)
        {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(book)
    }

    pub async fn create_book(&self, book: CreateBook) -> AppResult<Book> {
        book.validate()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        self.repository.campuses.get_by_id(book.campus_id).await?;
        self.repository.books.create(&book).await
    }

    /// Update a book's catalog fields.
    ///
    /// Ledger guard: `is_available` cannot be forced back to true while a
    /// processing loan exists; only the loan return/cancel path may do that.
    pub async fn update_book(&self, id: i32, update: UpdateBook) -> AppResult<Book> {
        update
            .validate()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        if update.is_available == Some(true)
            && self.repository.books.has_processing_loan(id).await?
        {
            return Err(AppError::validation_code(
                "book",
                ErrorCode::BookNotAvailable,
                "Cannot mark a book available while a loan is active",
            ));
        }

        self.repository.books.update(id, &update).await
    }

    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.soft_delete(id).await
    }

    // --- Campuses ---

    pub async fn list_campuses(&self) -> AppResult<Vec<Campus>> {
        self.repository.campuses.list().await
    }

    pub async fn get_campus(&self, id: i32) -> AppResult<Campus> {
        self.repository.campuses.get_by_id(id).await
    }

    pub async fn create_campus(&self, campus: CreateCampus) -> AppResult<Campus> {
        campus
            .validate()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        self.repository.campuses.create(&campus).await
    }

    pub async fn update_campus(&self, id: i32, update: UpdateCampus) -> AppResult<Campus> {
        update
            .validate()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        self.repository.campuses.update(id, &update).await
    }

    // --- Categories ---

    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        self.repository.categories.list().await
    }

    pub async fn create_category(&self, category: CreateCategory) -> AppResult<Category> {
        category
            .validate()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        self.repository.categories.create(&category).await
    }

    pub async fn update_category(&self, id: i32, update: UpdateCategory) -> AppResult<Category> {
        update
            .validate()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        self.repository.categories.update(id, &update).await
    }

    pub async fn delete_category(&self, id: i32) -> AppResult<()> {
        self.repository.categories.delete(id).await
    }

    // --- Bookcases & shelves ---

    pub async fn list_bookcases(&self, claims: &UserClaims) -> AppResult<Vec<Bookcase>> {
        let filter = ScopeFilter::scope_for(Some(claims), None, false);
        let campus_id = match filter {
            ScopeFilter::Rows { campus_id, .. } => campus_id,
            ScopeFilter::DenyAll => return Ok(Vec::new()),
        };
        self.repository.bookcases.list(campus_id).await
    }

    pub async fn get_bookcase(&self, id: i32) -> AppResult<Bookcase> {
        self.repository.bookcases.get_by_id(id).await
    }

    pub async fn create_bookcase(&self, bookcase: CreateBookcase) -> AppResult<Bookcase> {
        bookcase
            .validate()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        self.repository.campuses.get_by_id(bookcase.campus_id).await?;
        self.repository.bookcases.create(&bookcase).await
    }

    pub async fn update_bookcase(&self, id: i32, update: UpdateBookcase) -> AppResult<Bookcase> {
        update
            .validate()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        self.repository.bookcases.update(id, &update).await
    }

    pub async fn delete_bookcase(&self, id: i32) -> AppResult<()> {
        self.repository.bookcases.delete(id).await
    }

    pub async fn list_shelves(&self, bookcase_id: i32) -> AppResult<Vec<Shelf>> {
        self.repository.bookcases.get_by_id(bookcase_id).await?;
        self.repository.bookcases.list_shelves(bookcase_id).await
    }

    pub async fn create_shelf(&self, bookcase_id: i32, shelf: CreateShelf) -> AppResult<Shelf> {
        shelf
            .validate()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        self.repository.bookcases.get_by_id(bookcase_id).await?;
        self.repository.bookcases.create_shelf(bookcase_id, &shelf).await
    }

    pub async fn delete_shelf(&self, shelf_id: i32) -> AppResult<()> {
        self.repository.bookcases.delete_shelf(shelf_id).await
    }
}
