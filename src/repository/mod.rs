//! Repository layer for database operations

pub mod bookcases;
pub mod books;
pub mod campuses;
pub mod categories;
pub mod loan_requests;
pub mod loans;
pub mod users;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub books: books::BooksRepository,
    pub users: users::UsersRepository,
    pub campuses: campuses::CampusesRepository,
    pub categories: categories::CategoriesRepository,
    pub bookcases: bookcases::BookcasesRepository,
    pub loans: loans::LoansRepository,
    pub loan_requests: loan_requests::LoanRequestsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: books::BooksRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            campuses: campuses::CampusesRepository::new(pool.clone()),
            categories: categories::CategoriesRepository::new(pool.clone()),
            bookcases: bookcases::BookcasesRepository::new(pool.clone()),
            loans: loans::LoansRepository::new(pool.clone()),
            loan_requests: loan_requests::LoanRequestsRepository::new(pool.clone()),
            pool,
        }
    }
}
