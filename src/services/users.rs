//! User management and authentication service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{CreateUser, UpdateUser, User, UserClaims, UserQuery, UserShort},
    repository::Repository,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate by login and password, returning a JWT token
    pub async fn authenticate(&self, login: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_login(login)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid login or password".to_string()))?;

        if !self.verify_password(&user, password) {
            return Err(AppError::Authentication(
                "Invalid login or password".to_string(),
            ));
        }

        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.login.clone(),
            user_id: user.id,
            role: user.role,
            campus_id: user.campus_id,
            exp,
            iat: now,
        };

        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        Ok((token, user))
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    pub async fn search(&self, query: &UserQuery) -> AppResult<(Vec<UserShort>, i64)> {
        self.repository.users.search(query).await
    }

    pub async fn create_user(&self, user: CreateUser) -> AppResult<User> {
        user.validate()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        if self.repository.users.login_exists(&user.login, None).await? {
            return Err(AppError::Conflict("Login already exists".to_string()));
        }

        // The campus must exist before a user can be attached to it
        self.repository.campuses.get_by_id(user.campus_id).await?;

        let hash = hash_password(&user.password)?;
        self.repository.users.create(&user, &hash).await
    }

    pub async fn update_user(&self, id: i32, update: UpdateUser) -> AppResult<User> {
        update
            .validate()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        if let Some(ref login) = update.login {
            if self.repository.users.login_exists(login, Some(id)).await? {
                return Err(AppError::Conflict("Login already exists".to_string()));
            }
        }
        if let Some(campus_id) = update.campus_id {
            self.repository.campuses.get_by_id(campus_id).await?;
        }

        let hash = match update.password.as_deref() {
            Some(password) => Some(hash_password(password)?),
            None => None,
        };
        self.repository.users.update(id, &update, hash).await
    }

    pub async fn delete_user(&self, id: i32) -> AppResult<()> {
        self.repository.users.soft_delete(id).await
    }

    fn verify_password(&self, user: &User, password: &str) -> bool {
        let Some(ref stored) = user.password else {
            return false;
        };
        PasswordHash::new(stored)
            .map(|hash| {
                Argon2::default()
                    .verify_password(password.as_bytes(), &hash)
                    .is_ok()
            })
            .unwrap_or(false)
    }
}

fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
}
