use actix_web::web;
use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::AppError;

/// One-way password hashing with a per-call random salt embedded in the output.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        Ok(hash(password, self.cost)?)
    }

    /// Returns `false` for a wrong password and for a malformed hash alike.
    pub fn verify(&self, password: &str, hashed_password: &str) -> bool {
        verify(password, hashed_password).unwrap_or(false)
    }

    /// `hash` on the blocking thread pool, keeping the worker free while
    /// bcrypt runs.
    pub async fn hash_on_pool(&self, password: &str) -> Result<String, AppError> {
        let hasher = *self;
        let password = password.to_owned();
        web::block(move || hasher.hash(&password)).await?
    }

    /// `verify` on the blocking thread pool.
    pub async fn verify_on_pool(&self, password: &str, hashed_password: &str) -> bool {
        let hasher = *self;
        let password = password.to_owned();
        let hashed_password = hashed_password.to_owned();
        web::block(move || hasher.verify(&password, &hashed_password))
            .await
            .unwrap_or(false)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_COST)
    }
}
