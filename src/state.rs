use std::sync::Arc;

use crate::auth::{PasswordHasher, TokenService};
use crate::config::Config;
use crate::error::AppError;
use crate::store::{self, Store};

/// Process-wide handles shared by every request, registered as `web::Data`.
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: TokenService,
    pub hasher: PasswordHasher,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, tokens: TokenService, hasher: PasswordHasher) -> Self {
        Self {
            store,
            tokens,
            hasher,
        }
    }

    pub async fn from_config(config: &Config) -> Result<Self, AppError> {
        Ok(Self::new(
            store::connect(config).await?,
            TokenService::from_config(config),
            PasswordHasher::new(config.bcrypt_cost),
        ))
    }
}
