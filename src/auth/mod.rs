pub mod authority;
pub mod extractors;
pub mod identity;
pub mod middleware;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};

// Re-export necessary items
pub use authority::{ensure_owner_or_superuser, Role};
pub use extractors::{CurrentUser, SuperUser};
pub use identity::{require_active, require_superuser, resolve};
pub use middleware::AuthMiddleware;
pub use password::PasswordHasher;
pub use token::{Claims, TokenError, TokenService};

/// Form body of the token endpoint (OAuth2 password flow field names).
/// `username` carries the account email; `email` is accepted as an alias.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginForm {
    #[serde(alias = "email")]
    pub username: String,
    pub password: String,
}

/// Response returned after a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessToken {
    /// The signed bearer token.
    pub access_token: String,
    /// Always `"bearer"`.
    pub token_type: String,
}

impl AccessToken {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}
