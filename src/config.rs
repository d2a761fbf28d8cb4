use jsonwebtoken::Algorithm;
use std::env;
use std::str::FromStr;

/// Errors raised while reading configuration at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub server_port: u16,
    pub server_host: String,
    pub jwt_secret: String,
    pub jwt_algorithm: Algorithm,
    pub access_token_expire_minutes: i64,
    pub bcrypt_cost: u32,
    pub first_superuser: Option<String>,
    pub first_superuser_password: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            database_max_connections: parsed("DATABASE_MAX_CONNECTIONS", 5)?,
            server_port: parsed("SERVER_PORT", 8080)?,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            jwt_secret: required("JWT_SECRET")?,
            jwt_algorithm: algorithm()?,
            access_token_expire_minutes: token_ttl_minutes()?,
            bcrypt_cost: bcrypt_cost()?,
            first_superuser: env::var("FIRST_SUPERUSER").ok(),
            first_superuser_password: env::var("FIRST_SUPERUSER_PASSWORD").ok(),
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database_url.starts_with("memory:")
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn parsed<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}

// Tokens are signed with a shared secret, so only the HMAC family is accepted.
fn algorithm() -> Result<Algorithm, ConfigError> {
    let value = env::var("JWT_ALGORITHM").unwrap_or_else(|_| "HS256".to_string());
    match Algorithm::from_str(&value) {
        Ok(alg @ (Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)) => Ok(alg),
        _ => Err(ConfigError::Invalid {
            name: "JWT_ALGORITHM",
            value,
        }),
    }
}

/// Upper bound for `ACCESS_TOKEN_EXPIRE_MINUTES` (one year).
pub const MAX_TOKEN_TTL_MINUTES: i64 = 60 * 24 * 365;

fn token_ttl_minutes() -> Result<i64, ConfigError> {
    let minutes = parsed("ACCESS_TOKEN_EXPIRE_MINUTES", 60 * 24 * 8)?;
    if (1..=MAX_TOKEN_TTL_MINUTES).contains(&minutes) {
        Ok(minutes)
    } else {
        Err(ConfigError::Invalid {
            name: "ACCESS_TOKEN_EXPIRE_MINUTES",
            value: minutes.to_string(),
        })
    }
}

fn bcrypt_cost() -> Result<u32, ConfigError> {
    let cost = parsed("BCRYPT_COST", bcrypt::DEFAULT_COST)?;
    if (4..=31).contains(&cost) {
        Ok(cost)
    } else {
        Err(ConfigError::Invalid {
            name: "BCRYPT_COST",
            value: cost.to_string(),
        })
    }
}
