#![doc = "The `taskhub` library crate."]
#![doc = ""]
#![doc = "Authorization-aware CRUD over users and their tasks: credential hashing, signed"]
#![doc = "access tokens, identity resolution, the storage gateway, the user and task"]
#![doc = "services, and the actix-web routes that expose them. The binary (`main.rs`)"]
#![doc = "only reads configuration and starts the server."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;

pub use error::AppError;
pub use state::AppState;
