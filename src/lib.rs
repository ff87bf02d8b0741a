pub mod config;
pub mod crypto;
pub mod database;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod web;

pub use error::{AppError, AppResult};
pub use state::AppState;

/// Build stamp baked in by `build.rs`.
pub const BUILD_ID: &str = env!("PARTYOF4_BUILD_ID");
