//! Services module - Coordinatore per tutti i service handler HTTP
//!
//! Questo modulo organizza i service handlers in sotto-moduli separati.
//! Ogni modulo gestisce gli endpoint HTTP per una specifica funzionalità.

pub mod auth;
pub mod user;

// Re-exports per facilitare l'import
pub use auth::{admin_greeting, generate_token, refresh_token, revoke_token};
pub use user::{
    check_user_password, create_user, find_user_by_email, get_all_users, update_user_by_email,
};

use axum::{http::StatusCode, response::IntoResponse};

/// Root endpoint - health check
pub async fn root() -> impl IntoResponse {
    (StatusCode::OK, "API is up and running")
}
