//! Core Module - Componenti infrastrutturali dell'applicazione
//!
//! Questo modulo contiene tutti i componenti "core" dell'applicazione:
//! - Autenticazione, JWT e RBAC
//! - Cache delle risposte
//! - Configurazione
//! - Gestione errori
//! - Stato applicazione

pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod state;

// Re-exports per facilitare l'import
pub use auth::{
    ACCESS_TOKEN_LIFETIME, AccessClaims, REFRESH_TOKEN_LIFETIME, RefreshClaims, RoleSet,
    rbac_middleware, require_scope,
};
pub use cache::cache_middleware;
pub use config::Config;
pub use error::AppError;
pub use state::AppState;
