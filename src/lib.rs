//! Server library - espone i moduli principali per i test

pub mod core;
pub mod dtos;
pub mod entities;
pub mod repositories;
pub mod services;
pub mod store;

// Re-export dei tipi principali per facilitare l'import
pub use core::{AppError, AppState, auth, config};
pub use services::root;

use axum::{
    Router,
    extract::Request,
    middleware,
    middleware::Next,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Crea il router principale dell'applicazione
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .nest("/oauth", configure_oauth_routes())
        .nest("/api/v1/users", configure_user_routes(state.clone()))
        .nest("/api/v1/admin", configure_admin_routes(state.clone()))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Configura le routes di emissione token (login, refresh, revoca)
fn configure_oauth_routes() -> Router<Arc<AppState>> {
    use services::*;
    Router::new()
        .route("/token", post(generate_token))
        .route("/token/refresh", get(refresh_token))
        .route("/token/revoke", post(revoke_token))
}

/// Configura le routes per la gestione degli utenti
fn configure_user_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use core::cache_middleware;
    use services::*;

    Router::new()
        .route(
            "/",
            // solo la lista utenti passa dalla cache delle risposte: il
            // layer viene applicato prima di aggiungere gli altri metodi
            get(get_all_users)
                .layer(middleware::from_fn_with_state(state, cache_middleware))
                .post(create_user)
                .put(update_user_by_email),
        )
        .route("/{email}", get(find_user_by_email))
        .route("/check-password", post(check_user_password))
}

/// Configura le routes protette dell'area admin:
/// verifica firma + RBAC, poi gate sul ruolo richiesto
fn configure_admin_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use core::{rbac_middleware, require_scope};
    use services::*;

    Router::new()
        .route("/", get(admin_greeting))
        .route_layer(middleware::from_fn(|req: Request, next: Next| {
            require_scope(req, next, "admin")
        }))
        .layer(middleware::from_fn_with_state(state, rbac_middleware))
}
