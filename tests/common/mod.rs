//! Harness condiviso dai test di integrazione
//!
//! Monta il router reale sopra directory utenti e key-value store in-memory:
//! nessun database o Redis esterno, ogni test parte da uno stato isolato.

#![allow(dead_code)]

use axum_test::TestServer;
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use qna_server::core::AppState;
use qna_server::entities::User;
use qna_server::repositories::InMemoryUserDirectory;
use qna_server::store::{KeyValueStore, MemoryStore, StoreError};
use std::sync::Arc;
use std::time::Duration;

pub const TEST_JWT_SECRET: &str = "ilmiobellissimosegretochevaassolutamentecambiato";
pub const TEST_AUDIENCE: &str = "HOST";

/// Hash bcrypt a costo minimo: nei test conta il round-trip, non la
/// resistenza al brute force.
pub fn hash_for_tests(password: &str) -> String {
    bcrypt::hash(password, 4).expect("bcrypt hash")
}

pub fn test_user(name: &str, email: &str, password: &str, role: &str) -> User {
    let now = Utc::now();
    User {
        id: uuid::Uuid::new_v4().to_string(),
        name: name.to_string(),
        email: email.to_string(),
        password: hash_for_tests(password),
        role: role.to_string(),
        created_at: now,
        updated_at: now,
    }
}

/// Crea un AppState di test con due utenti:
/// * a@b.com / secret (ruolo admin)
/// * bob@example.com / hunter2pass (ruolo user)
pub fn create_test_state() -> Arc<AppState> {
    let users = InMemoryUserDirectory::new();
    users.seed(test_user("Alice Admin", "a@b.com", "secret", "admin"));
    users.seed(test_user("Bob Basic", "bob@example.com", "hunter2pass", "user"));

    Arc::new(AppState::new(
        Arc::new(users),
        Arc::new(MemoryStore::new()),
        TEST_JWT_SECRET.to_string(),
        TEST_AUDIENCE.to_string(),
    ))
}

/// Come [`create_test_state`] ma con uno store che fallisce ogni chiamata:
/// serve a verificare che i flussi di sicurezza falliscano chiusi.
pub fn create_test_state_with_broken_store() -> Arc<AppState> {
    let users = InMemoryUserDirectory::new();
    users.seed(test_user("Alice Admin", "a@b.com", "secret", "admin"));

    Arc::new(AppState::new(
        Arc::new(users),
        Arc::new(BrokenStore),
        TEST_JWT_SECRET.to_string(),
        TEST_AUDIENCE.to_string(),
    ))
}

pub fn create_test_server(state: Arc<AppState>) -> TestServer {
    let app = qna_server::create_router(state);
    TestServer::new(app).expect("Failed to create test server")
}

/// Store che simula un backend irraggiungibile.
pub struct BrokenStore;

#[async_trait::async_trait]
impl KeyValueStore for BrokenStore {
    async fn set_if_absent(
        &self,
        _key: &str,
        _value: &str,
        _ttl: Duration,
    ) -> Result<bool, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }

    async fn delete(&self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
}

/// Genera un access token con claims arbitrarie, firmato con `secret`.
/// `exp_offset_secs` è relativo ad adesso (negativo = già scaduto).
pub fn mint_access_token(
    email: &str,
    roles: &[&str],
    exp_offset_secs: i64,
    secret: &str,
) -> String {
    let now = Utc::now().timestamp();
    let claims = serde_json::json!({
        "email": email,
        "app_metadata": { "authorization": { "roles": roles } },
        "sub": email,
        "aud": TEST_AUDIENCE,
        "exp": now + exp_offset_secs,
        "iat": now,
        "jti": uuid::Uuid::new_v4().to_string(),
    });

    mint_token_with_claims(&claims, secret)
}

pub fn mint_refresh_token(sub: &str, jti: &str, exp_offset_secs: i64, secret: &str) -> String {
    let now = Utc::now().timestamp();
    let claims = serde_json::json!({
        "sub": sub,
        "exp": now + exp_offset_secs,
        "jti": jti,
    });

    mint_token_with_claims(&claims, secret)
}

/// Firma un token con il claim set passato così com'è: utile per costruire
/// token strutturalmente strani (metadata assente, malformato, ...).
pub fn mint_token_with_claims(claims: &serde_json::Value, secret: &str) -> String {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .expect("Failed to sign test token")
}

/// Decodifica i claims di un token firmato con il secret di test, senza
/// controllare scadenza o audience (i test vogliono ispezionare anche token
/// scaduti).
pub fn decode_claims(token: &str) -> serde_json::Value {
    let mut validation = Validation::default();
    validation.validate_aud = false;
    validation.validate_exp = false;

    decode::<serde_json::Value>(
        token,
        &DecodingKey::from_secret(TEST_JWT_SECRET.as_ref()),
        &validation,
    )
    .expect("Failed to decode test token")
    .claims
}
