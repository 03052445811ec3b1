//! Auth DTOs - Corpi delle richieste e risposte di /oauth

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Credenziali presentate al login. Lo username è l'indirizzo email del
/// principal.
#[derive(Deserialize, Validate)]
pub struct CredentialsDTO {
    #[validate(email(message = "username must be a valid email"))]
    pub username: String,
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,
}

/// Coppia di token restituita da una login riuscita.
#[derive(Serialize, Deserialize)]
pub struct TokenPairDTO {
    pub access_token: String,
    pub refresh_token: String,
}

/// Risposta del refresh: solo il nuovo access token.
#[derive(Serialize, Deserialize)]
pub struct AccessTokenDTO {
    pub access_token: String,
}

/// Corpo della revoca: identifica il principal di cui invalidare la sessione.
#[derive(Deserialize, Validate)]
pub struct RevokeTokenDTO {
    #[validate(email(message = "email must be a valid email"))]
    pub email: String,
}

#[derive(Deserialize, Validate)]
pub struct CheckPasswordDTO {
    #[validate(email(message = "email must be a valid email"))]
    pub email: String,
    #[validate(length(min = 1, message = "password must not be empty"))]
    pub password: String,
}
