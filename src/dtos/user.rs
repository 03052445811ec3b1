//! User DTOs - Data Transfer Objects per utenti

use crate::entities::User;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

// struct per gestire io col client
#[derive(Serialize, Deserialize, Debug)]
pub struct UserDTO {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserDTO {
    fn from(value: User) -> Self {
        Self {
            id: value.id,
            name: value.name,
            email: value.email,
            // l'hash della password non lascia mai il server
            role: value.role,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

fn default_role() -> String {
    "user".to_string()
}

/// DTO per creare un nuovo utente (l'id viene generato dal server)
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateUserDTO {
    #[validate(length(min = 1, max = 255, message = "name must not be empty"))]
    pub name: String,
    #[validate(email(message = "email must be a valid email"))]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    #[serde(default = "default_role")]
    pub role: String,
}

/// DTO per aggiornare un utente esistente, identificato dall'email.
/// Solo i campi presenti vengono modificati.
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct UpdateUserDTO {
    #[validate(email(message = "email must be a valid email"))]
    pub email: String,
    pub name: Option<String>,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: Option<String>,
    pub role: Option<String>,
}
