//! UserRepository - Repository MySQL per la gestione degli utenti

use super::{DirectoryError, UserDirectory};
use crate::dtos::{CreateUserDTO, UpdateUserDTO};
use crate::entities::User;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::MySqlPool;
use uuid::Uuid;

pub struct UserRepository {
    connection_pool: MySqlPool,
}

impl UserRepository {
    pub fn new(connection_pool: MySqlPool) -> UserRepository {
        Self { connection_pool }
    }
}

impl From<sqlx::Error> for DirectoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DirectoryError::NotFound,
            other => DirectoryError::Unavailable(other.to_string()),
        }
    }
}

#[async_trait]
impl UserDirectory for UserRepository {
    ///considero l'email univoca
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DirectoryError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password, role, created_at, updated_at \
             FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(user)
    }

    async fn find_all(&self) -> Result<Vec<User>, DirectoryError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password, role, created_at, updated_at \
             FROM users ORDER BY created_at",
        )
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(users)
    }

    async fn create(&self, data: &CreateUserDTO) -> Result<User, DirectoryError> {
        if self.find_by_email(&data.email).await?.is_some() {
            return Err(DirectoryError::AlreadyExists);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            name: data.name.clone(),
            email: data.email.clone(),
            password: data.password.clone(),
            role: data.role.clone(),
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO users (id, name, email, password, role, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(&user.role)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.connection_pool)
        .await?;

        Ok(user)
    }

    async fn update_by_email(&self, data: &UpdateUserDTO) -> Result<User, DirectoryError> {
        let mut user = self
            .find_by_email(&data.email)
            .await?
            .ok_or(DirectoryError::NotFound)?;

        if let Some(ref name) = data.name {
            user.name = name.clone();
        }
        if let Some(ref password) = data.password {
            user.password = password.clone();
        }
        if let Some(ref role) = data.role {
            user.role = role.clone();
        }
        user.updated_at = Utc::now();

        sqlx::query(
            "UPDATE users SET name = ?, password = ?, role = ?, updated_at = ? WHERE email = ?",
        )
        .bind(&user.name)
        .bind(&user.password)
        .bind(&user.role)
        .bind(user.updated_at)
        .bind(&user.email)
        .execute(&self.connection_pool)
        .await?;

        Ok(user)
    }
}
