//! InMemoryUserDirectory - Directory utenti in-process per test e sviluppo

use super::{DirectoryError, UserDirectory};
use crate::dtos::{CreateUserDTO, UpdateUserDTO};
use crate::entities::User;
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use uuid::Uuid;

/// Directory con le stesse semantiche del repository MySQL, chiavi = email.
#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: DashMap<String, User>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserisce un utente già costruito, sovrascrivendo eventuali duplicati.
    pub fn seed(&self, user: User) {
        self.users.insert(user.email.clone(), user);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DirectoryError> {
        Ok(self.users.get(email).map(|entry| entry.clone()))
    }

    async fn find_all(&self) -> Result<Vec<User>, DirectoryError> {
        let mut users: Vec<User> = self.users.iter().map(|entry| entry.clone()).collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(users)
    }

    async fn create(&self, data: &CreateUserDTO) -> Result<User, DirectoryError> {
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

        match self.users.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(DirectoryError::AlreadyExists),
            Entry::Vacant(entry) => {
                entry.insert(user.clone());
                Ok(user)
            }
        }
    }

    async fn update_by_email(&self, data: &UpdateUserDTO) -> Result<User, DirectoryError> {
        let mut entry = self
            .users
            .get_mut(&data.email)
            .ok_or(DirectoryError::NotFound)?;

        if let Some(ref name) = data.name {
            entry.name = name.clone();
        }
        if let Some(ref password) = data.password {
            entry.password = password.clone();
        }
        if let Some(ref role) = data.role {
            entry.role = role.clone();
        }
        entry.updated_at = Utc::now();

        Ok(entry.clone())
    }
}
