//! Common repository traits
//!
//! This module defines the interface the rest of the server uses to reach
//! user records, independent of the backing storage.

use crate::dtos::{CreateUserDTO, UpdateUserDTO};
use crate::entities::User;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("user not found")]
    NotFound,

    #[error("user already exists")]
    AlreadyExists,

    #[error("user directory unavailable: {0}")]
    Unavailable(String),
}

/// Read/write access to user records.
///
/// # Notes
/// * `create` expects the password in `CreateUserDTO` to be hashed already;
///   hashing belongs to the service layer.
/// * Implementations must be safe to share across request workers.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Looks up a user by exact email match.
    ///
    /// # Returns
    /// * `Ok(Some(User))` - User found
    /// * `Ok(None)` - No user with that email
    /// * `Err(DirectoryError)` - Error during lookup
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DirectoryError>;

    /// Returns all users. Can be empty.
    async fn find_all(&self) -> Result<Vec<User>, DirectoryError>;

    /// Creates a new user, assigning a fresh id and timestamps.
    ///
    /// # Returns
    /// * `Ok(User)` - Created user
    /// * `Err(DirectoryError::AlreadyExists)` - Email already taken
    async fn create(&self, data: &CreateUserDTO) -> Result<User, DirectoryError>;

    /// Updates the user identified by `data.email`; only `Some(_)` fields
    /// are modified.
    ///
    /// # Returns
    /// * `Ok(User)` - Updated user
    /// * `Err(DirectoryError::NotFound)` - No user with that email
    async fn update_by_email(&self, data: &UpdateUserDTO) -> Result<User, DirectoryError>;
}
