//! User services - Endpoint CRUD per gli utenti

use crate::core::{AppError, AppState};
use crate::dtos::{CheckPasswordDTO, CreateUserDTO, UpdateUserDTO, UserDTO};
use crate::entities::User;
use axum::extract::{Json, Path, State};
use std::sync::Arc;
use tracing::info;
use validator::Validate;

pub async fn get_all_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserDTO>>, AppError> {
    let users = state.users.find_all().await?;

    Ok(Json(users.into_iter().map(UserDTO::from).collect()))
}

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateUserDTO>,
) -> Result<Json<UserDTO>, AppError> {
    body.validate()?;

    let password_hash = User::hash_password(&body.password).map_err(|_| {
        AppError::internal_server_error("Failed to hash password")
    })?;

    let data = CreateUserDTO {
        password: password_hash,
        ..body
    };

    // un'email già presente risponde 409 (DirectoryError::AlreadyExists)
    let created = state.users.create(&data).await?;

    info!(email = %created.email, "User created");

    Ok(Json(UserDTO::from(created)))
}

pub async fn find_user_by_email(
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
) -> Result<Json<UserDTO>, AppError> {
    let user = state
        .users
        .find_by_email(&email)
        .await?
        .ok_or_else(|| AppError::not_found("No user found"))?;

    Ok(Json(UserDTO::from(user)))
}

pub async fn update_user_by_email(
    State(state): State<Arc<AppState>>,
    Json(body): Json<UpdateUserDTO>,
) -> Result<Json<UserDTO>, AppError> {
    body.validate()?;

    let data = match body.password {
        Some(ref password) => {
            let password_hash = User::hash_password(password).map_err(|_| {
                AppError::internal_server_error("Failed to hash password")
            })?;
            UpdateUserDTO {
                password: Some(password_hash),
                ..body.clone()
            }
        }
        None => body,
    };

    let updated = state.users.update_by_email(&data).await?;

    info!(email = %updated.email, "User updated");

    Ok(Json(UserDTO::from(updated)))
}

pub async fn check_user_password(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CheckPasswordDTO>,
) -> Result<Json<serde_json::Value>, AppError> {
    body.validate()?;

    let valid = match state.users.find_by_email(&body.email).await? {
        Some(user) => user.verify_password(&body.password),
        None => false,
    };

    Ok(Json(serde_json::json!({ "valid": valid })))
}
