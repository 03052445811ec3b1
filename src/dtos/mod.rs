//! DTOs module - Strutture per l'input/output con i client

pub mod auth;
pub mod user;

pub use auth::{AccessTokenDTO, CheckPasswordDTO, CredentialsDTO, RevokeTokenDTO, TokenPairDTO};
pub use user::{CreateUserDTO, UpdateUserDTO, UserDTO};
