//! Entities module - Entità di dominio persistite

pub mod user;

pub use user::User;
