//! Store module - Accesso al key-value store condiviso (Redis in produzione)
//!
//! Il server usa un'unica astrazione chiave/valore sia per le sessioni di
//! refresh che per la cache delle risposte. L'interfaccia è volutamente
//! minima: set-if-absent, get, delete, tutte con TTL.

pub mod memory;
pub mod redis;

pub use memory::MemoryStore;
pub use redis::RedisStore;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by a [`KeyValueStore`] implementation.
///
/// Callers on security-sensitive paths (refresh validation, revocation) must
/// treat every variant as a rejection, never as an allow.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("key-value store unavailable: {0}")]
    Unavailable(String),

    #[error("key-value store operation timed out")]
    Timeout,
}

/// Narrow interface over the shared key-value store.
///
/// All three operations are atomic as seen by the store: concurrent callers
/// racing on the same key resolve to one winner, never to a torn entry.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Stores `value` under `key` with the given TTL only if the key is
    /// currently absent. Returns `true` when the write took effect.
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration)
    -> Result<bool, StoreError>;

    /// Reads the value stored under `key`, `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Removes the entry under `key`. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}
