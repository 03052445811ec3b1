//! MemoryStore - Implementazione in-process del [`KeyValueStore`]
//!
//! Usato dalla suite di test e per lo sviluppo locale senza Redis. Le
//! scadenze sono controllate in lettura, quindi una chiave scaduta si
//! comporta come assente anche se la entry è ancora fisicamente presente.

use super::{KeyValueStore, StoreError};
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::time::{Duration, Instant};

#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, (String, Instant)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError> {
        let deadline = Instant::now() + ttl;

        // L'entry API blocca lo shard: due scrittori concorrenti sulla stessa
        // chiave vedono esattamente un vincitore.
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut entry) => {
                if entry.get().1 > Instant::now() {
                    return Ok(false);
                }
                entry.insert((value.to_string(), deadline));
                Ok(true)
            }
            Entry::Vacant(entry) => {
                entry.insert((value.to_string(), deadline));
                Ok(true)
            }
        }
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let expired = match self.entries.get(key) {
            None => return Ok(None),
            Some(entry) if entry.1 > Instant::now() => return Ok(Some(entry.0.clone())),
            Some(_) => true,
        };

        if expired {
            // la guard è già stata rilasciata, si può rimuovere senza deadlock
            self.entries
                .remove_if(key, |_, (_, deadline)| *deadline <= Instant::now());
        }

        Ok(None)
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}
