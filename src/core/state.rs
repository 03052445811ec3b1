//! Application State - Stato globale dell'applicazione
//!
//! Contiene i collaboratori condivisi tra route e middleware. Tutte le
//! dipendenze vengono iniettate alla costruzione: nessun singleton di
//! processo, così i test possono montare directory e store finti.

use crate::repositories::UserDirectory;
use crate::store::KeyValueStore;
use std::sync::Arc;

/// Stato globale dell'applicazione condiviso tra tutte le route e middleware
pub struct AppState {
    /// Directory degli utenti (MySQL in produzione)
    pub users: Arc<dyn UserDirectory>,

    /// Key-value store condiviso per sessioni di refresh e cache risposte
    /// (Redis in produzione)
    pub kv: Arc<dyn KeyValueStore>,

    /// Secret key per la firma dei token, caricata una volta all'avvio.
    /// Non va mai loggata.
    pub jwt_secret: String,

    /// Audience (`aud`) emessa in ogni access token
    pub jwt_audience: String,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        kv: Arc<dyn KeyValueStore>,
        jwt_secret: String,
        jwt_audience: String,
    ) -> Self {
        Self {
            users,
            kv,
            jwt_secret,
            jwt_audience,
        }
    }
}
