//! Response cache - Middleware di caching delle risposte sul key-value store
//!
//! Le richieste GET marcate con questo middleware vengono servite dalla cache
//! quando possibile; altrimenti la risposta dell'handler viene memorizzata
//! con un TTL di default. La cache non è una risorsa di sicurezza: un errore
//! dello store degrada sulla risposta live invece di respingere la richiesta.

use crate::core::{AppError, AppState};
use axum::body::{Body, to_bytes};
use axum::extract::{OriginalUri, Request, State};
use axum::http::{Method, StatusCode, Uri, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// TTL di default delle risposte in cache
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 60 * 24);

/// Corpi oltre questo limite non vengono messi in cache
const CACHE_BODY_LIMIT: usize = 1_048_576;

// La chiave usa l'URI originale: dentro un router annidato il path della
// richiesta arriva senza prefisso.
fn route_key(method: &Method, uri: &Uri) -> String {
    format!("{}.{}.{}", method, uri.path(), uri.query().unwrap_or(""))
}

#[instrument(skip(state, req, next))]
pub async fn cache_middleware(
    State(state): State<Arc<AppState>>,
    OriginalUri(uri): OriginalUri,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if req.method() != Method::GET {
        return Ok(next.run(req).await);
    }

    let key = route_key(req.method(), &uri);

    match state.kv.get(&key).await {
        Ok(Some(cached)) => {
            debug!(%key, "Serving cached response");
            return Ok((
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                cached,
            )
                .into_response());
        }
        Ok(None) => {}
        Err(e) => {
            warn!(%key, error = %e, "Cache read failed, falling through to handler");
        }
    }

    let response = next.run(req).await;

    if response.status() != StatusCode::OK {
        return Ok(response);
    }

    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, CACHE_BODY_LIMIT).await?;

    if let Ok(payload) = std::str::from_utf8(&bytes) {
        if let Err(e) = state.kv.set_if_absent(&key, payload, DEFAULT_CACHE_TTL).await {
            warn!(%key, error = %e, "Cache write failed");
        } else {
            debug!(%key, "Response cached");
        }
    }

    Ok(Response::from_parts(parts, Body::from(bytes)))
}
