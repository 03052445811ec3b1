//! Auth services - Emissione, refresh e revoca dei token

use crate::core::auth::{
    REFRESH_TOKEN_LIFETIME, bearer_token, decode_refresh_token, encode_access_token,
    encode_refresh_token,
};
use crate::core::{AccessClaims, AppError, AppState};
use axum::{
    Extension,
    extract::{Json, State},
    http::HeaderMap,
    response::IntoResponse,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;
use validator::Validate;

/// Login: emette la coppia access/refresh token.
pub async fn generate_token(
    State(state): State<Arc<AppState>>,
    Json(body): Json<crate::dtos::CredentialsDTO>,
) -> Result<Json<crate::dtos::TokenPairDTO>, AppError> {
    // 1. Validare il body: username email ben formata, password non vuota
    // 2. Cercare il principal nella directory utenti
    // 3. Confrontare la password con l'hash memorizzato (bcrypt)
    // 4. Firmare l'access token con i ruoli correnti del principal
    // 5. Coniare un jti nuovo e registrarlo nello store (set-if-absent,
    //    ttl = durata del refresh token) PRIMA di firmare il refresh token
    // 6. Ritornare la coppia; qualunque fallimento di firma o store annulla
    //    l'emissione, mai una coppia parziale

    body.validate()?;

    let user = match state.users.find_by_email(&body.username).await? {
        Some(user) => user,
        None => {
            // stessa risposta di una password sbagliata: il client non deve
            // poter enumerare gli account
            warn!(username = %body.username, "Login attempt for unknown principal");
            return Err(AppError::bad_request("Invalid Credentials Passed"));
        }
    };

    if !user.verify_password(&body.password) {
        warn!(username = %body.username, "Login attempt with wrong password");
        return Err(AppError::bad_request("Invalid Credentials Passed"));
    }

    let access_token = encode_access_token(
        &user.email,
        user.roles(),
        &state.jwt_audience,
        &state.jwt_secret,
    )
    .map_err(|e| {
        error!("Failed to sign access token: {:?}", e);
        AppError::internal_server_error("Error signing token")
    })?;

    let jti = Uuid::new_v4().to_string();

    let registered = state
        .kv
        .set_if_absent(&user.email, &jti, REFRESH_TOKEN_LIFETIME)
        .await?;
    if !registered {
        // prima sessione viva vince: il refresh token emesso qui sotto non
        // validerà finché il record residente non scade o viene revocato
        info!(email = %user.email, "Session record already present, keeping the resident one");
    }

    let refresh_token = encode_refresh_token(&user.email, &jti, &state.jwt_secret).map_err(|e| {
        error!("Failed to sign refresh token: {:?}", e);
        AppError::internal_server_error("Error signing token")
    })?;

    info!(email = %user.email, "Token pair issued");

    Ok(Json(crate::dtos::TokenPairDTO {
        access_token,
        refresh_token,
    }))
}

/// Refresh: valida il refresh token contro il record di sessione e, se tutto
/// torna, emette un nuovo access token. Nessuna rotazione: refresh token e
/// record di sessione restano intatti.
pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<crate::dtos::AccessTokenDTO>, AppError> {
    // 1. Estrarre il bearer token dall'header Authorization
    // 2. Verificare firma e struttura
    // 3. Ricontrollare la scadenza localmente
    // 4. Leggere il record di sessione del subject e confrontare il jti
    // 5. Rileggere il principal (i ruoli possono essere cambiati) ed emettere
    //    solo un nuovo access token

    let token = match bearer_token(&headers) {
        Some(token) => token,
        None => return Err(AppError::bad_request("Refresh token not provided")),
    };

    // Ogni ramo di validazione risponde con lo stesso 401 generico: quale
    // controllo sia scattato non deve trapelare al chiamante.
    let invalid = || AppError::unauthorized("Invalid refresh token");

    let claims = match decode_refresh_token(token, &state.jwt_secret) {
        Ok(data) => data.claims,
        Err(_) => {
            warn!("Refresh token failed signature or structure check");
            return Err(invalid());
        }
    };

    let now = Utc::now().timestamp() as usize;
    if claims.exp <= now {
        warn!(sub = %claims.sub, "Refresh token expired");
        return Err(invalid());
    }

    // un errore dello store è un 500, mai un allow: qui si fallisce chiusi
    let stored = match state.kv.get(&claims.sub).await? {
        Some(stored) => stored,
        None => {
            warn!(sub = %claims.sub, "No active session for subject");
            return Err(invalid());
        }
    };

    if stored != claims.jti {
        warn!(sub = %claims.sub, "Session identifier mismatch");
        return Err(invalid());
    }

    let user = match state.users.find_by_email(&claims.sub).await? {
        Some(user) => user,
        None => {
            warn!(sub = %claims.sub, "Subject no longer in directory");
            return Err(invalid());
        }
    };

    let access_token = encode_access_token(
        &user.email,
        user.roles(),
        &state.jwt_audience,
        &state.jwt_secret,
    )
    .map_err(|e| {
        error!("Failed to sign access token: {:?}", e);
        AppError::internal_server_error("Error signing token")
    })?;

    info!(email = %user.email, "Access token refreshed");

    Ok(Json(crate::dtos::AccessTokenDTO { access_token }))
}

/// Revoca: cancella il record di sessione del principal. Idempotente; da
/// quel momento ogni refresh token in circolazione per quel principal è
/// definitivamente invalido, firma e scadenza incluse.
pub async fn revoke_token(
    State(state): State<Arc<AppState>>,
    Json(body): Json<crate::dtos::RevokeTokenDTO>,
) -> Result<Json<&'static str>, AppError> {
    body.validate()?;

    state.kv.delete(&body.email).await?;

    info!(email = %body.email, "Session revoked");

    Ok(Json("Token revoked successfully"))
}

/// Handler dimostrativo dell'area admin: raggiungibile solo attraverso
/// rbac_middleware + require_scope("admin").
pub async fn admin_greeting(Extension(claims): Extension<AccessClaims>) -> impl IntoResponse {
    format!("Hello, {} you are authorized to view this.", claims.email)
}
