use crate::core::{AppError, AppState};
use axum::extract::State;
use axum::{body::Body, extract::Request, http, http::HeaderMap, http::Response, middleware::Next};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode};
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Durata dell'access token
pub const ACCESS_TOKEN_LIFETIME: Duration = Duration::from_secs(60 * 60 * 24);

/// Durata del refresh token e TTL del record di sessione associato
pub const REFRESH_TOKEN_LIFETIME: Duration = Duration::from_secs(60 * 60 * 24 * 7);

// struct che codifica il contenuto dell'access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub email: String,
    #[serde(default, deserialize_with = "lenient_app_metadata")]
    pub app_metadata: AppMetadata,
    pub sub: String,
    pub aud: String,
    pub exp: usize,
    pub iat: usize,
    pub jti: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppMetadata {
    #[serde(default)]
    pub authorization: Authorization,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Authorization {
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Claims del refresh token. `jti` è l'identificatore di sessione confrontato
/// con il record lato server: è l'unico aggancio con cui un refresh token può
/// essere invalidato prima della sua scadenza firmata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: String,
    pub exp: usize,
    pub jti: String,
}

/// Parse totale di `app_metadata`: una struttura assente o malformata produce
/// il ruolo vuoto, mai un errore di decodifica. Negare è il default sicuro.
fn lenient_app_metadata<'de, D>(deserializer: D) -> Result<AppMetadata, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Insieme di ruoli estratto da un access token validato. Vive solo per la
/// durata della richiesta, dentro le request extensions.
#[derive(Debug, Clone, Default)]
pub struct RoleSet(Vec<String>);

impl RoleSet {
    pub fn contains(&self, role: &str) -> bool {
        self.0.iter().any(|r| r == role)
    }
}

impl From<&AccessClaims> for RoleSet {
    fn from(claims: &AccessClaims) -> Self {
        Self(claims.app_metadata.authorization.roles.clone())
    }
}

#[instrument(skip(secret, roles), fields(email = %email))]
pub fn encode_access_token(
    email: &str,
    roles: Vec<String>,
    audience: &str,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    debug!("Encoding access token");
    let now = Utc::now().timestamp() as usize;
    let claims = AccessClaims {
        email: email.to_string(),
        app_metadata: AppMetadata {
            authorization: Authorization { roles },
        },
        sub: email.to_string(),
        aud: audience.to_string(),
        exp: now + ACCESS_TOKEN_LIFETIME.as_secs() as usize,
        iat: now,
        jti: uuid::Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
}

#[instrument(skip(secret, jti), fields(sub = %sub))]
pub fn encode_refresh_token(
    sub: &str,
    jti: &str,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    debug!("Encoding refresh token");
    let claims = RefreshClaims {
        sub: sub.to_string(),
        exp: Utc::now().timestamp() as usize + REFRESH_TOKEN_LIFETIME.as_secs() as usize,
        jti: jti.to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
}

// L'audience viene emessa ma non verificata in decodifica: la validazione
// qui copre firma, struttura e scadenza.
fn validation() -> Validation {
    let mut validation = Validation::default();
    validation.validate_aud = false;
    validation
}

pub fn decode_access_token(
    token: &str,
    secret: &str,
) -> Result<TokenData<AccessClaims>, jsonwebtoken::errors::Error> {
    decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &validation(),
    )
}

pub fn decode_refresh_token(
    token: &str,
    secret: &str,
) -> Result<TokenData<RefreshClaims>, jsonwebtoken::errors::Error> {
    decode::<RefreshClaims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &validation(),
    )
}

/// Estrae il token bearer dall'header Authorization, se presente.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(http::header::AUTHORIZATION)?.to_str().ok()?;
    let mut parts = header.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(scheme), Some(token)) if scheme.eq_ignore_ascii_case("bearer") => Some(token),
        _ => None,
    }
}

/// Middleware RBAC: verifica l'access token e pubblica ruoli e claims nelle
/// request extensions per il gate e gli handler a valle.
#[instrument(skip(state, req, next))]
pub async fn rbac_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response<Body>, AppError> {
    debug!("Running RBAC middleware");
    let token = match bearer_token(req.headers()) {
        Some(token) => token,
        None => {
            warn!("Missing or malformed authorization header");
            return Err(AppError::unauthorized(
                "Please add the JWT token to the header",
            ));
        }
    };

    let token_data = match decode_access_token(token, &state.jwt_secret) {
        Ok(data) => data,
        Err(_) => {
            warn!("Failed to decode access token");
            return Err(AppError::unauthorized("Unable to decode token"));
        }
    };
    let claims = token_data.claims;

    // La scadenza viene ricontrollata qui, sempre: la validazione della
    // libreria ha un leeway di default e non va data per scontata.
    let now = Utc::now().timestamp() as usize;
    if claims.exp <= now {
        warn!(sub = %claims.sub, "Access token expired");
        return Err(AppError::unauthorized("Token expired"));
    }

    let roles = RoleSet::from(&claims);
    debug!(sub = %claims.sub, ?roles, "Access token accepted");

    req.extensions_mut().insert(roles);
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Gate di autorizzazione per route protette: lascia passare la richiesta
/// solo se il RoleSet pubblicato dal middleware RBAC contiene `required`.
/// L'handler incapsulato non viene mai invocato in caso di rifiuto.
pub async fn require_scope(
    req: Request,
    next: Next,
    required: &'static str,
) -> Result<Response<Body>, AppError> {
    // RoleSet assente = nessun ruolo: si nega, non si crasha
    let allowed = req
        .extensions()
        .get::<RoleSet>()
        .map(|roles| roles.contains(required))
        .unwrap_or(false);

    if !allowed {
        warn!(required, "Scope check failed");
        return Err(AppError::forbidden(
            "You do not have the required scope to access this resource.",
        ));
    }

    Ok(next.run(req).await)
}
