use super::AppState;
use crate::components::{BackendCredential, ResultEnvelope};
use crate::error::{auth_error, AgentResult, ErrorKind};
use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rust_i18n::t;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Cookie that carries the session token
pub const SESSION_COOKIE: &str = "session_token";

/// Session claims issued by the identity layer
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Display name
    pub name: Option<String>,
    /// Google OAuth access token
    pub access_token: String,
    /// Expiration time (as UTC timestamp)
    pub exp: usize,
    /// Issued at (as UTC timestamp)
    pub iat: usize,
}

/// Signs and verifies session tokens
pub struct SessionService {
    secret: String,
}

impl SessionService {
    /// Create a new session service
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Issue a session token wrapping a Google access token
    pub fn issue(
        &self,
        user_id: &str,
        name: Option<String>,
        access_token: &str,
        ttl: Duration,
    ) -> AgentResult<String> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: user_id.to_string(),
            name,
            access_token: access_token.to_string(),
            exp: (now + ttl).timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| auth_error(&format!("Failed to generate token: {}", e)))
    }

    /// Validate a session token and return its claims
    pub fn validate(&self, token: &str) -> AgentResult<SessionClaims> {
        let claims = decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|token_data| token_data.claims)
        .map_err(|e| {
            debug!("Session validation error: {:?}", e);
            auth_error("Invalid session token")
        })?;

        if claims.access_token.trim().is_empty() {
            return Err(auth_error("Session has no access token"));
        }

        Ok(claims)
    }
}

/// Extract the session token from the cookie or the Authorization header
pub fn extract_token(headers: &HeaderMap) -> AgentResult<String> {
    // First check for token in cookies
    for cookie in headers.get_all(COOKIE) {
        let cookie_str = cookie
            .to_str()
            .map_err(|_| auth_error("Invalid cookie header"))?;
        for cookie_pair in cookie_str.split(';') {
            if let Some((name, value)) = cookie_pair.trim().split_once('=') {
                if name == SESSION_COOKIE && !value.is_empty() {
                    return Ok(value.to_string());
                }
            }
        }
    }

    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| auth_error("Missing session"))?;
    let auth_str = auth_header
        .to_str()
        .map_err(|_| auth_error("Invalid Authorization header"))?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        _ => Err(auth_error("Invalid Authorization header")),
    }
}

/// Authenticated session of the caller
#[derive(Debug, Clone)]
pub struct Session {
    pub claims: SessionClaims,
}

impl Session {
    /// Credential for the Google APIs
    pub fn credential(&self) -> BackendCredential {
        BackendCredential::new(self.claims.access_token.clone())
    }
}

impl FromRequestParts<AppState> for Session {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        extract_token(&parts.headers)
            .and_then(|token| state.sessions.validate(&token))
            .map(|claims| Session { claims })
            .map_err(|e| {
                warn!("Rejected request: {}", e);
                let message = t!("unauthorized", locale = state.config.locale.as_str());
                (
                    StatusCode::UNAUTHORIZED,
                    Json(ResultEnvelope::failed(ErrorKind::Authentication, message)),
                )
                    .into_response()
            })
    }
}
