//! Authentication middleware
//!
//! Resolves the caller identity from an API key or JWT bearer token
//! and stores an `AuthContext` in request extensions. Handlers use
//! that identity for config ownership checks.

use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::domain::auth::{AuthConfig, AuthContext, AuthMode};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: usize,
    #[serde(default)]
    roles: Vec<String>,
}

pub struct AuthMiddleware {
    config: Arc<AuthConfig>,
}

pub type SharedAuthMiddleware = Arc<AuthMiddleware>;

impl AuthMiddleware {
    pub fn new(config: Arc<AuthConfig>) -> Self {
        Self { config }
    }

    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<AuthContext, AuthError> {
        if !self.config.enabled {
            return Ok(AuthContext::default());
        }

        match self.config.mode {
            AuthMode::None => Ok(AuthContext::default()),
            AuthMode::ApiKey => self.validate_api_key(headers),
            AuthMode::BearerToken => self.validate_bearer_token(headers),
        }
    }

    fn validate_api_key(&self, headers: &HeaderMap) -> Result<AuthContext, AuthError> {
        let api_key = headers
            .get("x-api-key")
            .and_then(|v| v.to_str().ok())
            .ok_or(AuthError::MissingCredentials)?;

        let keys = self
            .config
            .api_keys
            .as_ref()
            .ok_or(AuthError::ConfigurationError)?;

        match keys.get(api_key) {
            Some(user_id) => Ok(AuthContext::for_user(user_id.clone())),
            None => Err(AuthError::InvalidCredentials),
        }
    }

    fn validate_bearer_token(&self, headers: &HeaderMap) -> Result<AuthContext, AuthError> {
        let auth_header = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AuthError::MissingCredentials)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidCredentials)?;

        let secret = self
            .config
            .jwt_secret
            .as_ref()
            .ok_or(AuthError::ConfigurationError)?;

        let algorithm = match self.config.jwt_algorithm.as_deref() {
            Some("HS384") => Algorithm::HS384,
            Some("HS512") => Algorithm::HS512,
            _ => Algorithm::HS256,
        };

        let mut validation = Validation::new(algorithm);
        validation.validate_exp = true;

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )
        .map_err(|_| AuthError::InvalidCredentials)?;

        Ok(AuthContext {
            authenticated: true,
            user_id: Some(token_data.claims.sub),
            roles: token_data.claims.roles,
        })
    }
}

#[derive(Debug)]
pub enum AuthError {
    MissingCredentials,
    InvalidCredentials,
    ConfigurationError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingCredentials => (StatusCode::UNAUTHORIZED, "Missing credentials"),
            AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid credentials"),
            AuthError::ConfigurationError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Auth configuration error")
            }
        };

        (status, message).into_response()
    }
}

pub async fn auth_middleware(
    axum::extract::State(auth): axum::extract::State<SharedAuthMiddleware>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_context = auth.authenticate(request.headers()).await?;

    // Make the caller identity available to handlers
    request.extensions_mut().insert(auth_context);

    Ok(next.run(request).await)
}
