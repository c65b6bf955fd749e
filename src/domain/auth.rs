use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AuthMode {
    None,
    ApiKey,
    BearerToken,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub enabled: bool,
    pub mode: AuthMode,
    /// Map of API key -> user id. The resolved user id becomes the
    /// caller identity used for ownership checks.
    pub api_keys: Option<std::collections::HashMap<String, String>>,
    pub jwt_secret: Option<String>,
    pub jwt_algorithm: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            mode: AuthMode::None,
            api_keys: None,
            jwt_secret: None,
            jwt_algorithm: Some("HS256".to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthContext {
    pub authenticated: bool,
    pub user_id: Option<String>,
    pub roles: Vec<String>,
}

impl AuthContext {
    /// Context for a resolved user, as produced by the auth middleware.
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            user_id: Some(user_id.into()),
            roles: vec!["user".to_string()],
        }
    }
}
