use serde::Deserialize;

/// Session key holding the id of the user who completed a callback.
pub const USER_ID_SESSION_KEY: &str = "user_id";

#[derive(Debug, Deserialize)]
pub struct ProviderParams {
    pub oauth_provider: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AuthorizationParams {
    pub oauth_provider: Option<String>,
    pub request_method: Option<String>,
    pub request_url: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthCredentials {
    pub token: String,
    pub token_secret: String,
}
