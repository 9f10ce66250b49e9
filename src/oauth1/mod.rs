pub mod authenticator;
pub mod error;
#[cfg(test)]
pub(crate) mod fake_provider;
pub mod query;
pub mod signature;

pub use authenticator::HmacSha1Authenticator;
pub use error::OAuthAuthenticationError;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

use crate::models::AppConfig;

/// One OAuth 1.0 provider (bitbucket, ...) as seen by the HTTP layer.
#[async_trait]
pub trait OAuthAuthenticator: Send + Sync {
    fn provider_name(&self) -> &str;

    /// URL of the provider page where the user authorizes this service.
    /// `request_url` is the full URL of the incoming authenticate request.
    async fn authenticate_url(&self, request_url: &Url) -> Result<String, OAuthAuthenticationError>;

    /// Completes the handshake for the provider's redirect back to us and
    /// returns the id of the user the access token now belongs to.
    async fn callback(&self, request_url: &Url) -> Result<String, OAuthAuthenticationError>;

    /// Forgets the user's access token. Returns false if there was none.
    fn invalidate_token(&self, user_id: &str) -> bool;

    /// Signed `Authorization` header for a request the user wants to send to
    /// the provider, or `None` if the user has no access token.
    fn compute_authorization_header(
        &self,
        user_id: &str,
        request_method: &str,
        request_url: &str,
        request_params: &HashMap<String, String>,
    ) -> Result<Option<String>, OAuthAuthenticationError>;
}

/// Authenticators by provider name.
#[derive(Clone, Default)]
pub struct OAuthAuthenticatorProvider {
    authenticators: HashMap<String, Arc<dyn OAuthAuthenticator>>,
}

impl OAuthAuthenticatorProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(
        config: &AppConfig,
        client: reqwest::Client,
    ) -> Result<Self, OAuthAuthenticationError> {
        let mut provider = Self::new();
        for provider_config in &config.providers {
            let authenticator =
                HmacSha1Authenticator::new(provider_config, &config.public_base_url, client.clone())?;
            tracing::info!("Registered OAuth 1.0 provider {}", provider_config.name);
            provider.register(Arc::new(authenticator));
        }
        Ok(provider)
    }

    pub fn register(&mut self, authenticator: Arc<dyn OAuthAuthenticator>) {
        self.authenticators
            .insert(authenticator.provider_name().to_string(), authenticator);
    }

    pub fn get_authenticator(&self, name: Option<&str>) -> Option<Arc<dyn OAuthAuthenticator>> {
        name.and_then(|name| self.authenticators.get(name)).cloned()
    }

    pub fn provider_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.authenticators.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
