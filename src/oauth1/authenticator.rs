use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};
use url::Url;

use super::error::OAuthAuthenticationError;
use super::query::{decode_component, decode_parameters, extract_state};
use super::signature::{OAuthParameters, authorization_header, encode};
use super::OAuthAuthenticator;
use crate::models::ProviderConfig;
use crate::models::oauth::OAuthCredentials;

const USER_ID_PARAM: &str = "userId";
const CALLBACK_PATH: &str = "oauth/1.0/callback";
const REQUEST_TOKEN_TTL: Duration = Duration::from_secs(10 * 60);

struct PendingRequestToken {
    secret: String,
    issued_at: Instant,
}

/// Three-legged OAuth 1.0a client signing with HMAC-SHA1.
///
/// Request token secrets live until the matching callback arrives or their
/// TTL runs out, access credentials until they are invalidated. Both are
/// kept in memory.
pub struct HmacSha1Authenticator {
    name: String,
    consumer_key: String,
    consumer_secret: String,
    request_token_url: Url,
    authorize_url: Url,
    access_token_url: Url,
    callback_url: Url,
    client: reqwest::Client,
    request_token_ttl: Duration,
    request_token_secrets: Mutex<HashMap<String, PendingRequestToken>>,
    credentials: RwLock<HashMap<String, OAuthCredentials>>,
}

impl HmacSha1Authenticator {
    pub fn new(
        config: &ProviderConfig,
        public_base_url: &Url,
        client: reqwest::Client,
    ) -> Result<Self, OAuthAuthenticationError> {
        let callback_url = format!(
            "{}/{}",
            public_base_url.as_str().trim_end_matches('/'),
            CALLBACK_PATH
        );

        Ok(Self {
            name: config.name.clone(),
            consumer_key: config.consumer_key.clone(),
            consumer_secret: config.consumer_secret.clone(),
            request_token_url: parse_url(&config.request_token_url)?,
            authorize_url: parse_url(&config.authorize_url)?,
            access_token_url: parse_url(&config.access_token_url)?,
            callback_url: parse_url(&callback_url)?,
            client,
            request_token_ttl: REQUEST_TOKEN_TTL,
            request_token_secrets: Mutex::new(HashMap::new()),
            credentials: RwLock::new(HashMap::new()),
        })
    }

    pub fn with_request_token_ttl(mut self, ttl: Duration) -> Self {
        self.request_token_ttl = ttl;
        self
    }

    /// Number of request tokens still waiting for their callback.
    pub fn pending_request_tokens(&self) -> usize {
        self.request_token_secrets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn credentials(&self, user_id: &str) -> Option<OAuthCredentials> {
        self.credentials
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(user_id)
            .cloned()
    }

    // Sends a signed POST and returns the form encoded response body.
    async fn post_signed(
        &self,
        url: &Url,
        oauth: &OAuthParameters,
        token_secret: Option<&str>,
    ) -> Result<HashMap<String, String>, OAuthAuthenticationError> {
        let query_params: HashMap<String, String> = url.query_pairs().into_owned().collect();
        let header = authorization_header(
            "POST",
            url,
            &query_params,
            oauth,
            &self.consumer_secret,
            token_secret,
        )?;

        let response = self
            .client
            .post(url.clone())
            .header(AUTHORIZATION, header)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::warn!("OAuth provider {} responded with HTTP {}", self.name, status);
            return Err(OAuthAuthenticationError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        Ok(url::form_urlencoded::parse(body.as_bytes())
            .into_owned()
            .collect())
    }
}

#[async_trait]
impl OAuthAuthenticator for HmacSha1Authenticator {
    fn provider_name(&self) -> &str {
        &self.name
    }

    async fn authenticate_url(&self, request_url: &Url) -> Result<String, OAuthAuthenticationError> {
        let query = request_url.query().unwrap_or_default();
        let has_user = decode_parameters(Some(query))
            .get(USER_ID_PARAM)
            .is_some_and(|id| !id.is_empty());
        if !has_user {
            return Err(OAuthAuthenticationError::MissingParameter(USER_ID_PARAM));
        }

        // the whole authenticate query travels through the provider as state
        let mut callback_url = self.callback_url.clone();
        callback_url.set_query(Some(&format!("state={}", encode(query))));

        let oauth = OAuthParameters::new(&self.consumer_key).with_callback(callback_url.as_str());
        let response = self.post_signed(&self.request_token_url, &oauth, None).await?;

        let token = response
            .get("oauth_token")
            .ok_or(OAuthAuthenticationError::MalformedResponse("oauth_token"))?;
        let token_secret = response
            .get("oauth_token_secret")
            .ok_or(OAuthAuthenticationError::MalformedResponse("oauth_token_secret"))?;

        {
            let mut pending = self
                .request_token_secrets
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            // abandoned logins never call back
            pending.retain(|_, p| p.issued_at.elapsed() < self.request_token_ttl);
            pending.insert(
                token.clone(),
                PendingRequestToken {
                    secret: token_secret.clone(),
                    issued_at: Instant::now(),
                },
            );
        }

        let mut authorize_url = self.authorize_url.clone();
        authorize_url
            .query_pairs_mut()
            .append_pair("oauth_token", token);

        tracing::debug!("Obtained request token from {}", self.name);
        Ok(authorize_url.to_string())
    }

    async fn callback(&self, request_url: &Url) -> Result<String, OAuthAuthenticationError> {
        let params: HashMap<String, String> = request_url.query_pairs().into_owned().collect();
        let token = params
            .get("oauth_token")
            .ok_or(OAuthAuthenticationError::MissingParameter("oauth_token"))?;
        let verifier = params
            .get("oauth_verifier")
            .ok_or(OAuthAuthenticationError::MissingParameter("oauth_verifier"))?;

        let state = decode_parameters(extract_state(request_url));
        // the state holds the authenticate query as it was sent, still encoded
        let user_id = state
            .get(USER_ID_PARAM)
            .map(|id| decode_component(id))
            .filter(|id| !id.is_empty())
            .ok_or(OAuthAuthenticationError::MissingParameter(USER_ID_PARAM))?;

        let token_secret = self
            .request_token_secrets
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(token)
            .filter(|p| p.issued_at.elapsed() < self.request_token_ttl)
            .map(|p| p.secret)
            .ok_or_else(|| OAuthAuthenticationError::UnknownRequestToken(token.clone()))?;

        let oauth = OAuthParameters::new(&self.consumer_key)
            .with_token(token)
            .with_verifier(verifier);
        let response = self
            .post_signed(&self.access_token_url, &oauth, Some(&token_secret))
            .await?;

        let credentials = OAuthCredentials {
            token: response
                .get("oauth_token")
                .cloned()
                .ok_or(OAuthAuthenticationError::MalformedResponse("oauth_token"))?,
            token_secret: response
                .get("oauth_token_secret")
                .cloned()
                .ok_or(OAuthAuthenticationError::MalformedResponse("oauth_token_secret"))?,
        };

        self.credentials
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user_id.clone(), credentials);

        tracing::info!("Stored {} access token for user {}", self.name, user_id);
        Ok(user_id)
    }

    fn invalidate_token(&self, user_id: &str) -> bool {
        self.credentials
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(user_id)
            .is_some()
    }

    fn compute_authorization_header(
        &self,
        user_id: &str,
        request_method: &str,
        request_url: &str,
        request_params: &HashMap<String, String>,
    ) -> Result<Option<String>, OAuthAuthenticationError> {
        let Some(credentials) = self.credentials(user_id) else {
            return Ok(None);
        };

        let url = parse_url(request_url)?;
        let oauth = OAuthParameters::new(&self.consumer_key).with_token(&credentials.token);
        authorization_header(
            request_method,
            &url,
            request_params,
            &oauth,
            &self.consumer_secret,
            Some(&credentials.token_secret),
        )
        .map(Some)
    }
}

fn parse_url(url: &str) -> Result<Url, OAuthAuthenticationError> {
    Url::parse(url).map_err(|e| OAuthAuthenticationError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })
}
