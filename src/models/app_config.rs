use std::net::SocketAddr;
use url::Url;

use crate::oauth1::OAuthAuthenticatorProvider;

const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:10000";
const DEFAULT_SESSION_INACTIVITY_HOURS: i64 = 6;

#[derive(Clone)]
pub struct ProviderConfig {
    pub name: String,
    pub consumer_key: String,
    pub consumer_secret: String,
    pub request_token_url: String,
    pub authorize_url: String,
    pub access_token_url: String,
}

#[derive(Clone)]
pub struct AppConfig {
    pub bind_address: SocketAddr,
    pub public_base_url: Url,
    pub providers: Vec<ProviderConfig>,
    pub session_inactivity_hours: i64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        use dotenvy::dotenv;
        use std::env;

        dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).ok_or_else(|| format!("{} not found", key));

        let bind_address = lookup("BIND_ADDRESS")
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string())
            .parse()
            .map_err(|e| format!("BIND_ADDRESS is invalid: {}", e))?;

        let public_base_url = Url::parse(&required("PUBLIC_BASE_URL")?)
            .map_err(|e| format!("PUBLIC_BASE_URL is invalid: {}", e))?;

        let session_inactivity_hours = match lookup("SESSION_INACTIVITY_HOURS") {
            Some(hours) => hours
                .parse()
                .map_err(|e| format!("SESSION_INACTIVITY_HOURS is invalid: {}", e))?,
            None => DEFAULT_SESSION_INACTIVITY_HOURS,
        };

        let mut providers = Vec::new();
        let names = lookup("OAUTH1_PROVIDERS").unwrap_or_default();
        for name in names.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            let prefix = format!("OAUTH1_{}", name.to_uppercase().replace('-', "_"));
            providers.push(ProviderConfig {
                name: name.to_string(),
                consumer_key: required(&format!("{}_CONSUMER_KEY", prefix))?,
                consumer_secret: required(&format!("{}_CONSUMER_SECRET", prefix))?,
                request_token_url: required(&format!("{}_REQUEST_TOKEN_URL", prefix))?,
                authorize_url: required(&format!("{}_AUTHORIZE_URL", prefix))?,
                access_token_url: required(&format!("{}_ACCESS_TOKEN_URL", prefix))?,
            });
        }

        Ok(Self {
            bind_address,
            public_base_url,
            providers,
            session_inactivity_hours,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub providers: OAuthAuthenticatorProvider,
}
