use thiserror::Error;

#[derive(Debug, Error)]
pub enum OAuthAuthenticationError {
    #[error("Missing required parameter {0}")]
    MissingParameter(&'static str),

    #[error("Unknown or expired request token {0}")]
    UnknownRequestToken(String),

    #[error("Invalid provider URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Provider responded with HTTP {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("Provider response is missing {0}")]
    MalformedResponse(&'static str),

    #[error("Failed to sign request: {0}")]
    Signing(String),
}

impl OAuthAuthenticationError {
    /// Whether the failure was caused by the caller's input rather than the
    /// provider or this service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            OAuthAuthenticationError::MissingParameter(_)
                | OAuthAuthenticationError::UnknownRequestToken(_)
                | OAuthAuthenticationError::InvalidUrl { .. }
        )
    }

    /// Whether the provider misbehaved or could not be reached.
    pub fn is_upstream_error(&self) -> bool {
        matches!(
            self,
            OAuthAuthenticationError::Transport(_)
                | OAuthAuthenticationError::Provider { .. }
                | OAuthAuthenticationError::MalformedResponse(_)
        )
    }
}
