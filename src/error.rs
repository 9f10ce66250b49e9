use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::oauth1::OAuthAuthenticationError;

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("Unsupported OAuth provider {}", .0.as_deref().unwrap_or("null"))]
    UnsupportedProvider(Option<String>),

    #[error("Not found OAuth token for {0}")]
    TokenNotFound(String),

    #[error("Missing required parameter {0}")]
    MissingParameter(&'static str),

    #[error("Invalid redirect location {0}")]
    InvalidRedirect(String),

    #[error("Invalid request URL {url}: {reason}")]
    InvalidRequestUrl { url: String, reason: String },

    #[error(transparent)]
    Authentication(#[from] OAuthAuthenticationError),

    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl OAuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            OAuthError::UnsupportedProvider(_)
            | OAuthError::MissingParameter(_)
            | OAuthError::InvalidRedirect(_) => StatusCode::BAD_REQUEST,
            OAuthError::TokenNotFound(_) => StatusCode::NOT_FOUND,
            OAuthError::Authentication(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            OAuthError::Authentication(e) if e.is_upstream_error() => StatusCode::BAD_GATEWAY,
            OAuthError::Authentication(_)
            | OAuthError::InvalidRequestUrl { .. }
            | OAuthError::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for OAuthError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            OAuthError::UnsupportedProvider(_) => tracing::error!("{}", self),
            _ if status.is_server_error() => tracing::error!("{}", self),
            _ => tracing::debug!("{}", self),
        }

        (status, self.to_string()).into_response()
    }
}
