mod authenticate_handler;
mod authorization_handler;
mod callback_handler;
mod invalidate_handler;

pub use authenticate_handler::authenticate_handler;
pub use authorization_handler::authorization_handler;
pub use callback_handler::callback_handler;
pub use invalidate_handler::invalidate_handler;

use axum::{
    http::{HeaderValue, StatusCode, Uri, header::LOCATION},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use url::Url;

use crate::error::OAuthError;
use crate::models::AppState;
use crate::oauth1::OAuthAuthenticator;

fn get_authenticator(
    app_state: &AppState,
    provider_name: Option<&str>,
) -> Result<Arc<dyn OAuthAuthenticator>, OAuthError> {
    app_state
        .providers
        .get_authenticator(provider_name)
        .ok_or_else(|| OAuthError::UnsupportedProvider(provider_name.map(str::to_string)))
}

// Full URL of the incoming request as the browser sees it.
fn request_url(app_state: &AppState, uri: &Uri) -> Result<Url, OAuthError> {
    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    let url = format!(
        "{}{}",
        app_state.config.public_base_url.as_str().trim_end_matches('/'),
        path_and_query
    );

    Url::parse(&url).map_err(|e| OAuthError::InvalidRequestUrl {
        url,
        reason: e.to_string(),
    })
}

fn temporary_redirect(location: &str) -> Result<Response, OAuthError> {
    let location = HeaderValue::from_str(location)
        .map_err(|_| OAuthError::InvalidRedirect(location.to_string()))?;
    Ok((StatusCode::TEMPORARY_REDIRECT, [(LOCATION, location)]).into_response())
}
