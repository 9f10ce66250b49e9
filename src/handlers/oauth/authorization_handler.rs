use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::error::OAuthError;
use crate::models::AppState;
use crate::models::oauth::AuthorizationParams;
use crate::oauth1::query::request_url_parameters;

/// Signed `Authorization` header value for a request the user is about to
/// send to the provider. Responds with no content when the provider is
/// unknown or the user holds no token for it.
pub async fn authorization_handler(
    State(app_state): State<AppState>,
    Query(params): Query<AuthorizationParams>,
) -> Result<Response, OAuthError> {
    let Some(oauth) = app_state
        .providers
        .get_authenticator(params.oauth_provider.as_deref())
    else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    let request_url = params
        .request_url
        .ok_or(OAuthError::MissingParameter("request_url"))?;
    let user_id = params
        .user_id
        .ok_or(OAuthError::MissingParameter("user_id"))?;
    let request_method = params.request_method.unwrap_or_else(|| "GET".to_string());

    let request_params = request_url_parameters(&request_url);

    match oauth.compute_authorization_header(&user_id, &request_method, &request_url, &request_params)? {
        Some(header) => Ok(header.into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}
