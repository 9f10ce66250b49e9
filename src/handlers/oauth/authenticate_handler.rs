use axum::{
    extract::{OriginalUri, Query, State},
    response::Response,
};

use super::{get_authenticator, request_url, temporary_redirect};
use crate::error::OAuthError;
use crate::models::AppState;
use crate::models::oauth::ProviderParams;

/// Sends the browser to the provider's authorization page.
///
/// Besides `oauth_provider` the query carries whatever the client wants back
/// after login (`redirect_after_login`, `userId`, ...). The authenticator
/// round-trips it through the provider as the callback state.
pub async fn authenticate_handler(
    State(app_state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(params): Query<ProviderParams>,
) -> Result<Response, OAuthError> {
    let oauth = get_authenticator(&app_state, params.oauth_provider.as_deref())?;
    let request_url = request_url(&app_state, &uri)?;

    let auth_url = oauth.authenticate_url(&request_url).await?;

    tracing::debug!("Redirecting to {} for authentication", oauth.provider_name());
    temporary_redirect(&auth_url)
}
