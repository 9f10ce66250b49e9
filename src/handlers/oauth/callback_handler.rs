use axum::{
    extract::{OriginalUri, State},
    response::Response,
};
use tower_sessions::Session;

use super::{get_authenticator, request_url, temporary_redirect};
use crate::error::OAuthError;
use crate::models::AppState;
use crate::models::oauth::USER_ID_SESSION_KEY;
use crate::oauth1::query::{decode_parameters, extract_state};

/// Provider redirect target: finishes the handshake, remembers the user in
/// the session and sends the browser on to `redirect_after_login`.
pub async fn callback_handler(
    State(app_state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    session: Session,
) -> Result<Response, OAuthError> {
    let request_url = request_url(&app_state, &uri)?;
    let params = decode_parameters(extract_state(&request_url));

    let oauth = get_authenticator(&app_state, params.get("oauth_provider").map(String::as_str))?;
    let redirect_after_login = params
        .get("redirect_after_login")
        .filter(|r| !r.is_empty())
        .ok_or(OAuthError::MissingParameter("redirect_after_login"))?;

    let user_id = oauth.callback(&request_url).await?;

    session.insert(USER_ID_SESSION_KEY, &user_id).await?;
    tracing::info!(
        "OAuth callback from {} completed for user {}",
        oauth.provider_name(),
        user_id
    );

    temporary_redirect(redirect_after_login)
}
