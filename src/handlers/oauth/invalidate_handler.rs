use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use super::get_authenticator;
use crate::error::OAuthError;
use crate::models::AppState;
use crate::models::oauth::{ProviderParams, USER_ID_SESSION_KEY};

/// Drops the session user's access token for the provider.
pub async fn invalidate_handler(
    State(app_state): State<AppState>,
    Query(params): Query<ProviderParams>,
    session: Session,
) -> Result<Response, OAuthError> {
    let oauth = get_authenticator(&app_state, params.oauth_provider.as_deref())?;
    let principal: Option<String> = session.get(USER_ID_SESSION_KEY).await?;

    match principal {
        Some(user_id) if oauth.invalidate_token(&user_id) => {
            tracing::info!("Invalidated {} token of user {}", oauth.provider_name(), user_id);
            Ok(StatusCode::OK.into_response())
        }
        principal => Err(OAuthError::TokenNotFound(
            principal.unwrap_or_else(|| "null".to_string()),
        )),
    }
}
