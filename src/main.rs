mod error;
mod handlers;
mod models;
mod oauth1;

use axum::{Router, routing::get};
use time::Duration;
use tower_http::trace::{DefaultMakeSpan, TraceLayer};
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use handlers::{authenticate_handler, authorization_handler, callback_handler, invalidate_handler};
use models::{AppConfig, AppState};
use oauth1::OAuthAuthenticatorProvider;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "oauth1_gateway=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let app_config = AppConfig::from_env()?;
    let providers = OAuthAuthenticatorProvider::from_config(&app_config, reqwest::Client::new())?;
    tracing::info!("OAuth 1.0 providers: {:?}", providers.provider_names());

    let bind_address = app_config.bind_address;
    let app_state = AppState {
        config: app_config,
        providers,
    };

    let app = create_router(app_state);

    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    tracing::info!("listening on http://{}", bind_address);
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

pub(crate) fn create_router(app_state: AppState) -> Router {
    let session_store = MemoryStore::default();
    let session_expiry =
        Expiry::OnInactivity(Duration::hours(app_state.config.session_inactivity_hours));
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(session_expiry);

    Router::new()
        .route("/oauth/1.0/authenticate", get(authenticate_handler))
        .route("/oauth/1.0/callback", get(callback_handler))
        .route("/oauth/1.0/invalidate", get(invalidate_handler))
        .route("/oauth/1.0/authorization", get(authorization_handler))
        .layer(session_layer)
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
        .with_state(app_state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
