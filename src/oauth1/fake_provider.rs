//! In-process OAuth 1.0 provider for tests.

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
};
use percent_encoding::percent_decode_str;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct FakeProvider {
    pub authorization_headers: Arc<Mutex<Vec<String>>>,
    issued: Arc<AtomicUsize>,
}

impl FakeProvider {
    /// `oauth_callback` sent with the first request-token call, decoded.
    pub fn oauth_callback(&self) -> Option<String> {
        let headers = self.authorization_headers.lock().unwrap();
        let header = headers.first()?;
        let start = header.find("oauth_callback=\"")? + "oauth_callback=\"".len();
        let end = start + header[start..].find('"')?;
        Some(
            percent_decode_str(&header[start..end])
                .decode_utf8_lossy()
                .into_owned(),
        )
    }
}

async fn request_token(State(fake): State<FakeProvider>, headers: HeaderMap) -> String {
    record(&fake, &headers);
    // req-token-1, req-token-2, ...
    let n = fake.issued.fetch_add(1, Ordering::SeqCst) + 1;
    format!(
        "oauth_token=req-token-{}&oauth_token_secret=req-secret&oauth_callback_confirmed=true",
        n
    )
}

async fn access_token(State(fake): State<FakeProvider>, headers: HeaderMap) -> String {
    record(&fake, &headers);
    "oauth_token=access-token&oauth_token_secret=access-secret".to_string()
}

fn record(fake: &FakeProvider, headers: &HeaderMap) {
    let header = headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default()
        .to_string();
    fake.authorization_headers.lock().unwrap().push(header);
}

/// Serves `/request_token`, `/access_token` and a failing `/broken` on a
/// random local port. Returns the base URL.
pub async fn spawn_fake_provider() -> (String, FakeProvider) {
    let fake = FakeProvider::default();
    let app = Router::new()
        .route("/request_token", post(request_token))
        .route("/access_token", post(access_token))
        .route(
            "/broken",
            post(|| async { (StatusCode::UNAUTHORIZED, "bad consumer") }),
        )
        .with_state(fake.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), fake)
}
