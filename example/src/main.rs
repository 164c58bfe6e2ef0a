use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};
use web_push_aesgcm::{Error, PushClient, VapidKeys, WebPushRequest};

struct App {
    push: PushClient,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_filter(env_filter),
        )
        .init();

    let vapid = vapid_keys()?;
    tracing::info!(public_key = vapid.public_key_b64(), "vapid keys ready");

    let app = Arc::new(App {
        push: PushClient::new(vapid)?,
    });
    let router = Router::new()
        .route("/api/vapid.json", get(vapid_json))
        .route("/api/send", post(send))
        .with_state(app);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3030").await?;
    tracing::info!("listening on 0.0.0.0:3030");
    axum::serve(listener, router).await?;

    Ok(())
}

/// Loads the VAPID signing key from `VAPID_PRIVATE_KEY_JWK`, falling back
/// to a freshly generated key. Subscriptions bound to a fresh key stop
/// working on restart.
fn vapid_keys() -> Result<VapidKeys, Error> {
    let contact = std::env::var("VAPID_CONTACT_URI")
        .unwrap_or_else(|_| "mailto:admin@example.com".to_owned());

    match std::env::var("VAPID_PRIVATE_KEY_JWK") {
        Ok(jwk) => VapidKeys::from_jwk(&jwk, contact),
        Err(_) => {
            let vapid = VapidKeys::generate(contact);
            tracing::warn!("VAPID_PRIVATE_KEY_JWK is not set, using a fresh key");
            tracing::info!(jwk = %vapid.to_jwk_string(), "export this key to keep subscriptions");
            Ok(vapid)
        }
    }
}

async fn vapid_json(State(app): State<Arc<App>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "publicKey": app.push.vapid().public_key_b64() }))
}

async fn send(
    State(app): State<Arc<App>>,
    Json(request): Json<WebPushRequest>,
) -> impl IntoResponse {
    match app.push.send(request).await {
        Ok(response) => {
            let status = response.status();
            (status, response.into_body()).into_response()
        }
        Err(
            err @ (Error::InvalidEndpoint | Error::InvalidSubscriptionKey | Error::KeyAgreement),
        ) => (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
        Err(err) => (StatusCode::BAD_GATEWAY, err.to_string()).into_response(),
    }
}
