//! Route table and HTTP layers.

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::web::handlers::{health, index, receive_webhook, AppState};

/// Build the application router.
///
/// `GET /` is only registered outside production.
pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/health", get(health))
        .route("/webhook", post(receive_webhook));

    if !state.config.run_mode.is_production() {
        router = router.route("/", get(index));
    }

    router
        .layer(DefaultBodyLimit::max(state.config.max_body_bytes))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ORIGIN,
            header::CONTENT_TYPE,
            header::CONTENT_LENGTH,
            header::ACCEPT_ENCODING,
            header::AUTHORIZATION,
            HeaderName::from_static("x-csrf-token"),
            HeaderName::from_static("x-webhook-signature"),
            HeaderName::from_static("x-webhook-timestamp"),
            HeaderName::from_static("x-webhook-id"),
            HeaderName::from_static("x-idempotency-key"),
        ])
}
