//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                               - Liveness check
//! GET  /health/ready                         - Readiness check (Store API reachable)
//!
//! # Products
//! GET  /{country_code}/products/{handle}     - Product detail (`?v_id=` selects a variant)
//! GET  /products/{handle}                    - Redirect to the default region's product page
//!
//! # Checkout
//! GET  /{country_code}/checkout/payment      - Payment step (`?provider=` selects a method)
//! POST /checkout/payment/fluidpay            - Tokenizer submission result (fragment)
//!
//! # Assets
//! GET  /static/*                             - CSS and the tokenizer glue script
//! ```

pub mod checkout;
pub mod products;

use std::path::Path;
use std::time::Duration;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::config::StorefrontConfig;
use crate::middleware;
use crate::state::AppState;

/// Metadata rendered into the layout's `<head>`.
#[derive(Debug, Clone)]
pub struct PageMeta {
    /// Full `<title>` text.
    pub title: String,
    pub description: String,
    /// Absolute canonical URL, also used for `og:url`.
    pub canonical_url: String,
    pub og_image: Option<String>,
    pub store_name: String,
    /// Remote tokenizer script injected on every page.
    pub tokenizer_url: String,
    /// CSP nonce for inline scripts.
    pub nonce: String,
}

impl PageMeta {
    /// Build page metadata for `path` with the store name appended to `title`.
    #[must_use]
    pub fn new(config: &StorefrontConfig, title: &str, description: &str, path: &str) -> Self {
        Self {
            title: format!("{title} | {}", config.store_name),
            description: description.to_string(),
            canonical_url: config.absolute_url(path),
            og_image: None,
            store_name: config.store_name.clone(),
            tokenizer_url: config.payments.tokenizer_script_url.to_string(),
            nonce: String::new(),
        }
    }

    /// Set the OpenGraph image.
    #[must_use]
    pub fn with_og_image(mut self, url: Option<String>) -> Self {
        self.og_image = url;
        self
    }

    /// Set the CSP nonce.
    #[must_use]
    pub fn with_nonce(mut self, nonce: &str) -> Self {
        self.nonce = nonce.to_string();
        self
    }
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new().route("/{handle}", get(products::show))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new().route("/payment", get(checkout::payment_step))
}

/// Create the tokenizer submission router (rate limited).
pub fn tokenizer_routes() -> Router<AppState> {
    Router::new()
        .route("/fluidpay", post(checkout::fluidpay_submission))
        .layer(middleware::tokenizer_rate_limiter())
}

/// Create all page routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products/{handle}", get(products::region_redirect))
        .nest("/{country_code}/products", product_routes())
        .nest("/{country_code}/checkout", checkout_routes())
        .nest("/checkout/payment", tokenizer_routes())
}

/// Build the complete application: routes, health checks, static files and
/// the middleware stack.
///
/// `static_dir` is the directory served under `/static`.
pub fn app(state: AppState, static_dir: impl AsRef<Path>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes())
        .nest_service("/static", ServeDir::new(static_dir.as_ref()))
        // Layers run bottom-up on requests: the nonce must exist before
        // the security headers middleware reads it.
        .layer(from_fn_with_state(
            state.clone(),
            middleware::security_headers_middleware,
        ))
        .layer(from_fn(middleware::csp_nonce_middleware))
        .layer(from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the Store API is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
