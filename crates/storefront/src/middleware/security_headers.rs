//! Security headers middleware for XSS, clickjacking, and isolation protection.
//!
//! Adds restrictive security headers to all responses. The policy is locked
//! down except for what the payment step needs: the remote tokenizer script
//! and its iframe, and Stripe.js with its card element frames.

use axum::{
    extract::{Request, State},
    http::{
        HeaderName, HeaderValue,
        header::{
            CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS,
        },
    },
    middleware::Next,
    response::Response,
};

use crate::config::PaymentsConfig;
use crate::state::AppState;

use super::CspNonce;

/// Stripe.js script and card element frames.
const STRIPE_JS_ORIGIN: &str = "https://js.stripe.com";
/// Stripe API calls made by Stripe.js.
const STRIPE_API_ORIGIN: &str = "https://api.stripe.com";

/// Build the content security policy for a request.
///
/// ```text
/// default-src 'none';
/// script-src 'self' 'nonce-…' <tokenizer origin> https://js.stripe.com;
/// style-src 'self';
/// font-src 'self';
/// img-src 'self' https: data:;
/// connect-src 'self' <tokenizer origin> https://api.stripe.com;
/// frame-src <tokenizer origin> https://js.stripe.com;
/// object-src 'none';
/// base-uri 'self';
/// form-action 'self';
/// frame-ancestors 'none';
/// upgrade-insecure-requests
/// ```
///
/// Product images live on whatever file host the commerce backend is
/// configured with, hence `img-src https:`.
#[must_use]
pub fn content_security_policy(nonce: &str, payments: &PaymentsConfig) -> String {
    let tokenizer = payments.tokenizer_origin();
    let nonce_source = if nonce.is_empty() {
        String::new()
    } else {
        format!(" 'nonce-{nonce}'")
    };

    format!(
        "default-src 'none'; \
         script-src 'self'{nonce_source} {tokenizer} {STRIPE_JS_ORIGIN}; \
         style-src 'self'; \
         font-src 'self'; \
         img-src 'self' https: data:; \
         connect-src 'self' {tokenizer} {STRIPE_API_ORIGIN}; \
         frame-src {tokenizer} {STRIPE_JS_ORIGIN}; \
         object-src 'none'; \
         base-uri 'self'; \
         form-action 'self'; \
         frame-ancestors 'none'; \
         upgrade-insecure-requests"
    )
}

/// Add security headers to all responses.
///
/// Headers applied:
/// - `X-Frame-Options: DENY` - Prevent clickjacking
/// - `X-Content-Type-Options: nosniff` - Prevent MIME sniffing
/// - `Referrer-Policy: strict-origin-when-cross-origin` - Payment frames need the origin
/// - `Content-Security-Policy` - See [`content_security_policy`]
/// - `Permissions-Policy` - Deny sensitive features, allow `payment` for self
/// - `Cache-Control: no-store, max-age=0` - Prices and stock are per request
/// - `Cross-Origin-Resource-Policy: same-origin` - Resource isolation
/// - `X-DNS-Prefetch-Control: off` - Prevent DNS prefetch leakage
///
/// No `Cross-Origin-Embedder-Policy`: neither payment iframe sets CORP headers.
pub async fn security_headers_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let nonce = request
        .extensions()
        .get::<CspNonce>()
        .map(|n| n.value().to_string())
        .unwrap_or_default();

    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(
        REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    let policy = content_security_policy(&nonce, &state.config().payments);
    match HeaderValue::from_str(&policy) {
        Ok(value) => {
            headers.insert(CONTENT_SECURITY_POLICY, value);
        }
        Err(e) => {
            tracing::error!(error = %e, "Invalid content security policy header");
        }
    }

    headers.insert(
        HeaderName::from_static("permissions-policy"),
        HeaderValue::from_static(
            "accelerometer=(), \
             autoplay=(), \
             browsing-topics=(), \
             camera=(), \
             display-capture=(), \
             geolocation=(), \
             gyroscope=(), \
             magnetometer=(), \
             microphone=(), \
             midi=(), \
             payment=(self), \
             usb=(), \
             xr-spatial-tracking=()",
        ),
    );

    headers.insert(
        HeaderName::from_static("cache-control"),
        HeaderValue::from_static("no-store, max-age=0"),
    );

    headers.insert(
        HeaderName::from_static("cross-origin-resource-policy"),
        HeaderValue::from_static("same-origin"),
    );

    headers.insert(
        HeaderName::from_static("x-dns-prefetch-control"),
        HeaderValue::from_static("off"),
    );

    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use url::Url;

    use super::*;

    fn payments() -> PaymentsConfig {
        PaymentsConfig {
            fluidpay_public_key: None,
            tokenizer_script_url: Url::parse("https://sandbox.fluidpay.com/tokenizer/tokenizer.js")
                .unwrap(),
            stripe_publishable_key: None,
        }
    }

    #[test]
    fn test_policy_allows_tokenizer_and_nonce() {
        let policy = content_security_policy("abc123", &payments());
        assert!(policy.contains(
            "script-src 'self' 'nonce-abc123' https://sandbox.fluidpay.com https://js.stripe.com;"
        ));
        assert!(policy.contains("frame-src https://sandbox.fluidpay.com https://js.stripe.com;"));
        assert!(policy.contains("frame-ancestors 'none'"));
    }

    #[test]
    fn test_policy_without_nonce() {
        let policy = content_security_policy("", &payments());
        assert!(!policy.contains("nonce-"));
        assert!(HeaderValue::from_str(&policy).is_ok());
    }
}
