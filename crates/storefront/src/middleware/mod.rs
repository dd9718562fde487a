//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. CSP nonce (generate per-request nonce for inline scripts)
//! 5. Security headers (CSP allowing the payment scripts, frame and sniffing protection)
//! 6. Rate limiting on the tokenizer submission endpoint (governor)

pub mod csp;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;

pub use csp::{CspNonce, csp_nonce_middleware};
pub use rate_limit::tokenizer_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
