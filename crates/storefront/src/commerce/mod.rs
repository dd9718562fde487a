//! Medusa Store API client.
//!
//! # Architecture
//!
//! - Plain JSON over `reqwest`, authenticated with the publishable API key
//! - Medusa is source of truth - NO local sync and NO local caching; every
//!   page render fetches what it needs and discards it afterwards
//! - Wire types (`wire`) are converted to domain types from
//!   `medusa-storefront-core` (`conversions`) at the client boundary
//!
//! # Response Contract
//!
//! List endpoints answer with the collection at the top level of the body
//! (`{ "products": [...], "count": 1, ... }`). A body that does not match is
//! rejected as [`CommerceError::Contract`] rather than guessed at.
//!
//! # Example
//!
//! ```rust,ignore
//! use medusa_storefront::commerce::StoreClient;
//!
//! let client = StoreClient::new(&config.medusa)?;
//!
//! let region = client.get_region("us").await?;
//! let product = client.get_product_by_handle("sweatshirt", &region.unwrap().id).await?;
//! ```

mod client;
mod conversions;
pub mod wire;

pub use client::StoreClient;

use thiserror::Error;

/// Errors that can occur when talking to the Medusa Store API.
#[derive(Debug, Error)]
pub enum CommerceError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("Store API returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body, or a truncated body.
        message: String,
    },

    /// The response body did not match the expected contract.
    #[error("Unexpected response shape: {0}")]
    Contract(#[from] serde_json::Error),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// A request URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = CommerceError::Status {
            status: 401,
            message: "A valid publishable key is required".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Store API returned 401: A valid publishable key is required"
        );
    }

    #[test]
    fn test_rate_limited_error() {
        let err = CommerceError::RateLimited(60);
        assert_eq!(err.to_string(), "Rate limited, retry after 60 seconds");
    }
}
