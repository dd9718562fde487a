//! Medusa Store API client implementation.
//!
//! Uses `reqwest` for HTTP and `serde_json` for response parsing. Every
//! response body is read as text first so contract violations can be logged
//! with the offending payload.

use std::sync::Arc;
use std::time::Duration;

use medusa_storefront_core::{PaymentProvider, Product, Region, RegionId, region_for_country};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use crate::config::{MedusaConfig, ensure_trailing_slash};

use super::CommerceError;
use super::conversions::{convert_payment_providers, convert_product, convert_region};
use super::wire::{
    PaymentProviderListResponse, ProductListResponse, RegionListResponse, StoreErrorBody,
};

/// Header carrying the publishable API key on every Store API request.
const PUBLISHABLE_KEY_HEADER: &str = "x-publishable-api-key";

/// Relations requested with product lookups.
const PRODUCT_FIELDS: &str = "*images,*variants.images,*variants.calculated_price";

// =============================================================================
// StoreClient
// =============================================================================

/// Client for the Medusa Store API.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct StoreClient {
    inner: Arc<StoreClientInner>,
}

struct StoreClientInner {
    client: reqwest::Client,
    base_url: Url,
    publishable_key: String,
}

impl StoreClient {
    /// Create a new Store API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &MedusaConfig) -> Result<Self, CommerceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("medusa-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        // Paths are joined relative to the backend URL, so it must end in `/`
        // for a prefix such as `/medusa` to survive.
        let mut base_url = config.backend_url.clone();
        ensure_trailing_slash(&mut base_url);

        Ok(Self {
            inner: Arc::new(StoreClientInner {
                client,
                base_url,
                publishable_key: config.publishable_key.clone(),
            }),
        })
    }

    /// Execute a GET request and decode the JSON body.
    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, CommerceError> {
        let mut url = self.inner.base_url.join(path)?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        let response = self
            .inner
            .client
            .get(url)
            .header(PUBLISHABLE_KEY_HEADER, &self.inner.publishable_key)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();

        // Check for rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(CommerceError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                path = %path,
                body = %response_text.chars().take(500).collect::<String>(),
                "Store API returned non-success status"
            );
            let message = serde_json::from_str::<StoreErrorBody>(&response_text)
                .ok()
                .and_then(|body| body.message.or(body.kind))
                .unwrap_or_else(|| response_text.chars().take(200).collect());
            return Err(CommerceError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                path = %path,
                body = %response_text.chars().take(500).collect::<String>(),
                "Store API response does not match the expected contract"
            );
            CommerceError::Contract(e)
        })
    }

    // =========================================================================
    // Region Methods
    // =========================================================================

    /// List all regions.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_regions(&self) -> Result<Vec<Region>, CommerceError> {
        let data: RegionListResponse = self.get("store/regions", &[]).await?;
        Ok(data.regions.into_iter().map(convert_region).collect())
    }

    /// Get the region serving a country code.
    ///
    /// Returns `Ok(None)` when no region includes the country.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(country_code = %country_code))]
    pub async fn get_region(&self, country_code: &str) -> Result<Option<Region>, CommerceError> {
        let regions = self.list_regions().await?;
        let region = region_for_country(&regions, country_code).cloned();
        if region.is_none() {
            debug!(regions = regions.len(), "No region serves country");
        }
        Ok(region)
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Get a product by its handle, priced for a region.
    ///
    /// Returns `Ok(None)` when no product has the handle.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(handle = %handle, region_id = %region_id))]
    pub async fn get_product_by_handle(
        &self,
        handle: &str,
        region_id: &RegionId,
    ) -> Result<Option<Product>, CommerceError> {
        let data: ProductListResponse = self
            .get(
                "store/products",
                &[
                    ("handle", handle),
                    ("region_id", region_id.as_str()),
                    ("limit", "1"),
                    ("fields", PRODUCT_FIELDS),
                ],
            )
            .await?;

        Ok(data
            .products
            .into_iter()
            .find(|p| p.handle == handle)
            .map(convert_product))
    }

    // =========================================================================
    // Payment Methods
    // =========================================================================

    /// List the enabled payment providers of a region.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(region_id = %region_id))]
    pub async fn list_payment_providers(
        &self,
        region_id: &RegionId,
    ) -> Result<Vec<PaymentProvider>, CommerceError> {
        let data: PaymentProviderListResponse = self
            .get(
                "store/payment-providers",
                &[("region_id", region_id.as_str())],
            )
            .await?;
        Ok(convert_payment_providers(data.payment_providers))
    }

    // =========================================================================
    // Health
    // =========================================================================

    /// Check that the backend answers its health endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is unreachable or unhealthy.
    pub async fn ping(&self) -> Result<(), CommerceError> {
        let url = self.inner.base_url.join("health")?;
        let response = self.inner.client.get(url).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(CommerceError::Status {
                status: status.as_u16(),
                message: "health check failed".to_string(),
            })
        }
    }
}
