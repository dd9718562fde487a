//! Page data loaders.
//!
//! One data-access function per page. Each resolves the region for the
//! country code in the URL first, then fetches what the page needs scoped to
//! that region. A missing region or product is reported as
//! [`AppError::NotFound`]; transport and contract failures propagate as
//! [`AppError::Commerce`].

use medusa_storefront_core::{PaymentProvider, Product, Region};
use tracing::instrument;

use crate::commerce::StoreClient;
use crate::error::{AppError, Result};

/// Data behind the product page.
#[derive(Debug, Clone)]
pub struct ProductPageData {
    pub region: Region,
    pub product: Product,
}

/// Data behind the checkout payment step.
#[derive(Debug, Clone)]
pub struct PaymentStepData {
    pub region: Region,
    pub providers: Vec<PaymentProvider>,
}

/// Resolve the region serving `country_code`.
///
/// # Errors
///
/// Returns `AppError::NotFound` if no region serves the country.
pub async fn load_region(store: &StoreClient, country_code: &str) -> Result<Region> {
    store
        .get_region(country_code)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("region for country '{country_code}'")))
}

/// Load the region and product for `/{country_code}/products/{handle}`.
///
/// # Errors
///
/// Returns `AppError::NotFound` for an unknown country code or handle, and
/// `AppError::Commerce` if the Store API fails.
#[instrument(skip(store))]
pub async fn load_product_page(
    store: &StoreClient,
    country_code: &str,
    handle: &str,
) -> Result<ProductPageData> {
    let region = load_region(store, country_code).await?;

    let product = store
        .get_product_by_handle(handle, &region.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product '{handle}'")))?;

    Ok(ProductPageData { region, product })
}

/// Load the region and its payment providers for the payment step.
///
/// # Errors
///
/// Returns `AppError::NotFound` for an unknown country code, and
/// `AppError::Commerce` if the Store API fails.
#[instrument(skip(store))]
pub async fn load_payment_step(store: &StoreClient, country_code: &str) -> Result<PaymentStepData> {
    let region = load_region(store, country_code).await?;
    let providers = store.list_payment_providers(&region.id).await?;

    Ok(PaymentStepData { region, providers })
}
