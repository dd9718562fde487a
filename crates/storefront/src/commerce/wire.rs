//! Raw Store API response bodies.
//!
//! Only the fields the storefront reads are declared. Optional fields are
//! `Option` because Medusa omits relations that were not requested through
//! `fields` and returns `null` for unset scalars.

use serde::Deserialize;

/// `GET /store/products`
#[derive(Debug, Deserialize)]
pub struct ProductListResponse {
    pub products: Vec<StoreProduct>,
    pub count: Option<u64>,
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

/// `GET /store/regions`
#[derive(Debug, Deserialize)]
pub struct RegionListResponse {
    pub regions: Vec<StoreRegion>,
}

/// `GET /store/payment-providers`
#[derive(Debug, Deserialize)]
pub struct PaymentProviderListResponse {
    pub payment_providers: Vec<StorePaymentProvider>,
}

/// Error body returned with non-success statuses.
#[derive(Debug, Deserialize)]
pub struct StoreErrorBody {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StoreProduct {
    pub id: String,
    pub handle: String,
    pub title: String,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub images: Option<Vec<StoreImage>>,
    pub variants: Option<Vec<StoreVariant>>,
}

#[derive(Debug, Deserialize)]
pub struct StoreImage {
    pub id: String,
    pub url: String,
    pub rank: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct StoreVariant {
    pub id: String,
    pub title: Option<String>,
    pub sku: Option<String>,
    pub images: Option<Vec<StoreImage>>,
    pub calculated_price: Option<StoreCalculatedPrice>,
}

#[derive(Debug, Deserialize)]
pub struct StoreCalculatedPrice {
    pub calculated_amount: Option<serde_json::Number>,
    pub currency_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StoreRegion {
    pub id: String,
    pub name: String,
    pub currency_code: String,
    pub countries: Option<Vec<StoreCountry>>,
}

#[derive(Debug, Deserialize)]
pub struct StoreCountry {
    pub iso_2: String,
}

#[derive(Debug, Deserialize)]
pub struct StorePaymentProvider {
    pub id: String,
    pub is_enabled: Option<bool>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_product_list_top_level_contract() {
        let body = json!({
            "products": [{
                "id": "prod_1",
                "handle": "sweatshirt",
                "title": "Sweatshirt",
                "description": null,
                "thumbnail": null,
                "images": [{ "id": "img_1", "url": "https://cdn/1.jpg", "rank": 0 }],
                "variants": [{ "id": "variant_1", "title": "S" }]
            }],
            "count": 1,
            "offset": 0,
            "limit": 1
        });
        let parsed: ProductListResponse = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.products.len(), 1);
        assert!(parsed.products[0].variants.as_ref().unwrap()[0].images.is_none());
    }

    #[test]
    fn test_wrapped_product_list_is_rejected() {
        let body = json!({ "response": { "products": [] } });
        assert!(serde_json::from_value::<ProductListResponse>(body).is_err());
    }
}
