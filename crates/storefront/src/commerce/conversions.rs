//! Conversions from Store API wire types to domain types.

use std::str::FromStr;

use medusa_storefront_core::{
    CurrencyCode, ImageId, PaymentProvider, PaymentProviderId, Price, Product, ProductId,
    ProductImage, ProductVariant, Region, RegionId, VariantId,
};
use rust_decimal::Decimal;

use super::wire::{
    StoreCalculatedPrice, StoreImage, StorePaymentProvider, StoreProduct, StoreRegion,
    StoreVariant,
};

/// Convert a product, ordering images by rank when the API provides one.
pub fn convert_product(product: StoreProduct) -> Product {
    let mut images = product.images.unwrap_or_default();
    // Stable sort keeps API order among unranked images.
    images.sort_by_key(|image| image.rank.unwrap_or(i64::MAX));

    Product {
        id: ProductId::new(product.id),
        handle: product.handle,
        title: product.title,
        description: product.description.filter(|d| !d.trim().is_empty()),
        thumbnail: product.thumbnail,
        images: images.into_iter().map(convert_image).collect(),
        variants: product
            .variants
            .unwrap_or_default()
            .into_iter()
            .map(convert_variant)
            .collect(),
    }
}

fn convert_image(image: StoreImage) -> ProductImage {
    ProductImage {
        id: ImageId::new(image.id),
        url: image.url,
    }
}

fn convert_variant(variant: StoreVariant) -> ProductVariant {
    ProductVariant {
        id: VariantId::new(variant.id),
        title: variant.title,
        sku: variant.sku,
        images: variant
            .images
            .map(|images| images.into_iter().map(convert_image).collect()),
        price: variant.calculated_price.and_then(convert_price),
    }
}

/// Convert a calculated price. Prices without an amount or currency are
/// dropped (the variant renders without a price).
fn convert_price(price: StoreCalculatedPrice) -> Option<Price> {
    let amount = price.calculated_amount?;
    let currency_code = price.currency_code?;

    match Decimal::from_str(&amount.to_string())
        .or_else(|_| Decimal::from_scientific(&amount.to_string()))
    {
        Ok(amount) => Some(Price::new(amount, CurrencyCode::new(&currency_code))),
        Err(e) => {
            tracing::warn!(amount = %amount, error = %e, "Unparseable calculated price");
            None
        }
    }
}

/// Convert a region, normalizing country codes to lowercase.
pub fn convert_region(region: StoreRegion) -> Region {
    Region {
        id: RegionId::new(region.id),
        name: region.name,
        currency_code: CurrencyCode::new(&region.currency_code),
        countries: region
            .countries
            .unwrap_or_default()
            .into_iter()
            .map(|c| c.iso_2.to_ascii_lowercase())
            .collect(),
    }
}

/// Convert enabled payment providers, preserving API order.
pub fn convert_payment_providers(providers: Vec<StorePaymentProvider>) -> Vec<PaymentProvider> {
    providers
        .into_iter()
        .filter(|p| p.is_enabled != Some(false))
        .map(|p| PaymentProvider::from_id(PaymentProviderId::new(p.id)))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use serde_json::json;

    use super::*;

    fn store_product(value: serde_json::Value) -> StoreProduct {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_convert_product_orders_images_by_rank() {
        let product = convert_product(store_product(json!({
            "id": "prod_1",
            "handle": "sweatshirt",
            "title": "Sweatshirt",
            "images": [
                { "id": "img_b", "url": "https://cdn/b.jpg", "rank": 1 },
                { "id": "img_a", "url": "https://cdn/a.jpg", "rank": 0 },
                { "id": "img_c", "url": "https://cdn/c.jpg" }
            ]
        })));

        let ids: Vec<&str> = product.images.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["img_a", "img_b", "img_c"]);
        assert!(product.variants.is_empty());
    }

    #[test]
    fn test_convert_product_blank_description_is_none() {
        let product = convert_product(store_product(json!({
            "id": "prod_1",
            "handle": "mug",
            "title": "Mug",
            "description": "   "
        })));
        assert!(product.description.is_none());
    }

    #[test]
    fn test_convert_variant_price_and_images() {
        let product = convert_product(store_product(json!({
            "id": "prod_1",
            "handle": "sweatshirt",
            "title": "Sweatshirt",
            "variants": [{
                "id": "variant_1",
                "title": "L",
                "images": [{ "id": "img_a", "url": "https://cdn/a.jpg" }],
                "calculated_price": { "calculated_amount": 19.99, "currency_code": "usd" }
            }, {
                "id": "variant_2",
                "calculated_price": { "calculated_amount": null, "currency_code": "usd" }
            }]
        })));

        let first = &product.variants[0];
        assert_eq!(first.price.as_ref().unwrap().display(), "$19.99");
        assert_eq!(first.images.as_ref().unwrap().len(), 1);

        let second = &product.variants[1];
        assert!(second.price.is_none());
        assert!(second.images.is_none());
    }

    #[test]
    fn test_convert_region_lowercases_countries() {
        let region: StoreRegion = serde_json::from_value(json!({
            "id": "reg_1",
            "name": "Europe",
            "currency_code": "eur",
            "countries": [{ "iso_2": "DK" }, { "iso_2": "de" }]
        }))
        .unwrap();
        let region = convert_region(region);
        assert_eq!(region.countries, ["dk", "de"]);
        assert_eq!(region.currency_code.as_str(), "EUR");
    }

    #[test]
    fn test_convert_payment_providers_skips_disabled() {
        let providers: Vec<StorePaymentProvider> = serde_json::from_value(json!([
            { "id": "pp_stripe_stripe", "is_enabled": true },
            { "id": "pp_paypal_paypal", "is_enabled": false },
            { "id": "fluidpay" }
        ]))
        .unwrap();
        let ids: Vec<String> = convert_payment_providers(providers)
            .into_iter()
            .map(|p| p.id.to_string())
            .collect();
        assert_eq!(ids, ["pp_stripe_stripe", "fluidpay"]);
    }
}
