//! Catalog types read from the Medusa Store API.
//!
//! These types provide a clean, ergonomic API separate from the raw wire
//! format. The commerce platform owns, creates and invalidates all of this
//! data; the storefront only reads it and re-shapes it for display.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::{CurrencyCode, ImageId, Price, ProductId, RegionId, VariantId};

// =============================================================================
// Product Types
// =============================================================================

/// Product image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    /// Medusa image ID.
    pub id: ImageId,
    /// Image URL.
    pub url: String,
}

/// A purchasable variant of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductVariant {
    /// Medusa variant ID.
    pub id: VariantId,
    /// Variant title (e.g., "Large / Blue").
    pub title: Option<String>,
    /// Stock keeping unit.
    pub sku: Option<String>,
    /// Images linked to this variant.
    ///
    /// `None` when the API omitted the field; variants don't carry images by
    /// default.
    pub images: Option<Vec<ProductImage>>,
    /// Calculated price in the requested region.
    pub price: Option<Price>,
}

/// A product with its images and variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Medusa product ID.
    pub id: ProductId,
    /// URL handle (e.g., "sweatshirt").
    pub handle: String,
    /// Product title.
    pub title: String,
    /// Plain-text description.
    pub description: Option<String>,
    /// Thumbnail URL.
    pub thumbnail: Option<String>,
    /// Images in display order.
    pub images: Vec<ProductImage>,
    /// Variants in display order.
    pub variants: Vec<ProductVariant>,
}

impl Product {
    /// Look up a variant by ID.
    #[must_use]
    pub fn variant(&self, id: &VariantId) -> Option<&ProductVariant> {
        self.variants.iter().find(|v| &v.id == id)
    }

    /// Lowest calculated price across variants, used as the "from" price.
    #[must_use]
    pub fn cheapest_price(&self) -> Option<&Price> {
        self.variants
            .iter()
            .filter_map(|v| v.price.as_ref())
            .min_by(|a, b| a.amount.cmp(&b.amount))
    }
}

/// Select the images to display for a product and optional selected variant.
///
/// - No product images: empty.
/// - No variant selected, or no variants: all product images.
/// - Selected variant found with a non-empty image list: the product images
///   whose IDs appear in the variant's list.
/// - Anything else: all product images.
///
/// Order always follows the product's image list, never the variant's.
#[must_use]
pub fn images_for_variant<'a>(
    product: &'a Product,
    selected_variant: Option<&VariantId>,
) -> Vec<&'a ProductImage> {
    if product.images.is_empty() {
        return Vec::new();
    }

    let all = || -> Vec<&'a ProductImage> { product.images.iter().collect() };

    let Some(selected) = selected_variant else {
        return all();
    };
    if product.variants.is_empty() {
        return all();
    }

    let variant_images = product
        .variant(selected)
        .and_then(|v| v.images.as_deref())
        .filter(|images| !images.is_empty());

    let Some(variant_images) = variant_images else {
        return all();
    };

    let ids: HashSet<&ImageId> = variant_images.iter().map(|i| &i.id).collect();
    product
        .images
        .iter()
        .filter(|i| ids.contains(&i.id))
        .collect()
}

// =============================================================================
// Region Types
// =============================================================================

/// A region scopes pricing currency and product availability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// Medusa region ID.
    pub id: RegionId,
    /// Display name (e.g., "Europe").
    pub name: String,
    /// Currency prices are calculated in.
    pub currency_code: CurrencyCode,
    /// Lowercase ISO 3166-1 alpha-2 codes of the countries in this region.
    pub countries: Vec<String>,
}

impl Region {
    /// Whether this region serves the given country code (case-insensitive).
    #[must_use]
    pub fn serves(&self, country_code: &str) -> bool {
        self.countries
            .iter()
            .any(|c| c.eq_ignore_ascii_case(country_code))
    }
}

/// Find the region serving a country code.
///
/// Later regions never shadow earlier ones; the first match wins.
#[must_use]
pub fn region_for_country<'a>(regions: &'a [Region], country_code: &str) -> Option<&'a Region> {
    regions.iter().find(|r| r.serves(country_code))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;

    use super::*;

    fn image(id: &str) -> ProductImage {
        ProductImage {
            id: ImageId::new(id),
            url: format!("https://cdn.example.com/{id}.jpg"),
        }
    }

    fn variant(id: &str, images: Option<Vec<ProductImage>>) -> ProductVariant {
        ProductVariant {
            id: VariantId::new(id),
            title: None,
            sku: None,
            images,
            price: None,
        }
    }

    fn product(images: Vec<ProductImage>, variants: Vec<ProductVariant>) -> Product {
        Product {
            id: ProductId::new("prod_1"),
            handle: "sweatshirt".to_string(),
            title: "Sweatshirt".to_string(),
            description: None,
            thumbnail: None,
            images,
            variants,
        }
    }

    fn ids(images: &[&ProductImage]) -> Vec<String> {
        images.iter().map(|i| i.id.to_string()).collect()
    }

    #[test]
    fn test_no_images_is_empty_regardless_of_variant() {
        let p = product(vec![], vec![variant("v1", Some(vec![image("a")]))]);
        assert!(images_for_variant(&p, None).is_empty());
        assert!(images_for_variant(&p, Some(&VariantId::new("v1"))).is_empty());
    }

    #[test]
    fn test_no_variant_selected_returns_all_in_order() {
        let p = product(vec![image("c"), image("a"), image("b")], vec![]);
        assert_eq!(ids(&images_for_variant(&p, None)), ["c", "a", "b"]);
    }

    #[test]
    fn test_product_without_variants_returns_all() {
        let p = product(vec![image("a"), image("b")], vec![]);
        let selected = VariantId::new("v1");
        assert_eq!(ids(&images_for_variant(&p, Some(&selected))), ["a", "b"]);
    }

    #[test]
    fn test_variant_without_images_field_falls_back() {
        let p = product(vec![image("a"), image("b")], vec![variant("v1", None)]);
        let selected = VariantId::new("v1");
        assert_eq!(ids(&images_for_variant(&p, Some(&selected))), ["a", "b"]);
    }

    #[test]
    fn test_variant_with_empty_images_falls_back() {
        let p = product(vec![image("a"), image("b")], vec![variant("v1", Some(vec![]))]);
        let selected = VariantId::new("v1");
        assert_eq!(ids(&images_for_variant(&p, Some(&selected))), ["a", "b"]);
    }

    #[test]
    fn test_unknown_variant_falls_back() {
        let p = product(
            vec![image("a"), image("b")],
            vec![variant("v1", Some(vec![image("b")]))],
        );
        let selected = VariantId::new("v404");
        assert_eq!(ids(&images_for_variant(&p, Some(&selected))), ["a", "b"]);
    }

    #[test]
    fn test_variant_subset_single_image() {
        let p = product(
            vec![image("a"), image("b"), image("c")],
            vec![variant("v1", Some(vec![image("b")]))],
        );
        let selected = VariantId::new("v1");
        assert_eq!(ids(&images_for_variant(&p, Some(&selected))), ["b"]);
    }

    #[test]
    fn test_variant_subset_keeps_product_order() {
        let p = product(
            vec![image("a"), image("b"), image("c"), image("d")],
            vec![variant("v1", Some(vec![image("d"), image("a")]))],
        );
        let selected = VariantId::new("v1");
        assert_eq!(ids(&images_for_variant(&p, Some(&selected))), ["a", "d"]);
    }

    #[test]
    fn test_cheapest_price() {
        let mut p = product(vec![], vec![variant("v1", None), variant("v2", None)]);
        p.variants[0].price = Some(Price::new(
            Decimal::from_str("20").unwrap(),
            CurrencyCode::new("usd"),
        ));
        p.variants[1].price = Some(Price::new(
            Decimal::from_str("15.5").unwrap(),
            CurrencyCode::new("usd"),
        ));
        assert_eq!(p.cheapest_price().unwrap().display(), "$15.50");
    }

    #[test]
    fn test_region_for_country() {
        let regions = vec![
            Region {
                id: RegionId::new("reg_us"),
                name: "North America".to_string(),
                currency_code: CurrencyCode::new("usd"),
                countries: vec!["us".to_string(), "ca".to_string()],
            },
            Region {
                id: RegionId::new("reg_eu"),
                name: "Europe".to_string(),
                currency_code: CurrencyCode::new("eur"),
                countries: vec!["dk".to_string(), "de".to_string()],
            },
        ];

        assert_eq!(region_for_country(&regions, "DE").unwrap().id.as_str(), "reg_eu");
        assert_eq!(region_for_country(&regions, "ca").unwrap().id.as_str(), "reg_us");
        assert!(region_for_country(&regions, "jp").is_none());
    }
}
