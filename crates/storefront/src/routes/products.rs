//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, RawQuery, State};
use axum::response::Redirect;
use medusa_storefront_core::{Product, ProductVariant, VariantId, images_for_variant};
use serde::Deserialize;
use url::form_urlencoded;

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::loaders::load_product_page;
use crate::middleware::CspNonce;
use crate::state::AppState;

use super::PageMeta;

/// Image display data for templates.
#[derive(Debug, Clone)]
pub struct ImageView {
    pub url: String,
    pub alt: String,
}

/// Variant display data for templates.
#[derive(Debug, Clone)]
pub struct VariantView {
    pub title: String,
    pub price: Option<String>,
    /// Link selecting this variant (`?v_id=`).
    pub href: String,
    pub selected: bool,
}

/// Product display data for templates.
#[derive(Debug, Clone)]
pub struct ProductView {
    pub title: String,
    pub description: Option<String>,
    /// Price of the selected variant, or the "from" price.
    pub price: Option<String>,
    /// Images for the selected variant.
    pub images: Vec<ImageView>,
    pub variants: Vec<VariantView>,
}

/// Product page query parameters.
#[derive(Debug, Deserialize)]
pub struct ProductQuery {
    /// Selected variant ID.
    pub v_id: Option<String>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub meta: PageMeta,
    pub product: ProductView,
}

/// Display product detail page.
///
/// An unknown country code or handle renders the not-found page.
pub async fn show(
    State(state): State<AppState>,
    Path((country_code, handle)): Path<(String, String)>,
    Query(query): Query<ProductQuery>,
    nonce: CspNonce,
) -> Result<ProductShowTemplate> {
    let country_code = country_code.to_ascii_lowercase();
    let data = load_product_page(state.store(), &country_code, &handle).await?;

    let selected = query
        .v_id
        .filter(|id| !id.is_empty())
        .map(VariantId::new);

    add_breadcrumb(
        "navigation",
        "Viewed product page",
        Some(&[
            ("handle", handle.as_str()),
            ("country_code", country_code.as_str()),
        ]),
    );

    let path = format!("/{country_code}/products/{handle}");
    let product = &data.product;
    let description = product
        .description
        .clone()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| product.title.clone());

    let meta = PageMeta::new(state.config(), &product.title, &description, &path)
        .with_og_image(product.thumbnail.clone())
        .with_nonce(nonce.value());

    Ok(ProductShowTemplate {
        meta,
        product: product_view(product, selected.as_ref(), &path),
    })
}

/// Redirect a product link without a country code to the default region.
///
/// The query string is kept so a shared `?v_id=` link still selects its
/// variant.
pub async fn region_redirect(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    RawQuery(query): RawQuery,
) -> Redirect {
    let config = state.config();
    let mut target = config.base_url.clone();
    if let Ok(mut segments) = target.path_segments_mut() {
        segments
            .pop_if_empty()
            .extend([config.default_region.as_str(), "products", handle.as_str()]);
    }
    target.set_query(query.as_deref().filter(|q| !q.is_empty()));

    tracing::debug!(
        handle = %handle,
        region = %config.default_region,
        "Redirecting to default region"
    );
    Redirect::temporary(target.as_str())
}

/// Shape a product for display with the selected variant applied.
fn product_view(product: &Product, selected: Option<&VariantId>, path: &str) -> ProductView {
    let images = images_for_variant(product, selected)
        .into_iter()
        .enumerate()
        .map(|(i, image)| ImageView {
            url: image.url.clone(),
            alt: format!("{} image {}", product.title, i + 1),
        })
        .collect();

    let price = selected
        .and_then(|id| product.variant(id))
        .and_then(|v| v.price.as_ref())
        .or_else(|| product.cheapest_price())
        .map(medusa_storefront_core::Price::display);

    let variants = product
        .variants
        .iter()
        .map(|variant| variant_view(variant, selected, path))
        .collect();

    ProductView {
        title: product.title.clone(),
        description: product.description.clone(),
        price,
        images,
        variants,
    }
}

fn variant_view(variant: &ProductVariant, selected: Option<&VariantId>, path: &str) -> VariantView {
    let encoded: String = form_urlencoded::byte_serialize(variant.id.as_str().as_bytes()).collect();
    VariantView {
        title: variant
            .title
            .clone()
            .unwrap_or_else(|| variant.id.to_string()),
        price: variant.price.as_ref().map(medusa_storefront_core::Price::display),
        href: format!("{path}?v_id={encoded}"),
        selected: selected == Some(&variant.id),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::str::FromStr;

    use medusa_storefront_core::{CurrencyCode, ImageId, Price, ProductId, ProductImage};
    use rust_decimal::Decimal;

    use super::*;

    fn image(id: &str) -> ProductImage {
        ProductImage {
            id: ImageId::new(id),
            url: format!("https://cdn.example.com/{id}.jpg"),
        }
    }

    fn price(amount: &str) -> Option<Price> {
        Some(Price {
            amount: Decimal::from_str(amount).unwrap(),
            currency_code: CurrencyCode::new("usd"),
        })
    }

    fn product() -> Product {
        Product {
            id: ProductId::new("prod_1"),
            handle: "sweatshirt".to_string(),
            title: "Sweatshirt".to_string(),
            description: None,
            thumbnail: None,
            images: vec![image("a"), image("b"), image("c")],
            variants: vec![
                ProductVariant {
                    id: VariantId::new("v1"),
                    title: Some("Small".to_string()),
                    sku: None,
                    images: Some(vec![image("b")]),
                    price: price("25"),
                },
                ProductVariant {
                    id: VariantId::new("v2"),
                    title: None,
                    sku: None,
                    images: None,
                    price: price("19.99"),
                },
            ],
        }
    }

    #[test]
    fn test_selected_variant_filters_images_and_price() {
        let selected = VariantId::new("v1");
        let view = product_view(&product(), Some(&selected), "/us/products/sweatshirt");

        assert_eq!(view.images.len(), 1);
        assert_eq!(view.images[0].url, "https://cdn.example.com/b.jpg");
        assert_eq!(view.price.as_deref(), Some("$25.00"));
        assert!(view.variants[0].selected);
        assert!(!view.variants[1].selected);
    }

    #[test]
    fn test_no_selection_shows_all_images_and_from_price() {
        let view = product_view(&product(), None, "/us/products/sweatshirt");

        assert_eq!(view.images.len(), 3);
        assert_eq!(view.price.as_deref(), Some("$19.99"));
        assert!(view.variants.iter().all(|v| !v.selected));
    }

    #[test]
    fn test_variant_links_and_fallback_title() {
        let view = product_view(&product(), None, "/us/products/sweatshirt");

        assert_eq!(view.variants[0].href, "/us/products/sweatshirt?v_id=v1");
        assert_eq!(view.variants[1].title, "v2");
    }
}
