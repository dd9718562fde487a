//! Medusa Storefront Core - Shared types library.
//!
//! This crate provides the types and pure logic used by the storefront binary:
//! - catalog data read from the Medusa Store API (products, images, variants, regions)
//! - payment provider descriptors and tokenizer response classification
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no timers. Everything here is owned by the commerce platform and
//! only re-shaped for display.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and prices
//! - [`catalog`] - Product, variant and region types plus the variant image resolver
//! - [`payment`] - Payment provider classification and tokenizer responses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod payment;
pub mod types;

pub use catalog::{
    Product, ProductImage, ProductVariant, Region, images_for_variant, region_for_country,
};
pub use payment::{PaymentProvider, PaymentProviderKind, TokenizationError, TokenizerResponse};
pub use types::*;
