//! Payment provider descriptors and card tokenizer responses.
//!
//! Provider identifiers come from the commerce platform (`pp_stripe_stripe`,
//! `pp_system_default`, `fluidpay`, ...). The storefront maps each one to a
//! display title, an icon and the sub-form that collects card details.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::PaymentProviderId;

// =============================================================================
// Provider Classification
// =============================================================================

/// Which payment UI a provider needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentProviderKind {
    /// Stripe hosted card element.
    StripeCard,
    /// FluidPay hosted tokenizer.
    FluidPay,
    /// Manual/system payment (no card details collected).
    Manual,
    /// Anything else (`PayPal`, iDEAL, ...); rendered without a sub-form.
    Other,
}

impl PaymentProviderKind {
    /// Classify a provider identifier.
    #[must_use]
    pub fn classify(id: &str) -> Self {
        if is_stripe(id) {
            Self::StripeCard
        } else if is_fluidpay(id) {
            Self::FluidPay
        } else if is_manual(id) {
            Self::Manual
        } else {
            Self::Other
        }
    }
}

/// Stripe card providers, including the Medusa-managed Stripe integration.
#[must_use]
pub fn is_stripe(id: &str) -> bool {
    id.starts_with("pp_stripe_") || id.starts_with("pp_medusa-")
}

/// FluidPay, registered either bare or with the `pp_` module prefix.
#[must_use]
pub fn is_fluidpay(id: &str) -> bool {
    id == "fluidpay" || id.starts_with("pp_fluidpay")
}

/// The built-in manual payment provider.
#[must_use]
pub fn is_manual(id: &str) -> bool {
    id.starts_with("pp_system_default")
}

// =============================================================================
// Provider Descriptors
// =============================================================================

/// A payment provider available to a region, with its display metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentProvider {
    /// Provider identifier.
    pub id: PaymentProviderId,
    /// Display title.
    pub title: String,
    /// Icon name, resolved to an SVG by the templates.
    pub icon: &'static str,
    /// Sub-form this provider renders.
    pub kind: PaymentProviderKind,
}

/// Display metadata for known providers: `(id, title, icon)`.
const PAYMENT_INFO: &[(&str, &str, &str)] = &[
    ("pp_stripe_stripe", "Credit card", "credit-card"),
    ("pp_medusa-payments_default", "Credit card", "credit-card"),
    ("pp_stripe-ideal_stripe", "iDeal", "ideal"),
    ("pp_stripe-bancontact_stripe", "Bancontact", "bancontact"),
    ("pp_paypal_paypal", "PayPal", "paypal"),
    ("pp_system_default", "Manual Payment", "credit-card"),
    ("fluidpay", "Credit card", "credit-card"),
    ("pp_fluidpay_fluidpay", "Credit card", "credit-card"),
];

impl PaymentProvider {
    /// Build a descriptor from a provider identifier.
    ///
    /// Unknown identifiers display the raw ID with a generic icon.
    #[must_use]
    pub fn from_id(id: PaymentProviderId) -> Self {
        let kind = PaymentProviderKind::classify(id.as_str());
        let (title, icon) = PAYMENT_INFO
            .iter()
            .find(|(known, _, _)| *known == id.as_str())
            .map_or_else(
                || (id.to_string(), "credit-card"),
                |(_, title, icon)| ((*title).to_string(), *icon),
            );

        Self {
            id,
            title,
            icon,
            kind,
        }
    }
}

// =============================================================================
// Tokenizer Responses
// =============================================================================

/// Response passed to the tokenizer's submission callback.
///
/// Only the fields the storefront inspects are typed; everything else is
/// kept in `extra` so the raw payload can be forwarded untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenizerResponse {
    /// `"success"`, `"error"` or `"validation"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Card token, present on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Human-readable error message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    /// Field validation errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invalid: Option<serde_json::Value>,
    /// Remaining fields of the raw payload.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A tokenization attempt the tokenizer reported as failed.
///
/// Always recoverable by submitting again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenizationError {
    /// The tokenizer returned an error message.
    #[error("{0}")]
    Rejected(String),

    /// The card form failed validation; holds the serialized field errors.
    #[error("{0}")]
    Invalid(String),

    /// Neither a token nor an explanation was returned.
    #[error("Tokenizer failed")]
    Failed,
}

impl TokenizerResponse {
    /// Parse a raw submission payload. Non-object payloads yield an empty
    /// response, which classifies as [`TokenizationError::Failed`].
    #[must_use]
    pub fn from_value(value: serde_json::Value) -> Self {
        serde_json::from_value(value).unwrap_or_default()
    }

    /// Classify the response: the token on success, otherwise the error to
    /// show next to the card form.
    ///
    /// # Errors
    ///
    /// Returns `TokenizationError` when the status is not `success` or no
    /// token was returned.
    pub fn classify(&self) -> Result<&str, TokenizationError> {
        if self.status.as_deref() == Some("success")
            && let Some(token) = self.token.as_deref().filter(|t| !t.is_empty())
        {
            return Ok(token);
        }

        if let Some(msg) = self.msg.as_deref().filter(|m| !m.is_empty()) {
            return Err(TokenizationError::Rejected(msg.to_string()));
        }

        match &self.invalid {
            Some(invalid) if !invalid.is_null() => {
                Err(TokenizationError::Invalid(invalid.to_string()))
            }
            _ => Err(TokenizationError::Failed),
        }
    }
}
