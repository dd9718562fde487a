//! Payment method selector.
//!
//! Turns the providers available to a region into one radio-style entry
//! each. Only the selected entry carries a provider-specific sub-form.

use medusa_storefront_core::{PaymentProvider, PaymentProviderId, PaymentProviderKind};

use crate::config::{Environment, PaymentsConfig};

use super::tokenizer::MISSING_PUBLIC_KEY;

/// Container element the tokenizer mounts its card form into.
pub const TOKENIZER_CONTAINER_ID: &str = "fluidpay-tokenizer";

/// Card details form rendered under the selected entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubForm {
    /// Stripe hosted card element; `None` renders the loading skeleton.
    StripeCard { publishable_key: Option<String> },
    /// FluidPay tokenizer bridge.
    Tokenizer {
        /// Public key for the tokenizer; `None` means misconfigured.
        public_key: Option<String>,
        /// Container element ID.
        container_id: &'static str,
        /// Configuration error to show inline.
        error: Option<String>,
    },
}

/// One entry in the payment method list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentContainerView {
    pub id: PaymentProviderId,
    pub title: String,
    pub icon: &'static str,
    pub selected: bool,
    pub disabled: bool,
    /// "Test payment" badge for the manual provider in development.
    pub show_test_badge: bool,
    pub sub_form: Option<SubForm>,
}

/// Inputs for [`payment_containers`].
pub struct SelectorContext<'a> {
    /// Currently selected provider, if any.
    pub selected: Option<&'a PaymentProviderId>,
    /// Disable every entry (e.g., while a payment session is created).
    pub disabled: bool,
    pub environment: Environment,
    pub payments: &'a PaymentsConfig,
}

/// Build the selector entries, preserving provider order.
#[must_use]
pub fn payment_containers(
    providers: &[PaymentProvider],
    ctx: &SelectorContext<'_>,
) -> Vec<PaymentContainerView> {
    providers
        .iter()
        .map(|provider| {
            let selected = ctx.selected == Some(&provider.id);
            PaymentContainerView {
                id: provider.id.clone(),
                title: provider.title.clone(),
                icon: provider.icon,
                selected,
                disabled: ctx.disabled,
                show_test_badge: provider.kind == PaymentProviderKind::Manual
                    && ctx.environment.is_development(),
                sub_form: selected.then(|| sub_form(provider.kind, ctx.payments)).flatten(),
            }
        })
        .collect()
}

fn sub_form(kind: PaymentProviderKind, payments: &PaymentsConfig) -> Option<SubForm> {
    match kind {
        PaymentProviderKind::StripeCard => Some(SubForm::StripeCard {
            publishable_key: payments.stripe_publishable_key.clone(),
        }),
        PaymentProviderKind::FluidPay => Some(SubForm::Tokenizer {
            public_key: payments.fluidpay_public_key.clone(),
            container_id: TOKENIZER_CONTAINER_ID,
            error: payments
                .fluidpay_public_key
                .is_none()
                .then(|| MISSING_PUBLIC_KEY.to_string()),
        }),
        PaymentProviderKind::Manual | PaymentProviderKind::Other => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use url::Url;

    use super::*;

    fn payments(fluidpay: Option<&str>, stripe: Option<&str>) -> PaymentsConfig {
        PaymentsConfig {
            fluidpay_public_key: fluidpay.map(str::to_string),
            tokenizer_script_url: Url::parse(crate::config::DEFAULT_TOKENIZER_URL).unwrap(),
            stripe_publishable_key: stripe.map(str::to_string),
        }
    }

    fn providers() -> Vec<PaymentProvider> {
        ["pp_stripe_stripe", "fluidpay", "pp_system_default"]
            .into_iter()
            .map(|id| PaymentProvider::from_id(PaymentProviderId::new(id)))
            .collect()
    }

    #[test]
    fn test_nothing_selected_renders_no_sub_forms() {
        let payments = payments(Some("pub_key"), Some("pk_test"));
        let ctx = SelectorContext {
            selected: None,
            disabled: false,
            environment: Environment::Production,
            payments: &payments,
        };
        let views = payment_containers(&providers(), &ctx);

        assert_eq!(views.len(), 3);
        assert!(views.iter().all(|v| !v.selected && v.sub_form.is_none()));
    }

    #[test]
    fn test_exactly_matching_entry_is_selected() {
        let payments = payments(Some("pub_key"), None);
        let selected = PaymentProviderId::new("fluidpay");
        let ctx = SelectorContext {
            selected: Some(&selected),
            disabled: false,
            environment: Environment::Production,
            payments: &payments,
        };
        let views = payment_containers(&providers(), &ctx);

        let selected: Vec<&str> = views
            .iter()
            .filter(|v| v.selected)
            .map(|v| v.id.as_str())
            .collect();
        assert_eq!(selected, ["fluidpay"]);
        assert_eq!(
            views[1].sub_form,
            Some(SubForm::Tokenizer {
                public_key: Some("pub_key".to_string()),
                container_id: TOKENIZER_CONTAINER_ID,
                error: None,
            })
        );
        assert!(views[0].sub_form.is_none());
    }

    #[test]
    fn test_tokenizer_without_key_shows_configuration_error() {
        let payments = payments(None, None);
        let selected = PaymentProviderId::new("fluidpay");
        let ctx = SelectorContext {
            selected: Some(&selected),
            disabled: false,
            environment: Environment::Production,
            payments: &payments,
        };
        let views = payment_containers(&providers(), &ctx);

        match &views[1].sub_form {
            Some(SubForm::Tokenizer { error, .. }) => {
                assert_eq!(error.as_deref(), Some(MISSING_PUBLIC_KEY));
            }
            other => panic!("expected tokenizer sub-form, got {other:?}"),
        }
    }

    #[test]
    fn test_stripe_selected_without_key_renders_skeleton() {
        let payments = payments(None, None);
        let selected = PaymentProviderId::new("pp_stripe_stripe");
        let ctx = SelectorContext {
            selected: Some(&selected),
            disabled: false,
            environment: Environment::Production,
            payments: &payments,
        };
        let views = payment_containers(&providers(), &ctx);

        assert_eq!(
            views[0].sub_form,
            Some(SubForm::StripeCard {
                publishable_key: None
            })
        );
    }

    #[test]
    fn test_test_badge_only_for_manual_in_development() {
        let payments = payments(None, None);
        let ctx = SelectorContext {
            selected: None,
            disabled: true,
            environment: Environment::Development,
            payments: &payments,
        };
        let views = payment_containers(&providers(), &ctx);

        let badges: Vec<bool> = views.iter().map(|v| v.show_test_badge).collect();
        assert_eq!(badges, [false, false, true]);
        assert!(views.iter().all(|v| v.disabled));

        let ctx = SelectorContext {
            environment: Environment::Production,
            ..ctx
        };
        assert!(
            payment_containers(&providers(), &ctx)
                .iter()
                .all(|v| !v.show_test_badge)
        );
    }
}
