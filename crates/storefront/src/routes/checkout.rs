//! Checkout payment step handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Json,
    extract::{Path, Query, State},
};
use medusa_storefront_core::{PaymentProviderId, TokenizerResponse};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::Result;
use crate::filters;
use crate::loaders::load_payment_step;
use crate::middleware::CspNonce;
use crate::payment::{
    BridgeState, PaymentContainerView, SelectorContext, SubForm, SubmissionOutcome,
    payment_containers,
};
use crate::state::AppState;

use super::PageMeta;

/// Payment step query parameters.
#[derive(Debug, Deserialize)]
pub struct PaymentQuery {
    /// Selected provider ID.
    pub provider: Option<String>,
}

/// Payment step template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/payment.html")]
pub struct PaymentStepTemplate {
    pub meta: PageMeta,
    pub country_code: String,
    pub containers: Vec<PaymentContainerView>,
    /// Load Stripe.js: a Stripe entry is selected and a key is configured.
    pub load_stripe: bool,
}

/// Tokenizer submission result fragment.
///
/// The glue script reads `data-state` and stops accepting submissions when
/// `retryable` is false.
#[derive(Template, WebTemplate)]
#[template(path = "partials/tokenizer_result.html")]
pub struct TokenizerResultTemplate {
    /// [`BridgeState::data_state`] of the bridge after this response.
    pub data_state: &'static str,
    pub message: String,
    pub retryable: bool,
}

impl TokenizerResultTemplate {
    fn from_state(state: &BridgeState) -> Self {
        let message = match state {
            BridgeState::Submitted(SubmissionOutcome::Success) => "Card details accepted".to_string(),
            BridgeState::Submitted(SubmissionOutcome::Failure(message))
            | BridgeState::Error(message) => message.clone(),
            BridgeState::Uninitialized | BridgeState::AwaitingScript | BridgeState::Ready => {
                String::new()
            }
        };
        Self {
            data_state: state.data_state(),
            message,
            retryable: state.can_submit(),
        }
    }
}

/// Display the payment step with the region's providers.
pub async fn payment_step(
    State(state): State<AppState>,
    Path(country_code): Path<String>,
    Query(query): Query<PaymentQuery>,
    nonce: CspNonce,
) -> Result<PaymentStepTemplate> {
    let country_code = country_code.to_ascii_lowercase();
    let data = load_payment_step(state.store(), &country_code).await?;

    let selected = query
        .provider
        .filter(|p| !p.is_empty())
        .map(PaymentProviderId::new);

    let config = state.config();
    let ctx = SelectorContext {
        selected: selected.as_ref(),
        disabled: false,
        environment: config.environment,
        payments: &config.payments,
    };
    let containers = payment_containers(&data.providers, &ctx);

    let load_stripe = containers.iter().any(|c| {
        matches!(
            &c.sub_form,
            Some(SubForm::StripeCard {
                publishable_key: Some(_)
            })
        )
    });

    let path = format!("/{country_code}/checkout/payment");
    let meta = PageMeta::new(
        config,
        "Payment",
        &format!("Choose how to pay ({})", data.region.name),
        &path,
    )
    .with_nonce(nonce.value());

    Ok(PaymentStepTemplate {
        meta,
        country_code,
        containers,
        load_stripe,
    })
}

/// Receive the raw tokenizer submission response and render the result.
///
/// The response moves the bridge state exactly as the tokenizer bridge's
/// submission callback does. Failures are ordinary results rendered inline;
/// the shopper may retry.
pub async fn fluidpay_submission(Json(body): Json<serde_json::Value>) -> TokenizerResultTemplate {
    let response = TokenizerResponse::from_value(body);
    let state = BridgeState::Submitted(SubmissionOutcome::from_response(&response));

    match &state {
        BridgeState::Submitted(SubmissionOutcome::Failure(message)) => {
            warn!(error = %message, status = ?response.status, "Tokenization failed");
        }
        _ => info!("Card tokenized"),
    }

    TokenizerResultTemplate::from_state(&state)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_submission_success() {
        let result =
            fluidpay_submission(Json(json!({"status": "success", "token": "tok_123"}))).await;
        assert_eq!(result.data_state, "success");
        assert!(!result.retryable);
    }

    #[tokio::test]
    async fn test_submission_error_message() {
        let result =
            fluidpay_submission(Json(json!({"status": "error", "msg": "Card declined"}))).await;
        assert_eq!(result.data_state, "failure");
        assert!(result.retryable);
        assert_eq!(result.message, "Card declined");
    }

    #[test]
    fn test_result_fragment_escapes_message() {
        let html = TokenizerResultTemplate::from_state(&BridgeState::Submitted(
            SubmissionOutcome::Failure("<b>bad</b>".to_string()),
        ))
        .render()
        .unwrap();
        assert!(!html.contains("<b>"));
        assert!(html.contains("bad"));
        assert!(html.contains("is-error"));
        assert!(html.contains(r#"data-state="failure""#));
        assert!(html.contains(r#"data-retryable="true""#));
    }

    #[test]
    fn test_configuration_error_fragment_is_terminal() {
        let result = TokenizerResultTemplate::from_state(&BridgeState::Error(
            crate::payment::tokenizer::MISSING_PUBLIC_KEY.to_string(),
        ));
        assert_eq!(result.data_state, "error");
        assert!(!result.retryable);
        assert_eq!(result.message, "Missing FLUIDPAY_PUBLIC_KEY");
    }
}
