//! Checkout payment UI.
//!
//! - [`selector`] - Payment method list with provider-specific sub-forms
//! - [`tokenizer`] - Bridge to the remote FluidPay card tokenizer

pub mod selector;
pub mod tokenizer;

pub use selector::{PaymentContainerView, SelectorContext, SubForm, payment_containers};
pub use tokenizer::{
    BridgeCallbacks, BridgeState, ScriptSlot, SubmissionOutcome, TokenizerBridge,
    TokenizerConstructor, TokenizerInstance, TokenizerOptions,
};
