//! Bridge between the remote card tokenizer and a checkout form.
//!
//! The tokenizer is an externally hosted script that exposes a constructor
//! some unpredictable time after the page mounts. The bridge models that
//! constructor as an injected capability published through a [`ScriptSlot`]
//! and awaited as a readiness future:
//!
//! ```text
//! Uninitialized --(no public key)--> Error
//! Uninitialized --> AwaitingScript --(constructor published)--> Ready
//! Ready --(submission response)--> Submitted(Success | Failure)
//! Submitted(Failure) --(submit again)--> Submitted(..)
//! ```
//!
//! `Error` and `Submitted(Success)` are terminal until the bridge is mounted
//! again. Dropping (or [`TokenizerBridge::unmount`]ing) the bridge cancels the
//! readiness wait, so a constructor that shows up later is never bound to a
//! container that is gone.

use std::sync::{Arc, OnceLock};

use medusa_storefront_core::TokenizerResponse;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Message reported when the tokenizer public key is not configured.
pub const MISSING_PUBLIC_KEY: &str = "Missing FLUIDPAY_PUBLIC_KEY";

/// Callback the tokenizer invokes with its raw submission response.
pub type SubmissionCallback = Arc<dyn Fn(serde_json::Value) + Send + Sync>;

/// Options handed to the tokenizer constructor.
pub struct TokenizerOptions {
    /// Public API key.
    pub apikey: String,
    /// Container element (selector) the card form is mounted into.
    pub container: String,
    /// Receives the response of every submission.
    pub submission: SubmissionCallback,
}

/// The constructor exposed by the remote tokenizer script.
pub trait TokenizerConstructor: Send + Sync {
    /// Create an instance bound to `options.container`.
    ///
    /// # Errors
    ///
    /// Returns a message if the tokenizer rejects the options.
    fn construct(&self, options: TokenizerOptions) -> Result<Box<dyn TokenizerInstance>, String>;
}

/// A constructed tokenizer bound to a container.
pub trait TokenizerInstance: Send + Sync {
    /// Submit the card form. Some flows require the amount (`"5.55"`).
    fn submit(&self, amount: Option<&str>);
}

type Constructor = Arc<dyn TokenizerConstructor>;

// =============================================================================
// ScriptSlot
// =============================================================================

/// Where the tokenizer constructor appears once its script has loaded.
///
/// Whoever observes the script load calls [`ScriptSlot::publish`]; bridges
/// mounted before or after that moment both pick it up.
#[derive(Clone)]
pub struct ScriptSlot {
    tx: Arc<watch::Sender<Option<Constructor>>>,
}

impl ScriptSlot {
    /// Create an empty slot.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Make the constructor available.
    pub fn publish(&self, constructor: Constructor) {
        self.tx.send_replace(Some(constructor));
    }

    /// Whether a constructor has been published.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.tx.borrow().is_some()
    }

    fn subscribe(&self) -> watch::Receiver<Option<Constructor>> {
        self.tx.subscribe()
    }
}

impl Default for ScriptSlot {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Bridge State
// =============================================================================

/// Result of the latest submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// A token was issued.
    Success,
    /// The tokenizer reported an error; the message is shown inline.
    Failure(String),
}

impl SubmissionOutcome {
    /// Classify a raw submission response.
    #[must_use]
    pub fn from_response(response: &TokenizerResponse) -> Self {
        match response.classify() {
            Ok(_) => Self::Success,
            Err(err) => Self::Failure(err.to_string()),
        }
    }
}

/// Lifecycle of a mounted bridge.
///
/// The payment page's glue script follows the same machine: the submission
/// endpoint renders [`BridgeState::data_state`] into its result fragment and
/// the script stops accepting submissions once that state is terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeState {
    /// Not mounted yet.
    Uninitialized,
    /// Public key present; waiting for the tokenizer script to load.
    AwaitingScript,
    /// Instance constructed; the card form accepts a submission.
    Ready,
    /// A submission response arrived.
    Submitted(SubmissionOutcome),
    /// Misconfiguration or construction failure. Terminal until remounted.
    Error(String),
}

impl BridgeState {
    /// Name used for the `data-state` attribute of rendered fragments.
    #[must_use]
    pub const fn data_state(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::AwaitingScript => "awaiting-script",
            Self::Ready => "ready",
            Self::Submitted(SubmissionOutcome::Success) => "success",
            Self::Submitted(SubmissionOutcome::Failure(_)) => "failure",
            Self::Error(_) => "error",
        }
    }

    /// Whether the bridge accepts a submission in this state.
    #[must_use]
    pub const fn can_submit(&self) -> bool {
        matches!(
            self,
            Self::Ready | Self::Submitted(SubmissionOutcome::Failure(_))
        )
    }
}

/// Caller-supplied result callbacks.
#[derive(Clone)]
pub struct BridgeCallbacks {
    /// Called with the token and the raw response on success.
    pub on_token: Arc<dyn Fn(String, TokenizerResponse) + Send + Sync>,
    /// Called with a display message, and the raw response when there is one.
    pub on_error: Arc<dyn Fn(String, Option<TokenizerResponse>) + Send + Sync>,
}

// =============================================================================
// TokenizerBridge
// =============================================================================

/// A tokenizer bound to one container for the lifetime of a payment form.
pub struct TokenizerBridge {
    state: Arc<watch::Sender<BridgeState>>,
    instance: Arc<OnceLock<Box<dyn TokenizerInstance>>>,
    task: Option<JoinHandle<()>>,
}

impl TokenizerBridge {
    /// Mount the bridge against `container`.
    ///
    /// With no usable `public_key` the error callback fires once and nothing
    /// is constructed. Otherwise a task waits for the constructor to be
    /// published on `slot` and constructs exactly one instance.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn mount(
        public_key: Option<&str>,
        container: impl Into<String>,
        slot: &ScriptSlot,
        callbacks: BridgeCallbacks,
    ) -> Self {
        let (state, _rx) = watch::channel(BridgeState::Uninitialized);
        let state = Arc::new(state);
        let instance: Arc<OnceLock<Box<dyn TokenizerInstance>>> = Arc::new(OnceLock::new());

        let Some(apikey) = public_key.map(str::trim).filter(|k| !k.is_empty()) else {
            tracing::warn!("Tokenizer public key is not configured");
            state.send_replace(BridgeState::Error(MISSING_PUBLIC_KEY.to_string()));
            (callbacks.on_error)(MISSING_PUBLIC_KEY.to_string(), None);
            return Self {
                state,
                instance,
                task: None,
            };
        };

        state.send_replace(BridgeState::AwaitingScript);

        let options = TokenizerOptions {
            apikey: apikey.to_string(),
            container: container.into(),
            submission: submission_callback(Arc::clone(&state), callbacks.clone()),
        };

        let task = tokio::spawn(construct_when_loaded(
            slot.subscribe(),
            options,
            Arc::clone(&state),
            Arc::clone(&instance),
            callbacks,
        ));

        Self {
            state,
            instance,
            task: Some(task),
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> BridgeState {
        self.state.borrow().clone()
    }

    /// Watch state changes (loading indicator, inline errors).
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<BridgeState> {
        self.state.subscribe()
    }

    /// Whether an instance has been constructed.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.instance.get().is_some()
    }

    /// Submit the card form. A no-op returning `false` until the instance is
    /// constructed, after a successful submission, or after an error.
    pub fn submit(&self, amount: Option<&str>) -> bool {
        let Some(instance) = self.instance.get() else {
            return false;
        };
        if !self.state.borrow().can_submit() {
            return false;
        }
        instance.submit(amount);
        true
    }

    /// Cancel the readiness wait. Idempotent.
    pub fn unmount(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for TokenizerBridge {
    fn drop(&mut self) {
        self.unmount();
    }
}

async fn construct_when_loaded(
    mut slot: watch::Receiver<Option<Constructor>>,
    options: TokenizerOptions,
    state: Arc<watch::Sender<BridgeState>>,
    instance: Arc<OnceLock<Box<dyn TokenizerInstance>>>,
    callbacks: BridgeCallbacks,
) {
    let constructor = match slot.wait_for(Option::is_some).await {
        Ok(published) => (*published).clone(),
        // Slot dropped before the script loaded.
        Err(_) => None,
    };
    let Some(constructor) = constructor else {
        return;
    };

    match constructor.construct(options) {
        Ok(constructed) => {
            if instance.set(constructed).is_ok() {
                tracing::debug!("Tokenizer constructed");
                state.send_replace(BridgeState::Ready);
            }
        }
        Err(message) => {
            tracing::warn!(error = %message, "Tokenizer construction failed");
            state.send_replace(BridgeState::Error(message.clone()));
            (callbacks.on_error)(message, None);
        }
    }
}

fn submission_callback(
    state: Arc<watch::Sender<BridgeState>>,
    callbacks: BridgeCallbacks,
) -> SubmissionCallback {
    Arc::new(move |raw: serde_json::Value| {
        if !state.borrow().can_submit() {
            tracing::debug!("Ignoring tokenizer response in terminal state");
            return;
        }

        let response = TokenizerResponse::from_value(raw);
        let outcome = SubmissionOutcome::from_response(&response);
        state.send_replace(BridgeState::Submitted(outcome.clone()));

        match outcome {
            SubmissionOutcome::Success => {
                // Success implies a non-empty token.
                let token = response.token.clone().unwrap_or_default();
                (callbacks.on_token)(token, response);
            }
            SubmissionOutcome::Failure(message) => (callbacks.on_error)(message, Some(response)),
        }
    })
}
