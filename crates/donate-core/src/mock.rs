//! Mock Collaborators
//!
//! For testing and demo purposes. Every collaborator interface has a
//! scripted or recording double here: results are queued ahead of time,
//! calls are captured for assertion, and the API mock can be gated to keep
//! a submission in flight while a test races a second one against it.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::amount::AmountCents;
use crate::error::Result;
use crate::modal::ModalHost;
use crate::provider::{
    Analytics, CheckoutRedirect, DonationApi, OverlayCheckout, WalletCompletion, WalletOutcome,
    WalletRequest,
};
use crate::types::{
    ChargePayload, CheckoutPayload, CheckoutSession, DonationItem, DonationResult, PaymentMethod,
};
use crate::view::DonateView;

/// Scripted donation API with call recording
///
/// Unqueued calls succeed with deterministic placeholder data, so most
/// tests only script the cases they care about.
#[derive(Default)]
pub struct MockDonationApi {
    checkout_results: Mutex<VecDeque<Result<CheckoutSession>>>,
    charge_results: Mutex<VecDeque<Result<DonationResult>>>,
    checkouts: Mutex<Vec<CheckoutPayload>>,
    charges: Mutex<Vec<ChargePayload>>,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl MockDonationApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next `create_checkout` result
    pub fn enqueue_checkout(&self, result: Result<CheckoutSession>) {
        self.checkout_results.lock().unwrap().push_back(result);
    }

    /// Queue the next `charge` result
    pub fn enqueue_charge(&self, result: Result<DonationResult>) {
        self.charge_results.lock().unwrap().push_back(result);
    }

    /// Make every API call park until the returned handle is notified.
    ///
    /// Lets a test hold one submission in flight while it throws a second
    /// at the controller.
    pub fn hold_until_released(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Checkout payloads received so far
    pub fn checkouts(&self) -> Vec<CheckoutPayload> {
        self.checkouts.lock().unwrap().clone()
    }

    /// Charge payloads received so far
    pub fn charges(&self) -> Vec<ChargePayload> {
        self.charges.lock().unwrap().clone()
    }

    async fn wait_for_release(&self) {
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl DonationApi for MockDonationApi {
    async fn create_checkout(&self, payload: &CheckoutPayload) -> Result<CheckoutSession> {
        self.checkouts.lock().unwrap().push(payload.clone());
        self.wait_for_release().await;
        match self.checkout_results.lock().unwrap().pop_front() {
            Some(result) => result,
            None => Ok(CheckoutSession::new(
                serde_json::json!({"sessionId": "cs_mock"}),
            )),
        }
    }

    async fn charge(&self, payload: &ChargePayload) -> Result<DonationResult> {
        self.charges.lock().unwrap().push(payload.clone());
        self.wait_for_release().await;
        match self.charge_results.lock().unwrap().pop_front() {
            Some(result) => result,
            None => Ok(DonationResult {
                id: "tx_mock".into(),
                amount: payload.amount,
                email: "donor@example.com".into(),
                email_sent: true,
            }),
        }
    }
}

/// Scripted checkout redirect that records the sessions it was handed
#[derive(Default)]
pub struct MockRedirect {
    results: Mutex<VecDeque<Result<()>>>,
    sessions: Mutex<Vec<CheckoutSession>>,
}

impl MockRedirect {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the next redirect result
    pub fn enqueue(&self, result: Result<()>) {
        self.results.lock().unwrap().push_back(result);
    }

    /// Sessions handed over so far
    pub fn sessions(&self) -> Vec<CheckoutSession> {
        self.sessions.lock().unwrap().clone()
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl CheckoutRedirect for MockRedirect {
    async fn redirect_to_checkout(&self, session: CheckoutSession) -> Result<()> {
        self.sessions.lock().unwrap().push(session);
        match self.results.lock().unwrap().pop_front() {
            Some(result) => result,
            None => Ok(()),
        }
    }
}

/// Wallet request double with a fixed probe answer
pub struct MockWallet {
    available: bool,
    probe_error: Option<String>,
    totals: Mutex<Vec<AmountCents>>,
}

impl MockWallet {
    /// A wallet whose capability probe answers as given
    pub fn new(available: bool) -> Self {
        Self {
            available,
            probe_error: None,
            totals: Mutex::new(Vec::new()),
        }
    }

    /// A wallet whose capability probe fails outright
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            available: false,
            probe_error: Some(message.into()),
            totals: Mutex::new(Vec::new()),
        }
    }

    /// Totals pushed to the sheet so far
    pub fn totals(&self) -> Vec<AmountCents> {
        self.totals.lock().unwrap().clone()
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl WalletRequest for MockWallet {
    async fn can_make_payment(&self) -> Result<bool> {
        match &self.probe_error {
            Some(message) => Err(crate::error::DonateError::WalletProbe(message.clone())),
            None => Ok(self.available),
        }
    }

    fn update_total(&self, total: AmountCents) {
        self.totals.lock().unwrap().push(total);
    }
}

/// Shared recorder for wallet completion outcomes
///
/// Hand `completion()` to the flow, read `outcome()` afterwards.
#[derive(Clone, Default)]
pub struct CompletionRecorder {
    outcome: Arc<Mutex<Option<WalletOutcome>>>,
}

impl CompletionRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A one-shot completion wired to this recorder
    pub fn completion(&self) -> Box<dyn WalletCompletion> {
        Box::new(RecordedCompletion {
            outcome: self.outcome.clone(),
        })
    }

    /// Outcome reported so far, if any
    pub fn outcome(&self) -> Option<WalletOutcome> {
        *self.outcome.lock().unwrap()
    }
}

struct RecordedCompletion {
    outcome: Arc<Mutex<Option<WalletOutcome>>>,
}

impl WalletCompletion for RecordedCompletion {
    fn complete(self: Box<Self>, outcome: WalletOutcome) {
        *self.outcome.lock().unwrap() = Some(outcome);
    }
}

/// Overlay double that records the amounts it was opened with
#[derive(Default)]
pub struct MockOverlay {
    opens: Mutex<Vec<AmountCents>>,
}

impl MockOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opens(&self) -> Vec<AmountCents> {
        self.opens.lock().unwrap().clone()
    }
}

impl OverlayCheckout for MockOverlay {
    fn open(&self, amount: AmountCents) {
        self.opens.lock().unwrap().push(amount);
    }
}

/// One recorded call on the view surface
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewCall {
    AmountEnabled(bool),
    SubmitEnabled(bool),
    Invalid(bool),
    Error(String),
    ErrorCleared,
    Processing(bool),
    WalletAvailable(bool),
    Receipt(DonationResult),
}

/// View double that records every call in order
#[derive(Default)]
pub struct RecordingView {
    calls: Mutex<Vec<ViewCall>>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call so far, in dispatch order
    pub fn calls(&self) -> Vec<ViewCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Whether the given call was dispatched at least once
    pub fn saw(&self, call: &ViewCall) -> bool {
        self.calls.lock().unwrap().contains(call)
    }

    /// The receipt rendered last, if any
    pub fn receipt(&self) -> Option<DonationResult> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find_map(|call| match call {
                ViewCall::Receipt(result) => Some(result.clone()),
                _ => None,
            })
    }

    fn record(&self, call: ViewCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl DonateView for RecordingView {
    fn set_amount_enabled(&self, enabled: bool) {
        self.record(ViewCall::AmountEnabled(enabled));
    }

    fn set_submit_enabled(&self, enabled: bool) {
        self.record(ViewCall::SubmitEnabled(enabled));
    }

    fn set_invalid(&self, invalid: bool) {
        self.record(ViewCall::Invalid(invalid));
    }

    fn show_error(&self, message: &str) {
        self.record(ViewCall::Error(message.to_owned()));
    }

    fn clear_error(&self) {
        self.record(ViewCall::ErrorCleared);
    }

    fn set_processing(&self, processing: bool) {
        self.record(ViewCall::Processing(processing));
    }

    fn set_wallet_available(&self, available: bool) {
        self.record(ViewCall::WalletAvailable(available));
    }

    fn render_receipt(&self, result: &DonationResult) {
        self.record(ViewCall::Receipt(result.clone()));
    }
}

/// Modal host double: an in-memory page with a fragment and a dialog
pub struct RecordingHost {
    open: Mutex<bool>,
    fragment: Mutex<String>,
    replace_supported: bool,
    replacements: Mutex<usize>,
}

impl RecordingHost {
    /// A host with no fragment set
    pub fn new(replace_supported: bool) -> Self {
        Self::with_fragment(replace_supported, "")
    }

    /// A host whose page loaded with the given fragment
    pub fn with_fragment(replace_supported: bool, fragment: &str) -> Self {
        Self {
            open: Mutex::new(false),
            fragment: Mutex::new(fragment.to_owned()),
            replace_supported,
            replacements: Mutex::new(0),
        }
    }

    pub fn is_open(&self) -> bool {
        *self.open.lock().unwrap()
    }

    /// How many history-neutral URL rewrites happened
    pub fn replacements(&self) -> usize {
        *self.replacements.lock().unwrap()
    }
}

impl ModalHost for RecordingHost {
    fn set_open(&self, open: bool) {
        *self.open.lock().unwrap() = open;
    }

    fn fragment(&self) -> String {
        self.fragment.lock().unwrap().clone()
    }

    fn set_fragment(&self, fragment: &str) {
        *self.fragment.lock().unwrap() = fragment.to_owned();
    }

    fn supports_replace(&self) -> bool {
        self.replace_supported
    }

    fn replace_url_without_fragment(&self) {
        self.fragment.lock().unwrap().clear();
        *self.replacements.lock().unwrap() += 1;
    }
}

/// Analytics double that records both funnel events
#[derive(Default)]
pub struct RecordingAnalytics {
    started: Mutex<Vec<(DonationItem, PaymentMethod)>>,
    completed: Mutex<Vec<(DonationItem, DonationResult)>>,
}

impl RecordingAnalytics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn started(&self) -> Vec<(DonationItem, PaymentMethod)> {
        self.started.lock().unwrap().clone()
    }

    pub fn completed(&self) -> Vec<(DonationItem, DonationResult)> {
        self.completed.lock().unwrap().clone()
    }
}

impl Analytics for RecordingAnalytics {
    fn checkout_started(&self, item: &DonationItem, method: PaymentMethod) {
        self.started.lock().unwrap().push((item.clone(), method));
    }

    fn donation_completed(&self, item: &DonationItem, result: &DonationResult) {
        self.completed
            .lock()
            .unwrap()
            .push((item.clone(), result.clone()));
    }
}
