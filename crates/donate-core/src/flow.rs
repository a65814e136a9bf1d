//! Donation Flow Controller
//!
//! One instance per page. Owns the [`FormState`] behind a lock, routes
//! events from the rendered form into it, carries out the effects each
//! transition produces, and drives the three payment paths. All outside
//! contact goes through the collaborator interfaces, so the whole flow
//! runs under test with recorded doubles.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let flow = DonationFlow::builder()
//!     .api(Arc::new(gateway))
//!     .redirect(Arc::new(redirect))
//!     .view(Arc::new(view))
//!     .build()?;
//!
//! flow.amount_edited("20.00");
//! flow.submit_hosted_checkout().await;
//! ```

use std::sync::{Arc, Mutex};

use uuid::Uuid;

use crate::amount::AmountCents;
use crate::config::WidgetConfig;
use crate::error::{DonateError, GENERIC_FAILURE, Result};
use crate::form::{Effect, FormEvent, FormState, Phase};
use crate::paths::{
    HostedCheckoutPath, OverlayChargePath, PathOutcome, PaymentPath, WalletChargePath,
};
use crate::provider::{
    Analytics, CheckoutRedirect, DonationApi, LogAnalytics, OverlayCheckout, WalletCompletion,
    WalletOutcome, WalletRequest,
};
use crate::types::{
    DonationFrequency, DonationItem, DonationRequest, PaymentMethod, PaymentToken,
};
use crate::view::{DonateView, NullView};

/// How a submission attempt ended, from the caller's point of view
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// The server acknowledged the charge; the receipt is up
    Completed,

    /// The browser is leaving for the hosted checkout page
    Redirected,

    /// The attempt failed; the form is editable again
    Failed,

    /// The state machine did not permit a submission right now
    Refused,
}

/// The per-page donation flow controller
pub struct DonationFlow {
    state: Mutex<FormState>,
    view: Arc<dyn DonateView>,
    analytics: Arc<dyn Analytics>,
    wallet: Mutex<Option<Arc<dyn WalletRequest>>>,
    overlay: Option<Arc<dyn OverlayCheckout>>,
    hosted: HostedCheckoutPath,
    wallet_path: WalletChargePath,
    overlay_path: OverlayChargePath,
    config: WidgetConfig,
}

impl std::fmt::Debug for DonationFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DonationFlow").finish_non_exhaustive()
    }
}

impl DonationFlow {
    pub fn builder() -> DonationFlowBuilder {
        DonationFlowBuilder::new()
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> Phase {
        self.state.lock().unwrap().phase()
    }

    /// Current validated amount, if any
    pub fn amount(&self) -> Option<AmountCents> {
        self.state.lock().unwrap().amount()
    }

    /// Current frequency selection
    pub fn frequency(&self) -> DonationFrequency {
        self.state.lock().unwrap().frequency()
    }

    /// Error message from the last failed attempt, if still displayed
    pub fn error(&self) -> Option<String> {
        self.state.lock().unwrap().error().map(str::to_owned)
    }

    /// Whether a submission would be accepted right now
    pub fn can_submit(&self) -> bool {
        self.state.lock().unwrap().can_submit()
    }

    /// The amount field text changed
    pub fn amount_edited(&self, text: &str) {
        let effects = {
            let mut state = self.state.lock().unwrap();
            state.apply(FormEvent::AmountEdited(text.to_owned()))
        };
        self.dispatch(effects);
    }

    /// The frequency selection changed
    pub fn frequency_changed(&self, frequency: DonationFrequency) {
        let effects = {
            let mut state = self.state.lock().unwrap();
            state.apply(FormEvent::FrequencyChanged(frequency))
        };
        self.dispatch(effects);
    }

    /// Probe the wallet and, when the browser can pay, attach it.
    ///
    /// On success the wallet button becomes visible and the sheet's total
    /// starts tracking the validated amount. A negative or failed probe
    /// leaves the button hidden.
    pub async fn offer_wallet(&self, wallet: Arc<dyn WalletRequest>) -> Result<bool> {
        let available = wallet.can_make_payment().await?;
        if !available {
            tracing::debug!("wallet cannot pay, button stays hidden");
            return Ok(false);
        }
        if let Some(amount) = self.amount() {
            wallet.update_total(amount);
        }
        *self.wallet.lock().unwrap() = Some(wallet);
        self.view.set_wallet_available(true);
        tracing::info!("wallet attached");
        Ok(true)
    }

    /// The wallet sheet was dismissed without producing a token.
    /// Strictly nothing changes: no phase transition, no control updates.
    pub fn wallet_cancelled(&self) {
        tracing::debug!(phase = %self.phase(), "wallet sheet cancelled");
    }

    /// The main donate button: hosted-checkout redirect
    pub async fn submit_hosted_checkout(&self) -> SubmissionOutcome {
        self.run_submission(&self.hosted, None, true).await
    }

    /// A wallet sheet produced a token; charge it and settle the sheet.
    ///
    /// The completion fires exactly once whatever happens, including when
    /// the submission is refused because another attempt is in flight.
    pub async fn submit_wallet_token(
        &self,
        token: PaymentToken,
        completion: Box<dyn WalletCompletion>,
    ) -> SubmissionOutcome {
        let outcome = self
            .run_submission(&self.wallet_path, Some(token), true)
            .await;
        let settle = match outcome {
            SubmissionOutcome::Completed => WalletOutcome::Success,
            _ => WalletOutcome::Fail,
        };
        completion.complete(settle);
        outcome
    }

    /// The legacy overlay produced a token; charge it as `checkout`
    pub async fn submit_overlay_token(&self, token: PaymentToken) -> SubmissionOutcome {
        // The funnel event already fired when the overlay opened.
        self.run_submission(&self.overlay_path, Some(token), false)
            .await
    }

    /// Pop the legacy overlay primed with the current amount.
    ///
    /// Opening is not a phase transition; the overlay's token callback
    /// starts the actual submission. Refused while a submission is in
    /// flight or while the amount does not validate.
    pub fn open_legacy_overlay(&self) {
        let Some(overlay) = self.overlay.clone() else {
            tracing::debug!("no overlay configured");
            return;
        };
        let primed = {
            let state = self.state.lock().unwrap();
            if state.can_submit() {
                state.amount().map(|amount| (amount, state.frequency()))
            } else {
                tracing::debug!(phase = %state.phase(), "overlay open refused");
                None
            }
        };
        let Some((amount, frequency)) = primed else {
            return;
        };
        self.analytics.checkout_started(
            &DonationItem::new(frequency, amount),
            PaymentMethod::LegacyOverlay,
        );
        overlay.open(amount);
    }

    /// One submission attempt, end to end.
    ///
    /// The permission check and the `submitting` entry happen under the
    /// state lock as one step, so a racing second attempt is refused.
    /// Effects are dispatched after the lock is released; the lock is
    /// never held across an await point.
    async fn run_submission(
        &self,
        path: &dyn PaymentPath,
        token: Option<PaymentToken>,
        announce: bool,
    ) -> SubmissionOutcome {
        let attempt = Uuid::new_v4();
        let method = path.method();

        let entry = {
            let mut state = self.state.lock().unwrap();
            if !state.can_submit() {
                tracing::debug!(%attempt, %method, phase = %state.phase(), "submission refused");
                None
            } else {
                let effects = state.apply(FormEvent::SubmitRequested);
                state.amount().map(|amount| {
                    let request = DonationRequest {
                        amount,
                        frequency: state.frequency(),
                        metadata: self.config.metadata.clone(),
                        method,
                        token,
                    };
                    (effects, request)
                })
            }
        };
        let Some((effects, request)) = entry else {
            return SubmissionOutcome::Refused;
        };
        self.dispatch(effects);

        tracing::info!(
            %attempt,
            %method,
            amount = %request.amount,
            frequency = %request.frequency,
            "starting donation"
        );
        if announce {
            self.analytics.checkout_started(&request.item(), method);
        }

        let guard = ProcessingGuard::new(self, attempt);
        match path.execute(&request).await {
            Ok(PathOutcome::Charged(result)) => {
                guard.disarm();
                tracing::info!(%attempt, transaction = %result.id, "donation succeeded");
                self.analytics.donation_completed(&request.item(), &result);
                let effects = {
                    let mut state = self.state.lock().unwrap();
                    state.apply(FormEvent::SubmissionSucceeded(result))
                };
                self.dispatch(effects);
                SubmissionOutcome::Completed
            }
            Ok(PathOutcome::Redirected) => {
                // The page is on its way out: controls stay locked and the
                // processing indicator stays up.
                guard.disarm();
                tracing::info!(%attempt, "redirecting to hosted checkout");
                SubmissionOutcome::Redirected
            }
            Err(err) => {
                guard.disarm();
                tracing::error!(%attempt, %method, error = %err, "donation failed");
                let effects = {
                    let mut state = self.state.lock().unwrap();
                    state.apply(FormEvent::SubmissionFailed {
                        message: err.user_message(),
                    })
                };
                self.dispatch(effects);
                SubmissionOutcome::Failed
            }
        }
    }

    /// Carry out the effects of one transition
    fn dispatch(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SetAmountEnabled(enabled) => self.view.set_amount_enabled(enabled),
                Effect::SetSubmitEnabled(enabled) => self.view.set_submit_enabled(enabled),
                Effect::SetInvalid(invalid) => self.view.set_invalid(invalid),
                Effect::ShowError(message) => self.view.show_error(&message),
                Effect::ClearError => self.view.clear_error(),
                Effect::SetProcessing(processing) => self.view.set_processing(processing),
                Effect::SyncWalletTotal(total) => {
                    let wallet = self.wallet.lock().unwrap().clone();
                    match wallet {
                        Some(wallet) => wallet.update_total(total),
                        // Nothing to sync into yet; silently fine.
                        None => tracing::debug!(%total, "no wallet attached, total not synced"),
                    }
                }
                Effect::RenderReceipt(result) => self.view.render_receipt(&result),
            }
        }
    }
}

/// Settles an attempt that is abandoned mid-flight.
///
/// If the future driving a submission is dropped between the `submitting`
/// entry and its settle event, the form would stay locked forever. The
/// guard turns that exit path into a normal failure; every settled branch
/// disarms it first.
struct ProcessingGuard<'a> {
    flow: &'a DonationFlow,
    attempt: Uuid,
    armed: bool,
}

impl<'a> ProcessingGuard<'a> {
    fn new(flow: &'a DonationFlow, attempt: Uuid) -> Self {
        Self {
            flow,
            attempt,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        tracing::warn!(attempt = %self.attempt, "submission abandoned mid-flight");
        let effects = {
            let mut state = self.flow.state.lock().unwrap();
            state.apply(FormEvent::SubmissionFailed {
                message: GENERIC_FAILURE.into(),
            })
        };
        self.flow.dispatch(effects);
    }
}

/// Builder for [`DonationFlow`]
pub struct DonationFlowBuilder {
    api: Option<Arc<dyn DonationApi>>,
    redirect: Option<Arc<dyn CheckoutRedirect>>,
    view: Arc<dyn DonateView>,
    analytics: Arc<dyn Analytics>,
    overlay: Option<Arc<dyn OverlayCheckout>>,
    config: WidgetConfig,
    initial_text: String,
}

impl Default for DonationFlowBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DonationFlowBuilder {
    pub fn new() -> Self {
        Self {
            api: None,
            redirect: None,
            view: Arc::new(NullView),
            analytics: Arc::new(LogAnalytics),
            overlay: None,
            config: WidgetConfig::default(),
            initial_text: String::new(),
        }
    }

    /// Set the donation API collaborator (required)
    pub fn api(mut self, api: Arc<dyn DonationApi>) -> Self {
        self.api = Some(api);
        self
    }

    /// Set the checkout redirect collaborator (required)
    pub fn redirect(mut self, redirect: Arc<dyn CheckoutRedirect>) -> Self {
        self.redirect = Some(redirect);
        self
    }

    /// Set the view adapter (defaults to a view that renders nothing)
    pub fn view(mut self, view: Arc<dyn DonateView>) -> Self {
        self.view = view;
        self
    }

    /// Set the analytics sink (defaults to structured logging)
    pub fn analytics(mut self, analytics: Arc<dyn Analytics>) -> Self {
        self.analytics = analytics;
        self
    }

    /// Attach the legacy overlay collaborator
    pub fn overlay(mut self, overlay: Arc<dyn OverlayCheckout>) -> Self {
        self.overlay = Some(overlay);
        self
    }

    /// Set the widget configuration
    pub fn config(mut self, config: WidgetConfig) -> Self {
        self.config = config;
        self
    }

    /// Text found in the amount field at initialization
    pub fn initial_amount_text(mut self, text: impl Into<String>) -> Self {
        self.initial_text = text.into();
        self
    }

    pub fn build(self) -> Result<DonationFlow> {
        let api = self
            .api
            .ok_or_else(|| DonateError::Config("a donation API is required".into()))?;
        let redirect = self
            .redirect
            .ok_or_else(|| DonateError::Config("a checkout redirect is required".into()))?;

        let state = FormState::new(&self.initial_text, self.config.default_amount);
        tracing::debug!(
            amount = ?state.amount(),
            phase = %state.phase(),
            "donation flow initialized"
        );

        Ok(DonationFlow {
            state: Mutex::new(state),
            view: self.view,
            analytics: self.analytics,
            wallet: Mutex::new(None),
            overlay: self.overlay,
            hosted: HostedCheckoutPath::new(api.clone(), redirect),
            wallet_path: WalletChargePath::new(api.clone()),
            overlay_path: OverlayChargePath::new(api),
            config: self.config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{
        CompletionRecorder, MockDonationApi, MockOverlay, MockRedirect, MockWallet,
        RecordingAnalytics, RecordingView, ViewCall,
    };
    use crate::types::{ChargeKind, DonationResult};
    use serde_json::json;

    struct Harness {
        flow: DonationFlow,
        api: Arc<MockDonationApi>,
        redirect: Arc<MockRedirect>,
        view: Arc<RecordingView>,
        analytics: Arc<RecordingAnalytics>,
        overlay: Arc<MockOverlay>,
    }

    fn harness() -> Harness {
        let api = Arc::new(MockDonationApi::new());
        let redirect = Arc::new(MockRedirect::new());
        let view = Arc::new(RecordingView::new());
        let analytics = Arc::new(RecordingAnalytics::new());
        let overlay = Arc::new(MockOverlay::new());
        let flow = DonationFlow::builder()
            .api(api.clone())
            .redirect(redirect.clone())
            .view(view.clone())
            .analytics(analytics.clone())
            .overlay(overlay.clone())
            .config(WidgetConfig::default().with_metadata(json!({"campaign": "spring"})))
            .build()
            .unwrap();
        Harness {
            flow,
            api,
            redirect,
            view,
            analytics,
            overlay,
        }
    }

    fn tx1() -> DonationResult {
        DonationResult {
            id: "tx1".into(),
            amount: AmountCents::new(2000),
            email: "a@b.com".into(),
            email_sent: true,
        }
    }

    #[test]
    fn test_builder_requires_api_and_redirect() {
        let err = DonationFlow::builder().build().unwrap_err();
        assert!(matches!(err, DonateError::Config(_)));

        let err = DonationFlow::builder()
            .api(Arc::new(MockDonationApi::new()))
            .build()
            .unwrap_err();
        assert!(matches!(err, DonateError::Config(_)));
    }

    #[test]
    fn test_initializes_from_prefilled_text() {
        let flow = DonationFlow::builder()
            .api(Arc::new(MockDonationApi::new()))
            .redirect(Arc::new(MockRedirect::new()))
            .initial_amount_text("$25")
            .build()
            .unwrap();
        assert_eq!(flow.amount(), Some(AmountCents::new(2500)));
        assert_eq!(flow.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn test_hosted_checkout_redirects_and_keeps_page_locked() {
        let h = harness();
        h.flow.amount_edited("20.00");

        let outcome = h.flow.submit_hosted_checkout().await;

        assert_eq!(outcome, SubmissionOutcome::Redirected);
        assert_eq!(h.flow.phase(), Phase::Submitting);
        let checkouts = h.api.checkouts();
        assert_eq!(checkouts.len(), 1);
        assert_eq!(checkouts[0].amount, AmountCents::new(2000));
        assert_eq!(checkouts[0].metadata, json!({"campaign": "spring"}));
        assert_eq!(h.redirect.sessions().len(), 1);
        // Processing stays up while the browser leaves; nothing re-enables.
        assert!(h.view.saw(&ViewCall::Processing(true)));
        assert!(!h.view.saw(&ViewCall::Processing(false)));
        assert!(!h.view.saw(&ViewCall::SubmitEnabled(true)));
    }

    #[tokio::test]
    async fn test_hosted_checkout_announces_funnel_start() {
        let h = harness();
        h.flow.amount_edited("12");
        h.flow.submit_hosted_checkout().await;

        let started = h.analytics.started();
        assert_eq!(started.len(), 1);
        assert_eq!(started[0].0.id, "web-donation-once");
        assert_eq!(started[0].1, PaymentMethod::HostedCheckout);
    }

    #[tokio::test]
    async fn test_api_failure_shows_generic_message() {
        let h = harness();
        h.api.enqueue_checkout(Err(DonateError::Api { status: 500 }));
        h.flow.amount_edited("20.00");

        let outcome = h.flow.submit_hosted_checkout().await;

        assert_eq!(outcome, SubmissionOutcome::Failed);
        assert_eq!(h.flow.phase(), Phase::Failed);
        assert!(h.view.saw(&ViewCall::Error(GENERIC_FAILURE.into())));
        assert!(h.view.saw(&ViewCall::Processing(false)));
        assert!(h.view.saw(&ViewCall::AmountEnabled(true)));
        assert!(h.view.saw(&ViewCall::SubmitEnabled(true)));
    }

    #[tokio::test]
    async fn test_redirect_rejection_surfaces_verbatim() {
        let h = harness();
        h.redirect.enqueue(Err(DonateError::Redirect(
            "Checkout is not available in this browser.".into(),
        )));
        h.flow.amount_edited("20.00");

        let outcome = h.flow.submit_hosted_checkout().await;

        assert_eq!(outcome, SubmissionOutcome::Failed);
        assert!(h
            .view
            .saw(&ViewCall::Error("Checkout is not available in this browser.".into())));
    }

    #[tokio::test]
    async fn test_submit_refused_while_invalid() {
        let h = harness();
        h.flow.amount_edited("abc");

        let outcome = h.flow.submit_hosted_checkout().await;

        assert_eq!(outcome, SubmissionOutcome::Refused);
        assert!(h.api.checkouts().is_empty());
        assert!(h.analytics.started().is_empty());
    }

    #[tokio::test]
    async fn test_double_submit_dispatches_one_checkout() {
        let h = harness();
        h.flow.amount_edited("20.00");
        let gate = h.api.hold_until_released();

        let (first, second) = tokio::join!(h.flow.submit_hosted_checkout(), async {
            // By the time this runs, the first attempt already holds the
            // submitting phase.
            let second = h.flow.submit_hosted_checkout().await;
            gate.notify_one();
            second
        });

        assert_eq!(first, SubmissionOutcome::Redirected);
        assert_eq!(second, SubmissionOutcome::Refused);
        assert_eq!(h.api.checkouts().len(), 1);
    }

    #[tokio::test]
    async fn test_wallet_token_charges_and_settles_sheet() {
        let h = harness();
        h.flow.amount_edited("20.00");
        h.api.enqueue_charge(Ok(tx1()));
        let recorder = CompletionRecorder::new();

        let token = PaymentToken {
            id: "tok_w".into(),
            email: Some("a@b.com".into()),
            name: Some("Ada".into()),
        };
        let outcome = h
            .flow
            .submit_wallet_token(token, recorder.completion())
            .await;

        assert_eq!(outcome, SubmissionOutcome::Completed);
        assert_eq!(recorder.outcome(), Some(WalletOutcome::Success));
        assert_eq!(h.flow.phase(), Phase::Succeeded);
        let charges = h.api.charges();
        assert_eq!(charges.len(), 1);
        assert_eq!(charges[0].kind, ChargeKind::PaymentRequest);
        assert_eq!(charges[0].email.as_deref(), Some("a@b.com"));
        assert_eq!(h.view.receipt(), Some(tx1()));
        // Terminal: nothing re-enabled after success.
        assert!(!h.view.saw(&ViewCall::AmountEnabled(true)));
        assert!(!h.view.saw(&ViewCall::SubmitEnabled(true)));
    }

    #[tokio::test]
    async fn test_wallet_token_failure_settles_sheet_as_fail() {
        let h = harness();
        h.flow.amount_edited("20.00");
        h.api
            .enqueue_charge(Err(DonateError::Transport("reset".into())));
        let recorder = CompletionRecorder::new();

        let outcome = h
            .flow
            .submit_wallet_token(PaymentToken::new("tok"), recorder.completion())
            .await;

        assert_eq!(outcome, SubmissionOutcome::Failed);
        assert_eq!(recorder.outcome(), Some(WalletOutcome::Fail));
        assert_eq!(h.flow.phase(), Phase::Failed);
        assert!(h.view.saw(&ViewCall::Error(GENERIC_FAILURE.into())));
    }

    #[tokio::test]
    async fn test_wallet_token_during_flight_is_refused_and_fails_sheet() {
        let h = harness();
        h.flow.amount_edited("20.00");
        let gate = h.api.hold_until_released();
        let first_sheet = CompletionRecorder::new();
        let second_sheet = CompletionRecorder::new();

        let (first, second) = tokio::join!(
            h.flow
                .submit_wallet_token(PaymentToken::new("tok_1"), first_sheet.completion()),
            async {
                let second = h
                    .flow
                    .submit_wallet_token(PaymentToken::new("tok_2"), second_sheet.completion())
                    .await;
                gate.notify_one();
                second
            }
        );

        assert_eq!(first, SubmissionOutcome::Completed);
        assert_eq!(second, SubmissionOutcome::Refused);
        assert_eq!(first_sheet.outcome(), Some(WalletOutcome::Success));
        assert_eq!(second_sheet.outcome(), Some(WalletOutcome::Fail));
        assert_eq!(h.api.charges().len(), 1);
    }

    #[tokio::test]
    async fn test_wallet_cancel_changes_nothing() {
        let h = harness();
        h.flow.amount_edited("20.00");
        let calls_before = h.view.calls().len();

        h.flow.wallet_cancelled();

        assert_eq!(h.flow.phase(), Phase::Idle);
        assert_eq!(h.view.calls().len(), calls_before);
        assert!(h.flow.can_submit());
    }

    #[tokio::test]
    async fn test_offer_wallet_attaches_and_shows_button() {
        let h = harness();
        h.flow.amount_edited("12");
        let wallet = Arc::new(MockWallet::new(true));

        let attached = h.flow.offer_wallet(wallet.clone()).await.unwrap();

        assert!(attached);
        assert!(h.view.saw(&ViewCall::WalletAvailable(true)));
        // Current amount pushed at attach time.
        assert_eq!(wallet.totals(), vec![AmountCents::new(1200)]);

        // Later edits keep the sheet total in sync.
        h.flow.amount_edited("15");
        assert_eq!(
            wallet.totals(),
            vec![AmountCents::new(1200), AmountCents::new(1500)]
        );
    }

    #[tokio::test]
    async fn test_offer_wallet_negative_probe_keeps_button_hidden() {
        let h = harness();
        let attached = h
            .flow
            .offer_wallet(Arc::new(MockWallet::new(false)))
            .await
            .unwrap();

        assert!(!attached);
        assert!(!h.view.saw(&ViewCall::WalletAvailable(true)));
    }

    #[tokio::test]
    async fn test_offer_wallet_probe_error_propagates() {
        let h = harness();
        let result = h
            .flow
            .offer_wallet(Arc::new(MockWallet::failing("no support")))
            .await;

        assert!(matches!(result, Err(DonateError::WalletProbe(_))));
        assert!(!h.view.saw(&ViewCall::WalletAvailable(true)));
    }

    #[tokio::test]
    async fn test_equal_value_edit_does_not_resync_wallet() {
        let h = harness();
        h.flow.amount_edited("20.00");
        let wallet = Arc::new(MockWallet::new(true));
        h.flow.offer_wallet(wallet.clone()).await.unwrap();
        assert_eq!(wallet.totals().len(), 1);

        // Same cents, different text: the sheet must not be touched.
        h.flow.amount_edited("  20  ");
        assert_eq!(wallet.totals().len(), 1);
    }

    #[tokio::test]
    async fn test_edit_before_wallet_attached_is_silent() {
        let h = harness();
        // No wallet attached; the sync side channel is a no-op.
        h.flow.amount_edited("31");
        assert_eq!(h.flow.amount(), Some(AmountCents::new(3100)));
    }

    #[tokio::test]
    async fn test_overlay_opens_with_current_amount() {
        let h = harness();
        h.flow.amount_edited("20.00");

        h.flow.open_legacy_overlay();

        assert_eq!(h.overlay.opens(), vec![AmountCents::new(2000)]);
        let started = h.analytics.started();
        assert_eq!(started.len(), 1);
        assert_eq!(started[0].1, PaymentMethod::LegacyOverlay);
        // Opening is not a submission.
        assert_eq!(h.flow.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn test_overlay_open_refused_while_invalid() {
        let h = harness();
        h.flow.amount_edited("zero");

        h.flow.open_legacy_overlay();

        assert!(h.overlay.opens().is_empty());
        assert!(h.analytics.started().is_empty());
    }

    #[tokio::test]
    async fn test_overlay_token_charges_without_double_announce() {
        let h = harness();
        h.flow.amount_edited("20.00");
        h.flow.open_legacy_overlay();

        let outcome = h
            .flow
            .submit_overlay_token(PaymentToken::new("tok_o"))
            .await;

        assert_eq!(outcome, SubmissionOutcome::Completed);
        let charges = h.api.charges();
        assert_eq!(charges[0].kind, ChargeKind::Checkout);
        // One funnel start from the open, none from the token.
        assert_eq!(h.analytics.started().len(), 1);
        assert_eq!(h.analytics.completed().len(), 1);
    }

    #[tokio::test]
    async fn test_failure_then_fix_then_resubmit() {
        let h = harness();
        h.flow.amount_edited("20.00");
        h.api
            .enqueue_charge(Err(DonateError::Api { status: 502 }));

        h.flow
            .submit_overlay_token(PaymentToken::new("tok_1"))
            .await;
        assert_eq!(h.flow.phase(), Phase::Failed);
        assert_eq!(h.flow.error(), Some(GENERIC_FAILURE.to_owned()));

        // The donor bumps the amount and tries again; the retry succeeds.
        h.flow.amount_edited("25");
        assert_eq!(h.flow.phase(), Phase::Failed);
        let outcome = h
            .flow
            .submit_overlay_token(PaymentToken::new("tok_2"))
            .await;

        assert_eq!(outcome, SubmissionOutcome::Completed);
        assert_eq!(h.flow.phase(), Phase::Succeeded);
        assert_eq!(h.flow.error(), None);
        let charges = h.api.charges();
        assert_eq!(charges.len(), 2);
        assert_eq!(charges[1].amount, AmountCents::new(2500));
    }

    #[tokio::test]
    async fn test_abandoned_attempt_settles_as_failure() {
        let h = harness();
        h.flow.amount_edited("20.00");
        let _gate = h.api.hold_until_released();

        // Drop the submission future at its first await point.
        tokio::select! {
            biased;
            _ = h.flow.submit_hosted_checkout() => panic!("gated call cannot settle"),
            () = std::future::ready(()) => {}
        }

        assert_eq!(h.flow.phase(), Phase::Failed);
        assert!(h.view.saw(&ViewCall::Error(GENERIC_FAILURE.into())));
        assert!(h.view.saw(&ViewCall::Processing(false)));
    }

    #[tokio::test]
    async fn test_succeeded_is_terminal_for_every_entry_point() {
        let h = harness();
        h.flow.amount_edited("20.00");
        h.flow.open_legacy_overlay();
        h.flow
            .submit_overlay_token(PaymentToken::new("tok"))
            .await;
        assert_eq!(h.flow.phase(), Phase::Succeeded);

        h.flow.amount_edited("99");
        h.flow.frequency_changed(DonationFrequency::Monthly);
        h.flow.open_legacy_overlay();
        let hosted = h.flow.submit_hosted_checkout().await;
        let recorder = CompletionRecorder::new();
        let wallet = h
            .flow
            .submit_wallet_token(PaymentToken::new("tok_2"), recorder.completion())
            .await;

        assert_eq!(hosted, SubmissionOutcome::Refused);
        assert_eq!(wallet, SubmissionOutcome::Refused);
        assert_eq!(recorder.outcome(), Some(WalletOutcome::Fail));
        assert_eq!(h.flow.phase(), Phase::Succeeded);
        assert_eq!(h.api.charges().len(), 1);
        assert_eq!(h.overlay.opens().len(), 1);
    }
}
