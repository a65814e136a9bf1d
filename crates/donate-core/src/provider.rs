//! Payment Collaborator Interfaces
//!
//! Defines the boundary between the donation flow and everything that
//! actually touches the outside world: the page server, the hosted-checkout
//! redirect, the browser wallet, the legacy overlay, and analytics.
//! The controller works exclusively through these interfaces; swapping a
//! real collaborator for a recorded one requires no controller changes.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use donate_core::provider::{DonationApi, WalletRequest};
//!
//! // Production: the HTTP gateway and the Stripe.js bridges
//! let flow = DonationFlow::builder()
//!     .api(Arc::new(gateway))
//!     .redirect(Arc::new(stripe_redirect))
//!     .build()?;
//!
//! // Tests: scripted mocks from `donate_core::mock`
//! ```

use async_trait::async_trait;

use crate::amount::AmountCents;
use crate::error::Result;
use crate::types::{
    ChargePayload, CheckoutPayload, CheckoutSession, DonationItem, DonationResult, PaymentMethod,
};

/// The page server's two donation endpoints
///
/// Both payment contracts converge here: hosted checkout creates a session
/// to redirect into, the tokenized paths charge directly.
///
/// Browser collaborators wrap futures that are not `Send`, so on wasm
/// every async interface here drops the `Send` bound on its futures.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait DonationApi: Send + Sync {
    /// Create a hosted-checkout session
    async fn create_checkout(&self, payload: &CheckoutPayload) -> Result<CheckoutSession>;

    /// Charge a tokenized payment
    async fn charge(&self, payload: &ChargePayload) -> Result<DonationResult>;
}

/// Hands a checkout session to the payment provider's redirect entry point.
///
/// On success the browser leaves the page, so callers never observe a
/// completed future outside of tests. An error carries the provider's own
/// user-actionable message and is surfaced to the donor verbatim.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait CheckoutRedirect: Send + Sync {
    async fn redirect_to_checkout(&self, session: CheckoutSession) -> Result<()>;
}

/// A browser wallet payment request
///
/// One object covers both halves of the wallet integration: the capability
/// probe that decides whether the button is shown at all, and the displayed
/// total that must track the validated amount.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait WalletRequest: Send + Sync {
    /// Ask the browser whether a wallet sheet can be presented
    async fn can_make_payment(&self) -> Result<bool>;

    /// Update the total shown on the (possibly not yet opened) sheet
    fn update_total(&self, total: AmountCents);
}

/// Outcome reported back to a wallet sheet after its token was processed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WalletOutcome {
    Success,
    Fail,
}

impl WalletOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            WalletOutcome::Success => "success",
            WalletOutcome::Fail => "fail",
        }
    }
}

/// Completion callback attached to a single wallet token event.
///
/// The sheet stays open until this fires; it must be invoked exactly once
/// for every token, whatever the submission outcome.
pub trait WalletCompletion: Send {
    fn complete(self: Box<Self>, outcome: WalletOutcome);
}

/// The legacy hosted overlay
pub trait OverlayCheckout: Send + Sync {
    /// Pop the overlay primed with the given amount
    fn open(&self, amount: AmountCents);
}

/// Analytics boundary
///
/// Delivery to any concrete analytics backend happens outside the widget;
/// the flow only reports the two funnel events.
pub trait Analytics: Send + Sync {
    /// A checkout funnel began on the given path
    fn checkout_started(&self, item: &DonationItem, method: PaymentMethod);

    /// A donation completed and was acknowledged by the server
    fn donation_completed(&self, item: &DonationItem, result: &DonationResult);
}

/// Default analytics sink: structured log lines, nothing leaves the process
#[derive(Clone, Copy, Debug, Default)]
pub struct LogAnalytics;

impl Analytics for LogAnalytics {
    fn checkout_started(&self, item: &DonationItem, method: PaymentMethod) {
        tracing::info!(
            item = %item.id,
            amount = %item.amount,
            method = %method,
            "checkout started"
        );
    }

    fn donation_completed(&self, item: &DonationItem, result: &DonationResult) {
        tracing::info!(
            item = %item.id,
            amount = %result.amount,
            transaction = %result.id,
            "donation completed"
        );
    }
}
