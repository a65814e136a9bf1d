//! Payment Paths
//!
//! The three ways a donation can pay: hosted-checkout redirect, wallet
//! payment-request token, and the legacy overlay token. Each path owns its
//! wire assembly; all of them converge on the same two endpoints and the
//! same settle semantics, so the flow controller treats them uniformly.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{DonateError, Result};
use crate::provider::{CheckoutRedirect, DonationApi};
use crate::types::{
    ChargeKind, ChargePayload, CheckoutPayload, DonationRequest, DonationResult, PaymentMethod,
};

/// What a successfully dispatched attempt produced
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathOutcome {
    /// The browser is leaving for the hosted checkout page
    Redirected,

    /// The server acknowledged a completed charge
    Charged(DonationResult),
}

/// One way of turning a donation request into money movement
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait PaymentPath: Send + Sync {
    /// Which payment method this path drives
    fn method(&self) -> PaymentMethod;

    /// Carry out the asynchronous part of one submission attempt
    async fn execute(&self, request: &DonationRequest) -> Result<PathOutcome>;
}

/// Create a checkout session, then hand the browser to the provider
pub struct HostedCheckoutPath {
    api: Arc<dyn DonationApi>,
    redirect: Arc<dyn CheckoutRedirect>,
}

impl HostedCheckoutPath {
    pub fn new(api: Arc<dyn DonationApi>, redirect: Arc<dyn CheckoutRedirect>) -> Self {
        Self { api, redirect }
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl PaymentPath for HostedCheckoutPath {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::HostedCheckout
    }

    async fn execute(&self, request: &DonationRequest) -> Result<PathOutcome> {
        let payload = CheckoutPayload {
            amount: request.amount,
            frequency: Some(request.frequency),
            metadata: request.metadata.clone(),
        };
        let session = self.api.create_checkout(&payload).await?;
        // In a real browser Ok means the navigation is underway and this
        // code stops running; an Err carries the provider's own message.
        self.redirect.redirect_to_checkout(session).await?;
        Ok(PathOutcome::Redirected)
    }
}

/// Charge a token minted by the wallet payment sheet
pub struct WalletChargePath {
    api: Arc<dyn DonationApi>,
}

impl WalletChargePath {
    pub fn new(api: Arc<dyn DonationApi>) -> Self {
        Self { api }
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl PaymentPath for WalletChargePath {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::PaymentRequest
    }

    async fn execute(&self, request: &DonationRequest) -> Result<PathOutcome> {
        let payload = charge_payload(request, ChargeKind::PaymentRequest)?;
        let result = self.api.charge(&payload).await?;
        Ok(PathOutcome::Charged(result))
    }
}

/// Charge a token minted by the legacy hosted overlay
pub struct OverlayChargePath {
    api: Arc<dyn DonationApi>,
}

impl OverlayChargePath {
    pub fn new(api: Arc<dyn DonationApi>) -> Self {
        Self { api }
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl PaymentPath for OverlayChargePath {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::LegacyOverlay
    }

    async fn execute(&self, request: &DonationRequest) -> Result<PathOutcome> {
        let payload = charge_payload(request, ChargeKind::Checkout)?;
        let result = self.api.charge(&payload).await?;
        Ok(PathOutcome::Charged(result))
    }
}

fn charge_payload(request: &DonationRequest, kind: ChargeKind) -> Result<ChargePayload> {
    let token = request.token.as_ref().ok_or_else(|| {
        DonateError::SubmissionRefused("tokenized path started without a token".into())
    })?;
    Ok(ChargePayload {
        amount: request.amount,
        token: token.id.clone(),
        kind,
        email: token.email.clone(),
        name: token.name.clone(),
        metadata: Some(request.metadata.clone()),
    })
}
