//! Stripe.js Bridges
//!
//! Adapters implementing the core payment interfaces over Stripe.js v3
//! and the legacy Checkout overlay.
//!
//! Raw Stripe handles are not `Send`, while the flow's collaborator traits
//! are. Each adapter therefore parks its handle inside a task on the page
//! event loop and talks to it over a channel; the adapter object itself
//! holds only the sending half.

mod bindings;

use async_trait::async_trait;
use futures::StreamExt;
use futures::channel::{mpsc, oneshot};
use serde::Serialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::js_sys::{Function, Object, Reflect};

use donate_core::amount::AmountCents;
use donate_core::error::{DonateError, Result};
use donate_core::provider::{
    CheckoutRedirect, OverlayCheckout, WalletCompletion, WalletOutcome, WalletRequest,
};
use donate_core::types::{CheckoutSession, DonationItem, PaymentToken};

pub use self::bindings::JsStripe;
use self::bindings::{JsCheckoutHandler, JsPaymentRequest, checkout_configure, new_stripe};

const WALLET_COUNTRY: &str = "US";
const WALLET_CURRENCY: &str = "usd";

/// Header shown on the legacy overlay
const OVERLAY_NAME: &str = "Donation";

/// Create the Stripe.js client handle for the page's publishable key
pub fn init(publishable_key: &str) -> Result<JsStripe> {
    new_stripe(publishable_key).map_err(|e| DonateError::Config(js_message(&e)))
}

/// Options for `stripe.paymentRequest(...)`
#[derive(Serialize)]
struct WalletOptions {
    country: &'static str,
    currency: &'static str,
    total: WalletTotal,
    #[serde(rename = "requestPayerName")]
    request_payer_name: bool,
    #[serde(rename = "requestPayerEmail")]
    request_payer_email: bool,
}

/// Line item displayed on the wallet sheet
#[derive(Serialize)]
struct WalletTotal {
    label: String,
    amount: u64,
}

/// Options for `paymentRequest.update(...)`
#[derive(Serialize)]
struct WalletUpdate {
    total: WalletTotal,
}

/// Options for `StripeCheckout.configure(...)`; the token callback is
/// attached afterwards as a JS function
#[derive(Serialize)]
struct OverlayConfig {
    key: String,
    locale: String,
}

/// Options for `handler.open(...)` on the legacy overlay
#[derive(Serialize)]
struct OverlayOpen {
    name: String,
    description: String,
    amount: u64,
}

/// A token minted by the wallet sheet, paired with its completion callback
pub struct WalletSubmission {
    pub token: PaymentToken,
    pub completion: Box<dyn WalletCompletion>,
}

/// Event stream out of the wallet sheet
pub enum WalletEvent {
    /// The donor confirmed payment and the sheet minted a token
    Submitted(WalletSubmission),
    /// The donor dismissed the sheet without paying
    Cancelled,
}

/// Wallet completion reporting over a oneshot channel. The bridge side
/// owns the live sheet event and settles it with whatever arrives here.
struct ChannelCompletion {
    tx: oneshot::Sender<WalletOutcome>,
}

impl WalletCompletion for ChannelCompletion {
    fn complete(self: Box<Self>, outcome: WalletOutcome) {
        let _ = self.tx.send(outcome);
    }
}

struct RedirectRequest {
    session: serde_json::Value,
    reply: oneshot::Sender<Result<()>>,
}

/// `CheckoutRedirect` backed by a Stripe handle on the event loop
pub struct StripeRedirect {
    tx: mpsc::UnboundedSender<RedirectRequest>,
}

impl StripeRedirect {
    /// Spawn the bridge task owning the Stripe handle
    pub fn connect(stripe: JsStripe) -> Self {
        let (tx, mut rx) = mpsc::unbounded::<RedirectRequest>();
        spawn_local(async move {
            while let Some(request) = rx.next().await {
                let outcome = run_redirect(&stripe, &request.session).await;
                let _ = request.reply.send(outcome);
            }
        });
        Self { tx }
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl CheckoutRedirect for StripeRedirect {
    async fn redirect_to_checkout(&self, session: CheckoutSession) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .unbounded_send(RedirectRequest {
                session: session.into_inner(),
                reply,
            })
            .map_err(|_| DonateError::Other("redirect bridge closed".into()))?;
        match rx.await {
            Ok(outcome) => outcome,
            Err(_) => Err(DonateError::Other("redirect bridge dropped".into())),
        }
    }
}

/// Drive one `redirectToCheckout` call.
///
/// Only a message Stripe authored for the donor comes back as
/// [`DonateError::Redirect`]; bridge and serialization failures stay
/// internal and collapse to the generic failure line.
async fn run_redirect(stripe: &JsStripe, session: &serde_json::Value) -> Result<()> {
    let options =
        serde_wasm_bindgen::to_value(session).map_err(|e| DonateError::Other(e.to_string()))?;
    let promise = stripe
        .redirect_to_checkout(options)
        .map_err(|e| DonateError::Other(js_message(&e)))?;
    match JsFuture::from(promise).await {
        Ok(result) => match redirect_error_message(&result) {
            Some(message) => Err(DonateError::Redirect(message)),
            None => Ok(()),
        },
        Err(e) => Err(DonateError::Other(js_message(&e))),
    }
}

/// Extract `result.error.message` from a settled redirect call
fn redirect_error_message(result: &JsValue) -> Option<String> {
    let error = Reflect::get(result, &JsValue::from_str("error")).ok()?;
    if error.is_undefined() || error.is_null() {
        return None;
    }
    Some(string_field(&error, "message").unwrap_or_else(|| "Checkout redirect failed".into()))
}

enum WalletCmd {
    Probe(oneshot::Sender<Result<bool>>),
    Update(AmountCents),
}

/// `WalletRequest` backed by a Stripe payment request on the event loop
pub struct StripeWallet {
    tx: mpsc::UnboundedSender<WalletCmd>,
}

impl StripeWallet {
    /// Spawn the bridge task: creates the payment request, streams its
    /// token and cancel events to the returned receiver, and mounts the
    /// wallet button into `button_selector` once a capability probe passes.
    pub fn connect(
        stripe: JsStripe,
        item: &DonationItem,
        button_selector: &str,
    ) -> (Self, mpsc::UnboundedReceiver<WalletEvent>) {
        let (tx, mut rx) = mpsc::unbounded::<WalletCmd>();
        let (event_tx, event_rx) = mpsc::unbounded::<WalletEvent>();
        let label = item.name.clone();
        let initial = item.amount;
        let selector = button_selector.to_string();
        spawn_local(async move {
            let request = match create_payment_request(&stripe, &label, initial, event_tx) {
                Ok(request) => request,
                Err(e) => {
                    // Answer every probe with the creation failure.
                    let message = e.to_string();
                    while let Some(cmd) = rx.next().await {
                        if let WalletCmd::Probe(reply) = cmd {
                            let _ = reply.send(Err(DonateError::WalletProbe(message.clone())));
                        }
                    }
                    return;
                }
            };
            let mut mounted = false;
            while let Some(cmd) = rx.next().await {
                match cmd {
                    WalletCmd::Probe(reply) => {
                        let outcome =
                            probe_and_mount(&stripe, &request, &selector, &mut mounted).await;
                        let _ = reply.send(outcome);
                    }
                    WalletCmd::Update(total) => {
                        let update = WalletUpdate {
                            total: WalletTotal {
                                label: label.clone(),
                                amount: total.get(),
                            },
                        };
                        if let Ok(options) = serde_wasm_bindgen::to_value(&update) {
                            request.update(options);
                        }
                    }
                }
            }
        });
        (Self { tx }, event_rx)
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl WalletRequest for StripeWallet {
    async fn can_make_payment(&self) -> Result<bool> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .unbounded_send(WalletCmd::Probe(reply))
            .map_err(|_| DonateError::WalletProbe("wallet bridge closed".into()))?;
        rx.await
            .map_err(|_| DonateError::WalletProbe("wallet bridge dropped".into()))?
    }

    fn update_total(&self, total: AmountCents) {
        let _ = self.tx.unbounded_send(WalletCmd::Update(total));
    }
}

/// Build the payment request and register its token and cancel handlers.
///
/// Each token event carries a completion the sheet waits on; the handler
/// forwards the pair to the event stream and settles the sheet when the
/// other end reports back.
fn create_payment_request(
    stripe: &JsStripe,
    label: &str,
    initial: AmountCents,
    event_tx: mpsc::UnboundedSender<WalletEvent>,
) -> Result<JsPaymentRequest> {
    let options = WalletOptions {
        country: WALLET_COUNTRY,
        currency: WALLET_CURRENCY,
        total: WalletTotal {
            label: label.to_string(),
            amount: initial.get(),
        },
        request_payer_name: true,
        request_payer_email: true,
    };
    let options =
        serde_wasm_bindgen::to_value(&options).map_err(|e| DonateError::Other(e.to_string()))?;
    let request = stripe.payment_request(options).map_err(|e| wallet_err(&e))?;

    let cancel_tx = event_tx.clone();
    let on_token = Closure::<dyn FnMut(JsValue)>::new(move |event: JsValue| {
        let Some(token) = token_from_event(&event) else {
            settle_event(&event, WalletOutcome::Fail);
            return;
        };
        let (tx, rx) = oneshot::channel();
        let submission = WalletSubmission {
            token,
            completion: Box::new(ChannelCompletion { tx }),
        };
        if event_tx
            .unbounded_send(WalletEvent::Submitted(submission))
            .is_err()
        {
            settle_event(&event, WalletOutcome::Fail);
            return;
        }
        spawn_local(async move {
            let outcome = rx.await.unwrap_or(WalletOutcome::Fail);
            settle_event(&event, outcome);
        });
    });
    request.on("token", on_token.as_ref().unchecked_ref());
    let on_cancel = Closure::<dyn FnMut()>::new(move || {
        let _ = cancel_tx.unbounded_send(WalletEvent::Cancelled);
    });
    request.on("cancel", on_cancel.as_ref().unchecked_ref());
    // Both handlers live for the page lifetime.
    on_token.forget();
    on_cancel.forget();
    Ok(request)
}

/// Extract the charge token and payer details from a `token` event
fn token_from_event(event: &JsValue) -> Option<PaymentToken> {
    let raw = Reflect::get(event, &JsValue::from_str("token")).ok()?;
    let id = string_field(&raw, "id")?;
    let mut token = PaymentToken::new(id);
    token.email = string_field(event, "payerEmail");
    token.name = string_field(event, "payerName");
    Some(token)
}

/// Settle the wallet sheet for one token event
fn settle_event(event: &JsValue, outcome: WalletOutcome) {
    let Some(complete) = Reflect::get(event, &JsValue::from_str("complete"))
        .ok()
        .and_then(|f| f.dyn_into::<Function>().ok())
    else {
        return;
    };
    let _ = complete.call1(event, &JsValue::from_str(outcome.as_str()));
}

/// Ask the browser for wallet support; mount the button on first success
async fn probe_and_mount(
    stripe: &JsStripe,
    request: &JsPaymentRequest,
    selector: &str,
    mounted: &mut bool,
) -> Result<bool> {
    let promise = request.can_make_payment().map_err(|e| wallet_err(&e))?;
    let result = JsFuture::from(promise)
        .await
        .map_err(|e| wallet_err(&e))?;
    let available = !result.is_null() && !result.is_undefined();
    if available && !*mounted {
        mount_wallet_button(stripe, request, selector)?;
        *mounted = true;
    }
    Ok(available)
}

/// `elements.create("paymentRequestButton", { paymentRequest })` mounted
/// into the selector
fn mount_wallet_button(
    stripe: &JsStripe,
    request: &JsPaymentRequest,
    selector: &str,
) -> Result<()> {
    let elements = stripe.elements().map_err(|e| wallet_err(&e))?;
    let options = Object::new();
    Reflect::set(
        &options,
        &JsValue::from_str("paymentRequest"),
        request.as_ref(),
    )
    .map_err(|e| wallet_err(&e))?;
    let button = elements
        .create("paymentRequestButton", options.into())
        .map_err(|e| wallet_err(&e))?;
    button.mount(selector).map_err(|e| wallet_err(&e))
}

fn wallet_err(e: &JsValue) -> DonateError {
    DonateError::WalletProbe(js_message(e))
}

/// `OverlayCheckout` backed by a legacy Checkout handler on the event loop
pub struct StripeOverlay {
    tx: mpsc::UnboundedSender<AmountCents>,
}

impl StripeOverlay {
    /// Spawn the bridge task: configures the overlay handler and streams
    /// its token callbacks to the returned receiver.
    pub fn connect(
        publishable_key: &str,
        item: &DonationItem,
    ) -> (Self, mpsc::UnboundedReceiver<PaymentToken>) {
        let (tx, mut rx) = mpsc::unbounded::<AmountCents>();
        let (token_tx, token_rx) = mpsc::unbounded::<PaymentToken>();
        let key = publishable_key.to_string();
        let description = item.name.clone();
        spawn_local(async move {
            let handler = match configure_overlay(&key, token_tx) {
                Ok(handler) => handler,
                Err(e) => {
                    leptos::logging::error!("legacy overlay unavailable: {e}");
                    while rx.next().await.is_some() {}
                    return;
                }
            };
            while let Some(amount) = rx.next().await {
                let options = OverlayOpen {
                    name: OVERLAY_NAME.to_string(),
                    description: description.clone(),
                    amount: amount.get(),
                };
                match serde_wasm_bindgen::to_value(&options) {
                    Ok(options) => {
                        if let Err(e) = handler.open(options) {
                            leptos::logging::error!("overlay open failed: {}", js_message(&e));
                        }
                    }
                    Err(e) => leptos::logging::error!("overlay options failed: {e}"),
                }
            }
        });
        (Self { tx }, token_rx)
    }
}

impl OverlayCheckout for StripeOverlay {
    fn open(&self, amount: AmountCents) {
        let _ = self.tx.unbounded_send(amount);
    }
}

/// `StripeCheckout.configure(...)` with the token callback attached
fn configure_overlay(
    key: &str,
    token_tx: mpsc::UnboundedSender<PaymentToken>,
) -> Result<JsCheckoutHandler> {
    let config = OverlayConfig {
        key: key.to_string(),
        locale: "auto".to_string(),
    };
    let options =
        serde_wasm_bindgen::to_value(&config).map_err(|e| DonateError::Other(e.to_string()))?;
    let callback = Closure::<dyn FnMut(JsValue)>::new(move |raw: JsValue| {
        let Some(id) = string_field(&raw, "id") else {
            return;
        };
        let mut token = PaymentToken::new(id);
        token.email = string_field(&raw, "email");
        let _ = token_tx.unbounded_send(token);
    });
    Reflect::set(&options, &JsValue::from_str("token"), callback.as_ref())
        .map_err(|e| DonateError::Other(js_message(&e)))?;
    callback.forget();
    checkout_configure(options).map_err(|e| DonateError::Config(js_message(&e)))
}

/// Best-effort readable message out of a JS exception value
fn js_message(value: &JsValue) -> String {
    string_field(value, "message")
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{value:?}"))
}

/// Read a string property off a JS object
fn string_field(value: &JsValue, name: &str) -> Option<String> {
    Reflect::get(value, &JsValue::from_str(name))
        .ok()
        .and_then(|v| v.as_string())
}
