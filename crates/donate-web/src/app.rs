//! Donation Widget Component

use std::sync::Arc;

use futures::StreamExt;
use leptos::either::Either;
use leptos::ev;
use leptos::prelude::*;

use donate_core::flow::DonationFlow;
use donate_core::modal::{CHECK_FRAGMENT, CheckModal};
use donate_core::types::{DonationFrequency, DonationItem};
use donate_core::{AmountCents, WidgetConfig};
use donate_gateway::HttpGateway;

use crate::components::CheckInstructions;
use crate::page::{BrowserModalHost, PageContext};
use crate::stripe::{StripeOverlay, StripeRedirect, StripeWallet, WalletEvent};
use crate::view::{LeptosView, WidgetSignals};

/// DOM node the wallet button mounts into
const WALLET_SELECTOR: &str = "#donate-wallet-button";

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    view! {
        <main class="app">
            <DonateWidget />
        </main>
    }
}

/// The donation widget: amount entry, three payment paths, check modal
#[component]
pub fn DonateWidget() -> impl IntoView {
    let started = PageContext::from_window()
        .ok_or_else(|| "missing window or STRIPE_PK".to_string())
        .and_then(mount_widget);
    match started {
        Ok(widget) => Either::Left(widget),
        Err(message) => {
            leptos::logging::error!("donation widget failed to start: {message}");
            Either::Right(view! {
                <div class="donate-unavailable">"Donations are unavailable right now."</div>
            })
        }
    }
}

/// Wire the collaborators, build the flow, and render the widget
fn mount_widget(page: PageContext) -> Result<impl IntoView, String> {
    let signals = WidgetSignals::new();
    let config = WidgetConfig::default().with_metadata(page.metadata.clone());
    let receipt_config = config.clone();
    let initial_text = page.initial_amount.clone().unwrap_or_default();

    let stripe = crate::stripe::init(&page.publishable_key).map_err(|e| e.to_string())?;
    let redirect = StripeRedirect::connect(stripe.clone());

    let initial_amount = AmountCents::parse(&initial_text).unwrap_or(config.default_amount);
    let item = DonationItem::new(DonationFrequency::Once, initial_amount);
    let (wallet, mut wallet_events) = StripeWallet::connect(stripe, &item, WALLET_SELECTOR);
    let (overlay, mut overlay_tokens) = StripeOverlay::connect(&page.publishable_key, &item);

    let gateway = HttpGateway::for_origin(page.origin.clone(), &config);

    let mut builder = DonationFlow::builder()
        .api(Arc::new(gateway))
        .redirect(Arc::new(redirect))
        .overlay(Arc::new(overlay))
        .view(Arc::new(LeptosView::new(signals)))
        .config(config);
    if let Some(text) = page.initial_amount.clone() {
        builder = builder.initial_amount_text(text);
    }
    let flow = Arc::new(builder.build().map_err(|e| e.to_string())?);

    let wallet = Arc::new(wallet);
    leptos::task::spawn_local({
        let flow = flow.clone();
        async move {
            if let Err(e) = flow.offer_wallet(wallet).await {
                leptos::logging::warn!("wallet probe failed: {e}");
            }
        }
    });
    leptos::task::spawn_local({
        let flow = flow.clone();
        async move {
            while let Some(event) = wallet_events.next().await {
                match event {
                    WalletEvent::Submitted(submission) => {
                        let _ = flow
                            .submit_wallet_token(submission.token, submission.completion)
                            .await;
                    }
                    WalletEvent::Cancelled => flow.wallet_cancelled(),
                }
            }
        }
    });
    leptos::task::spawn_local({
        let flow = flow.clone();
        async move {
            while let Some(token) = overlay_tokens.next().await {
                let _ = flow.submit_overlay_token(token).await;
            }
        }
    });

    let modal_open = RwSignal::new(false);
    let modal = CheckModal::new(Arc::new(BrowserModalHost::new(modal_open)));
    modal.sync_from_location();
    let modal = StoredValue::new(modal);
    window_event_listener(ev::keydown, move |event| {
        if event.key() == "Escape" && modal_open.get() {
            modal.with_value(CheckModal::close);
        }
    });
    let on_check_open = move |ev: web_sys::MouseEvent| {
        // The anchor's own navigation would push a history entry.
        ev.prevent_default();
        modal.with_value(CheckModal::open);
    };
    let on_check_close = Callback::new(move |()| modal.with_value(CheckModal::close));

    let on_amount = {
        let flow = flow.clone();
        move |ev| flow.amount_edited(&event_target_value(&ev))
    };
    let on_frequency = {
        let flow = flow.clone();
        move |ev| flow.frequency_changed(DonationFrequency::parse(&event_target_value(&ev)))
    };
    let on_submit = {
        let flow = flow.clone();
        move |_| {
            let flow = flow.clone();
            leptos::task::spawn_local(async move {
                let _ = flow.submit_hosted_checkout().await;
            });
        }
    };
    let on_overlay = move |_| flow.open_legacy_overlay();

    Ok(view! {
        <div class="donate-widget">
            <div
                class="donate-form"
                class:donate-invalid=move || signals.invalid.get()
                class:donate-hidden=move || signals.receipt.get().is_some()
            >
                <label class="donate-amount-label">
                    "Donation amount"
                    <input
                        class="donate-amount"
                        type="text"
                        inputmode="decimal"
                        placeholder="$10.00"
                        value=initial_text
                        disabled=move || !signals.amount_enabled.get()
                        on:input=on_amount
                    />
                </label>
                <fieldset class="donate-frequency">
                    <label>
                        <input
                            type="radio"
                            name="donate-frequency"
                            value="once"
                            checked=true
                            on:change=on_frequency.clone()
                        />
                        "One-time"
                    </label>
                    <label>
                        <input
                            type="radio"
                            name="donate-frequency"
                            value="monthly"
                            on:change=on_frequency
                        />
                        "Monthly"
                    </label>
                </fieldset>
                <Show when=move || signals.error.get().is_some()>
                    <div class="donate-error" role="alert">
                        {move || signals.error.get().unwrap_or_default()}
                    </div>
                </Show>
                <button
                    class="donate-submit"
                    disabled=move || !signals.submit_enabled.get()
                    on:click=on_submit
                >
                    {move || if signals.processing.get() { "Processing..." } else { "Donate" }}
                </button>
                <div
                    id="donate-wallet-button"
                    class="donate-wallet"
                    class:donate-hidden=move || !signals.wallet_available.get()
                ></div>
                <button class="donate-overlay-link" on:click=on_overlay>
                    "Use the classic card form"
                </button>
                <a href=CHECK_FRAGMENT class="donate-check-link" on:click=on_check_open>
                    "Prefer to give by check?"
                </a>
            </div>
            <Show when=move || signals.receipt.get().is_some()>
                <div class="donate-receipt">
                    <h2>"Thank you!"</h2>
                    {
                        let receipt_config = receipt_config.clone();
                        move || {
                        let receipt_config = receipt_config.clone();
                        signals.receipt.get().map(move |result| {
                            let link = receipt_config.receipt_link(&result.id);
                            view! {
                                <p>"Your " {result.amount.to_string()} " donation went through."</p>
                                <p class="donate-receipt-ref">"Transaction " {result.id.clone()}</p>
                                {result.email_sent.then(|| view! {
                                    <p class="donate-receipt-email">
                                        "A receipt is on its way to " {result.email.clone()} "."
                                    </p>
                                })}
                                <a class="donate-receipt-link" href=link>"View your receipt"</a>
                            }
                        })
                    }}
                </div>
            </Show>
            <CheckInstructions open=modal_open on_close=on_check_close>
                <h2>"Give by check"</h2>
                <p>"Make your check payable to Donation Fund and mail it to:"</p>
                <p class="donate-check-address">"Donation Fund" <br /> "PO Box 100" <br /> "Boston, MA 02134"</p>
            </CheckInstructions>
        </div>
    })
}
