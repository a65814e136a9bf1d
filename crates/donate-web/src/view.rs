//! Reactive View Adapter
//!
//! Maps the flow's view calls onto Leptos signals. The widget component
//! renders from these signals and nothing else.

use leptos::prelude::*;

use donate_core::types::DonationResult;
use donate_core::view::DonateView;

/// Signal bundle the widget renders from
#[derive(Clone, Copy)]
pub struct WidgetSignals {
    /// Amount input enabled
    pub amount_enabled: RwSignal<bool>,

    /// Submission triggers enabled
    pub submit_enabled: RwSignal<bool>,

    /// Amount input marked invalid
    pub invalid: RwSignal<bool>,

    /// Failure banner message
    pub error: RwSignal<Option<String>>,

    /// Submission in flight
    pub processing: RwSignal<bool>,

    /// Wallet button visible
    pub wallet_available: RwSignal<bool>,

    /// Terminal receipt; replaces the form once set
    pub receipt: RwSignal<Option<DonationResult>>,
}

impl WidgetSignals {
    pub fn new() -> Self {
        Self {
            amount_enabled: RwSignal::new(true),
            submit_enabled: RwSignal::new(true),
            invalid: RwSignal::new(false),
            error: RwSignal::new(None),
            processing: RwSignal::new(false),
            wallet_available: RwSignal::new(false),
            receipt: RwSignal::new(None),
        }
    }
}

impl Default for WidgetSignals {
    fn default() -> Self {
        Self::new()
    }
}

/// `DonateView` over the signal bundle
#[derive(Clone, Copy)]
pub struct LeptosView {
    signals: WidgetSignals,
}

impl LeptosView {
    pub fn new(signals: WidgetSignals) -> Self {
        Self { signals }
    }
}

impl DonateView for LeptosView {
    fn set_amount_enabled(&self, enabled: bool) {
        self.signals.amount_enabled.set(enabled);
    }

    fn set_submit_enabled(&self, enabled: bool) {
        self.signals.submit_enabled.set(enabled);
    }

    fn set_invalid(&self, invalid: bool) {
        self.signals.invalid.set(invalid);
    }

    fn show_error(&self, message: &str) {
        self.signals.error.set(Some(message.to_string()));
    }

    fn clear_error(&self) {
        self.signals.error.set(None);
    }

    fn set_processing(&self, processing: bool) {
        self.signals.processing.set(processing);
    }

    fn set_wallet_available(&self, available: bool) {
        self.signals.wallet_available.set(available);
    }

    fn render_receipt(&self, result: &DonationResult) {
        self.signals.receipt.set(Some(result.clone()));
    }
}
