//! View Interface
//!
//! Capability surface the flow needs from whatever renders the form.
//! Rendering technology stays out of the core: a browser adapter maps these
//! calls onto reactive signals, tests use a recording implementation.

use crate::types::DonationResult;

/// What the donation flow can do to the rendered form
pub trait DonateView: Send + Sync {
    /// Enable or disable the amount input
    fn set_amount_enabled(&self, enabled: bool);

    /// Enable or disable every submission trigger
    fn set_submit_enabled(&self, enabled: bool);

    /// Show or clear the invalid-amount marker
    fn set_invalid(&self, invalid: bool);

    /// Show an error message
    fn show_error(&self, message: &str);

    /// Clear any displayed error
    fn clear_error(&self);

    /// Show or hide the processing indicator
    fn set_processing(&self, processing: bool);

    /// Show or hide the wallet button
    fn set_wallet_available(&self, available: bool);

    /// Swap the form for the receipt
    fn render_receipt(&self, result: &DonationResult);
}

/// View that renders nothing; for headless use and tests
#[derive(Clone, Copy, Debug, Default)]
pub struct NullView;

impl DonateView for NullView {
    fn set_amount_enabled(&self, _enabled: bool) {}
    fn set_submit_enabled(&self, _enabled: bool) {}
    fn set_invalid(&self, _invalid: bool) {}
    fn show_error(&self, _message: &str) {}
    fn clear_error(&self) {}
    fn set_processing(&self, _processing: bool) {}
    fn set_wallet_available(&self, _available: bool) {}
    fn render_receipt(&self, _result: &DonationResult) {}
}
