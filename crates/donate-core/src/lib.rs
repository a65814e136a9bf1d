//! # donate-core
//!
//! Sans-IO core of the browser donation widget: amount validation, the
//! donation form state machine, and orchestration of the three payment
//! paths over abstract collaborator interfaces.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      DonationFlow                            │
//! │  ┌────────────┐  ┌──────────────┐  ┌──────────────────────┐  │
//! │  │ FormState  │  │ PaymentPath  │  │  Collaborators       │  │
//! │  │ (phases +  │──│ (checkout /  │──│  DonationApi, View,  │  │
//! │  │  effects)  │  │ wallet /     │  │  Wallet, Redirect,   │  │
//! │  └────────────┘  │ overlay)     │  │  Overlay, Analytics  │  │
//! │                  └──────────────┘  └──────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rendering, the network, and payment SDKs all live behind the
//! collaborator traits, so every lifecycle rule here runs under test with
//! no DOM, no server, and no provider script.

pub mod amount;
pub mod config;
pub mod error;
pub mod flow;
pub mod form;
pub mod mock;
pub mod modal;
pub mod paths;
pub mod provider;
pub mod types;
pub mod view;

pub use amount::AmountCents;
pub use config::WidgetConfig;
pub use error::{DonateError, Result};
pub use flow::{DonationFlow, SubmissionOutcome};
pub use form::{Effect, FormEvent, FormState, Phase};
pub use modal::CheckModal;
pub use provider::{DonationApi, WalletOutcome};
pub use types::{
    ChargePayload, CheckoutPayload, CheckoutSession, DonationFrequency, DonationResult,
    PaymentToken,
};
pub use view::DonateView;
