//! Donation Types
//!
//! Domain and wire types shared by the state machine, the payment paths,
//! and the HTTP gateway. Wire shapes here are contractual: the page server
//! and the hosted-checkout collaborator both parse them as-is.

use serde::{Deserialize, Serialize};

use crate::amount::AmountCents;

/// How often the donor wants to give
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DonationFrequency {
    #[default]
    Once,
    Monthly,
}

impl DonationFrequency {
    /// Parse a form-control value. Anything that is not exactly
    /// `"monthly"` falls back to one-time.
    pub fn parse(value: &str) -> Self {
        match value {
            "monthly" => DonationFrequency::Monthly,
            _ => DonationFrequency::Once,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DonationFrequency::Once => "once",
            DonationFrequency::Monthly => "monthly",
        }
    }
}

impl std::fmt::Display for DonationFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Catalog line-item descriptor for payment and analytics collaborators
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationItem {
    /// Catalog identifier
    pub id: String,

    /// Human-readable name
    pub name: String,

    /// Line-item amount in cents
    pub amount: AmountCents,
}

impl DonationItem {
    /// The catalog entry for a donation of the given frequency
    pub fn new(frequency: DonationFrequency, amount: AmountCents) -> Self {
        match frequency {
            DonationFrequency::Once => Self {
                id: "web-donation-once".into(),
                name: "One-time Donation".into(),
                amount,
            },
            DonationFrequency::Monthly => Self {
                id: "web-donation-monthly".into(),
                name: "Monthly Donation".into(),
                amount,
            },
        }
    }
}

/// Which of the three payment paths a submission travels
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaymentMethod {
    /// Redirect to the provider-hosted checkout page
    HostedCheckout,

    /// Browser wallet via the payment-request button
    PaymentRequest,

    /// Legacy hosted overlay popped over the page
    LegacyOverlay,
}

impl PaymentMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::HostedCheckout => "hosted-checkout",
            PaymentMethod::PaymentRequest => "payment-request",
            PaymentMethod::LegacyOverlay => "legacy-overlay",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// `type` discriminator on the charge contract
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargeKind {
    /// Token minted by the hosted overlay
    #[serde(rename = "checkout")]
    Checkout,

    /// Token minted by the wallet payment sheet
    #[serde(rename = "paymentRequest")]
    PaymentRequest,
}

/// Single-use payment token handed over by a wallet sheet or the overlay
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymentToken {
    /// Provider token id
    pub id: String,

    /// Payer email, when the sheet collected one
    pub email: Option<String>,

    /// Payer name, when the sheet collected one
    pub name: Option<String>,
}

impl PaymentToken {
    /// A bare token with no payer details
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
            name: None,
        }
    }
}

/// Body of `POST /checkout`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CheckoutPayload {
    /// Donation amount in cents
    pub amount: AmountCents,

    /// Donation frequency, omitted when the page hard-codes one-time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<DonationFrequency>,

    /// Page-supplied metadata, forwarded opaquely
    pub metadata: serde_json::Value,
}

/// Body of `POST /charge`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChargePayload {
    /// Donation amount in cents
    pub amount: AmountCents,

    /// Single-use payment token id
    pub token: String,

    /// Which tokenized path minted the token
    #[serde(rename = "type")]
    pub kind: ChargeKind,

    /// Payer email from the wallet sheet, when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Payer name from the wallet sheet, when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Page-supplied metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// Opaque checkout session returned by `POST /checkout`.
///
/// The widget never looks inside: the whole value is forwarded to the
/// redirect collaborator, whatever fields the server chose to include.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckoutSession(serde_json::Value);

impl CheckoutSession {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn into_inner(self) -> serde_json::Value {
        self.0
    }
}

/// Terminal server acknowledgment of a completed charge
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationResult {
    /// Transaction id, shown on the receipt
    pub id: String,

    /// Charged amount in cents
    pub amount: AmountCents,

    /// Receipt email address
    pub email: String,

    /// Whether the server already sent the receipt email
    #[serde(default)]
    pub email_sent: bool,
}

/// Everything one submission attempt carries.
///
/// Assembled fresh at submission time from the state snapshot; never
/// cached across attempts.
#[derive(Clone, Debug)]
pub struct DonationRequest {
    /// Validated amount at the moment the attempt began
    pub amount: AmountCents,

    /// Frequency at the moment the attempt began
    pub frequency: DonationFrequency,

    /// Page-supplied metadata
    pub metadata: serde_json::Value,

    /// Which path is carrying the attempt
    pub method: PaymentMethod,

    /// Payment token for the tokenized paths, `None` for hosted checkout
    pub token: Option<PaymentToken>,
}

impl DonationRequest {
    /// The catalog line item this attempt corresponds to
    pub fn item(&self) -> DonationItem {
        DonationItem::new(self.frequency, self.amount)
    }
}
