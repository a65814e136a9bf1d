//! Error Types

use thiserror::Error;

/// Result type alias for donation operations
pub type Result<T> = std::result::Result<T, DonateError>;

/// Failure message for server, transport, and response-shape errors.
/// Must state that no charge happened.
pub const GENERIC_FAILURE: &str = "Donation failed, you have not been charged.";

/// Donation widget error types
#[derive(Error, Debug)]
pub enum DonateError {
    /// Server answered with a non-success HTTP status
    #[error("Server responded with status {status}")]
    Api { status: u16 },

    /// Network or transport failure before a response arrived
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response body did not match the expected shape
    #[error("Malformed server response: {0}")]
    MalformedResponse(String),

    /// Checkout redirect collaborator rejected with a user-actionable message
    #[error("{0}")]
    Redirect(String),

    /// Wallet capability probe failed
    #[error("Wallet probe error: {0}")]
    WalletProbe(String),

    /// Submission attempted from a state that does not permit one
    #[error("Submission refused: {0}")]
    SubmissionRefused(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl DonateError {
    /// Convert to the message shown to the donor.
    ///
    /// Redirect rejections carry a provider-authored, user-actionable
    /// message and surface verbatim. Everything else collapses to the
    /// generic "not charged" line; statuses and sources stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            DonateError::Redirect(msg) => msg.clone(),
            _ => GENERIC_FAILURE.into(),
        }
    }
}

impl From<anyhow::Error> for DonateError {
    fn from(err: anyhow::Error) -> Self {
        DonateError::Other(err.to_string())
    }
}
