//! # donate-gateway
//!
//! HTTP transport for the donation widget.
//!
//! ## Endpoints
//!
//! - **`/checkout`**: Creates a hosted checkout session for redirect
//! - **`/charge`**: Charges a payment token from the wallet or overlay path
//!
//! ## Usage
//!
//! ```rust,ignore
//! use donate_gateway::HttpGateway;
//!
//! let gateway = HttpGateway::for_origin("https://example.org", &config);
//! let flow = DonationFlowBuilder::new()
//!     .api(Arc::new(gateway))
//!     .build()?;
//! ```

pub mod http;

pub use http::{GatewayConfig, HttpGateway};

// Re-export core types for convenience
pub use donate_core::{
    ChargePayload, CheckoutPayload, CheckoutSession, DonateError, DonationApi, DonationResult,
    Result, WidgetConfig,
};
