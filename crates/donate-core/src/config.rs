//! Widget Configuration
//!
//! Page-level knobs for the donation widget. The WASM frontend fills this
//! from page globals; tests construct it directly.

use serde::{Deserialize, Serialize};

use crate::amount::AmountCents;

/// Fallback amount when the field is empty or invalid at load: 50 cents.
pub const DEFAULT_AMOUNT: AmountCents = AmountCents::new(50);

/// Donation widget configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WidgetConfig {
    /// Amount assumed when the input carries nothing parseable at load
    pub default_amount: AmountCents,

    /// Endpoint for creating hosted-checkout sessions
    pub checkout_path: String,

    /// Endpoint for charging tokenized payments
    pub charge_path: String,

    /// Prefix for per-transaction receipt links
    pub receipt_path: String,

    /// Page-supplied metadata forwarded on every payload
    pub metadata: serde_json::Value,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            default_amount: DEFAULT_AMOUNT,
            checkout_path: "/checkout".into(),
            charge_path: "/charge".into(),
            receipt_path: "/receipt".into(),
            metadata: serde_json::Value::Object(serde_json::Map::new()),
        }
    }
}

impl WidgetConfig {
    /// Replace the page metadata blob
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// Receipt link for a finished transaction
    pub fn receipt_link(&self, transaction_id: &str) -> String {
        format!("{}/{}", self.receipt_path.trim_end_matches('/'), transaction_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WidgetConfig::default();
        assert_eq!(config.default_amount, AmountCents::new(50));
        assert_eq!(config.checkout_path, "/checkout");
        assert_eq!(config.charge_path, "/charge");
    }

    #[test]
    fn test_receipt_link_joins_cleanly() {
        let config = WidgetConfig::default();
        assert_eq!(config.receipt_link("tx1"), "/receipt/tx1");

        let config = WidgetConfig {
            receipt_path: "/receipt/".into(),
            ..WidgetConfig::default()
        };
        assert_eq!(config.receipt_link("tx1"), "/receipt/tx1");
    }
}
