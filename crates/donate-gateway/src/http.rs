//! HTTP Donation Gateway
//!
//! Implementation of `DonationApi` against the page server's `/checkout`
//! and `/charge` endpoints. Same code runs natively and in the browser;
//! the WASM frontend passes the page origin as the base URL.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use donate_core::WidgetConfig;
use donate_core::error::{DonateError, Result};
use donate_core::provider::DonationApi;
use donate_core::types::{ChargePayload, CheckoutPayload, CheckoutSession, DonationResult};

/// Gateway configuration
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    /// Origin the endpoints live on, no trailing slash required
    pub base_url: String,

    /// Checkout session endpoint
    pub checkout_path: String,

    /// Charge endpoint
    pub charge_path: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".into(),
            checkout_path: "/checkout".into(),
            charge_path: "/charge".into(),
        }
    }
}

impl GatewayConfig {
    /// Take the endpoint paths from the widget configuration
    pub fn from_widget(config: &WidgetConfig) -> Self {
        Self {
            checkout_path: config.checkout_path.clone(),
            charge_path: config.charge_path.clone(),
            ..Self::default()
        }
    }

    /// Replace the base URL (the page origin, in the browser)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Absolute checkout endpoint URL
    pub fn checkout_url(&self) -> String {
        self.join(&self.checkout_path)
    }

    /// Absolute charge endpoint URL
    pub fn charge_url(&self) -> String {
        self.join(&self.charge_path)
    }

    fn join(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// `DonationApi` over HTTP
pub struct HttpGateway {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl Default for HttpGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpGateway {
    /// Create with default localhost settings
    pub fn new() -> Self {
        Self::from_config(GatewayConfig::default())
    }

    /// Create from configuration
    pub fn from_config(config: GatewayConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Create against the widget's endpoint paths on the given origin
    pub fn for_origin(origin: impl Into<String>, config: &WidgetConfig) -> Self {
        Self::from_config(GatewayConfig::from_widget(config).with_base_url(origin))
    }

    async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        tracing::debug!(%url, "posting donation request");
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| DonateError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%url, status = status.as_u16(), "donation endpoint refused");
            return Err(DonateError::Api {
                status: status.as_u16(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| DonateError::MalformedResponse(e.to_string()))
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl DonationApi for HttpGateway {
    async fn create_checkout(&self, payload: &CheckoutPayload) -> Result<CheckoutSession> {
        self.post_json(&self.config.checkout_url(), payload).await
    }

    async fn charge(&self, payload: &ChargePayload) -> Result<DonationResult> {
        self.post_json(&self.config.charge_url(), payload).await
    }
}
