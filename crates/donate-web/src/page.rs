//! Page Context
//!
//! Reads the donation globals the host page defines on `window` and adapts
//! the browser location and history for the check-instructions modal.

use leptos::prelude::*;
use wasm_bindgen::JsValue;
use web_sys::js_sys::Reflect;

use donate_core::modal::ModalHost;

/// Donation globals the host page defines on `window`
#[derive(Clone, Debug)]
pub struct PageContext {
    /// Stripe publishable key, from `window.STRIPE_PK`
    pub publishable_key: String,

    /// Page origin, for same-origin endpoint calls
    pub origin: String,

    /// Metadata blob forwarded on every payload, from `window.DONATE_METADATA`
    pub metadata: serde_json::Value,

    /// Server-rendered amount field value, from `window.DONATE_AMOUNT`
    pub initial_amount: Option<String>,
}

impl PageContext {
    /// Read the page globals; `None` without a window or a publishable key
    pub fn from_window() -> Option<Self> {
        let window = web_sys::window()?;
        let publishable_key = global_string(&window, "STRIPE_PK")?;
        let origin = window.location().origin().ok()?;
        let metadata = Reflect::get(window.as_ref(), &JsValue::from_str("DONATE_METADATA"))
            .ok()
            .filter(|value| !value.is_undefined() && !value.is_null())
            .and_then(|value| serde_wasm_bindgen::from_value(value).ok())
            .unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new()));
        let initial_amount = global_string(&window, "DONATE_AMOUNT");
        Some(Self {
            publishable_key,
            origin,
            metadata,
            initial_amount,
        })
    }
}

fn global_string(window: &web_sys::Window, name: &str) -> Option<String> {
    Reflect::get(window.as_ref(), &JsValue::from_str(name))
        .ok()
        .and_then(|value| value.as_string())
}

/// Browser modal host: dialog visibility in a signal, open state mirrored
/// into the URL fragment.
///
/// No JS handle is stored; `window` is fetched on demand so the host
/// stays `Send`.
#[derive(Clone, Copy)]
pub struct BrowserModalHost {
    open: RwSignal<bool>,
}

impl BrowserModalHost {
    pub fn new(open: RwSignal<bool>) -> Self {
        Self { open }
    }
}

impl ModalHost for BrowserModalHost {
    fn set_open(&self, open: bool) {
        self.open.set(open);
    }

    fn fragment(&self) -> String {
        web_sys::window()
            .and_then(|window| window.location().hash().ok())
            .unwrap_or_default()
    }

    fn set_fragment(&self, fragment: &str) {
        if let Some(window) = web_sys::window() {
            let _ = window.location().set_hash(fragment);
        }
    }

    fn supports_replace(&self) -> bool {
        web_sys::window()
            .map(|window| window.history().is_ok())
            .unwrap_or(false)
    }

    fn replace_url_without_fragment(&self) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let location = window.location();
        let (Ok(pathname), Ok(search)) = (location.pathname(), location.search()) else {
            return;
        };
        if let Ok(history) = window.history() {
            let _ = history.replace_state_with_url(
                &JsValue::NULL,
                "",
                Some(&format!("{pathname}{search}")),
            );
        }
    }
}
