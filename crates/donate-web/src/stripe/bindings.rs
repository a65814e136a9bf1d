//! Low-level wasm-bindgen bindings to Stripe.js v3 and the legacy
//! Checkout overlay script. The bridge adapters live in the parent module.

use wasm_bindgen::prelude::*;
use web_sys::js_sys::{Function, Promise};

#[wasm_bindgen]
extern "C" {
    /// Stripe.js v3 client handle
    #[wasm_bindgen(js_name = Stripe)]
    #[derive(Debug, Clone)]
    pub type JsStripe;

    /// `Stripe(publishableKey)`; throws when Stripe.js is not on the page
    #[wasm_bindgen(catch, js_name = Stripe, js_namespace = window)]
    pub fn new_stripe(publishable_key: &str) -> Result<JsStripe, JsValue>;

    /// `stripe.redirectToCheckout(options)`; the promise settles only on
    /// failure, on success the browser navigates away first
    #[wasm_bindgen(method, catch, js_name = redirectToCheckout)]
    pub fn redirect_to_checkout(this: &JsStripe, options: JsValue) -> Result<Promise, JsValue>;

    /// `stripe.paymentRequest(options)`
    #[wasm_bindgen(method, catch, js_name = paymentRequest)]
    pub fn payment_request(this: &JsStripe, options: JsValue)
    -> Result<JsPaymentRequest, JsValue>;

    /// `stripe.elements()`
    #[wasm_bindgen(method, catch)]
    pub fn elements(this: &JsStripe) -> Result<JsElements, JsValue>;

    /// Payment request handle
    #[derive(Debug, Clone)]
    pub type JsPaymentRequest;

    /// `paymentRequest.canMakePayment()`; resolves with an object when a
    /// wallet can pay, `null` otherwise
    #[wasm_bindgen(method, catch, js_name = canMakePayment)]
    pub fn can_make_payment(this: &JsPaymentRequest) -> Result<Promise, JsValue>;

    /// `paymentRequest.on(event, handler)`
    #[wasm_bindgen(method)]
    pub fn on(this: &JsPaymentRequest, event: &str, handler: &Function);

    /// `paymentRequest.update(options)`
    #[wasm_bindgen(method)]
    pub fn update(this: &JsPaymentRequest, options: JsValue);

    /// Elements factory handle
    #[derive(Debug, Clone)]
    pub type JsElements;

    /// `elements.create(type, options)`
    #[wasm_bindgen(method, catch)]
    pub fn create(
        this: &JsElements,
        element_type: &str,
        options: JsValue,
    ) -> Result<JsElement, JsValue>;

    /// Mountable element handle
    #[derive(Debug, Clone)]
    pub type JsElement;

    /// `element.mount(selector)`
    #[wasm_bindgen(method, catch)]
    pub fn mount(this: &JsElement, selector: &str) -> Result<(), JsValue>;

    /// Legacy overlay handler from checkout.js
    #[derive(Debug, Clone)]
    pub type JsCheckoutHandler;

    /// `StripeCheckout.configure(options)`; throws when checkout.js is not
    /// on the page
    #[wasm_bindgen(catch, js_namespace = StripeCheckout, js_name = configure)]
    pub fn checkout_configure(options: JsValue) -> Result<JsCheckoutHandler, JsValue>;

    /// `handler.open(options)`
    #[wasm_bindgen(method, catch)]
    pub fn open(this: &JsCheckoutHandler, options: JsValue) -> Result<(), JsValue>;
}
