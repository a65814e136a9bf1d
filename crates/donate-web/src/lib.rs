//! Donation Widget Frontend
//!
//! Leptos-based WASM frontend embedding the donation flow on a page.

mod app;
mod components;
mod page;
mod stripe;
mod view;

pub use app::{App, DonateWidget};

use wasm_bindgen::prelude::*;

/// WASM entry point
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    leptos::mount::mount_to_body(App);
}
