//! UI Components

use leptos::prelude::*;

/// Give-by-check dialog: backdrop click and the close control both close
#[component]
pub fn CheckInstructions(
    open: RwSignal<bool>,
    on_close: Callback<()>,
    children: ChildrenFn,
) -> impl IntoView {
    view! {
        <Show when=move || open.get()>
            <div class="donate-modal-backdrop" on:click=move |_| on_close.run(())></div>
            <div class="donate-modal" role="dialog" aria-modal="true">
                <button
                    class="donate-modal-close"
                    aria-label="Close"
                    on:click=move |_| on_close.run(())
                >
                    "×"
                </button>
                {children()}
            </div>
        </Show>
    }
}
