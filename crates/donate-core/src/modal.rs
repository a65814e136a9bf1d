//! Check Instructions Modal
//!
//! Peripheral dialog telling donors how to give by check. Independent of
//! the donation flow: it has no phases, only open/closed, and its open
//! state is mirrored into the URL fragment so a direct link lands with the
//! dialog already up.

use std::sync::Arc;

/// Fragment that marks the modal open
pub const CHECK_FRAGMENT: &str = "#give-by-check";

/// What the modal needs from the page it lives on
pub trait ModalHost: Send + Sync {
    /// Show or hide the dialog
    fn set_open(&self, open: bool);

    /// Current location fragment including the leading `#`, empty when none
    fn fragment(&self) -> String;

    /// Navigate the location fragment
    fn set_fragment(&self, fragment: &str);

    /// Whether the host can rewrite the URL without adding a history entry
    fn supports_replace(&self) -> bool;

    /// Rewrite the current URL with its fragment stripped
    fn replace_url_without_fragment(&self);
}

/// The give-by-check dialog
///
/// Every close trigger (close control, backdrop click, Escape) funnels
/// into [`CheckModal::close`]; the adapter decides which DOM events count.
pub struct CheckModal {
    host: Arc<dyn ModalHost>,
}

impl CheckModal {
    pub fn new(host: Arc<dyn ModalHost>) -> Self {
        Self { host }
    }

    /// Open the dialog and put the fragment in the URL
    pub fn open(&self) {
        self.host.set_open(true);
        self.host.set_fragment(CHECK_FRAGMENT);
        tracing::debug!("check modal opened");
    }

    /// Close the dialog and take the fragment back out of the URL.
    ///
    /// Prefers the history-neutral rewrite; hosts without one fall back to
    /// clearing the hash, which leaves a dangling `#` behind.
    pub fn close(&self) {
        self.host.set_open(false);
        if self.host.supports_replace() {
            self.host.replace_url_without_fragment();
        } else {
            self.host.set_fragment("");
        }
    }

    /// Open the dialog when the page loaded with the fragment already set
    pub fn sync_from_location(&self) {
        if self.host.fragment() == CHECK_FRAGMENT {
            self.host.set_open(true);
            tracing::debug!("check modal opened from location fragment");
        }
    }
}
