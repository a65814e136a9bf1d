//! Donation Form State
//!
//! The tagged-state value object at the center of the widget and its single
//! mutation entry point, [`FormState::apply`]. Every transition returns the
//! side effects the caller must carry out; the state itself never touches
//! a view, the network, or a payment SDK, so the whole lifecycle is
//! testable as plain value manipulation.
//!
//! Phases:
//!
//! ```text
//!            edit(valid)                 submit
//!   idle  <------------->  invalid        |
//!    ^  \                                 v
//!    |   `--------------------------> submitting ----> succeeded (terminal)
//!    |        edit(invalid)  ^            |
//!    |                       |            v
//!    `-- edit(valid kept) -- failed <-----'
//! ```

use serde::{Deserialize, Serialize};

use crate::amount::AmountCents;
use crate::types::{DonationFrequency, DonationResult};

/// Lifecycle phase of the donation form
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// A validated amount is held and nothing is in flight
    Idle,

    /// The field content does not parse; submission is impossible
    Invalid,

    /// A submission is in flight; controls are disabled
    Submitting,

    /// The donation completed; terminal for the page's lifetime
    Succeeded,

    /// The last submission failed; the form is editable again
    Failed,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Invalid => "invalid",
            Phase::Submitting => "submitting",
            Phase::Succeeded => "succeeded",
            Phase::Failed => "failed",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Input to the state machine
#[derive(Clone, Debug)]
pub enum FormEvent {
    /// The amount field text changed
    AmountEdited(String),

    /// The frequency selection changed
    FrequencyChanged(DonationFrequency),

    /// A submission trigger fired
    SubmitRequested,

    /// The in-flight submission was acknowledged by the server
    SubmissionSucceeded(DonationResult),

    /// The in-flight submission failed with a user-facing message
    SubmissionFailed { message: String },
}

/// Side effect the caller must carry out after a transition
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    SetAmountEnabled(bool),
    SetSubmitEnabled(bool),
    SetInvalid(bool),
    ShowError(String),
    ClearError,
    SetProcessing(bool),

    /// Push the new validated amount to the wallet sheet
    SyncWalletTotal(AmountCents),

    /// Swap the form for the receipt
    RenderReceipt(DonationResult),
}

/// The donation form's complete state
///
/// Invariant: outside of `Submitting`, `amount` is `Some` exactly when the
/// current text validates, and `phase == Invalid` exactly when `amount` is
/// `None`. While a submission is in flight, edits only accumulate in `raw`
/// and `amount` keeps the submitted value; the two reconcile when the
/// attempt settles. Created once at widget initialization, mutated only
/// through [`FormState::apply`], never persisted.
#[derive(Clone, Debug)]
pub struct FormState {
    raw: String,
    amount: Option<AmountCents>,
    frequency: DonationFrequency,
    phase: Phase,
    error: Option<String>,
}

impl FormState {
    /// Initialize from whatever text the page put in the amount field.
    ///
    /// Unparseable or empty initial text falls back to the default amount;
    /// the form always starts `Idle` with an effective amount.
    pub fn new(initial_text: &str, default_amount: AmountCents) -> Self {
        Self {
            raw: initial_text.to_owned(),
            amount: Some(AmountCents::parse(initial_text).unwrap_or(default_amount)),
            frequency: DonationFrequency::default(),
            phase: Phase::Idle,
            error: None,
        }
    }

    /// Current field text
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Validated amount, `None` while the text does not parse
    pub fn amount(&self) -> Option<AmountCents> {
        self.amount
    }

    pub fn frequency(&self) -> DonationFrequency {
        self.frequency
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Error message from the last failed attempt, until the next submission
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether a submission may begin right now
    pub fn can_submit(&self) -> bool {
        matches!(self.phase, Phase::Idle | Phase::Failed) && self.amount.is_some()
    }

    /// Apply one event and return the effects it produced.
    ///
    /// This is the only mutation entry point. Events that are not legal in
    /// the current phase are ignored and produce no effects.
    pub fn apply(&mut self, event: FormEvent) -> Vec<Effect> {
        match event {
            FormEvent::AmountEdited(text) => self.amount_edited(text),
            FormEvent::FrequencyChanged(frequency) => self.frequency_changed(frequency),
            FormEvent::SubmitRequested => self.submit_requested(),
            FormEvent::SubmissionSucceeded(result) => self.submission_succeeded(result),
            FormEvent::SubmissionFailed { message } => self.submission_failed(message),
        }
    }

    fn amount_edited(&mut self, text: String) -> Vec<Effect> {
        match self.phase {
            // Terminal: the receipt is up, input no longer exists.
            Phase::Succeeded => return Vec::new(),
            // Controls are disabled; keep the text, validation happens
            // when the in-flight attempt settles.
            Phase::Submitting => {
                self.raw = text;
                return Vec::new();
            }
            Phase::Idle | Phase::Invalid | Phase::Failed => {}
        }

        let parsed = AmountCents::parse(&text);
        self.raw = text;
        if parsed == self.amount {
            // Same value the model already holds: no re-render, no wallet
            // sync. Keystrokes like "20" -> "20.00" land here.
            return Vec::new();
        }

        match parsed {
            None => {
                self.amount = None;
                self.phase = Phase::Invalid;
                vec![Effect::SetInvalid(true), Effect::SetSubmitEnabled(false)]
            }
            Some(value) => {
                self.amount = Some(value);
                // A previous failure stays visible until a new submission;
                // only the invalid marker reacts to edits.
                if self.phase != Phase::Failed {
                    self.phase = Phase::Idle;
                }
                vec![
                    Effect::SetInvalid(false),
                    Effect::SetSubmitEnabled(true),
                    Effect::SyncWalletTotal(value),
                ]
            }
        }
    }

    fn frequency_changed(&mut self, frequency: DonationFrequency) -> Vec<Effect> {
        if self.phase != Phase::Succeeded {
            self.frequency = frequency;
        }
        Vec::new()
    }

    fn submit_requested(&mut self) -> Vec<Effect> {
        if !self.can_submit() {
            return Vec::new();
        }
        // Everything here is synchronous: by the time any network work
        // starts, the controls are already locked and the old error gone.
        self.phase = Phase::Submitting;
        self.error = None;
        vec![
            Effect::SetAmountEnabled(false),
            Effect::SetSubmitEnabled(false),
            Effect::ClearError,
            Effect::SetProcessing(true),
        ]
    }

    fn submission_succeeded(&mut self, result: DonationResult) -> Vec<Effect> {
        if self.phase != Phase::Submitting {
            return Vec::new();
        }
        // Controls stay disabled forever; the receipt replaces the form.
        self.phase = Phase::Succeeded;
        vec![Effect::SetProcessing(false), Effect::RenderReceipt(result)]
    }

    fn submission_failed(&mut self, message: String) -> Vec<Effect> {
        if self.phase != Phase::Submitting {
            return Vec::new();
        }
        let mut effects = vec![
            Effect::SetProcessing(false),
            Effect::ShowError(message.clone()),
            Effect::SetAmountEnabled(true),
        ];
        self.error = Some(message);

        // Re-validate the text as it is now, not as it was at submit time.
        self.amount = AmountCents::parse(&self.raw);
        if self.amount.is_some() {
            self.phase = Phase::Failed;
            effects.push(Effect::SetSubmitEnabled(true));
        } else {
            self.phase = Phase::Invalid;
            effects.push(Effect::SetInvalid(true));
        }
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT: AmountCents = AmountCents::new(50);

    fn result_tx1() -> DonationResult {
        DonationResult {
            id: "tx1".into(),
            amount: AmountCents::new(2000),
            email: "a@b.com".into(),
            email_sent: true,
        }
    }

    fn edited(state: &mut FormState, text: &str) -> Vec<Effect> {
        state.apply(FormEvent::AmountEdited(text.into()))
    }

    #[test]
    fn test_empty_field_initializes_to_default() {
        let state = FormState::new("", DEFAULT);
        assert_eq!(state.amount(), Some(DEFAULT));
        assert_eq!(state.phase(), Phase::Idle);
        assert_eq!(state.raw(), "");
    }

    #[test]
    fn test_prefilled_field_initializes_from_text() {
        let state = FormState::new("$25", DEFAULT);
        assert_eq!(state.amount(), Some(AmountCents::new(2500)));
        assert_eq!(state.phase(), Phase::Idle);
    }

    #[test]
    fn test_garbage_prefill_falls_back_to_default() {
        let state = FormState::new("soon", DEFAULT);
        assert_eq!(state.amount(), Some(DEFAULT));
        assert_eq!(state.phase(), Phase::Idle);
    }

    #[test]
    fn test_valid_edit_updates_amount_and_syncs_wallet() {
        let mut state = FormState::new("", DEFAULT);
        let effects = edited(&mut state, "12");
        assert_eq!(state.amount(), Some(AmountCents::new(1200)));
        assert_eq!(state.phase(), Phase::Idle);
        assert_eq!(
            effects,
            vec![
                Effect::SetInvalid(false),
                Effect::SetSubmitEnabled(true),
                Effect::SyncWalletTotal(AmountCents::new(1200)),
            ]
        );
    }

    #[test]
    fn test_equal_value_edit_is_inert() {
        let mut state = FormState::new("", DEFAULT);
        edited(&mut state, "20.00");
        // Different text, same cents: nothing may happen.
        let effects = edited(&mut state, "  20  ");
        assert!(effects.is_empty());
        assert_eq!(state.raw(), "  20  ");
        assert_eq!(state.amount(), Some(AmountCents::new(2000)));
    }

    #[test]
    fn test_repeated_invalid_edits_are_inert_after_first() {
        let mut state = FormState::new("", DEFAULT);
        let first = edited(&mut state, "abc");
        assert_eq!(
            first,
            vec![Effect::SetInvalid(true), Effect::SetSubmitEnabled(false)]
        );
        assert_eq!(state.phase(), Phase::Invalid);
        let second = edited(&mut state, "abcd");
        assert!(second.is_empty());
        assert_eq!(state.phase(), Phase::Invalid);
    }

    #[test]
    fn test_zero_is_invalid() {
        let mut state = FormState::new("", DEFAULT);
        edited(&mut state, "0");
        assert_eq!(state.phase(), Phase::Invalid);
        assert_eq!(state.amount(), None);
        assert!(!state.can_submit());
    }

    #[test]
    fn test_submit_refused_while_invalid() {
        let mut state = FormState::new("", DEFAULT);
        edited(&mut state, "nope");
        let effects = state.apply(FormEvent::SubmitRequested);
        assert!(effects.is_empty());
        assert_eq!(state.phase(), Phase::Invalid);
    }

    #[test]
    fn test_submit_entry_is_synchronous_and_complete() {
        let mut state = FormState::new("", DEFAULT);
        edited(&mut state, "20.00");
        let effects = state.apply(FormEvent::SubmitRequested);
        assert_eq!(state.phase(), Phase::Submitting);
        assert_eq!(
            effects,
            vec![
                Effect::SetAmountEnabled(false),
                Effect::SetSubmitEnabled(false),
                Effect::ClearError,
                Effect::SetProcessing(true),
            ]
        );
    }

    #[test]
    fn test_second_submit_while_in_flight_is_refused() {
        let mut state = FormState::new("", DEFAULT);
        edited(&mut state, "20.00");
        state.apply(FormEvent::SubmitRequested);
        let effects = state.apply(FormEvent::SubmitRequested);
        assert!(effects.is_empty());
        assert_eq!(state.phase(), Phase::Submitting);
    }

    #[test]
    fn test_success_renders_receipt_and_keeps_controls_disabled() {
        let mut state = FormState::new("", DEFAULT);
        edited(&mut state, "20.00");
        state.apply(FormEvent::SubmitRequested);
        let effects = state.apply(FormEvent::SubmissionSucceeded(result_tx1()));
        assert_eq!(state.phase(), Phase::Succeeded);
        assert_eq!(
            effects,
            vec![
                Effect::SetProcessing(false),
                Effect::RenderReceipt(result_tx1()),
            ]
        );
        // No re-enable effect may ever appear after this point.
        assert!(edited(&mut state, "999").is_empty());
        assert!(state.apply(FormEvent::SubmitRequested).is_empty());
        assert_eq!(state.phase(), Phase::Succeeded);
    }

    #[test]
    fn test_success_ignores_later_frequency_changes() {
        let mut state = FormState::new("", DEFAULT);
        edited(&mut state, "5");
        state.apply(FormEvent::SubmitRequested);
        state.apply(FormEvent::SubmissionSucceeded(result_tx1()));
        state.apply(FormEvent::FrequencyChanged(DonationFrequency::Monthly));
        assert_eq!(state.frequency(), DonationFrequency::Once);
    }

    #[test]
    fn test_failure_reenables_and_keeps_amount() {
        let mut state = FormState::new("", DEFAULT);
        edited(&mut state, "20.00");
        state.apply(FormEvent::SubmitRequested);
        let effects = state.apply(FormEvent::SubmissionFailed {
            message: "Donation failed, you have not been charged.".into(),
        });
        assert_eq!(state.phase(), Phase::Failed);
        assert_eq!(state.amount(), Some(AmountCents::new(2000)));
        assert_eq!(state.error(), Some("Donation failed, you have not been charged."));
        assert_eq!(
            effects,
            vec![
                Effect::SetProcessing(false),
                Effect::ShowError("Donation failed, you have not been charged.".into()),
                Effect::SetAmountEnabled(true),
                Effect::SetSubmitEnabled(true),
            ]
        );
    }

    #[test]
    fn test_edit_while_submitting_only_accumulates_text() {
        let mut state = FormState::new("", DEFAULT);
        edited(&mut state, "20.00");
        state.apply(FormEvent::SubmitRequested);

        // The held amount stays at the submitted value; only `raw` moves.
        assert!(edited(&mut state, "35").is_empty());
        assert_eq!(state.raw(), "35");
        assert_eq!(state.amount(), Some(AmountCents::new(2000)));
        assert_eq!(state.phase(), Phase::Submitting);
    }

    #[test]
    fn test_failure_revalidates_text_edited_mid_flight() {
        let mut state = FormState::new("", DEFAULT);
        edited(&mut state, "20.00");
        state.apply(FormEvent::SubmitRequested);
        // Text mutates while in flight; no validation side effects yet.
        assert!(edited(&mut state, "garbage").is_empty());
        let effects = state.apply(FormEvent::SubmissionFailed {
            message: "declined".into(),
        });
        assert_eq!(state.phase(), Phase::Invalid);
        assert_eq!(state.amount(), None);
        // Amount input comes back so the donor can fix it, but submission
        // stays locked until the text validates again.
        assert!(effects.contains(&Effect::SetAmountEnabled(true)));
        assert!(effects.contains(&Effect::SetInvalid(true)));
        assert!(!effects.contains(&Effect::SetSubmitEnabled(true)));
    }

    #[test]
    fn test_failed_phase_survives_valid_edits() {
        let mut state = FormState::new("", DEFAULT);
        edited(&mut state, "20.00");
        state.apply(FormEvent::SubmitRequested);
        state.apply(FormEvent::SubmissionFailed { message: "declined".into() });
        let effects = edited(&mut state, "25");
        assert_eq!(state.phase(), Phase::Failed);
        assert_eq!(state.error(), Some("declined"));
        assert!(effects.contains(&Effect::SyncWalletTotal(AmountCents::new(2500))));
        assert!(state.can_submit());
    }

    #[test]
    fn test_failed_phase_leaves_on_invalid_edit() {
        let mut state = FormState::new("", DEFAULT);
        edited(&mut state, "20.00");
        state.apply(FormEvent::SubmitRequested);
        state.apply(FormEvent::SubmissionFailed { message: "declined".into() });
        edited(&mut state, "x");
        assert_eq!(state.phase(), Phase::Invalid);
        // The old failure message stays visible; edits never clear it.
        assert_eq!(state.error(), Some("declined"));
    }

    #[test]
    fn test_error_clears_at_next_submission_entry() {
        let mut state = FormState::new("", DEFAULT);
        edited(&mut state, "20.00");
        state.apply(FormEvent::SubmitRequested);
        state.apply(FormEvent::SubmissionFailed { message: "declined".into() });
        let effects = state.apply(FormEvent::SubmitRequested);
        assert_eq!(state.error(), None);
        assert!(effects.contains(&Effect::ClearError));
    }

    #[test]
    fn test_settlements_outside_submitting_are_ignored() {
        let mut state = FormState::new("", DEFAULT);
        assert!(state.apply(FormEvent::SubmissionSucceeded(result_tx1())).is_empty());
        assert!(state
            .apply(FormEvent::SubmissionFailed { message: "late".into() })
            .is_empty());
        assert_eq!(state.phase(), Phase::Idle);
    }

    #[test]
    fn test_acceptance_walkthrough() {
        // Load with an empty field.
        let mut state = FormState::new("", DEFAULT);
        assert_eq!(state.amount(), Some(AmountCents::new(50)));
        assert_eq!(state.phase(), Phase::Idle);

        // "12" -> 1200, still idle.
        edited(&mut state, "12");
        assert_eq!(state.amount(), Some(AmountCents::new(1200)));
        assert_eq!(state.phase(), Phase::Idle);

        // "0" -> invalid, submit disabled.
        let effects = edited(&mut state, "0");
        assert_eq!(state.phase(), Phase::Invalid);
        assert!(effects.contains(&Effect::SetSubmitEnabled(false)));

        // "20.00" -> 2000, idle, submit enabled.
        let effects = edited(&mut state, "20.00");
        assert_eq!(state.amount(), Some(AmountCents::new(2000)));
        assert_eq!(state.phase(), Phase::Idle);
        assert!(effects.contains(&Effect::SetSubmitEnabled(true)));

        // Submit: both controls lock before anything async could run.
        let effects = state.apply(FormEvent::SubmitRequested);
        assert_eq!(state.phase(), Phase::Submitting);
        assert!(effects.contains(&Effect::SetAmountEnabled(false)));
        assert!(effects.contains(&Effect::SetSubmitEnabled(false)));

        // The charge resolves; the receipt shows, controls stay locked.
        let effects = state.apply(FormEvent::SubmissionSucceeded(result_tx1()));
        assert_eq!(state.phase(), Phase::Succeeded);
        assert!(effects.contains(&Effect::RenderReceipt(result_tx1())));
        assert!(!effects.contains(&Effect::SetAmountEnabled(true)));
        assert!(!effects.contains(&Effect::SetSubmitEnabled(true)));
    }
}
