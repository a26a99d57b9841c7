//! Conversation state owned by one widget instance.

use serde::{Deserialize, Serialize};

use super::message::{Message, Transcript};
use super::prompts;
use super::step::{MenuOption, WizardStep};

/// Contact details collected field-by-field by the wizard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl ContactDraft {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Store `value` in the field the given step collects.
    pub fn record(&mut self, step: WizardStep, value: &str) {
        match step {
            WizardStep::CollectingName => self.name = value.to_string(),
            WizardStep::CollectingEmail => self.email = value.to_string(),
            WizardStep::CollectingPhone => self.phone = value.to_string(),
            WizardStep::None | WizardStep::CollectingUrl => {}
        }
    }
}

/// Flags that live as long as the widget instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionFlags {
    pub has_completed_contact_form: bool,
}

/// Change notifications broadcast to observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetEvent {
    TranscriptChanged,
    StepChanged(WizardStep),
    InputChanged(String),
    /// Recording started (`true`) or stopped (`false`).
    RecordingChanged(bool),
    /// Any outstanding-call indicator flipped.
    BusyChanged,
    PanelToggled(bool),
    Navigating(String),
}

/// A serialisable projection of the controller, for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationView {
    pub open: bool,
    pub messages: Vec<Message>,
    pub step: WizardStep,
    pub input: String,
    /// A chat, form or lead call is outstanding.
    pub busy: bool,
    pub recording: bool,
    /// A transcription call is outstanding.
    pub transcribing: bool,
    pub flags: SessionFlags,
}

impl ConversationView {
    /// Whether the input and send controls should accept user actions.
    pub fn accepts_input(&self) -> bool {
        !self.busy && !self.transcribing
    }
}

/// Mutable controller state. Guarded by the controller's lock.
#[derive(Debug)]
pub(crate) struct ConversationState {
    pub open: bool,
    pub transcript: Transcript,
    pub step: WizardStep,
    pub draft: ContactDraft,
    pub flags: SessionFlags,
    /// Menu option that started the current contact form.
    pub wizard_origin: Option<MenuOption>,
    pub input: String,
    pub busy: bool,
    pub transcribing: bool,
    pub disposed: bool,
}

impl ConversationState {
    pub fn new() -> Self {
        let mut transcript = Transcript::new();
        transcript.push(
            Message::bot(prompts::GREETING)
                .with_options(MenuOption::GREETING_MENU.iter().map(|o| o.label().to_string())),
        );
        Self {
            open: false,
            transcript,
            step: WizardStep::None,
            draft: ContactDraft::default(),
            flags: SessionFlags::default(),
            wizard_origin: None,
            input: String::new(),
            busy: false,
            transcribing: false,
            disposed: false,
        }
    }

    /// Whether a new user action may start now.
    pub fn accepts_actions(&self) -> bool {
        !self.disposed && !self.busy && !self.transcribing
    }

    pub fn view(&self, recording: bool) -> ConversationView {
        ConversationView {
            open: self.open,
            messages: self.transcript.messages().to_vec(),
            step: self.step,
            input: self.input.clone(),
            busy: self.busy,
            recording,
            transcribing: self.transcribing,
            flags: self.flags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_greets_with_menu() {
        let state = ConversationState::new();
        assert_eq!(state.transcript.len(), 1);
        let greeting = &state.transcript.messages()[0];
        assert_eq!(greeting.body, prompts::GREETING);
        assert_eq!(
            greeting.options,
            vec![
                "Book A Demo",
                "Services",
                "Generate Leads",
                "Leads",
                "Ask a Question",
                "Pricing"
            ]
        );
        assert_eq!(state.step, WizardStep::None);
        assert!(state.accepts_actions());
    }

    #[test]
    fn draft_records_by_step() {
        let mut draft = ContactDraft::default();
        draft.record(WizardStep::CollectingName, "Ada");
        draft.record(WizardStep::CollectingEmail, "ada@example.com");
        draft.record(WizardStep::CollectingPhone, "555-0100");
        draft.record(WizardStep::CollectingUrl, "https://ignored.example");
        assert_eq!(
            draft,
            ContactDraft {
                name: "Ada".into(),
                email: "ada@example.com".into(),
                phone: "555-0100".into(),
            }
        );
        draft.clear();
        assert_eq!(draft, ContactDraft::default());
    }

    #[test]
    fn busy_state_rejects_actions() {
        let mut state = ConversationState::new();
        state.busy = true;
        assert!(!state.accepts_actions());
        assert!(!state.view(false).accepts_input());
        state.busy = false;
        state.transcribing = true;
        assert!(!state.accepts_actions());
        state.transcribing = false;
        state.disposed = true;
        assert!(!state.accepts_actions());
    }
}
