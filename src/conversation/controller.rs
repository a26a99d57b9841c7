//! ConversationController: dispatches user actions to the wizard, the
//! backend, and the recorder.

use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, broadcast};
use tracing::{debug, info, warn};

use super::message::Message;
use super::prompts;
use super::schedule::ScheduledTasks;
use super::state::{ContactDraft, ConversationState, ConversationView, WidgetEvent};
use super::step::{FollowUp, MenuOption, WizardStep};
use crate::api::{ChatReply, HttpWidgetApi, LeadsResponse, WidgetApi};
use crate::config::{Appearance, FlowTimings, WidgetConfig};
use crate::error::ConfigError;
use crate::navigate::Navigator;
use crate::recording::{AudioSource, Capture};

/// Event channel capacity.
const EVENT_CAPACITY: usize = 256;

/// Backend work decided under the state lock and run after releasing it.
enum Dispatch {
    Chat(String),
    SubmitForm(ContactDraft),
    GenerateLeads { url: String, from_wizard: bool },
}

struct ActiveCapture {
    capture: Box<dyn Capture>,
    started: Instant,
}

struct Shared {
    api: Arc<dyn WidgetApi>,
    audio: Arc<dyn AudioSource>,
    navigator: Arc<dyn Navigator>,
    timings: FlowTimings,
    appearance: Appearance,
    state: Mutex<ConversationState>,
    /// Lock order: `capture` before `state`, `state` before `tasks`.
    capture: Mutex<Option<ActiveCapture>>,
    tasks: Mutex<ScheduledTasks>,
    events: broadcast::Sender<WidgetEvent>,
}

/// Drives one widget instance.
///
/// Cheap to clone; all clones share the same conversation. Scheduled tasks
/// and any live capture are torn down by [`dispose`](Self::dispose), or when
/// the last clone is dropped.
#[derive(Clone)]
pub struct ConversationController {
    inner: Arc<Shared>,
}

impl ConversationController {
    pub fn new(
        api: Arc<dyn WidgetApi>,
        audio: Arc<dyn AudioSource>,
        navigator: Arc<dyn Navigator>,
        timings: FlowTimings,
    ) -> Self {
        let (events, _rx) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Shared {
                api,
                audio,
                navigator,
                timings,
                appearance: Appearance::default(),
                state: Mutex::new(ConversationState::new()),
                capture: Mutex::new(None),
                tasks: Mutex::new(ScheduledTasks::new()),
                events,
            }),
        }
    }

    /// Controller backed by [`HttpWidgetApi`], configured from `config`.
    pub fn over_http(
        config: &WidgetConfig,
        audio: Arc<dyn AudioSource>,
        navigator: Arc<dyn Navigator>,
    ) -> crate::error::Result<Self> {
        reqwest::Url::parse(&config.api_base_url).map_err(|e| ConfigError::InvalidValue {
            key: "api_base_url".to_string(),
            message: e.to_string(),
        })?;
        let api: Arc<dyn WidgetApi> = Arc::new(HttpWidgetApi::new(config)?);
        let controller = Self::new(api, audio, navigator, config.timings)
            .with_appearance(config.appearance.clone());
        info!(api = %config.api_base_url, "Widget controller ready");
        Ok(controller)
    }

    /// Set presentation parameters. Only meaningful before the controller is
    /// shared.
    pub fn with_appearance(mut self, appearance: Appearance) -> Self {
        if let Some(inner) = Arc::get_mut(&mut self.inner) {
            inner.appearance = appearance;
        } else {
            warn!("Appearance ignored: controller already shared");
        }
        self
    }

    pub fn appearance(&self) -> &Appearance {
        &self.inner.appearance
    }

    /// Receive change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<WidgetEvent> {
        self.inner.events.subscribe()
    }

    fn emit(&self, event: WidgetEvent) {
        // No subscribers is fine.
        let _ = self.inner.events.send(event);
    }

    /// Current state, for rendering.
    pub async fn snapshot(&self) -> ConversationView {
        let recording = self.inner.capture.lock().await.is_some();
        self.inner.state.lock().await.view(recording)
    }

    pub async fn is_open(&self) -> bool {
        self.inner.state.lock().await.open
    }

    /// Show or hide the panel. Returns the new visibility.
    pub async fn toggle_open(&self) -> bool {
        let open = {
            let mut state = self.inner.state.lock().await;
            state.open = !state.open;
            state.open
        };
        self.emit(WidgetEvent::PanelToggled(open));
        open
    }

    /// Replace the free-text input value without submitting it.
    pub async fn set_input(&self, text: &str) {
        self.inner.state.lock().await.input = text.to_string();
        self.emit(WidgetEvent::InputChanged(text.to_string()));
    }

    /// Submit whatever is in the input, as if the user pressed send.
    pub async fn submit_input(&self) -> bool {
        let text = self.inner.state.lock().await.input.clone();
        self.submit_free_text(&text).await
    }

    /// Handle a free-text submission.
    ///
    /// Returns `false` if the submission was rejected: blank text, another
    /// call or transcription still outstanding, a voice note being recorded,
    /// or the controller disposed.
    pub async fn submit_free_text(&self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }

        let dispatch = {
            // Held until the dispatch is decided so recording cannot start
            // alongside the call.
            let capture = self.inner.capture.lock().await;
            let mut state = self.inner.state.lock().await;
            if !state.accepts_actions() || capture.is_some() {
                warn!(
                    busy = state.busy,
                    transcribing = state.transcribing,
                    recording = capture.is_some(),
                    "Submission rejected"
                );
                return false;
            }

            let awaiting_url = state
                .transcript
                .last_settled()
                .is_some_and(|m| m.awaits_freeform_url);

            state.transcript.push(Message::user(text));
            state.input.clear();

            let step = state.step;
            match step {
                WizardStep::CollectingName | WizardStep::CollectingEmail => {
                    state.draft.record(step, text);
                    if let Some(next) = step.next_contact_field() {
                        self.enter_step(&mut state, next);
                        if let Some(prompt) = prompts::step_prompt(next) {
                            state.transcript.push(Message::bot(prompt));
                        }
                    }
                    None
                }
                WizardStep::CollectingPhone => {
                    state.draft.record(WizardStep::CollectingPhone, text);
                    state.busy = true;
                    Some(Dispatch::SubmitForm(state.draft.clone()))
                }
                WizardStep::CollectingUrl => {
                    state.transcript.begin_pending();
                    state.busy = true;
                    Some(Dispatch::GenerateLeads {
                        url: text.to_string(),
                        from_wizard: true,
                    })
                }
                WizardStep::None if awaiting_url => {
                    state.transcript.begin_pending();
                    state.busy = true;
                    Some(Dispatch::GenerateLeads {
                        url: text.to_string(),
                        from_wizard: false,
                    })
                }
                WizardStep::None => {
                    state.transcript.begin_pending();
                    state.busy = true;
                    Some(Dispatch::Chat(text.to_string()))
                }
            }
        };

        self.emit(WidgetEvent::InputChanged(String::new()));
        self.emit(WidgetEvent::TranscriptChanged);

        if let Some(dispatch) = dispatch {
            self.emit(WidgetEvent::BusyChanged);
            match dispatch {
                Dispatch::Chat(message) => self.run_chat(message).await,
                Dispatch::SubmitForm(draft) => self.run_form(draft).await,
                Dispatch::GenerateLeads { url, from_wizard } => {
                    self.run_leads(url, from_wizard).await
                }
            }
            self.emit(WidgetEvent::BusyChanged);
            self.emit(WidgetEvent::TranscriptChanged);
        }
        true
    }

    /// Handle a click on one of the offered option buttons.
    pub async fn select_option(&self, label: &str) -> bool {
        if label.trim().is_empty() {
            return false;
        }
        let option = MenuOption::from_label(label);

        {
            let mut state = self.inner.state.lock().await;
            if !state.accepts_actions() {
                warn!(option = %option, "Option rejected while busy");
                return false;
            }
            state.transcript.push(Message::user(option.label()));

            if option.requires_contact() {
                if state.flags.has_completed_contact_form {
                    debug!(option = %option, "Contact form already completed; skipping wizard");
                    state.transcript.push(Message::bot(prompts::THANK_YOU));
                    self.apply_follow_up(&mut state, option.follow_up()).await;
                } else {
                    state.draft.clear();
                    state.wizard_origin = Some(option.clone());
                    self.enter_step(&mut state, WizardStep::CollectingName);
                    state.transcript.push(Message::bot(prompts::ASK_NAME));
                }
            } else {
                self.schedule_canned_reply(&option).await;
            }
        }

        self.emit(WidgetEvent::TranscriptChanged);
        true
    }

    /// Open the microphone.
    ///
    /// No-op if a capture is already running, a call or transcription is
    /// outstanding, or the controller is disposed.
    pub async fn start_recording(&self) -> bool {
        if !self.can_start_recording().await {
            return false;
        }

        // The device is opened without holding any lock; a permission prompt
        // can take a while.
        match self.inner.audio.open().await {
            Ok(capture) => {
                {
                    let mut slot = self.inner.capture.lock().await;
                    let state = self.inner.state.lock().await;
                    if slot.is_some() || !state.accepts_actions() {
                        debug!("Recording no longer allowed; releasing device");
                        return false;
                    }
                    *slot = Some(ActiveCapture {
                        capture,
                        started: Instant::now(),
                    });
                }
                info!("Recording started");
                self.emit(WidgetEvent::RecordingChanged(true));
                true
            }
            Err(e) => {
                warn!(error = %e, "Could not open audio input");
                {
                    let mut state = self.inner.state.lock().await;
                    if state.disposed {
                        return false;
                    }
                    state.transcript.push(Message::bot(prompts::MICROPHONE_FAILED));
                }
                self.emit(WidgetEvent::TranscriptChanged);
                false
            }
        }
    }

    async fn can_start_recording(&self) -> bool {
        let slot = self.inner.capture.lock().await;
        let state = self.inner.state.lock().await;
        if slot.is_some() {
            debug!("Recording already active");
            return false;
        }
        if !state.accepts_actions() {
            debug!(busy = state.busy, transcribing = state.transcribing, "Recording refused");
            return false;
        }
        true
    }

    /// Stop the running capture and transcribe it.
    ///
    /// On success the text is placed in the input and submitted after the
    /// auto-submit delay. Returns `false` when nothing was recording.
    pub async fn stop_recording(&self) -> bool {
        let Some(active) = self.inner.capture.lock().await.take() else {
            debug!("Stop requested with no active recording");
            return false;
        };
        let elapsed = active.started.elapsed();
        self.inner.state.lock().await.transcribing = true;
        self.emit(WidgetEvent::RecordingChanged(false));
        self.emit(WidgetEvent::BusyChanged);
        info!(elapsed_ms = elapsed.as_millis() as u64, "Recording stopped");

        let result = match active.capture.finish().await {
            Ok(clip) => {
                debug!(bytes = clip.bytes.len(), "Sending voice note for transcription");
                self.inner.api.transcribe(clip).await.map_err(|e| {
                    warn!(error = %e, "Transcription failed");
                    e.detail().to_string()
                })
            }
            Err(e) => {
                warn!(error = %e, "Voice note capture failed");
                Err(e.to_string())
            }
        };

        {
            let mut state = self.inner.state.lock().await;
            if state.disposed {
                debug!("Transcription finished after dispose; dropped");
                return true;
            }
            state.transcribing = false;
            match &result {
                Ok(text) => state.input = text.clone(),
                Err(reason) => {
                    state
                        .transcript
                        .push(Message::bot(prompts::transcription_failed(reason)));
                }
            }
        }

        self.emit(WidgetEvent::BusyChanged);
        match result {
            Ok(text) => {
                self.emit(WidgetEvent::InputChanged(text));
                self.schedule_auto_submit().await;
            }
            Err(_) => self.emit(WidgetEvent::TranscriptChanged),
        }
        true
    }

    /// Start recording if idle, stop if recording.
    pub async fn toggle_recording(&self) -> bool {
        if self.is_recording().await {
            self.stop_recording().await
        } else {
            self.start_recording().await
        }
    }

    pub async fn is_recording(&self) -> bool {
        self.inner.capture.lock().await.is_some()
    }

    /// How long the running capture has been going.
    pub async fn recording_elapsed(&self) -> Option<Duration> {
        self.inner
            .capture
            .lock()
            .await
            .as_ref()
            .map(|a| a.started.elapsed())
    }

    /// Delayed side effects not yet fired.
    pub async fn scheduled_tasks(&self) -> usize {
        self.inner.tasks.lock().await.pending()
    }

    /// Tear down: cancel scheduled work, release the microphone, and reject
    /// everything afterwards. Late backend responses are dropped.
    pub async fn dispose(&self) {
        {
            let mut state = self.inner.state.lock().await;
            if state.disposed {
                return;
            }
            state.disposed = true;
        }
        let cancelled = self.inner.tasks.lock().await.cancel_all();
        let released = self.inner.capture.lock().await.take().is_some();
        info!(cancelled, released_capture = released, "Widget disposed");
    }

    pub async fn is_disposed(&self) -> bool {
        self.inner.state.lock().await.disposed
    }

    // ── Backend calls ───────────────────────────────────────────────────

    async fn run_chat(&self, message: String) {
        debug!(endpoint = "chat", "Dispatching chat message");
        let result = self.inner.api.chat(&message).await;

        let mut state = self.inner.state.lock().await;
        if state.disposed {
            return;
        }
        state.busy = false;
        let reply = match result {
            Ok(ChatReply::Text { message }) => Message::bot(message),
            Ok(ChatReply::Redirect { url }) => {
                let announcement = Message::bot(prompts::redirecting_to(&url));
                self.schedule_navigation(url, self.inner.timings.chat_redirect_delay)
                    .await;
                announcement
            }
            Ok(ChatReply::Unknown) => {
                warn!("Chat reply had an unknown type");
                Message::bot(prompts::CHAT_UNKNOWN_REPLY)
            }
            Err(e) => {
                warn!(error = %e, transport = e.is_transport(), "Chat request failed");
                Message::bot(prompts::CHAT_FAILED)
            }
        };
        state.transcript.resolve_pending(reply);
    }

    async fn run_form(&self, draft: ContactDraft) {
        debug!(endpoint = "form", "Submitting contact form");
        let result = self.inner.api.submit_form(&draft).await;

        let mut state = self.inner.state.lock().await;
        if state.disposed {
            return;
        }
        state.busy = false;
        state.draft.clear();
        let origin = state.wizard_origin.take();
        self.enter_step(&mut state, WizardStep::None);

        match result {
            Ok(()) => {
                info!(origin = ?origin, "Contact form submitted");
                state.flags.has_completed_contact_form = true;
                state.transcript.push(Message::bot(prompts::THANK_YOU));
                let follow_up = origin
                    .as_ref()
                    .map(MenuOption::follow_up)
                    .unwrap_or(FollowUp::Done);
                self.apply_follow_up(&mut state, follow_up).await;
            }
            Err(e) => {
                warn!(error = %e, "Contact form submission failed");
                state.transcript.push(Message::bot(prompts::FORM_FAILED));
            }
        }
    }

    async fn run_leads(&self, url: String, from_wizard: bool) {
        debug!(endpoint = "generate-leads", %url, "Requesting leads");
        let result = self
            .inner
            .api
            .generate_leads(&url)
            .await
            .and_then(LeadsResponse::into_leads);

        let mut state = self.inner.state.lock().await;
        if state.disposed {
            return;
        }
        state.busy = false;
        let reply = match result {
            Ok(leads) => {
                info!(%url, found = leads.total(), "Leads generated");
                Message::bot(prompts::LEADS_FOUND).with_leads(leads)
            }
            Err(e) => {
                warn!(%url, error = %e, "Lead generation failed");
                Message::bot(prompts::LEADS_NOT_FOUND)
            }
        };
        state.transcript.resolve_pending(reply);

        if from_wizard {
            state.draft.clear();
            state.wizard_origin = None;
            self.enter_step(&mut state, WizardStep::None);
        }
    }

    // ── State helpers ───────────────────────────────────────────────────

    fn enter_step(&self, state: &mut ConversationState, target: WizardStep) {
        if state.step == target {
            return;
        }
        if !state.step.can_transition_to(target) {
            warn!(from = %state.step, to = %target, "Unexpected wizard transition");
        }
        debug!(from = %state.step, to = %target, "Wizard step");
        state.step = target;
        self.emit(WidgetEvent::StepChanged(target));
    }

    async fn apply_follow_up(&self, state: &mut ConversationState, follow_up: FollowUp) {
        match follow_up {
            FollowUp::Redirect { path, announcement } => {
                state.transcript.push(Message::bot(announcement));
                self.schedule_navigation(path.to_string(), self.inner.timings.menu_redirect_delay)
                    .await;
            }
            FollowUp::CollectUrl => {
                self.enter_step(state, WizardStep::CollectingUrl);
                state
                    .transcript
                    .push(Message::bot(prompts::ASK_URL).awaiting_url());
            }
            FollowUp::Done => {}
        }
    }

    // ── Scheduled side effects ──────────────────────────────────────────

    fn weak(&self) -> Weak<Shared> {
        Arc::downgrade(&self.inner)
    }

    /// Upgrade a task's handle, unless the controller is gone or disposed.
    async fn revive(weak: &Weak<Shared>) -> Option<ConversationController> {
        let inner = weak.upgrade()?;
        if inner.state.lock().await.disposed {
            return None;
        }
        Some(ConversationController { inner })
    }

    async fn schedule_navigation(&self, url: String, delay: Duration) {
        let weak = self.weak();
        self.inner
            .tasks
            .lock()
            .await
            .schedule("navigate", delay, async move {
                let Some(controller) = Self::revive(&weak).await else {
                    return;
                };
                info!(%url, "Navigating");
                controller.emit(WidgetEvent::Navigating(url.clone()));
                controller.inner.navigator.navigate(&url);
            });
    }

    async fn schedule_canned_reply(&self, option: &MenuOption) {
        let reply = prompts::canned_reply(option);
        let weak = self.weak();
        self.inner.tasks.lock().await.schedule(
            "canned_reply",
            self.inner.timings.canned_reply_delay,
            async move {
                let Some(controller) = Self::revive(&weak).await else {
                    return;
                };
                {
                    let mut state = controller.inner.state.lock().await;
                    if state.disposed {
                        return;
                    }
                    state.transcript.push(Message::bot(reply));
                }
                controller.emit(WidgetEvent::TranscriptChanged);
            },
        );
    }

    async fn schedule_auto_submit(&self) {
        let weak = self.weak();
        self.inner.tasks.lock().await.schedule(
            "auto_submit",
            self.inner.timings.auto_submit_delay,
            async move {
                if let Some(controller) = Self::revive(&weak).await {
                    controller.submit_input().await;
                }
            },
        );
    }
}
