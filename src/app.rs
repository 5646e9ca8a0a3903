use std::collections::BTreeMap;

use crate::client::{ChatClient, ChatRequest, ChatResponse};
use crate::form::FormState;

pub const WELCOME_MESSAGE: &str = "👋 Welcome to GTM Chat! Ask me about Item Details, \
CoC Information, BI Reports, or Delivery Tracking.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

/// One transcript bubble. Lives only in the widget's in-memory log.
#[derive(Debug, Clone)]
pub struct Message {
    pub text: String,
    pub sender: Sender,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Input,
    Form,
}

/// Which submit path produced an in-flight dispatch. Only affects the
/// error prefix shown when the call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchKind {
    Message,
    Params,
}

impl DispatchKind {
    pub fn error_prefix(&self) -> &'static str {
        match self {
            DispatchKind::Message => "Error contacting server",
            DispatchKind::Params => "Error submitting parameters",
        }
    }
}

/// The chat widget: owns the transcript, the message input, the parameter
/// form, and the single in-flight dispatch slot. All mutation goes through
/// these methods.
pub struct App {
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub focus: FocusPane,

    // Transcript state
    pub messages: Vec<Message>,
    pub transcript_scroll: u16,
    pub transcript_height: u16,
    pub transcript_width: u16,

    // Message input state
    pub input: String,
    pub input_cursor: usize,

    // Parameter form state
    pub form: FormState,
    pub form_hint: Option<String>,

    // Dispatch state: latest request wins, a new submit aborts the old task
    pub pending: Option<(DispatchKind, tokio::task::JoinHandle<anyhow::Result<ChatResponse>>)>,
    pub animation_frame: u8,

    pub client: ChatClient,
}

impl App {
    pub fn new(client: ChatClient) -> Self {
        let mut app = Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            focus: FocusPane::Input,

            messages: Vec::new(),
            transcript_scroll: 0,
            transcript_height: 0,
            transcript_width: 0,

            input: String::new(),
            input_cursor: 0,

            form: FormState::default(),
            form_hint: None,

            pending: None,
            animation_frame: 0,

            client,
        };
        app.push_message(WELCOME_MESSAGE, Sender::Bot);
        app
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Append one bubble and force the transcript to the bottom.
    pub fn push_message(&mut self, text: &str, sender: Sender) {
        self.messages.push(Message {
            text: text.to_string(),
            sender,
        });
        self.scroll_to_bottom();
    }

    /// Send the typed message, if any. Ignores empty input like the
    /// browser widget did.
    pub fn submit_message(&mut self) {
        let message = self.input.trim().to_string();
        if message.is_empty() {
            return;
        }
        self.push_message(&message, Sender::User);
        self.input.clear();
        self.input_cursor = 0;
        self.dispatch(ChatRequest::text(message), DispatchKind::Message);
    }

    /// Submit the parameter form. Required text fields must be non-empty,
    /// matching the native `required` behavior of the original form.
    pub fn submit_form(&mut self) {
        if let Some(label) = self.form.missing_required() {
            self.form_hint = Some(format!("{} is required", label));
            return;
        }
        self.form_hint = None;
        let params = self.form.collect();
        self.dispatch_params(params);
    }

    pub fn dispatch_params(&mut self, params: BTreeMap<String, String>) {
        self.dispatch(ChatRequest::params(params), DispatchKind::Params);
    }

    /// Start one network call for this request. A still-running previous
    /// call is aborted so only the latest response is ever applied.
    fn dispatch(&mut self, request: ChatRequest, kind: DispatchKind) {
        if let Some((_, task)) = self.pending.take() {
            task.abort();
        }
        let client = self.client.clone();
        self.pending = Some((
            kind,
            tokio::spawn(async move { client.send(&request).await }),
        ));
        self.scroll_to_bottom();
    }

    /// Apply a completed exchange: the reply always renders, then the form
    /// is either rebuilt and shown or cleared and hidden. Exactly one of
    /// the two happens for every response.
    pub fn apply_response(&mut self, response: ChatResponse) {
        // A missing reply still renders, as empty text
        self.push_message(response.reply.as_deref().unwrap_or(""), Sender::Bot);
        if response.ask_params {
            self.form.show(&response.required, &response.optional);
            self.form_hint = None;
            self.focus = FocusPane::Form;
            self.input_mode = InputMode::Normal;
        } else {
            self.form.hide();
            self.form_hint = None;
            self.focus = FocusPane::Input;
            self.input_mode = InputMode::Editing;
        }
    }

    /// Render a failed dispatch as a bot message. Form visibility is left
    /// exactly as it was before the call.
    pub fn apply_error(&mut self, kind: DispatchKind, error: &anyhow::Error) {
        self.push_message(&format!("{}: {}", kind.error_prefix(), error), Sender::Bot);
    }

    /// Reap the in-flight dispatch if its task has finished.
    pub async fn poll_dispatch(&mut self) {
        let finished = matches!(&self.pending, Some((_, task)) if task.is_finished());
        if !finished {
            return;
        }
        if let Some((kind, task)) = self.pending.take() {
            match task.await {
                Ok(Ok(response)) => self.apply_response(response),
                Ok(Err(error)) => self.apply_error(kind, &error),
                // Aborted tasks are stale requests; drop them silently.
                Err(join_error) if join_error.is_cancelled() => {}
                Err(join_error) => {
                    self.apply_error(kind, &anyhow::Error::new(join_error));
                }
            }
        }
    }

    pub fn tick_animation(&mut self) {
        if self.is_loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Transcript scrolling. Wrapped line counts mirror the Paragraph wrap
    // in ui.rs so the newest bubble lands at the viewport bottom.
    fn transcript_lines(&self) -> u16 {
        let wrap_width = if self.transcript_width > 0 {
            self.transcript_width as usize
        } else {
            50
        };

        let mut total: u16 = 0;
        for msg in &self.messages {
            total += 1; // sender label line
            if msg.text.is_empty() {
                total += 1; // an empty reply still occupies one line
            }
            for line in msg.text.lines() {
                // Character count, not byte length, for proper UTF-8 handling
                let char_count = line.chars().count();
                if char_count == 0 {
                    total += 1;
                } else {
                    total += ((char_count / wrap_width) + 1) as u16;
                }
            }
            total += 1; // blank line after each bubble
        }
        if self.is_loading() {
            total += 2; // "Bot:" + thinking indicator
        }
        total
    }

    pub fn scroll_to_bottom(&mut self) {
        let total = self.transcript_lines();
        let visible = if self.transcript_height > 0 {
            self.transcript_height
        } else {
            20
        };
        self.transcript_scroll = total.saturating_sub(visible);
    }

    pub fn scroll_up(&mut self) {
        self.transcript_scroll = self.transcript_scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        let max = self.transcript_lines().saturating_sub(self.transcript_height);
        if self.transcript_scroll < max {
            self.transcript_scroll += 1;
        }
    }

    pub fn scroll_half_page_up(&mut self) {
        self.transcript_scroll = self
            .transcript_scroll
            .saturating_sub(self.transcript_height / 2);
    }

    pub fn scroll_half_page_down(&mut self) {
        let max = self.transcript_lines().saturating_sub(self.transcript_height);
        self.transcript_scroll = (self.transcript_scroll + self.transcript_height / 2).min(max);
    }
}
