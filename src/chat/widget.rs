use tracing::debug;

use crate::chat::manager::{ChatSessionManager, Reply};
use crate::models::provider::Message;

/// A send that left the widget but has not been answered yet.
///
/// Produced by [`ChatWidget::submit`]; the caller drives it to completion and
/// hands the result back through [`ChatWidget::complete_send`].
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSend {
    text: String,
}

impl PendingSend {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub async fn run(self, manager: &ChatSessionManager) -> Reply {
        manager.exchange(&self.text).await
    }
}

/// State of the chat widget: transcript, draft, visibility and the
/// single-flight flag.
#[derive(Debug, Clone)]
pub struct ChatWidget {
    transcript: Vec<Message>,
    draft_input: String,
    is_open: bool,
    is_sending: bool,
    scroll_requested: bool,
}

impl ChatWidget {
    pub fn new(greeting: impl Into<String>) -> Self {
        Self {
            transcript: vec![Message::assistant(greeting)],
            draft_input: String::new(),
            is_open: false,
            is_sending: false,
            scroll_requested: true,
        }
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn draft_input(&self) -> &str {
        &self.draft_input
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn is_sending(&self) -> bool {
        self.is_sending
    }

    pub fn can_submit(&self) -> bool {
        !self.is_sending && !self.draft_input.trim().is_empty()
    }

    pub fn toggle_open(&mut self) {
        self.is_open = !self.is_open;
        if self.is_open {
            self.scroll_requested = true;
        }
    }

    pub fn update_draft(&mut self, text: impl Into<String>) {
        self.draft_input = text.into();
    }

    /// Starts a send. Returns `None` when the draft is blank or another send
    /// is still outstanding.
    pub fn submit(&mut self) -> Option<PendingSend> {
        if !self.can_submit() {
            return None;
        }

        let text = std::mem::take(&mut self.draft_input);
        self.push(Message::user(text.clone()));
        self.is_sending = true;

        debug!(len = text.len(), "Submitted message");
        Some(PendingSend { text })
    }

    /// Records the reply of the outstanding send. Ignored when nothing is in
    /// flight.
    pub fn complete_send(&mut self, reply: impl Into<String>) {
        if !self.is_sending {
            debug!("Dropping reply with no send in flight");
            return;
        }

        self.push(Message::assistant(reply));
        self.is_sending = false;
    }

    /// Submits and waits for the reply in one go.
    pub async fn submit_and_wait(&mut self, manager: &ChatSessionManager) -> Option<Reply> {
        let pending = self.submit()?;
        let reply = pending.run(manager).await;
        self.complete_send(reply.text());
        Some(reply)
    }

    /// True once after every transcript change or open; the view should
    /// scroll to the latest message.
    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_requested)
    }

    fn push(&mut self, message: Message) {
        self.transcript.push(message);
        self.scroll_requested = true;
    }
}
