use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::app::config::ChatConfig;
use crate::chat::session::SessionProvider;
use crate::platform::ApiKey;

/// Canned replies used whenever the model cannot produce an answer.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackReplies {
    pub offline: String,
    pub failure: String,
    pub empty: String,
}

impl From<&ChatConfig> for FallbackReplies {
    fn from(config: &ChatConfig) -> Self {
        Self {
            offline: config.offline_reply.clone(),
            failure: config.failure_reply.clone(),
            empty: config.empty_reply.clone(),
        }
    }
}

/// Why a canned reply was shown instead of a model answer.
#[derive(Debug, Clone, PartialEq)]
pub enum FallbackReason {
    MissingCredential,
    Transport(String),
    Timeout(Duration),
    EmptyPayload,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::MissingCredential => write!(f, "no API key configured"),
            FallbackReason::Transport(msg) => write!(f, "transport failure: {}", msg),
            FallbackReason::Timeout(limit) => write!(f, "no reply within {:?}", limit),
            FallbackReason::EmptyPayload => write!(f, "reply had no text"),
        }
    }
}

/// Outcome of one exchange. Always carries display-ready text.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Answer(String),
    Fallback { reason: FallbackReason, text: String },
}

impl Reply {
    pub fn text(&self) -> &str {
        match self {
            Reply::Answer(text) => text,
            Reply::Fallback { text, .. } => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Reply::Answer(text) => text,
            Reply::Fallback { text, .. } => text,
        }
    }

    pub fn fallback_reason(&self) -> Option<&FallbackReason> {
        match self {
            Reply::Answer(_) => None,
            Reply::Fallback { reason, .. } => Some(reason),
        }
    }
}

/// Front door to the generative-text service.
///
/// Owns the session provider and the credential. Every call resolves to a
/// string: errors, deadline expiry and missing credentials are classified and
/// logged here, then replaced by fallback copy.
pub struct ChatSessionManager {
    credential: Option<ApiKey>,
    sessions: Arc<dyn SessionProvider>,
    replies: FallbackReplies,
    deadline: Duration,
}

impl ChatSessionManager {
    pub fn new(
        credential: Option<ApiKey>,
        sessions: Arc<dyn SessionProvider>,
        replies: FallbackReplies,
        deadline: Duration,
    ) -> Self {
        if credential.is_none() {
            info!("No API key configured, chat runs in offline mode");
        }

        Self {
            credential,
            sessions,
            replies,
            deadline,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.credential.is_some()
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Sends `text` and returns whatever should be displayed.
    pub async fn send_message(&self, text: &str) -> String {
        self.exchange(text).await.into_text()
    }

    /// Like [`ChatSessionManager::send_message`] but keeps the reason behind a
    /// fallback.
    pub async fn exchange(&self, text: &str) -> Reply {
        let Some(credential) = &self.credential else {
            debug!("Offline mode, skipping network call");
            return self.fallback(FallbackReason::MissingCredential);
        };

        let session = self.sessions.get_or_create_session(credential);

        match timeout(self.deadline, session.send_turn(text)).await {
            Ok(Ok(Some(answer))) => {
                debug!(reply_len = answer.len(), "Received reply");
                Reply::Answer(answer)
            }
            Ok(Ok(None)) => {
                warn!("Model returned no text");
                self.fallback(FallbackReason::EmptyPayload)
            }
            Ok(Err(e)) => {
                error!(error = %e, "Chat request failed");
                self.fallback(FallbackReason::Transport(e.to_string()))
            }
            Err(_) => {
                error!(deadline = ?self.deadline, "Chat request timed out");
                self.fallback(FallbackReason::Timeout(self.deadline))
            }
        }
    }

    fn fallback(&self, reason: FallbackReason) -> Reply {
        let text = match reason {
            FallbackReason::MissingCredential => &self.replies.offline,
            FallbackReason::Transport(_) | FallbackReason::Timeout(_) => &self.replies.failure,
            FallbackReason::EmptyPayload => &self.replies.empty,
        };

        Reply::Fallback {
            text: text.clone(),
            reason,
        }
    }
}
