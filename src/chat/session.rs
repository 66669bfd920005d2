use parking_lot::Mutex;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

use crate::error::Result;
use crate::models::provider::{ChatRequest, Message, ModelProvider};
use crate::platform::ApiKey;

/// Everything a conversation is configured with when it is created.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub model: String,
    pub system_instruction: String,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
    /// Answered turns kept and replayed; `None` keeps all of them.
    pub max_history_turns: Option<usize>,
}

impl SessionConfig {
    pub fn new(model: impl Into<String>, system_instruction: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_instruction: system_instruction.into(),
            temperature: None,
            max_output_tokens: None,
            max_history_turns: None,
        }
    }
}

/// Handle to one ongoing conversation.
///
/// The REST API is stateless, so the handle keeps the turns exchanged so far
/// and replays them with every request. Only turns that produced text are
/// kept; a failed or empty exchange leaves the history as it was.
pub struct ChatSession {
    provider: Arc<dyn ModelProvider>,
    config: SessionConfig,
    history: Mutex<Vec<Message>>,
}

impl ChatSession {
    pub fn new(provider: Arc<dyn ModelProvider>, config: SessionConfig) -> Self {
        Self {
            provider,
            config,
            history: Mutex::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn history(&self) -> Vec<Message> {
        self.history.lock().clone()
    }

    /// Sends `text` as the next user turn. `Ok(None)` means the service
    /// answered without any text.
    pub async fn send_turn(&self, text: &str) -> Result<Option<String>> {
        let user_turn = Message::user(text);

        let mut messages = self.history();
        messages.push(user_turn.clone());

        let mut request = ChatRequest::new(messages, self.config.model.clone())
            .with_system_instruction(self.config.system_instruction.clone());
        if let Some(temperature) = self.config.temperature {
            request = request.with_temperature(temperature);
        }
        if let Some(max_tokens) = self.config.max_output_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        debug!(
            provider = self.provider.get_provider_name(),
            request_id = %request.id,
            turns = request.messages.len(),
            "Sending conversation turn"
        );

        let response = self.provider.send_message(request).await?;

        if let Some(reply) = &response.content {
            let mut history = self.history.lock();
            history.push(user_turn);
            history.push(Message::assistant(reply.clone()));
            if let Some(max_turns) = self.config.max_history_turns {
                // One turn is a user message plus its answer
                let excess = history.len().saturating_sub(max_turns * 2);
                history.drain(..excess);
            }
        }

        Ok(response.content)
    }
}

/// Hands out the conversation handle, creating it on first use.
pub trait SessionProvider: Send + Sync {
    fn get_or_create_session(&self, credential: &ApiKey) -> Arc<ChatSession>;
}

type Connector = dyn Fn(&ApiKey) -> Arc<dyn ModelProvider> + Send + Sync;

/// [`SessionProvider`] that builds exactly one session and reuses it for the
/// lifetime of the provider.
pub struct LazySession {
    config: SessionConfig,
    connect: Box<Connector>,
    slot: OnceLock<Arc<ChatSession>>,
}

impl LazySession {
    pub fn new<F>(config: SessionConfig, connect: F) -> Self
    where
        F: Fn(&ApiKey) -> Arc<dyn ModelProvider> + Send + Sync + 'static,
    {
        Self {
            config,
            connect: Box::new(connect),
            slot: OnceLock::new(),
        }
    }

    pub fn is_created(&self) -> bool {
        self.slot.get().is_some()
    }
}

impl SessionProvider for LazySession {
    fn get_or_create_session(&self, credential: &ApiKey) -> Arc<ChatSession> {
        self.slot
            .get_or_init(|| {
                let provider = (self.connect)(credential);
                info!(
                    provider = provider.get_provider_name(),
                    model = %self.config.model,
                    "Created chat session"
                );
                Arc::new(ChatSession::new(provider, self.config.clone()))
            })
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::provider::{ChatResponse, MessageRole};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Answers "ответ N" for the N-th call; every third call comes back empty
    /// and the fifth one fails.
    struct ScriptedProvider {
        calls: AtomicUsize,
        seen: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedProvider {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ModelProvider for ScriptedProvider {
        async fn send_message(&self, request: ChatRequest) -> Result<ChatResponse> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            self.seen.lock().push(request.clone());

            if n == 5 {
                return Err(Error::model_provider("boom"));
            }
            let content = if n % 3 == 0 { None } else { Some(format!("ответ {}", n)) };

            Ok(ChatResponse {
                id: format!("resp-{}", n),
                request_id: request.id,
                model: request.model,
                content,
                created_at: Utc::now(),
                usage: None,
                finish_reason: None,
            })
        }

        fn get_provider_name(&self) -> &str {
            "scripted"
        }
    }

    fn key() -> ApiKey {
        ApiKey::new("test-key").unwrap()
    }

    #[tokio::test]
    async fn test_history_keeps_only_answered_turns() {
        let provider = Arc::new(ScriptedProvider::new());
        let session = ChatSession::new(provider.clone(), SessionConfig::new("m", "sys"));

        assert_eq!(session.send_turn("один").await.unwrap().as_deref(), Some("ответ 1"));
        assert_eq!(session.send_turn("два").await.unwrap().as_deref(), Some("ответ 2"));
        assert_eq!(session.send_turn("три").await.unwrap(), None);
        assert_eq!(session.send_turn("четыре").await.unwrap().as_deref(), Some("ответ 4"));
        assert!(session.send_turn("пять").await.is_err());

        let history = session.history();
        let texts: Vec<&str> = history.iter().map(|m| m.text()).collect();
        assert_eq!(texts, vec!["один", "ответ 1", "два", "ответ 2", "четыре", "ответ 4"]);
        assert_eq!(history[1].role(), MessageRole::Assistant);

        // The fourth request replays two answered turns plus the new one.
        let seen = provider.seen.lock();
        assert_eq!(seen[3].messages.len(), 5);
        assert_eq!(seen[3].system_instruction.as_deref(), Some("sys"));
    }

    #[tokio::test]
    async fn test_history_cap_bounds_replayed_turns() {
        let provider = Arc::new(ScriptedProvider::new());
        let mut config = SessionConfig::new("m", "sys");
        config.max_history_turns = Some(1);
        let session = ChatSession::new(provider.clone(), config);

        session.send_turn("один").await.unwrap();
        session.send_turn("два").await.unwrap();
        session.send_turn("три").await.unwrap();
        session.send_turn("четыре").await.unwrap();

        let texts: Vec<String> = session.history().iter().map(|m| m.text().to_string()).collect();
        assert_eq!(texts, vec!["четыре", "ответ 4"]);

        // Each request replays at most one earlier turn.
        let seen = provider.seen.lock();
        assert_eq!(seen[1].messages.len(), 3);
        assert_eq!(seen[2].messages.len(), 3);
        assert_eq!(seen[2].messages[0].text(), "два");
        assert_eq!(seen[3].messages.len(), 3);
    }

    #[test]
    fn test_lazy_session_connects_once() {
        let connects = Arc::new(AtomicUsize::new(0));
        let counter = connects.clone();
        let lazy = LazySession::new(SessionConfig::new("m", "sys"), move |_key: &ApiKey| {
            counter.fetch_add(1, Ordering::SeqCst);
            Arc::new(ScriptedProvider::new()) as Arc<dyn ModelProvider>
        });

        assert!(!lazy.is_created());
        let first = lazy.get_or_create_session(&key());
        let second = lazy.get_or_create_session(&key());

        assert!(lazy.is_created());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(connects.load(Ordering::SeqCst), 1);
        assert_eq!(first.config().model, "m");
    }
}
