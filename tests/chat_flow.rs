use arctic_guide::app::{AppConfig, AppState};
use arctic_guide::chat::{
    persona, ChatSessionManager, ChatWidget, FallbackReason, FallbackReplies, LazySession, Reply,
    SessionConfig,
};
use arctic_guide::error::{Error, Result};
use arctic_guide::models::{ChatRequest, ChatResponse, MessageRole, ModelProvider};
use arctic_guide::platform::ApiKey;
use async_trait::async_trait;
use chrono::Utc;
use mockito::{Matcher, Server};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

enum Behaviour {
    Echo(&'static str),
    Empty,
    Fail,
    Hang,
}

struct MockProvider {
    behaviour: Behaviour,
    calls: AtomicUsize,
}

impl MockProvider {
    fn new(behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            behaviour,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelProvider for MockProvider {
    async fn send_message(&self, request: ChatRequest) -> Result<ChatResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let content = match self.behaviour {
            Behaviour::Echo(reply) => Some(reply.to_string()),
            Behaviour::Empty => None,
            Behaviour::Fail => return Err(Error::model_provider("connection reset")),
            Behaviour::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Some("слишком поздно".to_string())
            }
        };

        Ok(ChatResponse {
            id: "resp-1".to_string(),
            request_id: request.id,
            model: request.model,
            content,
            created_at: Utc::now(),
            usage: None,
            finish_reason: Some("STOP".to_string()),
        })
    }

    fn get_provider_name(&self) -> &str {
        "mock"
    }
}

fn replies() -> FallbackReplies {
    FallbackReplies::from(&AppConfig::default().chat)
}

fn manager_with(
    provider: Arc<MockProvider>,
    credential: Option<ApiKey>,
    deadline: Duration,
) -> (ChatSessionManager, Arc<AtomicUsize>) {
    let connects = Arc::new(AtomicUsize::new(0));
    let counter = connects.clone();
    let sessions = LazySession::new(
        SessionConfig::new("gemini-2.5-flash", persona::system_instruction()),
        move |_key: &ApiKey| {
            counter.fetch_add(1, Ordering::SeqCst);
            provider.clone() as Arc<dyn ModelProvider>
        },
    );

    let manager = ChatSessionManager::new(credential, Arc::new(sessions), replies(), deadline);
    (manager, connects)
}

fn key() -> Option<ApiKey> {
    ApiKey::new("test-key")
}

#[tokio::test]
async fn offline_mode_never_reaches_the_provider() {
    let provider = MockProvider::new(Behaviour::Echo("не должно прийти"));
    let (manager, connects) = manager_with(provider.clone(), None, Duration::from_secs(5));

    assert!(!manager.is_enabled());
    for text in ["Привет", "Сколько стоит Polar Tub?", "  "] {
        assert_eq!(manager.send_message(text).await, persona::OFFLINE_REPLY);
    }

    assert_eq!(provider.calls(), 0);
    assert_eq!(connects.load(Ordering::SeqCst), 0);
    assert_eq!(
        manager.exchange("ещё").await.fallback_reason(),
        Some(&FallbackReason::MissingCredential)
    );
}

#[tokio::test]
async fn provider_failure_shows_failure_reply_and_widget_recovers() {
    let provider = MockProvider::new(Behaviour::Fail);
    let (manager, _) = manager_with(provider.clone(), key(), Duration::from_secs(5));

    assert_eq!(manager.send_message("hello").await, persona::FAILURE_REPLY);

    let mut widget = ChatWidget::new(persona::GREETING);
    widget.update_draft("hello");
    let pending = widget.submit().unwrap();
    assert!(widget.is_sending());

    let reply = pending.run(&manager).await;
    assert!(matches!(reply.fallback_reason(), Some(FallbackReason::Transport(_))));
    widget.complete_send(reply.into_text());

    assert!(!widget.is_sending());
    assert_eq!(widget.transcript().len(), 3);
    assert_eq!(widget.transcript()[2].text(), persona::FAILURE_REPLY);
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn empty_answer_shows_placeholder_and_widget_recovers() {
    let provider = MockProvider::new(Behaviour::Empty);
    let (manager, _) = manager_with(provider.clone(), key(), Duration::from_secs(5));

    assert_eq!(manager.send_message("Привет").await, persona::EMPTY_REPLY);
    assert_eq!(
        manager.exchange("Привет").await.fallback_reason(),
        Some(&FallbackReason::EmptyPayload)
    );

    let mut widget = ChatWidget::new(persona::GREETING);
    widget.update_draft("Что выбрать?");
    let pending = widget.submit().unwrap();
    assert!(widget.is_sending());

    widget.complete_send(pending.run(&manager).await.into_text());

    assert!(!widget.is_sending());
    assert_eq!(widget.transcript().len(), 3);
    assert_eq!(widget.transcript()[2].role(), MessageRole::Assistant);
    assert_eq!(widget.transcript()[2].text(), persona::EMPTY_REPLY);
    assert_eq!(provider.calls(), 3);
}

#[tokio::test]
async fn app_state_maps_empty_candidates_to_placeholder() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/models/gemini-2.5-flash:generateContent")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"candidates": []}"#)
        .create_async()
        .await;

    let mut config = AppConfig::default();
    config.gemini.api_endpoint = server.url();
    let state = AppState::new(config, PathBuf::from("config.toml"), key());
    let manager = state.build_chat_manager().unwrap();

    let reply = manager.exchange("Привет").await;
    assert_eq!(
        reply,
        Reply::Fallback {
            reason: FallbackReason::EmptyPayload,
            text: persona::EMPTY_REPLY.to_string(),
        }
    );
}

#[tokio::test]
async fn greeting_then_question_then_answer() {
    let provider = MockProvider::new(Behaviour::Echo("Добро пожаловать в холод"));
    let (manager, _) = manager_with(provider, key(), Duration::from_secs(5));

    let mut widget = ChatWidget::new(persona::GREETING);
    widget.toggle_open();
    widget.update_draft("Привет");
    let reply = widget.submit_and_wait(&manager).await.unwrap();

    assert_eq!(reply, Reply::Answer("Добро пожаловать в холод".to_string()));

    let transcript: Vec<(MessageRole, &str)> = widget
        .transcript()
        .iter()
        .map(|m| (m.role(), m.text()))
        .collect();
    assert_eq!(
        transcript,
        vec![
            (MessageRole::Assistant, persona::GREETING),
            (MessageRole::User, "Привет"),
            (MessageRole::Assistant, "Добро пожаловать в холод"),
        ]
    );
    assert!(!widget.is_sending());
}

#[tokio::test]
async fn slow_provider_hits_the_deadline() {
    let provider = MockProvider::new(Behaviour::Hang);
    let deadline = Duration::from_millis(50);
    let (manager, _) = manager_with(provider, key(), deadline);

    let mut widget = ChatWidget::new(persona::GREETING);
    widget.update_draft("Привет");
    let reply = widget.submit_and_wait(&manager).await.unwrap();

    assert_eq!(reply.text(), persona::FAILURE_REPLY);
    assert_eq!(reply.fallback_reason(), Some(&FallbackReason::Timeout(deadline)));
    assert!(!widget.is_sending());
}

#[tokio::test]
async fn session_is_created_once_and_reused() {
    let provider = MockProvider::new(Behaviour::Echo("ок"));
    let (manager, connects) = manager_with(provider.clone(), key(), Duration::from_secs(5));

    for _ in 0..4 {
        assert_eq!(manager.send_message("вопрос").await, "ок");
    }

    assert_eq!(connects.load(Ordering::SeqCst), 1);
    assert_eq!(provider.calls(), 4);
}

#[tokio::test]
async fn app_state_talks_to_gemini_endpoint() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/models/gemini-2.5-flash:generateContent")
        .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"candidates": [{"content": {"role": "model", "parts": [{"text": "Начните с 2 минут при 10°C."}]}, "finishReason": "STOP"}]}"#,
        )
        .expect(2)
        .create_async()
        .await;

    let mut config = AppConfig::default();
    config.gemini.api_endpoint = server.url();
    let state = AppState::new(config, PathBuf::from("config.toml"), key());
    let manager = state.build_chat_manager().unwrap();

    assert!(manager.is_enabled());
    assert_eq!(manager.send_message("Как начать?").await, "Начните с 2 минут при 10°C.");
    assert_eq!(manager.send_message("А дальше?").await, "Начните с 2 минут при 10°C.");

    mock.assert_async().await;
}

#[tokio::test]
async fn app_state_maps_server_errors_to_failure_reply() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/models/gemini-2.5-flash:generateContent")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("internal")
        .create_async()
        .await;

    let mut config = AppConfig::default();
    config.gemini.api_endpoint = server.url();
    let state = AppState::new(config, PathBuf::from("config.toml"), key());
    let manager = state.build_chat_manager().unwrap();

    let reply = manager.exchange("Привет").await;
    assert_eq!(reply.text(), persona::FAILURE_REPLY);
    assert!(matches!(reply.fallback_reason(), Some(FallbackReason::Transport(_))));
}
