use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::app::config::AppConfig;
use crate::chat::{ChatSessionManager, ChatWidget, FallbackReplies, LazySession, SessionConfig};
use crate::error::Result;
use crate::models::{GeminiProvider, ModelProvider};
use crate::platform::ApiKey;

pub struct AppState {
    config: AppConfig,
    config_path: PathBuf,
    credential: Option<ApiKey>,
}

impl AppState {
    pub fn new(config: AppConfig, config_path: PathBuf, credential: Option<ApiKey>) -> Self {
        info!("Initializing application state");

        Self {
            config,
            config_path,
            credential,
        }
    }

    pub fn get_config(&self) -> &AppConfig {
        &self.config
    }

    pub fn get_config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn get_provider_status(&self) -> ProviderStatus {
        if self.credential.is_some() {
            ProviderStatus::Ready
        } else {
            ProviderStatus::MissingCredentials
        }
    }

    pub fn session_config(&self) -> SessionConfig {
        let gemini = &self.config.gemini;
        SessionConfig {
            model: gemini.model.clone(),
            system_instruction: self.config.chat.resolved_system_instruction(),
            temperature: gemini.temperature,
            max_output_tokens: gemini.max_output_tokens,
            max_history_turns: self.config.chat.max_history_turns,
        }
    }

    /// Wires the manager to a lazily created Gemini conversation. The HTTP
    /// client is built here so that later session creation cannot fail.
    pub fn build_chat_manager(&self) -> Result<ChatSessionManager> {
        let client = GeminiProvider::build_client(self.config.gemini.timeout())?;
        let endpoint = self.config.gemini.api_endpoint.clone();

        let sessions = LazySession::new(self.session_config(), move |key: &ApiKey| {
            debug!(endpoint = %endpoint, "Connecting Gemini provider");
            Arc::new(GeminiProvider::new(client.clone(), key.clone(), endpoint.clone()))
                as Arc<dyn ModelProvider>
        });

        Ok(ChatSessionManager::new(
            self.credential.clone(),
            Arc::new(sessions),
            FallbackReplies::from(&self.config.chat),
            self.config.chat.reply_deadline(),
        ))
    }

    pub fn new_widget(&self) -> ChatWidget {
        let mut widget = ChatWidget::new(self.config.chat.greeting.clone());
        if self.config.ui.start_open {
            widget.toggle_open();
        }
        widget
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProviderStatus {
    Ready,
    MissingCredentials,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::persona;

    fn state(credential: Option<ApiKey>) -> AppState {
        AppState::new(AppConfig::default(), PathBuf::from("config.toml"), credential)
    }

    #[test]
    fn test_provider_status() {
        assert_eq!(state(None).get_provider_status(), ProviderStatus::MissingCredentials);
        assert_eq!(
            state(ApiKey::new("k")).get_provider_status(),
            ProviderStatus::Ready
        );
    }

    #[test]
    fn test_new_widget_follows_config() {
        let widget = state(None).new_widget();
        assert!(!widget.is_open());
        assert_eq!(widget.transcript()[0].text(), persona::GREETING);

        let mut config = AppConfig::default();
        config.ui.start_open = true;
        let widget = AppState::new(config, PathBuf::new(), None).new_widget();
        assert!(widget.is_open());
    }

    #[test]
    fn test_session_config_carries_history_cap() {
        assert_eq!(state(None).session_config().max_history_turns, None);

        let mut config = AppConfig::default();
        config.chat.max_history_turns = Some(6);
        let state = AppState::new(config, PathBuf::new(), None);
        assert_eq!(state.session_config().max_history_turns, Some(6));
    }

    #[tokio::test]
    async fn test_offline_manager_uses_offline_reply() {
        let manager = state(None).build_chat_manager().unwrap();

        assert!(!manager.is_enabled());
        assert_eq!(manager.send_message("Привет").await, persona::OFFLINE_REPLY);
    }
}
