use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tracing::info;

use crate::chat::persona;
use crate::error::{Error, Result};
use crate::models::gemini::DEFAULT_BASE_URL;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub gemini: GeminiConfig,
    pub chat: ChatConfig,
    pub ui: UIConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeminiConfig {
    pub model: String,
    pub api_endpoint: String,
    /// Environment variables searched, in order, for the API key.
    pub api_key_env: Vec<String>,
    pub timeout_seconds: u64,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChatConfig {
    pub greeting: String,
    pub offline_reply: String,
    pub failure_reply: String,
    pub empty_reply: String,
    /// Hard limit on one exchange; expiry is handled like a transport failure.
    pub reply_deadline_seconds: u64,
    /// Replaces the built-in persona prompt when set.
    pub system_instruction: Option<String>,
    /// Earlier turns replayed with each request; unset replays the whole
    /// conversation.
    pub max_history_turns: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UIConfig {
    pub theme: String,
    pub tick_rate_ms: u64,
    pub start_open: bool,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            api_endpoint: DEFAULT_BASE_URL.to_string(),
            api_key_env: vec!["GEMINI_API_KEY".to_string(), "API_KEY".to_string()],
            timeout_seconds: 60,
            temperature: None,
            max_output_tokens: None,
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            greeting: persona::GREETING.to_string(),
            offline_reply: persona::OFFLINE_REPLY.to_string(),
            failure_reply: persona::FAILURE_REPLY.to_string(),
            empty_reply: persona::EMPTY_REPLY.to_string(),
            reply_deadline_seconds: 30,
            system_instruction: None,
            max_history_turns: None,
        }
    }
}

impl Default for UIConfig {
    fn default() -> Self {
        Self {
            theme: "arctic".to_string(),
            tick_rate_ms: 250,
            start_open: false,
        }
    }
}

impl ChatConfig {
    pub fn reply_deadline(&self) -> Duration {
        Duration::from_secs(self.reply_deadline_seconds)
    }

    /// The prompt the conversation is configured with.
    pub fn resolved_system_instruction(&self) -> String {
        self.system_instruction
            .clone()
            .unwrap_or_else(persona::system_instruction)
    }
}

impl GeminiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl AppConfig {
    /// Loads `path`, writing the defaults there first if the file is missing.
    pub async fn load_or_create(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("Config file not found, creating default configuration");
            let default_config = Self::default();
            default_config.save(path).await?;
            return Ok(default_config);
        }

        Self::load(path).await
    }

    pub async fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::config(format!("Config file not found: {}", path.display())));
        }

        info!("Loading configuration from: {:?}", path);

        let config_content = fs::read_to_string(path).await?;
        let config: AppConfig = toml::from_str(&config_content)?;

        config.validate()?;

        info!("Configuration loaded successfully");
        Ok(config)
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        info!("Saving configuration to: {:?}", path);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        fs::write(path, self.to_toml()?).await?;

        info!("Configuration saved successfully");
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.gemini.model.trim().is_empty() {
            return Err(Error::validation("gemini.model must not be empty"));
        }
        if self.gemini.api_endpoint.trim().is_empty() {
            return Err(Error::validation("gemini.api_endpoint must not be empty"));
        }
        if self.gemini.api_key_env.iter().all(|name| name.trim().is_empty()) {
            return Err(Error::validation("gemini.api_key_env must name at least one variable"));
        }
        if self.gemini.timeout_seconds == 0 {
            return Err(Error::validation("gemini.timeout_seconds must be positive"));
        }
        if let Some(temperature) = self.gemini.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(Error::validation("gemini.temperature must be between 0 and 2"));
            }
        }

        if self.chat.reply_deadline_seconds == 0 {
            return Err(Error::validation("chat.reply_deadline_seconds must be positive"));
        }
        if self.chat.max_history_turns == Some(0) {
            return Err(Error::validation("chat.max_history_turns must be positive when set"));
        }

        if !(16..=2000).contains(&self.ui.tick_rate_ms) {
            return Err(Error::validation("ui.tick_rate_ms must be between 16 and 2000"));
        }

        Ok(())
    }
}
