pub mod config;
pub mod state;

pub use config::{AppConfig, ChatConfig, GeminiConfig, UIConfig};
pub use state::{AppState, ProviderStatus};
