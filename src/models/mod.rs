pub mod gemini;
pub mod provider;

pub use gemini::GeminiProvider;
pub use provider::{
    ChatRequest, ChatResponse, Message, MessageRole, ModelProvider, TokenUsage,
};
