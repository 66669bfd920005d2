pub mod manager;
pub mod persona;
pub mod session;
pub mod widget;

pub use manager::{ChatSessionManager, FallbackReason, FallbackReplies, Reply};
pub use session::{ChatSession, LazySession, SessionConfig, SessionProvider};
pub use widget::{ChatWidget, PendingSend};
