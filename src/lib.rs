pub mod app;
pub mod chat;
pub mod error;
pub mod models;
pub mod platform;
pub mod tui;

pub use error::{Error, Result};
