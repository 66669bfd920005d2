use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::tui::{components::Component, Event, Theme};

#[derive(Clone, Debug, PartialEq)]
pub struct KeyHint {
    pub key: String,
    pub action: String,
}

impl KeyHint {
    pub fn new(key: &str, action: &str) -> Self {
        Self {
            key: key.to_string(),
            action: action.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ConnectionStatus {
    Ready,
    Sending,
    Offline,
    /// The last exchange fell back to canned copy
    Degraded(String),
}

pub struct StatusBar {
    status_message: String,
    model_info: String,
    connection_status: ConnectionStatus,
    key_hints: Vec<KeyHint>,
}

impl StatusBar {
    pub fn new() -> Self {
        Self {
            status_message: "Готово".to_string(),
            model_info: String::new(),
            connection_status: ConnectionStatus::Offline,
            key_hints: Vec::new(),
        }
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
    }

    pub fn status(&self) -> &str {
        &self.status_message
    }

    pub fn set_model_info(&mut self, provider: &str, model: &str) {
        self.model_info = format!("{}: {}", provider, model);
    }

    pub fn set_connection_status(&mut self, status: ConnectionStatus) {
        self.connection_status = status;
    }

    pub fn connection_status(&self) -> &ConnectionStatus {
        &self.connection_status
    }

    pub fn set_key_hints(&mut self, hints: Vec<KeyHint>) {
        self.key_hints = hints;
    }

    fn get_connection_indicator(&self, theme: &Theme) -> (&str, &str, Style) {
        match &self.connection_status {
            ConnectionStatus::Ready => ("●", "онлайн", theme.success()),
            ConnectionStatus::Sending => ("◐", "отправка...", theme.warning()),
            ConnectionStatus::Offline => ("○", "офлайн", theme.secondary()),
            ConnectionStatus::Degraded(reason) => ("●", reason.as_str(), theme.error()),
        }
    }
}

impl Default for StatusBar {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for StatusBar {
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let (symbol, label, style) = self.get_connection_indicator(theme);

        let mut spans = vec![
            Span::styled(symbol, style),
            Span::raw(" "),
            Span::styled(label, theme.secondary()),
            Span::raw(" | "),
            Span::styled(&self.model_info, theme.accent()),
            Span::raw(" | "),
            Span::styled(&self.status_message, theme.normal()),
        ];

        for hint in &self.key_hints {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(&hint.key, theme.highlight()));
            spans.push(Span::raw(" "));
            spans.push(Span::styled(&hint.action, theme.secondary()));
        }

        let paragraph = Paragraph::new(Line::from(spans))
            .block(Block::default().borders(Borders::TOP).border_style(theme.border()))
            .alignment(Alignment::Left)
            .style(theme.normal());

        frame.render_widget(paragraph, area);
    }

    fn handle_event(&mut self, _event: &Event) -> bool {
        false // Status bar doesn't handle events
    }
}
