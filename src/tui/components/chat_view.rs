use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::chat::{persona, ChatWidget};
use crate::models::{Message, MessageRole};
use crate::tui::{components::Component, Event, Theme};

const TYPING_FRAMES: [&str; 3] = ["•  ", "•• ", "•••"];

/// Scrollable view of the widget transcript.
///
/// Mirrors the transcript by appending whatever is new, which works because
/// the transcript itself is append-only.
pub struct ChatView {
    messages: Vec<Message>,
    is_focused: bool,
    auto_scroll: bool,
    scroll_offset: usize,
    is_sending: bool,
    frame: usize,
}

impl ChatView {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            is_focused: false,
            auto_scroll: true,
            scroll_offset: 0,
            is_sending: false,
            frame: 0,
        }
    }

    pub fn focus(&mut self) {
        self.is_focused = true;
    }

    pub fn unfocus(&mut self) {
        self.is_focused = false;
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Pulls new transcript entries and the sending flag from the widget,
    /// honouring its scroll request.
    pub fn sync(&mut self, widget: &mut ChatWidget) {
        let transcript = widget.transcript();
        if transcript.len() > self.messages.len() {
            self.messages
                .extend_from_slice(&transcript[self.messages.len()..]);
        }
        self.is_sending = widget.is_sending();

        if widget.take_scroll_request() {
            self.scroll_to_bottom();
        }
    }

    /// Advances the typing indicator animation.
    pub fn tick(&mut self) {
        self.frame = self.frame.wrapping_add(1);
    }

    pub fn scroll_up(&mut self) {
        if self.scroll_offset > 0 {
            self.scroll_offset -= 1;
            self.auto_scroll = false;
        }
    }

    pub fn scroll_down(&mut self) {
        self.scroll_offset += 1;
        // Clamped in render, where auto-scroll is re-enabled at the bottom
        self.auto_scroll = false;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = usize::MAX; // Will be clamped in render
        self.auto_scroll = true;
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll_offset = 0;
        self.auto_scroll = false;
    }

    fn format_timestamp(message: &Message) -> String {
        message
            .created_at()
            .with_timezone(&chrono::Local)
            .format("%H:%M")
            .to_string()
    }

    fn role_label(role: MessageRole, theme: &Theme) -> (&'static str, Style) {
        match role {
            MessageRole::User => ("Вы", theme.success()),
            MessageRole::Assistant => (persona::GUIDE_NAME, theme.highlight()),
        }
    }

    /// Word wrap by display width, so Cyrillic and wide glyphs line up.
    /// Words longer than the line are split.
    fn wrap_text(text: &str, width: usize) -> Vec<String> {
        if width < 10 {
            return vec![text.to_string()];
        }

        let mut lines = Vec::new();
        for line in text.lines() {
            if line.width() <= width {
                lines.push(line.to_string());
                continue;
            }

            let mut current = String::new();
            let mut current_width = 0;
            for word in line.split_whitespace() {
                let word_width = word.width();
                if current_width > 0 && current_width + 1 + word_width > width {
                    lines.push(std::mem::take(&mut current));
                    current_width = 0;
                }

                if word_width > width {
                    for ch in word.chars() {
                        let ch_width = ch.width().unwrap_or(0);
                        if current_width + ch_width > width {
                            lines.push(std::mem::take(&mut current));
                            current_width = 0;
                        }
                        current.push(ch);
                        current_width += ch_width;
                    }
                    continue;
                }

                if current_width > 0 {
                    current.push(' ');
                    current_width += 1;
                }
                current.push_str(word);
                current_width += word_width;
            }
            if !current.is_empty() {
                lines.push(current);
            }
        }

        if lines.is_empty() {
            lines.push(String::new());
        }

        lines
    }

    fn build_lines(&self, content_width: usize, theme: &Theme) -> Vec<Line<'static>> {
        let mut all_lines: Vec<Line> = Vec::new();

        for message in &self.messages {
            let (label, label_style) = Self::role_label(message.role(), theme);
            let alignment = match message.role() {
                MessageRole::User => Alignment::Right,
                MessageRole::Assistant => Alignment::Left,
            };
            let body_style = match message.role() {
                MessageRole::User => theme.accent(),
                MessageRole::Assistant => theme.panel(),
            };

            all_lines.push(
                Line::from(vec![
                    Span::styled(label, label_style),
                    Span::raw(" "),
                    Span::styled(Self::format_timestamp(message), theme.secondary()),
                ])
                .alignment(alignment),
            );

            for line in Self::wrap_text(message.text(), content_width) {
                all_lines.push(Line::from(Span::styled(line, body_style)).alignment(alignment));
            }

            all_lines.push(Line::from(""));
        }

        if self.is_sending {
            let dots = TYPING_FRAMES[self.frame % TYPING_FRAMES.len()];
            all_lines.push(Line::from(Span::styled(dots, theme.accent())));
        }

        all_lines
    }
}

impl Default for ChatView {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for ChatView {
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let border_style = if self.is_focused {
            theme.accent()
        } else {
            theme.border()
        };
        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(border_style)
            .style(theme.panel());

        let content_width = area.width.saturating_sub(2) as usize;
        let content_height = area.height.saturating_sub(1) as usize; // bottom border

        let all_lines = self.build_lines(content_width, theme);
        let total_lines = all_lines.len();
        let max_scroll = total_lines.saturating_sub(content_height);

        if self.auto_scroll || self.scroll_offset >= max_scroll {
            self.scroll_offset = max_scroll;
            // Back at the bottom: follow new messages again
            self.auto_scroll = true;
        }

        let visible_lines: Vec<Line> = all_lines
            .into_iter()
            .skip(self.scroll_offset)
            .take(content_height)
            .collect();

        frame.render_widget(Paragraph::new(visible_lines).block(block), area);
    }

    fn handle_event(&mut self, event: &Event) -> bool {
        match event {
            Event::Key(KeyEvent { code, .. }) => match code {
                KeyCode::Up => {
                    self.scroll_up();
                    true
                }
                KeyCode::Down => {
                    self.scroll_down();
                    true
                }
                KeyCode::Home => {
                    self.scroll_to_top();
                    true
                }
                KeyCode::End => {
                    self.scroll_to_bottom();
                    true
                }
                KeyCode::PageUp => {
                    for _ in 0..10 {
                        self.scroll_up();
                    }
                    true
                }
                KeyCode::PageDown => {
                    for _ in 0..10 {
                        self.scroll_down();
                    }
                    true
                }
                _ => false,
            },
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_by_display_width() {
        let lines = ChatView::wrap_text("Начинайте медленно и дышите глубоко", 12);
        assert_eq!(lines, vec!["Начинайте", "медленно и", "дышите", "глубоко"]);
        assert!(lines.iter().all(|l| l.width() <= 12));
    }

    #[test]
    fn test_wrap_splits_long_words() {
        let lines = ChatView::wrap_text("криотерапиякриотерапия", 10);
        assert_eq!(lines, vec!["криотерапи", "якриотерап", "ия"]);
    }

    #[test]
    fn test_wrap_keeps_blank_text() {
        assert_eq!(ChatView::wrap_text("", 20), vec![String::new()]);
    }

    #[test]
    fn test_sync_appends_and_scrolls() {
        let mut widget = ChatWidget::new("привет");
        let mut view = ChatView::new();

        view.sync(&mut widget);
        assert_eq!(view.message_count(), 1);

        view.scroll_to_top();
        widget.update_draft("вопрос");
        widget.submit().unwrap();
        view.sync(&mut widget);

        assert_eq!(view.message_count(), 2);
        assert!(view.is_sending);
        assert!(view.auto_scroll);

        widget.complete_send("ответ");
        view.sync(&mut widget);
        assert_eq!(view.message_count(), 3);
        assert!(!view.is_sending);
    }
}
