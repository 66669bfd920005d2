use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{
        block::{Position, Title},
        Block, Borders, Paragraph,
    },
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::chat::persona;
use crate::tui::{components::Component, Event, Theme};

#[derive(Debug, Clone)]
pub struct InputBox {
    input: Input,
    is_focused: bool,
    is_locked: bool,
    placeholder: String,
}

impl InputBox {
    pub fn new() -> Self {
        Self {
            input: Input::default(),
            is_focused: false,
            is_locked: false,
            placeholder: persona::INPUT_PLACEHOLDER.to_string(),
        }
    }

    pub fn focus(&mut self) {
        self.is_focused = true;
    }

    pub fn unfocus(&mut self) {
        self.is_focused = false;
    }

    /// Dims the send hint while a reply is pending. Typing stays possible.
    pub fn set_locked(&mut self, locked: bool) {
        self.is_locked = locked;
    }

    pub fn clear(&mut self) {
        self.input.reset();
    }

    pub fn get_content(&self) -> String {
        self.input.value().to_string()
    }

    pub fn set_content(&mut self, content: String) {
        self.input = Input::new(content);
    }
}

impl Default for InputBox {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let border_style = if self.is_focused && !self.is_locked {
            theme.accent()
        } else {
            theme.border()
        };

        let send_hint = if self.is_locked { " … " } else { " Enter ➤ " };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(
                Title::from(Span::styled(send_hint, theme.secondary()))
                    .position(Position::Bottom)
                    .alignment(Alignment::Right),
            )
            .style(theme.normal());

        // Calculate available width for text (excluding borders)
        let available_width = area.width.saturating_sub(2) as usize;

        if self.input.value().is_empty() {
            let content = Line::from(Span::styled(&self.placeholder, theme.secondary()));
            frame.render_widget(Paragraph::new(content).block(block), area);
            if self.is_focused {
                frame.set_cursor(area.x + 1, area.y + 1);
            }
            return;
        }

        let scroll = self.input.visual_scroll(available_width.saturating_sub(1));
        let paragraph = Paragraph::new(self.input.value())
            .block(block)
            .scroll((0, scroll as u16));
        frame.render_widget(paragraph, area);

        if self.is_focused {
            let cursor_x = area.x + 1 + (self.input.visual_cursor().saturating_sub(scroll)) as u16;
            if cursor_x < area.x + area.width.saturating_sub(1) {
                frame.set_cursor(cursor_x, area.y + 1);
            }
        }
    }

    fn handle_event(&mut self, event: &Event) -> bool {
        if !self.is_focused {
            return false;
        }

        match event {
            Event::Key(key) => {
                match key.code {
                    // Let parent handle send
                    KeyCode::Enter => false,
                    _ => {
                        // Leave Ctrl/Alt chords to global hotkeys
                        if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
                            false
                        } else {
                            self.input.handle_event(&crossterm::event::Event::Key(*key));
                            true
                        }
                    }
                }
            }
            _ => false,
        }
    }
}
