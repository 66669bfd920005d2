use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::app::{AppState, ProviderStatus};
use crate::chat::{persona, ChatSessionManager, ChatWidget, FallbackReason, Reply};
use crate::tui::{
    components::{
        ChatView, Component, ConnectionStatus, HelpPopup, InputBox, KeyHint, Showcase, StatusBar,
    },
    Event, Theme,
};

const WIDGET_WIDTH: u16 = 56;
const WIDGET_HEIGHT: u16 = 22;

pub struct App {
    // Components
    showcase: Showcase,
    chat_view: ChatView,
    input_box: InputBox,
    status_bar: StatusBar,
    help_popup: HelpPopup,

    // State
    widget: ChatWidget,
    theme: Theme,
    should_quit: bool,
    offline: bool,

    // Backend integration
    manager: Arc<ChatSessionManager>,
    event_sender: mpsc::UnboundedSender<Event>,
}

impl App {
    pub fn new(
        app_state: &AppState,
        manager: Arc<ChatSessionManager>,
        event_sender: mpsc::UnboundedSender<Event>,
    ) -> Self {
        let config = app_state.get_config();
        let theme = Theme::from_name(&config.ui.theme).unwrap_or_else(|| {
            warn!(theme = %config.ui.theme, "Unknown theme, using arctic");
            Theme::arctic()
        });
        let offline = app_state.get_provider_status() == ProviderStatus::MissingCredentials;

        let mut status_bar = StatusBar::new();
        status_bar.set_model_info("gemini", &config.gemini.model);
        status_bar.set_connection_status(if offline {
            ConnectionStatus::Offline
        } else {
            ConnectionStatus::Ready
        });

        let mut app = Self {
            showcase: Showcase::new(),
            chat_view: ChatView::new(),
            input_box: InputBox::new(),
            status_bar,
            help_popup: HelpPopup::new(),
            widget: app_state.new_widget(),
            theme,
            should_quit: false,
            offline,
            manager,
            event_sender,
        };

        app.chat_view.sync(&mut app.widget);
        app.update_focus();
        app
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn widget(&self) -> &ChatWidget {
        &self.widget
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => {
                // Help popup takes priority
                if self.help_popup.handle_event(&Event::Key(key)) {
                    return;
                }
                if self.handle_global_keys(key) {
                    return;
                }
                if self.widget.is_open() {
                    self.handle_chat_keys(key);
                } else {
                    self.handle_showcase_keys(key);
                }
            }
            Event::ReplyReceived(reply) => self.handle_reply(reply),
            Event::Tick => self.chat_view.tick(),
            Event::Resize(_, _) => {}
        }
    }

    fn handle_global_keys(&mut self, key: KeyEvent) -> bool {
        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL)
            | (KeyCode::Char('q'), KeyModifiers::CONTROL) => {
                self.should_quit = true;
                true
            }
            (KeyCode::F(1), _) => {
                self.help_popup.toggle();
                true
            }
            (KeyCode::Char('g'), KeyModifiers::CONTROL) | (KeyCode::F(2), _) => {
                self.toggle_chat();
                true
            }
            _ => false,
        }
    }

    fn handle_chat_keys(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.toggle_chat(),
            KeyCode::Enter => self.submit(),
            KeyCode::Up
            | KeyCode::Down
            | KeyCode::PageUp
            | KeyCode::PageDown
            | KeyCode::Home
            | KeyCode::End => {
                self.chat_view.handle_event(&Event::Key(key));
            }
            _ => {
                if self.input_box.handle_event(&Event::Key(key)) {
                    self.widget.update_draft(self.input_box.get_content());
                }
            }
        }
    }

    fn handle_showcase_keys(&mut self, key: KeyEvent) {
        if self.showcase.handle_event(&Event::Key(key)) {
            return;
        }

        if key.code == KeyCode::Enter {
            if let Some(product) = self.showcase.selected_product() {
                let question = Showcase::question_about(&product);
                self.input_box.set_content(question.clone());
                self.widget.update_draft(question);
                self.toggle_chat();
            }
        }
    }

    fn toggle_chat(&mut self) {
        self.widget.toggle_open();
        self.chat_view.sync(&mut self.widget);
        self.update_focus();
    }

    fn submit(&mut self) {
        let Some(pending) = self.widget.submit() else {
            if self.widget.is_sending() {
                self.status_bar.set_status("Гид ещё отвечает...");
            }
            return;
        };

        self.input_box.clear();
        self.input_box.set_locked(true);
        self.chat_view.sync(&mut self.widget);
        self.status_bar.set_connection_status(ConnectionStatus::Sending);
        self.status_bar.set_status("Ждём ответа гида...");

        let manager = self.manager.clone();
        let sender = self.event_sender.clone();
        tokio::spawn(async move {
            let reply = pending.run(&manager).await;
            if sender.send(Event::ReplyReceived(reply)).is_err() {
                debug!("UI closed before the reply arrived");
            }
        });
    }

    fn handle_reply(&mut self, reply: Reply) {
        let status = match reply.fallback_reason() {
            None | Some(FallbackReason::EmptyPayload) => ConnectionStatus::Ready,
            Some(FallbackReason::MissingCredential) => ConnectionStatus::Offline,
            Some(FallbackReason::Transport(_)) | Some(FallbackReason::Timeout(_)) => {
                ConnectionStatus::Degraded("нет связи".to_string())
            }
        };

        self.widget.complete_send(reply.into_text());
        self.input_box.set_locked(false);
        self.chat_view.sync(&mut self.widget);
        self.status_bar.set_connection_status(status);
        self.update_status_for_focus();
    }

    fn update_focus(&mut self) {
        if self.widget.is_open() {
            self.input_box.focus();
            self.chat_view.focus();
        } else {
            self.input_box.unfocus();
            self.chat_view.unfocus();
        }
        self.update_status_key_hints();
        self.update_status_for_focus();
    }

    fn update_status_key_hints(&mut self) {
        let key_hints = if self.widget.is_open() {
            vec![
                KeyHint::new("Enter", "Отправить"),
                KeyHint::new("↑/↓", "Прокрутка"),
                KeyHint::new("Esc", "Закрыть"),
                KeyHint::new("F1", "Справка"),
            ]
        } else {
            vec![
                KeyHint::new("↑/↓", "Продукт"),
                KeyHint::new("Enter", "Спросить"),
                KeyHint::new("Ctrl+G", "Чат"),
                KeyHint::new("F1", "Справка"),
                KeyHint::new("Ctrl+Q", "Выход"),
            ]
        };
        self.status_bar.set_key_hints(key_hints);
    }

    fn update_status_for_focus(&mut self) {
        let message = if self.widget.is_sending() {
            "Ждём ответа гида..."
        } else if self.widget.is_open() {
            if self.offline {
                "Демо-режим: ключ API не задан"
            } else {
                "Спросите о восстановлении"
            }
        } else {
            "Выберите продукт или откройте чат"
        };
        self.status_bar.set_status(message);
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let screen = frame.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // Landing page
                Constraint::Length(2), // Status bar
            ])
            .split(screen);

        frame.render_widget(Block::default().style(self.theme.normal()), chunks[0]);
        self.showcase.render(frame, chunks[0], &self.theme);

        if self.widget.is_open() {
            self.render_chat_widget(frame, chunks[0]);
        } else {
            self.render_toggle_button(frame, chunks[0]);
        }

        self.status_bar.render(frame, chunks[1], &self.theme);

        // Render help popup last (on top)
        self.help_popup.render(frame, screen, &self.theme);
    }

    /// Bottom-right corner of `area`, clipped to fit.
    fn corner_rect(area: Rect, width: u16, height: u16) -> Rect {
        let width = width.min(area.width.saturating_sub(2));
        let height = height.min(area.height);
        Rect {
            x: area.right().saturating_sub(width + 1),
            y: area.bottom().saturating_sub(height),
            width,
            height,
        }
    }

    fn render_chat_widget(&mut self, frame: &mut Frame, area: Rect) {
        let widget_area = Self::corner_rect(area, WIDGET_WIDTH, WIDGET_HEIGHT);
        frame.render_widget(Clear, widget_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.accent())
            .title(format!(" ❄ {} ", persona::GUIDE_NAME))
            .style(self.theme.panel());
        let inner = block.inner(widget_area);
        frame.render_widget(block, widget_area);

        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // Transcript
                Constraint::Length(3), // Input box
            ])
            .split(inner);

        self.chat_view.render(frame, parts[0], &self.theme);
        self.input_box.render(frame, parts[1], &self.theme);
    }

    fn render_toggle_button(&self, frame: &mut Frame, area: Rect) {
        let button_area = Self::corner_rect(area, 16, 3);
        frame.render_widget(Clear, button_area);

        let button = Paragraph::new("💬 Ctrl+G")
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(self.theme.accent()),
            )
            .style(self.theme.selected());
        frame.render_widget(button, button_area);
    }
}
