use crossterm::event::KeyCode;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::chat::persona::{Product, CATALOG, RECOVERY_TIPS};
use crate::tui::{components::Component, Event, Theme};

const BRAND: &str = "A R C T I C   B E A R";
const TAGLINE: &str = "Терапия холодом для тех, кто восстанавливается всерьёз";

/// Landing screen behind the chat widget: brand, product line-up and tips.
pub struct Showcase {
    state: ListState,
}

impl Showcase {
    pub fn new() -> Self {
        let mut state = ListState::default();
        state.select(Some(0));
        Self { state }
    }

    pub fn selected_product(&self) -> Option<Product> {
        self.state.selected().and_then(|i| CATALOG.get(i).copied())
    }

    pub fn select_next(&mut self) {
        let i = match self.state.selected() {
            Some(i) if i + 1 < CATALOG.len() => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        let i = match self.state.selected() {
            Some(0) | None => CATALOG.len() - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    /// Question pre-filled into the chat when a product is picked.
    pub fn question_about(product: &Product) -> String {
        format!("Расскажи про {}", product.name)
    }
}

impl Default for Showcase {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for Showcase {
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4), // Hero
                Constraint::Min(6),    // Products
                Constraint::Length(5), // Tips
            ])
            .split(area);

        let hero = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(BRAND, theme.highlight().add_modifier(Modifier::BOLD))),
            Line::from(Span::styled(TAGLINE, theme.secondary())),
        ])
        .alignment(Alignment::Center)
        .style(theme.normal());
        frame.render_widget(hero, chunks[0]);

        let items: Vec<ListItem> = CATALOG
            .iter()
            .map(|p| {
                ListItem::new(vec![
                    Line::from(vec![
                        Span::styled(p.name, theme.highlight()),
                        Span::raw("  "),
                        Span::styled(format!("${}", p.price_usd), theme.warning()),
                    ]),
                    Line::from(Span::styled(format!("  {}", p.summary), theme.secondary())),
                ])
            })
            .collect();

        let products = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(theme.border())
                    .title(" Линейка "),
            )
            .highlight_style(theme.selected())
            .highlight_symbol("❄ ")
            .style(theme.normal());
        frame.render_stateful_widget(products, chunks[1], &mut self.state);

        let tips: Vec<Line> = RECOVERY_TIPS
            .iter()
            .map(|tip| Line::from(vec![Span::styled("• ", theme.accent()), Span::raw(*tip)]))
            .collect();
        let tips = Paragraph::new(tips)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(theme.border())
                    .title(" Протокол "),
            )
            .wrap(Wrap { trim: true })
            .style(theme.normal());
        frame.render_widget(tips, chunks[2]);
    }

    fn handle_event(&mut self, event: &Event) -> bool {
        match event {
            Event::Key(key) => match key.code {
                KeyCode::Down => {
                    self.select_next();
                    true
                }
                KeyCode::Up => {
                    self.select_previous();
                    true
                }
                _ => false,
            },
            _ => false,
        }
    }
}
