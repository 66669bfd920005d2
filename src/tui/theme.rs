use ratatui::style::{Color, Modifier, Style};

#[derive(Clone, Debug)]
pub struct Theme {
    pub bg: Color,
    pub panel: Color,
    pub fg: Color,
    pub accent: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub border: Color,
    pub secondary: Color,
}

impl Theme {
    pub fn arctic() -> Self {
        Self {
            bg: Color::Rgb(2, 6, 23),            // Night sky
            panel: Color::Rgb(15, 23, 42),       // Widget body
            fg: Color::Rgb(226, 232, 240),       // Snow
            accent: Color::Rgb(6, 182, 212),     // Glacier cyan
            success: Color::Rgb(45, 212, 191),   // Teal
            warning: Color::Rgb(250, 204, 21),   // Amber
            error: Color::Rgb(248, 113, 113),    // Red
            border: Color::Rgb(21, 94, 117),     // Deep cyan
            secondary: Color::Rgb(148, 163, 184), // Slate
        }
    }

    pub fn frost() -> Self {
        Self {
            bg: Color::Rgb(240, 249, 255),
            panel: Color::Rgb(255, 255, 255),
            fg: Color::Rgb(15, 23, 42),
            accent: Color::Rgb(8, 145, 178),
            success: Color::Rgb(13, 148, 136),
            warning: Color::Rgb(202, 138, 4),
            error: Color::Rgb(220, 38, 38),
            border: Color::Rgb(125, 211, 252),
            secondary: Color::Rgb(100, 116, 139),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "arctic" | "dark" => Some(Self::arctic()),
            "frost" | "light" => Some(Self::frost()),
            _ => None,
        }
    }

    // Style helpers
    pub fn normal(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    pub fn panel(&self) -> Style {
        Style::default().fg(self.fg).bg(self.panel)
    }

    pub fn accent(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub fn success(&self) -> Style {
        Style::default().fg(self.success)
    }

    pub fn warning(&self) -> Style {
        Style::default().fg(self.warning)
    }

    pub fn error(&self) -> Style {
        Style::default().fg(self.error)
    }

    pub fn highlight(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn secondary(&self) -> Style {
        Style::default().fg(self.secondary)
    }

    pub fn border(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn selected(&self) -> Style {
        Style::default().fg(self.bg).bg(self.accent)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::arctic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(Theme::from_name("Arctic").unwrap().accent, Theme::arctic().accent);
        assert_eq!(Theme::from_name("light").unwrap().bg, Theme::frost().bg);
        assert!(Theme::from_name("neon").is_none());
    }
}
