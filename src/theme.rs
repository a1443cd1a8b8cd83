//! Light/dark display theme.

use ratatui::style::{Color, Modifier, Style};

use crate::storage::{KeyValueStore, THEME_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn name(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn palette(self, accent: Color) -> Palette {
        match self {
            Theme::Light => Palette {
                bg: Color::Rgb(0xFA, 0xF8, 0xF2),
                fg: Color::Rgb(0x2B, 0x2B, 0x2B),
                muted: Color::Rgb(0x88, 0x88, 0x88),
                accent,
                error: Color::Rgb(0xC6, 0x28, 0x28),
            },
            Theme::Dark => Palette {
                bg: Color::Rgb(0x1E, 0x1E, 0x1E),
                fg: Color::Rgb(0xDC, 0xDC, 0xDC),
                muted: Color::Rgb(0x80, 0x80, 0x80),
                accent,
                error: Color::Rgb(0xEF, 0x53, 0x50),
            },
        }
    }
}

/// Stored theme, or the default when nothing (or garbage) is stored.
pub fn load(store: &dyn KeyValueStore) -> Theme {
    store.get(THEME_KEY).and_then(|name| Theme::parse(&name)).unwrap_or_default()
}

/// Flips `current` and persists the result.
pub fn toggle(current: Theme, store: &mut dyn KeyValueStore) -> Theme {
    let next = current.toggled();
    if let Err(e) = store.set(THEME_KEY, next.name()) {
        tracing::warn!(error = %e, "could not persist theme");
    }
    next
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub bg: Color,
    pub fg: Color,
    pub muted: Color,
    pub accent: Color,
    pub error: Color,
}

impl Palette {
    pub fn base(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    pub fn dim(&self) -> Style {
        Style::default().fg(self.muted).bg(self.bg)
    }

    pub fn title(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    /// Selected row: dark text on the accent color.
    pub fn highlight(&self) -> Style {
        Style::default().fg(Color::Black).bg(self.accent)
    }
}
