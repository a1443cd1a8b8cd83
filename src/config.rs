use anyhow::{Context, Result};
use ratatui::style::Color;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::{gate::PASSWORD_HASH, render::RenderMode};

const DEFAULT_ACCENT: Color = Color::Yellow;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Location opened when none is given on the command line.
    pub source: String,
    pub password_hash: String,
    /// Accent as `#rrggbb`.
    pub theme_color: Option<String>,
    /// At or below this many columns, picking a chapter closes the side panel.
    pub narrow_width: u16,
    pub markdown: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: ".".to_string(),
            password_hash: PASSWORD_HASH.to_string(),
            theme_color: None,
            narrow_width: 80,
            markdown: true,
        }
    }
}

impl Config {
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config/rnovel/config.toml"))
    }

    /// Loads the user config; a missing file yields the defaults.
    pub fn load() -> Result<Self> {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn accent(&self) -> Color {
        self.theme_color
            .as_deref()
            .and_then(parse_hex_color)
            .unwrap_or(DEFAULT_ACCENT)
    }

    pub fn render_mode(&self) -> RenderMode {
        if self.markdown { RenderMode::Markdown } else { RenderMode::Plain }
    }
}

/// Accent from the config file on disk, falling back to the default on any
/// problem. Polled by the config watcher.
pub fn load_accent() -> Color {
    Config::load().map(|c| c.accent()).unwrap_or(DEFAULT_ACCENT)
}

pub fn parse_hex_color(val: &str) -> Option<Color> {
    let val = val.trim().trim_matches('"').trim_matches('\'');
    let hex = val.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.accent(), Color::Yellow);
        assert_eq!(config.render_mode(), RenderMode::Markdown);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let text = concat!(
            "source = \"https://example.com/novel/\"\n",
            "theme_color = \"#ff8800\"\n",
            "markdown = false\n",
        );
        std::fs::write(&path, text).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.source, "https://example.com/novel/");
        assert_eq!(config.accent(), Color::Rgb(0xff, 0x88, 0x00));
        assert_eq!(config.render_mode(), RenderMode::Plain);
        assert_eq!(config.password_hash, PASSWORD_HASH);
        assert_eq!(config.narrow_width, 80);
    }

    #[test]
    fn broken_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "narrow_width = \"wide\"").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn hex_colors() {
        assert_eq!(parse_hex_color("#000000"), Some(Color::Rgb(0, 0, 0)));
        assert_eq!(parse_hex_color("'#A0b1C2'"), Some(Color::Rgb(0xa0, 0xb1, 0xc2)));
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color("00ff00"), None);
        assert_eq!(parse_hex_color("#gg0000"), None);
    }
}
