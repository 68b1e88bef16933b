use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub view: ViewConfig,
    pub reply: ReplyConfig,
    pub theme: ThemeConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Directory holding one `<thread>.json` or `<thread>/` per thread
    pub root: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Focus jump for J/K and PageDown/PageUp
    pub page_step: usize,
    /// Keep messages tagged deleted in the thread
    pub show_deleted: bool,
    /// Show quoted text collapsed until expanded with Tab
    pub collapse_quotes: bool,
    /// Columns of indentation per depth level
    pub indent_width: usize,
    /// Characters of body preview on collapsed rows
    pub preview_width: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReplyConfig {
    pub quote_prefix: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub bg_panel: String,
    pub fg: String,
    pub fg_muted: String,
    pub border: String,
    pub border_active: String,
    pub primary: String,
    pub secondary: String,
    pub selected_bg: String,
    pub unread: String,
    pub deleted: String,
    pub quoted: String,
    pub success: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            root: "~/Mail/threads".to_string(),
        }
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            page_step: 10,
            show_deleted: false,
            collapse_quotes: true,
            indent_width: 2,
            preview_width: 72,
        }
    }
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            quote_prefix: "> ".to_string(),
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            bg_panel: "#262422".to_string(),
            fg: "#f7f7f5".to_string(),
            fg_muted: "#8c8985".to_string(),
            border: "#524f4c".to_string(),
            border_active: "#d4a366".to_string(),
            primary: "#d4a366".to_string(),
            secondary: "#8fa5ae".to_string(),
            selected_bg: "#393634".to_string(),
            unread: "#d4a366".to_string(),
            deleted: "#ff4d4f".to_string(),
            quoted: "#8fa5ae".to_string(),
            success: "#52c41a".to_string(),
        }
    }
}

impl Config {
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|p| p.join("threadview/config.toml"))
            .unwrap_or_else(|| PathBuf::from("~/.config/threadview/config.toml"))
    }

    /// Read a config file. A missing file yields the defaults.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Load from `path` or the default location, falling back to the
    /// defaults when the file cannot be used.
    pub fn load(path: Option<&Path>) -> Self {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::default_path);
        match Self::from_path(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring config file");
                Self::default()
            }
        }
    }
}

impl ThemeConfig {
    pub fn bg_panel(&self) -> ratatui::style::Color {
        parse_color(&self.bg_panel)
    }
    pub fn fg(&self) -> ratatui::style::Color {
        parse_color(&self.fg)
    }
    pub fn fg_muted(&self) -> ratatui::style::Color {
        parse_color(&self.fg_muted)
    }
    pub fn border(&self) -> ratatui::style::Color {
        parse_color(&self.border)
    }
    pub fn border_active(&self) -> ratatui::style::Color {
        parse_color(&self.border_active)
    }
    pub fn primary(&self) -> ratatui::style::Color {
        parse_color(&self.primary)
    }
    pub fn secondary(&self) -> ratatui::style::Color {
        parse_color(&self.secondary)
    }
    pub fn selected_bg(&self) -> ratatui::style::Color {
        parse_color(&self.selected_bg)
    }
    pub fn unread(&self) -> ratatui::style::Color {
        parse_color(&self.unread)
    }
    pub fn deleted(&self) -> ratatui::style::Color {
        parse_color(&self.deleted)
    }
    pub fn quoted(&self) -> ratatui::style::Color {
        parse_color(&self.quoted)
    }
    pub fn success(&self) -> ratatui::style::Color {
        parse_color(&self.success)
    }
}

/// Parse color string to ratatui Color
pub fn parse_color(s: &str) -> ratatui::style::Color {
    use ratatui::style::Color;

    // Try hex first (#RRGGBB)
    if s.starts_with('#') && s.len() == 7 && s.is_ascii() {
        if let (Ok(r), Ok(g), Ok(b)) = (
            u8::from_str_radix(&s[1..3], 16),
            u8::from_str_radix(&s[3..5], 16),
            u8::from_str_radix(&s[5..7], 16),
        ) {
            return Color::Rgb(r, g, b);
        }
    }

    match s.to_lowercase().as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "gray" | "grey" => Color::Gray,
        "darkgray" | "darkgrey" => Color::DarkGray,
        _ => Color::White,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.view.page_step, 10);
        assert!(!config.view.show_deleted);
        assert!(config.view.collapse_quotes);
        assert_eq!(config.reply.quote_prefix, "> ");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r##"
            [view]
            page_step = 5
            show_deleted = true

            [theme]
            primary = "#ff0000"
            "##,
        )
        .unwrap();
        assert_eq!(config.view.page_step, 5);
        assert!(config.view.show_deleted);
        assert_eq!(config.view.indent_width, 2);
        assert_eq!(config.theme.primary(), Color::Rgb(255, 0, 0));
        assert_eq!(config.source.root, "~/Mail/threads");
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert_eq!(Config::from_path(&missing).unwrap().view.page_step, 10);

        let bad = dir.path().join("bad.toml");
        std::fs::write(&bad, "view = [").unwrap();
        assert!(matches!(Config::from_path(&bad), Err(ConfigError::Parse(_))));
        assert_eq!(Config::load(Some(&bad)).view.page_step, 10);

        let good = dir.path().join("good.toml");
        std::fs::write(&good, "[reply]\nquote_prefix = \"| \"\n").unwrap();
        assert_eq!(Config::load(Some(&good)).reply.quote_prefix, "| ");
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#1a1917"), Color::Rgb(0x1a, 0x19, 0x17));
        assert_eq!(parse_color("Cyan"), Color::Cyan);
        assert_eq!(parse_color("#zzzzzz"), Color::White);
        assert_eq!(parse_color("#aé123"), Color::White);
        assert_eq!(parse_color("#ffé"), Color::White);
    }
}
