use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::config::ThemeConfig;

pub fn render_help(
    f: &mut Frame,
    area: Rect,
    replying: bool,
    status: Option<&str>,
    theme: &ThemeConfig,
) {
    let key_style = Style::default().fg(theme.primary());
    let text_style = Style::default().fg(theme.fg_muted());

    let help_text = if replying {
        vec![
            Span::styled("Esc", key_style),
            Span::styled(" close reply  ", text_style),
            Span::styled("q", key_style),
            Span::styled(" quit", text_style),
        ]
    } else {
        vec![
            Span::styled("j/k", key_style),
            Span::styled(" nav  ", text_style),
            Span::styled("J/K", key_style),
            Span::styled(" page  ", text_style),
            Span::styled("g/G", key_style),
            Span::styled(" first/last  ", text_style),
            Span::styled("h/l", key_style),
            Span::styled(" depth  ", text_style),
            Span::styled("1-9", key_style),
            Span::styled(" jump  ", text_style),
            Span::styled("f", key_style),
            Span::styled(" flat  ", text_style),
            Span::styled("Tab", key_style),
            Span::styled(" quoted  ", text_style),
            Span::styled("d/u", key_style),
            Span::styled(" scroll  ", text_style),
            Span::styled("r", key_style),
            Span::styled(" reply  ", text_style),
            Span::styled("q", key_style),
            Span::styled(" quit", text_style),
        ]
    };

    let mut line = Line::from(help_text);

    if let Some(msg) = status {
        line.spans
            .push(Span::styled("  │  ", Style::default().fg(theme.border())));
        line.spans
            .push(Span::styled(msg, Style::default().fg(theme.success())));
    }

    let paragraph = Paragraph::new(line).style(Style::default().bg(theme.bg_panel()));

    f.render_widget(paragraph, area);
}
