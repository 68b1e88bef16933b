use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use super::Pane;
use crate::app::{App, ReplyPreview};
use crate::config::ThemeConfig;
use crate::mail::{Segmented, ThreadMessage};

pub fn collapsed_notice(quoted_lines: usize) -> String {
    let noun = if quoted_lines == 1 { "line" } else { "lines" };
    format!("[{} quoted {}, Tab to expand]", quoted_lines, noun)
}

fn header_lines(message: &ThreadMessage, theme: &ThemeConfig) -> Vec<Line<'static>> {
    let key = Style::default().fg(theme.primary());
    let value = Style::default().fg(theme.fg());
    let mut lines = vec![
        Line::from(vec![
            Span::styled("From: ", key),
            Span::styled(message.from_display(), value),
        ]),
        Line::from(vec![
            Span::styled("Date: ", key),
            Span::styled(message.date.clone().unwrap_or_default(), value),
        ]),
        Line::from(vec![
            Span::styled("Subject: ", key),
            Span::styled(message.subject.clone().unwrap_or_default(), value),
        ]),
    ];
    if !message.tags.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("Tags: ", key),
            Span::styled(message.tags.join(", "), Style::default().fg(theme.secondary())),
        ]));
    }
    lines.push(Line::raw(""));
    lines
}

/// Main part as plain lines, quoted part styled or collapsed
pub fn body_lines(segment: &Segmented, show_quoted: bool, theme: &ThemeConfig) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = segment
        .main
        .split('\n')
        .map(|l| Line::raw(l.trim_end_matches('\r').to_string()))
        .collect();

    if let Some(quoted) = &segment.quoted {
        let style = Style::default().fg(theme.quoted());
        if show_quoted {
            lines.extend(
                quoted
                    .split('\n')
                    .map(|l| Line::styled(l.trim_end_matches('\r').to_string(), style)),
            );
        } else {
            lines.push(Line::styled(
                collapsed_notice(segment.quoted_lines()),
                style.add_modifier(Modifier::ITALIC),
            ));
        }
    }
    lines
}

fn reply_lines(reply: &ReplyPreview, theme: &ThemeConfig) -> Vec<Line<'static>> {
    let key = Style::default().fg(theme.primary());
    let mut lines = vec![
        Line::from(vec![Span::styled("To: ", key), Span::raw(reply.to.clone())]),
        Line::from(vec![
            Span::styled("Subject: ", key),
            Span::raw(reply.subject.clone()),
        ]),
        Line::raw(""),
    ];
    lines.extend(reply.body.split('\n').map(|l| Line::raw(l.to_string())));
    lines
}

pub fn render_reader(f: &mut Frame, area: Rect, app: &App, focused: bool) {
    let theme = &app.config.theme;

    let (title, lines) = match (&app.reply, app.focused_message()) {
        (Some(reply), _) => (" Reply (Esc to close) ".to_string(), reply_lines(reply, theme)),
        (None, Some(message)) => {
            let mut lines = header_lines(message, theme);
            if let Some(segment) = app.focused_segment() {
                let index = app.nav.focused().unwrap_or(0);
                lines.extend(body_lines(segment, app.shows_quoted(index), theme));
            }
            let title = message
                .subject
                .clone()
                .unwrap_or_else(|| "Message".to_string());
            (format!(" {} ", title), lines)
        }
        (None, None) => (" Message ".to_string(), Vec::new()),
    };

    let paragraph = Paragraph::new(lines)
        .block(Pane::new(title, focused, theme).block())
        .wrap(Wrap { trim: false })
        .scroll((app.reader_scroll, 0));

    f.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::segment;

    fn text(lines: &[Line]) -> Vec<String> {
        lines.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn test_collapsed_notice() {
        assert_eq!(collapsed_notice(1), "[1 quoted line, Tab to expand]");
        assert_eq!(collapsed_notice(3), "[3 quoted lines, Tab to expand]");
    }

    #[test]
    fn test_body_lines_collapsed_and_expanded() {
        let theme = ThemeConfig::default();
        let segment = segment("Hello\n--\nAlice");

        assert_eq!(
            text(&body_lines(&segment, false, &theme)),
            vec!["Hello", "[2 quoted lines, Tab to expand]"]
        );
        assert_eq!(
            text(&body_lines(&segment, true, &theme)),
            vec!["Hello", "--", "Alice"]
        );
    }

    #[test]
    fn test_body_lines_without_quote() {
        let theme = ThemeConfig::default();
        let segment = segment("Just this");
        assert_eq!(text(&body_lines(&segment, false, &theme)), vec!["Just this"]);
    }
}
