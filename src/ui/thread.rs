use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem},
    Frame,
};

use super::Pane;
use crate::app::App;
use crate::mail::{ThreadMessage, preview};

/// Indentation plus a marker showing whether the row is on the active path
pub fn depth_marker(depth: usize, indent_width: usize, on_path: bool) -> String {
    let mut marker = " ".repeat(depth.saturating_sub(1) * indent_width);
    marker.push_str(if on_path { "● " } else { "○ " });
    marker
}

/// Single-character state flag: deleted wins over unread
pub fn state_flag(message: &ThreadMessage) -> &'static str {
    if message.is_deleted() {
        "x"
    } else if message.is_unread() {
        "*"
    } else {
        " "
    }
}

fn truncate(s: &str, max: usize) -> String {
    if max < 4 {
        return s.chars().take(max).collect();
    }
    let char_count = s.chars().count();
    if char_count <= max {
        format!("{:width$}", s, width = max)
    } else {
        let truncated: String = s.chars().take(max - 3).collect();
        format!("{}...", truncated)
    }
}

/// One row per message of the whole thread; rows off the active path are dimmed
pub fn render_thread(f: &mut Frame, area: Rect, app: &mut App, focused: bool) {
    let config = app.config.clone();
    let theme = &config.theme;
    let Some(graph) = app.nav.graph() else {
        f.render_widget(Pane::new(" Thread (empty) ", focused, theme).block(), area);
        return;
    };

    let from_width = 18;
    let avail = area.width.saturating_sub(4) as usize;

    let items: Vec<ListItem> = graph
        .messages
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let on_path = app.nav.is_on_path(i);
            let marker = depth_marker(m.depth, config.view.indent_width, on_path);
            let flag = state_flag(m);
            let fixed = marker.chars().count() + flag.len() + from_width + 2;
            let summary = match m.plain_text() {
                Some(text) => preview(text, config.view.preview_width),
                None => m.subject.clone().unwrap_or_else(|| "(no subject)".to_string()),
            };

            let base = if on_path {
                Style::default().fg(theme.fg())
            } else {
                Style::default()
                    .fg(theme.fg_muted())
                    .add_modifier(Modifier::DIM)
            };
            let flag_style = if m.is_deleted() {
                base.fg(theme.deleted())
            } else {
                base.fg(theme.unread())
            };

            ListItem::new(Line::from(vec![
                Span::styled(marker, base),
                Span::styled(flag, flag_style),
                Span::raw(" "),
                Span::styled(truncate(&m.from_display(), from_width), base),
                Span::raw(" "),
                Span::styled(truncate(&summary, avail.saturating_sub(fixed)), base),
            ]))
        })
        .collect();

    let title = match app.nav.state() {
        Some(state) => {
            let depth = app.focused_message().map(|m| m.depth).unwrap_or(0);
            format!(
                " {}{} - {}/{} - depth {}/{} ",
                app.thread_id,
                if state.flattened { " (flat)" } else { "" },
                state.focused_index() + 1,
                state.path().len(),
                depth,
                graph.max_depth,
            )
        }
        None => format!(" {} ", app.thread_id),
    };

    let list = List::new(items)
        .block(Pane::new(title, focused, theme).block())
        .highlight_style(
            Style::default()
                .bg(theme.selected_bg())
                .add_modifier(Modifier::BOLD),
        );

    app.list_area = area;
    f.render_stateful_widget(list, area, &mut app.list_state);
}
