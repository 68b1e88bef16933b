use crossterm::event::KeyCode;
use ratatui::{layout::Rect, widgets::ListState};
use std::collections::HashSet;
use std::sync::Arc;

use crate::config::Config;
use crate::mail::{
    Message, NavEvent, NavigationController, Segmented, ThreadMessage, filter_thread,
    quote_for_reply, reply_subject, segment_all,
};

/// Reply draft shown in the reader pane
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplyPreview {
    pub to: String,
    pub subject: String,
    pub body: String,
}

pub struct App {
    pub config: Arc<Config>,
    pub thread_id: String,
    pub nav: NavigationController,
    /// Segmented plain-text bodies, in graph order
    pub segments: Vec<Segmented>,
    /// Graph indices whose quoted part is shown in full
    pub expanded: HashSet<usize>,
    pub list_state: ListState,
    pub list_area: Rect,
    pub reader_scroll: u16,
    pub reply: Option<ReplyPreview>,
    pub status_message: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(thread_id: String, messages: Vec<Message>, config: Arc<Config>) -> Self {
        let messages = filter_thread(&messages, config.view.show_deleted);
        let mut nav = NavigationController::new();
        let event = nav.load(&messages);
        let segments = nav.graph().map(segment_all).unwrap_or_default();

        let mut app = Self {
            config,
            thread_id,
            nav,
            segments,
            expanded: HashSet::new(),
            list_state: ListState::default(),
            list_area: Rect::default(),
            reader_scroll: 0,
            reply: None,
            status_message: None,
            should_quit: false,
        };
        if !app.nav.is_ready() {
            app.set_status("Empty thread");
        }
        app.apply(event);
        app
    }

    /// Sync view state after a navigation operation
    fn apply(&mut self, event: NavEvent) {
        if let Some(index) = event.focused() {
            tracing::trace!(?event, "focus changed");
            self.list_state.select(Some(index));
            self.reader_scroll = 0;
            self.reply = None;
        }
    }

    pub fn set_status(&mut self, msg: &str) {
        self.status_message = Some(msg.to_string());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    pub fn focused_message(&self) -> Option<&ThreadMessage> {
        self.nav.focused_message()
    }

    pub fn focused_segment(&self) -> Option<&Segmented> {
        self.nav.focused().and_then(|i| self.segments.get(i))
    }

    pub fn shows_quoted(&self, index: usize) -> bool {
        !self.config.view.collapse_quotes || self.expanded.contains(&index)
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        self.clear_status();
        let page = self.config.view.page_step as isize;

        let event = match code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                return;
            }
            KeyCode::Esc => {
                if self.reply.take().is_none() {
                    self.should_quit = true;
                }
                return;
            }
            KeyCode::Char('j') | KeyCode::Down => self.nav.move_focus(1),
            KeyCode::Char('k') | KeyCode::Up => self.nav.move_focus(-1),
            KeyCode::Char('J') | KeyCode::PageDown => self.nav.move_focus(page),
            KeyCode::Char('K') | KeyCode::PageUp => self.nav.move_focus(-page),
            KeyCode::Char('g') | KeyCode::Home => self.nav.focus_first(),
            KeyCode::Char('G') | KeyCode::End => self.nav.focus_last(),
            KeyCode::Char('h') | KeyCode::Left => self.nav.into_parent(),
            KeyCode::Char('l') | KeyCode::Right => self.nav.into_child(),
            KeyCode::Char('f') => {
                let event = self.nav.toggle_flatten();
                let flattened = self.nav.state().map(|s| s.flattened).unwrap_or(false);
                self.set_status(if flattened { "Flat view" } else { "Thread view" });
                event
            }
            KeyCode::Char(c @ '1'..='9') => {
                let depth = c.to_digit(10).unwrap_or(1) as usize;
                self.nav.jump_to(depth)
            }
            KeyCode::Tab => {
                self.toggle_quoted();
                return;
            }
            KeyCode::Char('r') => {
                self.start_reply();
                return;
            }
            KeyCode::Char('d') => {
                self.reader_scroll = self.reader_scroll.saturating_add(3);
                return;
            }
            KeyCode::Char('u') => {
                self.reader_scroll = self.reader_scroll.saturating_sub(3);
                return;
            }
            _ => return,
        };

        self.apply(event);
    }

    /// Expand or collapse the quoted part of the focused message
    pub fn toggle_quoted(&mut self) {
        let Some(index) = self.nav.focused() else {
            return;
        };
        if self.segments.get(index).and_then(|s| s.quoted.as_ref()).is_none() {
            self.set_status("No quoted text");
            return;
        }
        if !self.expanded.remove(&index) {
            self.expanded.insert(index);
        }
    }

    /// Draft a reply quoting the focused message
    pub fn start_reply(&mut self) {
        let Some(message) = self.nav.focused_message() else {
            return;
        };
        let reply = ReplyPreview {
            to: message
                .from
                .as_ref()
                .map(|a| a.addr.clone())
                .unwrap_or_default(),
            subject: reply_subject(message.subject.as_deref()),
            body: quote_for_reply(message, &self.config.reply.quote_prefix),
        };
        self.reply = Some(reply);
    }

    /// Handle click at (x, y) in the thread list. Clicking a message off the
    /// active path re-derives the path through it.
    pub fn handle_click(&mut self, x: u16, y: u16) -> bool {
        let area = self.list_area;
        if x < area.x || x >= area.x + area.width || y <= area.y || y + 1 >= area.y + area.height {
            return false;
        }
        // +1 for the top border
        let visual_row = (y - area.y - 1) as usize;
        let index = visual_row + self.list_state.offset();
        let event = self.nav.select(index);
        self.apply(event);
        event != NavEvent::Unchanged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thread() -> Vec<Message> {
        vec![
            Message::new("a").with_text("Lunch?"),
            Message::new("b")
                .replying_to("<a>")
                .with_text("Sure\n\nOn Mon Alice wrote:\n> Lunch?"),
            Message::new("c")
                .replying_to("<a>")
                .with_tag("unread")
                .with_text("Can't make it"),
            Message::new("d").replying_to("<c>").with_tag("deleted"),
        ]
    }

    fn app() -> App {
        App::new("t".to_string(), thread(), Arc::new(Config::default()))
    }

    fn focused_id(app: &App) -> String {
        app.focused_message().unwrap().id.clone()
    }

    #[test]
    fn test_loads_on_first_unread_without_deleted() {
        let app = app();
        assert_eq!(app.nav.graph().unwrap().len(), 3);
        assert_eq!(focused_id(&app), "c");
        assert_eq!(app.list_state.selected(), Some(2));
        assert_eq!(app.segments.len(), 3);
    }

    #[test]
    fn test_show_deleted_keeps_message() {
        let mut config = Config::default();
        config.view.show_deleted = true;
        let app = App::new("t".to_string(), thread(), Arc::new(config));
        assert_eq!(app.nav.graph().unwrap().len(), 4);
        assert_eq!(focused_id(&app), "c");
    }

    #[test]
    fn test_empty_thread() {
        let mut app = App::new("t".to_string(), Vec::new(), Arc::new(Config::default()));
        assert!(!app.nav.is_ready());
        assert_eq!(app.status_message.as_deref(), Some("Empty thread"));
        app.handle_key(KeyCode::Char('j'));
        app.handle_key(KeyCode::Tab);
        app.handle_key(KeyCode::Char('r'));
        assert!(app.reply.is_none());
    }

    #[test]
    fn test_navigation_keys() {
        let mut app = app();
        app.handle_key(KeyCode::Char('k'));
        assert_eq!(focused_id(&app), "a");
        app.handle_key(KeyCode::Char('G'));
        assert_eq!(focused_id(&app), "c");
        app.handle_key(KeyCode::Char('h'));
        assert_eq!(focused_id(&app), "a");
        // a -> b is run 1, so the path now goes through b
        app.handle_key(KeyCode::Char('J'));
        assert_eq!(focused_id(&app), "b");
        app.handle_key(KeyCode::Char('l'));
        assert_eq!(focused_id(&app), "c");
        app.handle_key(KeyCode::Char('1'));
        assert_eq!(focused_id(&app), "a");
    }

    #[test]
    fn test_flatten_key() {
        let mut app = app();
        app.handle_key(KeyCode::Char('f'));
        assert_eq!(app.status_message.as_deref(), Some("Flat view"));
        assert_eq!(app.nav.state().unwrap().path().len(), 3);
        app.handle_key(KeyCode::Char('f'));
        assert_eq!(app.status_message.as_deref(), Some("Thread view"));
        assert_eq!(focused_id(&app), "c");
    }

    #[test]
    fn test_toggle_quoted() {
        let mut app = app();
        app.handle_key(KeyCode::Tab);
        assert_eq!(app.status_message.as_deref(), Some("No quoted text"));

        app.nav.select_id("b");
        assert!(!app.shows_quoted(1));
        app.handle_key(KeyCode::Tab);
        assert!(app.shows_quoted(1));
        app.handle_key(KeyCode::Tab);
        assert!(!app.shows_quoted(1));
    }

    #[test]
    fn test_reply_and_escape() {
        let mut app = app();
        app.handle_key(KeyCode::Char('r'));
        let reply = app.reply.clone().unwrap();
        assert_eq!(reply.subject, "Re: ");
        assert!(reply.body.ends_with("\n> Can't make it"));

        app.handle_key(KeyCode::Esc);
        assert!(app.reply.is_none());
        assert!(!app.should_quit);
        app.handle_key(KeyCode::Esc);
        assert!(app.should_quit);
    }

    #[test]
    fn test_click_selects_off_path_message() {
        let mut app = app();
        app.list_area = Rect::new(0, 0, 40, 10);
        // Row 2 (after the border) is message b, not on the a -> c path
        assert!(app.handle_click(5, 2));
        assert_eq!(focused_id(&app), "b");
        assert!(!app.handle_click(50, 2));
    }

    #[test]
    fn test_click_on_borders_is_ignored() {
        let mut app = app();
        app.list_area = Rect::new(0, 0, 40, 3);
        // Top border, then the only content row, then the bottom border
        assert!(!app.handle_click(5, 0));
        assert!(!app.handle_click(5, 2));
        assert_eq!(focused_id(&app), "c");
        assert!(app.handle_click(5, 1));
        assert_eq!(focused_id(&app), "a");
    }
}
