use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const TAG_UNREAD: &str = "unread";
pub const TAG_DELETED: &str = "deleted";

/// Body key read by the quote segmenter
pub const BODY_PLAIN: &str = "text/plain";
pub const BODY_HTML: &str = "text/html";

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Address {
    pub name: Option<String>,
    pub addr: String,
}

impl Address {
    pub fn display(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.addr.clone())
    }
}

/// A message as delivered by the thread source. Never mutated by the core.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct Message {
    pub id: String,
    /// Back-reference token (`<id>`) of the message this one replies to.
    /// May point outside the current thread.
    #[serde(default, alias = "in_reply_to")]
    pub reply_to_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Content kind (`text/plain`, `text/html`) -> raw text
    #[serde(default)]
    pub body: BTreeMap<String, String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub from: Option<Address>,
    #[serde(default)]
    pub to: Option<Address>,
}

impl Message {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn replying_to(mut self, reply_to_id: impl Into<String>) -> Self {
        self.reply_to_id = Some(reply_to_id.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.body.insert(BODY_PLAIN.to_string(), text.into());
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn is_unread(&self) -> bool {
        self.has_tag(TAG_UNREAD)
    }

    pub fn is_deleted(&self) -> bool {
        self.has_tag(TAG_DELETED)
    }

    pub fn plain_text(&self) -> Option<&str> {
        self.body.get(BODY_PLAIN).map(|s| s.as_str())
    }

    /// True if `reply_to_id` references the message with `id`.
    pub fn replies_to(&self, id: &str) -> bool {
        self.reply_to_id
            .as_deref()
            .map(|r| strip_reference(r) == id)
            .unwrap_or(false)
    }

    pub fn from_display(&self) -> String {
        match &self.from {
            Some(addr) => addr.display(),
            None => "(unknown)".to_string(),
        }
    }
}

/// Wrap an id as a back-reference token: `foo@bar` -> `<foo@bar>`
pub fn back_reference(id: &str) -> String {
    format!("<{}>", strip_reference(id))
}

/// Strip angle brackets from a back-reference token: `<foo@bar>` -> `foo@bar`
pub fn strip_reference(s: &str) -> &str {
    let s = s.trim();
    if s.starts_with('<') && s.ends_with('>') && s.len() >= 2 {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

/// A message plus the generation number assigned by the thread builder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadMessage {
    pub message: Message,
    pub depth: usize,
}

impl std::ops::Deref for ThreadMessage {
    type Target = Message;

    fn deref(&self) -> &Message {
        &self.message
    }
}
