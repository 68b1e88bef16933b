use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::types::{
    Address, BODY_HTML, BODY_PLAIN, Message, TAG_DELETED, TAG_UNREAD, back_reference,
};

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("thread not found: {0}")]
    NotFound(String),
    #[error("failed to read thread: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to walk thread directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("invalid thread file {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to parse message {0}")]
    Parse(PathBuf),
}

/// Supplies already-fetched threads to the viewer.
pub trait ThreadSource {
    fn list_threads(&self) -> Result<Vec<String>, SourceError>;
    fn fetch_thread(&self, thread_id: &str) -> Result<Vec<Message>, SourceError>;
}

/// Threads stored under one root directory.
///
/// A thread id names either `<root>/<id>.json`, a JSON array of messages,
/// or a directory `<root>/<id>/` of raw RFC 5322 messages (`.eml` files or
/// a maildir `cur`/`new` pair).
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: &str) -> Self {
        Self {
            root: PathBuf::from(shellexpand::tilde(root).into_owned()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ThreadSource for DirSource {
    fn list_threads(&self) -> Result<Vec<String>, SourceError> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            let name = match path.file_name().and_then(|n| n.to_str()) {
                Some(n) if !n.starts_with('.') => n,
                _ => continue,
            };
            if path.is_dir() {
                ids.push(name.to_string());
            } else if let Some(stem) = name.strip_suffix(".json") {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    fn fetch_thread(&self, thread_id: &str) -> Result<Vec<Message>, SourceError> {
        let json_path = self.root.join(format!("{}.json", thread_id));
        if json_path.is_file() {
            return read_json_thread(&json_path);
        }

        let dir = self.root.join(thread_id);
        if dir.is_dir() {
            return read_message_dir(&dir);
        }

        Err(SourceError::NotFound(thread_id.to_string()))
    }
}

pub fn read_json_thread(path: &Path) -> Result<Vec<Message>, SourceError> {
    let content = fs::read_to_string(path)?;
    let messages: Vec<Message> =
        serde_json::from_str(&content).map_err(|source| SourceError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::debug!(path = %path.display(), messages = messages.len(), "loaded json thread");
    Ok(messages)
}

/// Parse every message file below `dir`, in sorted path order
pub fn read_message_dir(dir: &Path) -> Result<Vec<Message>, SourceError> {
    let mut messages = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        let hidden = entry
            .file_name()
            .to_str()
            .map(|n| n.starts_with('.'))
            .unwrap_or(true);
        if !entry.file_type().is_file() || hidden {
            continue;
        }
        messages.push(parse_mail_file(entry.path())?);
    }

    tracing::debug!(dir = %dir.display(), messages = messages.len(), "loaded message directory");
    Ok(messages)
}

/// Parse a single raw message into the core's message shape
pub fn parse_mail_file(path: &Path) -> Result<Message, SourceError> {
    let raw = fs::read(path)?;
    let parsed = mail_parser::MessageParser::default()
        .parse(&raw)
        .ok_or_else(|| SourceError::Parse(path.to_path_buf()))?;

    let id = match parsed.message_id() {
        Some(mid) => mid.to_string(),
        // No Message-ID: fall back to the file name so the id stays stable
        None => path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
            .split(":2,")
            .next()
            .unwrap_or("")
            .to_string(),
    };

    let reply_to_id = parsed
        .header_raw(mail_parser::HeaderName::InReplyTo)
        .and_then(first_message_id)
        .map(|mid| back_reference(&mid));

    let mut body = std::collections::BTreeMap::new();
    if let Some(text) = parsed.body_text(0) {
        body.insert(BODY_PLAIN.to_string(), text.into_owned());
    }
    if let Some(html) = parsed.body_html(0) {
        body.insert(BODY_HTML.to_string(), html.into_owned());
    }

    Ok(Message {
        id,
        reply_to_id,
        tags: parse_tags_from_filename(path),
        body,
        date: parsed.date().map(|d| d.to_rfc3339()),
        subject: parsed.subject().map(|s| s.to_string()),
        from: parsed.from().and_then(convert_address),
        to: parsed.to().and_then(convert_address),
    })
}

fn convert_address(address: &mail_parser::Address) -> Option<Address> {
    let first = address.first()?;
    Some(Address {
        name: first.name().map(|n| n.to_string()),
        addr: first.address().unwrap_or("").to_string(),
    })
}

/// First `<...>` token of a raw header value, without brackets
fn first_message_id(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if let Some(start) = raw.find('<') {
        if let Some(len) = raw[start..].find('>') {
            let mid = raw[start + 1..start + len].trim();
            return (!mid.is_empty()).then(|| mid.to_string());
        }
    }
    raw.split_whitespace().next().map(|s| s.to_string())
}

/// Tags from a maildir filename suffix (e.g. ":2,RS").
/// Files outside a maildir carry no flags and are treated as read.
fn parse_tags_from_filename(path: &Path) -> Vec<String> {
    let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or("");

    let Some(pos) = filename.find(":2,") else {
        return Vec::new();
    };

    let flag_chars = &filename[pos + 3..];
    let mut tags = Vec::new();
    if !flag_chars.contains('S') {
        tags.push(TAG_UNREAD.to_string());
    }
    for c in flag_chars.chars() {
        match c {
            'R' => tags.push("replied".to_string()),
            'F' => tags.push("flagged".to_string()),
            'D' => tags.push("draft".to_string()),
            'T' => tags.push(TAG_DELETED.to_string()),
            'P' => tags.push("passed".to_string()),
            _ => {}
        }
    }
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT_MAIL: &str = "Message-ID: <root@example.com>\r\n\
From: Alice <alice@example.com>\r\n\
To: bob@example.com\r\n\
Subject: Lunch\r\n\
Date: Thu, 15 Jan 2026 10:30:00 +0000\r\n\
\r\n\
Lunch tomorrow?\r\n";

    const REPLY_MAIL: &str = "Message-ID: <reply@example.com>\r\n\
In-Reply-To: <root@example.com>\r\n\
From: Bob <bob@example.com>\r\n\
Subject: Re: Lunch\r\n\
\r\n\
Sure.\r\n\
\r\n\
On Thu, Alice wrote:\r\n\
> Lunch tomorrow?\r\n";

    #[test]
    fn test_first_message_id() {
        assert_eq!(first_message_id("<a@b>"), Some("a@b".to_string()));
        assert_eq!(first_message_id("  <a@b> <c@d>"), Some("a@b".to_string()));
        assert_eq!(first_message_id("bare@id"), Some("bare@id".to_string()));
        assert_eq!(first_message_id("<>"), None);
        assert_eq!(first_message_id("   "), None);
    }

    #[test]
    fn test_tags_from_filename() {
        assert!(parse_tags_from_filename(Path::new("1.eml")).is_empty());
        assert_eq!(
            parse_tags_from_filename(Path::new("cur/123.host:2,RS")),
            vec!["replied"]
        );
        assert_eq!(
            parse_tags_from_filename(Path::new("cur/123.host:2,T")),
            vec!["unread", "deleted"]
        );
    }

    #[test]
    fn test_fetch_message_directory() {
        let root = tempfile::tempdir().unwrap();
        let thread = root.path().join("lunch");
        fs::create_dir(&thread).unwrap();
        fs::write(thread.join("01.eml"), ROOT_MAIL).unwrap();
        fs::write(thread.join("02.eml"), REPLY_MAIL).unwrap();
        fs::write(thread.join(".hidden"), "ignored").unwrap();

        let source = DirSource::new(root.path().to_str().unwrap());
        assert_eq!(source.list_threads().unwrap(), vec!["lunch"]);

        let messages = source.fetch_thread("lunch").unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].id, "root@example.com");
        assert_eq!(messages[0].subject.as_deref(), Some("Lunch"));
        assert_eq!(messages[0].from_display(), "Alice");
        assert!(messages[0].date.is_some());
        assert!(messages[0].reply_to_id.is_none());
        assert_eq!(messages[1].reply_to_id.as_deref(), Some("<root@example.com>"));
        assert!(messages[1].replies_to("root@example.com"));
        assert!(messages[1].plain_text().unwrap().contains("Sure."));
    }

    #[test]
    fn test_fetch_json_thread() {
        let root = tempfile::tempdir().unwrap();
        fs::write(
            root.path().join("t1.json"),
            r#"[{"id":"a"},{"id":"b","reply_to_id":"<a>","tags":["unread"]}]"#,
        )
        .unwrap();
        fs::write(root.path().join("broken.json"), "{not json").unwrap();

        let source = DirSource::new(root.path().to_str().unwrap());
        assert_eq!(source.list_threads().unwrap(), vec!["broken", "t1"]);

        let messages = source.fetch_thread("t1").unwrap();
        assert_eq!(messages.len(), 2);
        assert!(messages[1].is_unread());

        assert!(matches!(
            source.fetch_thread("broken"),
            Err(SourceError::Json { .. })
        ));
        assert!(matches!(
            source.fetch_thread("missing"),
            Err(SourceError::NotFound(_))
        ));
    }
}
