use rayon::prelude::*;

use super::threading::ThreadGraph;
use super::types::Message;

/// A message body split into newly written text and trailing quoted text
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Segmented {
    pub main: String,
    /// Quoted history, signature or forwarded block; `None` if no cut was found
    pub quoted: Option<String>,
}

impl Segmented {
    pub fn quoted_lines(&self) -> usize {
        self.quoted.as_deref().map(|q| q.split('\n').count()).unwrap_or(0)
    }
}

const OUTLOOK_SEPARATOR: &str = "-----Original Message-----";

fn is_quote_marked(line: &str) -> bool {
    line.starts_with('>') || line.starts_with("&gt;")
}

fn is_signature_marker(line: &str) -> bool {
    let line = line.trim_end();
    line == "--" || line == "\u{2014}"
}

/// `On <anything> wrote:`
fn is_reply_header(line: &str) -> bool {
    line.starts_with("On") && line.ends_with("wrote:")
}

fn is_rule(line: &str, c: char) -> bool {
    line.len() >= 2 && line.chars().all(|x| x == c)
}

fn is_separator(line: &str) -> bool {
    line == OUTLOOK_SEPARATOR || is_rule(line, '-') || is_rule(line, '_')
}

/// Split a plain-text body at the first quoted, forwarded or signature block.
///
/// The first line always belongs to the main part. Content lines push the
/// cut forward past themselves, so quoted lines interleaved with replies end
/// up in the main part; only the trailing block is reported as quoted.
/// A cut followed only by blank lines is dropped.
pub fn segment(text: &str) -> Segmented {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut cut: Option<usize> = None;

    for (i, &raw) in lines.iter().enumerate().skip(1) {
        let line = raw.strip_suffix('\r').unwrap_or(raw);

        if is_signature_marker(line) || line.starts_with("From:") {
            cut = Some(i);
            break;
        }

        if is_reply_header(line) {
            cut = Some(i);
            // Inline replies may follow the quoted lines; keep scanning
            if lines[i + 1..].iter().any(|l| is_quote_marked(l)) {
                continue;
            }
            break;
        }

        if is_separator(line) {
            cut = Some(i);
            break;
        }

        if is_quote_marked(line) {
            if cut.is_none() {
                cut = Some(i);
            }
            continue;
        }

        if line.trim().chars().count() > 1 {
            cut = Some(i + 1);
        }
    }

    let cut = cut.filter(|&c| !lines[c..].iter().all(|l| l.trim().is_empty()));

    match cut {
        Some(c) => Segmented {
            main: lines[..c].join("\n"),
            quoted: Some(lines[c..].join("\n")),
        },
        None => Segmented {
            main: text.to_string(),
            quoted: None,
        },
    }
}

/// Segment every message body of a thread. Results are in graph order.
pub fn segment_all(graph: &ThreadGraph) -> Vec<Segmented> {
    graph
        .messages
        .par_iter()
        .map(|m| segment(m.plain_text().unwrap_or("")))
        .collect()
}

/// First non-blank line of the newly written part of a body, with
/// whitespace collapsed
pub fn preview(text: &str, max_chars: usize) -> String {
    let main = segment(text).main;
    let first = main.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    let collapsed = first.split_whitespace().collect::<Vec<_>>().join(" ");
    let count = collapsed.chars().count();
    if count <= max_chars {
        return collapsed;
    }
    if max_chars < 4 {
        return collapsed.chars().take(max_chars).collect();
    }
    let truncated: String = collapsed.chars().take(max_chars - 3).collect();
    format!("{}...", truncated)
}

/// Reply body quoting the new content of `message`, without its own
/// quoted history or signature.
pub fn quote_for_reply(message: &Message, prefix: &str) -> String {
    let main = segment(message.plain_text().unwrap_or("")).main;
    let date = message.date.as_deref().unwrap_or("an unknown date");

    let mut out = format!("On {}, {} wrote:", date, message.from_display());
    for line in main.trim_end().split('\n') {
        out.push('\n');
        if line.trim().is_empty() {
            out.push_str(prefix.trim_end());
        } else {
            out.push_str(prefix);
            out.push_str(line.trim_end_matches('\r'));
        }
    }
    out
}

pub fn reply_subject(subject: Option<&str>) -> String {
    let subject = subject.unwrap_or("");
    if subject.starts_with("Re:") {
        subject.to_string()
    } else {
        format!("Re: {}", subject)
    }
}
