use super::threading::ThreadGraph;

/// The linear slice of a thread currently shown in focus.
///
/// `path` holds indices into [`ThreadGraph::messages`]: ancestors oldest
/// first, then the seed, then descendants each replying to the previous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivePath {
    pub path: Vec<usize>,
    /// Position of the seed within `path`
    pub focused: usize,
}

impl ActivePath {
    pub fn contains(&self, index: usize) -> bool {
        self.path.contains(&index)
    }

    /// Graph index of the focused message
    pub fn focused_message(&self) -> usize {
        self.path[self.focused]
    }

    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }
}

/// Default seed: first unread message in array order, else the last one.
pub fn default_seed(graph: &ThreadGraph) -> Option<usize> {
    graph
        .messages
        .iter()
        .position(|m| m.is_unread())
        .or_else(|| graph.len().checked_sub(1))
}

/// Derive the active path through `seed` (or the default seed).
///
/// Returns `None` only for an empty thread. A reply reference that points
/// outside the thread ends the ancestor walk; that is the normal shape of a
/// thread whose head was filtered upstream. When several messages reply to
/// the same parent, the first in array order is followed.
pub fn resolve(graph: &ThreadGraph, seed: Option<usize>) -> Option<ActivePath> {
    let seed = match seed {
        Some(index) if index < graph.len() => index,
        Some(_) => return None,
        None => default_seed(graph)?,
    };

    let mut ancestors = Vec::new();
    let mut current = seed;
    loop {
        let Some(parent) = graph.parent_of(current) else {
            if graph.messages[current].reply_to_id.is_some() {
                tracing::trace!(id = %graph.messages[current].id, "reply reference not in thread");
            }
            break;
        };
        if parent == seed || ancestors.contains(&parent) {
            break;
        }
        ancestors.push(parent);
        current = parent;
    }

    let mut path: Vec<usize> = ancestors.into_iter().rev().collect();
    let focused = path.len();
    path.push(seed);

    current = seed;
    while let Some(child) = graph.first_reply_to(current) {
        if path.contains(&child) {
            break;
        }
        path.push(child);
        current = child;
    }

    tracing::trace!(seed, len = path.len(), focused, "resolved active path");
    Some(ActivePath { path, focused })
}
