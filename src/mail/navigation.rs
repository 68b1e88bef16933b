use super::path::{ActivePath, resolve};
use super::threading::{ThreadGraph, build};
use super::types::{Message, ThreadMessage};

/// What a navigation operation did to the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavEvent {
    Unchanged,
    /// Same path, focus moved to this graph index
    FocusMoved(usize),
    /// Path replaced; focus is on this graph index
    PathReplaced(usize),
}

impl NavEvent {
    /// Graph index of the newly focused message, if focus changed
    pub fn focused(&self) -> Option<usize> {
        match self {
            NavEvent::Unchanged => None,
            NavEvent::FocusMoved(i) | NavEvent::PathReplaced(i) => Some(*i),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    pub active: ActivePath,
    pub flattened: bool,
}

impl NavigationState {
    pub fn path(&self) -> &[usize] {
        &self.active.path
    }

    pub fn focused_index(&self) -> usize {
        self.active.focused
    }
}

#[derive(Debug, Clone, Default)]
enum Phase {
    #[default]
    Idle,
    Ready {
        graph: ThreadGraph,
        state: NavigationState,
    },
}

/// Owns the thread view's navigation state.
///
/// Every operation finishes replacing path and focus before it returns, so
/// a renderer never sees a focus index from a stale path.
#[derive(Debug, Clone, Default)]
pub struct NavigationController {
    phase: Phase,
}

impl NavigationController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build and seed a thread view. An empty thread leaves the controller idle.
    pub fn load(&mut self, messages: &[Message]) -> NavEvent {
        let graph = build(messages);
        match resolve(&graph, None) {
            Some(active) => {
                let focused = active.focused_message();
                self.phase = Phase::Ready {
                    graph,
                    state: NavigationState {
                        active,
                        flattened: false,
                    },
                };
                NavEvent::PathReplaced(focused)
            }
            None => {
                self.phase = Phase::Idle;
                NavEvent::Unchanged
            }
        }
    }

    pub fn unload(&mut self) {
        self.phase = Phase::Idle;
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.phase, Phase::Ready { .. })
    }

    pub fn state(&self) -> Option<&NavigationState> {
        match &self.phase {
            Phase::Ready { state, .. } => Some(state),
            Phase::Idle => None,
        }
    }

    pub fn graph(&self) -> Option<&ThreadGraph> {
        match &self.phase {
            Phase::Ready { graph, .. } => Some(graph),
            Phase::Idle => None,
        }
    }

    pub fn max_depth(&self) -> usize {
        self.graph().map(|g| g.max_depth).unwrap_or(0)
    }

    /// Graph index of the focused message
    pub fn focused(&self) -> Option<usize> {
        self.state().map(|s| s.active.focused_message())
    }

    pub fn focused_message(&self) -> Option<&ThreadMessage> {
        let index = self.focused()?;
        self.graph()?.message(index)
    }

    pub fn is_on_path(&self, index: usize) -> bool {
        self.state()
            .map(|s| s.active.contains(index))
            .unwrap_or(false)
    }

    /// Move focus along the current path, clamping at either end.
    pub fn move_focus(&mut self, delta: isize) -> NavEvent {
        let Phase::Ready { state, .. } = &mut self.phase else {
            return NavEvent::Unchanged;
        };
        let last = state.active.len() - 1;
        let current = state.active.focused;
        let target = if delta < 0 {
            current.saturating_sub(delta.unsigned_abs())
        } else {
            current.saturating_add(delta as usize).min(last)
        };
        if target == current {
            return NavEvent::Unchanged;
        }
        state.active.focused = target;
        tracing::trace!(from = current, to = target, "focus moved");
        NavEvent::FocusMoved(state.active.focused_message())
    }

    pub fn focus_first(&mut self) -> NavEvent {
        self.move_focus(isize::MIN)
    }

    pub fn focus_last(&mut self) -> NavEvent {
        self.move_focus(isize::MAX)
    }

    /// Re-seed the path on the first message (array order) at `depth`.
    /// The depth is clamped to the thread's range. A flattened view already
    /// shows every message, so the target is focused in place.
    pub fn jump_to(&mut self, depth: usize) -> NavEvent {
        let Phase::Ready { graph, state } = &mut self.phase else {
            return NavEvent::Unchanged;
        };
        let depth = depth.clamp(1, graph.max_depth.max(1));
        let Some(target) = graph.first_at_depth(depth) else {
            return NavEvent::Unchanged;
        };

        if state.flattened {
            if state.active.focused == target {
                return NavEvent::Unchanged;
            }
            state.active.focused = target;
            return NavEvent::FocusMoved(target);
        }

        let Some(active) = resolve(graph, Some(target)) else {
            return NavEvent::Unchanged;
        };
        state.active = active;
        tracing::trace!(depth, seed = target, "jumped to depth");
        NavEvent::PathReplaced(target)
    }

    pub fn into_parent(&mut self) -> NavEvent {
        match self.focused_message().map(|m| m.depth) {
            Some(depth) if depth > 1 => self.jump_to(depth - 1),
            _ => NavEvent::Unchanged,
        }
    }

    pub fn into_child(&mut self) -> NavEvent {
        let max_depth = self.max_depth();
        match self.focused_message().map(|m| m.depth) {
            Some(depth) if depth < max_depth => self.jump_to(depth + 1),
            _ => NavEvent::Unchanged,
        }
    }

    /// Toggle between the active path and the whole thread in array order.
    /// The focused message stays focused either way.
    pub fn toggle_flatten(&mut self) -> NavEvent {
        let Phase::Ready { graph, state } = &mut self.phase else {
            return NavEvent::Unchanged;
        };
        let focused = state.active.focused_message();

        if state.flattened {
            let Some(active) = resolve(graph, Some(focused)) else {
                return NavEvent::Unchanged;
            };
            state.active = active;
            state.flattened = false;
        } else {
            state.active = ActivePath {
                path: (0..graph.len()).collect(),
                focused,
            };
            state.flattened = true;
        }

        tracing::trace!(flattened = state.flattened, "toggled flatten");
        NavEvent::PathReplaced(state.active.focused_message())
    }

    /// Focus a message by graph index. If it is not on the current path the
    /// path is re-derived with it as seed.
    pub fn select(&mut self, index: usize) -> NavEvent {
        let Phase::Ready { graph, state } = &mut self.phase else {
            return NavEvent::Unchanged;
        };
        if index >= graph.len() {
            return NavEvent::Unchanged;
        }

        if let Some(position) = state.active.path.iter().position(|&i| i == index) {
            if position == state.active.focused {
                return NavEvent::Unchanged;
            }
            state.active.focused = position;
            return NavEvent::FocusMoved(index);
        }

        let Some(active) = resolve(graph, Some(index)) else {
            return NavEvent::Unchanged;
        };
        state.active = active;
        tracing::trace!(seed = index, len = state.active.len(), "path re-seeded");
        NavEvent::PathReplaced(index)
    }

    /// Focus a message by id; see [`NavigationController::select`].
    pub fn select_id(&mut self, id: &str) -> NavEvent {
        match self.graph().and_then(|g| g.position(id)) {
            Some(index) => self.select(index),
            None => NavEvent::Unchanged,
        }
    }
}
