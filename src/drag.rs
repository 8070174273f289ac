//! Drag-and-drop as a small state machine rather than ad hoc event
//! branching. A gesture arms on pointer-down, activates once the pointer
//! travels past a minimum distance, and resolves on pointer-up into exactly
//! one outcome: bind to a window, move between windows, or remove when an
//! already-bound tag lands outside every target. Dropping outside is the
//! only way out of a drag; there is no separate cancel.

use crate::dashboard::DashboardStore;
use crate::model::WorkspaceId;

/// Pixels of travel before an armed gesture counts as a drag.
pub const DRAG_THRESHOLD: f64 = 5.0;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DragSource {
    /// A session tag picked up from the sidebar list (not bound anywhere).
    Sidebar { session: String },
    /// A tag picked up from a window's tab row.
    Window {
        workspace: WorkspaceId,
        window_id: String,
        session: String,
    },
}

impl DragSource {
    pub fn session(&self) -> &str {
        match self {
            DragSource::Sidebar { session } => session,
            DragSource::Window { session, .. } => session,
        }
    }
}

/// A window the pointer is released over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DropTarget<'a> {
    pub workspace: WorkspaceId,
    pub window_id: &'a str,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DragResolution {
    Bind {
        workspace: WorkspaceId,
        window_id: String,
        session: String,
    },
    Move {
        workspace: WorkspaceId,
        window_id: String,
        session: String,
    },
    Remove {
        workspace: WorkspaceId,
        window_id: String,
        session: String,
    },
}

#[derive(Clone, Debug, PartialEq)]
enum DragState {
    Idle,
    Armed { origin: (f64, f64), source: DragSource },
    Dragging { source: DragSource },
}

#[derive(Clone, Debug)]
pub struct DragController {
    state: DragState,
}

impl Default for DragController {
    fn default() -> Self {
        DragController {
            state: DragState::Idle,
        }
    }
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// The session being dragged, once the threshold has been crossed.
    pub fn dragged_session(&self) -> Option<&str> {
        match &self.state {
            DragState::Dragging { source } => Some(source.session()),
            _ => None,
        }
    }

    pub fn pointer_down(&mut self, source: DragSource, position: (f64, f64)) {
        self.state = DragState::Armed {
            origin: position,
            source,
        };
    }

    /// Returns true once the gesture has become a real drag.
    pub fn pointer_move(&mut self, position: (f64, f64)) -> bool {
        if let DragState::Armed { origin, source } = &self.state {
            let dx = position.0 - origin.0;
            let dy = position.1 - origin.1;
            if (dx * dx + dy * dy).sqrt() >= DRAG_THRESHOLD {
                self.state = DragState::Dragging {
                    source: source.clone(),
                };
            }
        }
        self.is_dragging()
    }

    /// Resolves the gesture. `None` means nothing happened: the threshold
    /// was never crossed (a click, handled elsewhere), or an unbound tag
    /// was released over empty space.
    pub fn pointer_up(&mut self, target: Option<DropTarget<'_>>) -> Option<DragResolution> {
        let state = std::mem::replace(&mut self.state, DragState::Idle);
        let source = match state {
            DragState::Dragging { source } => source,
            _ => return None,
        };

        match (source, target) {
            (DragSource::Sidebar { session }, Some(target)) => Some(DragResolution::Bind {
                workspace: target.workspace,
                window_id: target.window_id.to_string(),
                session,
            }),
            (DragSource::Sidebar { .. }, None) => None,
            (DragSource::Window { session, .. }, Some(target)) => Some(DragResolution::Move {
                workspace: target.workspace,
                window_id: target.window_id.to_string(),
                session,
            }),
            // Releasing a bound tag over nothing removes it.
            (
                DragSource::Window {
                    workspace,
                    window_id,
                    session,
                },
                None,
            ) => Some(DragResolution::Remove {
                workspace,
                window_id,
                session,
            }),
        }
    }
}

/// Routes a resolution into the store; bind and move are the same stealing
/// transition underneath.
pub fn apply_resolution(store: &mut DashboardStore, resolution: DragResolution) {
    match resolution {
        DragResolution::Bind {
            workspace,
            window_id,
            session,
        }
        | DragResolution::Move {
            workspace,
            window_id,
            session,
        } => {
            store.bind_session(workspace, &window_id, &session);
        }
        DragResolution::Remove {
            workspace,
            window_id,
            session,
        } => {
            store.unbind_session(workspace, &window_id, &session);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::{DashboardState, DashboardStore};
    use crate::model::WorkspaceId::{Terminal1, Terminal2};

    fn sidebar(session: &str) -> DragSource {
        DragSource::Sidebar {
            session: session.to_string(),
        }
    }

    fn window_tag(workspace: WorkspaceId, window_id: &str, session: &str) -> DragSource {
        DragSource::Window {
            workspace,
            window_id: window_id.to_string(),
            session: session.to_string(),
        }
    }

    #[test]
    fn sidebar_drop_on_window_binds() {
        let mut drag = DragController::new();
        drag.pointer_down(sidebar("agent-1"), (0.0, 0.0));
        assert!(drag.pointer_move((10.0, 0.0)));

        let resolution = drag
            .pointer_up(Some(DropTarget {
                workspace: Terminal1,
                window_id: "window-0",
            }))
            .unwrap();
        assert_eq!(
            resolution,
            DragResolution::Bind {
                workspace: Terminal1,
                window_id: "window-0".to_string(),
                session: "agent-1".to_string(),
            }
        );
        assert!(!drag.is_dragging());
    }

    #[test]
    fn window_drop_on_other_window_moves() {
        let mut drag = DragController::new();
        drag.pointer_down(window_tag(Terminal1, "window-0", "agent-1"), (0.0, 0.0));
        drag.pointer_move((0.0, 8.0));

        let resolution = drag
            .pointer_up(Some(DropTarget {
                workspace: Terminal2,
                window_id: "window-1",
            }))
            .unwrap();
        assert!(matches!(resolution, DragResolution::Move { workspace: Terminal2, .. }));
    }

    #[test]
    fn bound_tag_released_outside_removes() {
        let mut drag = DragController::new();
        drag.pointer_down(window_tag(Terminal1, "window-0", "agent-1"), (0.0, 0.0));
        drag.pointer_move((20.0, 20.0));
        let resolution = drag.pointer_up(None).unwrap();
        assert_eq!(
            resolution,
            DragResolution::Remove {
                workspace: Terminal1,
                window_id: "window-0".to_string(),
                session: "agent-1".to_string(),
            }
        );
    }

    #[test]
    fn sidebar_tag_released_outside_is_nothing() {
        let mut drag = DragController::new();
        drag.pointer_down(sidebar("agent-1"), (0.0, 0.0));
        drag.pointer_move((20.0, 20.0));
        assert_eq!(drag.pointer_up(None), None);
    }

    #[test]
    fn below_threshold_release_is_a_click_not_a_drag() {
        let mut drag = DragController::new();
        drag.pointer_down(window_tag(Terminal1, "window-0", "agent-1"), (0.0, 0.0));
        assert!(!drag.pointer_move((3.0, 3.0)));
        assert_eq!(
            drag.pointer_up(Some(DropTarget {
                workspace: Terminal1,
                window_id: "window-1",
            })),
            None
        );
    }

    #[test]
    fn resolutions_drive_the_store() {
        let mut store = DashboardStore::new(DashboardState::default());
        store.bind_session(Terminal1, "window-0", "agent-1");

        apply_resolution(
            &mut store,
            DragResolution::Move {
                workspace: Terminal2,
                window_id: "window-0".to_string(),
                session: "agent-1".to_string(),
            },
        );
        assert_eq!(
            store.state().workspaces.find_binding("agent-1"),
            Some((Terminal2, "window-0"))
        );

        apply_resolution(
            &mut store,
            DragResolution::Remove {
                workspace: Terminal2,
                window_id: "window-0".to_string(),
                session: "agent-1".to_string(),
            },
        );
        assert!(store.state().workspaces.find_binding("agent-1").is_none());
    }
}
