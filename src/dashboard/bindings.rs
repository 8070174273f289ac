//! Window/session binding transitions. Every function is one atomic edit of
//! the two-workspace tree and reports whether anything changed.
//!
//! Invariants maintained here:
//! - a session name is bound to at most one window across both workspaces;
//! - `active_session` is always a member of `bound_sessions`, or none;
//! - `windows.len()` always equals `window_count`.

use crate::model::{
    TerminalWindow, WINDOW_COUNT_MAX, WINDOW_COUNT_MIN, WorkspaceId, Workspaces,
};

use super::CycleDirection;

pub(super) fn bind(
    workspaces: &mut Workspaces,
    workspace: WorkspaceId,
    window_id: &str,
    name: &str,
) -> bool {
    if name.is_empty() {
        return false;
    }
    // A stale window id (e.g. after a window-count shrink) voids the whole
    // operation, including the detach pass below.
    if workspaces.get(workspace).window(window_id).is_none() {
        return false;
    }

    let mut changed = false;

    // Detach everywhere else first so the exclusivity invariant holds at
    // every step.
    for (ws, layout) in workspaces.iter_mut() {
        for window in &mut layout.windows {
            if ws == workspace && window.id == window_id {
                continue;
            }
            if window.remove_session(name) {
                changed = true;
            }
        }
    }

    let target = match workspaces.get_mut(workspace).window_mut(window_id) {
        Some(w) => w,
        None => return changed,
    };

    if !target.is_bound(name) {
        target.bound_sessions.push(name.to_string());
        changed = true;
    }
    // First session in an idle window becomes the displayed one. Rebinding
    // into a window that already shows something leaves the selection alone.
    if target.active_session.is_none() {
        target.active_session = Some(name.to_string());
        changed = true;
    }

    changed
}

pub(super) fn unbind(
    workspaces: &mut Workspaces,
    workspace: WorkspaceId,
    window_id: &str,
    name: &str,
) -> bool {
    match workspaces.get_mut(workspace).window_mut(window_id) {
        Some(window) => window.remove_session(name),
        None => false,
    }
}

pub(super) fn set_active(
    workspaces: &mut Workspaces,
    workspace: WorkspaceId,
    window_id: &str,
    name: &str,
) -> bool {
    let Some(window) = workspaces.get_mut(workspace).window_mut(window_id) else {
        return false;
    };
    // Only bound sessions can be activated.
    if !window.is_bound(name) || window.active_session.as_deref() == Some(name) {
        return false;
    }
    window.active_session = Some(name.to_string());
    true
}

pub(super) fn cycle(
    workspaces: &mut Workspaces,
    workspace: WorkspaceId,
    window_id: &str,
    direction: CycleDirection,
) -> bool {
    let Some(window) = workspaces.get_mut(workspace).window_mut(window_id) else {
        return false;
    };
    let len = window.bound_sessions.len();
    if len < 2 {
        return false;
    }

    let current = window
        .active_session
        .as_deref()
        .and_then(|active| window.bound_sessions.iter().position(|s| s == active))
        .unwrap_or(0);

    let next = match direction {
        CycleDirection::Next => (current + 1) % len,
        CycleDirection::Prev => (current + len - 1) % len,
    };

    window.active_session = Some(window.bound_sessions[next].clone());
    true
}

pub(super) fn set_window_count(
    workspaces: &mut Workspaces,
    workspace: WorkspaceId,
    count: usize,
) -> bool {
    let count = count.clamp(WINDOW_COUNT_MIN, WINDOW_COUNT_MAX);
    let layout = workspaces.get_mut(workspace);
    if layout.window_count == count && layout.windows.len() == count {
        return false;
    }

    if count > layout.windows.len() {
        for ordinal in layout.windows.len()..count {
            layout.windows.push(TerminalWindow::new(ordinal));
        }
    } else {
        // Truncated windows take their bindings with them; sessions are not
        // re-homed to the remaining windows.
        layout.windows.truncate(count);
    }
    layout.window_count = count;
    true
}
