//! Layout presets: named deep snapshots of both workspaces, capped at
//! `PRESET_CAP`, persisted separately from the live state.

use anyhow::Result;

use crate::model::{LayoutPreset, PRESET_CAP, PRESET_NAME_MAX};
use crate::util::{generate_id, now_ts};

use super::DashboardState;

fn acceptable_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.chars().count() > PRESET_NAME_MAX {
        return None;
    }
    Some(trimmed.to_string())
}

pub(super) fn save(state: &mut DashboardState, name: &str) -> Result<bool> {
    let Some(name) = acceptable_name(name) else {
        return Ok(false);
    };
    if state.presets.len() >= PRESET_CAP {
        return Ok(false);
    }

    state.presets.push(LayoutPreset {
        id: generate_id()?,
        name,
        created_at: now_ts(),
        // Snapshot, not a reference: later live mutation must not leak in.
        workspaces: state.workspaces.clone(),
    });
    Ok(true)
}

pub(super) fn load(state: &mut DashboardState, id: &str) -> bool {
    match state.presets.iter().find(|p| p.id == id) {
        Some(preset) => {
            state.workspaces = preset.workspaces.clone();
            true
        }
        None => false,
    }
}

pub(super) fn rename(state: &mut DashboardState, id: &str, name: &str) -> bool {
    let Some(name) = acceptable_name(name) else {
        return false;
    };
    match state.presets.iter_mut().find(|p| p.id == id) {
        Some(preset) => {
            preset.name = name;
            true
        }
        None => false,
    }
}

pub(super) fn delete(state: &mut DashboardState, id: &str) -> bool {
    let before = state.presets.len();
    state.presets.retain(|p| p.id != id);
    state.presets.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::DashboardStore;
    use crate::model::WorkspaceId::Terminal1;

    #[test]
    fn saved_preset_is_independent_of_later_mutation() {
        let mut store = DashboardStore::new(DashboardState::default());
        store.bind_session(Terminal1, "window-0", "agent-1");
        assert!(store.save_preset("steady").unwrap());
        let id = store.state().presets[0].id.clone();

        store.bind_session(Terminal1, "window-0", "agent-2");
        store.unbind_session(Terminal1, "window-0", "agent-1");
        assert!(store.state().workspaces.find_binding("agent-1").is_none());

        assert!(store.load_preset(&id));
        let window = store.state().workspaces.terminal1.window("window-0").unwrap();
        assert_eq!(window.bound_sessions, vec!["agent-1"]);

        // And the stored preset still holds after another live edit.
        store.bind_session(Terminal1, "window-1", "agent-9");
        assert_eq!(
            store.state().presets[0]
                .workspaces
                .terminal1
                .window("window-0")
                .unwrap()
                .bound_sessions,
            vec!["agent-1"]
        );
    }

    #[test]
    fn cap_rejects_and_leaves_store_unchanged() {
        let mut store = DashboardStore::new(DashboardState::default());
        for i in 0..PRESET_CAP {
            assert!(store.save_preset(&format!("preset-{}", i)).unwrap());
        }
        assert!(!store.save_preset("one-too-many").unwrap());
        assert_eq!(store.state().presets.len(), PRESET_CAP);
        assert!(store.state().presets.iter().all(|p| p.name != "one-too-many"));
    }

    #[test]
    fn names_are_trimmed_and_bounded() {
        let mut store = DashboardStore::new(DashboardState::default());
        assert!(!store.save_preset("   ").unwrap());
        assert!(!store.save_preset(&"x".repeat(PRESET_NAME_MAX + 1)).unwrap());
        assert!(store.save_preset("  focus  ").unwrap());
        assert_eq!(store.state().presets[0].name, "focus");
    }

    #[test]
    fn load_of_unknown_id_is_a_noop() {
        let mut store = DashboardStore::new(DashboardState::default());
        store.bind_session(Terminal1, "window-0", "agent-1");
        let before = store.state().workspaces.clone();
        assert!(!store.load_preset("missing"));
        assert_eq!(store.state().workspaces, before);
    }

    #[test]
    fn rename_and_delete_by_id() {
        let mut store = DashboardStore::new(DashboardState::default());
        store.save_preset("a").unwrap();
        store.save_preset("b").unwrap();
        let id = store.state().presets[0].id.clone();

        assert!(store.rename_preset(&id, "  renamed "));
        assert_eq!(store.state().presets[0].name, "renamed");
        assert!(!store.rename_preset(&id, "  "));
        assert!(!store.rename_preset("missing", "x"));

        store.delete_preset(&id);
        assert_eq!(store.state().presets.len(), 1);
        // Deleting an absent id is silent.
        store.delete_preset(&id);
        assert_eq!(store.state().presets.len(), 1);
    }

    #[test]
    fn preset_ids_are_unique() {
        let mut store = DashboardStore::new(DashboardState::default());
        store.save_preset("a").unwrap();
        store.save_preset("b").unwrap();
        let ids: Vec<&str> = store.state().presets.iter().map(|p| p.id.as_str()).collect();
        assert_ne!(ids[0], ids[1]);
    }
}
