//! On-disk persistence for the dashboard document.
//!
//! Two independently versioned files live under the data dir: `state.json`
//! (workspaces, sidebar flag, settings) and `presets.json`. Loading is
//! deliberately lenient: malformed JSON, wrong shapes, and missing keys
//! never error, they fall back to defaults. Saving always writes the
//! normalized, sentinel-scrubbed form, atomically.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

use crate::dashboard::{Change, DashboardState, DashboardStore};
use crate::model::{
    CREATING_SENTINEL, LayoutPreset, PRESET_CAP, TerminalWindow, UserSettings, WINDOW_COLOR_COUNT,
    WINDOW_COUNT_MAX, WINDOW_COUNT_MIN, WorkspaceLayout, Workspaces,
};

pub const STATE_FILE: &str = "state.json";
pub const PRESETS_FILE: &str = "presets.json";

pub const STATE_VERSION: u32 = 2;
pub const PRESETS_VERSION: u32 = 1;

#[derive(Clone)]
pub struct LocalStore {
    root: PathBuf,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StateDoc {
    version: u32,
    workspaces: Workspaces,
    sidebar_collapsed: bool,
    settings: UserSettings,
}

#[derive(Serialize)]
struct PresetsDoc {
    version: u32,
    presets: Vec<LayoutPreset>,
}

impl LocalStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .with_context(|| format!("create data dir {}", root.display()))?;
        Ok(LocalStore { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn state_path(&self) -> PathBuf {
        self.root.join(STATE_FILE)
    }

    pub fn presets_path(&self) -> PathBuf {
        self.root.join(PRESETS_FILE)
    }

    /// Loads the full dashboard document, falling back to defaults wherever
    /// the stored form cannot be used.
    pub fn load(&self) -> DashboardState {
        let (workspaces, sidebar_collapsed, settings) = self.load_state_parts();
        DashboardState::new(workspaces, sidebar_collapsed, settings, self.load_presets())
    }

    pub fn load_state_parts(&self) -> (Workspaces, bool, UserSettings) {
        let (mut workspaces, sidebar_collapsed, mut settings) = fs::read(self.state_path())
            .ok()
            .and_then(|bytes| decode_state(&bytes))
            .unwrap_or_default();
        normalize_workspaces(&mut workspaces);
        settings.clamp();
        (workspaces, sidebar_collapsed, settings)
    }

    pub fn save_state(&self, state: &DashboardState) -> Result<()> {
        let mut workspaces = state.workspaces.clone();
        // Never let the in-flight sentinel (or any other denormalized form)
        // reach disk.
        normalize_workspaces(&mut workspaces);
        let doc = StateDoc {
            version: STATE_VERSION,
            workspaces,
            sidebar_collapsed: state.sidebar_collapsed,
            settings: state.settings.clone(),
        };
        let bytes = serde_json::to_vec_pretty(&doc).context("serialize state")?;
        write_atomic(&self.state_path(), &bytes).context("write state.json")?;
        Ok(())
    }

    pub fn load_presets(&self) -> Vec<LayoutPreset> {
        let mut presets = fs::read(self.presets_path())
            .ok()
            .and_then(|bytes| decode_presets(&bytes))
            .unwrap_or_default();
        for preset in &mut presets {
            normalize_workspaces(&mut preset.workspaces);
        }
        presets.truncate(PRESET_CAP);
        presets
    }

    pub fn save_presets(&self, presets: &[LayoutPreset]) -> Result<()> {
        let doc = PresetsDoc {
            version: PRESETS_VERSION,
            presets: presets.to_vec(),
        };
        let bytes = serde_json::to_vec_pretty(&doc).context("serialize presets")?;
        write_atomic(&self.presets_path(), &bytes).context("write presets.json")?;
        Ok(())
    }
}

fn section<T: serde::de::DeserializeOwned + Default>(value: Option<&Value>) -> T {
    value
        .cloned()
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default()
}

/// Recognizes the two persisted shapes: the current two-workspace document
/// and the legacy single-window-list one. Anything else is `None`, which the
/// caller turns into hard defaults.
fn decode_state(bytes: &[u8]) -> Option<(Workspaces, bool, UserSettings)> {
    let value: Value = serde_json::from_slice(bytes).ok()?;
    let obj = value.as_object()?;
    let sidebar_collapsed = obj
        .get("sidebarCollapsed")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    if let Some(ws) = obj.get("workspaces").and_then(Value::as_object) {
        let workspaces = Workspaces {
            terminal1: section(ws.get("terminal1")),
            terminal2: section(ws.get("terminal2")),
        };
        return Some((workspaces, sidebar_collapsed, section(obj.get("settings"))));
    }

    if obj.contains_key("windows") {
        // Legacy shape: one anonymous workspace. It becomes terminal1;
        // terminal2 starts fresh.
        let windows: Vec<TerminalWindow> = section(obj.get("windows"));
        let window_count = obj
            .get("windowCount")
            .and_then(Value::as_u64)
            .unwrap_or(windows.len() as u64) as usize;
        let workspaces = Workspaces {
            terminal1: WorkspaceLayout {
                windows,
                window_count,
            },
            terminal2: WorkspaceLayout::default(),
        };
        return Some((workspaces, sidebar_collapsed, section(obj.get("settings"))));
    }

    None
}

fn decode_presets(bytes: &[u8]) -> Option<Vec<LayoutPreset>> {
    let value: Value = serde_json::from_slice(bytes).ok()?;
    let entries = value.as_object()?.get("presets")?.as_array()?;
    Some(
        entries
            .iter()
            .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
            .collect(),
    )
}

/// Repairs a workspace tree into its invariant form: window counts clamped
/// to [1,4] with the window list resized to match, color indexes in range,
/// the creation sentinel scrubbed, duplicate bindings dropped (first one
/// wins, scanning terminal1 then terminal2 in window order), and active
/// selections that point at nothing repaired.
pub fn normalize_workspaces(workspaces: &mut Workspaces) {
    let mut seen: HashSet<String> = HashSet::new();

    for (_, layout) in workspaces.iter_mut() {
        let count = layout
            .window_count
            .clamp(WINDOW_COUNT_MIN, WINDOW_COUNT_MAX);
        layout.windows.truncate(count);
        for ordinal in layout.windows.len()..count {
            layout.windows.push(TerminalWindow::new(ordinal));
        }
        layout.window_count = count;

        for (ordinal, window) in layout.windows.iter_mut().enumerate() {
            if window.id.is_empty() {
                window.id = format!("window-{}", ordinal);
            }
            if usize::from(window.color_index) >= WINDOW_COLOR_COUNT {
                window.color_index = (ordinal % WINDOW_COLOR_COUNT) as u8;
            }

            window
                .bound_sessions
                .retain(|name| !name.is_empty() && seen.insert(name.clone()));

            if window.active_session.as_deref() == Some(CREATING_SENTINEL) {
                window.active_session = None;
            }
            let active_is_bound = window
                .active_session
                .as_deref()
                .map(|active| window.is_bound(active))
                .unwrap_or(false);
            if !active_is_bound {
                window.active_session = window.bound_sessions.first().cloned();
            }
        }
    }
}

/// Wires a store so every committed mutation re-serializes the matching
/// file. Persistence failures degrade to a console warning; the in-memory
/// state stays authoritative.
pub fn attach_persistence(store: &mut DashboardStore, local: LocalStore) {
    store.subscribe(move |state, change| {
        let result = match change {
            Change::State => local.save_state(state),
            Change::Presets => local.save_presets(&state.presets),
            Change::View => Ok(()),
        };
        if let Err(err) = result {
            eprintln!("warn: failed to persist dashboard state: {:#}", err);
        }
    });
}

pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create dir {}", parent.display()))?;
    }
    let tmp = path.with_extension(format!("tmp.{}", std::process::id()));
    fs::write(&tmp, bytes).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
    Ok(())
}
