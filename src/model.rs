use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Window count bounds per workspace.
pub const WINDOW_COUNT_MIN: usize = 1;
pub const WINDOW_COUNT_MAX: usize = 4;

/// Number of window color themes; `color_index` stays in `0..WINDOW_COLOR_COUNT`.
pub const WINDOW_COLOR_COUNT: usize = 4;

pub const SESSION_NAME_MAX: usize = 50;

pub const PRESET_CAP: usize = 10;
pub const PRESET_NAME_MAX: usize = 30;

/// Transient active-session marker for a session creation still in flight.
/// Must never survive a reload: scrubbed on load and before every persist.
pub const CREATING_SENTINEL: &str = "__creating__";

/// Kill-everything requires explicit confirmation from the dashboard UI.
pub const NUKE_CONFIRM_HEADER: &str = "x-nuke-confirm";
pub const NUKE_CONFIRM_VALUE: &str = "DASHBOARD-NUKE-CONFIRMED";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkspaceId {
    Terminal1,
    Terminal2,
}

impl WorkspaceId {
    pub const ALL: [WorkspaceId; 2] = [WorkspaceId::Terminal1, WorkspaceId::Terminal2];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkspaceId::Terminal1 => "terminal1",
            WorkspaceId::Terminal2 => "terminal2",
        }
    }

    pub fn other(&self) -> WorkspaceId {
        match self {
            WorkspaceId::Terminal1 => WorkspaceId::Terminal2,
            WorkspaceId::Terminal2 => WorkspaceId::Terminal1,
        }
    }
}

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkspaceId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "terminal1" | "1" => Ok(WorkspaceId::Terminal1),
            "terminal2" | "2" => Ok(WorkspaceId::Terminal2),
            other => Err(anyhow::anyhow!(
                "unknown workspace {} (expected terminal1 or terminal2)",
                other
            )),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TmuxSession {
    pub name: String,
    pub windows: u32,
    pub attached: bool,
    pub group: String,
}

/// Wire shape of `GET /api/tmux/sessions`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SessionsResponse {
    #[serde(default)]
    pub sessions: Vec<TmuxSession>,

    #[serde(default)]
    pub grouped: BTreeMap<String, Vec<TmuxSession>>,

    #[serde(default)]
    pub timestamp: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminalWindow {
    pub id: String,

    #[serde(default)]
    pub bound_sessions: Vec<String>,

    #[serde(default)]
    pub active_session: Option<String>,

    #[serde(default)]
    pub color_index: u8,
}

impl TerminalWindow {
    pub fn new(ordinal: usize) -> Self {
        TerminalWindow {
            id: format!("window-{}", ordinal),
            bound_sessions: Vec::new(),
            active_session: None,
            color_index: (ordinal % WINDOW_COLOR_COUNT) as u8,
        }
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.bound_sessions.iter().any(|s| s == name)
    }

    /// Removes a bound session and repairs the active selection: the first
    /// remaining bound session becomes active, or nothing if none remain.
    pub fn remove_session(&mut self, name: &str) -> bool {
        let before = self.bound_sessions.len();
        self.bound_sessions.retain(|s| s != name);
        if self.bound_sessions.len() == before {
            return false;
        }
        if self.active_session.as_deref() == Some(name) {
            self.active_session = self.bound_sessions.first().cloned();
        }
        true
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceLayout {
    pub windows: Vec<TerminalWindow>,
    pub window_count: usize,
}

impl WorkspaceLayout {
    pub fn with_window_count(count: usize) -> Self {
        let count = count.clamp(WINDOW_COUNT_MIN, WINDOW_COUNT_MAX);
        WorkspaceLayout {
            windows: (0..count).map(TerminalWindow::new).collect(),
            window_count: count,
        }
    }

    pub fn window(&self, window_id: &str) -> Option<&TerminalWindow> {
        self.windows.iter().find(|w| w.id == window_id)
    }

    pub fn window_mut(&mut self, window_id: &str) -> Option<&mut TerminalWindow> {
        self.windows.iter_mut().find(|w| w.id == window_id)
    }
}

impl Default for WorkspaceLayout {
    fn default() -> Self {
        WorkspaceLayout::with_window_count(2)
    }
}

/// The two fixed workspaces. Field names double as the persisted keys.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspaces {
    #[serde(default)]
    pub terminal1: WorkspaceLayout,

    #[serde(default)]
    pub terminal2: WorkspaceLayout,
}

impl Workspaces {
    pub fn get(&self, id: WorkspaceId) -> &WorkspaceLayout {
        match id {
            WorkspaceId::Terminal1 => &self.terminal1,
            WorkspaceId::Terminal2 => &self.terminal2,
        }
    }

    pub fn get_mut(&mut self, id: WorkspaceId) -> &mut WorkspaceLayout {
        match id {
            WorkspaceId::Terminal1 => &mut self.terminal1,
            WorkspaceId::Terminal2 => &mut self.terminal2,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (WorkspaceId, &WorkspaceLayout)> {
        [
            (WorkspaceId::Terminal1, &self.terminal1),
            (WorkspaceId::Terminal2, &self.terminal2),
        ]
        .into_iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (WorkspaceId, &mut WorkspaceLayout)> {
        [
            (WorkspaceId::Terminal1, &mut self.terminal1),
            (WorkspaceId::Terminal2, &mut self.terminal2),
        ]
        .into_iter()
    }

    /// Where a session is currently bound, if anywhere. The exclusivity
    /// invariant keeps this unique.
    pub fn find_binding(&self, name: &str) -> Option<(WorkspaceId, &str)> {
        for (ws, layout) in self.iter() {
            for window in &layout.windows {
                if window.is_bound(name) {
                    return Some((ws, window.id.as_str()));
                }
            }
        }
        None
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerminalMode {
    #[default]
    Tmux,
    Shell,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Matrix,
    Dark,
    Gastown,
}

pub const FONT_SIZE_MIN: u32 = 12;
pub const FONT_SIZE_MAX: u32 = 20;
pub const REFRESH_INTERVAL_MIN_MS: u64 = 1_000;
pub const REFRESH_INTERVAL_MAX_MS: u64 = 30_000;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    #[serde(default)]
    pub terminal_mode: TerminalMode,

    #[serde(default = "default_font_size")]
    pub font_size: u32,

    #[serde(default)]
    pub theme: Theme,

    #[serde(default = "default_refresh_interval")]
    pub auto_refresh_interval: u64,

    #[serde(default = "default_session_prefix")]
    pub default_session_prefix: String,

    #[serde(default = "default_music_volume")]
    pub music_volume: f64,

    #[serde(default)]
    pub music_enabled: bool,
}

fn default_font_size() -> u32 {
    14
}

fn default_refresh_interval() -> u64 {
    5_000
}

fn default_session_prefix() -> String {
    "shell".to_string()
}

fn default_music_volume() -> f64 {
    0.5
}

impl Default for UserSettings {
    fn default() -> Self {
        UserSettings {
            terminal_mode: TerminalMode::Tmux,
            font_size: default_font_size(),
            theme: Theme::Matrix,
            auto_refresh_interval: default_refresh_interval(),
            default_session_prefix: default_session_prefix(),
            music_volume: default_music_volume(),
            music_enabled: false,
        }
    }
}

impl UserSettings {
    /// Forces every field back into its documented range.
    pub fn clamp(&mut self) {
        self.font_size = self.font_size.clamp(FONT_SIZE_MIN, FONT_SIZE_MAX);
        self.auto_refresh_interval = self
            .auto_refresh_interval
            .clamp(REFRESH_INTERVAL_MIN_MS, REFRESH_INTERVAL_MAX_MS);
        self.music_volume = self.music_volume.clamp(0.0, 1.0);
        if self.default_session_prefix.trim().is_empty() {
            self.default_session_prefix = default_session_prefix();
        }
    }

    pub fn apply(&mut self, update: SettingsUpdate) {
        if let Some(v) = update.terminal_mode {
            self.terminal_mode = v;
        }
        if let Some(v) = update.font_size {
            self.font_size = v;
        }
        if let Some(v) = update.theme {
            self.theme = v;
        }
        if let Some(v) = update.auto_refresh_interval {
            self.auto_refresh_interval = v;
        }
        if let Some(v) = update.default_session_prefix {
            self.default_session_prefix = v;
        }
        if let Some(v) = update.music_volume {
            self.music_volume = v;
        }
        if let Some(v) = update.music_enabled {
            self.music_enabled = v;
        }
        self.clamp();
    }
}

/// Partial settings change; unset fields keep their current value.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    #[serde(default)]
    pub terminal_mode: Option<TerminalMode>,

    #[serde(default)]
    pub font_size: Option<u32>,

    #[serde(default)]
    pub theme: Option<Theme>,

    #[serde(default)]
    pub auto_refresh_interval: Option<u64>,

    #[serde(default)]
    pub default_session_prefix: Option<String>,

    #[serde(default)]
    pub music_volume: Option<f64>,

    #[serde(default)]
    pub music_enabled: Option<bool>,
}

/// Named deep snapshot of both workspaces.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutPreset {
    pub id: String,
    pub name: String,
    pub created_at: String,
    pub workspaces: Workspaces,
}

/// Wire shape of `POST /api/tmux/appearance`. Empty fields are skipped.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppearanceRequest {
    #[serde(default)]
    pub status_bg: String,

    #[serde(default)]
    pub status_fg: String,

    #[serde(default)]
    pub pane_border_active: String,

    #[serde(default)]
    pub pane_border_inactive: String,

    #[serde(default)]
    pub mode_style_bg: String,

    #[serde(default)]
    pub mode_style_fg: String,
}

impl AppearanceRequest {
    pub fn fields(&self) -> [(&'static str, &str); 6] {
        [
            ("statusBg", self.status_bg.as_str()),
            ("statusFg", self.status_fg.as_str()),
            ("paneBorderActive", self.pane_border_active.as_str()),
            ("paneBorderInactive", self.pane_border_inactive.as_str()),
            ("modeStyleBg", self.mode_style_bg.as_str()),
            ("modeStyleFg", self.mode_style_fg.as_str()),
        ]
    }
}
