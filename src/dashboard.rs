//! The dashboard document: two workspaces of terminal windows, session
//! bindings, settings, and layout presets, mutated through a single
//! observable store.
//!
//! Exactly one owner mutates the store; every operation is one state
//! transition and notifies subscribers once, tagged with what changed so
//! the persistence layer only rewrites what it has to.

use std::collections::BTreeMap;
use std::str::FromStr;

use anyhow::Result;

use crate::model::{
    LayoutPreset, SessionsResponse, SettingsUpdate, TmuxSession, UserSettings, WorkspaceId,
    Workspaces,
};

mod bindings;
mod poll;
mod presets;

pub use poll::PollSequencer;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Change {
    /// Workspaces, sidebar flag, or settings: the persisted state document.
    State,
    /// The independently persisted preset collection.
    Presets,
    /// Transient view data only (session list, poll errors, floating modal).
    View,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleDirection {
    Next,
    Prev,
}

impl FromStr for CycleDirection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "next" => Ok(CycleDirection::Next),
            "prev" => Ok(CycleDirection::Prev),
            other => Err(anyhow::anyhow!(
                "unknown direction {} (expected next or prev)",
                other
            )),
        }
    }
}

#[derive(Clone, Debug)]
pub struct DashboardState {
    pub workspaces: Workspaces,
    pub sidebar_collapsed: bool,
    pub settings: UserSettings,
    pub presets: Vec<LayoutPreset>,

    // Transient session view, replaced wholesale by each applied poll.
    pub sessions: Vec<TmuxSession>,
    pub grouped: BTreeMap<String, Vec<TmuxSession>>,
    pub poll_error: Option<String>,
    pub loading: bool,
    pub floating_session: Option<String>,
}

impl DashboardState {
    pub fn new(
        workspaces: Workspaces,
        sidebar_collapsed: bool,
        settings: UserSettings,
        presets: Vec<LayoutPreset>,
    ) -> Self {
        DashboardState {
            workspaces,
            sidebar_collapsed,
            settings,
            presets,
            sessions: Vec::new(),
            grouped: BTreeMap::new(),
            poll_error: None,
            loading: true,
            floating_session: None,
        }
    }

    /// Whether the latest applied poll reported this session. Bound sessions
    /// that are not reported render as disconnected, nothing more.
    pub fn is_session_reported(&self, name: &str) -> bool {
        self.sessions.iter().any(|s| s.name == name)
    }
}

impl Default for DashboardState {
    fn default() -> Self {
        DashboardState::new(
            Workspaces::default(),
            false,
            UserSettings::default(),
            Vec::new(),
        )
    }
}

type Listener = Box<dyn FnMut(&DashboardState, Change)>;

pub struct DashboardStore {
    state: DashboardState,
    sequencer: PollSequencer,
    listeners: Vec<Listener>,
}

impl DashboardStore {
    pub fn new(state: DashboardState) -> Self {
        DashboardStore {
            state,
            sequencer: PollSequencer::default(),
            listeners: Vec::new(),
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&DashboardState, Change) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn commit(&mut self, change: Change) {
        for listener in &mut self.listeners {
            listener(&self.state, change);
        }
    }

    // --- binding controller ---

    /// Binds a session to a window, detaching it from wherever else it was
    /// bound first. Dragging always steals; there is no "already bound
    /// elsewhere" error. Unknown window ids make the whole call a no-op.
    pub fn bind_session(&mut self, workspace: WorkspaceId, window_id: &str, name: &str) -> bool {
        let changed = bindings::bind(&mut self.state.workspaces, workspace, window_id, name);
        if changed {
            self.commit(Change::State);
        }
        changed
    }

    pub fn unbind_session(&mut self, workspace: WorkspaceId, window_id: &str, name: &str) -> bool {
        let changed = bindings::unbind(&mut self.state.workspaces, workspace, window_id, name);
        if changed {
            self.commit(Change::State);
        }
        changed
    }

    pub fn set_active_session(
        &mut self,
        workspace: WorkspaceId,
        window_id: &str,
        name: &str,
    ) -> bool {
        let changed = bindings::set_active(&mut self.state.workspaces, workspace, window_id, name);
        if changed {
            self.commit(Change::State);
        }
        changed
    }

    pub fn cycle_session(
        &mut self,
        workspace: WorkspaceId,
        window_id: &str,
        direction: CycleDirection,
    ) -> bool {
        let changed = bindings::cycle(&mut self.state.workspaces, workspace, window_id, direction);
        if changed {
            self.commit(Change::State);
        }
        changed
    }

    pub fn set_window_count(&mut self, workspace: WorkspaceId, count: usize) -> bool {
        let changed = bindings::set_window_count(&mut self.state.workspaces, workspace, count);
        if changed {
            self.commit(Change::State);
        }
        changed
    }

    // --- UI state ---

    pub fn toggle_sidebar(&mut self) {
        self.state.sidebar_collapsed = !self.state.sidebar_collapsed;
        self.commit(Change::State);
    }

    pub fn update_settings(&mut self, update: SettingsUpdate) {
        self.state.settings.apply(update);
        self.commit(Change::State);
    }

    pub fn open_floating(&mut self, name: &str) {
        self.state.floating_session = Some(name.to_string());
        self.commit(Change::View);
    }

    pub fn close_floating(&mut self) {
        if self.state.floating_session.take().is_some() {
            self.commit(Change::View);
        }
    }

    /// Clicking a session activates it where it is bound, or previews it in
    /// the floating modal when it is not bound anywhere.
    pub fn handle_session_click(&mut self, name: &str) {
        let bound = self
            .state
            .workspaces
            .find_binding(name)
            .map(|(ws, window_id)| (ws, window_id.to_string()));
        match bound {
            Some((ws, window_id)) => {
                self.set_active_session(ws, &window_id, name);
            }
            None => self.open_floating(name),
        }
    }

    // --- presets ---

    /// Snapshots the current layout under `name`. Refuses past the cap and
    /// for blank names; the store is left untouched on refusal.
    pub fn save_preset(&mut self, name: &str) -> Result<bool> {
        let saved = presets::save(&mut self.state, name)?;
        if saved {
            self.commit(Change::Presets);
        }
        Ok(saved)
    }

    pub fn load_preset(&mut self, id: &str) -> bool {
        let loaded = presets::load(&mut self.state, id);
        if loaded {
            self.commit(Change::State);
        }
        loaded
    }

    pub fn rename_preset(&mut self, id: &str, name: &str) -> bool {
        let renamed = presets::rename(&mut self.state, id, name);
        if renamed {
            self.commit(Change::Presets);
        }
        renamed
    }

    pub fn delete_preset(&mut self, id: &str) {
        if presets::delete(&mut self.state, id) {
            self.commit(Change::Presets);
        }
    }

    // --- polling ---

    /// Hands out the ticket for the poll about to be issued.
    pub fn begin_poll(&mut self) -> u64 {
        self.sequencer.begin()
    }

    /// Applies a poll result unless a newer one already landed. Window
    /// bindings are never touched here: a bound session missing from the
    /// response stays bound until the user removes it.
    pub fn apply_poll(&mut self, ticket: u64, result: Result<SessionsResponse>) -> bool {
        if !self.sequencer.admit(ticket) {
            return false;
        }
        poll::apply(&mut self.state, result);
        self.commit(Change::View);
        true
    }
}
