use std::io;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::dashboard::{CycleDirection, DashboardStore};
use crate::model::{PRESET_CAP, WorkspaceId};
use crate::poller::SessionPoller;
use crate::remote::RemoteClient;
use crate::sessions::ordered_groups;
use crate::store::{LocalStore, attach_persistence};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) enum UiMode {
    Normal,
    /// Preset panel open, arrow-selectable.
    Presets,
    /// Typing a preset name; every other shortcut is swallowed.
    SavePreset { input: String },
}

pub(super) struct App {
    pub(super) store: DashboardStore,
    pub(super) remote: RemoteClient,
    poller: SessionPoller,

    pub(super) focused_workspace: WorkspaceId,
    pub(super) focused_window: usize,
    pub(super) sidebar_index: usize,
    pub(super) preset_index: usize,
    pub(super) mode: UiMode,
    pub(super) status: Option<String>,
    pub(super) quit: bool,
}

impl App {
    pub(super) fn open(data_dir: &Path, server: &str) -> Result<Self> {
        let local = LocalStore::open(data_dir)?;
        let mut store = DashboardStore::new(local.load());
        attach_persistence(&mut store, local);

        let remote = RemoteClient::new(server)?;
        let poller = SessionPoller::spawn(
            remote.clone(),
            store.state().settings.auto_refresh_interval,
        );

        Ok(App {
            store,
            remote,
            poller,
            focused_workspace: WorkspaceId::Terminal1,
            focused_window: 0,
            sidebar_index: 0,
            preset_index: 0,
            mode: UiMode::Normal,
            status: None,
            quit: false,
        })
    }

    fn drain_poller(&mut self) {
        for event in self.poller.drain() {
            self.store.apply_poll(event.ticket, event.result);
        }
        self.poller
            .set_interval_ms(self.store.state().settings.auto_refresh_interval);
        let session_count = self.sidebar_sessions().len();
        if session_count > 0 && self.sidebar_index >= session_count {
            self.sidebar_index = session_count - 1;
        }
    }

    /// Flat sidebar listing in group display order.
    pub(super) fn sidebar_sessions(&self) -> Vec<String> {
        let grouped = &self.store.state().grouped;
        let mut out = Vec::new();
        for group in ordered_groups(grouped) {
            if let Some(members) = grouped.get(group) {
                out.extend(members.iter().map(|s| s.name.clone()));
            }
        }
        out
    }

    pub(super) fn focused_window_id(&self) -> String {
        format!("window-{}", self.focused_window)
    }

    fn selected_session(&self) -> Option<String> {
        self.sidebar_sessions().get(self.sidebar_index).cloned()
    }

    fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    pub(super) fn handle_key(&mut self, key: KeyEvent) {
        match self.mode.clone() {
            UiMode::SavePreset { input } => self.handle_save_preset_key(key, input),
            UiMode::Presets => self.handle_presets_key(key),
            UiMode::Normal => self.handle_normal_key(key),
        }
    }

    fn handle_save_preset_key(&mut self, key: KeyEvent, mut input: String) {
        match key.code {
            KeyCode::Esc => self.mode = UiMode::Presets,
            KeyCode::Enter => {
                match self.store.save_preset(&input) {
                    Ok(true) => self.set_status(format!("saved preset {}", input.trim())),
                    Ok(false) => self.set_status(format!(
                        "not saved: blank name or all {} preset slots used",
                        PRESET_CAP
                    )),
                    Err(err) => self.set_status(format!("preset save failed: {:#}", err)),
                }
                self.mode = UiMode::Presets;
            }
            KeyCode::Backspace => {
                input.pop();
                self.mode = UiMode::SavePreset { input };
            }
            KeyCode::Char(c) => {
                input.push(c);
                self.mode = UiMode::SavePreset { input };
            }
            _ => {}
        }
    }

    fn handle_presets_key(&mut self, key: KeyEvent) {
        let preset_count = self.store.state().presets.len();
        match key.code {
            KeyCode::Esc | KeyCode::Char('p') | KeyCode::Char('q') => {
                self.mode = UiMode::Normal;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.preset_index = self.preset_index.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if preset_count > 0 && self.preset_index + 1 < preset_count {
                    self.preset_index += 1;
                }
            }
            KeyCode::Enter => {
                let selected = self
                    .store
                    .state()
                    .presets
                    .get(self.preset_index)
                    .map(|p| (p.id.clone(), p.name.clone()));
                match selected {
                    Some((id, name)) => {
                        if self.store.load_preset(&id) {
                            self.set_status(format!("loaded preset {}", name));
                        } else {
                            self.set_status(format!("preset {} not found", name));
                        }
                        self.mode = UiMode::Normal;
                    }
                    None => self.set_status("no preset selected"),
                }
            }
            KeyCode::Char('d') => {
                if let Some(id) = self
                    .store
                    .state()
                    .presets
                    .get(self.preset_index)
                    .map(|p| p.id.clone())
                {
                    self.store.delete_preset(&id);
                    self.preset_index = self.preset_index.saturating_sub(1);
                    self.set_status("preset deleted");
                }
            }
            KeyCode::Char('S') => {
                self.mode = UiMode::SavePreset {
                    input: String::new(),
                };
            }
            _ => {}
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        // The floating preview swallows everything until dismissed.
        if self.store.state().floating_session.is_some() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
                self.store.close_floating();
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.quit = true,
            KeyCode::Tab => {
                self.focused_workspace = self.focused_workspace.other();
                self.focused_window = 0;
            }
            KeyCode::Char(c @ '1'..='4') => {
                let ordinal = (c as usize) - ('1' as usize);
                let count = self
                    .store
                    .state()
                    .workspaces
                    .get(self.focused_workspace)
                    .window_count;
                if ordinal < count {
                    self.focused_window = ordinal;
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let count = self.sidebar_sessions().len();
                if count > 0 && self.sidebar_index + 1 < count {
                    self.sidebar_index += 1;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.sidebar_index = self.sidebar_index.saturating_sub(1);
            }
            KeyCode::Char(']') => {
                let window = self.focused_window_id();
                self.store
                    .cycle_session(self.focused_workspace, &window, CycleDirection::Next);
            }
            KeyCode::Char('[') => {
                let window = self.focused_window_id();
                self.store
                    .cycle_session(self.focused_workspace, &window, CycleDirection::Prev);
            }
            KeyCode::Char('b') => {
                if let Some(session) = self.selected_session() {
                    let window = self.focused_window_id();
                    if self
                        .store
                        .bind_session(self.focused_workspace, &window, &session)
                    {
                        self.set_status(format!(
                            "bound {} to {}/{}",
                            session, self.focused_workspace, window
                        ));
                    }
                }
            }
            KeyCode::Enter => {
                if let Some(session) = self.selected_session() {
                    self.store.handle_session_click(&session);
                }
            }
            KeyCode::Char('u') => {
                let window = self.focused_window_id();
                let active = self
                    .store
                    .state()
                    .workspaces
                    .get(self.focused_workspace)
                    .window(&window)
                    .and_then(|w| w.active_session.clone());
                if let Some(session) = active {
                    self.store
                        .unbind_session(self.focused_workspace, &window, &session);
                    self.set_status(format!("unbound {}", session));
                }
            }
            KeyCode::Char('s') => self.store.toggle_sidebar(),
            KeyCode::Char('+') | KeyCode::Char('=') => {
                let count = self
                    .store
                    .state()
                    .workspaces
                    .get(self.focused_workspace)
                    .window_count;
                self.store.set_window_count(self.focused_workspace, count + 1);
            }
            KeyCode::Char('-') => {
                let count = self
                    .store
                    .state()
                    .workspaces
                    .get(self.focused_workspace)
                    .window_count;
                if count > 1 {
                    self.store.set_window_count(self.focused_workspace, count - 1);
                    let new_count = self
                        .store
                        .state()
                        .workspaces
                        .get(self.focused_workspace)
                        .window_count;
                    if self.focused_window >= new_count {
                        self.focused_window = new_count - 1;
                    }
                }
            }
            KeyCode::Char('n') => {
                let name = crate::util::generated_session_name(
                    &self.store.state().settings.default_session_prefix,
                );
                match self.remote.create_session(Some(&name)) {
                    Ok(name) => {
                        self.set_status(format!("created {}", name));
                        self.poller.request_refresh();
                    }
                    Err(err) => self.set_status(format!("create failed: {:#}", err)),
                }
            }
            KeyCode::Char('r') => {
                self.poller.request_refresh();
                self.set_status("refreshing");
            }
            KeyCode::Char('p') => {
                self.preset_index = 0;
                self.mode = UiMode::Presets;
            }
            _ => {}
        }
    }
}

pub(super) fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        app.drain_poller();

        terminal
            .draw(|f| super::render::draw(f, app))
            .context("draw")?;
        if app.quit {
            return Ok(());
        }

        if event::poll(Duration::from_millis(100)).context("poll")? {
            match event::read().context("read event")? {
                Event::Key(k) if k.kind == KeyEventKind::Press => app.handle_key(k),
                _ => {}
            }
        }
    }
}
