use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};

use gastown::dashboard::{CycleDirection, DashboardStore};
use gastown::model::{
    AppearanceRequest, PRESET_CAP, SettingsUpdate, TerminalMode, Theme, WorkspaceId,
};
use gastown::remote::RemoteClient;
use gastown::sessions::{group_display_name, ordered_groups, validate_session_name};
use gastown::store::{LocalStore, attach_persistence};
use gastown::util::generated_session_name;

use crate::Commands;
use crate::cli_subcommands::{PresetsCommand, SettingsCommand};

pub(crate) fn handle_command(dir: &Path, server: &str, command: Commands) -> Result<()> {
    match command {
        Commands::Sessions { json } => sessions(server, json),
        Commands::Create { name } => create(dir, server, name),
        Commands::Rename { old, new } => {
            validate_session_name(&old, "current session name")?;
            validate_session_name(&new, "new session name")?;
            RemoteClient::new(server)?.rename_session(&old, &new)?;
            println!("renamed {} -> {}", old, new);
            Ok(())
        }
        Commands::Kill { name } => {
            validate_session_name(&name, "session name")?;
            RemoteClient::new(server)?.kill_session(&name)?;
            println!("killed {}", name);
            Ok(())
        }
        Commands::Nuke { yes } => {
            if !yes {
                anyhow::bail!("refusing to kill every session without --yes");
            }
            let killed = RemoteClient::new(server)?.nuke_sessions()?;
            println!("killed {} sessions", killed);
            Ok(())
        }
        Commands::Appearance {
            status_bg,
            status_fg,
            pane_border_active,
            pane_border_inactive,
            mode_style_bg,
            mode_style_fg,
        } => {
            let request = AppearanceRequest {
                status_bg: status_bg.unwrap_or_default(),
                status_fg: status_fg.unwrap_or_default(),
                pane_border_active: pane_border_active.unwrap_or_default(),
                pane_border_inactive: pane_border_inactive.unwrap_or_default(),
                mode_style_bg: mode_style_bg.unwrap_or_default(),
                mode_style_fg: mode_style_fg.unwrap_or_default(),
            };
            let (applied, total) = RemoteClient::new(server)?.apply_appearance(&request)?;
            println!("applied {}/{} style changes", applied, total);
            Ok(())
        }
        Commands::Bind {
            workspace,
            window,
            session,
        } => {
            validate_session_name(&session, "session name")?;
            let workspace = WorkspaceId::from_str(&workspace)?;
            let window = window_id(&window);
            let mut store = open_store(dir)?;
            if store.bind_session(workspace, &window, &session) {
                println!("bound {} to {}/{}", session, workspace, window);
            } else {
                println!("no change ({}/{} missing or already showing {})", workspace, window, session);
            }
            Ok(())
        }
        Commands::Unbind {
            workspace,
            window,
            session,
        } => {
            let workspace = WorkspaceId::from_str(&workspace)?;
            let window = window_id(&window);
            let mut store = open_store(dir)?;
            if store.unbind_session(workspace, &window, &session) {
                println!("unbound {} from {}/{}", session, workspace, window);
            } else {
                println!("{} was not bound to {}/{}", session, workspace, window);
            }
            Ok(())
        }
        Commands::Activate {
            workspace,
            window,
            session,
        } => {
            let workspace = WorkspaceId::from_str(&workspace)?;
            let window = window_id(&window);
            let mut store = open_store(dir)?;
            if store.set_active_session(workspace, &window, &session) {
                println!("{}/{} now shows {}", workspace, window, session);
            } else {
                println!("no change ({} is not bound to {}/{})", session, workspace, window);
            }
            Ok(())
        }
        Commands::Cycle {
            workspace,
            window,
            direction,
        } => {
            let workspace = WorkspaceId::from_str(&workspace)?;
            let window = window_id(&window);
            let direction = CycleDirection::from_str(&direction)?;
            let mut store = open_store(dir)?;
            store.cycle_session(workspace, &window, direction);
            match store
                .state()
                .workspaces
                .get(workspace)
                .window(&window)
                .and_then(|w| w.active_session.as_deref())
            {
                Some(active) => println!("{}/{} now shows {}", workspace, window, active),
                None => println!("{}/{} has nothing bound", workspace, window),
            }
            Ok(())
        }
        Commands::Windows { workspace, count } => {
            let workspace = WorkspaceId::from_str(&workspace)?;
            let mut store = open_store(dir)?;
            store.set_window_count(workspace, count);
            println!(
                "{} now has {} windows",
                workspace,
                store.state().workspaces.get(workspace).window_count
            );
            Ok(())
        }
        Commands::Layout { json } => layout(dir, json),
        Commands::Presets { command } => presets(dir, command),
        Commands::Settings { command } => settings(dir, command),
        Commands::Tui => gastown::tui::run(dir, server),
    }
}

fn open_store(dir: &Path) -> Result<DashboardStore> {
    let local = LocalStore::open(dir)?;
    let mut store = DashboardStore::new(local.load());
    attach_persistence(&mut store, local);
    Ok(store)
}

/// Accepts either a full window id or a bare ordinal.
fn window_id(arg: &str) -> String {
    match arg.parse::<usize>() {
        Ok(ordinal) => format!("window-{}", ordinal),
        Err(_) => arg.to_string(),
    }
}

fn sessions(server: &str, json: bool) -> Result<()> {
    let response = RemoteClient::new(server)?.list_sessions()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    if let Some(error) = &response.error {
        println!("server error: {}", error);
    }
    if response.sessions.is_empty() {
        println!("no sessions");
        return Ok(());
    }
    for group in ordered_groups(&response.grouped) {
        println!("{}:", group_display_name(group));
        if let Some(members) = response.grouped.get(group) {
            for session in members {
                println!(
                    "  {} ({} windows{})",
                    session.name,
                    session.windows,
                    if session.attached { ", attached" } else { "" }
                );
            }
        }
    }
    Ok(())
}

fn create(dir: &Path, server: &str, name: Option<String>) -> Result<()> {
    // An unnamed session gets the configured prefix plus a time suffix,
    // the same scheme the server falls back to.
    let name = match name {
        Some(name) => name,
        None => {
            let store = open_store(dir)?;
            generated_session_name(&store.state().settings.default_session_prefix)
        }
    };
    validate_session_name(&name, "session name")?;
    let created = RemoteClient::new(server)?.create_session(Some(&name))?;
    println!("created {}", created);
    Ok(())
}

fn layout(dir: &Path, json: bool) -> Result<()> {
    let store = open_store(dir)?;
    let state = store.state();
    if json {
        println!("{}", serde_json::to_string_pretty(&state.workspaces)?);
        return Ok(());
    }

    for (id, workspace) in state.workspaces.iter() {
        println!("{} ({} windows):", id, workspace.window_count);
        for window in &workspace.windows {
            let tabs: Vec<String> = window
                .bound_sessions
                .iter()
                .map(|name| {
                    if window.active_session.as_deref() == Some(name) {
                        format!("[{}]", name)
                    } else {
                        name.clone()
                    }
                })
                .collect();
            println!(
                "  {}: {}",
                window.id,
                if tabs.is_empty() {
                    "(empty)".to_string()
                } else {
                    tabs.join(" ")
                }
            );
        }
    }
    Ok(())
}

fn presets(dir: &Path, command: PresetsCommand) -> Result<()> {
    let mut store = open_store(dir)?;
    match command {
        PresetsCommand::List { json } => {
            let presets = &store.state().presets;
            if json {
                println!("{}", serde_json::to_string_pretty(presets)?);
                return Ok(());
            }
            if presets.is_empty() {
                println!("no presets saved");
                return Ok(());
            }
            for preset in presets {
                let mut windows = 0;
                let mut sessions = 0;
                for (_, workspace) in preset.workspaces.iter() {
                    windows += workspace.window_count;
                    for window in &workspace.windows {
                        sessions += window.bound_sessions.len();
                    }
                }
                println!(
                    "{}  {} ({} windows, {} sessions, saved {})",
                    preset.id, preset.name, windows, sessions, preset.created_at
                );
            }
        }
        PresetsCommand::Save { name } => {
            if store.save_preset(&name)? {
                println!("saved preset {}", name.trim());
            } else {
                println!(
                    "not saved: name must be non-empty and at most {} presets are kept",
                    PRESET_CAP
                );
            }
        }
        PresetsCommand::Load { id } => {
            if store.load_preset(&id) {
                println!("loaded preset {}", id);
            } else {
                println!("no preset with id {}", id);
            }
        }
        PresetsCommand::Rename { id, name } => {
            if store.rename_preset(&id, &name) {
                println!("renamed preset {}", id);
            } else {
                println!("rename failed (unknown id or bad name)");
            }
        }
        PresetsCommand::Delete { id } => {
            store.delete_preset(&id);
            println!("deleted preset {} (if it existed)", id);
        }
    }
    Ok(())
}

fn settings(dir: &Path, command: SettingsCommand) -> Result<()> {
    let mut store = open_store(dir)?;
    match command {
        SettingsCommand::Show { json } => {
            let settings = &store.state().settings;
            if json {
                println!("{}", serde_json::to_string_pretty(settings)?);
                return Ok(());
            }
            println!("theme: {:?}", settings.theme);
            println!("terminalMode: {:?}", settings.terminal_mode);
            println!("fontSize: {}", settings.font_size);
            println!("autoRefreshInterval: {}ms", settings.auto_refresh_interval);
            println!("defaultSessionPrefix: {}", settings.default_session_prefix);
            println!("musicVolume: {}", settings.music_volume);
            println!("musicEnabled: {}", settings.music_enabled);
        }
        SettingsCommand::Set { key, value } => {
            store.update_settings(settings_update(&key, &value)?);
            println!("{} set", key);
        }
    }
    Ok(())
}

fn settings_update(key: &str, value: &str) -> Result<SettingsUpdate> {
    let mut update = SettingsUpdate::default();
    match key {
        "theme" => {
            update.theme = Some(match value {
                "matrix" => Theme::Matrix,
                "dark" => Theme::Dark,
                "gastown" => Theme::Gastown,
                other => anyhow::bail!("unknown theme {}", other),
            });
        }
        "terminalMode" => {
            update.terminal_mode = Some(match value {
                "tmux" => TerminalMode::Tmux,
                "shell" => TerminalMode::Shell,
                other => anyhow::bail!("unknown terminal mode {}", other),
            });
        }
        "fontSize" => {
            update.font_size = Some(value.parse().context("fontSize must be a number")?);
        }
        "autoRefreshInterval" => {
            update.auto_refresh_interval = Some(
                value
                    .parse()
                    .context("autoRefreshInterval must be milliseconds")?,
            );
        }
        "defaultSessionPrefix" => {
            update.default_session_prefix = Some(value.to_string());
        }
        "musicVolume" => {
            update.music_volume = Some(value.parse().context("musicVolume must be 0-1")?);
        }
        "musicEnabled" => {
            update.music_enabled = Some(value.parse().context("musicEnabled must be a bool")?);
        }
        other => anyhow::bail!("unknown setting {}", other),
    }
    Ok(update)
}
