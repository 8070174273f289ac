use clap::Subcommand;

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// List sessions reported by the server, grouped and sorted
    Sessions {
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a session (server-named when --name is omitted)
    Create {
        #[arg(long)]
        name: Option<String>,
    },

    /// Rename a session
    Rename { old: String, new: String },

    /// Kill a session
    Kill { name: String },

    /// Kill every session (the whole tmux server)
    Nuke {
        /// Required confirmation
        #[arg(long)]
        yes: bool,
    },

    /// Push tmux appearance styles
    Appearance {
        #[arg(long)]
        status_bg: Option<String>,

        #[arg(long)]
        status_fg: Option<String>,

        #[arg(long)]
        pane_border_active: Option<String>,

        #[arg(long)]
        pane_border_inactive: Option<String>,

        #[arg(long)]
        mode_style_bg: Option<String>,

        #[arg(long)]
        mode_style_fg: Option<String>,
    },

    /// Bind a session to a window (steals it from wherever it was)
    Bind {
        workspace: String,
        window: String,
        session: String,
    },

    /// Unbind a session from a window
    Unbind {
        workspace: String,
        window: String,
        session: String,
    },

    /// Make a bound session the displayed one in its window
    Activate {
        workspace: String,
        window: String,
        session: String,
    },

    /// Cycle a window's displayed session (next or prev)
    Cycle {
        workspace: String,
        window: String,
        direction: String,
    },

    /// Set a workspace's window count (1-4)
    Windows { workspace: String, count: usize },

    /// Show the current two-workspace layout
    Layout {
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage layout presets
    Presets {
        #[command(subcommand)]
        command: PresetsCommand,
    },

    /// Show or change settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },

    /// Launch the dashboard shell
    Tui,
}

#[derive(Subcommand)]
pub(crate) enum PresetsCommand {
    /// List saved presets
    List {
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Snapshot the current layout under a name
    Save { name: String },

    /// Replace the live layout with a preset
    Load { id: String },

    /// Rename a preset
    Rename { id: String, name: String },

    /// Delete a preset
    Delete { id: String },
}

#[derive(Subcommand)]
pub(crate) enum SettingsCommand {
    /// Show settings
    Show {
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Set one setting by key (theme, fontSize, autoRefreshInterval,
    /// defaultSessionPrefix, terminalMode, musicVolume, musicEnabled)
    Set { key: String, value: String },
}
