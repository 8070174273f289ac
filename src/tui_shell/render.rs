use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap};

use crate::model::{TerminalWindow, Theme};
use crate::sessions::{group_display_name, ordered_groups};

use super::app::{App, UiMode};

/// One theme per window ordinal: blue, purple, green, orange.
const WINDOW_COLORS: [Color; 4] = [Color::Blue, Color::Magenta, Color::Green, Color::Yellow];

fn accent(app: &App) -> Color {
    match app.store.state().settings.theme {
        Theme::Matrix => Color::Green,
        Theme::Dark => Color::White,
        Theme::Gastown => Color::Yellow,
    }
}

pub(super) fn draw(f: &mut Frame, app: &App) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(f.area());

    if app.store.state().sidebar_collapsed {
        draw_workspace(f, outer[0], app);
    } else {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(28), Constraint::Min(20)])
            .split(outer[0]);
        draw_sidebar(f, columns[0], app);
        draw_workspace(f, columns[1], app);
    }

    draw_status(f, outer[1], app);

    match &app.mode {
        UiMode::Presets => draw_presets(f, app),
        UiMode::SavePreset { input } => draw_save_preset(f, app, input),
        UiMode::Normal => {}
    }

    if let Some(session) = &app.store.state().floating_session {
        draw_floating(f, app, session);
    }
}

fn draw_sidebar(f: &mut Frame, area: Rect, app: &App) {
    let state = app.store.state();
    let mut items: Vec<ListItem> = Vec::new();
    let mut flat_index = 0usize;

    for group in ordered_groups(&state.grouped) {
        items.push(ListItem::new(Line::from(Span::styled(
            group_display_name(group),
            Style::default()
                .fg(accent(app))
                .add_modifier(Modifier::BOLD),
        ))));

        let Some(members) = state.grouped.get(group) else {
            continue;
        };
        for session in members {
            let mut style = Style::default();
            let mut marker = "  ";
            if let Some((_, window_id)) = state.workspaces.find_binding(&session.name) {
                // Tint assigned sessions with their window's color.
                let ordinal: usize = window_id
                    .rsplit('-')
                    .next()
                    .and_then(|n| n.parse().ok())
                    .unwrap_or(0);
                style = style.fg(WINDOW_COLORS[ordinal % WINDOW_COLORS.len()]);
                marker = "● ";
            }
            if flat_index == app.sidebar_index {
                style = style.add_modifier(Modifier::REVERSED);
            }
            let attached = if session.attached { "*" } else { "" };
            items.push(ListItem::new(Line::from(Span::styled(
                format!("{}{}{}", marker, session.name, attached),
                style,
            ))));
            flat_index += 1;
        }
    }

    if items.is_empty() {
        let text = if state.loading {
            "loading..."
        } else {
            "no sessions"
        };
        items.push(ListItem::new(Line::from(Span::styled(
            text,
            Style::default().fg(Color::DarkGray),
        ))));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title("sessions")
        .border_style(Style::default().fg(Color::DarkGray));
    f.render_widget(List::new(items).block(block), area);
}

fn draw_workspace(f: &mut Frame, area: Rect, app: &App) {
    let workspace = app.store.state().workspaces.get(app.focused_workspace);
    let panes = window_grid(area, workspace.window_count);

    for (ordinal, window) in workspace.windows.iter().enumerate() {
        let Some(pane) = panes.get(ordinal) else {
            break;
        };
        draw_window(f, *pane, app, window, ordinal == app.focused_window);
    }
}

fn window_grid(area: Rect, count: usize) -> Vec<Rect> {
    match count {
        0 | 1 => vec![area],
        2 => Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area)
            .to_vec(),
        _ => {
            let rows = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(area);
            let top = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(rows[0]);
            let bottom = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(if count == 3 {
                    [Constraint::Percentage(100), Constraint::Percentage(0)]
                } else {
                    [Constraint::Percentage(50), Constraint::Percentage(50)]
                })
                .split(rows[1]);
            let mut panes = vec![top[0], top[1], bottom[0]];
            if count == 4 {
                panes.push(bottom[1]);
            }
            panes
        }
    }
}

fn draw_window(f: &mut Frame, area: Rect, app: &App, window: &TerminalWindow, focused: bool) {
    let color = WINDOW_COLORS[usize::from(window.color_index) % WINDOW_COLORS.len()];
    let mut border = Style::default().fg(color);
    if focused {
        border = border.add_modifier(Modifier::BOLD);
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(window.id.clone());

    let state = app.store.state();
    let mut lines: Vec<Line> = Vec::new();

    let mut tabs: Vec<Span> = Vec::new();
    for name in &window.bound_sessions {
        let mut style = Style::default();
        if window.active_session.as_deref() == Some(name.as_str()) {
            style = style.fg(color).add_modifier(Modifier::BOLD);
        }
        let disconnected = !state.is_session_reported(name);
        let label = if disconnected {
            style = style.fg(Color::DarkGray);
            format!(" {}! ", name)
        } else {
            format!(" {} ", name)
        };
        tabs.push(Span::styled(label, style));
    }
    lines.push(Line::from(tabs));
    lines.push(Line::from(""));

    match &window.active_session {
        Some(active) => {
            let disconnected = !state.is_session_reported(active);
            lines.push(Line::from(Span::styled(
                active.clone(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )));
            if disconnected {
                lines.push(Line::from(Span::styled(
                    "disconnected (not reported by last poll)",
                    Style::default().fg(Color::DarkGray),
                )));
            }
        }
        None => lines.push(Line::from(Span::styled(
            "drop a session here (b to bind)",
            Style::default().fg(Color::DarkGray),
        ))),
    }

    f.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: true }), area);
}

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    let state = app.store.state();
    let mut spans = vec![Span::styled(
        format!(" {} ", app.focused_workspace),
        Style::default()
            .fg(accent(app))
            .add_modifier(Modifier::BOLD),
    )];

    if let Some(error) = &state.poll_error {
        spans.push(Span::styled(
            format!(" {} ", error),
            Style::default().fg(Color::Red),
        ));
    }
    if let Some(status) = &app.status {
        spans.push(Span::raw(format!(" {} ", status)));
    }
    spans.push(Span::styled(
        " tab workspace · 1-4 focus · b bind · u unbind · [/] cycle · p presets · s sidebar · n new · q quit",
        Style::default().fg(Color::DarkGray),
    ));

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_presets(f: &mut Frame, app: &App) {
    let area = centered_rect(f.area(), 50, 40);
    f.render_widget(Clear, area);

    let presets = &app.store.state().presets;
    let mut items: Vec<ListItem> = Vec::new();
    if presets.is_empty() {
        items.push(ListItem::new("no presets saved (S to save current layout)"));
    }
    for (index, preset) in presets.iter().enumerate() {
        let mut style = Style::default();
        if index == app.preset_index {
            style = style.add_modifier(Modifier::REVERSED);
        }
        items.push(ListItem::new(Line::from(Span::styled(
            format!("{}  ({})", preset.name, preset.created_at),
            style,
        ))));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent(app)))
        .title("layout presets: enter load · d delete · S save · esc close");
    f.render_widget(List::new(items).block(block), area);
}

fn draw_save_preset(f: &mut Frame, app: &App, input: &str) {
    let area = centered_rect(f.area(), 40, 12);
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent(app)))
        .title("save preset: enter confirm · esc cancel");
    f.render_widget(
        Paragraph::new(Line::from(vec![
            Span::raw("name: "),
            Span::styled(input, Style::default().add_modifier(Modifier::BOLD)),
            Span::styled("_", Style::default().fg(Color::DarkGray)),
        ]))
        .block(block),
        area,
    );
}

fn draw_floating(f: &mut Frame, app: &App, session: &str) {
    let area = centered_rect(f.area(), 46, 20);
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent(app)))
        .title("session preview: esc close");
    let lines = vec![
        Line::from(Span::styled(
            session,
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("not bound to any window; use b to bind it to the focused one"),
    ];
    f.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: true }), area);
}

fn centered_rect(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}
