//! Poll bookkeeping. Responses can arrive out of order under a slow
//! backend; every poll takes a monotonic ticket and anything older than the
//! last-applied ticket is discarded instead of clobbering newer data.

use anyhow::Result;

use crate::model::SessionsResponse;

use super::DashboardState;

#[derive(Debug, Default)]
pub struct PollSequencer {
    next_ticket: u64,
    last_applied: u64,
}

impl PollSequencer {
    pub fn begin(&mut self) -> u64 {
        self.next_ticket += 1;
        self.next_ticket
    }

    pub fn admit(&mut self, ticket: u64) -> bool {
        if ticket <= self.last_applied {
            return false;
        }
        self.last_applied = ticket;
        true
    }
}

pub(super) fn apply(state: &mut DashboardState, result: Result<SessionsResponse>) {
    match result {
        Ok(response) => {
            if let Some(error) = response.error {
                state.poll_error = Some(error);
                state.sessions.clear();
                state.grouped.clear();
            } else {
                state.poll_error = None;
                state.sessions = response.sessions;
                state.grouped = response.grouped;
            }
        }
        // Transient fetch failure: flag it, keep showing what we had. The
        // next tick retries.
        Err(err) => {
            state.poll_error = Some(format!("failed to fetch sessions: {:#}", err));
        }
    }
    state.loading = false;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::DashboardStore;
    use crate::model::{TmuxSession, WorkspaceId::Terminal1};
    use crate::sessions::{categorize_session, group_sessions};

    fn response(names: &[&str]) -> SessionsResponse {
        let sessions: Vec<TmuxSession> = names
            .iter()
            .map(|name| TmuxSession {
                name: name.to_string(),
                windows: 1,
                attached: false,
                group: categorize_session(name),
            })
            .collect();
        SessionsResponse {
            grouped: group_sessions(&sessions),
            sessions,
            timestamp: String::new(),
            error: None,
        }
    }

    #[test]
    fn poll_omission_never_unbinds() {
        let mut store = DashboardStore::new(DashboardState::default());
        store.bind_session(Terminal1, "window-0", "agent-7");

        let ticket = store.begin_poll();
        store.apply_poll(ticket, Ok(response(&["agent-7", "hq-mayor"])));
        assert!(store.state().is_session_reported("agent-7"));

        let ticket = store.begin_poll();
        store.apply_poll(ticket, Ok(response(&["hq-mayor"])));

        // Gone from the poll, still bound; just rendered disconnected.
        assert!(!store.state().is_session_reported("agent-7"));
        assert_eq!(
            store.state().workspaces.find_binding("agent-7"),
            Some((Terminal1, "window-0"))
        );
    }

    #[test]
    fn stale_responses_are_discarded() {
        let mut store = DashboardStore::new(DashboardState::default());
        let slow = store.begin_poll();
        let fast = store.begin_poll();

        assert!(store.apply_poll(fast, Ok(response(&["hq-new"]))));
        assert!(!store.apply_poll(slow, Ok(response(&["hq-old"]))));
        assert_eq!(store.state().sessions[0].name, "hq-new");
    }

    #[test]
    fn backend_error_flags_and_clears_the_list() {
        let mut store = DashboardStore::new(DashboardState::default());
        let ticket = store.begin_poll();
        store.apply_poll(ticket, Ok(response(&["hq-mayor"])));

        let ticket = store.begin_poll();
        store.apply_poll(
            ticket,
            Ok(SessionsResponse {
                error: Some("tmux exploded".to_string()),
                ..SessionsResponse::default()
            }),
        );
        assert_eq!(store.state().poll_error.as_deref(), Some("tmux exploded"));
        assert!(store.state().sessions.is_empty());
    }

    #[test]
    fn fetch_failure_keeps_last_good_list() {
        let mut store = DashboardStore::new(DashboardState::default());
        let ticket = store.begin_poll();
        store.apply_poll(ticket, Ok(response(&["hq-mayor"])));

        let ticket = store.begin_poll();
        store.apply_poll(ticket, Err(anyhow::anyhow!("connection refused")));
        assert!(store.state().poll_error.is_some());
        assert_eq!(store.state().sessions.len(), 1);
        assert!(!store.state().loading);
    }
}
