//! Session naming conventions: grouping, sort order, and name validation.
//!
//! Sessions are grouped by name prefix: `hq-*` is the headquarters group,
//! `main`/`shell` are the operator's own terminals, `gt-<rig>-*` belongs to
//! the rig named in the second segment, everything else is `other`.

use std::collections::BTreeMap;

use anyhow::Result;

use crate::model::{SESSION_NAME_MAX, TmuxSession};

pub fn categorize_session(name: &str) -> String {
    if name.starts_with("hq-") {
        return "hq".to_string();
    }
    if name == "main" || name == "shell" {
        return "main".to_string();
    }
    if name.starts_with("gt-") {
        let mut parts = name.splitn(3, '-');
        let prefix = parts.next().unwrap_or_default();
        match parts.next() {
            Some(rig) if !rig.is_empty() => return format!("{}-{}", prefix, rig),
            _ => return "gt-unknown".to_string(),
        }
    }
    "other".to_string()
}

pub fn group_priority(group: &str) -> u32 {
    match group {
        "hq" => 0,
        "main" => 1,
        _ if group.starts_with("gt-") => 2,
        _ => 9,
    }
}

/// Display label for a group header: `gt-gastown` renders as `Gastown`.
pub fn group_display_name(group: &str) -> String {
    match group {
        "hq" => "HQ".to_string(),
        "main" => "Main".to_string(),
        "other" => "Other".to_string(),
        _ => {
            if let Some(rig) = group.strip_prefix("gt-") {
                let mut chars = rig.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => group.to_string(),
                }
            } else {
                group.to_string()
            }
        }
    }
}

/// Sorts by (group priority, group name, session name).
pub fn sort_sessions(sessions: &mut [TmuxSession]) {
    sessions.sort_by(|a, b| {
        group_priority(&a.group)
            .cmp(&group_priority(&b.group))
            .then_with(|| a.group.cmp(&b.group))
            .then_with(|| a.name.cmp(&b.name))
    });
}

pub fn group_sessions(sessions: &[TmuxSession]) -> BTreeMap<String, Vec<TmuxSession>> {
    let mut grouped: BTreeMap<String, Vec<TmuxSession>> = BTreeMap::new();
    for s in sessions {
        grouped.entry(s.group.clone()).or_default().push(s.clone());
    }
    grouped
}

/// Group keys in display order: priority first, then name.
pub fn ordered_groups(grouped: &BTreeMap<String, Vec<TmuxSession>>) -> Vec<&str> {
    let mut keys: Vec<&str> = grouped.keys().map(String::as_str).collect();
    keys.sort_by(|a, b| group_priority(a).cmp(&group_priority(b)).then_with(|| a.cmp(b)));
    keys
}

pub fn validate_session_name(name: &str, what: &str) -> Result<()> {
    if name.is_empty() {
        return Err(anyhow::anyhow!("{} is required", what));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(anyhow::anyhow!(
            "invalid {}: use only letters, numbers, dashes, and underscores",
            what
        ));
    }
    if name.len() > SESSION_NAME_MAX {
        return Err(anyhow::anyhow!(
            "{} too long (max {} characters)",
            what,
            SESSION_NAME_MAX
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(name: &str) -> TmuxSession {
        TmuxSession {
            name: name.to_string(),
            windows: 1,
            attached: false,
            group: categorize_session(name),
        }
    }

    #[test]
    fn categorize_by_prefix() {
        assert_eq!(categorize_session("hq-mayor"), "hq");
        assert_eq!(categorize_session("main"), "main");
        assert_eq!(categorize_session("shell"), "main");
        assert_eq!(categorize_session("gt-gastown-jack"), "gt-gastown");
        assert_eq!(categorize_session("gt-gastown"), "gt-gastown");
        assert_eq!(categorize_session("gt-"), "gt-unknown");
        assert_eq!(categorize_session("scratch"), "other");
    }

    #[test]
    fn hq_sorts_before_rigs_regardless_of_alphabet() {
        let mut sessions = vec![session("gt-gastown-jack"), session("hq-mayor")];
        sort_sessions(&mut sessions);
        assert_eq!(sessions[0].name, "hq-mayor");

        let grouped = group_sessions(&sessions);
        let order = ordered_groups(&grouped);
        assert_eq!(order, vec!["hq", "gt-gastown"]);
    }

    #[test]
    fn rigs_sort_between_main_and_other() {
        let mut sessions = vec![
            session("zzz"),
            session("gt-bartertown-max"),
            session("shell"),
            session("hq-deacon"),
        ];
        sort_sessions(&mut sessions);
        let names: Vec<&str> = sessions.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["hq-deacon", "shell", "gt-bartertown-max", "zzz"]);
    }

    #[test]
    fn group_display_names() {
        assert_eq!(group_display_name("hq"), "HQ");
        assert_eq!(group_display_name("gt-gastown"), "Gastown");
        assert_eq!(group_display_name("other"), "Other");
    }

    #[test]
    fn session_name_rules() {
        assert!(validate_session_name("agent-7", "session name").is_ok());
        assert!(validate_session_name("", "session name").is_err());
        assert!(validate_session_name("bad name", "session name").is_err());
        assert!(validate_session_name("semi;colon", "session name").is_err());
        assert!(validate_session_name(&"x".repeat(51), "session name").is_err());
        assert!(validate_session_name(&"x".repeat(50), "session name").is_ok());
    }
}
