use std::path::{Component, Path as StdPath, PathBuf};

use super::*;

/// tmux style values: `#rgb`/`#rrggbb` hex, a bare color name, or `default`.
pub(crate) fn validate_color(value: &str) -> Result<()> {
    if value == "default" {
        return Ok(());
    }
    if let Some(hex) = value.strip_prefix('#') {
        if (3..=6).contains(&hex.len()) && hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Ok(());
        }
        return Err(anyhow::anyhow!("bad hex color {}", value));
    }
    if !value.is_empty() && value.chars().all(|c| c.is_ascii_alphabetic()) {
        return Ok(());
    }
    Err(anyhow::anyhow!("bad color {}", value))
}

/// Lexical resolution of a request path: always absolute, `.` dropped,
/// `..` popped. Symlinks are not chased; the allow-list check below is
/// component-wise, so `/code-evil` never matches a `/code` root.
pub(crate) fn normalize_request_path(raw: &str) -> PathBuf {
    let mut out = PathBuf::from("/");
    for component in StdPath::new(raw).components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::ParentDir => {
                out.pop();
            }
            _ => {}
        }
    }
    out
}

pub(crate) fn path_within_roots(roots: &[PathBuf], resolved: &StdPath) -> bool {
    roots
        .iter()
        .any(|root| resolved == root.as_path() || resolved.starts_with(root))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colors() {
        assert!(validate_color("default").is_ok());
        assert!(validate_color("#0f0").is_ok());
        assert!(validate_color("#00ff41").is_ok());
        assert!(validate_color("green").is_ok());
        assert!(validate_color("#00ff411").is_err());
        assert!(validate_color("#zzz").is_err());
        assert!(validate_color("rgb(0,0,0)").is_err());
        assert!(validate_color("").is_err());
    }

    #[test]
    fn traversal_is_resolved_lexically() {
        assert_eq!(
            normalize_request_path("/code/../etc/passwd"),
            PathBuf::from("/etc/passwd")
        );
        assert_eq!(
            normalize_request_path("/code/./a//b"),
            PathBuf::from("/code/a/b")
        );
        assert_eq!(normalize_request_path("/../.."), PathBuf::from("/"));
    }

    #[test]
    fn sibling_prefixes_do_not_match_roots() {
        let roots = vec![PathBuf::from("/code")];
        assert!(path_within_roots(&roots, StdPath::new("/code")));
        assert!(path_within_roots(&roots, StdPath::new("/code/project")));
        assert!(!path_within_roots(&roots, StdPath::new("/code-evil")));
        assert!(!path_within_roots(&roots, StdPath::new("/etc")));
    }
}
