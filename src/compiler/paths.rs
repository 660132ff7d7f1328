//! Working directory normalization

use std::borrow::Cow;
use std::path::{Component, Path};

/// Root in-container working path that relative step directories are
/// resolved against
pub const WORKSPACE_ROOT: &str = "/workspace";

/// Normalize a step-declared working directory against an inherited
/// default.
///
/// An empty declared directory yields the inherited value verbatim; a
/// `./` prefix is swapped for the workspace root; any other relative
/// path is joined under the workspace root; absolute paths pass through
/// unchanged. Idempotent on already-normalized paths.
pub fn normalize(declared: &str, inherited: &str) -> String {
    if declared.is_empty() {
        return inherited.to_string();
    }
    if let Some(rest) = declared.strip_prefix("./") {
        return format!("{}/{}", WORKSPACE_ROOT, rest);
    }
    if !Path::new(declared).is_absolute() {
        return join_under_root(declared);
    }
    declared.to_string()
}

/// Join a relative directory under the workspace root, cleaning the
/// result lexically: `.` segments drop, `..` segments fold upward and
/// stop at the root, trailing slashes disappear.
fn join_under_root(dir: &str) -> String {
    let mut parts: Vec<Cow<'_, str>> = Vec::new();
    let joined = Path::new(WORKSPACE_ROOT).join(dir);
    for component in joined.components() {
        match component {
            Component::Normal(p) => parts.push(p.to_string_lossy()),
            Component::ParentDir => {
                parts.pop();
            }
            Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
        }
    }
    format!("/{}", parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_uses_inherited() {
        assert_eq!(normalize("", "/workspace/foo"), "/workspace/foo");
    }

    #[test]
    fn test_dot_slash_prefix() {
        assert_eq!(normalize("./bar", "/workspace"), "/workspace/bar");
        assert_eq!(normalize("./a/b", "/workspace"), "/workspace/a/b");
    }

    #[test]
    fn test_relative_joined_under_root() {
        assert_eq!(normalize("baz", "/workspace"), "/workspace/baz");
    }

    #[test]
    fn test_relative_join_is_cleaned() {
        assert_eq!(normalize(".", "/workspace"), "/workspace");
        assert_eq!(normalize("a/../b", "/workspace"), "/workspace/b");
        assert_eq!(normalize("a/./b", "/workspace"), "/workspace/a/b");
        assert_eq!(normalize("charts/", "/workspace"), "/workspace/charts");
        assert_eq!(normalize("..", "/workspace"), "/");
    }

    #[test]
    fn test_absolute_unchanged() {
        assert_eq!(normalize("/abs/path", "/workspace"), "/abs/path");
    }

    #[test]
    fn test_idempotent() {
        let once = normalize("./app", "/workspace");
        assert_eq!(normalize(&once, "/workspace"), once);
    }
}
