//! Helpers for backslash-delimited virtual paths
//!
//! Paths handed to the engine look like `\Docs\Report.txt`; the root is `\`.

/// Path separator used by the virtual namespace
pub const SEPARATOR: char = '\\';

/// The root of the virtual namespace
pub const ROOT: &str = "\\";

/// Fold a name for case-insensitive comparison.
///
/// Uses simple (one-to-one) uppercase mapping, so the folded string keeps the
/// character count of the input. Characters whose uppercase form expands to
/// several characters (e.g. `ß`) are left as they are.
pub fn fold_case(name: &str) -> String {
    name.chars()
        .map(|c| {
            let mut upper = c.to_uppercase();
            match (upper.next(), upper.next()) {
                (Some(u), None) => u,
                _ => c,
            }
        })
        .collect()
}

/// Split a path into its parent directory and leaf name.
///
/// Returns `None` for the root itself or for a path without any separator.
pub fn split_parent(path: &str) -> Option<(&str, &str)> {
    let idx = path.rfind(SEPARATOR)?;
    let leaf = &path[idx + 1..];
    if leaf.is_empty() {
        return None;
    }
    let parent = if idx == 0 { ROOT } else { &path[..idx] };
    Some((parent, leaf))
}

/// Parent directory of a path (`\` for top-level entries)
pub fn parent(path: &str) -> Option<&str> {
    split_parent(path).map(|(parent, _)| parent)
}

/// Leaf name of a path
pub fn leaf(path: &str) -> Option<&str> {
    split_parent(path).map(|(_, leaf)| leaf)
}

/// Join a directory and a leaf with exactly one separator between them
pub fn join(dir: &str, leaf: &str) -> String {
    let mut joined = String::with_capacity(dir.len() + leaf.len() + 1);
    joined.push_str(dir);
    if !dir.ends_with(SEPARATOR) {
        joined.push(SEPARATOR);
    }
    joined.push_str(leaf.trim_start_matches(SEPARATOR));
    joined
}

/// Whether the path denotes the root of the namespace
pub fn is_root(path: &str) -> bool {
    !path.is_empty() && path.chars().all(|c| c == SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_case() {
        assert_eq!(fold_case("Report.txt"), "REPORT.TXT");
        assert_eq!(fold_case("état"), "ÉTAT");
        // Multi-char expansions are not applied
        assert_eq!(fold_case("straße"), "STRAßE");
    }

    #[test]
    fn test_split_parent() {
        assert_eq!(split_parent("\\Docs\\Report.txt"), Some(("\\Docs", "Report.txt")));
        assert_eq!(split_parent("\\Report.txt"), Some(("\\", "Report.txt")));
        assert_eq!(split_parent("\\"), None);
        assert_eq!(split_parent("Report.txt"), None);
    }

    #[test]
    fn test_join() {
        assert_eq!(join("\\", "a"), "\\a");
        assert_eq!(join("\\Docs", "a"), "\\Docs\\a");
        assert_eq!(join("C:\\vault\\", "x"), "C:\\vault\\x");
    }

    #[test]
    fn test_is_root() {
        assert!(is_root("\\"));
        assert!(!is_root(""));
        assert!(!is_root("\\a"));
    }
}
