// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Path splitting shared by the virtual layer and the service wrapper

/// Splits a path on `/` and `\`, dropping empty components.
pub fn split_components(path: &str) -> Vec<&str> {
    path.split(|c: char| c == '/' || c == '\\').filter(|c| !c.is_empty()).collect()
}

/// Normalizes separators: backslashes become slashes, runs of slashes collapse and
/// leading/trailing slashes are removed.
pub fn sanitize(path: &str) -> String {
    split_components(path).join("/")
}

/// Returns `(parent, file_name)` of a sanitized path. The parent is empty for top-level names.
pub fn split_parent(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(idx) => (&path[..idx], &path[idx + 1..]),
        None => ("", path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_mixed_separators() {
        assert_eq!(split_components("/a\\b//c/"), vec!["a", "b", "c"]);
        assert!(split_components("///").is_empty());
    }

    #[test]
    fn sanitize_collapses() {
        assert_eq!(sanitize("//save\\0000//data/"), "save/0000/data");
        assert_eq!(sanitize(""), "");
    }

    #[test]
    fn parent_of_nested_and_top_level() {
        assert_eq!(split_parent("a/b/c.bin"), ("a/b", "c.bin"));
        assert_eq!(split_parent("c.bin"), ("", "c.bin"));
    }
}
