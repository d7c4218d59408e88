use std::path::{Path, PathBuf};

use bridge_core::{ListFilesArgs, ToolOutcome};

use crate::executor::ToolExecutor;

const MAX_ENTRIES: usize = 200;
const TRUNCATION_MARKER: &str = "... (truncated at 200 entries)";

/// A pattern with glob wildcards matches against the workspace root and
/// returns workspace-relative paths; a plain pattern is treated as a
/// directory and walked recursively. Both paths cap at 200 entries.
pub(crate) async fn list_files(exec: &ToolExecutor, args: &ListFilesArgs) -> ToolOutcome {
    let pattern = args.pattern.clone();
    let root = exec.workspace_root().to_path_buf();
    let resolved_dir = exec.resolve(&pattern);

    // Filesystem walks block; hand them to the blocking pool.
    let result = tokio::task::spawn_blocking(move || {
        if has_wildcard(&pattern) {
            glob_list(&root, &pattern)
        } else {
            walk_list(&resolved_dir)
        }
    })
    .await;

    match result {
        Ok(Ok(entries)) => ToolOutcome::ok(entries.join("\n")),
        Ok(Err(message)) => ToolOutcome::err(message),
        Err(e) => ToolOutcome::err(format!("List task failed: {e}")),
    }
}

fn has_wildcard(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

fn glob_list(root: &Path, pattern: &str) -> Result<Vec<String>, String> {
    if root.as_os_str().is_empty() {
        return Err("No workspace root available for glob matching".into());
    }
    let full = root.join(pattern);
    let full = full.to_string_lossy();

    let paths = glob::glob(&full).map_err(|e| format!("Invalid glob pattern: {e}"))?;

    let mut entries = Vec::new();
    for entry in paths.flatten() {
        if entries.len() >= MAX_ENTRIES {
            break;
        }
        let rel = entry.strip_prefix(root).unwrap_or(&entry);
        entries.push(rel.display().to_string());
    }
    Ok(entries)
}

fn walk_list(dir: &Path) -> Result<Vec<String>, String> {
    if !dir.is_dir() {
        return Err(format!("Not a directory: {}", dir.display()));
    }
    let mut entries = Vec::new();
    let mut truncated = false;
    walk(dir, &mut entries, &mut truncated);
    if truncated {
        entries.push(TRUNCATION_MARKER.to_string());
    }
    Ok(entries)
}

fn walk(dir: &Path, entries: &mut Vec<String>, truncated: &mut bool) {
    let Ok(read) = std::fs::read_dir(dir) else {
        return;
    };
    let mut children: Vec<PathBuf> = read.flatten().map(|e| e.path()).collect();
    children.sort();

    for child in children {
        if entries.len() >= MAX_ENTRIES {
            *truncated = true;
            return;
        }
        entries.push(child.display().to_string());
        if child.is_dir() {
            walk(&child, entries, truncated);
            if *truncated {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::temp_workspace;

    #[tokio::test]
    async fn glob_pattern_returns_relative_paths() {
        let dir = temp_workspace("list");
        std::fs::create_dir_all(dir.join("src")).unwrap();
        std::fs::write(dir.join("src/a.rs"), "").unwrap();
        std::fs::write(dir.join("src/b.rs"), "").unwrap();
        std::fs::write(dir.join("src/c.txt"), "").unwrap();

        let exec = ToolExecutor::new(&dir);
        let outcome = list_files(
            &exec,
            &ListFilesArgs {
                pattern: "src/*.rs".into(),
            },
        )
        .await;

        assert!(outcome.success);
        let listing = outcome.content.unwrap();
        assert!(listing.contains("src/a.rs"));
        assert!(listing.contains("src/b.rs"));
        assert!(!listing.contains("c.txt"));
        // Paths are workspace-relative, not absolute.
        assert!(!listing.contains(dir.to_str().unwrap()));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn plain_pattern_walks_directory_recursively() {
        let dir = temp_workspace("list");
        std::fs::create_dir_all(dir.join("a/b")).unwrap();
        std::fs::write(dir.join("a/one.txt"), "").unwrap();
        std::fs::write(dir.join("a/b/two.txt"), "").unwrap();

        let exec = ToolExecutor::new(&dir);
        let outcome = list_files(
            &exec,
            &ListFilesArgs {
                pattern: "a".into(),
            },
        )
        .await;

        assert!(outcome.success);
        let listing = outcome.content.unwrap();
        assert!(listing.contains("one.txt"));
        assert!(listing.contains("two.txt"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn walk_caps_at_200_with_marker() {
        let dir = temp_workspace("list");
        for i in 0..250 {
            std::fs::write(dir.join(format!("f{i:03}.txt")), "").unwrap();
        }

        let exec = ToolExecutor::new(&dir);
        let outcome = list_files(
            &exec,
            &ListFilesArgs {
                pattern: ".".into(),
            },
        )
        .await;

        assert!(outcome.success);
        let lines: Vec<&str> = outcome.content.as_deref().unwrap().lines().collect();
        assert_eq!(lines.len(), MAX_ENTRIES + 1);
        assert_eq!(*lines.last().unwrap(), TRUNCATION_MARKER);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn glob_caps_at_200_without_marker() {
        let dir = temp_workspace("list");
        for i in 0..250 {
            std::fs::write(dir.join(format!("f{i:03}.txt")), "").unwrap();
        }

        let exec = ToolExecutor::new(&dir);
        let outcome = list_files(
            &exec,
            &ListFilesArgs {
                pattern: "*.txt".into(),
            },
        )
        .await;

        assert!(outcome.success);
        assert_eq!(outcome.content.unwrap().lines().count(), MAX_ENTRIES);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn missing_directory_fails() {
        let dir = temp_workspace("list");
        let exec = ToolExecutor::new(&dir);

        let outcome = list_files(
            &exec,
            &ListFilesArgs {
                pattern: "no/such/dir".into(),
            },
        )
        .await;
        assert!(!outcome.success);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn glob_without_workspace_root_fails() {
        let exec = ToolExecutor::new("");
        let outcome = list_files(
            &exec,
            &ListFilesArgs {
                pattern: "*.rs".into(),
            },
        )
        .await;
        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("workspace root"));
    }
}
