use bridge_core::{ReadFileArgs, SearchReplaceArgs, ToolOutcome, WriteFileArgs};

use crate::executor::ToolExecutor;

pub(crate) async fn write_file(exec: &ToolExecutor, args: &WriteFileArgs) -> ToolOutcome {
    let path = exec.resolve(&args.path);
    match tokio::fs::write(&path, &args.content).await {
        Ok(()) => ToolOutcome::ok(format!("Wrote {}", path.display())),
        Err(e) => ToolOutcome::err(format!("Failed to write {}: {e}", path.display())),
    }
}

pub(crate) async fn read_file(exec: &ToolExecutor, args: &ReadFileArgs) -> ToolOutcome {
    let path = exec.resolve(&args.path);
    match tokio::fs::read_to_string(&path).await {
        Ok(content) => ToolOutcome::ok(content),
        Err(e) => ToolOutcome::err(format!("Failed to read {}: {e}", path.display())),
    }
}

/// Literal, non-regex replacement of every occurrence of `old_string`.
///
/// When the replacement leaves the content byte-identical (the needle was
/// absent) the file is NOT rewritten and the success message says so.
/// Callers infer that a write happened from the "completed" wording, so
/// the no-write-on-no-op behavior is a correctness property.
pub(crate) async fn search_replace(exec: &ToolExecutor, args: &SearchReplaceArgs) -> ToolOutcome {
    let path = exec.resolve(&args.path);

    let content = match tokio::fs::read_to_string(&path).await {
        Ok(c) => c,
        Err(e) => return ToolOutcome::err(format!("Failed to read {}: {e}", path.display())),
    };

    let replaced = content.replace(&args.old_string, &args.new_string);
    if replaced == content {
        return ToolOutcome::ok(format!(
            "No changes needed in {}: old_string not found",
            path.display()
        ));
    }

    match tokio::fs::write(&path, &replaced).await {
        Ok(()) => ToolOutcome::ok(format!("Search-replace completed in {}", path.display())),
        Err(e) => ToolOutcome::err(format!("Failed to write {}: {e}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::temp_workspace;

    #[tokio::test]
    async fn write_then_read_roundtrip() {
        let dir = temp_workspace("fs");
        let exec = ToolExecutor::new(&dir);

        let outcome = write_file(
            &exec,
            &WriteFileArgs {
                path: "notes.txt".into(),
                content: "hello".into(),
            },
        )
        .await;
        assert!(outcome.success);
        assert!(outcome.content.unwrap().contains("notes.txt"));

        let outcome = read_file(
            &exec,
            &ReadFileArgs {
                path: "notes.txt".into(),
            },
        )
        .await;
        assert!(outcome.success);
        assert_eq!(outcome.content.as_deref(), Some("hello"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn write_overwrites_existing_content() {
        let dir = temp_workspace("fs");
        let exec = ToolExecutor::new(&dir);
        std::fs::write(dir.join("f.txt"), "old old old").unwrap();

        let outcome = write_file(
            &exec,
            &WriteFileArgs {
                path: "f.txt".into(),
                content: "new".into(),
            },
        )
        .await;
        assert!(outcome.success);
        assert_eq!(std::fs::read_to_string(dir.join("f.txt")).unwrap(), "new");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn read_missing_file_fails_with_message() {
        let dir = temp_workspace("fs");
        let exec = ToolExecutor::new(&dir);

        let outcome = read_file(
            &exec,
            &ReadFileArgs {
                path: "ghost.txt".into(),
            },
        )
        .await;
        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("ghost.txt"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn search_replace_replaces_every_occurrence() {
        let dir = temp_workspace("fs");
        let exec = ToolExecutor::new(&dir);
        std::fs::write(dir.join("f.txt"), "foo bar foo baz foo").unwrap();

        let outcome = search_replace(
            &exec,
            &SearchReplaceArgs {
                path: "f.txt".into(),
                old_string: "foo".into(),
                new_string: "qux".into(),
            },
        )
        .await;
        assert!(outcome.success);
        assert!(outcome.content.unwrap().contains("completed"));
        assert_eq!(
            std::fs::read_to_string(dir.join("f.txt")).unwrap(),
            "qux bar qux baz qux"
        );

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn search_replace_is_literal_not_regex() {
        let dir = temp_workspace("fs");
        let exec = ToolExecutor::new(&dir);
        std::fs::write(dir.join("f.txt"), "a.c abc").unwrap();

        let outcome = search_replace(
            &exec,
            &SearchReplaceArgs {
                path: "f.txt".into(),
                old_string: "a.c".into(),
                new_string: "X".into(),
            },
        )
        .await;
        assert!(outcome.success);
        // Only the literal "a.c" is replaced, not the regex match "abc".
        assert_eq!(std::fs::read_to_string(dir.join("f.txt")).unwrap(), "X abc");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn search_replace_noop_does_not_write() {
        let dir = temp_workspace("fs");
        let exec = ToolExecutor::new(&dir);
        let path = dir.join("f.txt");
        std::fs::write(&path, "abc").unwrap();
        let mtime_before = std::fs::metadata(&path).unwrap().modified().unwrap();

        let outcome = search_replace(
            &exec,
            &SearchReplaceArgs {
                path: "f.txt".into(),
                old_string: "xyz".into(),
                new_string: "q".into(),
            },
        )
        .await;

        assert!(outcome.success);
        assert!(outcome.content.unwrap().contains("No changes needed"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "abc");
        let mtime_after = std::fs::metadata(&path).unwrap().modified().unwrap();
        assert_eq!(mtime_before, mtime_after, "file was rewritten on a no-op");

        std::fs::remove_dir_all(&dir).ok();
    }
}
