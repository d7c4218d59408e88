use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use bridge_core::{ToolOp, ToolOutcome};

use crate::{fs, list, shell};

const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(120);

/// Executes one delegated operation against local resources.
///
/// Every operation is total: failure paths fold into a
/// `{success: false, error}` outcome, never a propagated fault. Callers
/// (the dispatch loop) invoke operations strictly one at a time, so no
/// locking is needed around the filesystem or process spawning.
pub struct ToolExecutor {
    workspace_root: PathBuf,
    command_timeout: Duration,
}

impl ToolExecutor {
    pub fn new(workspace_root: impl Into<PathBuf>) -> Self {
        Self {
            workspace_root: workspace_root.into(),
            command_timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Relative paths resolve against the workspace root; absolute paths
    /// are used as-is.
    pub(crate) fn resolve(&self, path: &str) -> PathBuf {
        let p = Path::new(path);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.workspace_root.join(p)
        }
    }

    pub async fn execute(&self, op: &ToolOp) -> ToolOutcome {
        debug!(op = ?op_name(op), "executing delegated tool call");
        match op {
            ToolOp::WriteFile(args) => fs::write_file(self, args).await,
            ToolOp::ReadFile(args) => fs::read_file(self, args).await,
            ToolOp::SearchReplace(args) => fs::search_replace(self, args).await,
            ToolOp::ListFiles(args) => list::list_files(self, args).await,
            ToolOp::RunCommand(args) => shell::run_command(self, args, self.command_timeout).await,
        }
    }
}

fn op_name(op: &ToolOp) -> &'static str {
    match op {
        ToolOp::WriteFile(_) => "write_file",
        ToolOp::ReadFile(_) => "read_file",
        ToolOp::SearchReplace(_) => "search_replace",
        ToolOp::ListFiles(_) => "list_files",
        ToolOp::RunCommand(_) => "run_command",
    }
}

#[cfg(test)]
pub(crate) fn temp_workspace(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("bridge_{tag}_{}", uuid::Uuid::now_v7()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_core::{ListFilesArgs, ReadFileArgs, RunCommandArgs, SearchReplaceArgs, WriteFileArgs};

    #[test]
    fn relative_paths_resolve_against_workspace_root() {
        let exec = ToolExecutor::new("/ws");
        assert_eq!(exec.resolve("a/b.txt"), PathBuf::from("/ws/a/b.txt"));
        assert_eq!(exec.resolve("/abs/c.txt"), PathBuf::from("/abs/c.txt"));
    }

    // Totality: arbitrary invalid inputs must yield a well-formed outcome,
    // never a panic or error propagation.
    #[tokio::test]
    async fn executor_is_total_over_invalid_inputs() {
        let exec = ToolExecutor::new(temp_workspace("total"));

        let ops = vec![
            ToolOp::ReadFile(ReadFileArgs {
                path: "does/not/exist.txt".into(),
            }),
            ToolOp::WriteFile(WriteFileArgs {
                path: "missing_parent/dir/file.txt".into(),
                content: "x".into(),
            }),
            ToolOp::SearchReplace(SearchReplaceArgs {
                path: "nope.txt".into(),
                old_string: "a".into(),
                new_string: "b".into(),
            }),
            ToolOp::ListFiles(ListFilesArgs {
                pattern: "[invalid-glob".into(),
            }),
            ToolOp::RunCommand(RunCommandArgs {
                command: "definitely-not-a-command-zz 2>/dev/null".into(),
                cwd: None,
            }),
        ];

        for op in &ops {
            let outcome = exec.execute(op).await;
            assert!(!outcome.success, "expected failure for {op:?}");
            assert!(outcome.error.is_some(), "missing error for {op:?}");
        }
    }
}
