use std::time::Duration;

use bridge_core::{RunCommandArgs, ToolOutcome};

use crate::executor::ToolExecutor;

/// Run a command through `bash -c` in the resolved working directory,
/// capturing combined stdout and stderr. Zero exit means success; every
/// failure path (non-zero exit, spawn error, timeout) folds into a failure
/// outcome carrying whatever output was captured.
pub(crate) async fn run_command(
    exec: &ToolExecutor,
    args: &RunCommandArgs,
    timeout: Duration,
) -> ToolOutcome {
    let cwd = match &args.cwd {
        Some(dir) => exec.resolve(dir),
        None => exec.workspace_root().to_path_buf(),
    };

    let output = tokio::time::timeout(
        timeout,
        tokio::process::Command::new("bash")
            .arg("-c")
            .arg(&args.command)
            .current_dir(&cwd)
            .output(),
    )
    .await;

    match output {
        Ok(Ok(output)) => {
            let combined = combine_output(&output.stdout, &output.stderr);
            if output.status.success() {
                ToolOutcome::ok(combined)
            } else {
                let exit = output.status.code().unwrap_or(-1);
                let detail = if combined.is_empty() {
                    format!("Command exited with code {exit}")
                } else {
                    combined.clone()
                };
                ToolOutcome::err_with(detail.clone(), detail)
            }
        }
        Ok(Err(e)) => {
            let message = format!("Failed to execute command: {e}");
            ToolOutcome::err_with(message.clone(), message)
        }
        Err(_) => {
            let message = format!("Command timed out after {}s", timeout.as_secs());
            ToolOutcome::err_with(message.clone(), message)
        }
    }
}

fn combine_output(stdout: &[u8], stderr: &[u8]) -> String {
    let stdout = String::from_utf8_lossy(stdout);
    let stderr = String::from_utf8_lossy(stderr);

    let mut combined = String::new();
    if !stdout.is_empty() {
        combined.push_str(&stdout);
    }
    if !stderr.is_empty() {
        if !combined.is_empty() && !combined.ends_with('\n') {
            combined.push('\n');
        }
        combined.push_str(&stderr);
    }
    combined.trim_end().to_string()
}
