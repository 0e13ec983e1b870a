// External tool runner
//
// Wraps tokio process handling with a hard deadline. Ordinary tool failure
// is data, not an error: callers pattern-match on ToolOutcome. The child is
// spawned with kill_on_drop, so hitting the timeout drops the pending
// output future and forcibly kills the process. No orphans.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::constants::STDERR_CAPTURE_LIMIT;

/// Result of running an external tool to completion.
#[derive(Debug)]
pub enum ToolOutcome {
    /// Exit status zero; stdout captured raw for parsing.
    Success { stdout: Vec<u8> },
    /// Non-zero exit, or the process could not be spawned at all.
    Failed {
        exit_code: Option<i32>,
        stderr: String,
    },
    /// Deadline hit; the child was killed.
    TimedOut,
}

/// Run `program` with `args`, capturing output, killing it at `timeout`.
pub async fn run_tool(program: &Path, args: &[&str], timeout: Duration) -> ToolOutcome {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    log::debug!("running {} {}", program.display(), args.join(" "));

    match tokio::time::timeout(timeout, cmd.output()).await {
        Err(_) => {
            // Dropping the output future drops the child, which kills it.
            log::warn!(
                "{} timed out after {}ms",
                program.display(),
                timeout.as_millis()
            );
            ToolOutcome::TimedOut
        }
        Ok(Err(e)) => {
            // Spawn failure, usually a missing binary
            ToolOutcome::Failed {
                exit_code: None,
                stderr: e.to_string(),
            }
        }
        Ok(Ok(output)) => {
            if output.status.success() {
                ToolOutcome::Success {
                    stdout: output.stdout,
                }
            } else {
                ToolOutcome::Failed {
                    exit_code: output.status.code(),
                    stderr: truncate_stderr(&output.stderr),
                }
            }
        }
    }
}

/// Lossy-decode captured stderr, capped for log hygiene.
fn truncate_stderr(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    let trimmed = text.trim();
    if trimmed.len() <= STDERR_CAPTURE_LIMIT {
        return trimmed.to_string();
    }
    let mut end = STDERR_CAPTURE_LIMIT;
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    format!("{} [truncated]", &trimmed[..end])
}
