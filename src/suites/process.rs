//! External process helpers
//!
//! One-shot spawn, wait and reap under a wall-clock limit. The child is
//! killed when the limit is hit.

use std::process::{Output, Stdio};
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;

use crate::common::{Error, Result};

/// Run `cmd` to completion, capturing stdout and stderr
pub async fn output_with_timeout(mut cmd: Command, program: &str, limit: Duration) -> Result<Output> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    match timeout(limit, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(Error::process_spawn(program, e)),
        Err(_) => Err(Error::ProcessTimeout {
            program: program.to_string(),
            after: limit,
        }),
    }
}

/// Last `max_lines` lines of captured output, for logging
pub fn tail(bytes: &[u8], max_lines: usize) -> String {
    let text = String::from_utf8_lossy(bytes);
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].join("\n")
}

/// Write an executable `/bin/sh` script standing in for an external tool
#[cfg(all(test, unix))]
pub(crate) fn write_script(dir: &std::path::Path, name: &str, body: &str) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_captures_exit_code() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo out; echo err >&2; exit 3"]);
        let output = output_with_timeout(cmd, "sh", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(output.status.code(), Some(3));
        assert_eq!(tail(&output.stdout, 5), "out");
        assert_eq!(tail(&output.stderr, 5), "err");
    }

    #[tokio::test]
    async fn test_timeout_is_an_error() {
        let mut cmd = Command::new("sleep");
        cmd.arg("5");
        let result = output_with_timeout(cmd, "sleep", Duration::from_millis(100)).await;
        assert!(matches!(result, Err(Error::ProcessTimeout { .. })));
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let cmd = Command::new("/nonexistent/bmc-runner-tool");
        let result = output_with_timeout(cmd, "tool", Duration::from_secs(1)).await;
        assert!(matches!(result, Err(Error::ProcessSpawn { .. })));
    }

    #[test]
    fn test_tail_keeps_last_lines() {
        assert_eq!(tail(b"a\nb\nc\n", 2), "b\nc");
        assert_eq!(tail(b"", 2), "");
    }
}
