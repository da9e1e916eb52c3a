//! Source invocation: external utilities and system-exposed pseudo-files.
//!
//! Every invocation is a single attempt with a bounded timeout. Non-zero
//! exits, missing utilities, and I/O errors all come back as typed
//! [`CollectError`] outcomes, never as panics or unbounded hangs.

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::{trace, warn};

use crate::error::{CollectError, Result};

/// Bound on external process execution.
pub const SOURCE_TIMEOUT: Duration = Duration::from_secs(5);

/// What a query reads: an external command or a system-exposed text file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    Command {
        program: &'static str,
        args: Vec<String>,
    },
    PseudoFile {
        path: &'static str,
    },
}

/// Declarative descriptor for one source invocation. Stateless; the
/// strategy table recreates these per collector run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceQuery {
    pub label: &'static str,
    pub kind: SourceKind,
}

impl SourceQuery {
    /// Describe an external command invocation.
    pub fn command(label: &'static str, program: &'static str, args: &[&str]) -> Self {
        Self {
            label,
            kind: SourceKind::Command {
                program,
                args: args.iter().map(|arg| arg.to_string()).collect(),
            },
        }
    }

    /// Describe a pseudo-file read.
    pub fn pseudo_file(label: &'static str, path: &'static str) -> Self {
        Self {
            label,
            kind: SourceKind::PseudoFile { path },
        }
    }
}

/// Invoke a query with the default timeout, returning raw decoded text.
pub async fn invoke(query: &SourceQuery) -> Result<String> {
    invoke_with_timeout(query, SOURCE_TIMEOUT).await
}

/// Invoke a query with an explicit timeout bound.
pub async fn invoke_with_timeout(query: &SourceQuery, limit: Duration) -> Result<String> {
    let outcome = match &query.kind {
        SourceKind::Command { program, args } => run_command(program, args, limit).await,
        SourceKind::PseudoFile { path } => read_pseudo_file(path).await,
    };

    match &outcome {
        Ok(raw) => trace!(source = query.label, bytes = raw.len(), "source read"),
        Err(err) => warn!(source = query.label, error = %err, "source degraded"),
    }

    outcome
}

async fn run_command(program: &str, args: &[String], limit: Duration) -> Result<String> {
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = match timeout(limit, command.output()).await {
        Err(_) => return Err(CollectError::SourceTimeout(limit)),
        Ok(Err(err)) => return Err(map_io_error(program, &err)),
        Ok(Ok(output)) => output,
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if indicates_denial(&stderr) {
            return Err(CollectError::SourcePermissionDenied(format!(
                "{program}: {stderr}"
            )));
        }
        return Err(CollectError::SourceFailed {
            status: output.status.to_string(),
            detail: if stderr.is_empty() {
                program.to_string()
            } else {
                stderr
            },
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

async fn read_pseudo_file(path: &str) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|err| map_io_error(path, &err))
}

fn map_io_error(what: &str, err: &std::io::Error) -> CollectError {
    match err.kind() {
        std::io::ErrorKind::NotFound => {
            CollectError::SourceUnavailable(format!("{what}: not found"))
        }
        std::io::ErrorKind::PermissionDenied => {
            CollectError::SourcePermissionDenied(what.to_string())
        }
        _ => CollectError::SourceUnavailable(format!("{what}: {err}")),
    }
}

/// Privilege-denied outcomes are indistinguishable from other failures to
/// the caller, but the diagnostic should name them when the utility says so.
fn indicates_denial(stderr: &str) -> bool {
    let lower = stderr.to_ascii_lowercase();
    lower.contains("permission denied")
        || lower.contains("access is denied")
        || lower.contains("operation not permitted")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_missing_command_is_unavailable() {
        let query = SourceQuery::command("missing", "hwprobe-no-such-utility", &[]);
        let err = invoke(&query).await.unwrap_err();
        assert!(matches!(err, CollectError::SourceUnavailable(_)), "{err}");
    }

    #[tokio::test]
    async fn test_missing_pseudo_file_is_unavailable() {
        let query = SourceQuery::pseudo_file("missing-file", "/no/such/pseudo/file");
        let err = invoke(&query).await.unwrap_err();
        assert!(matches!(err, CollectError::SourceUnavailable(_)), "{err}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stdout_is_captured() {
        let query = SourceQuery::command("echo", "echo", &["hello"]);
        let raw = invoke(&query).await.unwrap();
        assert!(raw.contains("hello"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_failure() {
        let query = SourceQuery::command("false", "sh", &["-c", "exit 3"]);
        let err = invoke(&query).await.unwrap_err();
        assert!(matches!(err, CollectError::SourceFailed { .. }), "{err}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_is_bounded() {
        let query = SourceQuery::command("sleeper", "sleep", &["30"]);
        let started = Instant::now();
        let err = invoke_with_timeout(&query, Duration::from_millis(100))
            .await
            .unwrap_err();
        assert!(matches!(err, CollectError::SourceTimeout(_)), "{err}");
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn test_denial_detection() {
        assert!(indicates_denial("dmidecode: Permission denied"));
        assert!(indicates_denial("Access is denied."));
        assert!(!indicates_denial("no such file"));
    }
}
