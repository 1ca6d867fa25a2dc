//! Script execution
//!
//! Runs an assembled deployment script through the system shell, streaming
//! output line by line and enforcing one overall deadline. The child is
//! killed if the deadline passes without an exit status.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::time::{timeout_at, Instant};
use tracing::{error, info, warn};

use crate::error::{ClusterError, Result};

/// Default overall deadline for a deployment run
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// Outcome of a completed (non-failed) script run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecOutcome {
    /// Exit code reported by the shell
    pub exit_code: i32,
}

/// Executes deployment scripts in a workspace directory
#[derive(Debug, Clone)]
pub struct ScriptRunner {
    workdir: PathBuf,
    timeout: Duration,
}

impl ScriptRunner {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the overall deadline
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run the script via `sh -c`, streaming stdout and stderr to the log.
    ///
    /// Returns `Execution` for a non-zero exit code and `Timeout` when the
    /// deadline passes; in the timeout case the child is killed before the
    /// error is returned.
    pub async fn run(&self, script: &str) -> Result<ExecOutcome> {
        let deadline = Instant::now() + self.timeout;

        let mut child = Command::new("sh")
            .arg("-c")
            .arg(script)
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let mut stdout = child
            .stdout
            .take()
            .map(|s| BufReader::new(s).lines())
            .ok_or_else(|| std::io::Error::other("child stdout was not captured"))?;
        let mut stderr = child
            .stderr
            .take()
            .map(|s| BufReader::new(s).lines())
            .ok_or_else(|| std::io::Error::other("child stderr was not captured"))?;

        let mut stdout_open = true;
        let mut stderr_open = true;
        while stdout_open || stderr_open {
            tokio::select! {
                line = stdout.next_line(), if stdout_open => match line? {
                    Some(line) => info!(target: "sfship::deploy", "{}", line),
                    None => stdout_open = false,
                },
                line = stderr.next_line(), if stderr_open => match line? {
                    Some(line) => warn!(target: "sfship::deploy", "{}", line),
                    None => stderr_open = false,
                },
                _ = tokio::time::sleep_until(deadline) => {
                    return self.kill_on_deadline(&mut child).await;
                }
            }
        }

        let status = match timeout_at(deadline, child.wait()).await {
            Ok(status) => status?,
            Err(_) => return self.kill_on_deadline(&mut child).await,
        };

        let exit_code = status.code().unwrap_or(-1);
        if exit_code != 0 {
            error!(exit_code, "deployment script failed");
            return Err(ClusterError::Execution { code: exit_code });
        }
        Ok(ExecOutcome { exit_code })
    }

    async fn kill_on_deadline(&self, child: &mut tokio::process::Child) -> Result<ExecOutcome> {
        error!(
            timeout_secs = self.timeout.as_secs(),
            "deadline passed without an exit status, killing the deployment script"
        );
        child.kill().await.ok();
        Err(ClusterError::Timeout(self.timeout.as_secs()))
    }
}

/// Key material written to a temporary file for the duration of one run.
///
/// The file is removed on drop, on every exit path.
#[derive(Debug)]
pub struct SecretFile {
    file: tempfile::NamedTempFile,
}

impl SecretFile {
    /// Write `content` to a fresh temporary file
    pub fn new(content: &str) -> Result<Self> {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(content.as_bytes())?;
        file.flush()?;
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
