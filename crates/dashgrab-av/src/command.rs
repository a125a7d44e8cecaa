//! Builder and runner for external tool invocations.
//!
//! Every external process dashgrab starts goes through a [`ProcessInvoker`],
//! so callers can swap the real [`SystemInvoker`] for a recording fake.

use crate::{Error, Result};
use std::ffi::{OsStr, OsString};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// How often a timed-out wait polls the child.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Output captured from a tool execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code, `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
}

impl ToolOutput {
    /// Output of a process that exited with `code` and printed nothing.
    pub fn with_code(code: i32) -> Self {
        Self {
            code: Some(code),
            ..Self::default()
        }
    }

    /// Whether the process exited with status 0.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Human-readable exit status, e.g. `exit code 1` or `signal`.
    pub fn status_text(&self) -> String {
        match self.code {
            Some(code) => format!("exit code {code}"),
            None => "terminated by signal".to_string(),
        }
    }
}

/// A builder for constructing external tool invocations.
///
/// # Example
///
/// ```no_run
/// use dashgrab_av::{ProcessInvoker, SystemInvoker, ToolCommand};
///
/// let mut cmd = ToolCommand::new("ffmpeg");
/// cmd.arg("-version");
/// let output = SystemInvoker.run(&cmd)?;
/// assert!(output.success());
/// # Ok::<(), dashgrab_av::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<OsString>,
    timeout: Option<Duration>,
}

impl ToolCommand {
    /// Create a new command for the given program path.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: None,
        }
    }

    /// Append a single argument.
    pub fn arg(&mut self, s: impl AsRef<OsStr>) -> &mut Self {
        self.args.push(s.as_ref().to_os_string());
        self
    }

    /// Append multiple arguments.
    pub fn args<I, S>(&mut self, iter: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(iter.into_iter().map(|s| s.as_ref().to_os_string()));
        self
    }

    /// Kill the process if it runs longer than `timeout`.
    pub fn timeout(&mut self, timeout: Option<Duration>) -> &mut Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    pub fn get_timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Short name of the program for logs and errors (`ffmpeg`, `yt-dlp`).
    pub fn tool_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }

    /// Last argument, which for ffmpeg and yt-dlp is the output or input target.
    pub fn last_arg(&self) -> Option<&OsStr> {
        self.args.last().map(OsString::as_os_str)
    }
}

/// Capability to run an external process to completion.
///
/// A nonzero exit status is not an error at this layer; callers decide what a
/// given exit code means.
pub trait ProcessInvoker {
    fn run(&self, command: &ToolCommand) -> Result<ToolOutput>;
}

impl<T: ProcessInvoker + ?Sized> ProcessInvoker for &T {
    fn run(&self, command: &ToolCommand) -> Result<ToolOutput> {
        (**self).run(command)
    }
}

/// Runs commands as real child processes with stdin closed.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemInvoker;

impl ProcessInvoker for SystemInvoker {
    fn run(&self, command: &ToolCommand) -> Result<ToolOutput> {
        let tool = command.tool_name();

        tracing::debug!("Running {} {:?}", command.program().display(), command.get_args());

        let mut child = Command::new(command.program())
            .args(command.get_args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::tool_not_found(&tool)
                } else {
                    Error::tool_failed(&tool, format!("failed to spawn: {e}"))
                }
            })?;

        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = match command.get_timeout() {
            Some(timeout) => wait_with_timeout(&mut child, &tool, timeout)?,
            None => child.wait()?,
        };

        let output = ToolOutput {
            code: status.code(),
            stdout: join_drain(stdout),
            stderr: join_drain(stderr),
        };

        tracing::debug!("{} finished with {}", tool, output.status_text());
        Ok(output)
    }
}

/// Read a child pipe on its own thread so a chatty process never blocks on a
/// full pipe while we wait for it.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>> {
    pipe.map(|mut pipe| {
        std::thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            buf
        })
    })
}

fn join_drain(handle: Option<JoinHandle<Vec<u8>>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .map(|buf| String::from_utf8_lossy(&buf).to_string())
        .unwrap_or_default()
}

fn wait_with_timeout(
    child: &mut Child,
    tool: &str,
    timeout: Duration,
) -> Result<std::process::ExitStatus> {
    let deadline = Instant::now() + timeout;

    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }

        if Instant::now() >= deadline {
            tracing::error!("{} timed out after {:?}, killing", tool, timeout);
            let _ = child.kill();
            // Reap the zombie.
            let _ = child.wait();
            return Err(Error::TimedOut {
                tool: tool.to_string(),
                timeout,
            });
        }

        std::thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_args() {
        let mut cmd = ToolCommand::new("/usr/bin/ffmpeg");
        cmd.args(["-i", "in.opus"]).arg("out.mp3");

        assert_eq!(cmd.tool_name(), "ffmpeg");
        assert_eq!(cmd.get_args().len(), 3);
        assert_eq!(cmd.last_arg(), Some(OsStr::new("out.mp3")));
        assert_eq!(cmd.get_timeout(), None);
    }

    #[test]
    fn status_text() {
        assert_eq!(ToolOutput::with_code(1).status_text(), "exit code 1");
        assert!(ToolOutput::with_code(0).success());
        assert!(!ToolOutput::default().success());
    }

    #[cfg(unix)]
    #[test]
    fn run_echo() {
        let mut cmd = ToolCommand::new("echo");
        cmd.arg("hello");
        let output = SystemInvoker.run(&cmd).unwrap();
        assert!(output.success());
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_is_not_an_error() {
        let output = SystemInvoker.run(&ToolCommand::new("false")).unwrap();
        assert_eq!(output.code, Some(1));
    }

    #[test]
    fn run_nonexistent_tool() {
        let result = SystemInvoker.run(&ToolCommand::new("nonexistent_tool_xyz_12345"));
        assert!(matches!(result, Err(Error::ToolNotFound { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn timeout_fires() {
        let mut cmd = ToolCommand::new("sleep");
        cmd.arg("10").timeout(Some(Duration::from_millis(200)));
        let err = SystemInvoker.run(&cmd).unwrap_err();
        assert!(err.to_string().contains("timed out"), "unexpected error: {err}");
    }
}
