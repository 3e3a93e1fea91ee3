//! Subprocess abstraction for testability

use std::io;
use std::time::Duration;

/// How a command ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    /// Process exited on its own; `None` if it was killed by a signal
    Exited(Option<i32>),
    /// Process was still running at the deadline and was killed
    TimedOut,
}

/// Captured result of running a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub status: CommandStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Exited with the given code
    pub fn exited(code: i32, stdout: impl Into<String>) -> Self {
        Self {
            status: CommandStatus::Exited(Some(code)),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Hit the deadline
    pub fn timed_out() -> Self {
        Self {
            status: CommandStatus::TimedOut,
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    /// Replace the captured stderr
    pub fn with_stderr(mut self, stderr: impl Into<String>) -> Self {
        self.stderr = stderr.into();
        self
    }

    /// Exited with status 0
    pub fn success(&self) -> bool {
        self.status == CommandStatus::Exited(Some(0))
    }

    /// Last non-blank line written to stderr
    pub fn stderr_tail(&self) -> Option<&str> {
        self.stderr
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .last()
    }
}

/// Runs external programs with a bounded wait
///
/// `Err` means the program could not be started at all (for instance it
/// is not installed); anything that ran is reported through
/// [`CommandOutput`].
pub trait CommandRunner: Send + Sync {
    fn run(&self, program: &str, args: &[&str], timeout: Duration) -> io::Result<CommandOutput>;
}
