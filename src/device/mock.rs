//! Scripted command runner for testing without a phone
//!
//! Each call to [`CommandRunner::run`] pops the next scripted reply. Clones
//! share the script and the call record, so a test can hand one clone to a
//! bridge (or a background worker) and inspect the other afterwards.

use crate::device::traits::{CommandOutput, CommandRunner};
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One recorded invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Duration,
}

enum Reply {
    Output(CommandOutput),
    SpawnError(io::ErrorKind),
}

/// A [`CommandRunner`] that replays canned results
#[derive(Clone, Default)]
pub struct ScriptedRunner {
    replies: Arc<Mutex<VecDeque<Reply>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a completed (or timed-out) run
    pub fn push_output(self, output: CommandOutput) -> Self {
        self.push(Reply::Output(output))
    }

    /// Queue a failure to start the program
    pub fn push_spawn_error(self, kind: io::ErrorKind) -> Self {
        self.push(Reply::SpawnError(kind))
    }

    fn push(self, reply: Reply) -> Self {
        self.replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(reply);
        self
    }

    /// Every invocation so far, oldest first
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl std::fmt::Debug for ScriptedRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedRunner")
            .field("calls", &self.calls().len())
            .finish()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, program: &str, args: &[&str], timeout: Duration) -> io::Result<CommandOutput> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedCall {
                program: program.to_string(),
                args: args.iter().map(|a| a.to_string()).collect(),
                timeout,
            });

        let reply = self
            .replies
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();

        match reply {
            Some(Reply::Output(output)) => Ok(output),
            Some(Reply::SpawnError(kind)) => Err(io::Error::new(kind, "scripted spawn failure")),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no scripted reply left for {}", program),
            )),
        }
    }
}
