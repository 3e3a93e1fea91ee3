//! Real subprocess runner

use crate::device::traits::{CommandOutput, CommandRunner, CommandStatus};
use crossbeam_channel::{unbounded, RecvTimeoutError, Sender};
use log::{debug, warn};
use std::io::{self, Read};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// How often a running child is polled for exit
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How long to keep collecting output once the child is gone
///
/// Anything the child itself wrote is already in the pipe; a background
/// process it left behind may hold the pipe open indefinitely.
const OUTPUT_GRACE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    Stdout,
    Stderr,
}

/// Runs commands with `std::process`, killing them at the deadline
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str], timeout: Duration) -> io::Result<CommandOutput> {
        debug!("Running {} {:?} (timeout {:?})", program, args, timeout);

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // Pipes are drained on their own threads so a chatty child cannot
        // stall, and so a pipe held open by a grandchild never blocks us.
        let (chunk_tx, chunk_rx) = unbounded();
        if let Some(out) = child.stdout.take() {
            forward(out, Stream::Stdout, chunk_tx.clone());
        }
        if let Some(err) = child.stderr.take() {
            forward(err, Stream::Stderr, chunk_tx.clone());
        }
        drop(chunk_tx);

        let deadline = Instant::now() + timeout;
        let status = loop {
            if let Some(exit) = child.try_wait()? {
                break CommandStatus::Exited(exit.code());
            }
            if Instant::now() >= deadline {
                warn!("{} did not finish within {:?}, killing it", program, timeout);
                let _ = child.kill();
                let _ = child.wait();
                break CommandStatus::TimedOut;
            }
            thread::sleep(POLL_INTERVAL);
        };

        let collect_until = Instant::now() + OUTPUT_GRACE;
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        loop {
            let left = collect_until.saturating_duration_since(Instant::now());
            match chunk_rx.recv_timeout(left) {
                Ok((Stream::Stdout, chunk)) => stdout.extend_from_slice(&chunk),
                Ok((Stream::Stderr, chunk)) => stderr.extend_from_slice(&chunk),
                Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {
                    debug!("{} left its output open, not waiting for it", program);
                    break;
                }
            }
        }
        debug!("{} finished: {:?}", program, status);

        Ok(CommandOutput {
            status,
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        })
    }
}

/// Send everything read from `pipe` as chunks until it closes
fn forward<R>(mut pipe: R, stream: Stream, tx: Sender<(Stream, Vec<u8>)>)
where
    R: Read + Send + 'static,
{
    let spawned = thread::Builder::new()
        .name(format!("autodrop-{:?}", stream).to_lowercase())
        .spawn(move || {
            let mut buf = [0u8; 4096];
            loop {
                match pipe.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        if tx.send((stream, buf[..n].to_vec())).is_err() {
                            break;
                        }
                    }
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(_) => break,
                }
            }
        });

    if let Err(e) = spawned {
        warn!("Could not start {:?} reader: {}", stream, e);
    }
}
