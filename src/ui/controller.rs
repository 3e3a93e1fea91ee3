//! Task Controller Module
//!
//! Runs transfers and device pulls on a background thread so the window
//! keeps painting while they work. At most one operation runs at a time;
//! progress lines and the final result come back as [`UiEvent`]s.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, warn};

use crate::core::transfer::{TransferEngine, TransferRequest};
use crate::device::{CommandRunner, DeviceBridge};
use crate::ui::events::UiEvent;

/// Callback used to wake the UI after an event is sent
pub type Notifier = Arc<dyn Fn() + Send + Sync>;

/// Dispatches operations to a worker thread
pub struct TaskController {
    busy: Arc<AtomicBool>,
    event_tx: Sender<UiEvent>,
    event_rx: Receiver<UiEvent>,
    notifier: Option<Notifier>,
}

impl TaskController {
    pub fn new() -> Self {
        let (event_tx, event_rx) = unbounded();
        Self {
            busy: Arc::new(AtomicBool::new(false)),
            event_tx,
            event_rx,
            notifier: None,
        }
    }

    /// Call `notifier` whenever a worker sends an event
    pub fn with_notifier(mut self, notifier: impl Fn() + Send + Sync + 'static) -> Self {
        self.notifier = Some(Arc::new(notifier));
        self
    }

    /// Whether an operation is in flight
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Start a transfer; returns `false` if something is already running
    pub fn start_transfer(&self, engine: TransferEngine, request: TransferRequest) -> bool {
        self.spawn("transfer", move |send| {
            let result = engine.run(&request, |line| send(UiEvent::Log(line)));
            UiEvent::TransferFinished(result)
        })
    }

    /// Start a device pull; returns `false` if something is already running
    pub fn start_pull<R>(&self, bridge: Arc<DeviceBridge<R>>) -> bool
    where
        R: CommandRunner + 'static,
    {
        self.spawn("pull", move |send| {
            let result = bridge.pull_from_device(|line| send(UiEvent::Log(line)));
            UiEvent::PullFinished(result)
        })
    }

    /// Wait up to `timeout` for the next event
    pub fn recv_event_timeout(&self, timeout: Duration) -> Option<UiEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    /// All pending events
    pub fn drain_events(&self) -> Vec<UiEvent> {
        self.event_rx.try_iter().collect()
    }

    fn spawn<F>(&self, name: &'static str, job: F) -> bool
    where
        F: FnOnce(&dyn Fn(UiEvent)) -> UiEvent + Send + 'static,
    {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("Ignoring {} request: another operation is running", name);
            return false;
        }

        let busy = self.busy.clone();
        let tx = self.event_tx.clone();
        let notifier = self.notifier.clone();

        let spawned = thread::Builder::new()
            .name(format!("autodrop-{}", name))
            .spawn(move || {
                debug!("{} worker started", name);
                let send = |event: UiEvent| {
                    let _ = tx.send(event);
                    if let Some(notify) = &notifier {
                        notify();
                    }
                };

                let finished = job(&send);
                // Clear before announcing so the UI sees an idle controller
                // when it handles the completion event.
                busy.store(false, Ordering::SeqCst);
                send(finished);
                debug!("{} worker finished", name);
            });

        if let Err(e) = spawned {
            warn!("Failed to start {} worker: {}", name, e);
            self.busy.store(false, Ordering::SeqCst);
            let _ = self
                .event_tx
                .send(UiEvent::Log(format!("❌ Could not start {}: {}", name, e)));
            return false;
        }

        true
    }
}

impl Default for TaskController {
    fn default() -> Self {
        Self::new()
    }
}
