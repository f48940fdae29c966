//! Threading for the vehicle list screen.
//!
//! Network calls run on a small worker pool; their outcomes come back as
//! `UiEvent`s on a channel that only the UI-owning thread drains through
//! `CarsScreen::pump`. The controller is therefore mutated from exactly
//! one thread.
//!
//! A `CancelToken` is tied to the screen's lifetime. Once cancelled (or the
//! screen is dropped) no new work starts and finished work is discarded.
//! Requests already on the wire run to completion or to the session
//! timeout.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use tracing::{debug, error};

use crate::config::ClientConfig;
use crate::controller::{CarsController, LoadTicket, PendingDelete};
use crate::error::CarError;
use crate::rest::Rest;
use crate::transport::{Transport, UreqTransport};
use crate::types::Car;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Fixed pool of named threads executing closures from a shared queue.
pub struct Workers {
    sender: Sender<Job>,
    handles: Vec<thread::JoinHandle<()>>,
}

impl Workers {
    pub fn new(num_threads: usize) -> io::Result<Self> {
        let (tx, rx) = unbounded::<Job>();
        let mut handles = Vec::with_capacity(num_threads);

        for worker_id in 0..num_threads.max(1) {
            let rx = rx.clone();
            let handle = thread::Builder::new()
                .name(format!("carangas-worker-{worker_id}"))
                .spawn(move || {
                    debug!(worker_id, "Worker started");
                    while let Ok(job) = rx.recv() {
                        job();
                    }
                    debug!(worker_id, "Worker stopped");
                })?;
            handles.push(handle);
        }

        Ok(Self {
            sender: tx,
            handles,
        })
    }

    pub fn execute<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if let Err(e) = self.sender.send(Box::new(f)) {
            error!(error = %e, "Failed to enqueue job");
        }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

/// Owned cancellation flag shared with in-flight jobs.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Outcomes delivered from worker threads to the UI thread.
#[derive(Debug)]
pub enum UiEvent {
    Loaded {
        ticket: LoadTicket,
        result: Result<Vec<Car>, CarError>,
    },
    Deleted {
        pending: PendingDelete,
        result: Result<(), CarError>,
    },
}

pub struct CarsScreen<T: Transport + 'static> {
    controller: CarsController,
    rest: Arc<Rest<T>>,
    workers: Workers,
    ui_tx: Sender<UiEvent>,
    ui_rx: Receiver<UiEvent>,
    token: CancelToken,
}

impl CarsScreen<UreqTransport> {
    /// Screen backed by the shared ureq session, one worker per allowed
    /// connection to the backend.
    pub fn from_config(config: &ClientConfig) -> io::Result<Self> {
        Self::new(Rest::from_config(config), config.max_connections_per_host)
    }
}

impl<T: Transport + 'static> CarsScreen<T> {
    pub fn new(rest: Rest<T>, workers: usize) -> io::Result<Self> {
        let (ui_tx, ui_rx) = unbounded();
        Ok(Self {
            controller: CarsController::new(),
            rest: Arc::new(rest),
            workers: Workers::new(workers)?,
            ui_tx,
            ui_rx,
            token: CancelToken::new(),
        })
    }

    pub fn controller(&self) -> &CarsController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut CarsController {
        &mut self.controller
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.token.clone()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Start a load (view appearance or pull-to-refresh).
    ///
    /// Returns `false` if a load is already running or the screen is
    /// cancelled.
    pub fn refresh(&mut self) -> bool {
        if self.token.is_cancelled() {
            return false;
        }
        let Some(ticket) = self.controller.begin_load() else {
            return false;
        };

        let rest = Arc::clone(&self.rest);
        let tx = self.ui_tx.clone();
        let token = self.token.clone();
        self.workers.execute(move || {
            if token.is_cancelled() {
                return;
            }
            let result = rest.load_cars();
            deliver(&token, &tx, UiEvent::Loaded { ticket, result });
        });
        true
    }

    /// Start deleting the row at `index` (swipe-to-delete).
    pub fn delete_row(&mut self, index: usize) -> bool {
        if self.token.is_cancelled() {
            return false;
        }
        let Some(pending) = self.controller.begin_delete(index) else {
            return false;
        };

        let rest = Arc::clone(&self.rest);
        let tx = self.ui_tx.clone();
        let token = self.token.clone();
        self.workers.execute(move || {
            if token.is_cancelled() {
                return;
            }
            let result = rest.delete(&pending.car);
            deliver(&token, &tx, UiEvent::Deleted { pending, result });
        });
        true
    }

    /// Apply every outcome that has arrived. Call from the UI thread.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.ui_rx.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// Wait up to `timeout` for at least one outcome, then drain the rest.
    pub fn pump_blocking(&mut self, timeout: Duration) -> usize {
        match self.ui_rx.recv_timeout(timeout) {
            Ok(event) => {
                self.apply(event);
                1 + self.pump()
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => 0,
        }
    }

    fn apply(&mut self, event: UiEvent) {
        if self.token.is_cancelled() {
            return;
        }
        match event {
            UiEvent::Loaded { ticket, result } => {
                self.controller.finish_load(ticket, result);
            }
            UiEvent::Deleted { pending, result } => {
                self.controller.finish_delete(pending, result);
            }
        }
    }
}

impl<T: Transport + 'static> Drop for CarsScreen<T> {
    fn drop(&mut self) {
        self.token.cancel();
        debug!(workers = self.workers.len(), "Screen dropped, pending results discarded");
    }
}

fn deliver(token: &CancelToken, tx: &Sender<UiEvent>, event: UiEvent) {
    if token.is_cancelled() {
        debug!("Discarding result for cancelled screen");
        return;
    }
    if tx.send(event).is_err() {
        debug!("UI queue closed, result dropped");
    }
}
