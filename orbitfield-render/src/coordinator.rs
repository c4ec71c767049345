//! Background render worker with cooperative cancellation.
//!
//! One long-lived thread renders the newest submitted parameter set. A new
//! submission replaces any request that has not started yet and raises the
//! cancellation flag of the job in flight, whose partial field is then
//! discarded. Only the most recent request can produce a result.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{debug, info, warn};

use orbitfield_core::{Formula, FractalParameters};

use crate::error::RenderError;
use crate::renderer::{render_field, RenderCancel};
use crate::scalar_field::ScalarField;

/// Monotonic identifier handed out by [`RenderCoordinator::submit`].
pub type RequestId = u64;

/// Messages sent from the worker to the consumer.
#[derive(Debug)]
pub enum RenderEvent {
    /// A request ran to completion and was still the newest one.
    FieldReady {
        request: RequestId,
        field: ScalarField,
        elapsed: Duration,
    },
    /// The parameters were rejected before any evaluation.
    Failed {
        request: RequestId,
        error: RenderError,
    },
}

impl RenderEvent {
    pub fn request(&self) -> RequestId {
        match self {
            Self::FieldReady { request, .. } | Self::Failed { request, .. } => *request,
        }
    }
}

#[derive(Default)]
struct State {
    next_id: RequestId,
    pending: Option<(RequestId, FractalParameters)>,
    /// Token of the job currently being evaluated.
    running: Option<Arc<RenderCancel>>,
    shutdown: bool,
}

#[derive(Default)]
struct Shared {
    state: Mutex<State>,
    wake: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Owns the render worker thread.
///
/// Dropping the coordinator shuts the worker down and joins it.
pub struct RenderCoordinator {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl RenderCoordinator {
    /// Spawn the worker. Results arrive on the returned receiver.
    pub fn new() -> crate::Result<(Self, Receiver<RenderEvent>)> {
        let shared = Arc::new(Shared::default());
        let (tx, rx) = mpsc::channel();

        let worker_shared = Arc::clone(&shared);
        let worker = std::thread::Builder::new()
            .name("render-worker".into())
            .spawn(move || worker_loop(&worker_shared, &tx))?;

        Ok((
            Self {
                shared,
                worker: Some(worker),
            },
            rx,
        ))
    }

    /// Queue `params` as the newest request and cancel the job in flight.
    ///
    /// Never blocks on evaluation.
    pub fn submit(&self, params: FractalParameters) -> RequestId {
        let mut state = self.shared.lock();
        let request = state.next_id;
        state.next_id += 1;
        if let Some((stale, _)) = state.pending.replace((request, params)) {
            debug!(request = stale, "Dropped unstarted request");
        }
        if let Some(running) = &state.running {
            running.cancel();
        }
        drop(state);
        self.shared.wake.notify_one();
        debug!(request, "Render request submitted");
        request
    }

    /// Progress `(rows done, rows total)` of the job in flight, if any.
    pub fn progress(&self) -> Option<(usize, usize)> {
        self.shared.lock().running.as_ref().map(|c| c.progress())
    }

    /// Whether a request is queued or being evaluated.
    pub fn is_busy(&self) -> bool {
        let state = self.shared.lock();
        state.pending.is_some() || state.running.is_some()
    }

    /// Cancel any work, stop the worker and wait for it to exit.
    pub fn shutdown(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        {
            let mut state = self.shared.lock();
            state.shutdown = true;
            state.pending = None;
            if let Some(running) = &state.running {
                running.cancel();
            }
        }
        self.shared.wake.notify_all();
        if worker.join().is_err() {
            warn!("Render worker panicked");
        }
        debug!("Render coordinator shut down");
    }
}

impl Drop for RenderCoordinator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(shared: &Shared, events: &Sender<RenderEvent>) {
    debug!("Render worker started");
    loop {
        let (request, params, cancel) = {
            let mut state = shared.lock();
            while state.pending.is_none() && !state.shutdown {
                state = shared
                    .wake
                    .wait(state)
                    .unwrap_or_else(PoisonError::into_inner);
            }
            if state.shutdown {
                break;
            }
            let Some((request, params)) = state.pending.take() else {
                continue;
            };
            let cancel = Arc::new(RenderCancel::new());
            state.running = Some(Arc::clone(&cancel));
            (request, params, cancel)
        };

        let formula = match Formula::new(&params) {
            Ok(formula) => formula,
            Err(e) => {
                warn!(request, error = %e, "Rejected render request");
                shared.lock().running = None;
                if events
                    .send(RenderEvent::Failed {
                        request,
                        error: e.into(),
                    })
                    .is_err()
                {
                    break;
                }
                continue;
            }
        };

        let result = render_field(&formula, &params, &cancel);

        // Decide under the lock so a concurrent submit either sees the job
        // as running (and cancels it) or finds it already settled.
        let mut state = shared.lock();
        state.running = None;
        if result.cancelled || state.pending.is_some() || state.shutdown {
            debug!(request, "Discarding superseded field");
            continue;
        }
        info!(
            request,
            width = result.field.width,
            height = result.field.height,
            elapsed_ms = result.elapsed.as_millis(),
            "Field ready"
        );
        let event = RenderEvent::FieldReady {
            request,
            field: result.field,
            elapsed: result.elapsed,
        };
        if events.send(event).is_err() {
            debug!("Event receiver dropped");
            break;
        }
    }
    debug!("Render worker exiting");
}
