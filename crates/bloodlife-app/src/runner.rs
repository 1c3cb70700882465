//! Background simulation thread.
//!
//! The loop takes the grid lock only long enough to drain queued commands
//! and, when running and due, advance one generation. All waiting happens
//! outside the lock on a condvar, so pause, delay, and stop changes are
//! observed within one polling interval.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use bloodlife_core::{Grid, GridConfig, GridError};

use crate::SharedGrid;
use crate::command::{CommandReceiver, create_command_bus, drain_pending_commands};
use crate::control::ControlHandle;

/// Upper bound on how long the loop sleeps before re-checking its flags.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Queued commands beyond this are refused until the loop catches up.
const COMMAND_QUEUE_CAPACITY: usize = 256;

/// Loop flags shared between the simulation thread and control handles.
///
/// `paused` and `delay_ms` are plain atomics; the stop flag sits under the
/// condvar's mutex so a stop request can never race past a sleeping loop.
pub(crate) struct RunnerState {
    paused: AtomicBool,
    delay_ms: AtomicU64,
    stopping: Mutex<bool>,
    wake: Condvar,
}

impl RunnerState {
    pub(crate) fn new(paused: bool, delay_ms: u64) -> Self {
        Self {
            paused: AtomicBool::new(paused),
            delay_ms: AtomicU64::new(delay_ms),
            stopping: Mutex::new(false),
            wake: Condvar::new(),
        }
    }

    pub(crate) fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    pub(crate) fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::Release);
        self.wake.notify_all();
    }

    pub(crate) fn delay_ms(&self) -> u64 {
        self.delay_ms.load(Ordering::Acquire)
    }

    pub(crate) fn set_delay_ms(&self, delay_ms: u64) {
        self.delay_ms.store(delay_ms, Ordering::Release);
        self.wake.notify_all();
    }

    fn stop_requested(&self) -> bool {
        *self
            .stopping
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn request_stop(&self) {
        let mut stopping = self
            .stopping
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *stopping = true;
        self.wake.notify_all();
    }

    /// Park until `timeout` elapses, a notification arrives, or a stop is
    /// already pending.
    fn wait(&self, timeout: Duration) {
        if timeout.is_zero() {
            return;
        }
        let stopping = self
            .stopping
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !*stopping {
            let _ = self
                .wake
                .wait_timeout(stopping, timeout)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

fn run_loop(grid: SharedGrid, receiver: CommandReceiver, state: Arc<RunnerState>) {
    debug!("simulation loop started");
    let mut next_step = Instant::now();
    while !state.stop_requested() {
        let wait;
        {
            let mut grid = grid.lock().unwrap_or_else(PoisonError::into_inner);
            drain_pending_commands(&receiver, &mut grid);
            if state.is_paused() {
                // Keep pushing the deadline so resuming waits a full delay
                // before the first background step.
                next_step = Instant::now() + Duration::from_millis(state.delay_ms());
                wait = POLL_INTERVAL;
            } else {
                let now = Instant::now();
                if now >= next_step {
                    grid.step();
                    next_step = now + Duration::from_millis(state.delay_ms());
                }
                wait = POLL_INTERVAL.min(next_step.saturating_duration_since(Instant::now()));
            }
        }
        state.wait(wait);
    }
    debug!("simulation loop stopped");
}

/// Owns the simulation thread and stops it on drop.
pub struct SimulationRunner {
    state: Arc<RunnerState>,
    thread: Option<JoinHandle<()>>,
}

impl SimulationRunner {
    fn spawn(grid: SharedGrid, receiver: CommandReceiver, state: Arc<RunnerState>) -> Self {
        let loop_state = Arc::clone(&state);
        let thread = thread::spawn(move || run_loop(grid, receiver, loop_state));
        Self {
            state,
            thread: Some(thread),
        }
    }

    /// Signal the loop to exit and wait for it. Idempotent.
    pub fn stop(&mut self) {
        self.state.request_stop();
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            warn!("simulation thread panicked before shutdown");
        }
    }
}

impl Drop for SimulationRunner {
    fn drop(&mut self) {
        self.stop();
    }
}

/// A started session: the shared grid, its simulation thread, and a handle.
///
/// Sessions start paused; call [`ControlHandle::set_paused`] with `false`
/// to let the background loop step.
pub struct ControlRuntime {
    handle: ControlHandle,
    runner: SimulationRunner,
}

impl ControlRuntime {
    /// Validate the configuration, build the grid, and start the loop.
    pub fn start(config: &GridConfig) -> Result<Self, GridError> {
        let grid = Grid::from_config(config)?;
        let (width, height) = (grid.width(), grid.height());
        let shared: SharedGrid = Arc::new(Mutex::new(grid));
        let (sender, receiver) = create_command_bus(COMMAND_QUEUE_CAPACITY);
        let state = Arc::new(RunnerState::new(true, config.step_delay_ms));
        let runner = SimulationRunner::spawn(Arc::clone(&shared), receiver, Arc::clone(&state));
        let handle = ControlHandle::new(shared, sender, state, width, height);
        Ok(Self { handle, runner })
    }

    #[must_use]
    pub fn handle(&self) -> &ControlHandle {
        &self.handle
    }

    /// Stop the simulation thread and wait for it to exit.
    pub fn shutdown(mut self) {
        self.runner.stop();
    }
}
