//! Thread-safe control surface over a running simulation.
//!
//! A [`ControlHandle`] is the only thing front ends touch. Reads take the
//! grid lock directly; mutations are validated against the session extents
//! first and then enqueued for the simulation thread to apply, so the grid
//! only ever has one writer.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crossfire::TrySendError;
use thiserror::Error;

use bloodlife_codec::{CodecError, Pattern, encode};
use bloodlife_core::{CellState, ControlCommand, Grid, GridError, GridSnapshot};

use crate::SharedGrid;
use crate::command::CommandSender;
use crate::runner::RunnerState;

/// Errors surfaced to front ends by the control layer.
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("failed to lock simulation state")]
    Lock,
    #[error("command queue is full; retry shortly")]
    CommandQueueFull,
    #[error("command queue is closed; the simulation has shut down")]
    CommandQueueClosed,
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl<T> From<PoisonError<T>> for ControlError {
    fn from(_: PoisonError<T>) -> Self {
        ControlError::Lock
    }
}

/// Cloneable handle used by UI threads, the CLI, and tests.
#[derive(Clone)]
pub struct ControlHandle {
    grid: SharedGrid,
    commands: CommandSender,
    runner: Arc<RunnerState>,
    width: u32,
    height: u32,
    hovered: Arc<Mutex<Option<(u32, u32)>>>,
}

impl ControlHandle {
    pub(crate) fn new(
        grid: SharedGrid,
        commands: CommandSender,
        runner: Arc<RunnerState>,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            grid,
            commands,
            runner,
            width,
            height,
            hovered: Arc::new(Mutex::new(None)),
        }
    }

    fn lock_grid(&self) -> Result<MutexGuard<'_, Grid>, ControlError> {
        Ok(self.grid.lock()?)
    }

    fn enqueue(&self, command: ControlCommand) -> Result<(), ControlError> {
        match self.commands.try_send(command) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(ControlError::CommandQueueFull),
            Err(TrySendError::Disconnected(_)) => Err(ControlError::CommandQueueClosed),
        }
    }

    fn check_bounds(&self, x: u32, y: u32) -> Result<(), ControlError> {
        if x >= self.width || y >= self.height {
            return Err(GridError::OutOfBounds { x, y }.into());
        }
        Ok(())
    }

    /// Session extents, fixed for the lifetime of the runtime.
    #[must_use]
    pub const fn extents(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    // --- loop flags -------------------------------------------------------

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.runner.is_paused()
    }

    pub fn set_paused(&self, paused: bool) {
        self.runner.set_paused(paused);
    }

    /// Flip the paused flag, returning the new value.
    pub fn toggle_paused(&self) -> bool {
        let paused = !self.runner.is_paused();
        self.runner.set_paused(paused);
        paused
    }

    #[must_use]
    pub fn delay_ms(&self) -> u64 {
        self.runner.delay_ms()
    }

    pub fn set_delay_ms(&self, delay_ms: u64) {
        self.runner.set_delay_ms(delay_ms);
    }

    /// Lengthen the step delay by one millisecond, returning the new value.
    pub fn increase_delay(&self) -> u64 {
        let delay = self.runner.delay_ms().saturating_add(1);
        self.runner.set_delay_ms(delay);
        delay
    }

    /// Shorten the step delay by one millisecond, saturating at zero.
    pub fn decrease_delay(&self) -> u64 {
        let delay = self.runner.delay_ms().saturating_sub(1);
        self.runner.set_delay_ms(delay);
        delay
    }

    // --- queued mutations -------------------------------------------------

    /// Negate the aliveness of one cell.
    pub fn toggle_cell(&self, x: u32, y: u32) -> Result<(), ControlError> {
        self.check_bounds(x, y)?;
        self.enqueue(ControlCommand::ToggleCell { x, y })
    }

    /// Kill every cell.
    pub fn clear(&self) -> Result<(), ControlError> {
        self.enqueue(ControlCommand::Clear)
    }

    /// Re-seed the field from the session RNG.
    pub fn randomize(&self) -> Result<(), ControlError> {
        self.enqueue(ControlCommand::Randomize)
    }

    /// Advance exactly one generation, paused or not.
    pub fn step_once(&self) -> Result<(), ControlError> {
        self.enqueue(ControlCommand::StepOnce)
    }

    pub fn set_alive_chance(&self, chance: u64) -> Result<(), ControlError> {
        if chance < 1 {
            return Err(GridError::InvalidProbability("alive_chance must be at least 1").into());
        }
        self.enqueue(ControlCommand::SetAliveChance(chance))
    }

    pub fn set_bloody_chance(&self, chance: u64) -> Result<(), ControlError> {
        if chance < 1 {
            return Err(GridError::InvalidProbability("bloody_chance must be at least 1").into());
        }
        self.enqueue(ControlCommand::SetBloodyChance(chance))
    }

    /// Raise the randomize denominator by one.
    ///
    /// The increment is computed by the simulation thread when the command
    /// is applied, so it serializes with every update still in the queue.
    pub fn increase_alive_chance(&self) -> Result<(), ControlError> {
        self.enqueue(ControlCommand::IncreaseAliveChance)
    }

    /// Lower the randomize denominator by one, stopping at one.
    pub fn decrease_alive_chance(&self) -> Result<(), ControlError> {
        self.enqueue(ControlCommand::DecreaseAliveChance)
    }

    /// Raise the predator-conversion denominator by one.
    pub fn increase_bloody_chance(&self) -> Result<(), ControlError> {
        self.enqueue(ControlCommand::IncreaseBloodyChance)
    }

    /// Lower the predator-conversion denominator by one, stopping at one.
    pub fn decrease_bloody_chance(&self) -> Result<(), ControlError> {
        self.enqueue(ControlCommand::DecreaseBloodyChance)
    }

    // --- persistence ------------------------------------------------------

    /// Parse pattern bytes and queue a full-field replacement.
    ///
    /// Parsing and reconciliation finish before anything is enqueued, so a
    /// malformed pattern leaves the running field untouched.
    pub fn load(&self, bytes: &[u8]) -> Result<(), ControlError> {
        let pattern = Pattern::parse(bytes)?;
        let cells = pattern.render(self.width, self.height)?;
        self.enqueue(ControlCommand::LoadCells(cells))
    }

    /// Encode the current field as pattern bytes.
    pub fn save(&self) -> Result<Vec<u8>, ControlError> {
        let grid = self.lock_grid()?;
        Ok(encode(&grid).into_bytes())
    }

    // --- reads ------------------------------------------------------------

    /// Full copy of the field for display layers.
    pub fn snapshot(&self) -> Result<GridSnapshot, ControlError> {
        Ok(self.lock_grid()?.snapshot())
    }

    pub fn generation(&self) -> Result<u64, ControlError> {
        Ok(self.lock_grid()?.generation())
    }

    pub fn is_stable(&self) -> Result<bool, ControlError> {
        Ok(self.lock_grid()?.is_stable())
    }

    pub fn cell(&self, x: u32, y: u32) -> Result<CellState, ControlError> {
        self.lock_grid()?
            .cell(x, y)
            .ok_or_else(|| GridError::OutOfBounds { x, y }.into())
    }

    // --- hover tracking ---------------------------------------------------

    /// Record the cell under the cursor, or `None` when the cursor left the
    /// field. The coordinate is validated against the session extents.
    pub fn set_hovered(&self, cell: Option<(u32, u32)>) -> Result<(), ControlError> {
        if let Some((x, y)) = cell {
            self.check_bounds(x, y)?;
        }
        *self.hovered.lock()? = cell;
        Ok(())
    }

    pub fn hovered(&self) -> Result<Option<(u32, u32)>, ControlError> {
        Ok(*self.hovered.lock()?)
    }
}
