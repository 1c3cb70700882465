use crossfire::mpmc;
use crossfire::{MRx, MTx, TryRecvError, detect_backoff_cfg};

use bloodlife_core::{ControlCommand, Grid, apply_control_command};
use tracing::{debug, warn};

pub type CommandSender = MTx<ControlCommand>;
pub type CommandReceiver = MRx<ControlCommand>;

pub fn create_command_bus(capacity: usize) -> (CommandSender, CommandReceiver) {
    detect_backoff_cfg();
    mpmc::bounded_blocking(capacity)
}

/// Apply every queued command to the grid. Called with the grid lock held.
///
/// A rejected command is logged and dropped; it never stops the loop.
pub fn drain_pending_commands(receiver: &CommandReceiver, grid: &mut Grid) {
    loop {
        match receiver.try_recv() {
            Ok(command) => {
                debug!(?command, "applying control command");
                if let Err(err) = apply_control_command(grid, command) {
                    warn!(%err, "control command rejected");
                }
            }
            Err(TryRecvError::Empty) => break,
            Err(TryRecvError::Disconnected) => break,
        }
    }
}
