//! Shared application plumbing for the bloodlife control surfaces.
//!
//! The grid lives behind one exclusive lock; foreground mutations travel as
//! [`bloodlife_core::ControlCommand`]s over a bounded queue and are applied
//! by the background simulation thread, which is the grid's single writer.

use std::sync::{Arc, Mutex};

use bloodlife_core::Grid;

pub type SharedGrid = Arc<Mutex<Grid>>;

pub mod command;
pub mod control;
pub mod runner;

pub use control::{ControlError, ControlHandle};
pub use runner::{ControlRuntime, SimulationRunner};
