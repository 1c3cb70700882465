//! Grid model and generation engine for the predator-extended game of life.
//!
//! The simulation is a classic Conway B3/S23 automaton with one extra cell
//! state: a predator ("bloody") cell that hunts adjacent live cells each
//! generation and converts surviving live cells with a configurable
//! probability. Everything in this crate is pure and single-threaded; the
//! concurrency front lives in `bloodlife-app`.

use rand::{Rng, SeedableRng, rngs::SmallRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Moore neighbourhood offsets in canonical scan order: NW, N, NE, W, E, SW, S, SE.
///
/// Prey search walks these in order, so the order is part of the engine's
/// observable behaviour (it decides which neighbour a predator eats first).
const NEIGHBOUR_OFFSETS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// State of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CellState {
    /// Empty cell.
    #[default]
    Dead,
    /// Ordinary live cell, subject to the Conway rule.
    Alive,
    /// Predator cell: eats adjacent live cells, starves onto empty ones.
    Predator,
}

impl CellState {
    /// Whether the cell counts as occupied (alive or predator).
    #[must_use]
    pub const fn is_occupied(self) -> bool {
        !matches!(self, Self::Dead)
    }

    /// Toggle negates aliveness: `Dead` becomes `Alive`, anything else `Dead`.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Dead => Self::Alive,
            Self::Alive | Self::Predator => Self::Dead,
        }
    }
}

/// Errors produced by grid construction, configuration, and cell addressing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    /// A positive extent was required but not supplied.
    #[error("invalid grid dimensions: {0}")]
    InvalidDimensions(&'static str),
    /// A `1/chance` probability denominator below 1 was supplied.
    #[error("invalid probability: {0}")]
    InvalidProbability(&'static str),
    /// Coordinate outside the grid extents.
    #[error("coordinates ({x}, {y}) are outside the grid")]
    OutOfBounds { x: u32, y: u32 },
}

/// Static configuration for a simulation session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    /// Field width in cells.
    pub width: u32,
    /// Field height in cells.
    pub height: u32,
    /// Denominator for the randomize draw: each cell starts alive with
    /// probability `1/alive_chance`. Must be at least 1.
    pub alive_chance: u64,
    /// Denominator for predator conversion: a surviving live cell turns
    /// predator with probability `1/bloody_chance`. Must be at least 1.
    pub bloody_chance: u64,
    /// Optional RNG seed for reproducible sessions.
    pub rng_seed: Option<u64>,
    /// Initial delay between background steps, in milliseconds.
    pub step_delay_ms: u64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 160,
            height: 100,
            alive_chance: 10,
            bloody_chance: 500,
            rng_seed: None,
            step_delay_ms: 50,
        }
    }
}

impl GridConfig {
    /// Validates the configuration before any state is built.
    pub fn validate(&self) -> Result<(), GridError> {
        if self.width == 0 || self.height == 0 {
            return Err(GridError::InvalidDimensions(
                "session extents must be non-zero",
            ));
        }
        if self.alive_chance < 1 {
            return Err(GridError::InvalidProbability(
                "alive_chance must be at least 1",
            ));
        }
        if self.bloody_chance < 1 {
            return Err(GridError::InvalidProbability(
                "bloody_chance must be at least 1",
            ));
        }
        Ok(())
    }

    /// Returns the configured RNG, seeding from entropy when no seed is set.
    fn seeded_rng(&self) -> SmallRng {
        match self.rng_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => {
                let seed: u64 = rand::random();
                SmallRng::seed_from_u64(seed)
            }
        }
    }
}

/// Read-only copy of the grid state handed to display layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub width: u32,
    pub height: u32,
    pub cells: Vec<CellState>,
    pub generation: u64,
    pub stable: bool,
    pub alive_chance: u64,
    pub bloody_chance: u64,
}

impl GridSnapshot {
    /// Number of occupied (alive or predator) cells.
    #[must_use]
    pub fn live_cells(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_occupied()).count()
    }
}

/// Fixed-size cell matrix with a generation counter and stability flag.
///
/// Dimensions never change after construction; row-major flat storage.
#[derive(Debug)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<CellState>,
    generation: u64,
    stable: bool,
    alive_chance: u64,
    bloody_chance: u64,
    rng: SmallRng,
}

impl Grid {
    /// Build a grid for a validated session configuration.
    pub fn from_config(config: &GridConfig) -> Result<Self, GridError> {
        config.validate()?;
        Ok(Self::build(
            config.width,
            config.height,
            config.alive_chance,
            config.bloody_chance,
            config.seeded_rng(),
        ))
    }

    fn build(width: u32, height: u32, alive_chance: u64, bloody_chance: u64, rng: SmallRng) -> Self {
        Self {
            width,
            height,
            cells: vec![CellState::Dead; (width as usize) * (height as usize)],
            generation: 0,
            stable: false,
            alive_chance,
            bloody_chance,
            rng,
        }
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Generations advanced since the last clear/randomize/load.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the last step produced no change.
    #[must_use]
    pub const fn is_stable(&self) -> bool {
        self.stable
    }

    #[must_use]
    pub const fn alive_chance(&self) -> u64 {
        self.alive_chance
    }

    #[must_use]
    pub const fn bloody_chance(&self) -> u64 {
        self.bloody_chance
    }

    /// Row-major view of every cell.
    #[must_use]
    pub fn cells(&self) -> &[CellState] {
        &self.cells
    }

    /// Number of occupied (alive or predator) cells.
    #[must_use]
    pub fn live_cells(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_occupied()).count()
    }

    /// Flat index for `(x, y)`; callers must have bounds-checked already.
    #[inline]
    const fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }

    /// State of a single cell, or `None` outside the extents.
    #[must_use]
    pub fn cell(&self, x: u32, y: u32) -> Option<CellState> {
        if x < self.width && y < self.height {
            Some(self.cells[self.offset(x, y)])
        } else {
            None
        }
    }

    /// Produce a read-only snapshot for display layers.
    #[must_use]
    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            width: self.width,
            height: self.height,
            cells: self.cells.clone(),
            generation: self.generation,
            stable: self.stable,
            alive_chance: self.alive_chance,
            bloody_chance: self.bloody_chance,
        }
    }

    /// Set the randomize denominator. Rejects values below 1 without mutating.
    pub fn set_alive_chance(&mut self, chance: u64) -> Result<(), GridError> {
        if chance < 1 {
            return Err(GridError::InvalidProbability(
                "alive_chance must be at least 1",
            ));
        }
        self.alive_chance = chance;
        Ok(())
    }

    /// Set the predator-conversion denominator. Rejects values below 1.
    pub fn set_bloody_chance(&mut self, chance: u64) -> Result<(), GridError> {
        if chance < 1 {
            return Err(GridError::InvalidProbability(
                "bloody_chance must be at least 1",
            ));
        }
        self.bloody_chance = chance;
        Ok(())
    }

    /// Negate the aliveness of one cell, returning its new state.
    ///
    /// Any external edit invalidates a previously detected steady state, so
    /// the stability flag is cleared; the generation counter is kept.
    pub fn toggle(&mut self, x: u32, y: u32) -> Result<CellState, GridError> {
        if x >= self.width || y >= self.height {
            return Err(GridError::OutOfBounds { x, y });
        }
        let idx = self.offset(x, y);
        self.cells[idx] = self.cells[idx].toggled();
        self.stable = false;
        Ok(self.cells[idx])
    }

    /// Kill every cell and restart the generation count.
    pub fn clear(&mut self) {
        self.cells.fill(CellState::Dead);
        self.generation = 0;
        self.stable = false;
    }

    /// Clear, then seed each cell alive with probability `1/alive_chance`.
    pub fn randomize(&mut self) {
        self.clear();
        for cell in &mut self.cells {
            if self.rng.random_range(1..=self.alive_chance) == 1 {
                *cell = CellState::Alive;
            }
        }
    }

    /// Replace the whole cell buffer, e.g. from a decoded pattern.
    ///
    /// The buffer length must match the grid extents exactly; on mismatch the
    /// grid is left untouched.
    pub fn load_cells(&mut self, cells: Vec<CellState>) -> Result<(), GridError> {
        if cells.len() != self.cells.len() {
            return Err(GridError::InvalidDimensions(
                "cell buffer does not match grid extents",
            ));
        }
        self.cells = cells;
        self.generation = 0;
        self.stable = false;
        Ok(())
    }

    /// Count of `Alive` cells (predators excluded) around `(x, y)` in a snapshot.
    fn alive_neighbours(&self, before: &[CellState], x: u32, y: u32) -> u32 {
        let mut count = 0;
        for (dx, dy) in NEIGHBOUR_OFFSETS {
            let nx = x as i64 + dx as i64;
            let ny = y as i64 + dy as i64;
            if nx >= 0
                && ny >= 0
                && nx < self.width as i64
                && ny < self.height as i64
                && before[(ny as usize) * (self.width as usize) + (nx as usize)] == CellState::Alive
            {
                count += 1;
            }
        }
        count
    }

    /// Pick the cell a predator at `(x, y)` targets this generation.
    ///
    /// The first `Alive` neighbour in canonical offset order wins; with no
    /// prey in sight, one of the 8 offsets is drawn uniformly, and an
    /// off-grid draw means the predator holds its position.
    fn hunt_target(&mut self, before: &[CellState], x: u32, y: u32) -> Option<(u32, u32)> {
        for (dx, dy) in NEIGHBOUR_OFFSETS {
            let nx = x as i64 + dx as i64;
            let ny = y as i64 + dy as i64;
            if nx >= 0
                && ny >= 0
                && nx < self.width as i64
                && ny < self.height as i64
                && before[(ny as usize) * (self.width as usize) + (nx as usize)] == CellState::Alive
            {
                return Some((nx as u32, ny as u32));
            }
        }
        let (dx, dy) = NEIGHBOUR_OFFSETS[self.rng.random_range(0..NEIGHBOUR_OFFSETS.len())];
        let nx = x as i64 + dx as i64;
        let ny = y as i64 + dy as i64;
        if nx >= 0 && ny >= 0 && nx < self.width as i64 && ny < self.height as i64 {
            Some((nx as u32, ny as u32))
        } else {
            None
        }
    }

    /// Advance the grid by one generation; a no-op once stable.
    ///
    /// Neighbour counts and prey searches read an immutable snapshot taken at
    /// entry, so the update is logically simultaneous regardless of scan
    /// order. Predator movement applies against the in-progress cells: the
    /// first predator to claim a prey cell wins, and later predators treat
    /// the claimed cell as occupied. Returns whether anything changed.
    pub fn step(&mut self) -> bool {
        if self.stable {
            return false;
        }
        let before = self.cells.clone();
        let mut changed = false;

        for y in 0..self.height {
            for x in 0..self.width {
                let idx = self.offset(x, y);
                let neighbours = self.alive_neighbours(&before, x, y);

                if before[idx] == CellState::Predator
                    && let Some((tx, ty)) = self.hunt_target(&before, x, y)
                {
                    let target = self.offset(tx, ty);
                    match self.cells[target] {
                        CellState::Alive => {
                            // Eats and spreads: the prey cell joins the predator.
                            self.cells[target] = CellState::Predator;
                            changed = true;
                        }
                        CellState::Dead => {
                            // Missed: the predator vacates its cell.
                            self.cells[idx] = CellState::Dead;
                            changed = true;
                        }
                        CellState::Predator => {}
                    }
                }

                match self.cells[idx] {
                    CellState::Alive if !(2..=3).contains(&neighbours) => {
                        self.cells[idx] = CellState::Dead;
                        changed = true;
                    }
                    CellState::Dead if neighbours == 3 => {
                        self.cells[idx] = CellState::Alive;
                        changed = true;
                    }
                    CellState::Alive => {
                        if self.rng.random_range(1..=self.bloody_chance) == 1 {
                            self.cells[idx] = CellState::Predator;
                            changed = true;
                        }
                    }
                    _ => {}
                }
            }
        }

        if changed {
            self.generation += 1;
        } else {
            self.stable = true;
        }
        changed
    }
}

/// Mutation requests accepted by the simulation loop's command queue.
///
/// Commands are validated by the control layer before they are enqueued, so
/// applying one is expected to succeed; a rejection is logged by the drain
/// and never stops the loop.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlCommand {
    /// Negate the aliveness of one cell.
    ToggleCell { x: u32, y: u32 },
    /// Kill every cell.
    Clear,
    /// Re-seed the field from the grid RNG.
    Randomize,
    /// Advance exactly one generation.
    StepOnce,
    /// Replace the randomize denominator.
    SetAliveChance(u64),
    /// Replace the predator-conversion denominator.
    SetBloodyChance(u64),
    /// Raise the randomize denominator by one, saturating.
    IncreaseAliveChance,
    /// Lower the randomize denominator by one, stopping at one.
    DecreaseAliveChance,
    /// Raise the predator-conversion denominator by one, saturating.
    IncreaseBloodyChance,
    /// Lower the predator-conversion denominator by one, stopping at one.
    DecreaseBloodyChance,
    /// Replace the whole field with a pre-rendered cell buffer.
    LoadCells(Vec<CellState>),
}

/// Apply a control command to the grid.
pub fn apply_control_command(grid: &mut Grid, command: ControlCommand) -> Result<(), GridError> {
    match command {
        ControlCommand::ToggleCell { x, y } => {
            grid.toggle(x, y)?;
        }
        ControlCommand::Clear => grid.clear(),
        ControlCommand::Randomize => grid.randomize(),
        ControlCommand::StepOnce => {
            grid.step();
        }
        ControlCommand::SetAliveChance(chance) => grid.set_alive_chance(chance)?,
        ControlCommand::SetBloodyChance(chance) => grid.set_bloody_chance(chance)?,
        // The increments read and write under the caller's lock, so they
        // serialize with every queued absolute update.
        ControlCommand::IncreaseAliveChance => {
            grid.set_alive_chance(grid.alive_chance().saturating_add(1))?;
        }
        ControlCommand::DecreaseAliveChance => {
            grid.set_alive_chance(grid.alive_chance().saturating_sub(1).max(1))?;
        }
        ControlCommand::IncreaseBloodyChance => {
            grid.set_bloody_chance(grid.bloody_chance().saturating_add(1))?;
        }
        ControlCommand::DecreaseBloodyChance => {
            grid.set_bloody_chance(grid.bloody_chance().saturating_sub(1).max(1))?;
        }
        ControlCommand::LoadCells(cells) => grid.load_cells(cells)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Grid with a fixed seed and a bloody chance so large that predator
    /// conversion never fires, leaving the pure Conway rule observable.
    fn conway_grid(width: u32, height: u32) -> Grid {
        Grid::from_config(&GridConfig {
            width,
            height,
            alive_chance: 10,
            bloody_chance: u64::MAX,
            rng_seed: Some(7),
            ..GridConfig::default()
        })
        .expect("grid")
    }

    fn set_alive(grid: &mut Grid, coords: &[(u32, u32)]) {
        for &(x, y) in coords {
            assert_eq!(grid.toggle(x, y).expect("toggle"), CellState::Alive);
        }
    }

    /// Direct construction bypassing session validation, for extents a
    /// validated config would reject.
    fn degenerate_grid(width: u32, height: u32) -> Grid {
        Grid::build(width, height, 10, u64::MAX, SmallRng::seed_from_u64(1))
    }

    fn set_predator(grid: &mut Grid, x: u32, y: u32) {
        let idx = (y as usize) * (grid.width() as usize) + (x as usize);
        grid.cells[idx] = CellState::Predator;
        grid.stable = false;
    }

    #[test]
    fn config_rejects_zero_extents() {
        let config = GridConfig {
            width: 0,
            ..GridConfig::default()
        };
        assert_eq!(
            Grid::from_config(&config).unwrap_err(),
            GridError::InvalidDimensions("session extents must be non-zero")
        );
    }

    #[test]
    fn config_rejects_zero_chances() {
        for config in [
            GridConfig {
                alive_chance: 0,
                ..GridConfig::default()
            },
            GridConfig {
                bloody_chance: 0,
                ..GridConfig::default()
            },
        ] {
            assert!(matches!(
                Grid::from_config(&config),
                Err(GridError::InvalidProbability(_))
            ));
        }
    }

    #[test]
    fn cell_accessors_bounds_checked() {
        let mut grid = conway_grid(4, 3);
        assert_eq!(grid.cell(3, 2), Some(CellState::Dead));
        assert_eq!(grid.cell(4, 0), None);
        assert_eq!(grid.cell(0, 3), None);
        assert_eq!(
            grid.toggle(4, 2).unwrap_err(),
            GridError::OutOfBounds { x: 4, y: 2 }
        );
    }

    #[test]
    fn toggle_negates_aliveness() {
        let mut grid = conway_grid(3, 3);
        assert_eq!(grid.toggle(1, 1).expect("toggle"), CellState::Alive);
        assert_eq!(grid.toggle(1, 1).expect("toggle"), CellState::Dead);
        set_predator(&mut grid, 1, 1);
        assert_eq!(grid.toggle(1, 1).expect("toggle"), CellState::Dead);
    }

    #[test]
    fn interior_cell_counts_all_eight_neighbours() {
        let mut grid = conway_grid(3, 3);
        for y in 0..3 {
            for x in 0..3 {
                if (x, y) != (1, 1) {
                    grid.toggle(x, y).expect("toggle");
                }
            }
        }
        let before = grid.cells().to_vec();
        assert_eq!(grid.alive_neighbours(&before, 1, 1), 8);
        // A corner only sees its in-bounds neighbours.
        assert_eq!(grid.alive_neighbours(&before, 0, 0), 2);
    }

    #[test]
    fn predator_neighbours_do_not_count_as_alive() {
        let mut grid = conway_grid(3, 3);
        set_predator(&mut grid, 0, 1);
        set_alive(&mut grid, &[(2, 1)]);
        let before = grid.cells().to_vec();
        assert_eq!(grid.alive_neighbours(&before, 1, 1), 1);
    }

    #[test]
    fn lonely_and_crowded_cells_die_birth_at_three() {
        let mut grid = conway_grid(5, 5);
        // Isolated cell.
        set_alive(&mut grid, &[(0, 0)]);
        // Crowded centre: 4 neighbours.
        set_alive(&mut grid, &[(2, 2), (1, 2), (3, 2), (2, 1), (2, 3)]);
        assert!(grid.step());
        assert_eq!(grid.cell(0, 0), Some(CellState::Dead));
        assert_eq!(grid.cell(2, 2), Some(CellState::Dead));
        // (3,3) saw exactly the centre and two arms, so it is born; (1,1)
        // additionally saw the isolated corner cell and stays dead.
        assert_eq!(grid.cell(3, 3), Some(CellState::Alive));
        assert_eq!(grid.cell(1, 1), Some(CellState::Dead));
        assert_eq!(grid.generation(), 1);
    }

    #[test]
    fn block_is_invariant_under_the_classic_rule() {
        let mut grid = conway_grid(4, 4);
        set_alive(&mut grid, &[(1, 1), (2, 1), (1, 2), (2, 2)]);
        let before = grid.cells().to_vec();
        assert!(!grid.step(), "a block must not change");
        assert_eq!(grid.cells(), &before[..]);
        assert!(grid.is_stable());
        assert_eq!(grid.generation(), 0);
    }

    #[test]
    fn stability_converges_and_sticks() {
        let mut grid = conway_grid(3, 3);
        set_alive(&mut grid, &[(1, 1)]);
        assert!(grid.step(), "isolated cell dies");
        assert_eq!(grid.generation(), 1);
        assert!(!grid.is_stable());

        assert!(!grid.step(), "empty grid no longer changes");
        assert!(grid.is_stable());
        assert_eq!(grid.generation(), 1, "no-change step keeps the counter");

        let before = grid.cells().to_vec();
        assert!(!grid.step(), "stable grid is a no-op");
        assert_eq!(grid.cells(), &before[..]);
        assert_eq!(grid.generation(), 1);
    }

    #[test]
    fn toggle_resets_stability() {
        let mut grid = conway_grid(3, 3);
        grid.step();
        grid.step();
        assert!(grid.is_stable());
        grid.toggle(0, 0).expect("toggle");
        assert!(!grid.is_stable());
        assert!(grid.step(), "the new cell dies, so the grid changed again");
    }

    #[test]
    fn blinker_oscillates() {
        let mut grid = conway_grid(5, 5);
        set_alive(&mut grid, &[(1, 2), (2, 2), (3, 2)]);
        assert!(grid.step());
        assert_eq!(grid.cell(2, 1), Some(CellState::Alive));
        assert_eq!(grid.cell(2, 2), Some(CellState::Alive));
        assert_eq!(grid.cell(2, 3), Some(CellState::Alive));
        assert_eq!(grid.cell(1, 2), Some(CellState::Dead));
        assert!(grid.step());
        assert_eq!(grid.cell(1, 2), Some(CellState::Alive));
        assert_eq!(grid.generation(), 2);
        assert!(!grid.is_stable());
    }

    #[test]
    fn predator_eats_adjacent_prey() {
        let mut grid = conway_grid(3, 3);
        set_predator(&mut grid, 0, 0);
        set_alive(&mut grid, &[(1, 0)]);
        assert!(grid.step());
        // The prey cell is claimed; the source keeps its predator.
        assert_eq!(grid.cell(1, 0), Some(CellState::Predator));
        assert_eq!(grid.cell(0, 0), Some(CellState::Predator));
        assert_eq!(grid.generation(), 1);
    }

    #[test]
    fn starving_predator_vacates() {
        // Centre of a 3x3: every fallback offset is in bounds and dead, so
        // the predator leaves regardless of which offset the RNG draws.
        let mut grid = conway_grid(3, 3);
        set_predator(&mut grid, 1, 1);
        assert!(grid.step());
        assert_eq!(grid.cell(1, 1), Some(CellState::Dead));
        assert_eq!(grid.live_cells(), 0);
        assert_eq!(grid.generation(), 1);
    }

    #[test]
    fn predator_with_no_in_bounds_draw_stays_put() {
        // On a 1x1 field every fallback offset lands off-grid, so the
        // predator holds its cell and the step changes nothing.
        let mut grid = degenerate_grid(1, 1);
        set_predator(&mut grid, 0, 0);
        assert!(!grid.step());
        assert_eq!(grid.cell(0, 0), Some(CellState::Predator));
        assert!(grid.is_stable());
        assert_eq!(grid.generation(), 0);
    }

    #[test]
    fn first_predator_claims_contested_prey() {
        // P A P in one row: the left predator is processed first and claims
        // the prey; the right predator then sees an occupied cell and stays.
        let mut grid = conway_grid(3, 1);
        set_predator(&mut grid, 0, 0);
        set_alive(&mut grid, &[(1, 0)]);
        set_predator(&mut grid, 2, 0);
        assert!(grid.step());
        assert_eq!(
            grid.cells(),
            &[CellState::Predator, CellState::Predator, CellState::Predator]
        );
        assert_eq!(grid.generation(), 1);
    }

    #[test]
    fn surviving_cell_turns_predator_when_chance_is_one() {
        let mut grid = Grid::from_config(&GridConfig {
            width: 4,
            height: 4,
            bloody_chance: 1,
            rng_seed: Some(3),
            ..GridConfig::default()
        })
        .expect("grid");
        set_alive(&mut grid, &[(1, 1), (2, 1), (1, 2), (2, 2)]);
        assert!(grid.step());
        // Every block member survives with 3 neighbours and converts.
        assert_eq!(grid.cell(1, 1), Some(CellState::Predator));
        assert_eq!(grid.cell(2, 2), Some(CellState::Predator));
    }

    #[test]
    fn randomize_chance_one_fills_the_grid() {
        let mut grid = Grid::from_config(&GridConfig {
            width: 8,
            height: 8,
            alive_chance: 1,
            rng_seed: Some(11),
            ..GridConfig::default()
        })
        .expect("grid");
        grid.randomize();
        assert_eq!(grid.live_cells(), 64);
        assert_eq!(grid.generation(), 0);
        assert!(!grid.is_stable());
    }

    #[test]
    fn randomize_is_reproducible_for_a_fixed_seed() {
        let config = GridConfig {
            width: 16,
            height: 16,
            alive_chance: 4,
            rng_seed: Some(1234),
            ..GridConfig::default()
        };
        let mut first = Grid::from_config(&config).expect("grid");
        let mut second = Grid::from_config(&config).expect("grid");
        first.randomize();
        second.randomize();
        assert_eq!(first.cells(), second.cells());
        assert!(first.live_cells() > 0, "1/4 over 256 cells fills something");
        assert!(first.live_cells() < 256);
    }

    #[test]
    fn degenerate_grids_never_change() {
        let mut empty = degenerate_grid(0, 0);
        assert!(!empty.step());
        assert!(empty.is_stable());
        assert_eq!(empty.generation(), 0);

        let mut line = degenerate_grid(1, 1);
        line.toggle(0, 0).expect("toggle");
        assert!(line.step(), "an isolated cell still dies");
        assert_eq!(line.generation(), 1);
        assert!(!line.step());
        assert!(line.is_stable());
    }

    #[test]
    fn chance_setters_reject_zero() {
        let mut grid = conway_grid(3, 3);
        assert!(matches!(
            grid.set_alive_chance(0),
            Err(GridError::InvalidProbability(_))
        ));
        assert!(matches!(
            grid.set_bloody_chance(0),
            Err(GridError::InvalidProbability(_))
        ));
        assert_eq!(grid.alive_chance(), 10);
        grid.set_alive_chance(3).expect("set");
        assert_eq!(grid.alive_chance(), 3);
    }

    #[test]
    fn load_cells_length_mismatch_leaves_grid_untouched() {
        let mut grid = conway_grid(3, 3);
        set_alive(&mut grid, &[(0, 0)]);
        let before = grid.cells().to_vec();
        assert!(grid.load_cells(vec![CellState::Alive; 4]).is_err());
        assert_eq!(grid.cells(), &before[..]);
    }

    #[test]
    fn load_cells_resets_counters() {
        let mut grid = conway_grid(2, 2);
        grid.step();
        grid.step();
        assert!(grid.is_stable());
        grid.load_cells(vec![CellState::Alive; 4]).expect("load");
        assert_eq!(grid.generation(), 0);
        assert!(!grid.is_stable());
        assert_eq!(grid.live_cells(), 4);
    }

    #[test]
    fn control_commands_apply() {
        let mut grid = conway_grid(3, 3);
        apply_control_command(&mut grid, ControlCommand::ToggleCell { x: 1, y: 1 })
            .expect("toggle");
        assert_eq!(grid.cell(1, 1), Some(CellState::Alive));
        apply_control_command(&mut grid, ControlCommand::StepOnce).expect("step");
        assert_eq!(grid.generation(), 1);
        apply_control_command(&mut grid, ControlCommand::SetAliveChance(2)).expect("chance");
        assert_eq!(grid.alive_chance(), 2);
        apply_control_command(&mut grid, ControlCommand::Clear).expect("clear");
        assert_eq!(grid.live_cells(), 0);
        assert_eq!(
            apply_control_command(&mut grid, ControlCommand::ToggleCell { x: 9, y: 9 }),
            Err(GridError::OutOfBounds { x: 9, y: 9 })
        );
    }

    #[test]
    fn relative_chance_commands_read_the_applied_value() {
        let mut grid = conway_grid(3, 3);
        // An absolute update followed by an increment must serialize: the
        // increment sees 5, not whatever the issuer last observed.
        apply_control_command(&mut grid, ControlCommand::SetAliveChance(5)).expect("set");
        apply_control_command(&mut grid, ControlCommand::IncreaseAliveChance).expect("increase");
        assert_eq!(grid.alive_chance(), 6);

        apply_control_command(&mut grid, ControlCommand::SetBloodyChance(2)).expect("set");
        apply_control_command(&mut grid, ControlCommand::DecreaseBloodyChance).expect("decrease");
        apply_control_command(&mut grid, ControlCommand::DecreaseBloodyChance).expect("decrease");
        assert_eq!(grid.bloody_chance(), 1, "decrements stop at one");
        apply_control_command(&mut grid, ControlCommand::IncreaseBloodyChance).expect("increase");
        assert_eq!(grid.bloody_chance(), 2);
    }

    #[test]
    fn snapshot_mirrors_grid() {
        let mut grid = conway_grid(3, 2);
        set_alive(&mut grid, &[(2, 1)]);
        let snapshot = grid.snapshot();
        assert_eq!(snapshot.width, 3);
        assert_eq!(snapshot.height, 2);
        assert_eq!(snapshot.cells, grid.cells());
        assert_eq!(snapshot.live_cells(), 1);
        assert!(!snapshot.stable);
    }
}
