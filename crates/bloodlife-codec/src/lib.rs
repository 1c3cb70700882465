//! Plain-text field codec.
//!
//! The on-disk format is one line per row, top to bottom: `'X'` (either
//! case) marks an occupied cell, any other character a dead one. Predator
//! cells collapse to `'X'` on save, so a round trip revives them as plain
//! live cells; the distinction is intentionally not persisted.

use bloodlife_core::{CellState, Grid, GridError};
use thiserror::Error;

/// Character written for an occupied cell.
const LIVING_CELL_CHAR: char = 'X';
/// Character written for a dead cell.
const DEAD_CELL_CHAR: char = ' ';

/// Errors produced while decoding or reconciling a pattern.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// The source had no rows to parse.
    #[error("pattern source is empty")]
    EmptySource,
    /// The pattern can be neither centered nor mapped index-for-index.
    #[error(
        "pattern of {pattern_width}x{pattern_height} cannot be reconciled with a \
         {grid_width}x{grid_height} grid"
    )]
    PatternMismatch {
        pattern_width: u32,
        pattern_height: u32,
        grid_width: u32,
        grid_height: u32,
    },
    /// The grid rejected the decoded buffer.
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// A parsed rectangular aliveness pattern.
///
/// Rows shorter than the longest line are padded with dead cells, so the
/// pattern is always a proper rectangle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    width: u32,
    height: u32,
    rows: Vec<Vec<bool>>,
}

impl Pattern {
    /// Parse pattern text into a boolean matrix.
    ///
    /// Fails with [`CodecError::EmptySource`] when the input contains no
    /// rows at all; a file of blanks is a valid (empty) field.
    pub fn parse(bytes: &[u8]) -> Result<Self, CodecError> {
        let text = String::from_utf8_lossy(bytes);
        let rows: Vec<Vec<bool>> = text
            .lines()
            .map(|line| {
                line.chars()
                    .map(|ch| ch.eq_ignore_ascii_case(&LIVING_CELL_CHAR))
                    .collect()
            })
            .collect();
        if rows.is_empty() {
            return Err(CodecError::EmptySource);
        }
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        Ok(Self {
            width: width as u32,
            height: rows.len() as u32,
            rows,
        })
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    fn is_set(&self, x: u32, y: u32) -> bool {
        self.rows[y as usize].get(x as usize).copied().unwrap_or(false)
    }

    /// Reconcile the pattern with a grid of the given extents.
    ///
    /// A pattern strictly smaller in both extents is centered with symmetric
    /// offsets; one matching the extents exactly maps index-for-index.
    /// Anything else fails without producing a buffer.
    pub fn render(&self, grid_width: u32, grid_height: u32) -> Result<Vec<CellState>, CodecError> {
        let mismatch = CodecError::PatternMismatch {
            pattern_width: self.width,
            pattern_height: self.height,
            grid_width,
            grid_height,
        };

        let (offset_x, offset_y) = if self.width < grid_width && self.height < grid_height {
            ((grid_width - self.width) / 2, (grid_height - self.height) / 2)
        } else if self.width == grid_width && self.height == grid_height {
            (0, 0)
        } else {
            return Err(mismatch);
        };

        let mut cells =
            vec![CellState::Dead; (grid_width as usize) * (grid_height as usize)];
        for y in 0..self.height {
            for x in 0..self.width {
                if self.is_set(x, y) {
                    let gx = (x + offset_x) as usize;
                    let gy = (y + offset_y) as usize;
                    cells[gy * (grid_width as usize) + gx] = CellState::Alive;
                }
            }
        }
        Ok(cells)
    }
}

/// Encode the grid as pattern text, one line per row.
#[must_use]
pub fn encode(grid: &Grid) -> String {
    let width = grid.width() as usize;
    let mut out = String::with_capacity((width + 1) * grid.height() as usize);
    for row in grid.cells().chunks(width.max(1)) {
        for cell in row {
            out.push(if cell.is_occupied() {
                LIVING_CELL_CHAR
            } else {
                DEAD_CELL_CHAR
            });
        }
        out.push('\n');
    }
    out
}

/// Decode pattern bytes straight into a grid.
///
/// The pattern is parsed and reconciled in full before the grid is touched,
/// so a failure leaves the grid exactly as it was. A successful load resets
/// the generation counter and stability flag.
pub fn decode_into(grid: &mut Grid, bytes: &[u8]) -> Result<(), CodecError> {
    let pattern = Pattern::parse(bytes)?;
    let cells = pattern.render(grid.width(), grid.height())?;
    grid.load_cells(cells)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bloodlife_core::GridConfig;

    fn grid(width: u32, height: u32) -> Grid {
        Grid::from_config(&GridConfig {
            width,
            height,
            rng_seed: Some(5),
            ..GridConfig::default()
        })
        .expect("grid")
    }

    #[test]
    fn encode_writes_one_line_per_row() {
        let mut field = grid(3, 2);
        field.toggle(0, 0).expect("toggle");
        field.toggle(2, 1).expect("toggle");
        assert_eq!(encode(&field), "X  \n  X\n");
    }

    #[test]
    fn parse_is_case_insensitive_and_pads_short_rows() {
        let pattern = Pattern::parse(b"xX\nX\n").expect("parse");
        assert_eq!(pattern.width(), 2);
        assert_eq!(pattern.height(), 2);
        assert!(pattern.is_set(0, 0));
        assert!(pattern.is_set(1, 0));
        assert!(pattern.is_set(0, 1));
        assert!(!pattern.is_set(1, 1));
    }

    #[test]
    fn empty_source_is_rejected() {
        assert_eq!(Pattern::parse(b"").unwrap_err(), CodecError::EmptySource);
    }

    #[test]
    fn smaller_pattern_is_centered() {
        let pattern = Pattern::parse(b"XX\nXX\n").expect("parse");
        let cells = pattern.render(6, 6).expect("render");
        let mut field = grid(6, 6);
        field.load_cells(cells).expect("load");
        for (x, y) in [(2, 2), (3, 2), (2, 3), (3, 3)] {
            assert_eq!(field.cell(x, y), Some(CellState::Alive), "({x}, {y})");
        }
        assert_eq!(field.live_cells(), 4);
    }

    #[test]
    fn exact_pattern_maps_directly() {
        let pattern = Pattern::parse(b"X \n X\n").expect("parse");
        let cells = pattern.render(2, 2).expect("render");
        assert_eq!(
            cells,
            vec![
                CellState::Alive,
                CellState::Dead,
                CellState::Dead,
                CellState::Alive
            ]
        );
    }

    #[test]
    fn oversized_or_mixed_patterns_fail() {
        let tall = Pattern::parse(b"X\nX\nX\n").expect("parse");
        assert!(matches!(
            tall.render(3, 2),
            Err(CodecError::PatternMismatch { .. })
        ));
        // Narrower but not shorter: neither centering nor direct mapping fits.
        let mixed = Pattern::parse(b"X\nX\n").expect("parse");
        assert!(matches!(
            mixed.render(3, 2),
            Err(CodecError::PatternMismatch { .. })
        ));
    }

    #[test]
    fn failed_decode_leaves_grid_untouched() {
        let mut field = grid(2, 2);
        field.toggle(1, 1).expect("toggle");
        field.step();
        let before = field.cells().to_vec();
        let generation = field.generation();

        let err = decode_into(&mut field, b"XXX\nXXX\nXXX\n").unwrap_err();
        assert!(matches!(err, CodecError::PatternMismatch { .. }));
        assert_eq!(field.cells(), &before[..]);
        assert_eq!(field.generation(), generation);
    }

    #[test]
    fn successful_decode_resets_counters() {
        let mut field = grid(4, 4);
        field.step();
        field.step();
        assert!(field.is_stable());
        decode_into(&mut field, b"XX\nXX\n").expect("decode");
        assert_eq!(field.generation(), 0);
        assert!(!field.is_stable());
        assert_eq!(field.live_cells(), 4);
    }
}
