//! Observation snapshots as printable text rows.

use rayon::prelude::*;

use crate::simulation::tile::{Position, TileSnapshot};

/// Placeholder for tiles outside the current field of view.
const UNKNOWN_CELL: char = ' ';
/// Overlay for the agent's own tile.
const AGENT_CELL: char = 'A';

/// Renders one printable line per observation row, computed in parallel.
/// Unknown tiles render blank; the agent overlays its tile.
#[must_use]
pub fn observation_rows(
    observation: &[Vec<TileSnapshot>],
    agent_pos: Option<Position>,
) -> Vec<String> {
    observation
        .par_iter()
        .enumerate()
        .map(|(i, row)| {
            let mut line = String::with_capacity(row.len());
            for (j, cell) in row.iter().enumerate() {
                let ch = if agent_pos == Some((i as i32, j as i32)) {
                    AGENT_CELL
                } else {
                    cell.symbol.unwrap_or(UNKNOWN_CELL)
                };
                line.push(ch);
            }
            line
        })
        .collect()
}
