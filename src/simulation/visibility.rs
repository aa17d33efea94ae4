//! Recursive shadow casting over octants.
//!
//! The world is split into eight octants around the origin; each octant is
//! swept in its own canonical `(row, col)` frame and mapped back to world
//! coordinates, so the column sweep is written once. An explicit FIFO work
//! list of `(column, top slope, bottom slope)` tasks replaces call-stack
//! recursion; the column index strictly increases and is bounded by the
//! radius, which terminates the sweep.
//!
//! Octant layout around the agent (rows grow downward):
//!
//! ```text
//!      \ 5|6 /
//!     4 \ | / 7
//!    -----------
//!     3 / | \ 0
//!      / 2|1 \
//! ```

use std::collections::{HashMap, HashSet, VecDeque};

use crate::error::LabyrinthError;
use crate::simulation::environment::GridEnvironment;
use crate::simulation::params::SLOPE_EPSILON;
use crate::simulation::tile::{Direction, Position, TileSnapshot};

/// Rounds a non-negative slope product to its row index: up when the
/// fractional part strictly exceeds one half, down otherwise. Cone-edge
/// membership depends on this exact comparison.
fn slope_row(value: f64) -> i32 {
    let base = value.floor();
    if value - base > 0.5 {
        base as i32 + 1
    } else {
        base as i32
    }
}

/// Maps octant-local `(row, col)` coordinates back to world coordinates.
fn transform_octant(octant: u8, origin: Position, row: i32, col: i32) -> Position {
    let (r, c) = origin;
    match octant {
        0 => (r + row, c + col),
        1 => (r + col, c + row),
        2 => (r + col, c - row),
        3 => (r + row, c - col),
        4 => (r - row, c - col),
        5 => (r - col, c - row),
        6 => (r - col, c + row),
        _ => (r - row, c + col),
    }
}

/// Rotates a world-frame delta into the agent frame, where straight ahead
/// is `(-1, 0)` regardless of facing.
fn agent_frame(delta: Position, facing: Direction) -> Position {
    let (dr, dc) = delta;
    match facing {
        Direction::North => (dr, dc),
        Direction::East => (-dc, dr),
        Direction::South => (-dr, -dc),
        Direction::West => (dc, -dr),
    }
}

impl GridEnvironment {
    /// Sweeps one octant, returning the positions visible from `origin`
    /// within `radius` (`None` = no radius cutoff). With `transparent` set,
    /// opacity never blocks sight and the sweep degenerates to a distance
    /// check ("glass maze", used for target discernibility).
    pub(crate) fn cast_octant(
        &self,
        origin: Position,
        octant: u8,
        radius: Option<i32>,
        transparent: bool,
    ) -> Vec<Position> {
        let mut tasks: VecDeque<(i32, f64, f64)> = VecDeque::new();
        tasks.push_back((1, 1.0, 0.0));
        let mut visibles = Vec::new();
        while let Some((col, top_slope, bot_slope)) = tasks.pop_front() {
            self.sweep_column(
                origin,
                octant,
                radius,
                transparent,
                col,
                top_slope,
                bot_slope,
                &mut tasks,
                &mut visibles,
            );
        }
        visibles
    }

    /// Processes one column of an octant, appending visible positions and
    /// scheduling continuation tasks as opacity transitions split the
    /// unobstructed slope range.
    #[allow(clippy::too_many_arguments)]
    fn sweep_column(
        &self,
        origin: Position,
        octant: u8,
        radius: Option<i32>,
        transparent: bool,
        col: i32,
        top_slope: f64,
        mut bot_slope: f64,
        tasks: &mut VecDeque<(i32, f64, f64)>,
        visibles: &mut Vec<Position>,
    ) {
        if let Some(r) = radius {
            if col > r {
                return;
            }
        }
        // Inverted or degenerate slope ranges carry no visible span.
        if top_slope < bot_slope
            || (top_slope - bot_slope).abs() * f64::from(col) < SLOPE_EPSILON
        {
            return;
        }

        let col_lower = f64::from(col) - 0.5;
        let bot_row = slope_row(col_lower * bot_slope);
        let top_row = slope_row((f64::from(col) + 0.5) * top_slope).min(self.size.0 - 1);
        let col_square = col_lower * col_lower;
        let radius_square = radius.map(|r| f64::from(r * r));

        let mut last_row_transparent: Option<bool> = None;
        let mut only_edges = false;

        for row in bot_row..=top_row {
            let row_lower = f64::from(row) - 0.5;
            if let Some(limit) = radius_square {
                if row_lower * row_lower + col_square > limit {
                    break;
                }
            }
            let pos = transform_octant(octant, origin, row, col);
            let Some(tile) = self.tiles.get(&pos) else {
                // Outside the known world; nothing further along this column.
                break;
            };
            let current_transparent = transparent || tile.is_passable();

            // Edges-only mode keeps revealing wall silhouettes after sight
            // is fully blocked, but no open tiles.
            if !only_edges || !current_transparent {
                visibles.push(pos);
            }

            if !current_transparent {
                if last_row_transparent == Some(true) {
                    // The span below the obstruction continues next column.
                    let new_top = row_lower / (f64::from(col) + 0.5);
                    tasks.push_back((col + 1, new_top, bot_slope));
                }
                bot_slope = (f64::from(row) + 0.5) / col_lower;
                if bot_slope >= top_slope {
                    only_edges = true;
                }
            }
            last_row_transparent = Some(current_transparent);
        }

        if last_row_transparent == Some(true) {
            tasks.push_back((col + 1, top_slope, bot_slope));
        }
    }

    /// The two octants merged for a facing direction.
    const fn facing_octants(facing: Direction) -> [u8; 2] {
        match facing {
            Direction::North => [5, 6],
            Direction::South => [1, 2],
            Direction::East => [0, 7],
            Direction::West => [3, 4],
        }
    }

    /// The forward view cone for the current facing: the two adjacent
    /// octants, merged and deduplicated, walls blocking sight.
    pub fn view_cone(&self) -> Result<Vec<Position>, LabyrinthError> {
        let origin = self.agent_pos.ok_or_else(|| LabyrinthError::UninitializedAgent {
            operation: "compute the view cone".to_string(),
        })?;
        let mut seen = HashSet::new();
        let mut cone = Vec::new();
        for octant in Self::facing_octants(self.facing) {
            for pos in self.cast_octant(origin, octant, self.view_radius, false) {
                if seen.insert(pos) {
                    cone.push(pos);
                }
            }
        }
        cone.sort_unstable();
        Ok(cone)
    }

    /// The forward view cone keyed by agent-frame coordinates: straight
    /// ahead is `(-1, 0)` whatever the facing. This is the query the
    /// navigation strategies consume.
    pub fn view_cone_relative(
        &self,
    ) -> Result<HashMap<Position, TileSnapshot>, LabyrinthError> {
        let origin = self.agent_pos.ok_or_else(|| LabyrinthError::UninitializedAgent {
            operation: "compute the view cone".to_string(),
        })?;
        let mut cone = HashMap::new();
        for pos in self.view_cone()? {
            if let Some(tile) = self.tiles.get(&pos) {
                let delta = (pos.0 - origin.0, pos.1 - origin.1);
                cone.insert(agent_frame(delta, self.facing), tile.snapshot());
            }
        }
        Ok(cone)
    }

    /// The omnidirectional visible set: all eight octants within the view
    /// radius, plus the agent's own tile.
    pub fn visible_positions(&self) -> Result<HashSet<Position>, LabyrinthError> {
        let origin = self.agent_pos.ok_or_else(|| LabyrinthError::UninitializedAgent {
            operation: "assemble an observation".to_string(),
        })?;
        let mut visibles: HashSet<Position> = HashSet::new();
        for octant in 0..8 {
            visibles.extend(self.cast_octant(origin, octant, self.view_radius, false));
        }
        visibles.insert(origin);
        Ok(visibles)
    }

    /// Whether `position` is within `radius` of the agent under the glass
    /// maze rule (distance limits sight, opacity does not). Only the octant
    /// containing the position is swept. `None` means no radius cutoff;
    /// `false` when no agent is placed.
    #[must_use]
    pub fn is_visible(&self, position: Position, radius: Option<i32>) -> bool {
        let Some(origin) = self.agent_pos else {
            return false;
        };
        let dr = position.0 - origin.0;
        let dc = position.1 - origin.1;
        let octant = match (dr < 0, dc < 0, dr.abs() < dc.abs()) {
            (false, false, true) => 0,
            (false, false, false) => 1,
            (false, true, false) => 2,
            (false, true, true) => 3,
            (true, true, true) => 4,
            (true, true, false) => 5,
            (true, false, false) => 6,
            (true, false, true) => 7,
        };
        self.cast_octant(origin, octant, radius, true)
            .contains(&position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slope_row_rounds_half_down() {
        assert_eq!(slope_row(0.0), 0);
        assert_eq!(slope_row(1.5), 1);
        assert_eq!(slope_row(1.500_001), 2);
        assert_eq!(slope_row(2.49), 2);
    }

    #[test]
    fn octant_transforms_cover_all_quadrants() {
        let origin = (10, 10);
        let mut seen = HashSet::new();
        for octant in 0..8 {
            seen.insert(transform_octant(octant, origin, 1, 2));
        }
        // Two octants share each diagonal but row < col keeps these apart.
        assert_eq!(seen.len(), 8);
    }

    #[test]
    fn agent_frame_maps_facing_to_ahead() {
        for facing in [
            Direction::North,
            Direction::South,
            Direction::West,
            Direction::East,
        ] {
            assert_eq!(agent_frame(facing.delta(), facing), (-1, 0));
        }
    }
}
