//! Left-hand-rule labyrinth solver.

use crate::agents::Strategy;
use crate::error::LabyrinthError;
use crate::simulation::environment::GridEnvironment;
use crate::simulation::tile::{Action, TileSnapshot};

#[derive(Debug, Clone, Copy)]
enum Phase {
    TurnLeft,
    Probe { rights: u8 },
}

/// Keeps one hand on the left wall: turn left, step when the tile ahead is
/// passable, otherwise probe clockwise.
#[derive(Debug, Clone)]
pub struct WallFollower {
    phase: Phase,
}

impl WallFollower {
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: Phase::TurnLeft,
        }
    }
}

impl Default for WallFollower {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for WallFollower {
    fn name(&self) -> &'static str {
        "wall_follower"
    }

    fn decide(&mut self, env: &GridEnvironment) -> Result<Action, LabyrinthError> {
        match self.phase {
            Phase::TurnLeft => {
                self.phase = Phase::Probe { rights: 0 };
                Ok(Action::TurnLeft)
            }
            Phase::Probe { rights } => {
                let cone = env.view_cone_relative()?;
                let ahead_passable = cone.get(&(-1, 0)).is_some_and(TileSnapshot::is_passable);
                if ahead_passable {
                    self.phase = Phase::TurnLeft;
                    Ok(Action::Step(env.facing))
                } else if rights < 3 {
                    self.phase = Phase::Probe { rights: rights + 1 };
                    Ok(Action::TurnRight)
                } else {
                    // Boxed in on all probed sides; start a fresh sweep.
                    self.phase = Phase::Probe { rights: 0 };
                    Ok(Action::TurnLeft)
                }
            }
        }
    }
}
