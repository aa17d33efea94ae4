//! Baseline strategy stepping uniformly at random.

use rand::Rng;

use crate::agents::Strategy;
use crate::error::LabyrinthError;
use crate::simulation::environment::GridEnvironment;
use crate::simulation::tile::{Action, Direction, TileSnapshot};

/// Rotates in place collecting the passable directions from the view cone,
/// then steps into one of them uniformly at random.
#[derive(Debug, Clone)]
pub struct RandomWalk {
    turns: u8,
    candidates: Vec<Direction>,
}

impl RandomWalk {
    #[must_use]
    pub fn new() -> Self {
        Self {
            turns: 0,
            candidates: Vec::new(),
        }
    }
}

impl Default for RandomWalk {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for RandomWalk {
    fn name(&self) -> &'static str {
        "random_walk"
    }

    fn decide(&mut self, env: &GridEnvironment) -> Result<Action, LabyrinthError> {
        if self.turns < 4 {
            let cone = env.view_cone_relative()?;
            if cone.get(&(-1, 0)).is_some_and(TileSnapshot::is_passable) {
                self.candidates.push(env.facing);
            }
            self.turns += 1;
            return Ok(Action::TurnRight);
        }

        self.turns = 0;
        if self.candidates.is_empty() {
            return Ok(Action::TurnRight);
        }
        let mut rng = rand::rng();
        let chosen = self.candidates[rng.random_range(0..self.candidates.len())];
        self.candidates.clear();
        Ok(Action::Step(chosen))
    }
}
