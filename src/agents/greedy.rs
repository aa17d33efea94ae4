//! Greedy heuristic navigation.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::agents::Strategy;
use crate::error::LabyrinthError;
use crate::simulation::environment::GridEnvironment;
use crate::simulation::params::{BACKSTEP_PENALTY, GREEDY_AMBITION};
use crate::simulation::tile::{Action, Direction, Position, TileSnapshot};

/// Scores candidate neighbour tiles by visit count, a back-step penalty
/// and normalised axis distance to the target. Steps immediately onto a
/// sufficiently improving tile; otherwise scans all four directions and
/// takes the best recorded option.
#[derive(Debug, Clone)]
pub struct Greedy {
    visited: HashMap<Position, u32>,
    last_pos: Option<Position>,
    options: Vec<(f64, Position)>,
    turns: u8,
}

impl Greedy {
    #[must_use]
    pub fn new() -> Self {
        Self {
            visited: HashMap::new(),
            last_pos: None,
            options: Vec::new(),
            turns: 0,
        }
    }

    fn tile_score(&self, env: &GridEnvironment, target: Position, pos: Position) -> f64 {
        let mut visited_score = f64::from(self.visited.get(&pos).copied().unwrap_or(0));
        if Some(pos) == self.last_pos {
            visited_score += BACKSTEP_PENALTY;
        }
        let distance_score = f64::from((pos.0 - target.0).abs()) / f64::from(env.size.0)
            + f64::from((pos.1 - target.1).abs()) / f64::from(env.size.1);
        visited_score + distance_score
    }

    fn commit(&mut self, from: Position, destination: Position) {
        self.last_pos = Some(from);
        *self.visited.entry(destination).or_insert(0) += 1;
        self.options.clear();
        self.turns = 0;
    }
}

impl Default for Greedy {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for Greedy {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn decide(&mut self, env: &GridEnvironment) -> Result<Action, LabyrinthError> {
        let target = env.target().ok_or(LabyrinthError::MissingTarget)?;
        let agent = env.agent_pos.ok_or_else(|| LabyrinthError::UninitializedAgent {
            operation: "decide the next action".to_string(),
        })?;
        if self.visited.is_empty() {
            self.visited.insert(agent, 1);
        }

        if self.turns < 4 {
            let cone = env.view_cone_relative()?;
            if cone.get(&(-1, 0)).is_some_and(TileSnapshot::is_passable) {
                let (di, dj) = env.facing.delta();
                let front = (agent.0 + di, agent.1 + dj);
                let front_score = self.tile_score(env, target, front);
                if front_score < self.tile_score(env, target, agent) - GREEDY_AMBITION {
                    self.commit(agent, front);
                    return Ok(Action::Step(env.facing));
                }
                self.options.push((front_score, front));
            }
            self.turns += 1;
            return Ok(Action::TurnRight);
        }

        // All four directions scanned without an immediate improvement.
        self.turns = 0;
        let best = self
            .options
            .iter()
            .copied()
            .min_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal))
            .map(|(_, pos)| pos);
        self.options.clear();
        match best {
            Some(best) => match Direction::from_delta((best.0 - agent.0, best.1 - agent.1)) {
                Some(direction) => {
                    self.commit(agent, best);
                    Ok(Action::Step(direction))
                }
                None => Ok(Action::TurnRight),
            },
            // Nothing passable was recorded; keep scanning.
            None => Ok(Action::TurnRight),
        }
    }
}
