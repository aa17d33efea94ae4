//! Navigation strategies.
//!
//! Strategies implement one narrow contract: given the environment, decide
//! the next action. The environment never calls into a strategy; the
//! [`run_episode`] driver applies decisions until the goal is reached or
//! the step budget runs out, both of which are normal terminal outcomes.

mod greedy;
mod random_walk;
mod wall_follower;

pub use greedy::Greedy;
pub use random_walk::RandomWalk;
pub use wall_follower::WallFollower;

use tracing::info;

use crate::error::LabyrinthError;
use crate::simulation::environment::GridEnvironment;
use crate::simulation::tile::Action;

/// A navigation strategy: decide the next action from the current
/// observation surface of the environment.
pub trait Strategy {
    /// Stable identifier, used for record headers and CLI selection.
    fn name(&self) -> &'static str;

    /// The next action to perform.
    fn decide(&mut self, env: &GridEnvironment) -> Result<Action, LabyrinthError>;
}

/// How an episode ended. Running out of budget is a failure outcome of the
/// run, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeOutcome {
    GoalReached { steps: usize },
    BudgetExhausted { steps: usize },
}

impl EpisodeOutcome {
    /// Actions performed before the episode ended.
    #[must_use]
    pub const fn steps(self) -> usize {
        match self {
            Self::GoalReached { steps } | Self::BudgetExhausted { steps } => steps,
        }
    }
}

/// Drives one full episode: start hook, decide/apply loop with a step
/// budget, finish hook.
pub fn run_episode(
    env: &mut GridEnvironment,
    strategy: &mut dyn Strategy,
    step_budget: usize,
) -> Result<EpisodeOutcome, LabyrinthError> {
    env.start_episode();
    let mut steps = 0;
    let outcome = loop {
        if env.goal_reached() {
            break EpisodeOutcome::GoalReached { steps };
        }
        if steps >= step_budget {
            break EpisodeOutcome::BudgetExhausted { steps };
        }
        let action = strategy.decide(env)?;
        env.perform_action(action)?;
        steps += 1;
    };
    env.finish_episode();
    info!(strategy = strategy.name(), outcome = ?outcome, "episode ended");
    Ok(outcome)
}
