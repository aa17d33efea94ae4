//! Navigation strategies driven through full episodes.

mod common;

use common::{single_target, small_env};
use labyrinth_rust::agents::{
    run_episode, EpisodeOutcome, Greedy, RandomWalk, Strategy, WallFollower,
};
use labyrinth_rust::error::LabyrinthError;
use labyrinth_rust::simulation::params::DEFAULT_STEP_BUDGET;
use labyrinth_rust::GridEnvironment;

#[test]
fn test_wall_follower_solves_the_small_maze() {
    let mut env = small_env();
    env.initialize_agent((1, 1), None);
    env.initialize_targets(&single_target((1, 5)), None);
    assert_eq!(env.distance((1, 1), (1, 5)), Some(8));

    let mut strategy = WallFollower::new();
    let outcome = run_episode(&mut env, &mut strategy, DEFAULT_STEP_BUDGET).unwrap();
    assert!(matches!(outcome, EpisodeOutcome::GoalReached { .. }));
    assert_eq!(env.agent_pos, Some((1, 5)));
    // The shortest path is a lower bound on what was actually walked.
    assert!(env.path_length >= 8);
}

#[test]
fn test_greedy_solves_the_small_maze() {
    let mut env = small_env();
    env.initialize_agent((1, 1), None);
    env.initialize_targets(&single_target((1, 5)), None);

    let mut strategy = Greedy::new();
    let outcome = run_episode(&mut env, &mut strategy, DEFAULT_STEP_BUDGET).unwrap();
    assert!(matches!(outcome, EpisodeOutcome::GoalReached { .. }));
    assert_eq!(env.agent_pos, Some((1, 5)));
}

#[test]
fn test_random_walk_solves_a_corridor() {
    let mut env = GridEnvironment::new("#####\n#ggg#\n#####").unwrap();
    env.initialize_agent((1, 1), None);
    env.initialize_targets(&single_target((1, 3)), None);

    let mut strategy = RandomWalk::new();
    let outcome = run_episode(&mut env, &mut strategy, 5000).unwrap();
    assert!(matches!(outcome, EpisodeOutcome::GoalReached { .. }));
}

#[test]
fn test_budget_exhaustion_is_a_normal_outcome() {
    // The goal chamber is sealed off; no strategy can reach it.
    let mut env = GridEnvironment::new("#####\n#g#g#\n#####").unwrap();
    env.initialize_agent((1, 1), None);
    env.initialize_targets(&single_target((1, 3)), None);

    let mut strategy = WallFollower::new();
    let outcome = run_episode(&mut env, &mut strategy, 50).unwrap();
    assert_eq!(outcome, EpisodeOutcome::BudgetExhausted { steps: 50 });
    assert_eq!(outcome.steps(), 50);
}

#[test]
fn test_episode_history_matches_performed_actions() {
    let mut env = small_env();
    env.initialize_agent((1, 1), None);
    env.initialize_targets(&single_target((1, 5)), None);

    let mut strategy = WallFollower::new();
    let outcome = run_episode(&mut env, &mut strategy, DEFAULT_STEP_BUDGET).unwrap();
    let history = env.episode_history().unwrap();
    assert_eq!(history.len(), outcome.steps());
    assert_eq!(history.positions.last(), Some(&(1, 5)));
}

#[test]
fn test_running_without_agent_fails() {
    let mut env = small_env();
    let mut strategy = WallFollower::new();
    let err = run_episode(&mut env, &mut strategy, 10).unwrap_err();
    assert!(matches!(err, LabyrinthError::UninitializedAgent { .. }));
}

#[test]
fn test_greedy_without_target_fails() {
    let mut env = small_env();
    env.initialize_agent((1, 1), None);
    let mut strategy = Greedy::new();
    let err = strategy.decide(&env).unwrap_err();
    assert!(matches!(err, LabyrinthError::MissingTarget));
}

#[test]
fn test_strategies_work_under_partial_observability() {
    let mut env = small_env();
    env.initialize_agent((1, 1), Some(2));
    env.initialize_targets(&single_target((1, 5)), None);

    let mut strategy = WallFollower::new();
    let outcome = run_episode(&mut env, &mut strategy, DEFAULT_STEP_BUDGET).unwrap();
    assert!(matches!(outcome, EpisodeOutcome::GoalReached { .. }));
}
