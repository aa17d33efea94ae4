//! Episode recording and playback round trips.

mod common;

use common::{single_target, small_env, SMALL_MAZE};
use labyrinth_rust::error::LabyrinthError;
use labyrinth_rust::playback::{PlaybackAgent, Recording};
use labyrinth_rust::simulation::tile::{Action, Direction};
use labyrinth_rust::telemetry::LogSink;

fn record_small_episode(path: &std::path::Path) -> Vec<Action> {
    let mut env = small_env();
    env.initialize_agent((1, 1), Some(3));
    env.set_facing(Direction::East);
    env.initialize_targets(&single_target((1, 5)), Some(2));
    env.set_logging(path, "small", "scripted");

    let actions = vec![
        Action::Step(Direction::East),
        Action::Step(Direction::East),
        Action::TurnRight,
        Action::Step(Direction::South),
        Action::Step(Direction::North),
        Action::TurnLeft,
    ];
    env.start_episode();
    for action in &actions {
        env.perform_action(*action).unwrap();
    }
    env.finish_episode();
    LogSink::global().flush();
    actions
}

#[test]
fn test_recording_round_trips_through_the_log_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("episode.txt");
    let actions = record_small_episode(&path);

    let recording = Recording::load(&path).unwrap();
    assert_eq!(recording.env_string, SMALL_MAZE);
    assert_eq!(recording.start_position, (1, 1));
    assert_eq!(recording.facing, Direction::East);
    assert_eq!(recording.view_radius, Some(3));
    assert_eq!(recording.target_radius, Some(2));
    assert_eq!(recording.goal, Some((1, 5)));
    assert!(recording.always_visibles.is_empty());

    let descriptor = recording.targets.get(&(1, 5)).unwrap();
    assert_eq!(descriptor.symbol, 'R');
    assert_eq!(descriptor.color, "red");

    let recorded: Vec<Action> = recording.actions.iter().map(|t| t.action).collect();
    assert_eq!(recorded, actions);

    let trailer = recording.trailer.as_ref().unwrap();
    assert_eq!(trailer.len(), actions.len());
    assert_eq!(trailer.positions.last(), Some(&(1, 3)));
    assert_eq!(trailer.path_lengths.last(), Some(&4));
}

#[test]
fn test_replaying_reproduces_the_original_run() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("episode.txt");
    record_small_episode(&path);

    let recording = Recording::load(&path).unwrap();
    let mut env = recording.build_environment().unwrap();
    assert_eq!(env.agent_pos, Some((1, 1)));
    assert_eq!(env.facing, Direction::East);

    let mut agent = PlaybackAgent::new(&recording);
    assert_eq!(agent.remaining(), 6);
    while agent.step(&mut env).unwrap().is_some() {}
    assert_eq!(agent.remaining(), 0);

    assert_eq!(env.agent_pos, Some((1, 3)));
    assert_eq!(env.path_length, 4);
    let trailer = recording.trailer.as_ref().unwrap();
    assert!((env.step_score - trailer.scores.last().unwrap()).abs() < 1e-9);
}

#[test]
fn test_timed_replay_invokes_the_callback() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("episode.txt");
    record_small_episode(&path);

    let recording = Recording::load(&path).unwrap();
    let mut env = recording.build_environment().unwrap();
    let mut agent = PlaybackAgent::new(&recording);
    let mut visited = Vec::new();
    agent
        .replay(&mut env, 1000.0, |pos| visited.push(pos))
        .unwrap();
    assert_eq!(visited.len(), recording.actions.len());
    assert_eq!(visited.last(), Some(&(1, 3)));
}

#[test]
fn test_garbage_input_is_rejected() {
    let err = Recording::parse("not a recording at all").unwrap_err();
    assert!(matches!(err, LabyrinthError::MalformedRecording { .. }));
}

#[test]
fn test_reordered_sections_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("episode.txt");
    record_small_episode(&path);
    let text = std::fs::read_to_string(&path).unwrap();

    // Swap the ViewRadius and TargetRadius lines.
    let reordered: Vec<&str> = {
        let mut lines: Vec<&str> = text.lines().collect();
        let view = lines.iter().position(|l| l.starts_with("ViewRadius:")).unwrap();
        lines.swap(view, view + 1);
        lines
    };
    let err = Recording::parse(&reordered.join("\n")).unwrap_err();
    assert!(matches!(err, LabyrinthError::MalformedRecording { .. }));
}

#[test]
fn test_unknown_action_token_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("episode.txt");
    record_small_episode(&path);
    let text = std::fs::read_to_string(&path).unwrap();

    let tampered = text.replace("FUNCTION-TURN RIGHT", "FUNCTION-JUMP");
    let err = Recording::parse(&tampered).unwrap_err();
    assert!(matches!(err, LabyrinthError::InvalidAction { .. }));
}

#[test]
fn test_unfinished_recording_has_no_trailer() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("episode.txt");

    let mut env = small_env();
    env.initialize_agent((1, 1), None);
    env.initialize_targets(&single_target((1, 5)), None);
    env.set_logging(&path, "small", "scripted");
    env.start_episode();
    env.perform_action(Action::Step(Direction::East)).unwrap();
    LogSink::global().flush();

    let recording = Recording::load(&path).unwrap();
    assert_eq!(recording.actions.len(), 1);
    assert!(recording.trailer.is_none());
}
