//! Textual rendering of observation snapshots.

mod common;

use common::reference_env;
use labyrinth_rust::ui::observation_rows;

#[test]
fn test_full_observation_renders_every_row() {
    let mut env = reference_env();
    env.initialize_agent((5, 9), None);
    let observation = env.observation().unwrap();
    let rows = observation_rows(&observation, env.agent_pos);

    assert_eq!(rows.len(), 15);
    assert!(rows.iter().all(|r| r.chars().count() == 22));
    assert!(rows[0].chars().all(|c| c == '#'));
}

#[test]
fn test_agent_overlays_its_tile() {
    let mut env = reference_env();
    env.initialize_agent((5, 9), None);
    let observation = env.observation().unwrap();
    let rows = observation_rows(&observation, env.agent_pos);
    assert_eq!(rows[5].chars().nth(9), Some('A'));
}

#[test]
fn test_unknown_tiles_render_blank() {
    let mut env = reference_env();
    env.initialize_agent((5, 9), Some(3));
    let observation = env.observation().unwrap();
    let rows = observation_rows(&observation, env.agent_pos);
    // Far corner is outside the view radius.
    assert_eq!(rows[13].chars().nth(20), Some(' '));
    // The wall silhouette above the agent is known.
    assert_eq!(rows[4].chars().nth(9), Some('#'));
}
