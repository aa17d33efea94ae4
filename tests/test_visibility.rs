//! Shadow-casting visibility: observations, view cones and target
//! discernibility.

mod common;

use std::collections::HashSet;

use common::{reference_env, single_target, REFERENCE_MAZE};
use labyrinth_rust::simulation::params::TARGET_COLOR;
use labyrinth_rust::simulation::tile::{Direction, Position};
use labyrinth_rust::GridEnvironment;

/// The documented visible set for an agent at (5, 9) with view radius 3 in
/// the reference maze.
const RADIUS3_VISIBLES: [Position; 15] = [
    (4, 6),
    (4, 7),
    (4, 8),
    (4, 9),
    (4, 10),
    (5, 6),
    (5, 7),
    (5, 8),
    (5, 9),
    (5, 10),
    (6, 6),
    (6, 7),
    (6, 8),
    (6, 9),
    (6, 10),
];

#[test]
fn test_unlimited_observation_reports_every_tile() {
    let rows: Vec<Vec<char>> = REFERENCE_MAZE.split('\n').map(|r| r.chars().collect()).collect();
    let mut env = reference_env();
    env.initialize_agent((5, 9), None);
    let observation = env.observation().unwrap();
    assert_eq!(observation.len(), 15);
    for (i, row) in observation.iter().enumerate() {
        assert_eq!(row.len(), 22);
        for (j, snapshot) in row.iter().enumerate() {
            assert_eq!(snapshot.pos, Some((i as i32, j as i32)));
            match rows[i][j] {
                '#' => assert_eq!(snapshot.passable, Some(false)),
                'g' => assert_eq!(snapshot.passable, Some(true)),
                _ => {}
            }
        }
    }
}

#[test]
fn test_radius3_observation_matches_reference_set() {
    let rows: Vec<Vec<char>> = REFERENCE_MAZE.split('\n').map(|r| r.chars().collect()).collect();
    let mut env = reference_env();
    env.initialize_agent((5, 9), Some(3));
    let observation = env.observation().unwrap();
    let visibles: HashSet<Position> = RADIUS3_VISIBLES.into_iter().collect();

    for (i, row) in observation.iter().enumerate() {
        for (j, snapshot) in row.iter().enumerate() {
            let pos = (i as i32, j as i32);
            if visibles.contains(&pos) {
                assert_eq!(snapshot.pos, Some(pos), "expected {pos:?} visible");
                match rows[i][j] {
                    '#' => assert_eq!(snapshot.passable, Some(false)),
                    'g' => assert_eq!(snapshot.passable, Some(true)),
                    _ => {}
                }
            } else {
                assert_eq!(snapshot.pos, None, "expected {pos:?} unknown");
                assert_eq!(snapshot.passable, None);
            }
        }
    }
}

#[test]
fn test_observation_with_radius_requires_agent() {
    let mut env = reference_env();
    env.view_radius = Some(3);
    assert!(env.observation().is_err());
}

#[test]
fn test_always_visible_targets_show_identity() {
    let mut env = reference_env();
    env.initialize_agent((10, 1), None);
    env.initialize_targets(&single_target((11, 5)), None);

    let observation = env.observation().unwrap();
    assert_eq!(observation[11][5].color, "red");

    env.agent_pos = Some((11, 2));
    let observation = env.observation().unwrap();
    assert_eq!(observation[11][5].color, "red");
}

#[test]
fn test_target_identity_hidden_outside_target_radius() {
    let mut env = reference_env();
    env.initialize_agent((10, 1), None);
    env.initialize_targets(&single_target((11, 5)), Some(3));

    // Out of range: only the generic target marker shows.
    let observation = env.observation().unwrap();
    assert_eq!(observation[11][5].color, TARGET_COLOR);

    env.agent_pos = Some((11, 2));
    let observation = env.observation().unwrap();
    assert_eq!(observation[11][5].color, "red");
}

#[test]
fn test_is_visible_within_reference_maze() {
    let mut env = reference_env();
    env.initialize_agent((1, 1), Some(3));
    assert!(env.is_visible((4, 1), Some(3)));
    assert!(env.is_visible((1, 4), Some(3)));
    assert!(!env.is_visible((5, 1), Some(3)));
}

#[test]
fn test_is_visible_with_custom_radius() {
    let mut env = reference_env();
    env.initialize_agent((1, 1), Some(3));
    assert!(env.is_visible((4, 1), Some(6)));
    assert!(!env.is_visible((1, 4), Some(1)));
    assert!(env.is_visible((5, 1), Some(4)));
}

#[test]
fn test_is_visible_without_agent_is_false() {
    let env = reference_env();
    assert!(!env.is_visible((1, 1), Some(3)));
}

fn open_world(radius: i32) -> GridEnvironment {
    let layout = vec!["ggggggggggg"; 11].join("\n");
    let mut env = GridEnvironment::new(&layout).unwrap();
    env.initialize_agent((5, 5), Some(radius));
    env
}

#[test]
fn test_facing_cones_cover_the_full_circle() {
    let mut env = open_world(3);
    let mut union: HashSet<Position> = HashSet::new();
    for facing in [
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ] {
        env.facing = facing;
        union.extend(env.view_cone().unwrap());
    }
    union.insert((5, 5));
    let omnidirectional = env.visible_positions().unwrap();
    assert_eq!(union, omnidirectional);
}

#[test]
fn test_opposite_cones_are_point_reflections() {
    let mut env = open_world(3);
    env.facing = Direction::North;
    let north: HashSet<Position> = env.view_cone().unwrap().into_iter().collect();
    env.facing = Direction::South;
    let south: HashSet<Position> = env.view_cone().unwrap().into_iter().collect();
    let reflected: HashSet<Position> =
        south.into_iter().map(|(r, c)| (10 - r, 10 - c)).collect();
    assert_eq!(north, reflected);
}

#[test]
fn test_walls_block_the_view_cone() {
    let mut env = reference_env();
    env.initialize_agent((5, 9), Some(3));
    // Facing north from (5, 9) the wall row at 4 is the silhouette edge;
    // nothing behind it is visible.
    let cone = env.view_cone().unwrap();
    assert!(cone.contains(&(4, 9)));
    assert!(!cone.iter().any(|&(r, _)| r < 4));
}

#[test]
fn test_relative_cone_keys_are_agent_frame() {
    let mut env = reference_env();
    env.initialize_agent((1, 1), Some(3));
    env.facing = Direction::South;
    let cone = env.view_cone_relative().unwrap();
    // Straight ahead of a south-facing agent at (1, 1) is (2, 1), open
    // ground.
    let ahead = cone.get(&(-1, 0)).expect("tile ahead is in the cone");
    assert_eq!(ahead.pos, Some((2, 1)));
    assert_eq!(ahead.passable, Some(true));
}

#[test]
fn test_view_cone_without_agent_fails() {
    let env = reference_env();
    assert!(env.view_cone().is_err());
}
