//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;

use labyrinth_rust::simulation::environment::GridEnvironment;
use labyrinth_rust::simulation::tile::{Position, TargetDescriptor};

/// The 15x22 reference maze the documented distances and visible sets were
/// derived from.
pub const REFERENCE_MAZE: &str = "\
######################\n\
#gggggggggggggggggggg#\n\
#g#g###g#g#g#g###g####\n\
#g#ggg#ggg#g#ggg#gggg#\n\
#g###g#####g###g#g##g#\n\
#g#ggg#ggg#g#gggggggg#\n\
#g#g###g###g#g###g####\n\
#ggggggg#ggg#gg##gggg#\n\
#g#######g#g#g##gg##g#\n\
#ggggggg###g###gg###g#\n\
#g#####gg##g##gg##g#g#\n\
#ggggg##gg#g#gg##gggg#\n\
#g###g###g#g#g#####gg#\n\
#ggggggggggggggg#gggg#\n\
######################";

/// A small simply connected maze with a single winding corridor.
pub const SMALL_MAZE: &str = "\
#######\n\
#ggg#g#\n\
#g#g#g#\n\
#g#ggg#\n\
#######";

pub fn reference_env() -> GridEnvironment {
    GridEnvironment::new(REFERENCE_MAZE).expect("reference maze parses")
}

pub fn small_env() -> GridEnvironment {
    GridEnvironment::new(SMALL_MAZE).expect("small maze parses")
}

pub fn single_target(pos: Position) -> HashMap<Position, TargetDescriptor> {
    let mut targets = HashMap::new();
    targets.insert(
        pos,
        TargetDescriptor {
            symbol: 'R',
            color: "red".to_string(),
        },
    );
    targets
}
