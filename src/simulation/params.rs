//! Simulation constants and tuning parameters.

/// Character marking an impassable wall in layout strings.
pub const WALL_CHAR: char = '#';
/// Character marking open ground in layout strings.
pub const GROUND_CHAR: char = 'g';
/// Character marking the agent start tile in layout strings.
pub const AGENT_CHAR: char = 'a';
/// Character marking a potential target tile in layout strings.
pub const TARGET_MARK_CHAR: char = 't';

/// Base symbol shown for a designated target while its true identity is hidden.
pub const TARGET_CHAR: char = 'T';
/// Base color shown for a designated target while its true identity is hidden.
pub const TARGET_COLOR: &str = "green";

pub const WALL_COLOR: &str = "gray";
pub const GROUND_COLOR: &str = "white";
pub const DEFAULT_COLOR: &str = "black";

/// Score cost of a step action (attempted steps are costed too).
pub const STEP_COST: f64 = 1.0;
/// Score cost of a turn, calibrated at 0.6 of a step.
pub const TURN_COST: f64 = 0.6;

/// Slope ranges narrower than this (scaled by the column index) carry no
/// visible span and terminate the column sweep.
pub const SLOPE_EPSILON: f64 = 0.001;

/// Steps an episode may take before it is called off as a failure.
pub const DEFAULT_STEP_BUDGET: usize = 1000;

/// Greedy strategy: minimum score improvement to step without scanning.
pub const GREEDY_AMBITION: f64 = 1.0;
/// Greedy strategy: score penalty for stepping back onto the previous tile.
pub const BACKSTEP_PENALTY: f64 = 4.0;

/// Maze generation: crawler simulation step cap.
pub const MAZEGEN_STEP_CAP: usize = 5000;
/// Maze generation: population samples above these thresholds spawn one or
/// two child crawlers.
pub const MAZEGEN_SPAWN_CHANCE: (f64, f64) = (0.5, 0.95);
