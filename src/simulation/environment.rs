//! The grid world: layout parsing, adjacency, actions and episode state.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Utc;
use serde_json::json;
use tracing::{debug, info};

use crate::error::LabyrinthError;
use crate::simulation::params::{STEP_COST, TURN_COST};
use crate::simulation::tile::{
    Action, Direction, Position, TargetDescriptor, Tile, TileSnapshot,
};
use crate::telemetry::{LogSink, MemorySampler};

/// Parallel per-action series accumulated while an episode is running.
///
/// All five vectors grow in lockstep, one entry per performed action.
#[derive(Debug, Clone, Default)]
pub struct EpisodeHistory {
    /// Agent position after each action.
    pub positions: Vec<Position>,
    /// Wall-clock seconds elapsed since the previous action (or since the
    /// episode start for the first action).
    pub step_times: Vec<f64>,
    /// Resident-set samples of this process, in bytes.
    pub memory_samples: Vec<u64>,
    /// Cumulative path length after each action.
    pub path_lengths: Vec<u32>,
    /// Cumulative score after each action.
    pub scores: Vec<f64>,
}

impl EpisodeHistory {
    /// Number of recorded actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[derive(Debug)]
struct EpisodeRecorder {
    active: bool,
    last_action: Instant,
    sampler: MemorySampler,
    history: EpisodeHistory,
}

impl EpisodeRecorder {
    fn new() -> Self {
        Self {
            active: true,
            last_action: Instant::now(),
            sampler: MemorySampler::new(),
            history: EpisodeHistory::default(),
        }
    }
}

#[derive(Debug, Clone)]
struct LogTarget {
    path: PathBuf,
    env_name: String,
    agent_type: String,
}

/// A 2D grid labyrinth with a single agent and designated target tiles.
///
/// The world is parsed once from a layout string; an external driver then
/// alternates observation queries, strategy decisions and
/// [`GridEnvironment::perform_action`] until the agent reaches a target.
#[derive(Debug)]
pub struct GridEnvironment {
    /// Tile storage keyed by position. Keys are unique by construction.
    pub tiles: HashMap<Position, Tile>,
    /// World size as `(rows, cols)`.
    pub size: (i32, i32),
    /// Current agent position; `None` until an agent is placed.
    pub agent_pos: Option<Position>,
    /// Current facing, always one of the four cardinal directions.
    pub facing: Direction,
    /// Tiles the agent can see around itself; `None` means unlimited.
    pub view_radius: Option<i32>,
    /// Radius in which target identities are discernible; `None` means
    /// targets are always discernible.
    pub target_radius: Option<i32>,
    /// Positions currently designated as targets.
    pub targets: Vec<Position>,
    /// Successful steps taken since the last reset.
    pub path_length: u32,
    /// Accumulated action cost since the last reset.
    pub step_score: f64,

    initial_agent_pos: Option<Position>,
    initial_facing: Direction,
    env_string: String,
    wall: Tile,
    recorder: Option<EpisodeRecorder>,
    log: Option<LogTarget>,
    /// Predecessor maps cached per `(start, goal)` pair. Never invalidated
    /// automatically; stale after tiles are altered.
    pub(crate) path_cache: HashMap<(Position, Position), HashMap<Position, Option<Position>>>,
}

impl GridEnvironment {
    /// Parses a labyrinth from its layout string.
    ///
    /// Rows are separated by `\n`, cells are single characters. World size
    /// is derived from the string; nothing needs to be declared up front.
    pub fn new(layout: &str) -> Result<Self, LabyrinthError> {
        let layout = layout.trim_end_matches('\n');
        if layout.trim().is_empty() {
            return Err(LabyrinthError::malformed_layout("empty layout string"));
        }

        let mut tiles: HashMap<Position, Tile> = HashMap::new();
        let mut max_row = 0i32;
        let mut max_col = 0i32;
        for (i, row) in layout.split('\n').enumerate() {
            for (j, element) in row.chars().enumerate() {
                let (i, j) = (i as i32, j as i32);
                tiles.insert((i, j), Tile::new(element, i, j));
                max_row = max_row.max(i);
                max_col = max_col.max(j);
            }
        }

        // Cardinal adjacency with each axis clamped independently to the
        // world bounds: boundary tiles keep four neighbour entries, some of
        // which coincide with other boundary tiles or themselves.
        let positions: Vec<Position> = tiles.keys().copied().collect();
        for pos in positions {
            let mut neighbours = HashSet::new();
            for (di, dj) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
                neighbours.insert((
                    (pos.0 + di).clamp(0, max_row),
                    (pos.1 + dj).clamp(0, max_col),
                ));
            }
            if let Some(tile) = tiles.get_mut(&pos) {
                tile.neighbours = neighbours;
            }
        }

        let size = (max_row + 1, max_col + 1);
        debug!(rows = size.0, cols = size.1, "parsed labyrinth layout");

        Ok(Self {
            tiles,
            size,
            agent_pos: None,
            facing: Direction::North,
            view_radius: None,
            target_radius: None,
            targets: Vec::new(),
            path_length: 0,
            step_score: 0.0,
            initial_agent_pos: None,
            initial_facing: Direction::North,
            env_string: layout.to_string(),
            wall: Tile::wall(),
            recorder: None,
            log: None,
            path_cache: HashMap::new(),
        })
    }

    /// The raw layout string this world was parsed from.
    #[must_use]
    pub fn env_string(&self) -> &str {
        &self.env_string
    }

    /// Regenerates the layout from the tile mapping. Reproduces the parsed
    /// string exactly, except that designated targets show the generic
    /// target symbol.
    #[must_use]
    pub fn layout_string(&self) -> String {
        let mut out = String::with_capacity((self.size.0 * (self.size.1 + 1)) as usize);
        for i in 0..self.size.0 {
            if i > 0 {
                out.push('\n');
            }
            for j in 0..self.size.1 {
                if let Some(tile) = self.tiles.get(&(i, j)) {
                    out.push(tile.base_char());
                }
            }
        }
        out
    }

    /// Tile lookup; `None` for positions outside the parsed world.
    #[must_use]
    pub fn tile(&self, pos: Position) -> Option<&Tile> {
        self.tiles.get(&pos)
    }

    /// Tile lookup that reports out-of-bounds positions as solid wall.
    #[must_use]
    pub fn tile_or_wall(&self, pos: Position) -> &Tile {
        self.tiles.get(&pos).unwrap_or(&self.wall)
    }

    /// The full action space accepted by [`GridEnvironment::perform_action`].
    #[must_use]
    pub const fn action_space(&self) -> [Action; 6] {
        Action::ALL
    }

    /// The goal position, by convention the first designated target.
    #[must_use]
    pub fn target(&self) -> Option<Position> {
        self.targets.first().copied()
    }

    /// Whether the agent currently stands on the goal tile.
    #[must_use]
    pub fn goal_reached(&self) -> bool {
        self.agent_pos.is_some() && self.agent_pos == self.target()
    }

    /// Places the agent. A no-op if an agent has already been placed, so
    /// the original placement is never silently overwritten.
    pub fn initialize_agent(&mut self, pos: Position, view_radius: Option<i32>) {
        if self.agent_pos.is_some() {
            return;
        }
        debug_assert!(self.tiles.contains_key(&pos), "agent placed outside world");
        self.agent_pos = Some(pos);
        self.initial_agent_pos = Some(pos);
        self.view_radius = view_radius;
    }

    /// Sets the agent's facing. This also becomes the facing restored by
    /// [`GridEnvironment::reset`].
    pub fn set_facing(&mut self, facing: Direction) {
        self.facing = facing;
        self.initial_facing = facing;
    }

    /// Designates target tiles, clearing any previous designation. The
    /// first entry (in sorted position order) is the goal.
    pub fn initialize_targets(
        &mut self,
        targets: &HashMap<Position, TargetDescriptor>,
        target_radius: Option<i32>,
    ) {
        for pos in &self.targets {
            if let Some(tile) = self.tiles.get_mut(pos) {
                tile.unset_as_target();
            }
        }
        for (pos, descriptor) in targets {
            if let Some(tile) = self.tiles.get_mut(pos) {
                tile.set_as_target(descriptor);
            }
        }
        self.targets = targets.keys().copied().collect();
        self.targets.sort_unstable();
        self.target_radius = target_radius;
    }

    /// Applies one action, updating position or facing, the score and the
    /// per-action metrics history.
    ///
    /// A step onto an impassable (or out-of-world) tile leaves the position
    /// unchanged but is still costed as an attempted step; the path length
    /// only advances on successful steps.
    pub fn perform_action(&mut self, action: Action) -> Result<Position, LabyrinthError> {
        let Some(pos) = self.agent_pos else {
            return Err(LabyrinthError::UninitializedAgent {
                operation: format!("perform action {}", action.name()),
            });
        };

        if let Some(log) = &self.log {
            LogSink::global().log(
                &log.path,
                Some(Utc::now()),
                &format!("FUNCTION-{}", action.name()),
            );
        }

        let mut current = pos;
        match action {
            Action::TurnLeft => {
                self.facing = self.facing.left();
                self.step_score += TURN_COST;
            }
            Action::TurnRight => {
                self.facing = self.facing.right();
                self.step_score += TURN_COST;
            }
            Action::Step(direction) => {
                let (di, dj) = direction.delta();
                let next = (pos.0 + di, pos.1 + dj);
                if self.tile_or_wall(next).is_passable() {
                    current = next;
                    self.path_length += 1;
                }
                // Attempted steps cost a full step even when blocked.
                self.step_score += STEP_COST;
            }
        }
        self.agent_pos = Some(current);
        self.record_step(current);
        Ok(current)
    }

    fn record_step(&mut self, pos: Position) {
        let (path_length, step_score) = (self.path_length, self.step_score);
        if let Some(recorder) = self.recorder.as_mut().filter(|r| r.active) {
            let now = Instant::now();
            let elapsed = now.duration_since(recorder.last_action).as_secs_f64();
            recorder.last_action = now;
            let memory = recorder.sampler.sample();
            recorder.history.positions.push(pos);
            recorder.history.step_times.push(elapsed);
            recorder.history.memory_samples.push(memory);
            recorder.history.path_lengths.push(path_length);
            recorder.history.scores.push(step_score);
        }
    }

    /// Configures episode recording. The header is written by
    /// [`GridEnvironment::start_episode`], the action stream by
    /// [`GridEnvironment::perform_action`] and the trailer by
    /// [`GridEnvironment::finish_episode`].
    pub fn set_logging(&mut self, path: &Path, env_name: &str, agent_type: &str) {
        self.log = Some(LogTarget {
            path: path.to_path_buf(),
            env_name: env_name.to_string(),
            agent_type: agent_type.to_string(),
        });
    }

    /// Starts an episode: resets the timing baseline, begins a fresh
    /// metrics history and, when logging is configured, emits the record
    /// header.
    pub fn start_episode(&mut self) {
        self.recorder = Some(EpisodeRecorder::new());
        if let Some(log) = self.log.clone() {
            self.write_record_header(&log);
        }
        info!(
            agent = ?self.agent_pos,
            facing = self.facing.name(),
            "episode started"
        );
    }

    /// Finishes an episode: stops recording and, when logging is
    /// configured, emits the trailer with the accumulated series. The
    /// history stays readable until the next reset or start.
    pub fn finish_episode(&mut self) {
        let Some(recorder) = self.recorder.as_mut() else {
            return;
        };
        recorder.active = false;
        let history = recorder.history.clone();
        if let Some(log) = &self.log {
            let sink = LogSink::global();
            sink.log(&log.path, Some(Utc::now()), "Finished");
            sink.log(
                &log.path,
                None,
                &format!("Positions: {}", json!(history.positions)),
            );
            sink.log(
                &log.path,
                None,
                &format!("StepTimes: {}", json!(history.step_times)),
            );
            sink.log(
                &log.path,
                None,
                &format!("MemorySamples: {}", json!(history.memory_samples)),
            );
            sink.log(
                &log.path,
                None,
                &format!("PathLengths: {}", json!(history.path_lengths)),
            );
            sink.log(&log.path, None, &format!("Scores: {}", json!(history.scores)));
        }
        info!(
            steps = history.len(),
            path_length = self.path_length,
            score = self.step_score,
            "episode finished"
        );
    }

    /// The metrics history of the current (or just finished) episode.
    #[must_use]
    pub fn episode_history(&self) -> Option<&EpisodeHistory> {
        self.recorder.as_ref().map(|r| &r.history)
    }

    /// Restores the agent to its initial pose and clears all accumulated
    /// metrics, so the same parsed world can run a fresh episode.
    pub fn reset(&mut self) {
        self.agent_pos = self.initial_agent_pos;
        self.facing = self.initial_facing;
        self.path_length = 0;
        self.step_score = 0.0;
        self.recorder = None;
    }

    fn write_record_header(&self, log: &LogTarget) {
        let always_visibles: Vec<Position> = if self.target_radius.is_some() {
            Vec::new()
        } else {
            self.targets.clone()
        };
        let targets: Vec<serde_json::Value> = self
            .targets
            .iter()
            .filter_map(|pos| self.tiles.get(pos).map(|tile| (pos, tile)))
            .map(|(pos, tile)| {
                json!({
                    "pos": pos,
                    "symbol": tile.target_symbol,
                    "color": tile.target_color,
                })
            })
            .collect();

        let header = format!(
            "GridEnvironment Log:\n\
             EnvString:\n{}\n\
             AlwaysVisibles: {}\n\
             ViewRadius: {}\n\
             TargetRadius: {}\n\
             Targets: {}\n\
             Goal: {}\n\
             StartPosition: {}\n\
             Facing: {}\n\
             Name: {}\n\
             AgentType: {}\n",
            self.env_string,
            json!(always_visibles),
            json!(self.view_radius),
            json!(self.target_radius),
            json!(targets),
            json!(self.target()),
            json!(self.initial_agent_pos),
            self.facing.name(),
            log.env_name,
            log.agent_type,
        );
        LogSink::global().log(&log.path, None, &header);
    }

    /// A serializable snapshot of the world as the agent currently sees it:
    /// one summary per world coordinate, with tiles outside the field of
    /// view replaced by the unknown sentinel when a view radius is active.
    ///
    /// Target identities are resolved against `target_radius` before
    /// snapshotting (the "glass maze" rule: walls never hide a target,
    /// only distance does).
    pub fn observation(&mut self) -> Result<Vec<Vec<TileSnapshot>>, LabyrinthError> {
        let targets = self.targets.clone();
        for pos in targets {
            let discernible = match self.target_radius {
                None => true,
                Some(radius) => self.is_visible(pos, Some(radius)),
            };
            if let Some(tile) = self.tiles.get_mut(&pos) {
                tile.target_visible = discernible;
            }
        }

        let visibles = match self.view_radius {
            None => None,
            Some(_) => Some(self.visible_positions()?),
        };

        let mut rows = Vec::with_capacity(self.size.0 as usize);
        for i in 0..self.size.0 {
            let mut row = Vec::with_capacity(self.size.1 as usize);
            for j in 0..self.size.1 {
                let seen = visibles.as_ref().is_none_or(|v| v.contains(&(i, j)));
                let snapshot = if seen {
                    self.tiles
                        .get(&(i, j))
                        .map_or_else(TileSnapshot::unknown, Tile::snapshot)
                } else {
                    TileSnapshot::unknown()
                };
                row.push(snapshot);
            }
            rows.push(row);
        }
        Ok(rows)
    }
}
