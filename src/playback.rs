//! Parsing and replay of recorded episodes.
//!
//! A recording is the textual file produced by the environment's logging
//! hooks: a fixed-order header, a timestamped action stream and a trailer
//! of per-step series. Sections out of order or missing abort the parse;
//! no partial recording is ever returned.

use std::collections::HashMap;
use std::path::Path;
use std::thread;
use std::time::Duration;

use chrono::NaiveDateTime;
use serde::Deserialize;
use tracing::debug;

use crate::error::LabyrinthError;
use crate::simulation::environment::{EpisodeHistory, GridEnvironment};
use crate::simulation::params::{TARGET_CHAR, TARGET_COLOR};
use crate::simulation::tile::{Action, Direction, Position, TargetDescriptor};
use crate::telemetry::TIMESTAMP_FORMAT;

/// One recorded action with the wall-clock time it was performed at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedAction {
    pub at: NaiveDateTime,
    pub action: Action,
}

/// A fully parsed episode recording.
#[derive(Debug, Clone)]
pub struct Recording {
    pub env_string: String,
    pub always_visibles: Vec<Position>,
    pub view_radius: Option<i32>,
    pub target_radius: Option<i32>,
    pub targets: HashMap<Position, TargetDescriptor>,
    pub goal: Option<Position>,
    pub start_position: Position,
    pub facing: Direction,
    pub name: String,
    pub agent_type: String,
    pub actions: Vec<TimedAction>,
    /// The per-step series, present when the episode finished cleanly.
    pub trailer: Option<EpisodeHistory>,
}

#[derive(Deserialize)]
struct TargetEntry {
    pos: Position,
    symbol: Option<char>,
    color: Option<String>,
}

struct Lines<'a> {
    lines: Vec<&'a str>,
    index: usize,
}

impl<'a> Lines<'a> {
    fn next(&mut self) -> Result<&'a str, LabyrinthError> {
        let line = self.lines.get(self.index).copied().ok_or_else(|| {
            LabyrinthError::malformed_recording("unexpected end of recording")
        })?;
        self.index += 1;
        Ok(line)
    }

    fn peek(&self) -> Option<&'a str> {
        self.lines.get(self.index).copied()
    }

    /// Consumes the next line, requiring the given section label.
    fn section(&mut self, label: &str) -> Result<&'a str, LabyrinthError> {
        let line = self.next()?;
        line.strip_prefix(label).map(str::trim).ok_or_else(|| {
            LabyrinthError::malformed_recording(format!(
                "expected section `{label}`, found `{line}`"
            ))
        })
    }
}

fn parse_json<T: for<'de> Deserialize<'de>>(
    label: &str,
    literal: &str,
) -> Result<T, LabyrinthError> {
    serde_json::from_str(literal).map_err(|err| {
        LabyrinthError::malformed_recording(format!("unparseable `{label}` literal: {err}"))
    })
}

impl Recording {
    /// Reads and parses a recording file.
    pub fn load(path: &Path) -> Result<Self, LabyrinthError> {
        let text = std::fs::read_to_string(path)?;
        let recording = Self::parse(&text)?;
        debug!(path = %path.display(), actions = recording.actions.len(), "loaded recording");
        Ok(recording)
    }

    /// Parses a recording from its textual form.
    pub fn parse(text: &str) -> Result<Self, LabyrinthError> {
        let mut lines = Lines {
            lines: text.lines().collect(),
            index: 0,
        };

        let first = lines.next()?;
        if first.trim() != "GridEnvironment Log:" {
            return Err(LabyrinthError::malformed_recording(format!(
                "expected `GridEnvironment Log:` preamble, found `{first}`"
            )));
        }
        lines.section("EnvString:")?;

        let mut layout_rows = Vec::new();
        loop {
            let line = lines.next()?;
            if line.starts_with("AlwaysVisibles:") {
                lines.index -= 1;
                break;
            }
            layout_rows.push(line);
        }
        if layout_rows.is_empty() {
            return Err(LabyrinthError::malformed_recording("empty EnvString section"));
        }
        let env_string = layout_rows.join("\n");

        let always_visibles: Vec<Position> =
            parse_json("AlwaysVisibles", lines.section("AlwaysVisibles:")?)?;
        let view_radius: Option<i32> = parse_json("ViewRadius", lines.section("ViewRadius:")?)?;
        let target_radius: Option<i32> =
            parse_json("TargetRadius", lines.section("TargetRadius:")?)?;
        let target_entries: Vec<TargetEntry> = parse_json("Targets", lines.section("Targets:")?)?;
        let goal: Option<Position> = parse_json("Goal", lines.section("Goal:")?)?;
        let start_position: Position =
            parse_json("StartPosition", lines.section("StartPosition:")?)?;
        let facing_name = lines.section("Facing:")?;
        let facing = Direction::from_name(facing_name).ok_or_else(|| {
            LabyrinthError::malformed_recording(format!("unknown facing `{facing_name}`"))
        })?;
        let name = lines.section("Name:")?.to_string();
        let agent_type = lines.section("AgentType:")?.to_string();

        let separator = lines.next()?;
        if !separator.trim().is_empty() {
            return Err(LabyrinthError::malformed_recording(format!(
                "expected blank separator after header, found `{separator}`"
            )));
        }

        let mut targets = HashMap::new();
        for entry in target_entries {
            targets.insert(
                entry.pos,
                TargetDescriptor {
                    symbol: entry.symbol.unwrap_or(TARGET_CHAR),
                    color: entry.color.unwrap_or_else(|| TARGET_COLOR.to_string()),
                },
            );
        }

        let (actions, finished) = parse_action_stream(&mut lines)?;
        let trailer = if finished { Some(parse_trailer(&mut lines)?) } else { None };

        Ok(Self {
            env_string,
            always_visibles,
            view_radius,
            target_radius,
            targets,
            goal,
            start_position,
            facing,
            name,
            agent_type,
            actions,
            trailer,
        })
    }

    /// Reconstructs the environment this episode ran in: parsed layout,
    /// recorded agent pose, radii and targets.
    pub fn build_environment(&self) -> Result<GridEnvironment, LabyrinthError> {
        let mut env = GridEnvironment::new(&self.env_string)?;
        env.initialize_agent(self.start_position, self.view_radius);
        env.set_facing(self.facing);
        env.initialize_targets(&self.targets, self.target_radius);
        Ok(env)
    }
}

fn parse_timed_line(line: &str) -> Result<(NaiveDateTime, &str), LabyrinthError> {
    let split = line.find(": ").ok_or_else(|| {
        LabyrinthError::malformed_recording(format!("untimestamped stream line `{line}`"))
    })?;
    let at = NaiveDateTime::parse_from_str(&line[..split], TIMESTAMP_FORMAT).map_err(|err| {
        LabyrinthError::malformed_recording(format!("bad timestamp in `{line}`: {err}"))
    })?;
    Ok((at, &line[split + 2..]))
}

fn parse_action_stream(lines: &mut Lines<'_>) -> Result<(Vec<TimedAction>, bool), LabyrinthError> {
    let mut actions = Vec::new();
    while let Some(line) = lines.peek() {
        if line.trim().is_empty() {
            lines.index += 1;
            continue;
        }
        lines.index += 1;
        let (at, message) = parse_timed_line(line)?;
        if message.trim() == "Finished" {
            return Ok((actions, true));
        }
        let token = message.strip_prefix("FUNCTION-").ok_or_else(|| {
            LabyrinthError::malformed_recording(format!("unexpected stream line `{line}`"))
        })?;
        let action = Action::from_name(token.trim())?;
        actions.push(TimedAction { at, action });
    }
    Ok((actions, false))
}

fn parse_trailer(lines: &mut Lines<'_>) -> Result<EpisodeHistory, LabyrinthError> {
    Ok(EpisodeHistory {
        positions: parse_json("Positions", lines.section("Positions:")?)?,
        step_times: parse_json("StepTimes", lines.section("StepTimes:")?)?,
        memory_samples: parse_json("MemorySamples", lines.section("MemorySamples:")?)?,
        path_lengths: parse_json("PathLengths", lines.section("PathLengths:")?)?,
        scores: parse_json("Scores", lines.section("Scores:")?)?,
    })
}

/// Re-applies the actions of a recording to an environment, one at a time
/// or timed against the recorded inter-action deltas.
#[derive(Debug, Clone)]
pub struct PlaybackAgent {
    actions: Vec<TimedAction>,
    cursor: usize,
}

impl PlaybackAgent {
    #[must_use]
    pub fn new(recording: &Recording) -> Self {
        Self {
            actions: recording.actions.clone(),
            cursor: 0,
        }
    }

    /// Number of actions not yet replayed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.actions.len() - self.cursor
    }

    /// Applies the next recorded action. `Ok(None)` once the recording is
    /// exhausted.
    pub fn step(
        &mut self,
        env: &mut GridEnvironment,
    ) -> Result<Option<Position>, LabyrinthError> {
        let Some(timed) = self.actions.get(self.cursor) else {
            return Ok(None);
        };
        self.cursor += 1;
        env.perform_action(timed.action).map(Some)
    }

    /// Replays the remaining actions in (modified) real time, sleeping the
    /// recorded delta between consecutive actions divided by `speedup`,
    /// and invoking `callback` with each new position.
    pub fn replay<F: FnMut(Position)>(
        &mut self,
        env: &mut GridEnvironment,
        speedup: f64,
        mut callback: F,
    ) -> Result<(), LabyrinthError> {
        let speedup = if speedup > 0.0 { speedup } else { 1.0 };
        while self.cursor < self.actions.len() {
            if self.cursor > 0 {
                let previous = self.actions[self.cursor - 1].at;
                let current = self.actions[self.cursor].at;
                let delta = (current - previous)
                    .num_nanoseconds()
                    .map_or(0.0, |n| n as f64 / 1e9)
                    .max(0.0);
                thread::sleep(Duration::from_secs_f64(delta / speedup));
            }
            match self.step(env)? {
                Some(pos) => callback(pos),
                None => break,
            }
        }
        Ok(())
    }
}
