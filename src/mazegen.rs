//! Crawler-based organic maze generation.
//!
//! A grid of solid wall is carved by crawlers starting in the centre.
//! Crawlers lose life as they move, refuse to open a cell that already
//! touches two carved passages (which keeps corridors one tile wide and
//! loop-free), and occasionally spawn children that branch the maze.
//! Generation ends when every crawler is dead or the step cap is reached.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::LabyrinthError;
use crate::simulation::params::{
    GROUND_CHAR, MAZEGEN_SPAWN_CHANCE, MAZEGEN_STEP_CAP, WALL_CHAR,
};
use crate::simulation::tile::Position;

/// Life cost of carving into fresh wall.
const CARVE_COST: f64 = 0.15;
/// Life cost of stepping onto an already carved cell.
const REVISIT_COST: f64 = 1.0;
/// Moves a freshly spawned crawler waits before it may spawn children.
const SPAWN_REFRACTORY: u8 = 2;

/// A generated maze: the layout string plus a random passable start and
/// goal.
#[derive(Debug, Clone)]
pub struct GeneratedMaze {
    pub layout: String,
    pub start: Position,
    pub goal: Position,
}

impl GeneratedMaze {
    /// The text-file form consumed by the driver's labyrinth loader: the
    /// layout rows followed by `Starting Point:` and `Goal:` lines.
    #[must_use]
    pub fn to_file_string(&self) -> String {
        format!(
            "{}\nStarting Point: ({}, {})\nGoal: ({}, {})\n",
            self.layout, self.start.0, self.start.1, self.goal.0, self.goal.1
        )
    }
}

struct Carving {
    rows: i32,
    cols: i32,
    walls: Vec<bool>,
}

impl Carving {
    fn new(rows: i32, cols: i32) -> Self {
        Self {
            rows,
            cols,
            walls: vec![true; (rows * cols) as usize],
        }
    }

    fn in_interior(&self, pos: Position) -> bool {
        pos.0 > 0 && pos.0 < self.rows - 1 && pos.1 > 0 && pos.1 < self.cols - 1
    }

    fn is_wall(&self, pos: Position) -> bool {
        if pos.0 < 0 || pos.0 >= self.rows || pos.1 < 0 || pos.1 >= self.cols {
            return true;
        }
        self.walls[(pos.0 * self.cols + pos.1) as usize]
    }

    fn carve(&mut self, pos: Position) {
        if pos.0 >= 0 && pos.0 < self.rows && pos.1 >= 0 && pos.1 < self.cols {
            self.walls[(pos.0 * self.cols + pos.1) as usize] = false;
        }
    }

    /// Number of carved cardinal neighbours of `pos`.
    fn carved_neighbours(&self, pos: Position) -> usize {
        [(-1, 0), (1, 0), (0, -1), (0, 1)]
            .iter()
            .filter(|(di, dj)| !self.is_wall((pos.0 + di, pos.1 + dj)))
            .count()
    }

    fn layout(&self) -> String {
        let mut out = String::with_capacity((self.rows * (self.cols + 1)) as usize);
        for i in 0..self.rows {
            if i > 0 {
                out.push('\n');
            }
            for j in 0..self.cols {
                out.push(if self.is_wall((i, j)) { WALL_CHAR } else { GROUND_CHAR });
            }
        }
        out
    }

    fn carved_positions(&self) -> Vec<Position> {
        let mut positions = Vec::new();
        for i in 0..self.rows {
            for j in 0..self.cols {
                if !self.is_wall((i, j)) {
                    positions.push((i, j));
                }
            }
        }
        positions
    }
}

struct Crawler {
    pos: Position,
    life: f64,
    refractory: u8,
}

impl Crawler {
    fn new(pos: Position) -> Self {
        Self {
            pos,
            life: 1.0,
            refractory: SPAWN_REFRACTORY,
        }
    }

    /// One move: pick a random interior direction, carve or back off, and
    /// possibly spawn children at the cell just left.
    fn advance<R: Rng + ?Sized>(&mut self, carving: &mut Carving, rng: &mut R) -> Vec<Crawler> {
        let mut directions = [(-1, 0), (1, 0), (0, -1), (0, 1)];
        directions.shuffle(rng);

        let previous = self.pos;
        let mut children = Vec::new();
        for (di, dj) in directions {
            let candidate = (self.pos.0 + di, self.pos.1 + dj);
            if !carving.in_interior(candidate) {
                continue;
            }
            // Never open a cell already touching two passages.
            if carving.is_wall(candidate) && carving.carved_neighbours(candidate) >= 2 {
                continue;
            }
            let cost = if carving.is_wall(candidate) {
                CARVE_COST
            } else {
                REVISIT_COST
            };
            self.life -= cost;
            if self.life <= 0.0 {
                return children;
            }
            carving.carve(candidate);
            self.pos = candidate;
            if self.refractory > 0 {
                self.refractory -= 1;
            } else {
                let sample: f64 = rng.random();
                if sample > MAZEGEN_SPAWN_CHANCE.1 {
                    children.push(Crawler::new(previous));
                }
                if sample > MAZEGEN_SPAWN_CHANCE.0 {
                    children.push(Crawler::new(previous));
                }
            }
            return children;
        }
        // Nowhere left to go.
        self.life = 0.0;
        children
    }
}

/// Generates a maze of the given dimensions. Border cells always stay
/// walls; dimensions below 5x5 leave no room to carve.
pub fn generate<R: Rng + ?Sized>(
    rows: usize,
    cols: usize,
    rng: &mut R,
) -> Result<GeneratedMaze, LabyrinthError> {
    if rows < 5 || cols < 5 {
        return Err(LabyrinthError::malformed_layout(format!(
            "maze dimensions {rows}x{cols} are too small to carve"
        )));
    }
    let (rows, cols) = (rows as i32, cols as i32);
    let mut carving = Carving::new(rows, cols);
    let centre = (rows / 2, cols / 2);
    carving.carve(centre);

    let mut crawlers = vec![Crawler::new(centre)];
    let mut steps = 0;
    while steps < MAZEGEN_STEP_CAP && !crawlers.is_empty() {
        let mut next_generation = Vec::new();
        for mut crawler in crawlers {
            let children = crawler.advance(&mut carving, rng);
            next_generation.extend(children);
            if crawler.life > 0.0 {
                next_generation.push(crawler);
            }
        }
        crawlers = next_generation;
        // The population stays bounded even on large, mostly open grids.
        crawlers.truncate(512);
        steps += 1;
    }

    let mut carved = carving.carved_positions();
    if carved.len() < 2 {
        // Degenerate carving; open a minimal corridor so start and goal
        // exist.
        carving.carve(centre);
        carving.carve((centre.0, centre.1 + 1));
        carved = carving.carved_positions();
    }
    let start = carved[rng.random_range(0..carved.len())];
    let goal = loop {
        let candidate = carved[rng.random_range(0..carved.len())];
        if candidate != start || carved.len() == 1 {
            break candidate;
        }
    };

    Ok(GeneratedMaze {
        layout: carving.layout(),
        start,
        goal,
    })
}

/// Parses the maze text-file form back into a layout string and optional
/// start/goal markers.
pub fn parse_maze_file(
    text: &str,
) -> Result<(String, Option<Position>, Option<Position>), LabyrinthError> {
    let mut rows = Vec::new();
    let mut start = None;
    let mut goal = None;
    for line in text.lines() {
        if let Some(rest) = line.strip_prefix("Starting Point:") {
            start = Some(parse_position(rest)?);
        } else if let Some(rest) = line.strip_prefix("Goal:") {
            goal = Some(parse_position(rest)?);
        } else if !line.trim().is_empty() {
            rows.push(line);
        }
    }
    if rows.is_empty() {
        return Err(LabyrinthError::malformed_layout("no layout rows in file"));
    }
    Ok((rows.join("\n"), start, goal))
}

fn parse_position(text: &str) -> Result<Position, LabyrinthError> {
    let trimmed = text.trim().trim_start_matches('(').trim_end_matches(')');
    let mut parts = trimmed.split(',');
    let row = parts
        .next()
        .and_then(|p| p.trim().parse::<i32>().ok())
        .ok_or_else(|| LabyrinthError::malformed_layout(format!("bad position `{text}`")))?;
    let col = parts
        .next()
        .and_then(|p| p.trim().parse::<i32>().ok())
        .ok_or_else(|| LabyrinthError::malformed_layout(format!("bad position `{text}`")))?;
    Ok((row, col))
}
