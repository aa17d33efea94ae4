//! Tiles, directions and the action vocabulary of the grid world.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::LabyrinthError;
use crate::simulation::params::{
    AGENT_CHAR, DEFAULT_COLOR, GROUND_CHAR, GROUND_COLOR, TARGET_CHAR, TARGET_COLOR,
    TARGET_MARK_CHAR, WALL_CHAR, WALL_COLOR,
};

/// A `(row, col)` grid coordinate, counted from the top-left corner down
/// and to the right.
pub type Position = (i32, i32);

/// The four cardinal facing directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    West,
    East,
}

impl Direction {
    /// The unit step vector of this direction in `(row, col)` space.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (-1, 0),
            Self::South => (1, 0),
            Self::West => (0, -1),
            Self::East => (0, 1),
        }
    }

    /// Inverse of [`Direction::delta`]; `None` for non-unit vectors.
    #[must_use]
    pub fn from_delta(delta: (i32, i32)) -> Option<Self> {
        match delta {
            (-1, 0) => Some(Self::North),
            (1, 0) => Some(Self::South),
            (0, -1) => Some(Self::West),
            (0, 1) => Some(Self::East),
            _ => None,
        }
    }

    /// Facing after a 90 degree counter-clockwise (compass) rotation.
    #[must_use]
    pub const fn left(self) -> Self {
        match self {
            Self::North => Self::West,
            Self::West => Self::South,
            Self::South => Self::East,
            Self::East => Self::North,
        }
    }

    /// Facing after a 90 degree clockwise (compass) rotation.
    #[must_use]
    pub const fn right(self) -> Self {
        match self {
            Self::North => Self::East,
            Self::East => Self::South,
            Self::South => Self::West,
            Self::West => Self::North,
        }
    }

    /// The wire token of this direction.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::North => "NORTH",
            Self::South => "SOUTH",
            Self::West => "WEST",
            Self::East => "EAST",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "NORTH" => Some(Self::North),
            "SOUTH" => Some(Self::South),
            "WEST" => Some(Self::West),
            "EAST" => Some(Self::East),
            _ => None,
        }
    }
}

/// One of the six actions an agent can perform: a cardinal step or a
/// quarter turn. Stepping never changes facing, turning never changes
/// position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Step(Direction),
    TurnLeft,
    TurnRight,
}

impl Action {
    /// The full action space, in wire order.
    pub const ALL: [Action; 6] = [
        Action::Step(Direction::North),
        Action::Step(Direction::South),
        Action::Step(Direction::West),
        Action::Step(Direction::East),
        Action::TurnLeft,
        Action::TurnRight,
    ];

    /// The wire token of this action. Tokens round-trip exactly through
    /// [`Action::from_name`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Step(dir) => dir.name(),
            Self::TurnLeft => "TURN LEFT",
            Self::TurnRight => "TURN RIGHT",
        }
    }

    /// Parses a wire token; anything outside the closed vocabulary is an
    /// [`LabyrinthError::InvalidAction`].
    pub fn from_name(name: &str) -> Result<Self, LabyrinthError> {
        match name {
            "TURN LEFT" => Ok(Self::TurnLeft),
            "TURN RIGHT" => Ok(Self::TurnRight),
            other => Direction::from_name(other)
                .map(Self::Step)
                .ok_or_else(|| LabyrinthError::invalid_action(name)),
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Display metadata of a designated target tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetDescriptor {
    pub symbol: char,
    pub color: String,
}

/// A single cell of the grid world.
///
/// Passability of a parsed tile is fixed at creation; the only sanctioned
/// override is [`Tile::clone_with`], which materializes hypothetical tiles
/// for partial-visibility pathfinding without touching the original.
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub pos: Position,
    /// The layout character this tile was parsed from.
    source: char,
    /// Tri-state passability: `None` is only used by the invisible sentinel.
    passable: Option<bool>,
    char_: char,
    color: String,
    /// Positions of the up-to-four cardinal neighbours, clamped per axis to
    /// the world bounds. Boundary tiles may therefore list themselves.
    pub neighbours: HashSet<Position>,
    /// Set by observation assembly when the target identity is currently
    /// discernible; flips the effective symbol/color to the target ones.
    pub target_visible: bool,
    pub is_target: bool,
    pub target_symbol: Option<char>,
    pub target_color: Option<String>,
}

fn char_passable(element: char) -> bool {
    match element {
        c if c == WALL_CHAR => false,
        c if c == GROUND_CHAR || c == AGENT_CHAR || c == TARGET_MARK_CHAR => true,
        // Unrecognized characters default to passable.
        _ => true,
    }
}

fn char_color(element: char) -> &'static str {
    match element {
        c if c == WALL_CHAR => WALL_COLOR,
        c if c == GROUND_CHAR => GROUND_COLOR,
        _ => DEFAULT_COLOR,
    }
}

impl Tile {
    /// Creates a tile from its layout character and position.
    #[must_use]
    pub fn new(element: char, row: i32, col: i32) -> Self {
        Self {
            pos: (row, col),
            source: element,
            passable: Some(char_passable(element)),
            char_: element,
            color: char_color(element).to_string(),
            neighbours: HashSet::new(),
            target_visible: false,
            is_target: false,
            target_symbol: None,
            target_color: None,
        }
    }

    /// An impassable sentinel, used when out-of-bounds positions are
    /// queried.
    #[must_use]
    pub fn wall() -> Self {
        let mut tile = Self::new(WALL_CHAR, -1, -1);
        tile.passable = Some(false);
        tile
    }

    /// A sentinel for tiles outside the current field of view; nothing is
    /// known about it, so its passability is `None`.
    #[must_use]
    pub fn invisible() -> Self {
        let mut tile = Self::new(' ', -1, -1);
        tile.passable = None;
        tile.char_ = ' ';
        tile.color = DEFAULT_COLOR.to_string();
        tile
    }

    /// Tri-state passability; `None` means unknown.
    #[must_use]
    pub const fn passability(&self) -> Option<bool> {
        self.passable
    }

    /// Whether an agent can stand on this tile. Unknown counts as blocked.
    #[must_use]
    pub fn is_passable(&self) -> bool {
        self.passable == Some(true)
    }

    /// The effective display character: the target symbol while this tile
    /// is a currently-discernible target, the base character otherwise.
    #[must_use]
    pub fn char(&self) -> char {
        if self.target_visible && self.is_target {
            if let Some(symbol) = self.target_symbol {
                return symbol;
            }
        }
        self.char_
    }

    /// The effective display color, analogous to [`Tile::char`].
    #[must_use]
    pub fn color(&self) -> &str {
        if self.target_visible && self.is_target {
            if let Some(color) = &self.target_color {
                return color;
            }
        }
        &self.color
    }

    /// The layout character this tile was created from.
    #[must_use]
    pub const fn source_char(&self) -> char {
        self.source
    }

    /// The base display character, ignoring the target-visible flag.
    /// Designated targets report the generic target symbol here.
    #[must_use]
    pub const fn base_char(&self) -> char {
        self.char_
    }

    /// Designates this tile as a potential target. The base display flips
    /// to the generic target symbol/color; the true identity only shows
    /// while `target_visible` is set.
    pub fn set_as_target(&mut self, descriptor: &TargetDescriptor) {
        self.is_target = true;
        self.target_symbol = Some(descriptor.symbol);
        self.target_color = Some(descriptor.color.clone());
        self.char_ = TARGET_CHAR;
        self.color = TARGET_COLOR.to_string();
    }

    /// Reverts [`Tile::set_as_target`], restoring the parsed display.
    pub fn unset_as_target(&mut self) {
        self.is_target = false;
        self.target_symbol = None;
        self.target_color = None;
        self.char_ = self.source;
        self.color = char_color(self.source).to_string();
    }

    /// Deep value copy, optionally overriding passability. This is the only
    /// way a tile's passability diverges from its layout character and is
    /// used exclusively to build hypothetical worlds for pathfinding.
    #[must_use]
    pub fn clone_with(&self, passable: Option<bool>) -> Self {
        let mut tile = self.clone();
        if let Some(passable) = passable {
            tile.passable = Some(passable);
        }
        tile
    }

    /// A serializable summary of the tile's current, effective state.
    #[must_use]
    pub fn snapshot(&self) -> TileSnapshot {
        TileSnapshot {
            pos: Some(self.pos),
            passable: self.passable,
            symbol: Some(self.char()),
            color: self.color().to_string(),
        }
    }
}

/// Serializable tile summary as delivered in observations. Tiles outside
/// the field of view are reported as [`TileSnapshot::unknown`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSnapshot {
    pub pos: Option<Position>,
    pub passable: Option<bool>,
    pub symbol: Option<char>,
    pub color: String,
}

impl TileSnapshot {
    /// The sentinel summary for a tile nothing is known about.
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            pos: None,
            passable: None,
            symbol: None,
            color: DEFAULT_COLOR.to_string(),
        }
    }

    /// Whether this summary reports a tile an agent could stand on.
    #[must_use]
    pub fn is_passable(&self) -> bool {
        self.passable == Some(true)
    }
}
