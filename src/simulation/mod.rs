//! The grid environment engine: tiles, world state, visibility and
//! shortest-path queries.

pub mod environment;
pub mod params;
pub mod tile;

mod pathfinding;
mod visibility;

pub use environment::{EpisodeHistory, GridEnvironment};
pub use tile::{Action, Direction, Position, TargetDescriptor, Tile, TileSnapshot};
