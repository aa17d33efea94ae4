#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]

//! Grid labyrinth simulation with partial observability.
//!
//! The core is the grid environment engine: a tile world parsed from a
//! layout string, octant-based shadow-casting visibility, an action/state
//! machine with scoring and metrics, and A* reference distances. Layered
//! on top are navigation strategies, episode recording with playback, a
//! maze generator and a terminal driver.

pub mod agents;
pub mod error;
pub mod mazegen;
pub mod playback;
pub mod simulation;
pub mod telemetry;
pub mod ui;

pub use error::LabyrinthError;
pub use simulation::environment::GridEnvironment;
