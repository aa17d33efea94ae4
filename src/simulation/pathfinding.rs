//! Shortest-path distance queries over the clamped adjacency graph.
//!
//! Hypothetical worlds are expressed as overlay maps of cloned tiles on
//! top of the base tile mapping; the base is never mutated.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::simulation::environment::GridEnvironment;
use crate::simulation::tile::{Position, Tile};

fn manhattan(a: Position, b: Position) -> u32 {
    a.0.abs_diff(b.0) + a.1.abs_diff(b.1)
}

fn lookup<'a>(
    base: &'a HashMap<Position, Tile>,
    overrides: &'a HashMap<Position, Tile>,
    pos: Position,
) -> Option<&'a Tile> {
    overrides.get(&pos).or_else(|| base.get(&pos))
}

/// Best-first search with Manhattan heuristic and unit edge cost. Returns
/// the predecessor map and the cost of the goal, if reached. Ties in
/// priority fall back to position order, which keeps expansion
/// deterministic.
fn astar(
    base: &HashMap<Position, Tile>,
    overrides: &HashMap<Position, Tile>,
    start: Position,
    goal: Position,
) -> (HashMap<Position, Option<Position>>, Option<u32>) {
    let mut came_from: HashMap<Position, Option<Position>> = HashMap::new();
    let mut cost_so_far: HashMap<Position, u32> = HashMap::new();
    came_from.insert(start, None);
    cost_so_far.insert(start, 0);
    let mut frontier: BinaryHeap<Reverse<(u32, Position)>> = BinaryHeap::new();
    frontier.push(Reverse((0, start)));

    while let Some(Reverse((_, current))) = frontier.pop() {
        if current == goal {
            break;
        }
        let Some(tile) = lookup(base, overrides, current) else {
            continue;
        };
        let current_cost = cost_so_far.get(&current).copied().unwrap_or(0);
        for &next in &tile.neighbours {
            if !lookup(base, overrides, next).is_some_and(Tile::is_passable) {
                continue;
            }
            let new_cost = current_cost + 1;
            if cost_so_far.get(&next).is_none_or(|&cost| new_cost < cost) {
                cost_so_far.insert(next, new_cost);
                frontier.push(Reverse((new_cost + manhattan(goal, next), next)));
                came_from.insert(next, Some(current));
            }
        }
    }

    let distance = cost_so_far.get(&goal).copied();
    (came_from, distance)
}

impl GridEnvironment {
    /// The shortest-path distance from `start` to `goal` in cardinal
    /// steps, or `None` when either endpoint is impassable or no path
    /// exists. Absence of a path is an expected outcome, not an error.
    ///
    /// Side effect: the predecessor map of the search is cached for the
    /// `(start, goal)` pair (see [`GridEnvironment::cached_path`]). The
    /// cache is never invalidated automatically; do not rely on it after
    /// tiles were altered.
    pub fn distance(&mut self, start: Position, goal: Position) -> Option<u32> {
        let overrides = HashMap::new();
        self.distance_with(start, goal, &overrides)
    }

    /// [`GridEnvironment::distance`] over a hypothetical world: tiles in
    /// `overrides` shadow the real ones, everything else falls back to the
    /// base mapping.
    pub fn distance_with(
        &mut self,
        start: Position,
        goal: Position,
        overrides: &HashMap<Position, Tile>,
    ) -> Option<u32> {
        if !lookup(&self.tiles, overrides, start).is_some_and(Tile::is_passable)
            || !lookup(&self.tiles, overrides, goal).is_some_and(Tile::is_passable)
        {
            return None;
        }
        let (came_from, distance) = astar(&self.tiles, overrides, start, goal);
        self.path_cache.insert((start, goal), came_from);
        distance
    }

    /// Distance under the free-space assumption: every tile not in
    /// `visibles` is treated as passable. The real world is not touched;
    /// unseen tiles are cloned with passability forced open into a
    /// transient overlay.
    pub fn distance_partially_visible(
        &mut self,
        start: Position,
        goal: Position,
        visibles: &HashSet<Position>,
    ) -> Option<u32> {
        let mut overrides = HashMap::new();
        for (pos, tile) in &self.tiles {
            if !visibles.contains(pos) {
                overrides.insert(*pos, tile.clone_with(Some(true)));
            }
        }
        self.distance_with(start, goal, &overrides)
    }

    /// Reconstructs the path cached by the last distance query for this
    /// `(start, goal)` pair, start first. `None` when no complete path was
    /// cached.
    #[must_use]
    pub fn cached_path(&self, start: Position, goal: Position) -> Option<Vec<Position>> {
        let came_from = self.path_cache.get(&(start, goal))?;
        if !came_from.contains_key(&goal) {
            return None;
        }
        let mut path = vec![goal];
        let mut current = goal;
        while let Some(Some(previous)) = came_from.get(&current) {
            current = *previous;
            path.push(current);
            if path.len() > came_from.len() {
                // A stale cache cannot loop us forever.
                return None;
            }
        }
        path.reverse();
        (path.first() == Some(&start)).then_some(path)
    }
}
