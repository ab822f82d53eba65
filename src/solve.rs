use std::collections::{HashMap, VecDeque};

use thiserror::Error;

use crate::grid::{Grid, Pos};

/// Which leg of the start-key-goal route has no walkable path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SolveError {
    #[error("no path from start to key")]
    StartToKey,
    #[error("no path from key to goal")]
    KeyToGoal,
}

/// Breadth-first shortest path from `from` to `to`, both endpoints
/// included. Returns an empty vector when no route exists.
///
/// Neighbors are expanded in the grid's fixed scan order, so equally short
/// routes always resolve the same way.
pub fn solve(grid: &Grid, from: Pos, to: Pos) -> Vec<Pos> {
    let mut visited = vec![vec![false; grid.cols()]; grid.rows()];
    let mut prev: HashMap<Pos, Pos> = HashMap::new();
    let mut frontier = VecDeque::new();

    visited[from.row][from.col] = true;
    frontier.push_back(from);

    while let Some(pos) = frontier.pop_front() {
        if pos == to {
            let mut path = vec![pos];
            let mut cur = pos;
            while let Some(&back) = prev.get(&cur) {
                path.push(back);
                cur = back;
            }
            path.reverse();
            return path;
        }
        for next in grid.neighbors(pos) {
            if !visited[next.row][next.col] && !grid.cell(next).blocked {
                // Marked here, not at dequeue, so a cell is enqueued once.
                visited[next.row][next.col] = true;
                prev.insert(next, pos);
                frontier.push_back(next);
            }
        }
    }

    Vec::new()
}

/// Solve start to key, then key to goal, and join the legs with the
/// duplicate key position dropped at the seam.
pub fn auto_solve(grid: &Grid) -> Result<Vec<Pos>, SolveError> {
    let start_to_key = solve(grid, grid.start(), grid.key());
    if start_to_key.is_empty() {
        return Err(SolveError::StartToKey);
    }
    let key_to_goal = solve(grid, grid.key(), grid.goal());
    if key_to_goal.is_empty() {
        return Err(SolveError::KeyToGoal);
    }

    let mut route = start_to_key;
    route.pop();
    route.extend(key_to_goal);
    Ok(route)
}
