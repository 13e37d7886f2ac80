#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Stateless A* search over the maze occupancy grid.
//!
//! The search runs on an 8-connected grid. Axis moves cost `1.0` and diagonal
//! moves cost `√2`, and the Euclidean distance to the goal serves as the
//! heuristic, so returned paths are shortest in true distance rather than in
//! step count. Diagonal moves may cut past blocked corners as long as the
//! destination cell itself is free.

use std::{cmp::Ordering, collections::BinaryHeap, f32::consts::SQRT_2};

use tank_arena_core::{CellCoord, OccupancyGrid};

/// Neighbor offsets as `(column, row)` deltas: axis moves first, then diagonals.
const NEIGHBOR_OFFSETS: [(i64, i64); 8] = [
    (0, 1),
    (1, 0),
    (0, -1),
    (-1, 0),
    (1, 1),
    (-1, -1),
    (1, -1),
    (-1, 1),
];

/// Finds a shortest route from `start` to `goal`.
///
/// The returned cells exclude `start` and end with `goal`. An empty vector
/// means there is no route: the goal is blocked, disconnected, off the grid,
/// or identical to the start. Callers treat it as "hold position".
#[must_use]
pub fn find_path(grid: &OccupancyGrid, start: CellCoord, goal: CellCoord) -> Vec<CellCoord> {
    let (Some(start_index), Some(goal_index)) = (grid.index(start), grid.index(goal)) else {
        return Vec::new();
    };
    if start_index == goal_index || !grid.is_free(goal) {
        return Vec::new();
    }

    let mut search = Search::new(grid.len());
    search.cost[start_index] = 0.0;
    search.push(start_index, 0.0, start.euclidean_distance(goal));

    while let Some(node) = search.frontier.pop() {
        if node.cost > search.cost[node.index] {
            continue;
        }
        if node.index == goal_index {
            break;
        }
        let Some(current) = grid.cell_at_index(node.index) else {
            continue;
        };

        for (neighbor, step_cost) in neighbors(grid, current) {
            let Some(neighbor_index) = grid.index(neighbor) else {
                continue;
            };
            let tentative = node.cost + step_cost;
            if tentative >= search.cost[neighbor_index] {
                continue;
            }

            search.cost[neighbor_index] = tentative;
            search.came_from[neighbor_index] = Some(node.index);
            search.push(
                neighbor_index,
                tentative,
                tentative + neighbor.euclidean_distance(goal),
            );
        }
    }

    search.reconstruct(grid, start_index, goal_index)
}

/// Total Euclidean length of a path walked from `start`.
#[must_use]
pub fn path_length(start: CellCoord, path: &[CellCoord]) -> f32 {
    let mut previous = start;
    let mut total = 0.0;
    for &cell in path {
        total += previous.euclidean_distance(cell);
        previous = cell;
    }
    total
}

#[derive(Debug)]
struct Search {
    cost: Vec<f32>,
    came_from: Vec<Option<usize>>,
    frontier: BinaryHeap<Frontier>,
    sequence: u64,
}

impl Search {
    fn new(cell_count: usize) -> Self {
        Self {
            cost: vec![f32::INFINITY; cell_count],
            came_from: vec![None; cell_count],
            frontier: BinaryHeap::new(),
            sequence: 0,
        }
    }

    fn push(&mut self, index: usize, cost: f32, priority: f32) {
        self.frontier.push(Frontier {
            priority,
            sequence: self.sequence,
            cost,
            index,
        });
        self.sequence = self.sequence.wrapping_add(1);
    }

    fn reconstruct(
        &self,
        grid: &OccupancyGrid,
        start_index: usize,
        goal_index: usize,
    ) -> Vec<CellCoord> {
        let mut path = Vec::new();
        let mut node = goal_index;
        while node != start_index {
            // A chain longer than the grid can only come from a corrupt table.
            if path.len() > self.came_from.len() {
                return Vec::new();
            }
            let Some(cell) = grid.cell_at_index(node) else {
                return Vec::new();
            };
            path.push(cell);
            match self.came_from.get(node).copied().flatten() {
                Some(previous) => node = previous,
                None => return Vec::new(),
            }
        }
        path.reverse();
        path
    }
}

/// Frontier entry ordered so that [`BinaryHeap`] pops the lowest `g + h`
/// first, breaking ties by discovery order.
#[derive(Clone, Copy, Debug)]
struct Frontier {
    priority: f32,
    sequence: u64,
    cost: f32,
    index: usize,
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

fn neighbors(
    grid: &OccupancyGrid,
    cell: CellCoord,
) -> impl Iterator<Item = (CellCoord, f32)> + '_ {
    NEIGHBOR_OFFSETS
        .iter()
        .filter_map(move |&(column_delta, row_delta)| {
            let column = u32::try_from(i64::from(cell.column()) + column_delta).ok()?;
            let row = u32::try_from(i64::from(cell.row()) + row_delta).ok()?;
            let neighbor = CellCoord::new(column, row);
            if !grid.is_free(neighbor) {
                return None;
            }
            let step_cost = if column_delta != 0 && row_delta != 0 {
                SQRT_2
            } else {
                1.0
            };
            Some((neighbor, step_cost))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(columns: u32, rows: u32) -> OccupancyGrid {
        OccupancyGrid::open(columns, rows, 10.0).expect("open grid")
    }

    #[test]
    fn diagonal_route_uses_three_steps() {
        let grid = open(5, 5);
        let path = find_path(&grid, CellCoord::new(0, 0), CellCoord::new(3, 3));
        assert_eq!(
            path,
            vec![
                CellCoord::new(1, 1),
                CellCoord::new(2, 2),
                CellCoord::new(3, 3)
            ]
        );
    }

    #[test]
    fn adjacent_goal_is_a_single_step() {
        let grid = open(3, 3);
        let path = find_path(&grid, CellCoord::new(1, 1), CellCoord::new(2, 1));
        assert_eq!(path, vec![CellCoord::new(2, 1)]);
    }

    #[test]
    fn start_equal_to_goal_yields_empty_path() {
        let grid = open(3, 3);
        assert!(find_path(&grid, CellCoord::new(1, 1), CellCoord::new(1, 1)).is_empty());
    }

    #[test]
    fn off_grid_endpoints_yield_empty_path() {
        let grid = open(3, 3);
        assert!(find_path(&grid, CellCoord::new(0, 0), CellCoord::new(3, 0)).is_empty());
        assert!(find_path(&grid, CellCoord::new(7, 7), CellCoord::new(0, 0)).is_empty());
    }

    #[test]
    fn blocked_goal_yields_empty_path() {
        let grid = OccupancyGrid::from_ascii("...\n.#.\n...", 10.0).expect("layout");
        assert!(find_path(&grid, CellCoord::new(0, 0), CellCoord::new(1, 1)).is_empty());
    }

    #[test]
    fn frontier_pops_lowest_priority_then_oldest() {
        let mut search = Search::new(4);
        search.push(0, 0.0, 2.0);
        search.push(1, 0.0, 1.0);
        search.push(2, 0.0, 1.0);
        search.push(3, 0.0, 3.0);

        let order: Vec<usize> = std::iter::from_fn(|| search.frontier.pop())
            .map(|node| node.index)
            .collect();
        assert_eq!(order, vec![1, 2, 0, 3]);
    }

    #[test]
    fn broken_chain_is_reported_as_unreachable() {
        let grid = open(3, 1);
        let mut search = Search::new(grid.len());
        search.came_from[2] = Some(1);
        assert!(search.reconstruct(&grid, 0, 2).is_empty());

        search.came_from[1] = Some(0);
        assert_eq!(
            search.reconstruct(&grid, 0, 2),
            vec![CellCoord::new(1, 0), CellCoord::new(2, 0)]
        );
    }

    #[test]
    fn path_length_sums_step_lengths() {
        let path = [CellCoord::new(1, 1), CellCoord::new(2, 1)];
        assert!((path_length(CellCoord::new(0, 0), &path) - (SQRT_2 + 1.0)).abs() < 1e-6);
    }
}
