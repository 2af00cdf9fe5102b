use std::{cmp::Reverse, collections::BinaryHeap};

use super::{SearchCore, SearchEngine, SearchError, SearchProgress};
use crate::grid::{CellType, Coord, Grid};

mod line {
    pub const POP: usize = 3;
    pub const CHECK_END: usize = 4;
    pub const FOUND: usize = 5;
    pub const CHECK_STALE: usize = 6;
    pub const MARK: usize = 7;
    pub const FOR_NEIGHBOR: usize = 8;
    pub const RELAX: usize = 9;
    pub const PUSH: usize = 10;
    pub const NOT_FOUND: usize = 14;
}

/// Min-priority queue of cell indices. Entries with equal priority come out in
/// insertion order.
#[derive(Default, Debug, Clone)]
pub(super) struct Frontier {
    // Using Reverse to turn the max-heap into a min-heap
    heap: BinaryHeap<Reverse<(u64, u64, usize)>>,
    seq: u64,
}

impl Frontier {
    pub fn clear(&mut self) {
        self.heap.clear();
        self.seq = 0;
    }

    pub fn push(&mut self, priority: u64, idx: usize) {
        self.heap.push(Reverse((priority, self.seq, idx)));
        self.seq += 1;
    }

    pub fn pop(&mut self) -> Option<usize> {
        self.heap.pop().map(|Reverse((_, _, idx))| idx)
    }
}

/// Uniform-cost search over cell costs.
///
/// A cell is final the first time it is popped, at which point it is marked
/// `Visited`; later pops of the same cell are stale and skipped.
#[derive(Default, Debug, Clone)]
pub struct Dijkstra {
    frontier: Frontier,
    /// Best known cost from the start, `u64::MAX` when unreached.
    costs: Vec<u64>,
    core: SearchCore,
}

impl Dijkstra {
    pub fn cost_to(&self, idx: usize) -> Option<u64> {
        self.costs.get(idx).copied().filter(|&cost| cost != u64::MAX)
    }
}

impl SearchEngine for Dijkstra {
    fn reset(&mut self) {
        self.frontier.clear();
        self.costs.clear();
        self.core.reset();
    }

    fn begin(&mut self, grid: &Grid) -> Result<(), SearchError> {
        self.frontier.clear();
        self.costs.clear();
        let start = self.core.begin(grid)?;
        self.costs.resize(grid.len(), u64::MAX);
        self.costs[start] = 0;
        self.frontier.push(0, start);
        Ok(())
    }

    fn step(&mut self, grid: &mut Grid, diagonal: bool) {
        if !self.core.can_step(grid) {
            return;
        }

        let Some(current) = self.frontier.pop() else {
            self.core.no_path(line::NOT_FOUND);
            return;
        };
        self.core.progress.current_line = line::POP;
        self.core.progress.nodes_visited += 1;
        self.core.current = Some(current);

        self.core.progress.current_line = line::CHECK_END;
        if Some(current) == grid.end() {
            self.core.found(grid, current, line::FOUND);
            return;
        }

        self.core.progress.current_line = line::CHECK_STALE;
        if grid.kind_at(current) == CellType::Visited {
            return;
        }
        if grid.kind_at(current) != CellType::Start {
            self.core.progress.current_line = line::MARK;
            grid.set_kind_at(current, CellType::Visited);
        }

        let base = self.costs[current];
        let neighbors = self.core.take_neighbors(grid, current, diagonal);
        for &neighbor in &neighbors {
            self.core.progress.current_line = line::FOR_NEIGHBOR;
            if grid.kind_at(neighbor) == CellType::Wall {
                continue;
            }
            self.core.progress.current_line = line::RELAX;
            let cost = base.saturating_add(grid.cost_at(neighbor) as u64);
            if cost < self.costs[neighbor] {
                self.costs[neighbor] = cost;
                self.core.parents[neighbor] = Some(current);
                self.frontier.push(cost, neighbor);
                self.core.progress.current_line = line::PUSH;
            }
        }
        self.core.give_back_neighbors(neighbors);
    }

    fn progress(&self) -> &SearchProgress {
        &self.core.progress
    }

    fn current_path(&self, grid: &Grid) -> Vec<Coord> {
        self.core.current_path(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solvers::{SearchState, run_to_completion};

    #[test]
    fn test_frontier_breaks_ties_in_insertion_order() {
        let mut frontier = Frontier::default();
        frontier.push(3, 10);
        frontier.push(1, 20);
        frontier.push(3, 30);
        frontier.push(1, 40);
        let order = std::iter::from_fn(|| frontier.pop()).collect::<Vec<_>>();
        assert_eq!(order, vec![20, 40, 10, 30]);
    }

    #[test]
    fn test_goes_around_weights() {
        let mut grid = Grid::new(3, 3, None);
        grid.set_cell_type((1, 0), CellType::Start);
        grid.set_cell_type((1, 2), CellType::End);
        grid.set_cell_type((1, 1), CellType::Weight);
        let mut dijkstra = Dijkstra::default();
        dijkstra.begin(&grid).unwrap();
        run_to_completion(&mut dijkstra, &mut grid, false, 100).unwrap();
        assert_eq!(dijkstra.progress().state(), SearchState::Found);
        // Straight through would cost 5 + 1
        assert_eq!(dijkstra.progress().path_cost, 4);
        assert_eq!(grid[(1, 1)].kind, CellType::Weight);
        assert_eq!(grid.count(CellType::Path), 3);
    }

    #[test]
    fn test_crosses_weight_when_cheaper() {
        let mut grid = Grid::new(1, 3, None);
        grid.set_cell_type((0, 0), CellType::Start);
        grid.set_cell_type((0, 2), CellType::End);
        grid.set_cell_type((0, 1), CellType::Weight);
        let mut dijkstra = Dijkstra::default();
        dijkstra.begin(&grid).unwrap();
        run_to_completion(&mut dijkstra, &mut grid, false, 100).unwrap();
        assert_eq!(dijkstra.progress().path_cost, 6);
        assert_eq!(dijkstra.cost_to(grid.index_of((0, 2))), Some(6));
        // The weight keeps its cost under the path overlay
        assert_eq!(grid[(0, 1)].kind, CellType::Path);
        grid.clear_path();
        assert_eq!(grid[(0, 1)].kind, CellType::Weight);
    }

    #[test]
    fn test_walls_are_never_entered() {
        let mut grid = Grid::new(2, 2, None);
        grid.set_cell_type((0, 0), CellType::Start);
        grid.set_cell_type((1, 1), CellType::End);
        grid.set_cell_type((0, 1), CellType::Wall);
        grid.set_cell_type((1, 0), CellType::Wall);
        let mut dijkstra = Dijkstra::default();
        dijkstra.begin(&grid).unwrap();
        run_to_completion(&mut dijkstra, &mut grid, false, 100).unwrap();
        assert_eq!(dijkstra.progress().state(), SearchState::NoPath);
        assert_eq!(dijkstra.cost_to(grid.index_of((0, 1))), None);
        assert_eq!(grid.count(CellType::Wall), 2);
    }
}
