use std::collections::VecDeque;

use super::{SearchCore, SearchEngine, SearchError, SearchProgress};
use crate::grid::{CellType, Coord, Grid};

mod line {
    pub const DEQUEUE: usize = 4;
    pub const CURRENT: usize = 5;
    pub const CHECK_END: usize = 6;
    pub const FOUND: usize = 7;
    pub const FOR_NEIGHBOR: usize = 9;
    pub const CHECK_NEIGHBOR: usize = 10;
    pub const MARK: usize = 11;
    pub const ENQUEUE: usize = 12;
    pub const NOT_FOUND: usize = 16;
}

/// Breadth-first search.
///
/// Neighbors are marked `Visited` as they are enqueued, and the end cell is
/// recognized both when dequeued and when first seen as a neighbor.
#[derive(Default, Debug, Clone)]
pub struct Bfs {
    queue: VecDeque<usize>,
    core: SearchCore,
}

impl SearchEngine for Bfs {
    fn reset(&mut self) {
        self.queue.clear();
        self.core.reset();
    }

    fn begin(&mut self, grid: &Grid) -> Result<(), SearchError> {
        self.queue.clear();
        let start = self.core.begin(grid)?;
        self.queue.push_back(start);
        Ok(())
    }

    fn step(&mut self, grid: &mut Grid, diagonal: bool) {
        if !self.core.can_step(grid) {
            return;
        }

        let Some(current) = self.queue.pop_front() else {
            self.core.no_path(line::NOT_FOUND);
            return;
        };
        self.core.progress.current_line = line::DEQUEUE;
        self.core.progress.nodes_visited += 1;
        self.core.current = Some(current);
        self.core.progress.current_line = line::CURRENT;

        self.core.progress.current_line = line::CHECK_END;
        if Some(current) == grid.end() {
            self.core.found(grid, current, line::FOUND);
            return;
        }

        self.core.progress.current_line = line::FOR_NEIGHBOR;
        let neighbors = self.core.take_neighbors(grid, current, diagonal);
        for &neighbor in &neighbors {
            self.core.progress.current_line = line::CHECK_NEIGHBOR;
            if Some(neighbor) == grid.end() {
                self.core.parents[neighbor] = Some(current);
                self.core.found(grid, neighbor, line::FOUND);
                break;
            }

            if grid.kind_at(neighbor) == CellType::Empty {
                self.core.progress.current_line = line::MARK;
                grid.set_kind_at(neighbor, CellType::Visited);
                self.core.parents[neighbor] = Some(current);
                self.queue.push_back(neighbor);
                self.core.progress.current_line = line::ENQUEUE;
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

    fn open_grid() -> Grid {
        let mut grid = Grid::new(5, 5, None);
        grid.set_cell_type((0, 0), CellType::Start);
        grid.set_cell_type((0, 4), CellType::End);
        grid
    }

    #[test]
    fn test_straight_line() {
        let mut grid = open_grid();
        let mut bfs = Bfs::default();
        bfs.begin(&grid).unwrap();
        run_to_completion(&mut bfs, &mut grid, false, 1000).unwrap();
        assert_eq!(bfs.progress().state(), SearchState::Found);
        assert_eq!(bfs.progress().path_cost, 4);
        assert_eq!(
            bfs.current_path(&grid),
            vec![(0, 0), (0, 1), (0, 2), (0, 3), (0, 4)]
        );
        assert_eq!(grid.count(CellType::Path), 3);
    }

    #[test]
    fn test_end_seen_as_neighbor_short_circuits() {
        let mut grid = Grid::new(1, 2, None);
        grid.set_cell_type((0, 0), CellType::Start);
        grid.set_cell_type((0, 1), CellType::End);
        let mut bfs = Bfs::default();
        bfs.begin(&grid).unwrap();
        bfs.step(&mut grid, false);
        assert!(bfs.is_complete());
        assert_eq!(bfs.progress().nodes_visited, 1);
        assert_eq!(bfs.progress().path_cost, 1);
    }

    #[test]
    fn test_walled_off_end() {
        let mut grid = open_grid();
        for row in 0..5 {
            grid.set_cell_type((row, 2), CellType::Wall);
        }
        let mut bfs = Bfs::default();
        bfs.begin(&grid).unwrap();
        run_to_completion(&mut bfs, &mut grid, true, 1000).unwrap();
        assert_eq!(bfs.progress().state(), SearchState::NoPath);
        // Columns 0 and 1 are reachable, ten cells including the start
        assert_eq!(bfs.progress().nodes_visited, 10);
        assert_eq!(grid.count(CellType::Visited), 9);
    }

    #[test]
    fn test_step_after_completion_is_a_no_op() {
        let mut grid = open_grid();
        let mut bfs = Bfs::default();
        bfs.begin(&grid).unwrap();
        run_to_completion(&mut bfs, &mut grid, false, 1000).unwrap();
        let before = bfs.progress().clone();
        bfs.step(&mut grid, false);
        assert_eq!(bfs.progress(), &before);
    }
}
