use super::{SearchCore, SearchEngine, SearchError, SearchProgress};
use crate::grid::{CellType, Coord, Grid};

mod line {
    pub const POP: usize = 3;
    pub const CURRENT: usize = 4;
    pub const MARK: usize = 6;
    pub const CHECK_NEIGHBOR: usize = 7;
    pub const FOUND: usize = 8;
    pub const FOR_NEIGHBOR: usize = 10;
    pub const PUSH: usize = 11;
    pub const NOT_FOUND: usize = 15;
}

/// Depth-first search with an explicit stack.
///
/// Cells are marked when popped, so a cell can sit on the stack more than once;
/// every pop counts as a visit. The most recent push wins the parent pointer.
#[derive(Default, Debug, Clone)]
pub struct Dfs {
    stack: Vec<usize>,
    core: SearchCore,
}

impl Dfs {
    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }
}

impl SearchEngine for Dfs {
    fn reset(&mut self) {
        self.stack.clear();
        self.core.reset();
    }

    fn begin(&mut self, grid: &Grid) -> Result<(), SearchError> {
        self.stack.clear();
        let start = self.core.begin(grid)?;
        self.stack.push(start);
        Ok(())
    }

    fn step(&mut self, grid: &mut Grid, diagonal: bool) {
        if !self.core.can_step(grid) {
            return;
        }

        let Some(current) = self.stack.pop() else {
            self.core.no_path(line::NOT_FOUND);
            return;
        };
        self.core.progress.current_line = line::POP;
        self.core.progress.nodes_visited += 1;
        self.core.current = Some(current);
        self.core.progress.current_line = line::CURRENT;

        if grid.kind_at(current) == CellType::Empty {
            self.core.progress.current_line = line::MARK;
            grid.set_kind_at(current, CellType::Visited);
        }

        let neighbors = self.core.take_neighbors(grid, current, diagonal);
        for &neighbor in &neighbors {
            self.core.progress.current_line = line::CHECK_NEIGHBOR;
            if Some(neighbor) == grid.end() {
                self.core.parents[neighbor] = Some(current);
                self.core.found(grid, neighbor, line::FOUND);
                break;
            }
        }
        if !self.core.progress.complete {
            self.core.progress.current_line = line::FOR_NEIGHBOR;
            for &neighbor in &neighbors {
                if grid.kind_at(neighbor) == CellType::Empty {
                    self.core.parents[neighbor] = Some(current);
                    self.stack.push(neighbor);
                    self.core.progress.current_line = line::PUSH;
                }
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
