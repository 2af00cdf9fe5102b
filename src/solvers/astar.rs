use super::{SearchCore, SearchEngine, SearchError, SearchProgress, dijkstra::Frontier};
use crate::grid::{CellType, Coord, Grid};

mod line {
    pub const POP: usize = 2;
    pub const CURRENT: usize = 3;
    pub const CHECK_END: usize = 4;
    pub const FOUND: usize = 5;
    pub const MARK: usize = 7;
    pub const FOR_NEIGHBOR: usize = 8;
    pub const SKIP: usize = 9;
    pub const TENTATIVE: usize = 10;
    pub const IMPROVES: usize = 11;
    pub const UPDATE: usize = 12;
    pub const PUSH: usize = 13;
    pub const NOT_FOUND: usize = 17;
}

/// Manhattan distance between two cells.
pub fn manhattan(a: Coord, b: Coord) -> u64 {
    (a.0.abs_diff(b.0) as u64) + (a.1.abs_diff(b.1) as u64)
}

/// A* guided by the Manhattan distance to the end cell.
///
/// The heuristic ignores diagonal moves and weights, so with diagonal movement
/// enabled the path found is not guaranteed to be the cheapest.
#[derive(Default, Debug, Clone)]
pub struct AStar {
    frontier: Frontier,
    /// Cost from the start, `u64::MAX` when unreached.
    g: Vec<u64>,
    core: SearchCore,
}

impl AStar {
    pub fn g_score(&self, idx: usize) -> Option<u64> {
        self.g.get(idx).copied().filter(|&g| g != u64::MAX)
    }
}

impl SearchEngine for AStar {
    fn reset(&mut self) {
        self.frontier.clear();
        self.g.clear();
        self.core.reset();
    }

    fn begin(&mut self, grid: &Grid) -> Result<(), SearchError> {
        self.frontier.clear();
        self.g.clear();
        let start = self.core.begin(grid)?;
        self.g.resize(grid.len(), u64::MAX);
        self.g[start] = 0;
        let end = grid.end().unwrap_or(start);
        self.frontier
            .push(manhattan(grid.coord_of(start), grid.coord_of(end)), start);
        Ok(())
    }

    fn step(&mut self, grid: &mut Grid, diagonal: bool) {
        if !self.core.can_step(grid) {
            return;
        }
        let Some(end) = grid.end() else {
            tracing::warn!("[astar] end cell removed mid-run");
            self.core.no_path(line::NOT_FOUND);
            return;
        };

        let Some(current) = self.frontier.pop() else {
            self.core.no_path(line::NOT_FOUND);
            return;
        };
        self.core.progress.current_line = line::POP;
        self.core.progress.nodes_visited += 1;
        self.core.current = Some(current);
        self.core.progress.current_line = line::CURRENT;

        self.core.progress.current_line = line::CHECK_END;
        if current == end {
            self.core.found(grid, current, line::FOUND);
            return;
        }

        match grid.kind_at(current) {
            // Stale entry for a cell already expanded
            CellType::Visited => return,
            CellType::Start => {}
            _ => {
                self.core.progress.current_line = line::MARK;
                grid.set_kind_at(current, CellType::Visited);
            }
        }

        let end_coord = grid.coord_of(end);
        let base = self.g[current];
        let neighbors = self.core.take_neighbors(grid, current, diagonal);
        for &neighbor in &neighbors {
            self.core.progress.current_line = line::FOR_NEIGHBOR;
            if matches!(grid.kind_at(neighbor), CellType::Wall | CellType::Visited) {
                self.core.progress.current_line = line::SKIP;
                continue;
            }

            self.core.progress.current_line = line::TENTATIVE;
            let tentative = base.saturating_add(grid.cost_at(neighbor) as u64);
            self.core.progress.current_line = line::IMPROVES;
            if tentative < self.g[neighbor] {
                self.core.progress.current_line = line::UPDATE;
                self.g[neighbor] = tentative;
                self.core.parents[neighbor] = Some(current);
                let f = tentative + manhattan(grid.coord_of(neighbor), end_coord);
                self.frontier.push(f, neighbor);
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
    use crate::solvers::{Dijkstra, SearchState, run_to_completion};

    #[test]
    fn test_manhattan() {
        assert_eq!(manhattan((0, 0), (3, 4)), 7);
        assert_eq!(manhattan((5, 2), (1, 2)), 4);
        assert_eq!(manhattan((2, 2), (2, 2)), 0);
    }

    fn row_grid() -> Grid {
        let mut grid = Grid::new(5, 5, None);
        grid.set_cell_type((2, 0), CellType::Start);
        grid.set_cell_type((2, 4), CellType::End);
        grid
    }

    #[test]
    fn test_heads_straight_for_the_end() {
        let mut grid = row_grid();
        let mut astar = AStar::default();
        astar.begin(&grid).unwrap();
        run_to_completion(&mut astar, &mut grid, false, 1000).unwrap();
        assert_eq!(astar.progress().state(), SearchState::Found);
        assert_eq!(astar.progress().path_cost, 4);
        // Only the cells on the row are ever expanded
        assert_eq!(astar.progress().nodes_visited, 5);
        assert_eq!(grid.count(CellType::Visited), 0);
        assert_eq!(grid.count(CellType::Path), 3);
    }

    #[test]
    fn test_expands_fewer_nodes_than_dijkstra() {
        let mut grid = row_grid();
        let mut astar = AStar::default();
        astar.begin(&grid).unwrap();
        run_to_completion(&mut astar, &mut grid, false, 1000).unwrap();

        let mut other = row_grid();
        let mut dijkstra = Dijkstra::default();
        dijkstra.begin(&other).unwrap();
        run_to_completion(&mut dijkstra, &mut other, false, 1000).unwrap();

        assert_eq!(astar.progress().path_cost, dijkstra.progress().path_cost);
        assert!(astar.progress().nodes_visited < dijkstra.progress().nodes_visited);
    }

    #[test]
    fn test_weighted_detour() {
        let mut grid = Grid::new(3, 3, None);
        grid.set_cell_type((1, 0), CellType::Start);
        grid.set_cell_type((1, 2), CellType::End);
        grid.set_cell_type((1, 1), CellType::Weight);
        let mut astar = AStar::default();
        astar.begin(&grid).unwrap();
        run_to_completion(&mut astar, &mut grid, false, 100).unwrap();
        assert_eq!(astar.progress().path_cost, 4);
        assert_eq!(astar.g_score(grid.index_of((1, 2))), Some(4));
    }
}
