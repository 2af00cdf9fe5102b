mod astar;
mod bfs;
mod dfs;
mod dijkstra;

pub use astar::{AStar, manhattan};
pub use bfs::Bfs;
pub use dfs::Dfs;
pub use dijkstra::Dijkstra;

use crate::grid::{CellType, Coord, Grid};

/// Why a search could not be started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchError {
    MissingStart,
    MissingEnd,
}

impl std::fmt::Display for SearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchError::MissingStart => write!(f, "the grid has no start cell"),
            SearchError::MissingEnd => write!(f, "the grid has no end cell"),
        }
    }
}

impl std::error::Error for SearchError {}

/// Where a search is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Idle,
    Searching,
    Found,
    NoPath,
}

/// Flags and counters shared by every search engine.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct SearchProgress {
    pub searching: bool,
    pub complete: bool,
    pub no_path: bool,
    pub nodes_visited: u64,
    /// Sum of the costs of the path cells after the start.
    pub path_cost: u64,
    pub current_line: usize,
}

impl SearchProgress {
    pub fn state(&self) -> SearchState {
        match (self.searching, self.complete, self.no_path) {
            (_, true, true) => SearchState::NoPath,
            (_, true, false) => SearchState::Found,
            (true, false, _) => SearchState::Searching,
            (false, false, _) => SearchState::Idle,
        }
    }
}

/// A graph search over the grid that processes one frontier node per `step`.
///
/// The caller owns the grid and the engine exclusively for the whole run and
/// must not resize the grid between `begin` and completion.
pub trait SearchEngine {
    /// Returns the engine to `Idle`, dropping its frontier and tables.
    fn reset(&mut self);
    /// Resets and seeds the frontier with the grid's start cell.
    fn begin(&mut self, grid: &Grid) -> Result<(), SearchError>;
    /// Pops one frontier node and expands it. Does nothing unless searching.
    fn step(&mut self, grid: &mut Grid, diagonal: bool);
    fn progress(&self) -> &SearchProgress;
    /// Best-known path from the start to the node processed last, start first.
    fn current_path(&self, grid: &Grid) -> Vec<Coord>;

    fn is_complete(&self) -> bool {
        self.progress().complete
    }
}

/// Parent table, neighbor scratch buffer and progress, the part every engine
/// carries regardless of its frontier type.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub(crate) struct SearchCore {
    /// Back-pointers indexed like the grid cells.
    pub parents: Vec<Option<usize>>,
    pub progress: SearchProgress,
    /// Node processed by the last step.
    pub current: Option<usize>,
    /// Path found, start first.
    pub path: Vec<usize>,
    pub nbuf: Vec<usize>,
}

impl SearchCore {
    pub fn reset(&mut self) {
        self.parents.clear();
        self.progress = SearchProgress::default();
        self.current = None;
        self.path.clear();
    }

    /// Resets for `grid` and returns its start cell.
    pub fn begin(&mut self, grid: &Grid) -> Result<usize, SearchError> {
        self.reset();
        let start = grid.start().ok_or(SearchError::MissingStart)?;
        grid.end().ok_or(SearchError::MissingEnd)?;
        self.parents.resize(grid.len(), None);
        self.progress.searching = true;
        Ok(start)
    }

    /// Whether `step` should run against `grid`.
    pub fn can_step(&self, grid: &Grid) -> bool {
        if !self.progress.searching || self.progress.complete {
            return false;
        }
        if self.parents.len() != grid.len() {
            tracing::warn!("[search] grid was replaced mid-run, ignoring step");
            return false;
        }
        true
    }

    /// Fills the scratch buffer with the neighbors of `idx` and hands it out.
    pub fn take_neighbors(&mut self, grid: &Grid, idx: usize, diagonal: bool) -> Vec<usize> {
        let mut nbuf = std::mem::take(&mut self.nbuf);
        nbuf.clear();
        nbuf.extend(grid.neighbors(idx, diagonal));
        nbuf
    }

    pub fn give_back_neighbors(&mut self, nbuf: Vec<usize>) {
        self.nbuf = nbuf;
    }

    pub fn trace(&self, from: usize) -> Vec<usize> {
        trace_path(&self.parents, from)
    }

    pub fn no_path(&mut self, line: usize) {
        self.progress.no_path = true;
        self.progress.searching = false;
        self.progress.complete = true;
        self.progress.current_line = line;
        tracing::debug!(
            "[search] frontier exhausted after {} nodes, no path",
            self.progress.nodes_visited
        );
    }

    /// Reconstructs the path ending at `end`, paints it onto the grid and
    /// completes the search.
    pub fn found(&mut self, grid: &mut Grid, end: usize, line: usize) {
        let path = self.trace(end);
        self.progress.path_cost = path
            .iter()
            .filter(|&&idx| Some(idx) != grid.start())
            .map(|&idx| grid.cost_at(idx) as u64)
            .sum();
        for &idx in &path {
            if !matches!(grid.kind_at(idx), CellType::Start | CellType::End) {
                grid.set_kind_at(idx, CellType::Path);
            }
        }
        self.path = path;
        self.current = Some(end);
        self.progress.complete = true;
        self.progress.searching = false;
        self.progress.current_line = line;
        tracing::debug!(
            "[search] path found: {} cells, cost {}, {} nodes visited",
            self.path.len(),
            self.progress.path_cost,
            self.progress.nodes_visited
        );
    }

    pub fn current_path(&self, grid: &Grid) -> Vec<Coord> {
        match self.current {
            Some(idx) if idx < self.parents.len() => self
                .trace(idx)
                .into_iter()
                .map(|idx| grid.coord_of(idx))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Walks the back-pointers from `from` to the root and returns the chain root
/// first. Stops after visiting every slot once, so a corrupt table cannot loop.
pub fn trace_path(parents: &[Option<usize>], from: usize) -> Vec<usize> {
    let mut path = vec![from];
    let mut tracer = from;
    while let Some(parent) = parents.get(tracer).copied().flatten() {
        if path.len() > parents.len() {
            break;
        }
        path.push(parent);
        tracer = parent;
    }
    path.reverse();
    path
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Solver {
    Bfs,
    Dfs,
    Dijkstra,
    AStar,
}

impl Solver {
    pub const ALL: [Solver; 4] = [Solver::Bfs, Solver::Dfs, Solver::AStar, Solver::Dijkstra];

    /// Weighted cells only make sense for the cost-aware searches.
    pub fn supports_weights(self) -> bool {
        matches!(self, Solver::Dijkstra | Solver::AStar)
    }
}

impl std::fmt::Display for Solver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Solver::Bfs => write!(f, "Breadth-First Search (BFS)"),
            Solver::Dfs => write!(f, "Depth-First Search (DFS)"),
            Solver::Dijkstra => write!(f, "Dijkstra's Algorithm"),
            Solver::AStar => write!(f, "A* Search"),
        }
    }
}

/// One state record per search algorithm.
#[derive(Default, Debug, Clone)]
pub struct SearchEngines {
    pub bfs: Bfs,
    pub dfs: Dfs,
    pub dijkstra: Dijkstra,
    pub astar: AStar,
}

impl SearchEngines {
    pub fn get(&self, solver: Solver) -> &dyn SearchEngine {
        match solver {
            Solver::Bfs => &self.bfs,
            Solver::Dfs => &self.dfs,
            Solver::Dijkstra => &self.dijkstra,
            Solver::AStar => &self.astar,
        }
    }

    pub fn get_mut(&mut self, solver: Solver) -> &mut dyn SearchEngine {
        match solver {
            Solver::Bfs => &mut self.bfs,
            Solver::Dfs => &mut self.dfs,
            Solver::Dijkstra => &mut self.dijkstra,
            Solver::AStar => &mut self.astar,
        }
    }

    pub fn reset_all(&mut self) {
        for solver in Solver::ALL {
            self.get_mut(solver).reset();
        }
    }
}

/// Steps `engine` until it completes, returning the number of steps taken.
pub fn run_to_completion(
    engine: &mut dyn SearchEngine,
    grid: &mut Grid,
    diagonal: bool,
    max_steps: usize,
) -> Option<usize> {
    (1..=max_steps).find(|_| {
        engine.step(grid, diagonal);
        engine.is_complete()
    })
}
