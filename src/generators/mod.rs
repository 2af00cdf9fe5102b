use rand::{Rng, SeedableRng, rngs::StdRng};

mod recur_backtrack;

use recur_backtrack::carve_step;

use crate::grid::{CellType, Coord, Grid};

/// Get a random number generator, optionally seeded for reproducibility.
pub fn get_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    }
}

/// Randomized depth-first maze carver, advanced one move per `step`.
///
/// `begin` turns the whole grid into walls and opens a seed cell at even
/// coordinates; every `step` then either carves one corridor of two cells or
/// backtracks by one.
#[derive(Default, Debug, Clone)]
pub struct MazeGenerator {
    /// Current carve path, the carver on top.
    stack: Vec<usize>,
    generating: bool,
    candidates: Vec<usize>,
}

impl MazeGenerator {
    pub fn reset(&mut self) {
        self.stack.clear();
        self.generating = false;
    }

    /// Fills `grid` with walls, opens a random even-coordinate seed and starts
    /// generating from it. Returns the seed, or `None` for an empty grid.
    pub fn begin<R: Rng>(&mut self, grid: &mut Grid, rng: &mut R) -> Option<Coord> {
        self.reset();
        if grid.is_empty() {
            return None;
        }
        grid.fill_with_walls();

        let seed = (
            rng.random_range(0..(grid.rows() / 2).max(1)) * 2,
            rng.random_range(0..(grid.cols() / 2).max(1)) * 2,
        );
        grid.set_cell_type(seed, CellType::Empty);
        self.stack.push(grid.index_of(seed));
        self.generating = true;
        tracing::debug!("[maze] seeded at {:?}", seed);
        Some(seed)
    }

    /// Carves or backtracks once. Stops generating when the stack runs dry.
    pub fn step<R: Rng>(&mut self, grid: &mut Grid, rng: &mut R) {
        if !self.generating {
            return;
        }
        if self.stack.last().is_some_and(|&idx| idx >= grid.len()) {
            tracing::warn!("[maze] grid was replaced mid-run, stopping");
            self.reset();
            return;
        }
        if !carve_step(grid, &mut self.stack, &mut self.candidates, rng) {
            self.generating = false;
            tracing::debug!("[maze] generation finished");
        }
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }

    /// The cell the carver currently stands on.
    pub fn carver(&self) -> Option<usize> {
        self.stack.last().copied()
    }
}
