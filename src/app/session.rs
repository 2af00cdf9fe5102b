use std::{sync::mpsc::Sender, time::Duration};

use rand::{Rng, rngs::StdRng};

use crate::{
    app::config::Config,
    generators::{MazeGenerator, get_rng},
    grid::{CellType, Coord, Grid, GridEvent},
    solvers::{SearchEngine, SearchEngines, SearchState, Solver},
    sorting::{ArrayEvent, SortArray, SortEngine, SortEngines, Sorter},
};

/// Which family of algorithms the session is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Sorting,
    Pathfinding,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Sorting => write!(f, "Sorting"),
            Mode::Pathfinding => write!(f, "Pathfinding"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Sort(Sorter),
    Search(Solver),
}

impl Algorithm {
    pub fn mode(self) -> Mode {
        match self {
            Algorithm::Sort(_) => Mode::Sorting,
            Algorithm::Search(_) => Mode::Pathfinding,
        }
    }

    /// Every algorithm shown in `mode`, in menu order.
    pub fn all(mode: Mode) -> Vec<Algorithm> {
        match mode {
            Mode::Sorting => Sorter::ALL.into_iter().map(Algorithm::Sort).collect(),
            Mode::Pathfinding => Solver::ALL.into_iter().map(Algorithm::Search).collect(),
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Algorithm::Sort(sorter) => write!(f, "{}", sorter),
            Algorithm::Search(solver) => write!(f, "{}", solver),
        }
    }
}

/// What a click on a grid cell places.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTool {
    /// Start if there is none, otherwise End if there is none
    Endpoint,
    Wall,
    Weight,
}

/// Turns an animation speed multiplier into a number of engine steps per tick.
///
/// Below 1x a single step runs once enough time has passed since the previous
/// one; from 1x up, `floor(speed)` steps run every tick.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedControl {
    speed: f32,
    since_last_step: Duration,
}

impl SpeedControl {
    pub const MIN: f32 = 0.25;
    pub const MAX: f32 = 5.0;
    pub const INCREMENT: f32 = 0.25;
    /// Length of one tick at the reference 60 frames per second
    pub const FRAME: Duration = Duration::from_nanos(1_000_000_000 / 60);

    pub fn new(speed: f32) -> Self {
        Self {
            speed: speed.clamp(Self::MIN, Self::MAX),
            since_last_step: Duration::ZERO,
        }
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed.clamp(Self::MIN, Self::MAX);
    }

    pub fn faster(&mut self) {
        self.set_speed(self.speed + Self::INCREMENT);
    }

    pub fn slower(&mut self) {
        self.set_speed(self.speed - Self::INCREMENT);
    }

    /// Delay between two steps when running below 1x.
    pub fn step_delay(&self) -> Duration {
        Duration::from_nanos((Self::FRAME.as_nanos() as f64 / self.speed as f64) as u64)
    }

    /// How many steps to run for a tick that lasted `elapsed`.
    pub fn steps_for_tick(&mut self, elapsed: Duration) -> usize {
        if self.speed < 1.0 {
            self.since_last_step += elapsed;
            if self.since_last_step >= self.step_delay() {
                self.since_last_step = Duration::ZERO;
                1
            } else {
                0
            }
        } else {
            self.speed.floor() as usize
        }
    }
}

impl Default for SpeedControl {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Everything one visualization needs: the shared array and grid, one state
/// record per engine, and the playback controls.
///
/// The engines are created once and reset in place. The array and grid are
/// only replaced while nothing is playing.
pub struct Session {
    config: Config,
    mode: Mode,
    sorter: Option<Sorter>,
    solver: Option<Solver>,
    array: SortArray,
    /// Array as last generated, restored by `restore_array`
    backup: Vec<i32>,
    grid: Grid,
    grid_sender: Option<Sender<GridEvent>>,
    sort_engines: SortEngines,
    search_engines: SearchEngines,
    maze: MazeGenerator,
    rng: StdRng,
    playing: bool,
    diagonal: bool,
    speed: SpeedControl,
    status: String,
}

impl Session {
    pub fn new(
        config: Config,
        array_sender: Option<Sender<ArrayEvent>>,
        grid_sender: Option<Sender<GridEvent>>,
    ) -> Self {
        let mut rng = get_rng(config.seed);
        let values = random_values(&mut rng, &config);
        let mut sort_engines = SortEngines::default();
        sort_engines.reset_all(&values);
        let grid = Grid::from_pixels(
            config.grid_width_px,
            config.grid_height_px,
            config.cell_size_px,
            grid_sender.clone(),
        );
        tracing::info!(
            "[session] created with {} bars and a {}x{} grid",
            values.len(),
            grid.rows(),
            grid.cols()
        );

        Self {
            speed: SpeedControl::new(config.speed),
            array: SortArray::new(values.clone(), array_sender),
            backup: values,
            grid,
            grid_sender,
            sort_engines,
            search_engines: SearchEngines::default(),
            maze: MazeGenerator::default(),
            rng,
            mode: Mode::Sorting,
            sorter: None,
            solver: None,
            playing: false,
            diagonal: false,
            status: String::from("Welcome! Select an algorithm."),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The algorithm selected for the current mode, if any.
    pub fn algorithm(&self) -> Option<Algorithm> {
        match self.mode {
            Mode::Sorting => self.sorter.map(Algorithm::Sort),
            Mode::Pathfinding => self.solver.map(Algorithm::Search),
        }
    }

    pub fn array(&self) -> &SortArray {
        &self.array
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn sort_engine(&self, sorter: Sorter) -> &dyn SortEngine {
        self.sort_engines.get(sorter)
    }

    pub fn search_engine(&self, solver: Solver) -> &dyn SearchEngine {
        self.search_engines.get(solver)
    }

    pub fn maze(&self) -> &MazeGenerator {
        &self.maze
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_generating_maze(&self) -> bool {
        self.maze.is_generating()
    }

    pub fn diagonal(&self) -> bool {
        self.diagonal
    }

    pub fn speed(&self) -> &SpeedControl {
        &self.speed
    }

    pub fn speed_mut(&mut self) -> &mut SpeedControl {
        &mut self.speed
    }

    /// One-line description of the last thing that happened.
    pub fn status(&self) -> &str {
        &self.status
    }

    fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
        tracing::debug!("[session] status: {}", self.status);
    }

    /// Switches between sorting and pathfinding. The mode being left is
    /// cleaned up and no algorithm is selected afterwards.
    pub fn set_mode(&mut self, mode: Mode) {
        if mode == self.mode {
            return;
        }
        self.playing = false;
        match mode {
            Mode::Sorting => {
                self.maze.reset();
                self.grid.reset();
                self.search_engines.reset_all();
                self.sorter = None;
                self.set_status("Switched to Sorting Mode.");
            }
            Mode::Pathfinding => {
                self.randomize_array();
                self.solver = None;
                self.set_status("Place Start, End, and Walls.");
            }
        }
        self.mode = mode;
        tracing::info!("[session] mode set to {}", mode);
    }

    /// Selects `algorithm`, switching mode first if it belongs to the other
    /// one. Picking a different algorithm discards the progress of the last run.
    pub fn select_algorithm(&mut self, algorithm: Algorithm) {
        self.set_mode(algorithm.mode());
        if self.algorithm() == Some(algorithm) {
            return;
        }
        self.playing = false;
        match algorithm {
            Algorithm::Sort(sorter) => {
                self.sorter = Some(sorter);
                self.restore_array();
            }
            Algorithm::Search(solver) => {
                let had_weights = self.solver.is_some_and(Solver::supports_weights);
                self.solver = Some(solver);
                self.grid.clear_path();
                self.search_engines.reset_all();
                if had_weights && !solver.supports_weights() {
                    self.grid.clear_weights();
                }
            }
        }
        self.set_status(format!("Algorithm: {}", algorithm));
        tracing::info!("[session] selected {}", algorithm);
    }

    /// Replaces the array with fresh random values and rearms every sort engine.
    pub fn randomize_array(&mut self) {
        self.playing = false;
        let values = random_values(&mut self.rng, &self.config);
        self.backup = values.clone();
        self.array.replace(values);
        self.sort_engines.reset_all(self.array.values());
        self.set_status("Array generated. Select an algorithm.");
        tracing::info!("[session] generated {} values", self.array.len());
    }

    /// Changes the number of bars, regenerating the array when it changes.
    pub fn set_array_len(&mut self, len: usize) {
        let len = len.clamp(*Config::ARRAY_LEN_RANGE.start(), *Config::ARRAY_LEN_RANGE.end());
        if len != self.config.array_len {
            self.config.array_len = len;
            self.randomize_array();
        }
    }

    /// Puts back the array as it was last generated and rearms every sort engine.
    pub fn restore_array(&mut self) {
        self.playing = false;
        self.array.replace(self.backup.clone());
        self.sort_engines.reset_all(self.array.values());
    }

    /// Starts over in the current mode: the array is restored, or the grid is
    /// emptied including its endpoints.
    pub fn reset(&mut self) {
        self.playing = false;
        match self.mode {
            Mode::Sorting => {
                self.restore_array();
                self.set_status("Array reset. Select an algorithm.");
            }
            Mode::Pathfinding => {
                self.maze.reset();
                self.grid.reset();
                self.search_engines.reset_all();
                self.set_status("Grid reset. Place Start and End.");
            }
        }
    }

    /// Builds a new grid covering `width` x `height` pixels. Ignored while a
    /// search or maze is running.
    pub fn resize_grid(&mut self, width_px: u32, height_px: u32) {
        if self.playing || self.maze.is_generating() {
            tracing::warn!("[session] resize ignored while running");
            return;
        }
        self.config.grid_width_px = width_px;
        self.config.grid_height_px = height_px;
        self.grid = Grid::from_pixels(
            width_px,
            height_px,
            self.config.cell_size_px,
            self.grid_sender.clone(),
        );
        self.search_engines.reset_all();
        tracing::info!(
            "[session] grid resized to {}x{}",
            self.grid.rows(),
            self.grid.cols()
        );
    }

    fn is_mid_search(&self) -> bool {
        self.solver.is_some_and(|solver| {
            self.search_engines.get(solver).progress().state() == SearchState::Searching
        })
    }

    fn stop_searching(&mut self) {
        self.playing = false;
        self.search_engines.reset_all();
    }

    pub fn clear_path(&mut self) {
        self.stop_searching();
        self.grid.clear_path();
        self.set_status("Path cleared.");
    }

    pub fn clear_walls(&mut self) {
        self.stop_searching();
        self.grid.reset_walls();
        self.set_status("Walls cleared.");
    }

    pub fn clear_weights(&mut self) {
        self.stop_searching();
        self.grid.clear_weights();
        self.set_status("Weights cleared.");
    }

    /// Empties every cell except the start and end.
    pub fn clear_maze(&mut self) {
        self.maze.reset();
        self.stop_searching();
        self.grid.clear_maze();
        self.set_status("Maze cleared. Ready for new search.");
    }

    pub fn toggle_diagonal(&mut self) {
        self.diagonal = !self.diagonal;
        self.set_status(if self.diagonal {
            "Diagonal moves enabled."
        } else {
            "Diagonal moves disabled."
        });
    }

    /// Applies `tool` to the cell at `coord`. Only empty cells can be edited,
    /// and only while paused in pathfinding mode. A search paused mid-run is
    /// abandoned first. Returns whether the cell changed.
    pub fn edit_cell(&mut self, coord: Coord, tool: EditTool) -> bool {
        if self.mode != Mode::Pathfinding || self.playing || self.maze.is_generating() {
            return false;
        }
        if !self.grid.is_valid(coord.0 as i32, coord.1 as i32) {
            return false;
        }
        if self.is_mid_search() {
            self.stop_searching();
            self.grid.clear_path();
            self.set_status("Search stopped by an edit. Press Enter to restart.");
        }
        if self.grid[coord].kind != CellType::Empty {
            return false;
        }

        let kind = match tool {
            EditTool::Endpoint if self.grid.start().is_none() => CellType::Start,
            EditTool::Endpoint if self.grid.end().is_none() => CellType::End,
            EditTool::Endpoint => return false,
            EditTool::Wall => CellType::Wall,
            EditTool::Weight if self.solver.is_some_and(Solver::supports_weights) => {
                CellType::Weight
            }
            EditTool::Weight => return false,
        };
        self.grid.set_cell_type(coord, kind);
        tracing::trace!("[session] placed {:?} at {:?}", kind, coord);
        true
    }

    /// Fills the grid with walls and starts carving a maze, a few moves per tick.
    pub fn generate_maze(&mut self) {
        if self.mode != Mode::Pathfinding {
            return;
        }
        self.stop_searching();
        match self.maze.begin(&mut self.grid, &mut self.rng) {
            Some(seed) => {
                tracing::info!("[session] generating maze from {:?}", seed);
                self.set_status("Generating maze...");
            }
            None => self.set_status("The grid is empty."),
        }
    }

    fn is_finished(&self) -> bool {
        match self.algorithm() {
            Some(Algorithm::Sort(sorter)) => self.sort_engines.get(sorter).is_sorted(),
            Some(Algorithm::Search(solver)) => self.search_engines.get(solver).is_complete(),
            None => false,
        }
    }

    /// Makes sure the selected engine can be stepped: a search that is not
    /// already running clears the old overlay and starts from the start cell.
    /// Returns `false` with a status message when it cannot.
    fn prepare_run(&mut self) -> bool {
        let Some(algorithm) = self.algorithm() else {
            self.set_status("Please select an algorithm first!");
            return false;
        };
        if self.maze.is_generating() {
            self.set_status("Wait for the maze to finish.");
            return false;
        }
        let Algorithm::Search(solver) = algorithm else {
            return true;
        };
        if self.grid.start().is_none() || self.grid.end().is_none() {
            self.set_status("Place both Start and End nodes!");
            return false;
        }

        let engine = self.search_engines.get_mut(solver);
        if engine.progress().state() == SearchState::Searching {
            return true;
        }
        self.grid.clear_path();
        if let Err(e) = engine.begin(&self.grid) {
            tracing::warn!("[session] could not start {}: {}", solver, e);
            self.status = format!("Cannot start: {}.", e);
            return false;
        }
        self.set_status(format!("Searching with {}...", solver));
        tracing::info!("[session] started {}", solver);
        true
    }

    /// Play/pause. A finished run stays paused until something resets it.
    pub fn toggle_play(&mut self) {
        if self.playing {
            self.playing = false;
            self.set_status("Paused.");
            return;
        }
        if self.is_finished() {
            self.set_status("Already finished. Reset to run again.");
            return;
        }
        if self.prepare_run() {
            self.playing = true;
        }
    }

    /// Advances the selected engine by exactly one step while paused.
    pub fn step_once(&mut self) {
        if self.playing || self.is_finished() || !self.prepare_run() {
            return;
        }
        self.run_single_step();
    }

    fn run_single_step(&mut self) {
        match self.algorithm() {
            Some(Algorithm::Sort(sorter)) => {
                let engine = self.sort_engines.get_mut(sorter);
                engine.step(&mut self.array);
                if engine.is_sorted() {
                    let stats = engine.stats();
                    self.playing = false;
                    self.set_status("Sorting complete!");
                    tracing::info!(
                        "[session] {} finished: {} comparisons, {} array accesses",
                        sorter,
                        stats.comparisons,
                        stats.array_accesses
                    );
                }
            }
            Some(Algorithm::Search(solver)) => {
                let engine = self.search_engines.get_mut(solver);
                engine.step(&mut self.grid, self.diagonal);
                let progress = engine.progress().clone();
                match progress.state() {
                    SearchState::NoPath => {
                        self.playing = false;
                        self.set_status("No path found!");
                    }
                    SearchState::Found => {
                        self.playing = false;
                        self.set_status("Path found!");
                    }
                    SearchState::Idle | SearchState::Searching => {}
                }
                if progress.complete {
                    tracing::info!(
                        "[session] {} finished: {} nodes visited, path cost {}",
                        solver,
                        progress.nodes_visited,
                        progress.path_cost
                    );
                }
            }
            None => self.playing = false,
        }
    }

    /// Advances the animation by one frame that lasted `elapsed`.
    pub fn tick(&mut self, elapsed: Duration) {
        if self.playing {
            let steps = self.speed.steps_for_tick(elapsed);
            for _ in 0..steps {
                // The run may finish mid-tick
                if !self.playing {
                    break;
                }
                self.run_single_step();
            }
        }

        if self.maze.is_generating() {
            for _ in 0..self.config.maze_steps_per_tick {
                if !self.maze.is_generating() {
                    break;
                }
                self.maze.step(&mut self.grid, &mut self.rng);
            }
            if !self.maze.is_generating() {
                self.grid.finalize_maze();
                self.set_status("Maze generated. Place Start/End.");
                tracing::info!("[session] maze generated");
            }
        }
    }
}

fn random_values(rng: &mut StdRng, config: &Config) -> Vec<i32> {
    (0..config.array_len)
        .map(|_| rng.random_range(config.value_range.clone()))
        .collect()
}
