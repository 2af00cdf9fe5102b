use std::{
    io::{Stdout, Write},
    sync::mpsc::Receiver,
};

use crossterm::{
    QueueableCommand, cursor, queue,
    style::{self, Attribute, Color, Stylize},
    terminal::{self, ClearType},
};
use unicode_truncate::UnicodeTruncateStr;

use crate::{
    app::{
        history::EventHistory,
        session::{Algorithm, Mode, Session},
    },
    grid::{CellType, Coord, GridEvent},
    solvers::SearchState,
    sorting::{ArrayEvent, Highlight},
};

pub struct Renderer {
    /// Standard output handle to write to the terminal
    stdout: Stdout,
    /// Current grid dimensions (rows, cols)
    grid_dims: Option<(u16, u16)>,
    /// Highlight of every bar, rebuilt from the array events
    marks: Vec<Option<Highlight>>,
    /// Readable log of the operations performed, browsable while paused
    history: EventHistory<String>,
    /// Mode drawn last, a change forces a full redraw
    drawn_mode: Option<Mode>,
    needs_full_redraw: bool,
    bars_dirty: bool,
    /// Whether the terminal was too small on the last draw
    too_small: bool,
}

impl Renderer {
    /// Rows below the visualization for the status panel
    pub const NUM_STATUS_ROWS: u16 = 4;
    /// Rows below the status panel for the operation log
    pub const NUM_LOG_ROWS: u16 = 6;
    /// Smallest bar area that is still worth drawing
    const MIN_BAR_ROWS: u16 = 8;
    const BAR: &'static str = "█";

    pub fn new(max_history_events: usize) -> Self {
        Self {
            stdout: std::io::stdout(),
            grid_dims: None,
            marks: Vec::new(),
            history: EventHistory::new(max_history_events),
            drawn_mode: None,
            needs_full_redraw: true,
            bars_dirty: true,
            too_small: false,
        }
    }

    /// Rows taken by everything that is not the visualization.
    fn panel_rows() -> u16 {
        Renderer::NUM_STATUS_ROWS + Renderer::NUM_LOG_ROWS
    }

    /// Grid cell under the terminal position `(column, row)`, if any.
    pub fn cell_at(&self, column: u16, row: u16) -> Option<Coord> {
        let (rows, cols) = self.grid_dims?;
        let col = column / CellType::CELL_WIDTH;
        (row < rows && col < cols && !self.too_small).then_some((row, col))
    }

    /// Schedules a full redraw, e.g. after a terminal resize.
    pub fn invalidate(&mut self) {
        self.needs_full_redraw = true;
        self.bars_dirty = true;
    }

    pub fn history_backward(&mut self) -> bool {
        self.history.history_backward().is_some()
    }

    pub fn history_forward(&mut self) -> bool {
        self.history.history_forward().is_some()
    }

    /// Applies every pending event from the engines.
    ///
    /// Grid updates are drawn right away when the grid is on screen; array
    /// events only update the highlights, bars are redrawn by `draw`.
    pub fn drain_events(
        &mut self,
        mode: Mode,
        grid_event_rx: &Receiver<GridEvent>,
        array_event_rx: &Receiver<ArrayEvent>,
    ) -> std::io::Result<()> {
        // Compare and swap marks last for one frame, sorted marks stick
        for mark in self.marks.iter_mut() {
            if matches!(mark, Some(Highlight::Compare | Highlight::Swap)) {
                *mark = None;
            }
        }

        while let Ok(event) = array_event_rx.try_recv() {
            self.render_array_event(event);
        }
        while let Ok(event) = grid_event_rx.try_recv() {
            self.render_grid_event(mode, &event)?;
        }
        Ok(())
    }

    fn render_array_event(&mut self, event: ArrayEvent) {
        self.bars_dirty = true;
        match event {
            ArrayEvent::Initial { values } => {
                self.marks = vec![None; values.len()];
                self.history
                    .add_event(format!("new array of {} values", values.len()));
            }
            ArrayEvent::Write { index, old, new } => {
                self.history
                    .add_event(format!("arr[{}] = {} (was {})", index, new, old));
            }
            ArrayEvent::Swap { a, b } => {
                self.history.add_event(format!("swap arr[{}] <-> arr[{}]", a, b));
            }
            ArrayEvent::Highlight { indices, kind } => {
                for idx in indices {
                    if let Some(mark) = self.marks.get_mut(idx) {
                        // A bar known to be sorted stays green
                        if *mark != Some(Highlight::Sorted) || kind == Highlight::Sorted {
                            *mark = Some(kind);
                        }
                    }
                }
            }
        }
    }

    fn render_grid_event(&mut self, mode: Mode, event: &GridEvent) -> std::io::Result<()> {
        match event {
            GridEvent::Initial { rows, cols, .. } => {
                self.grid_dims = Some((*rows, *cols));
                self.needs_full_redraw = true;
                self.history
                    .add_event(format!("new {}x{} grid", rows, cols));
            }
            GridEvent::Update { coord, old, new } => {
                self.history.add_event(format!(
                    "cell ({}, {}): {:?} -> {:?}",
                    coord.0, coord.1, old, new
                ));
                if mode == Mode::Pathfinding && !self.needs_full_redraw && !self.too_small {
                    // Move the cursor to the cell and print the new symbol
                    queue!(
                        self.stdout,
                        cursor::MoveTo(coord.1 * CellType::CELL_WIDTH, coord.0),
                        style::Print(new)
                    )?;
                }
            }
        }
        Ok(())
    }

    /// Check if terminal size is sufficient for the current view.
    /// If not, display a message and return Ok(false)
    fn check_size(&mut self, mode: Mode, term_width: u16, term_height: u16) -> std::io::Result<bool> {
        let (need_width, need_height) = match mode {
            Mode::Pathfinding => {
                let (rows, cols) = self.grid_dims.unwrap_or((0, 0));
                (cols * CellType::CELL_WIDTH, rows + Renderer::panel_rows())
            }
            Mode::Sorting => (self.marks.len() as u16, Renderer::MIN_BAR_ROWS + Renderer::panel_rows()),
        };
        if term_width >= need_width && term_height >= need_height {
            if self.too_small {
                self.too_small = false;
                self.invalidate();
            }
            return Ok(true);
        }
        if !self.too_small {
            let msg = format!(
                "Terminal size is too small ({}x{}) to display this view ({}x{}). Please resize the terminal.\r\n",
                term_width, term_height, need_width, need_height
            );
            queue!(
                self.stdout,
                terminal::Clear(ClearType::All),
                cursor::MoveTo(0, 0),
                style::PrintStyledContent(msg.with(Color::Yellow).attribute(Attribute::Bold)),
                style::PrintStyledContent(
                    "Press Esc to exit...\r\n"
                        .with(Color::Blue)
                        .attribute(Attribute::Bold)
                )
            )?;
            self.too_small = true;
        }
        Ok(false)
    }

    /// Draws the current frame of `session`.
    pub fn draw(&mut self, session: &Session) -> std::io::Result<()> {
        let mode = session.mode();
        if self.drawn_mode != Some(mode) {
            self.drawn_mode = Some(mode);
            self.invalidate();
        }
        if self.grid_dims.is_none() {
            self.grid_dims = Some((session.grid().rows(), session.grid().cols()));
        }

        let (term_width, term_height) = terminal::size()?;
        if !self.check_size(mode, term_width, term_height)? {
            self.stdout.flush()?;
            return Ok(());
        }

        if self.needs_full_redraw {
            self.stdout.queue(terminal::Clear(ClearType::All))?;
        }
        let top = match mode {
            Mode::Sorting => {
                let bar_rows = term_height.saturating_sub(Renderer::panel_rows());
                if self.bars_dirty || self.needs_full_redraw {
                    self.draw_bars(session.array().values(), term_width, bar_rows)?;
                }
                bar_rows
            }
            Mode::Pathfinding => {
                if self.needs_full_redraw {
                    self.draw_grid(session)?;
                }
                session.grid().rows()
            }
        };
        self.needs_full_redraw = false;
        self.bars_dirty = false;

        self.draw_status(session, top, term_width)?;
        self.draw_log(top + Renderer::NUM_STATUS_ROWS, term_width)?;
        self.stdout.flush()?;
        Ok(())
    }

    fn draw_grid(&mut self, session: &Session) -> std::io::Result<()> {
        let grid = session.grid();
        self.grid_dims = Some((grid.rows(), grid.cols()));
        for row in 0..grid.rows() {
            self.stdout.queue(cursor::MoveTo(0, row))?;
            for col in 0..grid.cols() {
                self.stdout.queue(style::Print(grid[(row, col)].kind))?;
            }
        }
        Ok(())
    }

    /// Draws the values as vertical bars scaled to `rows`, two columns per bar
    /// when they fit.
    fn draw_bars(&mut self, values: &[i32], term_width: u16, rows: u16) -> std::io::Result<()> {
        if self.marks.len() != values.len() {
            self.marks.resize(values.len(), None);
        }
        let max = values.iter().copied().max().unwrap_or(1).max(1) as u64;
        let bar_width = if values.len() * 2 <= term_width as usize { 2 } else { 1 };
        let heights = values
            .iter()
            .map(|&v| (v.max(0) as u64 * rows as u64).div_ceil(max) as u16)
            .collect::<Vec<_>>();

        for y in 0..rows {
            self.stdout.queue(cursor::MoveTo(0, y))?;
            // Rows count down from the top, bars grow up from the bottom
            let level = rows - y;
            for (i, &height) in heights.iter().enumerate() {
                let color = match self.marks[i] {
                    Some(Highlight::Compare) => Color::Yellow,
                    Some(Highlight::Swap) => Color::Red,
                    Some(Highlight::Sorted) => Color::Green,
                    None => Color::White,
                };
                let symbol = if height >= level { Renderer::BAR } else { " " };
                let cell = if bar_width == 2 {
                    format!("{} ", symbol)
                } else {
                    symbol.to_string()
                };
                self.stdout.queue(style::PrintStyledContent(cell.with(color)))?;
            }
            self.stdout.queue(terminal::Clear(ClearType::UntilNewLine))?;
        }
        Ok(())
    }

    fn print_line(&mut self, row: u16, width: u16, text: &str, color: Color) -> std::io::Result<()> {
        let (line, _) = text.unicode_truncate(width as usize);
        queue!(
            self.stdout,
            cursor::MoveTo(0, row),
            style::PrintStyledContent(line.with(color)),
            terminal::Clear(ClearType::UntilNewLine)
        )
    }

    fn draw_status(&mut self, session: &Session, top: u16, width: u16) -> std::io::Result<()> {
        let algorithm = session
            .algorithm()
            .map_or_else(|| String::from("no algorithm selected"), |a| a.to_string());
        let playback = if session.is_playing() {
            "Playing"
        } else if session.is_generating_maze() {
            "Generating maze"
        } else {
            "Paused"
        };
        let mut header = format!(
            "{} | {} | {} | speed {:.2}x",
            session.mode(),
            algorithm,
            playback,
            session.speed().speed()
        );
        if session.mode() == Mode::Pathfinding {
            header.push_str(if session.diagonal() {
                " | diagonal on"
            } else {
                " | diagonal off"
            });
        } else {
            header.push_str(&format!(" | {} bars", session.array().len()));
        }

        let carver = session
            .maze()
            .carver()
            .filter(|_| session.is_generating_maze())
            .map(|idx| session.grid().coord_of(idx));
        let stats = match (carver, session.algorithm()) {
            (Some((row, col)), _) => format!("carving maze at ({}, {})", row, col),
            (None, Some(Algorithm::Sort(sorter))) => {
                let engine = session.sort_engine(sorter);
                let stats = engine.stats();
                format!(
                    "comparisons: {}  array accesses: {}  line: {}{}",
                    stats.comparisons,
                    stats.array_accesses,
                    engine.current_line(),
                    if engine.is_sorted() { "  (sorted)" } else { "" }
                )
            }
            (None, Some(Algorithm::Search(solver))) => {
                let progress = session.search_engine(solver).progress();
                let state = match progress.state() {
                    SearchState::Idle => "idle",
                    SearchState::Searching => "searching",
                    SearchState::Found => "path found",
                    SearchState::NoPath => "no path",
                };
                format!(
                    "nodes visited: {}  path cost: {}  line: {}  ({})",
                    progress.nodes_visited, progress.path_cost, progress.current_line, state
                )
            }
            (None, None) => String::new(),
        };

        let help = match session.mode() {
            Mode::Sorting => {
                "Enter play/pause  → step  ↑/↓ speed  a algorithm  n new array  +/- size  r reset  Tab mode  Esc quit"
            }
            Mode::Pathfinding => {
                "Enter play/pause  → step  ↑/↓ speed  a algorithm  click start/end  right/shift-click wall  ctrl-click weight  g maze  c/w/x/z clear  d diagonal  r reset  Tab mode  Esc quit"
            }
        };

        self.print_line(top, width, &header, Color::Cyan)?;
        self.print_line(top + 1, width, &stats, Color::White)?;
        self.print_line(top + 2, width, session.status(), Color::Green)?;
        self.print_line(top + 3, width, help, Color::DarkGrey)?;
        Ok(())
    }

    fn draw_log(&mut self, top: u16, width: u16) -> std::io::Result<()> {
        let browsing = self.history.is_browsing();
        let lines = self
            .history
            .window(Renderer::NUM_LOG_ROWS as usize)
            .enumerate()
            .map(|(i, entry)| {
                if browsing && i == 0 {
                    format!("▸ {}", entry)
                } else {
                    format!("  {}", entry)
                }
            })
            .collect::<Vec<_>>();
        for row in 0..Renderer::NUM_LOG_ROWS {
            let text = lines.get(row as usize).map(String::as_str).unwrap_or("");
            let color = if browsing { Color::Yellow } else { Color::DarkGrey };
            self.print_line(top + row, width, text, color)?;
        }
        Ok(())
    }
}
