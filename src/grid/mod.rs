pub mod cell;

use std::sync::mpsc::Sender;

pub use cell::{BASE_COST, Cell, CellType, WEIGHT_COST};

/// (row, col) coordinate of a cell.
pub type Coord = (u16, u16);

/// Neighbor offsets as (d_row, d_col): up, down, left, right, then the diagonals
/// up-left, up-right, down-left, down-right.
pub const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
];

/// Change notifications for whoever draws the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GridEvent {
    Initial { rows: u16, cols: u16, cell: CellType },
    Update { coord: Coord, old: CellType, new: CellType },
}

/// The pathfinding grid.
///
/// Cells live in a flat row-major array. The start and end cells are tracked by
/// index so that engines can key their own tables by the same index.
pub struct Grid {
    cells: Box<[Cell]>,
    rows: u16,
    cols: u16,
    start: Option<usize>,
    end: Option<usize>,
    sender: Option<Sender<GridEvent>>,
}

impl Grid {
    pub fn new(rows: u16, cols: u16, sender: Option<Sender<GridEvent>>) -> Self {
        let cells = (0..rows)
            .flat_map(|row| (0..cols).map(move |col| Cell::new(row, col)))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        if let Some(s) = &sender {
            let _ = s.send(GridEvent::Initial {
                rows,
                cols,
                cell: CellType::Empty,
            });
        }
        Grid {
            cells,
            rows,
            cols,
            start: None,
            end: None,
            sender,
        }
    }

    /// Builds a grid covering `width` x `height` pixels with square cells of
    /// `cell_size` pixels. Partial cells are dropped.
    pub fn from_pixels(
        width: u32,
        height: u32,
        cell_size: u32,
        sender: Option<Sender<GridEvent>>,
    ) -> Self {
        let cell_size = cell_size.max(1);
        let rows = (height / cell_size).min(u16::MAX as u32) as u16;
        let cols = (width / cell_size).min(u16::MAX as u32) as u16;
        Grid::new(rows, cols, sender)
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    /// Number of cells in the grid.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn is_valid(&self, row: i32, col: i32) -> bool {
        row >= 0 && row < self.rows as i32 && col >= 0 && col < self.cols as i32
    }

    pub fn index_of(&self, coord: Coord) -> usize {
        debug_assert!(
            self.is_valid(coord.0 as i32, coord.1 as i32),
            "{:?} is outside a {}x{} grid",
            coord,
            self.rows,
            self.cols
        );
        // Overflow-safe since rows and cols are u16 (assuming usize is at least 32 bits)
        coord.0 as usize * self.cols as usize + coord.1 as usize
    }

    pub fn coord_of(&self, idx: usize) -> Coord {
        let cell = &self.cells[idx];
        (cell.row, cell.col)
    }

    pub fn start(&self) -> Option<usize> {
        self.start
    }

    pub fn end(&self) -> Option<usize> {
        self.end
    }

    pub fn kind_at(&self, idx: usize) -> CellType {
        self.cells[idx].kind
    }

    pub fn cost_at(&self, idx: usize) -> u32 {
        self.cells[idx].cost
    }

    /// Index of the cell `offset` away from `idx`, if it lies inside the grid.
    pub fn offset(&self, idx: usize, offset: (i32, i32)) -> Option<usize> {
        let (row, col) = self.coord_of(idx);
        let (nr, nc) = (row as i32 + offset.0, col as i32 + offset.1);
        self.is_valid(nr, nc)
            .then(|| self.index_of((nr as u16, nc as u16)))
    }

    /// In-bounds neighbors of `idx` in the fixed offset order, eight of them
    /// when `diagonal` is set and four otherwise.
    pub fn neighbors(&self, idx: usize, diagonal: bool) -> impl Iterator<Item = usize> + '_ {
        let count = if diagonal { 8 } else { 4 };
        NEIGHBOR_OFFSETS[..count]
            .iter()
            .filter_map(move |&offset| self.offset(idx, offset))
    }

    /// Assigns a new type to a cell.
    ///
    /// The cost follows the type (`Weight` costs 5, `Visited`/`Path` keep the
    /// previous cost, everything else costs 1). There is only ever one start and
    /// one end: overwriting the current holder clears the reference, and placing
    /// a new start/end demotes the previous one to `Empty`.
    /// Out-of-range coordinates are ignored.
    pub fn set_cell_type(&mut self, coord: Coord, kind: CellType) {
        if !self.is_valid(coord.0 as i32, coord.1 as i32) {
            tracing::warn!("[grid] ignored {:?} at out-of-range {:?}", kind, coord);
            return;
        }
        let idx = self.index_of(coord);
        self.set_kind_at(idx, kind);
    }

    pub fn set_kind_at(&mut self, idx: usize, kind: CellType) {
        if self.start == Some(idx) {
            self.start = None;
        }
        if self.end == Some(idx) {
            self.end = None;
        }

        match kind {
            CellType::Start => {
                if let Some(previous) = self.start.take() {
                    self.write(previous, CellType::Empty);
                }
                self.start = Some(idx);
            }
            CellType::End => {
                if let Some(previous) = self.end.take() {
                    self.write(previous, CellType::Empty);
                }
                self.end = Some(idx);
            }
            _ => {}
        }
        self.write(idx, kind);
    }

    fn write(&mut self, idx: usize, kind: CellType) {
        let cell = &mut self.cells[idx];
        let old = cell.kind;
        cell.kind = kind;
        if let Some(cost) = kind.assigned_cost() {
            cell.cost = cost;
        }
        if old != kind {
            if let Some(sender) = &self.sender {
                let _ = sender.send(GridEvent::Update {
                    coord: (cell.row, cell.col),
                    old,
                    new: kind,
                });
            }
        }
    }

    fn replace_where(&mut self, mut rule: impl FnMut(&Cell) -> Option<CellType>) {
        for idx in 0..self.cells.len() {
            if let Some(kind) = rule(&self.cells[idx]) {
                self.set_kind_at(idx, kind);
            }
        }
    }

    /// Sets every cell to `Empty` and forgets the start and end.
    pub fn reset(&mut self) {
        self.replace_where(|_| Some(CellType::Empty));
    }

    /// Turns walls back into empty cells.
    pub fn reset_walls(&mut self) {
        self.replace_where(|cell| (cell.kind == CellType::Wall).then_some(CellType::Empty));
    }

    /// Removes the search overlay. Cells that were weights before the search
    /// painted them become weights again, the rest become empty.
    pub fn clear_path(&mut self) {
        self.replace_where(|cell| {
            cell.kind.is_search_overlay().then(|| {
                if cell.is_weighted() {
                    CellType::Weight
                } else {
                    CellType::Empty
                }
            })
        });
    }

    pub fn clear_weights(&mut self) {
        self.replace_where(|cell| (cell.kind == CellType::Weight).then_some(CellType::Empty));
    }

    /// Sets every cell to `Wall`, ready to be carved by the maze generator.
    pub fn fill_with_walls(&mut self) {
        self.replace_where(|_| Some(CellType::Wall));
    }

    /// Empties every cell except the start and end.
    pub fn clear_maze(&mut self) {
        self.replace_where(|cell| {
            (!matches!(cell.kind, CellType::Start | CellType::End)).then_some(CellType::Empty)
        });
    }

    /// Turns cells left `Visited` after maze carving back into empty cells.
    pub fn finalize_maze(&mut self) {
        self.replace_where(|cell| (cell.kind == CellType::Visited).then_some(CellType::Empty));
    }

    /// Counts the cells of the given type.
    pub fn count(&self, kind: CellType) -> usize {
        self.cells.iter().filter(|cell| cell.kind == kind).count()
    }
}

impl std::ops::Index<Coord> for Grid {
    type Output = Cell;

    fn index(&self, coord: Coord) -> &Self::Output {
        &self.cells[self.index_of(coord)]
    }
}
