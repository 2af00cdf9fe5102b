use crossterm::style::{Color, Stylize};

use std::fmt;

/// Movement cost of every cell that is not a weight.
pub const BASE_COST: u32 = 1;
/// Movement cost of a weighted ("mud") cell.
pub const WEIGHT_COST: u32 = 5;

/// Logical type of a grid cell.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellType {
    #[default]
    Empty,
    Start,
    End,
    Wall,
    /// Expanded by a search. Keeps the cost the cell had before.
    Visited,
    /// Part of a found path. Keeps the cost the cell had before.
    Path,
    Weight,
}

impl CellType {
    /// The width of each cell when rendered, in character widths.
    pub const CELL_WIDTH: u16 = 2;

    /// Overlay types written by the search engines, removed by `Grid::clear_path`.
    pub fn is_search_overlay(self) -> bool {
        matches!(self, CellType::Visited | CellType::Path)
    }

    /// Cost assigned when a cell takes this type, `None` when the cost is kept.
    pub fn assigned_cost(self) -> Option<u32> {
        match self {
            CellType::Empty | CellType::Start | CellType::End | CellType::Wall => Some(BASE_COST),
            CellType::Visited | CellType::Path => None,
            CellType::Weight => Some(WEIGHT_COST),
        }
    }
}

/// One unit of the pathfinding grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub row: u16,
    pub col: u16,
    pub kind: CellType,
    pub cost: u32,
}

impl Cell {
    pub fn new(row: u16, col: u16) -> Self {
        Cell {
            row,
            col,
            kind: CellType::Empty,
            cost: BASE_COST,
        }
    }

    /// Whether the cell was a weight before a search painted over it.
    pub fn is_weighted(&self) -> bool {
        self.cost > BASE_COST
    }
}

impl fmt::Display for CellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let styled_symbol = match self {
            CellType::Empty => "  ".with(Color::Reset),
            CellType::Start => "🟩".with(Color::Green),
            CellType::End => "🟥".with(Color::Red),
            CellType::Wall => "⬜".with(Color::White),
            CellType::Visited => "* ".with(Color::Blue),
            CellType::Path => "🟨".with(Color::Yellow),
            CellType::Weight => "🟫".with(Color::DarkYellow),
        };

        #[cfg(debug_assertions)]
        {
            use unicode_width::UnicodeWidthStr;
            assert_eq!(
                styled_symbol.content().width(),
                CellType::CELL_WIDTH as usize,
                "Each cell must occupy exactly two character widths."
            );
        }

        write!(f, "{}", styled_symbol)
    }
}
