//! Per-round binary occupancy grid handed over by the maze generator.

use glam::Vec2;
use thiserror::Error;

use crate::{CellCoord, Rect};

/// Traversability of a single maze cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellState {
    /// Agents may enter the cell.
    Free,
    /// The cell is a wall.
    Blocked,
}

/// Reasons an occupancy grid could not be constructed.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum GridError {
    /// Cell size must be a positive, finite number of pixels.
    #[error("cell size must be positive and finite, got {0}")]
    InvalidCellSize(f32),
    /// Every row must contain the same number of cells.
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        /// Zero-based index of the offending row.
        row: usize,
        /// Number of cells in the first row.
        expected: usize,
        /// Number of cells in the offending row.
        found: usize,
    },
    /// ASCII layouts only accept `#` for walls and `.` for open cells.
    #[error("unexpected character {character:?} at row {row}, column {column}")]
    UnknownCell {
        /// Character that could not be interpreted.
        character: char,
        /// Zero-based row of the character.
        row: usize,
        /// Zero-based column of the character.
        column: usize,
    },
    /// The grid does not fit the `u32` coordinate space.
    #[error("grid dimensions exceed the supported coordinate range")]
    TooLarge,
}

/// Immutable row-major matrix of cell states, fixed for one round.
///
/// The maze generator guarantees that the outer border is blocked; the grid
/// itself accepts any layout so that degenerate mazes degrade gracefully.
#[derive(Clone, Debug, PartialEq)]
pub struct OccupancyGrid {
    columns: u32,
    rows: u32,
    cell_size: f32,
    cells: Vec<CellState>,
}

impl OccupancyGrid {
    /// Builds a grid from rows of cell states indexed `[row][column]`.
    pub fn from_rows(rows: Vec<Vec<CellState>>, cell_size: f32) -> Result<Self, GridError> {
        if !cell_size.is_finite() || cell_size <= 0.0 {
            return Err(GridError::InvalidCellSize(cell_size));
        }

        let expected = rows.first().map_or(0, Vec::len);
        for (row, cells) in rows.iter().enumerate() {
            if cells.len() != expected {
                return Err(GridError::RaggedRow {
                    row,
                    expected,
                    found: cells.len(),
                });
            }
        }

        let columns = u32::try_from(expected).map_err(|_| GridError::TooLarge)?;
        let row_count = u32::try_from(rows.len()).map_err(|_| GridError::TooLarge)?;
        Ok(Self {
            columns,
            rows: row_count,
            cell_size,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    /// Parses a layout drawn with `#` for walls and `.` for open cells.
    ///
    /// Blank lines and surrounding whitespace are ignored.
    pub fn from_ascii(layout: &str, cell_size: f32) -> Result<Self, GridError> {
        let mut rows = Vec::new();
        for (row, line) in layout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .enumerate()
        {
            let cells = line
                .chars()
                .enumerate()
                .map(|(column, character)| match character {
                    '#' => Ok(CellState::Blocked),
                    '.' => Ok(CellState::Free),
                    _ => Err(GridError::UnknownCell {
                        character,
                        row,
                        column,
                    }),
                })
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(cells);
        }
        Self::from_rows(rows, cell_size)
    }

    /// Builds a grid of the given dimensions where every cell is free.
    pub fn open(columns: u32, rows: u32, cell_size: f32) -> Result<Self, GridError> {
        let width = usize::try_from(columns).map_err(|_| GridError::TooLarge)?;
        let height = usize::try_from(rows).map_err(|_| GridError::TooLarge)?;
        Self::from_rows(vec![vec![CellState::Free; width]; height], cell_size)
    }

    /// A grid without any cells, used before the first round starts.
    #[must_use]
    pub fn empty(cell_size: f32) -> Self {
        Self {
            columns: 0,
            rows: 0,
            cell_size,
            cells: Vec::new(),
        }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Edge length of a cell in pixels.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// State of the provided cell, or `None` when it lies outside the grid.
    #[must_use]
    pub fn state(&self, cell: CellCoord) -> Option<CellState> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Reports whether the cell lies inside the grid and is traversable.
    #[must_use]
    pub fn is_free(&self, cell: CellCoord) -> bool {
        self.state(cell) == Some(CellState::Free)
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Dense index of the cell in row-major order.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    /// Inverse of [`OccupancyGrid::index`].
    #[must_use]
    pub fn cell_at_index(&self, index: usize) -> Option<CellCoord> {
        let width = usize::try_from(self.columns).ok()?;
        if width == 0 || index >= self.cells.len() {
            return None;
        }
        let column = u32::try_from(index % width).ok()?;
        let row = u32::try_from(index / width).ok()?;
        Some(CellCoord::new(column, row))
    }

    /// Number of cells stored in the grid.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the grid has no cells at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Free cells in row-major scan order.
    pub fn free_cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.cells_with(CellState::Free)
    }

    /// Blocked cells in row-major scan order.
    pub fn blocked_cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.cells_with(CellState::Blocked)
    }

    /// Cell containing the provided pixel-space point, if it lies on the grid.
    #[must_use]
    pub fn cell_containing(&self, point: Vec2) -> Option<CellCoord> {
        CellCoord::containing(point, self.cell_size).filter(|cell| self.contains(*cell))
    }

    /// Pixel-space center of the provided cell.
    #[must_use]
    pub fn cell_center(&self, cell: CellCoord) -> Vec2 {
        cell.center(self.cell_size)
    }

    /// Pixel-space rectangle covered by the provided cell.
    #[must_use]
    pub fn cell_rect(&self, cell: CellCoord) -> Rect {
        let origin = Vec2::new(
            cell.column() as f32 * self.cell_size,
            cell.row() as f32 * self.cell_size,
        );
        Rect::from_min_size(origin, Vec2::splat(self.cell_size))
    }

    fn cells_with(&self, state: CellState) -> impl Iterator<Item = CellCoord> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(move |(_, cell)| **cell == state)
            .filter_map(|(index, _)| self.cell_at_index(index))
    }
}
