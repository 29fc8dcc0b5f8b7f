use std::fmt;

use super::player::PlayerId;

/// One board position: empty, or owned by the player who dropped a piece there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cell {
    occupant: Option<PlayerId>,
}

impl Cell {
    pub const EMPTY: Cell = Cell { occupant: None };

    /// Player owning this cell, if any
    pub fn occupant(self) -> Option<PlayerId> {
        self.occupant
    }

    pub fn is_occupied(self) -> bool {
        self.occupant.is_some()
    }

    pub fn is_owned_by(self, player: PlayerId) -> bool {
        self.occupant == Some(player)
    }
}

/// Column/row coordinates. Row 0 is the bottom of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub struct Position {
    pub col: usize,
    pub row: usize,
}

impl Position {
    pub fn new(col: usize, row: usize) -> Self {
        Position { col, row }
    }

    /// Step by `(dc, dr)`, or `None` when either coordinate would go negative
    fn offset(self, dc: isize, dr: isize) -> Option<Position> {
        Some(Position {
            col: self.col.checked_add_signed(dc)?,
            row: self.row.checked_add_signed(dr)?,
        })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

// Dimensions are runtime values, so cells live in a flat vec indexed row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Largest number of cells a board may hold
    pub const MAX_CELLS: usize = 1 << 20;

    /// Players `0..SYMBOLS` get a distinct character in [`Board`]'s `Display`
    pub const SYMBOLS: usize = 36;

    /// Create an empty `width` x `height` board. Both dimensions must be
    /// non-zero and the cell count at most [`Board::MAX_CELLS`].
    pub fn new(width: usize, height: usize) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        let len = width
            .checked_mul(height)
            .filter(|&len| len <= Self::MAX_CELLS)?;
        Some(Board {
            width,
            height,
            cells: vec![Cell::EMPTY; len],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Check that no piece has been placed yet
    pub fn is_clear(&self) -> bool {
        self.cells.iter().all(|c| !c.is_occupied())
    }

    /// Linear index of a position: `row * width + col`
    pub fn index_of(&self, pos: Position) -> Option<usize> {
        if pos.col < self.width && pos.row < self.height {
            Some(pos.row * self.width + pos.col)
        } else {
            None
        }
    }

    /// Inverse of [`Board::index_of`]
    pub fn position_of(&self, index: usize) -> Option<Position> {
        if index < self.cells.len() {
            Some(Position::new(index % self.width, index / self.width))
        } else {
            None
        }
    }

    /// Get the cell at `(col, row)`, or `None` if out of range
    pub fn get(&self, col: usize, row: usize) -> Option<Cell> {
        self.cell_at(Position::new(col, row))
    }

    pub fn cell_at(&self, pos: Position) -> Option<Cell> {
        self.index_of(pos).map(|i| self.cells[i])
    }

    /// Occupy `(col, row)` with `occupant`.
    ///
    /// Out-of-range coordinates are ignored, and so is a write to a cell that
    /// is already occupied. Returns whether the cell was written.
    pub fn set(&mut self, col: usize, row: usize, occupant: PlayerId) -> bool {
        let Some(index) = self.index_of(Position::new(col, row)) else {
            return false;
        };
        let cell = &mut self.cells[index];
        if cell.is_occupied() {
            return false;
        }
        cell.occupant = Some(occupant);
        true
    }

    /// Lowest empty row in `col`, scanning upward from row 0
    pub fn first_empty_in_column(&self, col: usize) -> Option<usize> {
        if col >= self.width {
            return None;
        }
        (0..self.height).find(|&row| !self.cells[row * self.width + col].is_occupied())
    }

    /// Position a piece dropped into `col` would land on
    pub fn drop_target(&self, col: usize) -> Option<Position> {
        self.first_empty_in_column(col)
            .map(|row| Position::new(col, row))
    }

    /// Check if a column is full. Out-of-range columns count as full.
    pub fn is_column_full(&self, col: usize) -> bool {
        self.first_empty_in_column(col).is_none()
    }

    /// Check if every cell is occupied
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| c.is_occupied())
    }

    /// Count consecutive cells owned by `owner`, walking from `from` by
    /// `(dc, dr)`. The starting cell itself is not counted.
    pub fn count_from(&self, from: Position, dc: isize, dr: isize, owner: PlayerId) -> usize {
        let mut count = 0;
        let mut pos = from;
        while let Some(next) = pos.offset(dc, dr) {
            match self.cell_at(next) {
                Some(cell) if cell.is_owned_by(owner) => {
                    count += 1;
                    pos = next;
                }
                _ => break,
            }
        }
        count
    }

    /// Iterate over every cell with its position, bottom row first
    pub fn cells(&self) -> impl Iterator<Item = (Position, Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &cell)| (Position::new(i % self.width, i / self.width), cell))
    }
}

/// Top row first, `.` for empty, the player index in base 36 for a piece.
/// Ids of [`Board::SYMBOLS`] and above have no digit and all show as `#`.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..self.height).rev() {
            for col in 0..self.width {
                let symbol = match self.cells[row * self.width + col].occupant() {
                    None => '.',
                    Some(id) => u32::try_from(id.index())
                        .ok()
                        .and_then(|digit| char::from_digit(digit, Self::SYMBOLS as u32))
                        .unwrap_or('#'),
                };
                write!(f, "{symbol}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
