use arrayvec::ArrayVec;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::piece::{ActivePiece, PieceKind};

pub const BOARD_WIDTH: usize = 10;
pub const BOARD_HEIGHT: usize = 20;

#[expect(clippy::cast_possible_truncation)]
const WIDTH: i16 = BOARD_WIDTH as i16;

#[expect(clippy::cast_possible_truncation)]
const HEIGHT: i16 = BOARD_HEIGHT as i16;

/// A cleared row's dominant cell type counts as critical from this share of
/// the row.
const CRITICAL_DOMINANCE: usize = BOARD_WIDTH / 2;

/// A single cell in the board grid.
///
/// `Ghost` marks the drop preview, `Grey` fills garbage rows; both count as
/// occupied for collision and line completion. Cells serialize as their u8
/// color code: 0 empty, 1..=7 locked piece kinds, 8 ghost, 9 grey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum Cell {
    #[default]
    Empty,
    Ghost,
    Grey,
    Piece(PieceKind),
}

impl Cell {
    pub const GHOST_CODE: u8 = 8;
    pub const GREY_CODE: u8 = 9;

    #[must_use]
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Cell::Empty => 0,
            Cell::Ghost => Self::GHOST_CODE,
            Cell::Grey => Self::GREY_CODE,
            Cell::Piece(kind) => kind as u8 + 1,
        }
    }

    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Cell::Empty),
            Self::GHOST_CODE => Some(Cell::Ghost),
            Self::GREY_CODE => Some(Cell::Grey),
            1 => Some(Cell::Piece(PieceKind::Square)),
            2 => Some(Cell::Piece(PieceKind::I)),
            3 => Some(Cell::Piece(PieceKind::T)),
            4 => Some(Cell::Piece(PieceKind::J)),
            5 => Some(Cell::Piece(PieceKind::L)),
            6 => Some(Cell::Piece(PieceKind::Z)),
            7 => Some(Cell::Piece(PieceKind::S)),
            _ => None,
        }
    }
}

impl Serialize for Cell {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let code = u8::deserialize(deserializer)?;
        Cell::from_code(code)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid cell code: {code}")))
    }
}

/// One board column: its cells top-to-bottom plus the cached row index of the
/// topmost occupied cell.
///
/// The cache defaults to `BOARD_HEIGHT - 1` (the floor) for an empty column.
/// It is tightened whenever a non-empty cell is written above it and bulk
/// adjusted after line clears; erasing a cell never relaxes it, so the cache
/// may sit above the true stack. The ghost projection tolerates that
/// staleness by refining its estimate against the live cells.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Column {
    cells: [Cell; BOARD_HEIGHT],
    lowest_occupied: usize,
}

impl Column {
    const EMPTY: Self = Self {
        cells: [Cell::Empty; BOARD_HEIGHT],
        lowest_occupied: BOARD_HEIGHT - 1,
    };

    fn recompute_lowest(&mut self) {
        self.lowest_occupied = self
            .cells
            .iter()
            .position(|cell| !cell.is_empty())
            .unwrap_or(BOARD_HEIGHT - 1);
    }
}

/// The board: `BOARD_WIDTH` columns of `BOARD_HEIGHT` cells, row 0 at the top.
///
/// Single-writer: the engine erases the active footprint, decides, and
/// re-stamps within one transition; renderers only ever see an owned
/// snapshot copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    columns: [Column; BOARD_WIDTH],
}

impl Default for Grid {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Grid {
    pub const EMPTY: Self = Self {
        columns: [Column::EMPTY; BOARD_WIDTH],
    };

    /// Returns the cell at `(x, y)`.
    ///
    /// Out-of-range coordinates are a caller contract violation; callers
    /// validate candidate positions through [`Self::is_valid_placement`]
    /// first.
    #[must_use]
    pub fn cell(&self, x: usize, y: usize) -> Cell {
        debug_assert!(x < BOARD_WIDTH && y < BOARD_HEIGHT);
        self.columns[x].cells[y]
    }

    pub fn set_cell(&mut self, x: usize, y: usize, cell: Cell) {
        debug_assert!(x < BOARD_WIDTH && y < BOARD_HEIGHT);
        let column = &mut self.columns[x];
        column.cells[y] = cell;
        if !cell.is_empty() && y < column.lowest_occupied {
            column.lowest_occupied = y;
        }
    }

    /// Cached topmost occupied row of column `x` (`BOARD_HEIGHT - 1` when the
    /// column is empty).
    #[must_use]
    pub fn lowest_occupied(&self, x: usize) -> usize {
        debug_assert!(x < BOARD_WIDTH);
        self.columns[x].lowest_occupied
    }

    /// Validates a candidate placement of `piece` displaced by `(dx, dy)` and
    /// rotated by `quarter_turns` clockwise quarter turns.
    ///
    /// Every cell must stay within the horizontal bounds. Cells at `y >= 0`
    /// must additionally sit above the floor and land on an empty cell;
    /// cells above the board (`y < 0`) are exempt, which lets pieces legally
    /// overhang the top edge during spawn. Short-circuits on the first
    /// violation and has no side effects.
    #[must_use]
    pub fn is_valid_placement(
        &self,
        piece: ActivePiece,
        dx: i16,
        dy: i16,
        quarter_turns: u8,
    ) -> bool {
        let rotation = piece.rotation().turned(quarter_turns);
        for (ox, oy) in piece.kind().offsets(rotation) {
            let x = piece.x() + dx + i16::from(ox);
            let y = piece.y() + dy + i16::from(oy);
            if x < 0 || x >= WIDTH {
                return false;
            }
            if y >= 0 {
                if y >= HEIGHT {
                    return false;
                }
                #[expect(clippy::cast_sign_loss)]
                let (x, y) = (x as usize, y as usize);
                if !self.cell(x, y).is_empty() {
                    return false;
                }
            }
        }
        true
    }

    fn row_is_full(&self, y: usize) -> bool {
        self.columns.iter().all(|column| !column.cells[y].is_empty())
    }

    fn row_cells(&self, y: usize) -> [Cell; BOARD_WIDTH] {
        let mut row = [Cell::Empty; BOARD_WIDTH];
        for (cell, column) in row.iter_mut().zip(&self.columns) {
            *cell = column.cells[y];
        }
        row
    }

    /// Clears every complete row and compacts the stack.
    ///
    /// Rows are scanned bottom-up; after a clear the rows above shift down by
    /// one, row 0 empties, and the same physical row is re-examined before
    /// the scan continues upward. Column caches are then bumped one row per
    /// clear (columns already at the floor stay put). Invoking this when no
    /// row is complete changes nothing.
    pub fn clear_full_rows(&mut self) -> ArrayVec<ClearRecord, BOARD_HEIGHT> {
        let mut records = ArrayVec::new();
        let mut y = BOARD_HEIGHT;
        while y > 0 {
            let row = y - 1;
            if self.row_is_full(row) {
                records.push(ClearRecord::for_row(row, self.row_cells(row)));
                self.shift_down_onto(row);
            } else {
                y -= 1;
            }
        }
        if !records.is_empty() {
            for column in &mut self.columns {
                column.lowest_occupied =
                    usize::min(column.lowest_occupied + records.len(), BOARD_HEIGHT - 1);
            }
        }
        records
    }

    fn shift_down_onto(&mut self, row: usize) {
        for column in &mut self.columns {
            for r in (1..=row).rev() {
                column.cells[r] = column.cells[r - 1];
            }
            column.cells[0] = Cell::Empty;
        }
    }

    /// Inserts a `Grey` garbage row at the bottom with a single hole,
    /// shifting the whole stack up by one. The topmost row falls off.
    ///
    /// Column caches are recomputed exactly here; garbage insertion is a bulk
    /// mutation outside the tighten-only `set_cell` path.
    pub fn push_garbage_row(&mut self, hole_x: usize) {
        debug_assert!(hole_x < BOARD_WIDTH);
        for (x, column) in self.columns.iter_mut().enumerate() {
            for r in 0..BOARD_HEIGHT - 1 {
                column.cells[r] = column.cells[r + 1];
            }
            column.cells[BOARD_HEIGHT - 1] = if x == hole_x { Cell::Empty } else { Cell::Grey };
            column.recompute_lowest();
        }
    }
}

/// Most frequent cell type within a cleared row and how many cells it held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Damage {
    pub dominant: Cell,
    pub value: usize,
}

/// Transient description of one cleared row, produced at lock time and
/// surfaced through the snapshot; never stored back into the grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearRecord {
    pub row: usize,
    pub cells: [Cell; BOARD_WIDTH],
    pub critical: bool,
    pub damage: Damage,
}

impl ClearRecord {
    fn for_row(row: usize, cells: [Cell; BOARD_WIDTH]) -> Self {
        let mut counts = [0usize; 10];
        for cell in &cells {
            counts[usize::from(cell.code())] += 1;
        }
        // Complete rows contain no empty cells; ties keep the lowest code.
        let mut dominant_code = 1u8;
        for code in 2..=Cell::GREY_CODE {
            if counts[usize::from(code)] > counts[usize::from(dominant_code)] {
                dominant_code = code;
            }
        }
        let value = counts[usize::from(dominant_code)];
        let dominant = Cell::from_code(dominant_code).expect("dominant code is a valid cell code");
        Self {
            row,
            cells,
            critical: value >= CRITICAL_DOMINANCE,
            damage: Damage { dominant, value },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::piece::Rotation;

    fn piece_at(kind: PieceKind, x: i16, y: i16) -> ActivePiece {
        ActivePiece::spawn(kind).shifted(x - ActivePiece::SPAWN_X).at_y(y)
    }

    fn fill_row(grid: &mut Grid, y: usize, kind: PieceKind) {
        for x in 0..BOARD_WIDTH {
            grid.set_cell(x, y, Cell::Piece(kind));
        }
    }

    #[test]
    fn test_empty_grid_caches_point_at_the_floor() {
        let grid = Grid::EMPTY;
        for x in 0..BOARD_WIDTH {
            assert_eq!(grid.lowest_occupied(x), BOARD_HEIGHT - 1);
            for y in 0..BOARD_HEIGHT {
                assert!(grid.cell(x, y).is_empty());
            }
        }
    }

    #[test]
    fn test_set_cell_tightens_cache_but_erase_never_relaxes_it() {
        let mut grid = Grid::EMPTY;
        grid.set_cell(4, 15, Cell::Piece(PieceKind::T));
        assert_eq!(grid.lowest_occupied(4), 15);

        grid.set_cell(4, 10, Cell::Ghost);
        assert_eq!(grid.lowest_occupied(4), 10);

        // Writing below the cache leaves it alone.
        grid.set_cell(4, 18, Cell::Piece(PieceKind::I));
        assert_eq!(grid.lowest_occupied(4), 10);

        // Erasing leaves the cache stale on purpose.
        grid.set_cell(4, 10, Cell::Empty);
        assert_eq!(grid.lowest_occupied(4), 10);
    }

    #[test]
    fn test_is_valid_placement_rejects_out_of_bounds_and_occupied() {
        let mut grid = Grid::EMPTY;

        // Horizontal I at the left wall: one more step left leaves the board.
        let i_piece = piece_at(PieceKind::I, 0, 0);
        assert!(grid.is_valid_placement(i_piece, 0, 0, 0));
        assert!(!grid.is_valid_placement(i_piece, -1, 0, 0));

        // Right wall.
        let i_right = piece_at(PieceKind::I, 6, 0);
        assert!(grid.is_valid_placement(i_right, 0, 0, 0));
        assert!(!grid.is_valid_placement(i_right, 1, 0, 0));

        // Floor: I cells sit on box row 1, so anchor 18 puts them at row 19.
        let resting = piece_at(PieceKind::I, 3, 18);
        assert!(grid.is_valid_placement(resting, 0, 0, 0));
        assert!(!grid.is_valid_placement(resting, 0, 1, 0));

        // Occupied cell.
        grid.set_cell(4, 10, Cell::Piece(PieceKind::S));
        let blocked = piece_at(PieceKind::I, 3, 9);
        assert!(!grid.is_valid_placement(blocked, 0, 0, 0));
        assert!(grid.is_valid_placement(blocked, 0, -1, 0));
    }

    #[test]
    fn test_cells_above_the_board_are_exempt_from_occupancy() {
        let grid = Grid::EMPTY;
        // Vertical I with most cells above the top edge.
        let piece = piece_at(PieceKind::I, 3, -3).rotated_cw();
        assert!(grid.is_valid_placement(piece, 0, 0, 0));
        // Horizontal bounds still apply above the board.
        assert!(!grid.is_valid_placement(piece, -6, 0, 0));
    }

    #[test]
    fn test_rotation_delta_is_applied_before_validation() {
        let grid = Grid::EMPTY;
        // Horizontal I against the right wall cannot rotate in place, but
        // the same anchor is fine for the vertical form near the left wall.
        let piece = piece_at(PieceKind::I, 6, 0);
        assert!(grid.is_valid_placement(piece, 0, 0, 1));
        let wall_hugger = piece_at(PieceKind::I, 7, 0).rotated_cw();
        assert!(grid.is_valid_placement(wall_hugger, 0, 0, 0));
        assert!(!grid.is_valid_placement(wall_hugger, 0, 0, 1));
    }

    #[test]
    fn test_clear_single_bottom_row_shifts_stack_down() {
        let mut grid = Grid::EMPTY;
        fill_row(&mut grid, BOARD_HEIGHT - 1, PieceKind::I);
        // A marker on the row above must land on the bottom row.
        grid.set_cell(2, BOARD_HEIGHT - 2, Cell::Piece(PieceKind::T));

        let records = grid.clear_full_rows();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].row, BOARD_HEIGHT - 1);

        assert_eq!(grid.cell(2, BOARD_HEIGHT - 1), Cell::Piece(PieceKind::T));
        for x in 0..BOARD_WIDTH {
            if x != 2 {
                assert!(grid.cell(x, BOARD_HEIGHT - 1).is_empty());
            }
            assert!(grid.cell(x, 0).is_empty());
        }
    }

    #[test]
    fn test_clear_rescans_the_same_row_for_stacked_clears() {
        let mut grid = Grid::EMPTY;
        fill_row(&mut grid, BOARD_HEIGHT - 1, PieceKind::I);
        fill_row(&mut grid, BOARD_HEIGHT - 2, PieceKind::Z);
        fill_row(&mut grid, BOARD_HEIGHT - 3, PieceKind::L);

        let records = grid.clear_full_rows();
        assert_eq!(records.len(), 3);
        // All three clears happen at the same physical row index.
        assert!(records.iter().all(|r| r.row == BOARD_HEIGHT - 1));
        for x in 0..BOARD_WIDTH {
            for y in 0..BOARD_HEIGHT {
                assert!(grid.cell(x, y).is_empty());
            }
        }
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut grid = Grid::EMPTY;
        fill_row(&mut grid, BOARD_HEIGHT - 1, PieceKind::I);
        grid.set_cell(0, BOARD_HEIGHT - 2, Cell::Piece(PieceKind::J));

        assert_eq!(grid.clear_full_rows().len(), 1);
        let after_first = grid.clone();
        assert!(grid.clear_full_rows().is_empty());
        assert_eq!(grid, after_first);
    }

    #[test]
    fn test_clear_bumps_caches_one_row_per_clear() {
        let mut grid = Grid::EMPTY;
        fill_row(&mut grid, BOARD_HEIGHT - 1, PieceKind::I);
        fill_row(&mut grid, BOARD_HEIGHT - 2, PieceKind::S);
        grid.set_cell(0, BOARD_HEIGHT - 3, Cell::Piece(PieceKind::J));
        assert_eq!(grid.lowest_occupied(0), BOARD_HEIGHT - 3);
        assert_eq!(grid.lowest_occupied(1), BOARD_HEIGHT - 2);

        grid.clear_full_rows();
        // Column 0 kept its survivor, shifted down two rows.
        assert_eq!(grid.lowest_occupied(0), BOARD_HEIGHT - 1);
        assert_eq!(grid.cell(0, BOARD_HEIGHT - 1), Cell::Piece(PieceKind::J));
        // Emptied columns saturate at the floor.
        assert_eq!(grid.lowest_occupied(1), BOARD_HEIGHT - 1);
    }

    #[test]
    fn test_incomplete_rows_do_not_clear() {
        let mut grid = Grid::EMPTY;
        for x in 0..BOARD_WIDTH - 1 {
            grid.set_cell(x, BOARD_HEIGHT - 1, Cell::Piece(PieceKind::I));
        }
        assert!(grid.clear_full_rows().is_empty());
        assert_eq!(grid.cell(0, BOARD_HEIGHT - 1), Cell::Piece(PieceKind::I));
    }

    #[test]
    fn test_clear_record_damage_and_criticality() {
        let mut grid = Grid::EMPTY;
        for x in 0..BOARD_WIDTH {
            let kind = if x < 6 { PieceKind::Z } else { PieceKind::T };
            grid.set_cell(x, BOARD_HEIGHT - 1, Cell::Piece(kind));
        }
        let records = grid.clear_full_rows();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.damage.dominant, Cell::Piece(PieceKind::Z));
        assert_eq!(record.damage.value, 6);
        assert!(record.critical);
        assert_eq!(record.cells[0], Cell::Piece(PieceKind::Z));
        assert_eq!(record.cells[9], Cell::Piece(PieceKind::T));
    }

    #[test]
    fn test_clear_record_below_dominance_threshold_is_not_critical() {
        let mut grid = Grid::EMPTY;
        let kinds = [
            PieceKind::Square,
            PieceKind::I,
            PieceKind::T,
            PieceKind::J,
            PieceKind::L,
            PieceKind::Z,
            PieceKind::S,
            PieceKind::Square,
            PieceKind::I,
            PieceKind::T,
        ];
        for (x, kind) in kinds.into_iter().enumerate() {
            grid.set_cell(x, BOARD_HEIGHT - 1, Cell::Piece(kind));
        }
        let records = grid.clear_full_rows();
        assert_eq!(records[0].damage.value, 2);
        assert!(!records[0].critical);
    }

    #[test]
    fn test_push_garbage_row_inserts_grey_with_a_hole() {
        let mut grid = Grid::EMPTY;
        grid.set_cell(0, BOARD_HEIGHT - 1, Cell::Piece(PieceKind::I));
        grid.push_garbage_row(3);

        assert_eq!(grid.cell(0, BOARD_HEIGHT - 2), Cell::Piece(PieceKind::I));
        for x in 0..BOARD_WIDTH {
            let bottom = grid.cell(x, BOARD_HEIGHT - 1);
            if x == 3 {
                assert!(bottom.is_empty());
            } else {
                assert_eq!(bottom, Cell::Grey);
            }
        }
        // Caches are exact after the bulk recompute.
        assert_eq!(grid.lowest_occupied(0), BOARD_HEIGHT - 2);
        assert_eq!(grid.lowest_occupied(1), BOARD_HEIGHT - 1);
        assert_eq!(grid.lowest_occupied(3), BOARD_HEIGHT - 1);
        assert!(grid.cell(3, BOARD_HEIGHT - 1).is_empty());
    }

    #[test]
    fn test_garbage_rows_complete_and_clear_like_any_other() {
        let mut grid = Grid::EMPTY;
        grid.push_garbage_row(0);
        grid.set_cell(0, BOARD_HEIGHT - 1, Cell::Piece(PieceKind::I));
        let records = grid.clear_full_rows();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].damage.dominant, Cell::Grey);
        assert_eq!(records[0].damage.value, BOARD_WIDTH - 1);
    }

    #[test]
    fn test_cell_code_round_trip() {
        for code in 0..=9 {
            let cell = Cell::from_code(code).unwrap();
            assert_eq!(cell.code(), code);
        }
        assert_eq!(Cell::from_code(10), None);
        assert_eq!(Cell::Piece(PieceKind::Square).code(), 1);
        assert_eq!(Cell::Piece(PieceKind::S).code(), 7);
        assert_eq!(Cell::Ghost.code(), 8);
        assert_eq!(Cell::Grey.code(), 9);
    }

    #[test]
    fn test_cell_serde_uses_color_codes() {
        let serialized = serde_json::to_string(&Cell::Piece(PieceKind::T)).unwrap();
        assert_eq!(serialized, "3");
        let cell: Cell = serde_json::from_str("8").unwrap();
        assert_eq!(cell, Cell::Ghost);
        assert!(serde_json::from_str::<Cell>("42").is_err());
    }

    #[test]
    fn test_rotation_survives_round_trip_through_placement() {
        // `quarter_turns` only rotates the candidate; the piece is unchanged.
        let grid = Grid::EMPTY;
        let piece = piece_at(PieceKind::T, 4, 5);
        assert!(grid.is_valid_placement(piece, 0, 0, 3));
        assert_eq!(piece.rotation(), Rotation::Up);
    }
}
