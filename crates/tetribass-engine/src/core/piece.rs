use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

use super::grid::BOARD_WIDTH;

/// Rotation state of a piece.
///
/// Cyclic modulo 4; `Up` is the spawn orientation. Clockwise order is
/// `Up, Right, Down, Left` and back around.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Rotation {
    #[default]
    Up = 0,
    Right = 1,
    Down = 2,
    Left = 3,
}

impl Rotation {
    #[must_use]
    pub const fn rotated_cw(self) -> Self {
        match self {
            Rotation::Up => Rotation::Right,
            Rotation::Right => Rotation::Down,
            Rotation::Down => Rotation::Left,
            Rotation::Left => Rotation::Up,
        }
    }

    /// Applies `quarter_turns` clockwise quarter turns, wrapping modulo 4.
    #[must_use]
    pub const fn turned(self, quarter_turns: u8) -> Self {
        let mut rotation = self;
        let mut remaining = quarter_turns % 4;
        while remaining > 0 {
            rotation = rotation.rotated_cw();
            remaining -= 1;
        }
        rotation
    }

    const fn as_usize(self) -> usize {
        self as usize
    }
}

/// Enum representing the type of piece.
///
/// The order fixes the snapshot color index: a locked cell of kind `k`
/// encodes as `k as u8 + 1`, so color codes run 1 (Square) through 7 (S).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// Square piece (2×2); all four rotation slots are identical.
    Square = 0,
    /// I-piece.
    I = 1,
    /// T-piece.
    T = 2,
    /// J-piece.
    J = 3,
    /// L-piece.
    L = 4,
    /// Z-piece.
    Z = 5,
    /// S-piece.
    S = 6,
}

impl Distribution<PieceKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceKind {
        match rng.random_range(0..=6) {
            0 => PieceKind::Square,
            1 => PieceKind::I,
            2 => PieceKind::T,
            3 => PieceKind::J,
            4 => PieceKind::L,
            5 => PieceKind::Z,
            _ => PieceKind::S,
        }
    }
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    /// Returns the piece's four cell offsets relative to its anchor for the
    /// given rotation.
    ///
    /// The anchor is the top-left corner of the piece's 4×4 bounding box.
    /// Offsets are ordered row-major, so the first entry is the
    /// uppermost(-then-leftmost) reference cell.
    #[must_use]
    pub const fn offsets(self, rotation: Rotation) -> [(i8, i8); 4] {
        PIECE_SHAPES[self as usize][rotation.as_usize()].offsets
    }

    /// Vertical offset from the anchor to the piece's topmost occupied cell.
    ///
    /// Used to seed the ghost-row estimate from the column caches.
    #[must_use]
    pub const fn top_offset(self, rotation: Rotation) -> i8 {
        PIECE_SHAPES[self as usize][rotation.as_usize()].top
    }

    /// Returns the single character representation of this piece kind.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::Square => 'O',
            PieceKind::I => 'I',
            PieceKind::T => 'T',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
            PieceKind::Z => 'Z',
            PieceKind::S => 'S',
        }
    }

    /// Parses a piece kind from a single character.
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'O' => Some(PieceKind::Square),
            'I' => Some(PieceKind::I),
            'T' => Some(PieceKind::T),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            'Z' => Some(PieceKind::Z),
            'S' => Some(PieceKind::S),
            _ => None,
        }
    }
}

/// The falling piece: kind, rotation, and anchor position on the board.
///
/// Coordinates are signed: `y < 0` cells legally sit above the visible board
/// during spawn and rotation near the top edge. Movement and rotation return
/// new values; validation happens in
/// [`Grid::is_valid_placement`](super::grid::Grid::is_valid_placement) before
/// a transform is committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivePiece {
    kind: PieceKind,
    rotation: Rotation,
    x: i16,
    y: i16,
}

impl ActivePiece {
    #[expect(clippy::cast_possible_truncation)]
    pub const SPAWN_X: i16 = (BOARD_WIDTH as i16) / 2 - 2;
    pub const SPAWN_Y: i16 = 0;

    /// Creates a piece at the spawn anchor in the default rotation.
    #[must_use]
    pub const fn spawn(kind: PieceKind) -> Self {
        Self {
            kind,
            rotation: Rotation::Up,
            x: Self::SPAWN_X,
            y: Self::SPAWN_Y,
        }
    }

    #[must_use]
    pub const fn kind(self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub const fn rotation(self) -> Rotation {
        self.rotation
    }

    #[must_use]
    pub const fn x(self) -> i16 {
        self.x
    }

    #[must_use]
    pub const fn y(self) -> i16 {
        self.y
    }

    #[must_use]
    pub const fn shifted(self, dx: i16) -> Self {
        Self {
            x: self.x + dx,
            ..self
        }
    }

    #[must_use]
    pub const fn dropped(self, dy: i16) -> Self {
        Self {
            y: self.y + dy,
            ..self
        }
    }

    #[must_use]
    pub const fn at_y(self, y: i16) -> Self {
        Self { y, ..self }
    }

    #[must_use]
    pub const fn rotated_cw(self) -> Self {
        Self {
            rotation: self.rotation.rotated_cw(),
            ..self
        }
    }

    /// Iterates the absolute board coordinates of the piece's four cells.
    pub fn cells(self) -> impl Iterator<Item = (i16, i16)> {
        self.kind
            .offsets(self.rotation)
            .into_iter()
            .map(move |(dx, dy)| (self.x + i16::from(dx), self.y + i16::from(dy)))
    }
}

/// Piece footprint within its 4×4 bounding box: the four cell offsets plus
/// the cached anchor-to-topmost-cell distance.
#[derive(Debug, Clone, Copy)]
struct PieceShape {
    offsets: [(i8, i8); 4],
    top: i8,
}

type ShapeMask = [[bool; 4]; 4];

/// Generates all 4 rotation states of a shape mask by rotating 90° clockwise.
///
/// # Arguments
///
/// * `size` - Effective size of the piece (3 for most pieces, 4 for I, 2 for Square)
/// * `mask` - Initial shape mask at spawn rotation
const fn mask_rotations(size: usize, mask: ShapeMask) -> [ShapeMask; 4] {
    let mut rotates = [mask; 4];
    let mut i = 1;
    while i < 4 {
        let mut new_mask = [[false; 4]; 4];
        let mut y = 0;
        while y < size {
            let mut x = 0;
            while x < size {
                new_mask[y][x] = rotates[i - 1][size - 1 - x][y];
                x += 1;
            }
            y += 1;
        }
        rotates[i] = new_mask;
        i += 1;
    }
    rotates
}

/// Extracts the ordered offset list (row-major) and top offset from a mask.
#[expect(clippy::cast_possible_truncation)]
const fn shape_of(mask: &ShapeMask) -> PieceShape {
    let mut offsets = [(0i8, 0i8); 4];
    let mut count = 0;
    let mut y = 0;
    while y < 4 {
        let mut x = 0;
        while x < 4 {
            if mask[y][x] {
                assert!(count < 4, "piece mask must have exactly 4 cells");
                offsets[count] = (x as i8, y as i8);
                count += 1;
            }
            x += 1;
        }
        y += 1;
    }
    assert!(count == 4, "piece mask must have exactly 4 cells");
    PieceShape {
        offsets,
        top: offsets[0].1,
    }
}

const fn shapes_of(masks: [ShapeMask; 4]) -> [PieceShape; 4] {
    [
        shape_of(&masks[0]),
        shape_of(&masks[1]),
        shape_of(&masks[2]),
        shape_of(&masks[3]),
    ]
}

const PIECE_SHAPES: [[PieceShape; 4]; PieceKind::LEN] = {
    const C: bool = true;
    const E: bool = false;
    const EEEE: [bool; 4] = [E; 4];

    [
        // Square
        shapes_of(mask_rotations(2, [[C, C, E, E], [C, C, E, E], EEEE, EEEE])),
        // I-piece
        shapes_of(mask_rotations(4, [EEEE, [C, C, C, C], EEEE, EEEE])),
        // T-piece
        shapes_of(mask_rotations(3, [[E, C, E, E], [C, C, C, E], EEEE, EEEE])),
        // J-piece
        shapes_of(mask_rotations(3, [[C, E, E, E], [C, C, C, E], EEEE, EEEE])),
        // L-piece
        shapes_of(mask_rotations(3, [[E, E, C, E], [C, C, C, E], EEEE, EEEE])),
        // Z-piece
        shapes_of(mask_rotations(3, [[C, C, E, E], [E, C, C, E], EEEE, EEEE])),
        // S-piece
        shapes_of(mask_rotations(3, [[E, C, C, E], [C, C, E, E], EEEE, EEEE])),
    ]
};
