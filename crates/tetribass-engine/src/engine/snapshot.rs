use serde::Serialize;

use crate::core::{
    grid::{BOARD_HEIGHT, BOARD_WIDTH, ClearRecord},
    piece::PieceKind,
};

use super::game_state::GameState;

/// Owned copy of everything a renderer needs for one frame.
///
/// The live grid never leaves the engine; this copy is produced per request
/// and is safe to ship across threads or a wire. Board cells carry the u8
/// color codes (0 empty, 1..=7 locked kinds, 8 ghost, 9 grey), row 0 first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSnapshot {
    pub board: [[u8; BOARD_WIDTH]; BOARD_HEIGHT],
    pub held: Option<PieceKind>,
    pub queue: Vec<PieceKind>,
    pub score: usize,
    pub level: usize,
    pub tile_count: usize,
    pub game_over: bool,
    pub last_clears: Vec<ClearRecord>,
}

impl GameSnapshot {
    pub(crate) fn capture(state: &GameState) -> Self {
        let mut board = [[0u8; BOARD_WIDTH]; BOARD_HEIGHT];
        for (y, row) in board.iter_mut().enumerate() {
            for (x, cell) in row.iter_mut().enumerate() {
                *cell = state.grid().cell(x, y).code();
            }
        }
        Self {
            board,
            held: state.held_piece(),
            queue: state.upcoming_pieces().collect(),
            score: state.stats().score(),
            level: state.stats().level(),
            tile_count: state.stats().tile_count(),
            game_over: state.is_game_over(),
            last_clears: state.last_clears().to_vec(),
        }
    }
}
