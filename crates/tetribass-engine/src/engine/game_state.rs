use arrayvec::ArrayVec;
use rand::Rng as _;

use crate::{
    HoldError, PieceCollisionError,
    core::{
        ghost::ghost_row,
        grid::{BOARD_HEIGHT, Cell, ClearRecord, Grid},
        piece::{ActivePiece, PieceKind},
    },
};

use super::{
    game_stats::GameStats,
    spawn_queue::{QueueSeed, SpawnQueue},
};

/// A single gameplay input for [`GameState::step`].
///
/// The gravity tick is delivered as `SoftDrop`; session-level commands
/// (pause, restart) never reach the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    RotateCw,
    SoftDrop,
    HardDrop,
    Hold,
}

/// The board-state machine: one `step` per command or gravity tick.
///
/// Every transition runs to completion over the single authoritative grid:
/// erase the active footprint (piece and stamped ghost), decide against the
/// clean cells, re-stamp. Blocked drops lock the piece, clear complete rows,
/// and seed the replacement within the same `step` invocation, so a lock
/// never costs a visible frame. Invalid moves are silently discarded; game
/// over is a terminal flag, not an error.
#[derive(Debug, Clone)]
pub struct GameState {
    grid: Grid,
    active: ActivePiece,
    /// Anchor row of the ghost as last stamped; erasing uses this rather
    /// than recomputing, because the stamped piece would collide with
    /// itself.
    ghost_y: i16,
    queue: SpawnQueue,
    hold_used: bool,
    needs_spawn_seed: bool,
    game_over: bool,
    stats: GameStats,
    last_clears: ArrayVec<ClearRecord, BOARD_HEIGHT>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific queue seed for deterministic
    /// piece sequences.
    #[must_use]
    pub fn with_seed(seed: QueueSeed) -> Self {
        let mut queue = SpawnQueue::with_seed(seed);
        let active = ActivePiece::spawn(queue.take_next());
        Self {
            grid: Grid::EMPTY,
            active,
            ghost_y: active.y(),
            queue,
            hold_used: false,
            needs_spawn_seed: true,
            game_over: false,
            stats: GameStats::new(),
            last_clears: ArrayVec::new(),
        }
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub fn active_piece(&self) -> ActivePiece {
        self.active
    }

    #[must_use]
    pub fn held_piece(&self) -> Option<PieceKind> {
        self.queue.held_piece()
    }

    pub fn upcoming_pieces(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.queue.upcoming()
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Clear records from the most recent lock (empty when it cleared
    /// nothing).
    #[must_use]
    pub fn last_clears(&self) -> &[ClearRecord] {
        &self.last_clears
    }

    /// Applies one command or gravity tick.
    ///
    /// The first step after a new game only stamps the freshly spawned piece
    /// and its ghost, a pure render-seed step with no movement.
    pub fn step(&mut self, action: Action) {
        if self.game_over {
            return;
        }
        if self.needs_spawn_seed {
            self.stamp_active();
            self.needs_spawn_seed = false;
            return;
        }

        self.erase_active();
        let mut lock = false;
        match action {
            Action::MoveLeft => self.try_shift(-1),
            Action::MoveRight => self.try_shift(1),
            Action::RotateCw => self.try_rotate_cw(),
            Action::SoftDrop => lock = !self.try_drop(),
            Action::HardDrop => {
                self.active = self.active.at_y(ghost_row(&self.grid, self.active));
                lock = true;
            }
            Action::Hold => {
                // An exhausted or blocked hold keeps the current piece.
                let _ = self.try_hold();
            }
        }
        if lock {
            self.lock_active();
        } else {
            self.stamp_active();
        }
    }

    fn try_shift(&mut self, dx: i16) {
        if self.grid.is_valid_placement(self.active, dx, 0, 0) {
            self.active = self.active.shifted(dx);
        }
    }

    fn try_rotate_cw(&mut self) {
        if self.grid.is_valid_placement(self.active, 0, 0, 1) {
            self.active = self.active.rotated_cw();
        }
    }

    /// Returns `false` when the downward move was blocked, which locks the
    /// piece.
    fn try_drop(&mut self) -> bool {
        if self.grid.is_valid_placement(self.active, 0, 1, 0) {
            self.active = self.active.dropped(1);
            true
        } else {
            false
        }
    }

    fn try_hold(&mut self) -> Result<(), HoldError> {
        if self.hold_used {
            return Err(HoldError::HoldAlreadyUsed);
        }
        let incoming = self.queue.peek_hold_result();
        if !self
            .grid
            .is_valid_placement(ActivePiece::spawn(incoming), 0, 0, 0)
        {
            return Err(HoldError::PieceCollision(PieceCollisionError));
        }
        let incoming = self.queue.swap_hold(self.active.kind());
        self.active = ActivePiece::spawn(incoming);
        self.hold_used = true;
        Ok(())
    }

    /// Stamps ghost then piece; the piece wins overlapping cells. Rows above
    /// the board are not stored.
    fn stamp_active(&mut self) {
        self.ghost_y = ghost_row(&self.grid, self.active);
        self.fill_cells(self.active.at_y(self.ghost_y), Cell::Ghost);
        self.fill_cells(self.active, Cell::Piece(self.active.kind()));
    }

    fn erase_active(&mut self) {
        self.fill_cells(self.active, Cell::Empty);
        self.fill_cells(self.active.at_y(self.ghost_y), Cell::Empty);
    }

    fn fill_cells(&mut self, piece: ActivePiece, cell: Cell) {
        for (x, y) in piece.cells() {
            if y >= 0 {
                #[expect(clippy::cast_sign_loss)]
                let (x, y) = (x as usize, y as usize);
                self.grid.set_cell(x, y, cell);
            }
        }
    }

    /// Locks the resting piece: permanent stamp, clear and compact, stats,
    /// next spawn. The replacement seeds within the same step, unless its
    /// spawn cells are already occupied, which is the terminal condition.
    fn lock_active(&mut self) {
        self.fill_cells(self.active, Cell::Piece(self.active.kind()));
        let records = self.grid.clear_full_rows();
        self.stats.record_lock(records.len());
        self.last_clears = records;
        self.hold_used = false;

        self.active = ActivePiece::spawn(self.queue.take_next());
        self.ghost_y = self.active.y();
        if !self.grid.is_valid_placement(self.active, 0, 0, 0) {
            self.game_over = true;
            return;
        }
        self.stamp_active();
    }

    /// Raises `count` garbage rows from the floor, each with a hole at
    /// `hole_x`. The active piece rides up with the stack if it would
    /// otherwise overlap; a piece pushed out through the top ends the game.
    pub fn add_garbage_rows(&mut self, count: usize, hole_x: usize) {
        if self.game_over {
            return;
        }
        let seeded = !self.needs_spawn_seed;
        if seeded {
            self.erase_active();
        }
        for _ in 0..count {
            self.grid.push_garbage_row(hole_x);
        }
        let mut lifts = count;
        while !self.grid.is_valid_placement(self.active, 0, 0, 0) {
            if lifts == 0 {
                self.game_over = true;
                return;
            }
            self.active = self.active.at_y(self.active.y() - 1);
            lifts -= 1;
        }
        if seeded {
            self.stamp_active();
        }
    }
}
