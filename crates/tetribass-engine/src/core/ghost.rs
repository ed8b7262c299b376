use super::{grid::Grid, piece::ActivePiece};

/// Computes the anchor row the piece would occupy after an immediate hard
/// drop, without mutating the grid.
///
/// Two strategies live behind this one function and callers cannot tell
/// which ran:
///
/// - When the piece already has a cell below some spanned column's cached
///   `lowest_occupied` row, that cache is stale relative to the live piece
///   (the piece sits inside or beneath the cached floor) and the resting row
///   is found by walking the piece down cell by cell.
/// - Otherwise the caches give a candidate row directly: one above the
///   highest cached stack across the spanned columns, shifted by the piece's
///   anchor-to-top offset. The candidate is then refined locally: descended
///   while the next row down is still valid (notches, caches tightened by a
///   previous stamp), or walked back up if the estimate landed inside the
///   stack.
///
/// Both strategies converge to the same row whenever the piece's current
/// position is itself valid; `tests::ghost_matches_drop_scan_on_random_boards`
/// checks that equivalence.
#[must_use]
pub fn ghost_row(grid: &Grid, piece: ActivePiece) -> i16 {
    if cache_is_stale(grid, piece) {
        return drop_scan(grid, piece);
    }

    let min_cached = piece
        .cells()
        .map(|(x, _)| {
            #[expect(clippy::cast_sign_loss)]
            let x = x as usize;
            cached_row(grid, x)
        })
        .min()
        .expect("a piece always has cells");

    let top = i16::from(piece.kind().top_offset(piece.rotation()));
    let candidate = min_cached - 1 - top;
    if grid.is_valid_placement(piece, 0, candidate - piece.y(), 0) {
        let mut rest = candidate;
        while grid.is_valid_placement(piece, 0, rest + 1 - piece.y(), 0) {
            rest += 1;
        }
        rest
    } else {
        let mut rest = candidate;
        while !grid.is_valid_placement(piece, 0, rest - piece.y(), 0) {
            rest -= 1;
        }
        debug_assert!(rest >= piece.y());
        rest
    }
}

/// A spanned column's cache is stale when the live piece already has a cell
/// below the cached topmost-occupied row.
fn cache_is_stale(grid: &Grid, piece: ActivePiece) -> bool {
    piece.cells().any(|(x, y)| {
        #[expect(clippy::cast_sign_loss)]
        let x = x as usize;
        y > cached_row(grid, x)
    })
}

fn cached_row(grid: &Grid, x: usize) -> i16 {
    #[expect(clippy::cast_possible_truncation)]
    let row = grid.lowest_occupied(x) as i16;
    row
}

/// Reference strategy: walk the piece down one row at a time and keep the
/// last valid anchor.
fn drop_scan(grid: &Grid, piece: ActivePiece) -> i16 {
    let mut dy = 0;
    while grid.is_valid_placement(piece, 0, dy + 1, 0) {
        dy += 1;
    }
    piece.y() + dy
}
