/// Gravity interval at level 1 and below, before the per-level reduction.
const BASE_INTERVAL_MILLIS: u64 = 700;
/// Interval reduction per level.
const LEVEL_STEP_MILLIS: u64 = 60;
/// Ceiling on the total reduction, so the game never speeds up without bound.
const REDUCTION_CAP_MILLIS: u64 = 450;

/// Score and progression tracking.
///
/// - **Score**: each lock that cleared at least one row grants the current
///   level, once per locking event (not per row).
/// - **Tile count**: total number of locked pieces; the level is derived
///   from it (`1 + tile_count / 10`).
/// - **Speed**: the gravity interval shrinks linearly with the level down to
///   a capped minimum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameStats {
    score: usize,
    tile_count: usize,
}

impl Default for GameStats {
    fn default() -> Self {
        Self::new()
    }
}

impl GameStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            tile_count: 0,
        }
    }

    #[must_use]
    pub const fn score(&self) -> usize {
        self.score
    }

    #[must_use]
    pub const fn tile_count(&self) -> usize {
        self.tile_count
    }

    /// Current level: starts at 1, one step per 10 locked pieces.
    #[must_use]
    pub const fn level(&self) -> usize {
        1 + self.tile_count / 10
    }

    /// Updates the counters after a piece lock.
    ///
    /// The score grant uses the level as it was when the clear happened,
    /// before this lock's tile is counted.
    pub const fn record_lock(&mut self, cleared_rows: usize) {
        if cleared_rows > 0 {
            self.score += self.level();
        }
        self.tile_count += 1;
    }

    /// Gravity interval for the current level, in milliseconds.
    #[must_use]
    pub fn tick_interval_millis(&self) -> u64 {
        let reduction = u64::min(self.level() as u64 * LEVEL_STEP_MILLIS, REDUCTION_CAP_MILLIS);
        BASE_INTERVAL_MILLIS - reduction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_steps_every_ten_tiles() {
        let mut stats = GameStats::new();
        assert_eq!(stats.level(), 1);
        for _ in 0..9 {
            stats.record_lock(0);
        }
        assert_eq!(stats.level(), 1);
        stats.record_lock(0);
        assert_eq!(stats.level(), 2);
    }

    #[test]
    fn test_score_grants_level_once_per_clearing_lock() {
        let mut stats = GameStats::new();
        stats.record_lock(0);
        assert_eq!(stats.score(), 0);
        // A quadruple clear still grants the level once.
        stats.record_lock(4);
        assert_eq!(stats.score(), 1);
        assert_eq!(stats.tile_count(), 2);
    }

    #[test]
    fn test_score_uses_the_level_at_clear_time() {
        let mut stats = GameStats::new();
        for _ in 0..9 {
            stats.record_lock(0);
        }
        // The 10th lock clears: still level 1 when the clear happened.
        stats.record_lock(1);
        assert_eq!(stats.score(), 1);
        assert_eq!(stats.level(), 2);
        stats.record_lock(1);
        assert_eq!(stats.score(), 3);
    }

    #[test]
    fn test_tick_interval_shrinks_and_caps() {
        let mut stats = GameStats::new();
        let level1 = stats.tick_interval_millis();
        assert_eq!(level1, BASE_INTERVAL_MILLIS - LEVEL_STEP_MILLIS);

        for _ in 0..10 {
            stats.record_lock(0);
        }
        assert!(stats.tick_interval_millis() < level1);

        for _ in 0..200 {
            stats.record_lock(0);
        }
        assert_eq!(
            stats.tick_interval_millis(),
            BASE_INTERVAL_MILLIS - REDUCTION_CAP_MILLIS
        );
    }
}
