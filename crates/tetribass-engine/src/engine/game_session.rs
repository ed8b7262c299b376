use std::time::Duration;

use rand::Rng as _;
use serde::{Deserialize, Serialize};

use super::{
    game_state::{Action, GameState},
    snapshot::GameSnapshot,
    spawn_queue::QueueSeed,
};

/// The decoded form of an external input event.
///
/// Whatever transport delivers these (key handler, socket frame), the
/// session only ever sees this enum, one command at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Command {
    MoveLeft,
    MoveRight,
    RotateCw,
    SoftDrop,
    HardDrop,
    Hold,
    Restart,
    TogglePause,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::IsVariant)]
pub enum SessionState {
    Playing,
    Paused,
    GameOver,
}

/// A running game: state machine plus the frame-based gravity timer.
///
/// The caller drives one `increment_frame` per rendered frame and forwards
/// decoded commands as they arrive; both run to completion on this single
/// writer, so no two transitions ever interleave. While paused, gravity is
/// suspended and every gameplay command (hold included) is ignored; only
/// `TogglePause` and `Restart` act.
#[derive(Debug, Clone)]
pub struct GameSession {
    state: GameState,
    session_state: SessionState,
    fps: u64,
    total_frames: u64,
    drop_frames: u64,
}

/// Frames until the next gravity drop, re-armed from the current level.
fn drop_frames(state: &GameState, fps: u64) -> u64 {
    u64::max(state.stats().tick_interval_millis() * fps / 1000, 1)
}

impl GameSession {
    #[must_use]
    pub fn new(fps: u64) -> Self {
        Self::with_seed(fps, rand::rng().random())
    }

    #[must_use]
    pub fn with_seed(fps: u64, seed: QueueSeed) -> Self {
        let state = GameState::with_seed(seed);
        let drop_frames = drop_frames(&state, fps);
        Self {
            state,
            session_state: SessionState::Playing,
            fps,
            total_frames: 0,
            drop_frames,
        }
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub fn session_state(&self) -> &SessionState {
        &self.session_state
    }

    /// Play time derived from the frame counter.
    #[must_use]
    pub fn duration(&self) -> Duration {
        const NANOS_PER_SEC: u64 = 1_000_000_000;
        let secs = self.total_frames / self.fps;
        let nanos = (self.total_frames % self.fps) * NANOS_PER_SEC / self.fps;
        Duration::new(secs, nanos.try_into().unwrap())
    }

    /// Advances one frame; fires a gravity drop when the timer expires.
    ///
    /// Does nothing while paused or after game over, so pausing suspends the
    /// fall without losing the remaining frames. The timer re-arms from the
    /// level as it stands after the drop, which picks up mid-lock level-ups
    /// immediately.
    pub fn increment_frame(&mut self) {
        if !self.session_state.is_playing() {
            return;
        }
        self.total_frames += 1;
        self.drop_frames = self.drop_frames.saturating_sub(1);
        if self.drop_frames == 0 {
            self.state.step(Action::SoftDrop);
            self.sync_game_over();
            self.drop_frames = drop_frames(&self.state, self.fps);
        }
    }

    /// Applies one decoded command.
    pub fn handle_command(&mut self, command: Command) {
        let action = match command {
            Command::Restart => return self.restart(),
            Command::TogglePause => return self.toggle_pause(),
            // Paused and game-over sessions accept only the two commands
            // above.
            _ if !self.session_state.is_playing() => return,
            Command::MoveLeft => Action::MoveLeft,
            Command::MoveRight => Action::MoveRight,
            Command::RotateCw => Action::RotateCw,
            Command::SoftDrop => Action::SoftDrop,
            Command::HardDrop => Action::HardDrop,
            Command::Hold => Action::Hold,
        };
        self.state.step(action);
        self.sync_game_over();
    }

    pub fn toggle_pause(&mut self) {
        self.session_state = match self.session_state {
            SessionState::Playing => SessionState::Paused,
            SessionState::Paused => SessionState::Playing,
            SessionState::GameOver => SessionState::GameOver, // No change from game over
        };
    }

    /// Starts a fresh game with a new random seed and a re-armed timer.
    pub fn restart(&mut self) {
        self.state = GameState::new();
        self.session_state = SessionState::Playing;
        self.total_frames = 0;
        self.drop_frames = drop_frames(&self.state, self.fps);
    }

    /// Raises garbage rows under the running game.
    pub fn add_garbage_rows(&mut self, count: usize, hole_x: usize) {
        if !self.session_state.is_playing() {
            return;
        }
        self.state.add_garbage_rows(count, hole_x);
        self.sync_game_over();
    }

    /// Produces the owned render snapshot for this instant.
    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::capture(&self.state)
    }

    fn sync_game_over(&mut self) {
        if self.state.is_game_over() {
            self.session_state = SessionState::GameOver;
        }
    }
}
