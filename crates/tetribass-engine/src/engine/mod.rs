//! Game orchestration on top of the core board structures.
//!
//! - [`GameState`] - the per-command state machine (spawn, move, lock, clear)
//! - [`GameSession`] - a running game: pause/restart plus the gravity timer
//! - [`GameStats`] - score, tile count, level, and the speed curve
//! - [`SpawnQueue`] - FIFO upcoming-piece queue with uniform random refill
//! - [`QueueSeed`] - seed for deterministic piece sequences
//! - [`GameSnapshot`] - the owned per-frame copy handed to renderers
//!
//! # Game flow
//!
//! 1. Create a [`GameSession`] (optionally seeded)
//! 2. Forward decoded [`Command`]s as they arrive and call
//!    [`GameSession::increment_frame`] once per frame
//! 3. Hand [`GameSession::snapshot`] to the renderer
//! 4. On `game_over`, restart to play again
//!
//! # Example
//!
//! ```
//! use tetribass_engine::{Command, GameSession};
//!
//! let mut session = GameSession::new(60);
//!
//! session.handle_command(Command::MoveLeft);
//! session.handle_command(Command::HardDrop);
//! session.increment_frame();
//!
//! let snapshot = session.snapshot();
//! assert!(!snapshot.game_over);
//! ```

pub use self::{game_session::*, game_state::*, game_stats::*, snapshot::*, spawn_queue::*};

mod game_session;
mod game_state;
mod game_stats;
mod snapshot;
mod spawn_queue;
