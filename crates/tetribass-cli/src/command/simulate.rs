use clap::Args;
use rand::{Rng as _, SeedableRng as _, rngs::StdRng};
use tetribass_engine::{BOARD_WIDTH, Command};

#[derive(Debug, Clone, Args)]
pub struct SimulateArg {
    /// Stop after this many locked pieces
    #[arg(long, default_value_t = 200)]
    pieces: usize,

    /// 32-character hex seed for the piece queue
    #[arg(long)]
    seed: Option<String>,

    /// Frames per second driving the gravity timer
    #[arg(long, default_value_t = 60)]
    fps: u64,

    /// Pre-fill this many grey garbage rows before play starts
    #[arg(long, default_value_t = 0)]
    garbage: usize,

    /// Seed for the generated command stream
    #[arg(long, default_value_t = 0)]
    input_seed: u64,

    /// Print the final snapshot as JSON instead of a summary
    #[arg(long)]
    json: bool,
}

pub fn run(arg: &SimulateArg) -> anyhow::Result<()> {
    let mut session = super::session_from(arg.fps, arg.seed.as_deref())?;
    let mut rng = StdRng::seed_from_u64(arg.input_seed);

    if arg.garbage > 0 {
        session.add_garbage_rows(arg.garbage, rng.random_range(0..BOARD_WIDTH));
    }

    while !session.session_state().is_game_over()
        && session.state().stats().tile_count() < arg.pieces
    {
        session.increment_frame();
        // Roughly one command every other frame, weighted towards movement.
        match rng.random_range(0..12) {
            0 | 1 => session.handle_command(Command::MoveLeft),
            2 | 3 => session.handle_command(Command::MoveRight),
            4 => session.handle_command(Command::RotateCw),
            5 => session.handle_command(Command::SoftDrop),
            6 => session.handle_command(Command::HardDrop),
            7 => session.handle_command(Command::Hold),
            _ => {}
        }
    }

    super::print_outcome(&session, arg.json)
}
