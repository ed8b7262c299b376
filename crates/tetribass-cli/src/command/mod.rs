use clap::{Parser, Subcommand};
use tetribass_engine::{Cell, GameSession, QueueSeed};

mod script;
mod simulate;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Drive a session with a seeded random command stream
    Simulate(#[clap(flatten)] simulate::SimulateArg),
    /// Replay a file of JSON commands against a fresh session
    Script(#[clap(flatten)] script::ScriptArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Simulate(arg) => simulate::run(&arg),
        Mode::Script(arg) => script::run(&arg),
    }
}

/// Builds a session, parsing the optional hex queue seed.
fn session_from(fps: u64, seed: Option<&str>) -> anyhow::Result<GameSession> {
    let session = match seed {
        Some(hex) => {
            let seed = QueueSeed::from_hex(hex).map_err(anyhow::Error::msg)?;
            GameSession::with_seed(fps, seed)
        }
        None => GameSession::new(fps),
    };
    Ok(session)
}

/// Prints either the snapshot JSON or a human summary with a board dump.
fn print_outcome(session: &GameSession, json: bool) -> anyhow::Result<()> {
    let snapshot = session.snapshot();
    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    for row in &snapshot.board {
        let line: String = row.iter().map(|&code| cell_char(code)).collect();
        println!("{line}");
    }
    println!("score:  {}", snapshot.score);
    println!("level:  {}", snapshot.level);
    println!("tiles:  {}", snapshot.tile_count);
    println!("time:   {:?}", session.duration());
    println!(
        "status: {}",
        if snapshot.game_over {
            "game over"
        } else {
            "running"
        }
    );
    Ok(())
}

fn cell_char(code: u8) -> char {
    match code {
        0 => '.',
        Cell::GHOST_CODE => '+',
        Cell::GREY_CODE => 'x',
        _ => char::from_digit(u32::from(code), 10).unwrap_or('#'),
    }
}
