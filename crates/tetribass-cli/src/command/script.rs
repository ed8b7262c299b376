use std::{fs, path::PathBuf};

use anyhow::Context as _;
use clap::Args;
use tetribass_engine::Command;

#[derive(Debug, Clone, Args)]
pub struct ScriptArg {
    /// File with one JSON command per line (e.g. "hard-drop")
    file: PathBuf,

    /// Frames per second driving the gravity timer
    #[arg(long, default_value_t = 60)]
    fps: u64,

    /// 32-character hex seed for the piece queue
    #[arg(long)]
    seed: Option<String>,

    /// Gravity frames advanced after each command
    #[arg(long, default_value_t = 0)]
    frames: u64,

    /// Print the final snapshot as JSON instead of a summary
    #[arg(long)]
    json: bool,
}

pub fn run(arg: &ScriptArg) -> anyhow::Result<()> {
    let text = fs::read_to_string(&arg.file)
        .with_context(|| format!("failed to read {}", arg.file.display()))?;
    let mut session = super::session_from(arg.fps, arg.seed.as_deref())?;

    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let command: Command = serde_json::from_str(line)
            .with_context(|| format!("invalid command on line {}", number + 1))?;
        session.handle_command(command);
        for _ in 0..arg.frames {
            session.increment_frame();
        }
    }

    super::print_outcome(&session, arg.json)
}
