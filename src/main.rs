use std::fs::File;
use std::io::{self, Stdout};
use std::path::Path;
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use crossterm::cursor::{Hide, Show};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use tracing_subscriber::EnvFilter;

use maze_game::clock::TickClock;
use maze_game::config::Settings;
use maze_game::game::{Game, Outcome};
use maze_game::input::KeyInput;
use maze_game::render::TerminalRenderer;

fn main() -> anyhow::Result<()> {
    let settings = Settings::parse();
    if let Some(path) = &settings.log_file {
        init_logging(path)?;
    }
    let game = Game::new(settings.level_plan()?, settings.rng())?;
    let total_levels = game.total_levels();

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(game, &settings, io::stdout());

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;

    match result? {
        Outcome::Won { elapsed_seconds } => {
            println!("You cleared all {total_levels} levels in {elapsed_seconds}s.");
        }
        Outcome::Quit {
            level,
            elapsed_seconds,
        } => {
            println!("Quit on level {level} after {elapsed_seconds}s.");
        }
    }
    Ok(())
}

fn run<R: rand::Rng>(
    mut game: Game<R>,
    settings: &Settings,
    stdout: Stdout,
) -> anyhow::Result<Outcome> {
    let mut clock = TickClock::new();
    let mut input = KeyInput::new(settings.poll_interval());
    let mut view = TerminalRenderer::new(stdout);

    let outcome = game.run(&mut clock, &mut input, &mut view)?;
    if let Outcome::Won { .. } = outcome {
        view.wait_for_key()?;
    }
    Ok(outcome)
}

fn init_logging(path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
