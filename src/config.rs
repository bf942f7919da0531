use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::ConfigError;
use crate::level::{
    LevelPlan, DEFAULT_BASE_COLS, DEFAULT_BASE_ROWS, DEFAULT_LEVELS, DEFAULT_SIZE_STEP,
};

const DEFAULT_POLL_MS: u64 = 200;

/// Escape a series of randomly carved mazes against the clock.
#[derive(Debug, Parser)]
#[command(name = "maze", version)]
pub struct Settings {
    /// Number of levels to clear.
    #[arg(long, env = "MAZE_LEVELS", default_value_t = DEFAULT_LEVELS)]
    pub levels: u32,

    /// Maze rows on the first level.
    #[arg(long, env = "MAZE_BASE_ROWS", default_value_t = DEFAULT_BASE_ROWS)]
    pub base_rows: usize,

    /// Maze columns on the first level.
    #[arg(long, env = "MAZE_BASE_COLS", default_value_t = DEFAULT_BASE_COLS)]
    pub base_cols: usize,

    /// Rows and columns added per level.
    #[arg(long, env = "MAZE_SIZE_STEP", default_value_t = DEFAULT_SIZE_STEP)]
    pub size_step: usize,

    /// Seed for reproducible mazes.
    #[arg(long, env = "MAZE_SEED")]
    pub seed: Option<u64>,

    /// How long to wait for a key before refreshing the timer.
    #[arg(long, env = "MAZE_POLL_MS", default_value_t = DEFAULT_POLL_MS)]
    pub poll_ms: u64,

    /// Write logs here. Logging is off without it.
    #[arg(long, env = "MAZE_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

impl Settings {
    pub fn level_plan(&self) -> Result<LevelPlan, ConfigError> {
        LevelPlan {
            total_levels: self.levels,
            base_rows: self.base_rows,
            base_cols: self.base_cols,
            size_step: self.size_step,
        }
        .validate()
    }

    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_ms.max(1))
    }
}
