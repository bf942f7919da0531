use std::io;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("maze {axis} must be at least {min}, got {value}")]
    DimensionTooSmall {
        axis: &'static str,
        value: usize,
        min: usize,
    },
    #[error("at least one level is required")]
    NoLevels,
    #[error("maze for level {level} is too large to allocate")]
    SizeOverflow { level: u32 },
    #[error("a {rows}x{cols} maze does not fit in memory")]
    GridOverflow { rows: usize, cols: usize },
}

#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("terminal i/o failed: {0}")]
    Io(#[from] io::Error),
}
