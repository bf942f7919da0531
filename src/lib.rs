//! Terminal maze game: randomly carved perfect mazes, one per level, growing
//! in size until the last level is cleared.

pub mod clock;
pub mod components;
pub mod config;
pub mod error;
pub mod game;
pub mod input;
pub mod level;
pub mod maze;
pub mod player;
pub mod render;
