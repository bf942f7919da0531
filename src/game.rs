use rand::Rng;
use tracing::{info, trace};

use crate::clock::Clock;
use crate::components::{Dir, Pos};
use crate::error::{ConfigError, GameError};
use crate::input::{Command, InputSource};
use crate::level::LevelPlan;
use crate::maze::Maze;
use crate::player;
use crate::render::{Frame, Render};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Playing,
    Cleared,
    Won,
    Quit,
}

/// What a single command did to the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Moved(Pos),
    Blocked,
    LevelCleared { next_level: u32 },
    Won,
    Quit,
    /// The run already ended; the command was ignored.
    Finished,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Won { elapsed_seconds: u64 },
    Quit { level: u32, elapsed_seconds: u64 },
}

pub struct Game<R: Rng> {
    plan: LevelPlan,
    rng: R,
    level: u32,
    maze: Maze,
    player: Pos,
    phase: Phase,
}

impl<R: Rng> Game<R> {
    pub fn new(plan: LevelPlan, mut rng: R) -> Result<Self, ConfigError> {
        let plan = plan.validate()?;
        let (rows, cols) = plan.dimensions(1);
        let maze = Maze::generate(rows, cols, &mut rng)?;
        let player = maze.start();
        info!(level = 1, rows = maze.rows(), cols = maze.cols(), "level started");
        Ok(Self {
            plan,
            rng,
            level: 1,
            maze,
            player,
            phase: Phase::Playing,
        })
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn total_levels(&self) -> u32 {
        self.plan.total_levels
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn player(&self) -> Pos {
        self.player
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn frame<'a>(&'a self, elapsed_seconds: u64, notice: Option<&'a str>) -> Frame<'a> {
        Frame {
            maze: &self.maze,
            player: self.player,
            level: self.level,
            total_levels: self.plan.total_levels,
            elapsed_seconds,
            notice,
        }
    }

    pub fn step(&mut self, command: Command) -> Result<Transition, ConfigError> {
        if matches!(self.phase, Phase::Won | Phase::Quit) {
            return Ok(Transition::Finished);
        }
        match command {
            Command::Quit => {
                self.phase = Phase::Quit;
                info!(level = self.level, "player quit");
                Ok(Transition::Quit)
            }
            Command::Move(dir) => self.move_player(dir),
        }
    }

    fn move_player(&mut self, dir: Dir) -> Result<Transition, ConfigError> {
        let Some(next) = player::try_move(&self.maze, self.player, dir) else {
            trace!(?dir, at = ?self.player, "move blocked");
            return Ok(Transition::Blocked);
        };
        self.player = next;
        if self.player != self.maze.exit() {
            return Ok(Transition::Moved(next));
        }

        self.phase = Phase::Cleared;
        info!(level = self.level, "level cleared");
        self.advance()
    }

    fn advance(&mut self) -> Result<Transition, ConfigError> {
        if self.level >= self.plan.total_levels {
            self.phase = Phase::Won;
            info!(levels = self.plan.total_levels, "all levels cleared");
            return Ok(Transition::Won);
        }
        let next_level = self.level + 1;
        let (rows, cols) = self.plan.dimensions(next_level);
        self.maze = Maze::generate(rows, cols, &mut self.rng)?;
        self.level = next_level;
        self.player = self.maze.start();
        self.phase = Phase::Playing;
        info!(
            level = next_level,
            rows = self.maze.rows(),
            cols = self.maze.cols(),
            "level started"
        );
        Ok(Transition::LevelCleared { next_level })
    }

    /// Plays until the player wins or quits. The clock is stopped on every
    /// way out, errors included.
    pub fn run(
        &mut self,
        clock: &mut impl Clock,
        input: &mut impl InputSource,
        view: &mut impl Render,
    ) -> Result<Outcome, GameError> {
        clock.start();
        let result = self.play(&mut *clock, &mut *input, &mut *view);
        clock.stop();
        result
    }

    fn play(
        &mut self,
        clock: &mut impl Clock,
        input: &mut impl InputSource,
        view: &mut impl Render,
    ) -> Result<Outcome, GameError> {
        let mut notice: Option<String> = None;
        view.draw(&self.frame(clock.elapsed_seconds(), notice.as_deref()))?;

        loop {
            let Some(command) = input.next_symbol()?.and_then(Command::from_symbol) else {
                view.draw(&self.frame(clock.elapsed_seconds(), notice.as_deref()))?;
                continue;
            };

            match self.step(command)? {
                Transition::Quit => {
                    clock.stop();
                    return Ok(Outcome::Quit {
                        level: self.level,
                        elapsed_seconds: clock.elapsed_seconds(),
                    });
                }
                Transition::Won => {
                    clock.stop();
                    let elapsed_seconds = clock.elapsed_seconds();
                    let message = format!(
                        "You escaped all {} levels in {}s! Press any key.",
                        self.plan.total_levels, elapsed_seconds
                    );
                    view.draw(&self.frame(elapsed_seconds, Some(message.as_str())))?;
                    return Ok(Outcome::Won { elapsed_seconds });
                }
                Transition::LevelCleared { next_level } => {
                    notice = Some(format!("Level {} cleared!", next_level - 1));
                }
                Transition::Moved(pos) => {
                    trace!(?pos, "moved");
                    notice = None;
                }
                Transition::Blocked | Transition::Finished => {}
            }
            view.draw(&self.frame(clock.elapsed_seconds(), notice.as_deref()))?;
        }
    }
}
