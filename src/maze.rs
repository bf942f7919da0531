use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};

use crate::components::{Dir, Pos, Tile};
use crate::error::ConfigError;

/// Smallest dimension that still leaves room for a carved interior plus the
/// two border openings.
pub const MIN_DIMENSION: usize = 5;

/// A generated perfect maze. Never mutated after `generate` returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Maze {
    rows: usize,
    cols: usize,
    grid: Vec<Tile>,
    start: Pos,
    exit: Pos,
}

impl Maze {
    /// Carves a maze with a randomized depth-first walk over the odd
    /// coordinates, then opens one border cell on the left and one on the
    /// right. Even dimensions are rounded up to the next odd number.
    pub fn generate(rows: usize, cols: usize, rng: &mut impl Rng) -> Result<Maze, ConfigError> {
        check_dimension("rows", rows)?;
        check_dimension("cols", cols)?;
        let cells = grid_cells(rows, cols).ok_or(ConfigError::GridOverflow { rows, cols })?;
        let rows = make_odd(rows);
        let cols = make_odd(cols);

        let mut maze = Maze {
            rows,
            cols,
            grid: vec![Tile::Wall; cells],
            start: Pos::new(1, 1),
            exit: Pos::new(rows - 2, cols - 2),
        };
        maze.carve(rng);
        maze.start = maze.open_side(rng, 1, 0, 1);
        maze.exit = maze.open_side(rng, cols - 2, cols - 1, rows - 2);

        debug!(rows, cols, start = ?maze.start, exit = ?maze.exit, "maze generated");
        Ok(maze)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn start(&self) -> Pos {
        self.start
    }

    pub fn exit(&self) -> Pos {
        self.exit
    }

    /// `None` when `pos` lies outside the grid.
    pub fn tile(&self, pos: Pos) -> Option<Tile> {
        if pos.row < self.rows && pos.col < self.cols {
            Some(self.grid[pos.row * self.cols + pos.col])
        } else {
            None
        }
    }

    pub fn is_open(&self, pos: Pos) -> bool {
        self.tile(pos) == Some(Tile::Open)
    }

    /// The opened border cell left of `start`, if the entrance was opened.
    pub fn entrance(&self) -> Option<Pos> {
        let gate = Pos::new(self.start.row, 0);
        self.is_open(gate).then_some(gate)
    }

    /// The opened border cell right of `exit`, if the exit was opened.
    pub fn exit_gate(&self) -> Option<Pos> {
        let gate = Pos::new(self.exit.row, self.cols - 1);
        self.is_open(gate).then_some(gate)
    }

    pub fn open_cells(&self) -> impl Iterator<Item = Pos> + '_ {
        self.grid
            .iter()
            .enumerate()
            .filter(|(_, tile)| **tile == Tile::Open)
            .map(|(idx, _)| Pos::new(idx / self.cols, idx % self.cols))
    }

    fn set(&mut self, pos: Pos, tile: Tile) {
        self.grid[pos.row * self.cols + pos.col] = tile;
    }

    fn carve(&mut self, rng: &mut impl Rng) {
        let origin = Pos::new(random_odd(rng, self.rows), random_odd(rng, self.cols));
        self.set(origin, Tile::Open);
        let mut stack = vec![origin];

        while let Some(&current) = stack.last() {
            let neighbors = self.unvisited_neighbors(current);
            match neighbors.choose(rng) {
                Some(&next) => {
                    self.carve_between(current, next);
                    self.set(next, Tile::Open);
                    stack.push(next);
                }
                None => {
                    stack.pop();
                }
            }
        }
    }

    fn unvisited_neighbors(&self, pos: Pos) -> Vec<Pos> {
        let mut neighbors = Vec::with_capacity(4);
        for dir in Dir::ALL {
            let (dr, dc) = dir.delta();
            let nr = pos.row as isize + dr * 2;
            let nc = pos.col as isize + dc * 2;
            if nr < 1 || nc < 1 || nr > (self.rows - 2) as isize || nc > (self.cols - 2) as isize {
                continue;
            }
            let next = Pos::new(nr as usize, nc as usize);
            if self.tile(next) == Some(Tile::Wall) {
                neighbors.push(next);
            }
        }
        neighbors
    }

    fn carve_between(&mut self, a: Pos, b: Pos) {
        let wall = Pos::new((a.row + b.row) / 2, (a.col + b.col) / 2);
        self.set(wall, Tile::Open);
    }

    /// Picks a row whose `inner_col` cell is open and knocks out the border
    /// cell beside it. Returns the inner cell.
    fn open_side(
        &mut self,
        rng: &mut impl Rng,
        inner_col: usize,
        border_col: usize,
        fallback_row: usize,
    ) -> Pos {
        let rows: Vec<usize> = (1..self.rows - 1)
            .filter(|&row| self.is_open(Pos::new(row, inner_col)))
            .collect();
        match rows.choose(rng) {
            Some(&row) => {
                self.set(Pos::new(row, border_col), Tile::Open);
                Pos::new(row, inner_col)
            }
            None => {
                warn!(
                    inner_col,
                    fallback_row, "no open row beside the border, using fallback without an opening"
                );
                Pos::new(fallback_row, inner_col)
            }
        }
    }
}

fn check_dimension(axis: &'static str, value: usize) -> Result<(), ConfigError> {
    if value < MIN_DIMENSION {
        return Err(ConfigError::DimensionTooSmall {
            axis,
            value,
            min: MIN_DIMENSION,
        });
    }
    Ok(())
}

/// Cell count of the grid `generate` would build, or `None` on overflow.
pub fn grid_cells(rows: usize, cols: usize) -> Option<usize> {
    make_odd(rows).checked_mul(make_odd(cols))
}

fn make_odd(n: usize) -> usize {
    if n % 2 == 0 {
        n + 1
    } else {
        n
    }
}

/// Uniform odd value in `[1, size - 2]` for an odd `size`.
fn random_odd(rng: &mut impl Rng, size: usize) -> usize {
    rng.gen_range(0..(size - 1) / 2) * 2 + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::{HashSet, VecDeque};

    fn reachable_from(maze: &Maze, start: Pos) -> HashSet<Pos> {
        let mut seen = HashSet::new();
        let mut q = VecDeque::new();
        seen.insert(start);
        q.push_back(start);
        while let Some(pos) = q.pop_front() {
            for dir in Dir::ALL {
                let (dr, dc) = dir.delta();
                let nr = pos.row as isize + dr;
                let nc = pos.col as isize + dc;
                if nr < 0 || nc < 0 {
                    continue;
                }
                let next = Pos::new(nr as usize, nc as usize);
                if maze.is_open(next) && seen.insert(next) {
                    q.push_back(next);
                }
            }
        }
        seen
    }

    fn open_adjacencies(maze: &Maze) -> usize {
        maze.open_cells()
            .map(|pos| {
                let right = Pos::new(pos.row, pos.col + 1);
                let down = Pos::new(pos.row + 1, pos.col);
                usize::from(maze.is_open(right)) + usize::from(maze.is_open(down))
            })
            .sum()
    }

    #[test]
    fn open_cells_form_a_spanning_tree() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let maze = Maze::generate(15, 29, &mut rng).unwrap();

            let open: HashSet<Pos> = maze.open_cells().collect();
            let reached = reachable_from(&maze, maze.start());
            assert_eq!(reached, open, "seed {seed}: open cells are not one component");
            assert_eq!(open_adjacencies(&maze), open.len() - 1, "seed {seed}: cycle found");
        }
    }

    #[test]
    fn every_odd_cell_is_carved_with_one_fewer_passages() {
        let mut rng = StdRng::seed_from_u64(3);
        let maze = Maze::generate(21, 35, &mut rng).unwrap();

        let cells = ((maze.rows() - 1) / 2) * ((maze.cols() - 1) / 2);
        let interior_open = maze
            .open_cells()
            .filter(|p| p.col != 0 && p.col != maze.cols() - 1)
            .count();
        assert!((1..maze.rows() - 1)
            .step_by(2)
            .all(|r| (1..maze.cols() - 1).step_by(2).all(|c| maze.is_open(Pos::new(r, c)))));
        assert_eq!(interior_open, cells + (cells - 1));
    }

    #[test]
    fn exit_is_reachable_from_start() {
        for seed in 100..130 {
            let mut rng = StdRng::seed_from_u64(seed);
            let maze = Maze::generate(9, 13, &mut rng).unwrap();
            assert!(reachable_from(&maze, maze.start()).contains(&maze.exit()));
        }
    }

    #[test]
    fn start_and_exit_sit_inside_opened_borders() {
        let mut rng = StdRng::seed_from_u64(11);
        let maze = Maze::generate(15, 29, &mut rng).unwrap();

        assert_eq!(maze.start().col, 1);
        assert_eq!(maze.exit().col, maze.cols() - 2);
        assert!(maze.is_open(maze.start()));
        assert!(maze.is_open(maze.exit()));
        assert_eq!(maze.entrance(), Some(Pos::new(maze.start().row, 0)));
        assert_eq!(maze.exit_gate(), Some(Pos::new(maze.exit().row, maze.cols() - 1)));
    }

    #[test]
    fn even_dimensions_round_up_to_odd() {
        let mut rng = StdRng::seed_from_u64(5);
        for rows in 5..12 {
            for cols in 5..12 {
                let maze = Maze::generate(rows, cols, &mut rng).unwrap();
                assert_eq!(maze.rows() % 2, 1);
                assert_eq!(maze.cols() % 2, 1);
                assert!(maze.rows() - rows <= 1);
                assert!(maze.cols() - cols <= 1);
            }
        }
    }

    #[test]
    fn same_seed_gives_identical_maze() {
        let a = Maze::generate(21, 35, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = Maze::generate(21, 35, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_dimensions_below_minimum() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            Maze::generate(4, 9, &mut rng),
            Err(ConfigError::DimensionTooSmall {
                axis: "rows",
                value: 4,
                min: MIN_DIMENSION,
            })
        );
        assert!(matches!(
            Maze::generate(9, 3, &mut rng),
            Err(ConfigError::DimensionTooSmall { axis: "cols", .. })
        ));
    }

    #[test]
    fn rejects_grids_that_overflow() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            Maze::generate(usize::MAX, 5, &mut rng),
            Err(ConfigError::GridOverflow {
                rows: usize::MAX,
                cols: 5,
            })
        );
    }

    fn walled(rows: usize, cols: usize) -> Maze {
        Maze {
            rows,
            cols,
            grid: vec![Tile::Wall; rows * cols],
            start: Pos::new(1, 1),
            exit: Pos::new(rows - 2, cols - 2),
        }
    }

    #[test]
    fn entrance_falls_back_without_opening_the_border() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut maze = walled(7, 9);

        maze.start = maze.open_side(&mut rng, 1, 0, 1);

        assert_eq!(maze.start(), Pos::new(1, 1));
        assert_eq!(maze.tile(Pos::new(1, 0)), Some(Tile::Wall));
        assert_eq!(maze.entrance(), None);
        assert_eq!(maze.open_cells().count(), 0);
    }

    #[test]
    fn exit_falls_back_without_opening_the_border() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut maze = walled(7, 9);
        let (rows, cols) = (maze.rows(), maze.cols());

        maze.exit = maze.open_side(&mut rng, cols - 2, cols - 1, rows - 2);

        assert_eq!(maze.exit(), Pos::new(5, 7));
        assert_eq!(maze.tile(Pos::new(5, 8)), Some(Tile::Wall));
        assert_eq!(maze.exit_gate(), None);
        assert_eq!(maze.open_cells().count(), 0);
    }

    #[test]
    fn tile_is_none_out_of_bounds() {
        let maze = Maze::generate(5, 5, &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(maze.tile(Pos::new(5, 0)), None);
        assert_eq!(maze.tile(Pos::new(0, 5)), None);
        assert_eq!(maze.tile(Pos::new(0, 0)), Some(Tile::Wall));
    }
}
