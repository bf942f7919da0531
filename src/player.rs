use crate::components::{Dir, Pos};
use crate::maze::Maze;

/// The neighbor of `pos` in `dir`, or `None` if that would leave the grid.
pub fn step(maze: &Maze, pos: Pos, dir: Dir) -> Option<Pos> {
    let (dr, dc) = dir.delta();
    let nr = pos.row as isize + dr;
    let nc = pos.col as isize + dc;
    if nr < 0 || nc < 0 {
        return None;
    }
    let next = Pos::new(nr as usize, nc as usize);
    if next.row >= maze.rows() || next.col >= maze.cols() {
        return None;
    }
    Some(next)
}

pub fn can_move(maze: &Maze, pos: Pos, dir: Dir) -> bool {
    step(maze, pos, dir).is_some_and(|next| maze.is_open(next))
}

/// Where the player ends up after trying `dir`: the neighbor when it is open,
/// otherwise `None` and the caller keeps its position.
pub fn try_move(maze: &Maze, pos: Pos, dir: Dir) -> Option<Pos> {
    if can_move(maze, pos, dir) {
        step(maze, pos, dir)
    } else {
        None
    }
}
