//! Grid coordinates.
//!
//! Positions are signed so that stepping off the board produces a value that
//! is simply out of bounds rather than an underflow. Row and column indices
//! are zero-based from the top-left corner of the level.
//!
//! ```
//! use unicorn_board::core::{Direction, Position};
//!
//! let p = Position::new(2, 1);
//! assert_eq!(p.step(Direction::Up, 1), Position::new(2, 0));
//! assert_eq!(p.step(Direction::Left, 3), Position::new(-1, 1));
//! ```

use serde::{Deserialize, Serialize};

/// A cell coordinate: `x` is the column, `y` the row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move `distance` cells in `direction`.
    #[must_use]
    pub const fn step(self, direction: Direction, distance: i32) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: self.x + dx * distance,
            y: self.y + dy * distance,
        }
    }

    /// Row-major key used to order positions the way levels are read.
    #[must_use]
    pub const fn row_major(self) -> (i32, i32) {
        (self.y, self.x)
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The four axis directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All directions, in blast propagation order.
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// Unit offset `(dx, dy)`; `Up` decreases the row index.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}
