//! Grid primitives: positions, directions, and rectangular footprints.
//!
//! Positions are `(row, col)` pairs with row growing downward. Nothing here
//! knows about board bounds; the [`Board`](crate::board::Board) checks those.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A square on the grid, addressed by row and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// The adjacent square in the given direction.
    pub fn neighbor(self, direction: Direction) -> Self {
        self + direction.offset()
    }

    /// Manhattan distance to another position.
    pub fn manhattan_distance(&self, other: &Position) -> u32 {
        (self.row - other.row).unsigned_abs() + (self.col - other.col).unsigned_abs()
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        Position::new(self.row + rhs.row, self.col + rhs.col)
    }
}

impl AddAssign for Position {
    fn add_assign(&mut self, rhs: Position) {
        self.row += rhs.row;
        self.col += rhs.col;
    }
}

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// One of the four cardinal directions a machine can face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Top,
    Right,
    Bottom,
    Left,
}

impl Direction {
    /// All four directions in clockwise order starting from `Top`.
    pub fn all() -> [Direction; 4] {
        [
            Direction::Top,
            Direction::Right,
            Direction::Bottom,
            Direction::Left,
        ]
    }

    /// Unit offset as a `(row, col)` delta.
    pub fn offset(self) -> Position {
        match self {
            Direction::Top => Position::new(-1, 0),
            Direction::Right => Position::new(0, 1),
            Direction::Bottom => Position::new(1, 0),
            Direction::Left => Position::new(0, -1),
        }
    }

    /// The square next to `pos` in this direction.
    pub fn neighbor(self, pos: Position) -> Position {
        pos + self.offset()
    }

    /// Number of clockwise quarter turns from `Top`.
    pub fn rotation_index(self) -> u8 {
        match self {
            Direction::Top => 0,
            Direction::Right => 1,
            Direction::Bottom => 2,
            Direction::Left => 3,
        }
    }

    /// Inverse of [`rotation_index`](Self::rotation_index). Wraps modulo 4.
    pub fn from_rotation_index(index: u8) -> Self {
        Self::all()[(index % 4) as usize]
    }

    /// Rotate 90 degrees clockwise.
    pub fn rotate_cw(self) -> Self {
        Self::from_rotation_index(self.rotation_index() + 1)
    }

    /// The direction pointing the other way.
    pub fn opposite(self) -> Self {
        Self::from_rotation_index(self.rotation_index() + 2)
    }

    /// Whether this direction moves along rows (`Top`/`Bottom`).
    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Top | Direction::Bottom)
    }
}

// ---------------------------------------------------------------------------
// Footprint
// ---------------------------------------------------------------------------

/// The rectangle of squares a foreground occupies, anchored at its top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Footprint {
    pub width: u32,
    pub height: u32,
}

impl Footprint {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A 1x1 footprint.
    pub const fn single() -> Self {
        Self::new(1, 1)
    }

    /// An `n` x `n` footprint.
    pub const fn square(n: u32) -> Self {
        Self::new(n, n)
    }

    /// Number of squares covered.
    pub fn area(self) -> u32 {
        self.width * self.height
    }

    /// Iterate over every covered square, row-major from `anchor`.
    pub fn tiles(self, anchor: Position) -> impl Iterator<Item = Position> {
        let w = self.width as i32;
        let h = self.height as i32;
        (0..h).flat_map(move |dr| (0..w).map(move |dc| Position::new(anchor.row + dr, anchor.col + dc)))
    }

    /// Whether `pos` lies inside this footprint placed at `anchor`.
    pub fn covers(self, anchor: Position, pos: Position) -> bool {
        let dr = pos.row - anchor.row;
        let dc = pos.col - anchor.col;
        dr >= 0 && dc >= 0 && (dr as u32) < self.height && (dc as u32) < self.width
    }
}
