//! Error types. Every failure a caller can hit in normal play is a value;
//! only broken capacity contracts panic.

use crate::grid::Position;

/// Why a foreground could not be placed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlaceError {
    #[error("footprint at {anchor:?} extends past the board edge")]
    OutOfBounds { anchor: Position },
    #[error("square {at:?} already holds a foreground")]
    Occupied { at: Position },
    #[error("background at {at:?} does not allow building")]
    NotBuildable { at: Position },
}

/// Why a foreground could not be removed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoveError {
    #[error("position {at:?} is off the board")]
    OutOfBounds { at: Position },
    #[error("no foreground at {at:?}")]
    Empty { at: Position },
    #[error("foreground at {at:?} cannot be removed")]
    NotRemovable { at: Position },
}

/// A player action the board rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error(transparent)]
    Place(#[from] PlaceError),
    #[error(transparent)]
    Remove(#[from] RemoveError),
}

/// A configuration the manager refuses to start from.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("board must be at least 1x1, got {width}x{height}")]
    EmptyBoard { width: u32, height: u32 },
    #[error("board width must be even, got {width}")]
    OddWidth { width: u32 },
    #[error("sink of size {goal_size} does not fit a {width}x{height} board")]
    GoalTooLarge {
        goal_size: u32,
        width: u32,
        height: u32,
    },
    #[error("sink size must be at least 1")]
    EmptyGoal,
    #[error("scoring divisor must be non-zero")]
    ZeroDivisor,
    #[error("belt buffer must hold at least {min} slots, got {len}")]
    BeltTooShort { len: usize, min: usize },
    #[error("could not place the sink: {0}")]
    SinkPlacement(#[from] PlaceError),
}
