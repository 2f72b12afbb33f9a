//! Game configuration.
//!
//! Every field has a serde default so partial config files only need to name
//! what they change.

use crate::cell::MIN_BELT_LEN;
use crate::error::ConfigError;
use crate::grid::Position;
use serde::{Deserialize, Serialize};

/// Parameters fixed for the lifetime of one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub board_width: u32,
    pub board_height: u32,
    /// Slots per belt. Sinks and mergers advertise the same room.
    pub belt_len: usize,
    /// Side length of the square sink.
    pub goal_size: u32,
    /// Wall placement attempts during world generation.
    pub wall_count: u32,
    /// Tick at which the game stops.
    pub end_tick: u64,
    /// Products divisible by this score a point.
    pub divisor: i32,
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_width: 62,
            board_height: 36,
            belt_len: 10,
            goal_size: 4,
            wall_count: 100,
            end_tick: 9000,
            divisor: 2,
            seed: 0,
        }
    }
}

impl GameConfig {
    /// Reject configurations the manager cannot build a world from.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board_width == 0 || self.board_height == 0 {
            return Err(ConfigError::EmptyBoard {
                width: self.board_width,
                height: self.board_height,
            });
        }
        if self.board_width % 2 != 0 {
            return Err(ConfigError::OddWidth {
                width: self.board_width,
            });
        }
        if self.goal_size == 0 {
            return Err(ConfigError::EmptyGoal);
        }
        if self.goal_size > self.board_width || self.goal_size > self.board_height {
            return Err(ConfigError::GoalTooLarge {
                goal_size: self.goal_size,
                width: self.board_width,
                height: self.board_height,
            });
        }
        if self.divisor == 0 {
            return Err(ConfigError::ZeroDivisor);
        }
        if self.belt_len < MIN_BELT_LEN {
            return Err(ConfigError::BeltTooShort {
                len: self.belt_len,
                min: MIN_BELT_LEN,
            });
        }
        Ok(())
    }

    /// Top-left square of the centered sink.
    pub fn sink_anchor(&self) -> Position {
        let half = (self.goal_size / 2) as i32;
        Position::new(
            (self.board_height / 2) as i32 - half,
            (self.board_width / 2) as i32 - half,
        )
    }
}
