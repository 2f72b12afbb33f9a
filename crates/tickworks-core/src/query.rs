//! Read-only view of a running game.
//!
//! Players and front ends inspect the game through [`GameView`]. Snapshots
//! are owned copies, never references into the board.

use crate::cell::{Background, Foreground};
use crate::grid::Position;
use crate::id::CellId;

// ---------------------------------------------------------------------------
// Layered cell snapshot
// ---------------------------------------------------------------------------

/// Both layers of one square.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayeredCell {
    /// Handle shared by every square the foreground covers.
    pub foreground_id: Option<CellId>,
    pub foreground: Option<Foreground>,
    pub background: Option<Background>,
}

impl LayeredCell {
    pub fn is_empty(&self) -> bool {
        self.foreground.is_none() && self.background.is_none()
    }
}

// ---------------------------------------------------------------------------
// GameView
// ---------------------------------------------------------------------------

/// What a decision-maker is allowed to know.
pub trait GameView {
    /// Snapshot of the square at `at`, or `None` if it is off the board.
    fn layered_cell(&self, at: Position) -> Option<LayeredCell>;

    fn board_width(&self) -> u32;

    fn board_height(&self) -> u32;

    fn elapsed_ticks(&self) -> u64;

    fn end_tick(&self) -> u64;

    fn score(&self) -> u32;

    fn is_game_over(&self) -> bool {
        self.elapsed_ticks() >= self.end_tick()
    }

    /// Short description of the scoring rule, e.g. `"(2)"`.
    fn level_info(&self) -> String;

    /// Whether a product of this value would score.
    fn is_scored_product(&self, value: i32) -> bool;
}
