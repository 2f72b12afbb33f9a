//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::board::Board;
use crate::cell::{Background, Structure};
use crate::config::GameConfig;
use crate::grid::{Direction, Position};
use crate::id::CellId;
use crate::manager::{Game, GameManager};
use crate::player::Player;

// ===========================================================================
// Configs
// ===========================================================================

/// 12x10 board, 2x2 sink anchored at (4, 5), no walls.
pub fn small_config() -> GameConfig {
    GameConfig {
        board_width: 12,
        board_height: 10,
        goal_size: 2,
        wall_count: 0,
        ..GameConfig::default()
    }
}

// ===========================================================================
// Games
// ===========================================================================

/// A game with every deposit wiped, so tests place exactly the ones they need.
pub fn bare_game(config: &GameConfig) -> Game {
    let mut game = Game::new(config).unwrap();
    clear_deposits(game.board_mut());
    game
}

/// [`bare_game`] driven by `player`.
pub fn bare_manager(config: GameConfig, player: impl Player + 'static) -> GameManager {
    let mut manager = GameManager::new(config, player).unwrap();
    clear_deposits(manager.game_mut().board_mut());
    manager
}

pub fn clear_deposits(board: &mut Board) {
    for at in board.positions() {
        board.set_background(at, None);
    }
}

// ===========================================================================
// Building helpers
// ===========================================================================

pub fn deposit(board: &mut Board, row: i32, col: i32, value: i32) {
    board.set_background(Position::new(row, col), Some(Background::Deposit(value)));
}

/// Lay `len` belts starting at `start`, each pointing `direction`.
pub fn belt_line(board: &mut Board, start: Position, direction: Direction, len: usize) -> Vec<CellId> {
    let mut at = start;
    let mut ids = Vec::with_capacity(len);
    for _ in 0..len {
        ids.push(board.place(at, Structure::Belt(direction)).unwrap());
        at = at.neighbor(direction);
    }
    ids
}

/// Run `n` board updates directly, without a clock.
pub fn update_n(board: &mut Board, n: usize) {
    for _ in 0..n {
        board.update();
    }
}

/// Tick the manager `n` times.
pub fn tick_n(manager: &mut GameManager, n: usize) {
    for _ in 0..n {
        manager.tick();
    }
}
