//! Tickworks Core -- a tick-driven grid automation simulator.
//!
//! A fixed board holds deposits and player-built machines that carry integer
//! products toward a central sink. Products divisible by the game's divisor
//! score a point when they arrive.
//!
//! # Tick
//!
//! Each call to [`manager::GameManager::tick`]:
//!
//! 1. **Clock** -- stop if the end tick is reached, else increment the tick.
//! 2. **Player** -- every third tick, ask the [`player::Player`] for one
//!    action and apply it.
//! 3. **Pass one** -- every occupied square, row-major: extractors mine,
//!    mergers emit sums, belts hand their head product on.
//! 4. **Pass two** -- every occupied square, row-major: belts advance their
//!    remaining products.
//!
//! # Backpressure
//!
//! Nothing is ever sent to a square that reports fewer than three free slots
//! (see [`cell::MIN_SEND_CAPACITY`]). Products that cannot move wait; the one
//! exception is an extractor, which loses its attempt.
//!
//! # Key Types
//!
//! - [`board::Board`] -- grid of cell stacks plus the foreground arena.
//! - [`cell::Foreground`] / [`cell::Machine`] -- wall, sink, belt, merger,
//!   extractor.
//! - [`manager::Game`] / [`manager::GameManager`] -- world generation and
//!   the tick loop.
//! - [`query::GameView`] -- what a player may read.
//! - [`config::GameConfig`] -- board size, belt length, divisor, seed.

pub mod board;
pub mod cell;
pub mod config;
pub mod error;
pub mod grid;
pub mod id;
pub mod manager;
pub mod player;
pub mod query;
pub mod rng;
pub mod sim;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
