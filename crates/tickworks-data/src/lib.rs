//! Tickworks Data -- load a [`GameConfig`](tickworks_core::config::GameConfig)
//! from RON, TOML or JSON.
//!
//! The format is picked from the file extension. Loaded configs are validated
//! before they are returned, so a successful load can always start a game.

pub mod loader;

pub use loader::{DataLoadError, Format, load_config, load_config_dir};
