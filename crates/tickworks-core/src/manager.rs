//! Game orchestration: world generation, the tick loop, and the player
//! cadence.
//!
//! [`Game`] owns the board and the clock. [`GameManager`] pairs a `Game` with
//! a [`Player`] and drives both. Keeping them apart lets the player read the
//! game through [`GameView`] while the manager holds the only mutable handle.
//!
//! # Tick
//!
//! Each [`GameManager::tick`]:
//! 1. Does nothing once the end tick is reached.
//! 2. Increments the tick counter.
//! 3. On every [`ACTION_CADENCE`]th tick, asks the player for one action and
//!    applies it. Rejected actions are logged and dropped.
//! 4. Runs the board's two-phase update.

use crate::board::Board;
use crate::cell::{Background, Structure};
use crate::config::GameConfig;
use crate::error::{ActionError, ConfigError, PlaceError};
use crate::grid::Position;
use crate::id::CellId;
use crate::player::{ActionKind, Player, PlayerAction};
use crate::query::{GameView, LayeredCell};
use crate::rng::SimRng;
use crate::sim::{ACTION_CADENCE, SimState, StateHash, TickReport};
use std::fmt;

/// Rolls that produce a deposit; the roll becomes the deposit's value.
const DEPOSIT_ROLLS: [i32; 6] = [1, 2, 3, 5, 7, 11];

/// Deposit rolls are taken modulo this.
const DEPOSIT_ROLL_RANGE: u64 = 30;

// ---------------------------------------------------------------------------
// Game
// ---------------------------------------------------------------------------

/// Board, clock and sink for one game.
#[derive(Debug, Clone)]
pub struct Game {
    config: GameConfig,
    board: Board,
    sim: SimState,
    sink: CellId,
}

impl Game {
    /// Validate `config` and generate the world from its seed.
    pub fn new(config: &GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut board = Board::new(config.board_width, config.board_height, config.belt_len);
        let deposits = generate_deposits(&mut board, config.seed);
        let sink = board.place(
            config.sink_anchor(),
            Structure::Sink {
                size: config.goal_size,
                divisor: config.divisor,
            },
        )?;
        let walls = generate_walls(&mut board, config.seed, config.wall_count);

        tracing::debug!(
            seed = config.seed,
            deposits,
            walls,
            width = config.board_width,
            height = config.board_height,
            "world generated"
        );

        Ok(Self {
            config: config.clone(),
            board,
            sim: SimState::new(config.end_tick),
            sink,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Direct board access for scenario setup and editors. Bypasses the
    /// player cadence.
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn sim_state(&self) -> SimState {
        self.sim
    }

    pub fn sink_id(&self) -> CellId {
        self.sink
    }

    /// Total products received by the sink, scoring or not.
    pub fn delivered(&self) -> u64 {
        self.board
            .foreground_by_id(self.sink)
            .and_then(|fg| fg.as_sink())
            .map_or(0, |sink| sink.received())
    }

    /// Apply one action to the board.
    ///
    /// `ActionKind::None` always succeeds and changes nothing.
    pub fn apply_action(&mut self, action: PlayerAction) -> Result<(), ActionError> {
        match action.kind {
            ActionKind::None => Ok(()),
            ActionKind::Clear => {
                self.board.remove(action.position)?;
                Ok(())
            }
            kind => {
                if let Some(structure) = kind.structure() {
                    self.board.place(action.position, structure)?;
                }
                Ok(())
            }
        }
    }

    /// Advance the clock and the board by one tick, without consulting any
    /// player. Returns false if the game was already over.
    pub fn advance(&mut self) -> bool {
        if self.sim.is_over() {
            return false;
        }
        self.sim.tick += 1;
        self.board.update();
        true
    }

    /// Hash of the clock, score and every square.
    pub fn state_hash(&self) -> u64 {
        let mut hash = StateHash::new();
        hash.write_u64(self.sim.tick);
        hash.write_u32(self.score());
        self.board.hash_into(&mut hash);
        hash.finish()
    }
}

impl GameView for Game {
    fn layered_cell(&self, at: Position) -> Option<LayeredCell> {
        let stack = self.board.cell_stack(at)?;
        Some(LayeredCell {
            foreground_id: stack.foreground,
            foreground: self.board.foreground(at).cloned(),
            background: stack.background,
        })
    }

    fn board_width(&self) -> u32 {
        self.board.width()
    }

    fn board_height(&self) -> u32 {
        self.board.height()
    }

    fn elapsed_ticks(&self) -> u64 {
        self.sim.tick
    }

    fn end_tick(&self) -> u64 {
        self.sim.end_tick
    }

    fn score(&self) -> u32 {
        self.board
            .foreground_by_id(self.sink)
            .and_then(|fg| fg.as_sink())
            .map_or(0, |sink| sink.scored())
    }

    fn level_info(&self) -> String {
        format!("({})", self.config.divisor)
    }

    fn is_scored_product(&self, value: i32) -> bool {
        value.checked_rem(self.config.divisor) == Some(0)
    }
}

// ---------------------------------------------------------------------------
// World generation
// ---------------------------------------------------------------------------

/// Scatter deposits row-major. Returns how many were placed.
fn generate_deposits(board: &mut Board, seed: u64) -> usize {
    let mut rng = SimRng::new(seed);
    let mut placed = 0;
    for at in board.positions() {
        let roll = (rng.next_u64() % DEPOSIT_ROLL_RANGE) as i32;
        if DEPOSIT_ROLLS.contains(&roll) {
            board.set_background(at, Some(Background::Deposit(roll)));
            placed += 1;
        }
    }
    placed
}

/// Drop `count` walls at random squares, skipping any already occupied.
/// Returns how many were placed.
fn generate_walls(board: &mut Board, seed: u64, count: u32) -> usize {
    let mut rng = SimRng::new(seed);
    let mut placed = 0;
    for _ in 0..count {
        let row = rng.next_below(board.height() as u64) as i32;
        let col = rng.next_below(board.width() as u64) as i32;
        match board.place(Position::new(row, col), Structure::Wall) {
            Ok(_) => placed += 1,
            Err(PlaceError::Occupied { .. }) => {}
            Err(err) => tracing::debug!(%err, row, col, "wall skipped"),
        }
    }
    placed
}

// ---------------------------------------------------------------------------
// GameManager
// ---------------------------------------------------------------------------

/// Drives a [`Game`] with a [`Player`].
pub struct GameManager {
    game: Game,
    player: Box<dyn Player>,
}

impl fmt::Debug for GameManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameManager")
            .field("game", &self.game)
            .finish_non_exhaustive()
    }
}

impl GameManager {
    pub fn new(config: GameConfig, player: impl Player + 'static) -> Result<Self, ConfigError> {
        Ok(Self {
            game: Game::new(&config)?,
            player: Box::new(player),
        })
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut Game {
        &mut self.game
    }

    pub fn board(&self) -> &Board {
        self.game.board()
    }

    /// Swap in a different decision-maker mid-game.
    pub fn set_player(&mut self, player: impl Player + 'static) {
        self.player = Box::new(player);
    }

    /// Apply an action immediately, outside the player cadence.
    pub fn apply_action(&mut self, action: PlayerAction) -> Result<(), ActionError> {
        self.game.apply_action(action)
    }

    /// Run one tick. See the module docs for the order of work.
    pub fn tick(&mut self) -> TickReport {
        if self.game.sim.is_over() {
            return TickReport::default();
        }

        let score_before = self.game.score();
        self.game.sim.tick += 1;
        let tick = self.game.sim.tick;

        let mut report = TickReport {
            advanced: true,
            ..TickReport::default()
        };

        if self.game.sim.is_action_tick() {
            let action = self.player.next_action(&self.game);
            match self.game.apply_action(action) {
                Ok(()) => report.action_applied = action.kind != ActionKind::None,
                Err(err) => tracing::debug!(tick, ?action, %err, "action rejected"),
            }
            report.action = Some(action);
        }

        self.game.board.update();
        report.scored = self.game.score() - score_before;

        if self.game.sim.is_over() {
            tracing::info!(
                tick,
                score = self.game.score(),
                delivered = self.game.delivered(),
                "game over"
            );
        }
        report
    }

    /// Tick until the game ends. Returns the final score.
    pub fn run_to_end(&mut self) -> u32 {
        while self.tick().advanced {}
        self.game.score()
    }

    pub fn state_hash(&self) -> u64 {
        self.game.state_hash()
    }
}

impl GameView for GameManager {
    fn layered_cell(&self, at: Position) -> Option<LayeredCell> {
        self.game.layered_cell(at)
    }

    fn board_width(&self) -> u32 {
        self.game.board_width()
    }

    fn board_height(&self) -> u32 {
        self.game.board_height()
    }

    fn elapsed_ticks(&self) -> u64 {
        self.game.elapsed_ticks()
    }

    fn end_tick(&self) -> u64 {
        self.game.end_tick()
    }

    fn score(&self) -> u32 {
        self.game.score()
    }

    fn level_info(&self) -> String {
        self.game.level_info()
    }

    fn is_scored_product(&self, value: i32) -> bool {
        self.game.is_scored_product(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::MachineKind;
    use crate::player::{IdlePlayer, ScriptedPlayer};
    use crate::test_utils::small_config;

    // -----------------------------------------------------------------------
    // World generation
    // -----------------------------------------------------------------------

    #[test]
    fn default_world_has_centered_sink() {
        let game = Game::new(&GameConfig::default()).unwrap();
        let sink = game.board().foreground_by_id(game.sink_id()).unwrap();
        assert_eq!(sink.kind(), MachineKind::Sink);
        assert_eq!(sink.anchor(), Position::new(16, 29));
        assert_eq!(sink.tiles().count(), 16);
        assert_eq!(game.board().foreground_id(Position::new(19, 32)), Some(game.sink_id()));
    }

    #[test]
    fn deposits_use_only_allowed_values() {
        let game = Game::new(&GameConfig::default()).unwrap();
        let mut count = 0;
        for at in game.board().positions() {
            if let Some(Background::Deposit(v)) = game.board().background(at) {
                assert!(DEPOSIT_ROLLS.contains(&v), "unexpected deposit {v}");
                count += 1;
            }
        }
        // 6 of 30 residues: roughly a fifth of 2232 squares.
        assert!(count > 300 && count < 600, "deposit count {count}");
    }

    #[test]
    fn walls_never_overlap_sink() {
        let config = GameConfig {
            wall_count: 5_000,
            ..GameConfig::default()
        };
        let game = Game::new(&config).unwrap();
        let walls = game
            .board()
            .foregrounds()
            .filter(|(_, fg)| fg.kind() == MachineKind::Wall)
            .count();
        assert!(walls > 0);
        assert_eq!(game.board().foreground_count(), walls + 1);
        assert_eq!(game.board().occupied_squares(), walls + 16);
    }

    #[test]
    fn same_seed_same_world() {
        let a = Game::new(&GameConfig::default()).unwrap();
        let b = Game::new(&GameConfig::default()).unwrap();
        assert_eq!(a.state_hash(), b.state_hash());

        let other = Game::new(&GameConfig {
            seed: 99,
            ..GameConfig::default()
        })
        .unwrap();
        assert_ne!(a.state_hash(), other.state_hash());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = GameConfig {
            divisor: 0,
            ..GameConfig::default()
        };
        assert_eq!(Game::new(&config).unwrap_err(), ConfigError::ZeroDivisor);
        assert!(GameManager::new(config, IdlePlayer).is_err());
    }

    // -----------------------------------------------------------------------
    // Actions
    // -----------------------------------------------------------------------

    #[test]
    fn build_and_clear_actions() {
        let mut game = Game::new(&small_config()).unwrap();
        let at = Position::new(0, 0);
        game.apply_action(PlayerAction::build(ActionKind::BuildTopToBottomBelt, 0, 0))
            .unwrap();
        assert_eq!(game.board().foreground(at).unwrap().kind(), MachineKind::Belt);

        game.apply_action(PlayerAction::clear(0, 0)).unwrap();
        assert!(game.board().foreground(at).is_none());

        assert_eq!(
            game.apply_action(PlayerAction::clear(0, 0)),
            Err(ActionError::Remove(crate::error::RemoveError::Empty { at }))
        );
        assert_eq!(game.apply_action(PlayerAction::none()), Ok(()));
    }

    #[test]
    fn clearing_sink_is_refused() {
        let mut game = Game::new(&small_config()).unwrap();
        let anchor = game.config().sink_anchor();
        assert!(matches!(
            game.apply_action(PlayerAction::clear(anchor.row, anchor.col)),
            Err(ActionError::Remove(_))
        ));
        assert!(game.board().foreground_by_id(game.sink_id()).is_some());
    }

    // -----------------------------------------------------------------------
    // Ticking
    // -----------------------------------------------------------------------

    #[test]
    fn player_consulted_every_third_tick() {
        let mut asked = Vec::new();
        let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let log = seen.clone();
        let player = move |view: &dyn GameView| {
            log.borrow_mut().push(view.elapsed_ticks());
            PlayerAction::none()
        };
        let mut manager = GameManager::new(small_config(), player).unwrap();
        for _ in 0..10 {
            let report = manager.tick();
            if report.action.is_some() {
                asked.push(manager.elapsed_ticks());
            }
        }
        assert_eq!(asked, vec![3, 6, 9]);
        assert_eq!(*seen.borrow(), vec![3, 6, 9]);
    }

    #[test]
    fn tick_stops_at_end() {
        let config = GameConfig {
            end_tick: 5,
            ..small_config()
        };
        let mut manager = GameManager::new(config, IdlePlayer).unwrap();
        assert_eq!(manager.run_to_end(), 0);
        assert_eq!(manager.elapsed_ticks(), 5);
        assert!(manager.is_game_over());
        assert!(!manager.tick().advanced);
        assert_eq!(manager.elapsed_ticks(), 5);
    }

    #[test]
    fn rejected_action_does_not_stop_game() {
        let anchor = small_config().sink_anchor();
        let player = ScriptedPlayer::new([PlayerAction::build(
            ActionKind::BuildLeftToRightBelt,
            anchor.row,
            anchor.col,
        )]);
        let mut manager = GameManager::new(small_config(), player).unwrap();
        let reports: Vec<TickReport> = (0..3).map(|_| manager.tick()).collect();
        assert!(reports[2].action.is_some());
        assert!(!reports[2].action_applied);
        assert_eq!(manager.elapsed_ticks(), 3);
    }

    #[test]
    fn view_reports_level_and_scoring_rule() {
        let manager = GameManager::new(
            GameConfig {
                divisor: 3,
                ..small_config()
            },
            IdlePlayer,
        )
        .unwrap();
        assert_eq!(manager.level_info(), "(3)");
        assert!(manager.is_scored_product(9));
        assert!(!manager.is_scored_product(4));
        assert!(manager.layered_cell(Position::new(-1, 0)).is_none());
        let sink_cell = manager.layered_cell(small_config().sink_anchor()).unwrap();
        assert_eq!(sink_cell.foreground_id, Some(manager.game().sink_id()));
    }

    #[test]
    fn advance_skips_player() {
        let mut game = Game::new(&GameConfig {
            end_tick: 2,
            ..small_config()
        })
        .unwrap();
        assert!(game.advance());
        assert!(game.advance());
        assert!(!game.advance());
        assert_eq!(game.elapsed_ticks(), 2);
    }
}
