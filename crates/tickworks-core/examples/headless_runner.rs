//! Headless game: plan one extraction line into the sink, play to the end,
//! and print the score.
//!
//! Run with: `cargo run -p tickworks-core --example headless_runner -- [seed]`
//! Set `RUST_LOG=tickworks_core=debug` to see rejected actions.

use tickworks_core::cell::Background;
use tickworks_core::config::GameConfig;
use tickworks_core::grid::Position;
use tickworks_core::manager::GameManager;
use tickworks_core::player::{ActionKind, Player, PlayerAction, ScriptedPlayer};
use tickworks_core::query::GameView;

/// On its first turn, looks left of the sink along each of its rows for a
/// scoring deposit with a clear run to the sink, then builds it one piece
/// per turn.
struct LineBuilder {
    sink: Position,
    goal_size: i32,
    plan: Option<ScriptedPlayer>,
}

impl LineBuilder {
    fn plan(&self, view: &dyn GameView) -> Vec<PlayerAction> {
        for row in self.sink.row..self.sink.row + self.goal_size {
            for col in (0..self.sink.col).rev() {
                let Some(cell) = view.layered_cell(Position::new(row, col)) else {
                    break;
                };
                if cell.foreground.is_some() {
                    break;
                }
                if let Some(Background::Deposit(value)) = cell.background {
                    if view.is_scored_product(value) {
                        let mut actions =
                            vec![PlayerAction::build(ActionKind::BuildRightOutExtractor, row, col)];
                        actions.extend(
                            (col + 1..self.sink.col)
                                .map(|c| PlayerAction::build(ActionKind::BuildLeftToRightBelt, row, c)),
                        );
                        return actions;
                    }
                }
            }
        }
        Vec::new()
    }
}

impl Player for LineBuilder {
    fn next_action(&mut self, view: &dyn GameView) -> PlayerAction {
        if self.plan.is_none() {
            let actions = self.plan(view);
            tracing::info!(steps = actions.len(), "line planned");
            self.plan = Some(ScriptedPlayer::new(actions));
        }
        match self.plan.as_mut() {
            Some(plan) => plan.next_action(view),
            None => PlayerAction::none(),
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);
    let config = GameConfig {
        seed,
        ..GameConfig::default()
    };

    let player = LineBuilder {
        sink: config.sink_anchor(),
        goal_size: config.goal_size as i32,
        plan: None,
    };
    let mut manager = match GameManager::new(config, player) {
        Ok(manager) => manager,
        Err(err) => {
            eprintln!("invalid config: {err}");
            std::process::exit(1);
        }
    };

    let score = manager.run_to_end();
    println!("=== Tickworks ===");
    println!("seed:      {seed}");
    println!("rule:      {}", manager.level_info());
    println!("ticks:     {}", manager.elapsed_ticks());
    println!("delivered: {}", manager.game().delivered());
    println!("score:     {score}");
}
