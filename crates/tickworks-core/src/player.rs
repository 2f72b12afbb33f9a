//! The decision-maker contract and its action vocabulary.
//!
//! A [`Player`] is consulted once every [`ACTION_CADENCE`](crate::sim::ACTION_CADENCE)
//! ticks and answers with one [`PlayerAction`]. Players only ever see the
//! game through [`GameView`].

use crate::cell::Structure;
use crate::grid::{Direction, Position};
use crate::query::GameView;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// Everything a player can ask for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    BuildLeftToRightBelt,
    BuildTopToBottomBelt,
    BuildRightToLeftBelt,
    BuildBottomToTopBelt,
    BuildLeftOutExtractor,
    BuildTopOutExtractor,
    BuildRightOutExtractor,
    BuildBottomOutExtractor,
    BuildTopOutMerger,
    BuildRightOutMerger,
    BuildBottomOutMerger,
    BuildLeftOutMerger,
    /// Remove whatever removable foreground covers the position.
    Clear,
    #[default]
    None,
}

impl ActionKind {
    pub const ALL: [ActionKind; 14] = [
        ActionKind::BuildLeftToRightBelt,
        ActionKind::BuildTopToBottomBelt,
        ActionKind::BuildRightToLeftBelt,
        ActionKind::BuildBottomToTopBelt,
        ActionKind::BuildLeftOutExtractor,
        ActionKind::BuildTopOutExtractor,
        ActionKind::BuildRightOutExtractor,
        ActionKind::BuildBottomOutExtractor,
        ActionKind::BuildTopOutMerger,
        ActionKind::BuildRightOutMerger,
        ActionKind::BuildBottomOutMerger,
        ActionKind::BuildLeftOutMerger,
        ActionKind::Clear,
        ActionKind::None,
    ];

    /// The structure a build action places, or `None` for `Clear`/`None`.
    ///
    /// Belts are named by where products enter and leave, so a left-to-right
    /// belt outputs to the right.
    pub fn structure(self) -> Option<Structure> {
        let structure = match self {
            ActionKind::BuildLeftToRightBelt => Structure::Belt(Direction::Right),
            ActionKind::BuildTopToBottomBelt => Structure::Belt(Direction::Bottom),
            ActionKind::BuildRightToLeftBelt => Structure::Belt(Direction::Left),
            ActionKind::BuildBottomToTopBelt => Structure::Belt(Direction::Top),
            ActionKind::BuildLeftOutExtractor => Structure::Extractor(Direction::Left),
            ActionKind::BuildTopOutExtractor => Structure::Extractor(Direction::Top),
            ActionKind::BuildRightOutExtractor => Structure::Extractor(Direction::Right),
            ActionKind::BuildBottomOutExtractor => Structure::Extractor(Direction::Bottom),
            ActionKind::BuildTopOutMerger => Structure::Merger(Direction::Top),
            ActionKind::BuildRightOutMerger => Structure::Merger(Direction::Right),
            ActionKind::BuildBottomOutMerger => Structure::Merger(Direction::Bottom),
            ActionKind::BuildLeftOutMerger => Structure::Merger(Direction::Left),
            ActionKind::Clear | ActionKind::None => return None,
        };
        Some(structure)
    }

    pub fn is_build(self) -> bool {
        self.structure().is_some()
    }
}

/// One decision: what to do, and where.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerAction {
    pub kind: ActionKind,
    pub position: Position,
}

impl PlayerAction {
    pub fn new(kind: ActionKind, position: Position) -> Self {
        Self { kind, position }
    }

    /// Do nothing this turn.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn build(kind: ActionKind, row: i32, col: i32) -> Self {
        Self::new(kind, Position::new(row, col))
    }

    pub fn clear(row: i32, col: i32) -> Self {
        Self::new(ActionKind::Clear, Position::new(row, col))
    }
}

// ---------------------------------------------------------------------------
// Player trait
// ---------------------------------------------------------------------------

/// Something that decides what to build.
pub trait Player {
    /// Choose the next action. Called once per action tick.
    fn next_action(&mut self, view: &dyn GameView) -> PlayerAction;
}

impl<F> Player for F
where
    F: FnMut(&dyn GameView) -> PlayerAction,
{
    fn next_action(&mut self, view: &dyn GameView) -> PlayerAction {
        self(view)
    }
}

/// Never does anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdlePlayer;

impl Player for IdlePlayer {
    fn next_action(&mut self, _view: &dyn GameView) -> PlayerAction {
        PlayerAction::none()
    }
}

/// Replays a fixed list of actions, one per call, then idles.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPlayer {
    queue: VecDeque<PlayerAction>,
}

impl ScriptedPlayer {
    pub fn new(actions: impl IntoIterator<Item = PlayerAction>) -> Self {
        Self {
            queue: actions.into_iter().collect(),
        }
    }

    pub fn push(&mut self, action: PlayerAction) {
        self.queue.push_back(action);
    }

    /// Actions not yet handed out.
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl Player for ScriptedPlayer {
    fn next_action(&mut self, _view: &dyn GameView) -> PlayerAction {
        self.queue.pop_front().unwrap_or_default()
    }
}
