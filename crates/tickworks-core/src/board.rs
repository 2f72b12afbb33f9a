//! The board: a fixed grid of cell stacks plus the arena that owns every
//! foreground instance.
//!
//! Each square's [`CellStack`] holds at most one background and at most one
//! [`CellId`]. A foreground covering several squares is stored once in the
//! arena and referenced by the same id from every square it covers, so
//! removing it through any of those squares clears all of them.
//!
//! # Two-phase update
//!
//! [`Board::update`] runs pass one for every occupied square in row-major
//! order, then pass two in the same order. No pass-two work starts until all
//! of pass one has finished.

use crate::cell::{Background, Foreground, PassContext, Structure};
use crate::error::{PlaceError, RemoveError};
use crate::grid::{Direction, Footprint, Position};
use crate::id::CellId;
use crate::sim::StateHash;
use slotmap::SlotMap;

// ---------------------------------------------------------------------------
// CellStack
// ---------------------------------------------------------------------------

/// The layers stacked on one square.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellStack {
    pub foreground: Option<CellId>,
    pub background: Option<Background>,
}

impl CellStack {
    /// Empty foreground and a background that allows building (or none).
    pub fn can_build(&self) -> bool {
        self.foreground.is_none() && self.background.is_none_or(|bg| bg.can_build())
    }
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// A `width` x `height` grid of cell stacks.
#[derive(Debug, Clone)]
pub struct Board {
    width: u32,
    height: u32,
    belt_len: usize,
    stacks: Vec<CellStack>,
    cells: SlotMap<CellId, Foreground>,
}

impl Board {
    /// Create an empty board. `belt_len` sizes every belt built on it.
    pub fn new(width: u32, height: u32, belt_len: usize) -> Self {
        Self {
            width,
            height,
            belt_len,
            stacks: vec![CellStack::default(); width as usize * height as usize],
            cells: SlotMap::with_key(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn belt_len(&self) -> usize {
        self.belt_len
    }

    /// Whether `at` is on the board.
    pub fn contains(&self, at: Position) -> bool {
        at.row >= 0 && at.col >= 0 && (at.row as u32) < self.height && (at.col as u32) < self.width
    }

    fn index(&self, at: Position) -> Option<usize> {
        self.contains(at)
            .then(|| at.row as usize * self.width as usize + at.col as usize)
    }

    // -- Accessors --

    pub fn cell_stack(&self, at: Position) -> Option<&CellStack> {
        self.index(at).map(|i| &self.stacks[i])
    }

    pub fn foreground_id(&self, at: Position) -> Option<CellId> {
        self.cell_stack(at).and_then(|stack| stack.foreground)
    }

    pub fn foreground(&self, at: Position) -> Option<&Foreground> {
        self.foreground_id(at).and_then(|id| self.cells.get(id))
    }

    pub fn foreground_by_id(&self, id: CellId) -> Option<&Foreground> {
        self.cells.get(id)
    }

    pub fn background(&self, at: Position) -> Option<Background> {
        self.cell_stack(at).and_then(|stack| stack.background)
    }

    /// Replace the background at `at`. Off-board positions are ignored.
    pub fn set_background(&mut self, at: Position, background: Option<Background>) {
        if let Some(i) = self.index(at) {
            self.stacks[i].background = background;
        }
    }

    /// Number of distinct foreground instances.
    pub fn foreground_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of squares holding a foreground.
    pub fn occupied_squares(&self) -> usize {
        self.stacks.iter().filter(|s| s.foreground.is_some()).count()
    }

    /// Every foreground instance with its id, in arena order.
    pub fn foregrounds(&self) -> impl Iterator<Item = (CellId, &Foreground)> {
        self.cells.iter()
    }

    /// All board positions in row-major scan order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + use<> {
        Footprint::new(self.width, self.height).tiles(Position::new(0, 0))
    }

    // -- Placement --

    /// Check whether a footprint anchored at `anchor` fits and every covered
    /// square is buildable.
    pub fn check_placement(&self, anchor: Position, footprint: Footprint) -> Result<(), PlaceError> {
        let fits = anchor.row >= 0
            && anchor.col >= 0
            && anchor.row as i64 + footprint.height as i64 <= self.height as i64
            && anchor.col as i64 + footprint.width as i64 <= self.width as i64;
        if !fits {
            return Err(PlaceError::OutOfBounds { anchor });
        }

        for tile in footprint.tiles(anchor) {
            let stack = self.cell_stack(tile).ok_or(PlaceError::OutOfBounds { anchor })?;
            if stack.foreground.is_some() {
                return Err(PlaceError::Occupied { at: tile });
            }
            if !stack.can_build() {
                return Err(PlaceError::NotBuildable { at: tile });
            }
        }
        Ok(())
    }

    pub fn can_place(&self, anchor: Position, footprint: Footprint) -> bool {
        self.check_placement(anchor, footprint).is_ok()
    }

    /// Build `structure` with its top-left at `anchor`. On failure the board
    /// is untouched.
    pub fn place(&mut self, anchor: Position, structure: Structure) -> Result<CellId, PlaceError> {
        let candidate = Foreground::from_structure(anchor, structure, self.belt_len);
        self.check_placement(anchor, candidate.footprint())?;

        let tiles: Vec<Position> = candidate.tiles().collect();
        let id = self.cells.insert(candidate);
        for tile in tiles {
            if let Some(i) = self.index(tile) {
                self.stacks[i].foreground = Some(id);
            }
        }
        Ok(id)
    }

    /// Remove the foreground covering `at`, clearing its whole footprint.
    /// Returns the removed instance.
    pub fn remove(&mut self, at: Position) -> Result<Foreground, RemoveError> {
        let i = self.index(at).ok_or(RemoveError::OutOfBounds { at })?;
        let id = self.stacks[i].foreground.ok_or(RemoveError::Empty { at })?;
        let foreground = self.cells.get(id).ok_or(RemoveError::Empty { at })?;
        if !foreground.can_remove() {
            return Err(RemoveError::NotRemovable { at });
        }

        for tile in foreground.tiles() {
            if let Some(j) = self.index(tile) {
                if self.stacks[j].foreground == Some(id) {
                    self.stacks[j].foreground = None;
                }
            }
        }
        self.cells.remove(id).ok_or(RemoveError::Empty { at })
    }

    // -- Flow control --

    /// Room the foreground next to `at` (in `direction`) offers. 0 if that
    /// square is off-board or empty.
    pub fn neighbor_capacity(&self, at: Position, direction: Direction) -> usize {
        let target = at.neighbor(direction);
        self.foreground(target).map_or(0, |fg| fg.capacity(target))
    }

    /// Deliver `value` to the foreground next to `at`. Dropped if that square
    /// is off-board or empty.
    ///
    /// # Panics
    ///
    /// Panics if the receiver has no room; see [`Foreground::receive`].
    pub fn send(&mut self, at: Position, direction: Direction, value: i32) {
        let target = at.neighbor(direction);
        let Some(id) = self.foreground_id(target) else {
            return;
        };
        if let Some(receiver) = self.cells.get_mut(id) {
            receiver.receive(target, value);
        }
    }

    // -- Update --

    /// Advance every foreground by one tick.
    pub fn update(&mut self) {
        for at in self.positions() {
            self.pass_one_at(at);
        }
        for at in self.positions() {
            self.pass_two_at(at);
        }
    }

    fn pass_one_at(&mut self, at: Position) {
        let Some(id) = self.foreground_id(at) else {
            return;
        };
        let Some(direction) = self.cells.get(id).and_then(|fg| fg.output_direction()) else {
            return;
        };
        let ctx = PassContext {
            out_capacity: self.neighbor_capacity(at, direction),
            deposit: self.background(at).and_then(|bg| bg.deposit_value()),
        };
        let emitted = self.cells.get_mut(id).and_then(|fg| fg.pass_one(at, &ctx));
        if let Some(value) = emitted {
            self.send(at, direction, value);
        }
    }

    fn pass_two_at(&mut self, at: Position) {
        let Some(id) = self.foreground_id(at) else {
            return;
        };
        if let Some(fg) = self.cells.get_mut(id) {
            fg.pass_two(at);
        }
    }

    /// Feed every square's layers into `hash`, row-major.
    pub fn hash_into(&self, hash: &mut StateHash) {
        for at in self.positions() {
            match self.background(at) {
                Some(Background::Deposit(value)) => {
                    hash.write(&[1]);
                    hash.write_i32(value);
                }
                None => hash.write(&[0]),
            }
            match self.foreground(at) {
                Some(fg) => {
                    hash.write(&[fg.kind() as u8 + 1]);
                    hash.write_i32(fg.anchor().row);
                    hash.write_i32(fg.anchor().col);
                    if let Some(dir) = fg.output_direction() {
                        hash.write(&[dir.rotation_index()]);
                    }
                    for value in fg.contents() {
                        hash.write_i32(value);
                    }
                    if let Some(extractor) = fg.as_extractor() {
                        hash.write_u32(extractor.timer());
                    }
                }
                None => hash.write(&[0]),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{MIN_SEND_CAPACITY, Machine};

    fn pos(row: i32, col: i32) -> Position {
        Position::new(row, col)
    }

    fn belt_slots(board: &Board, at: Position) -> Vec<i32> {
        board.foreground(at).unwrap().as_belt().unwrap().slots().to_vec()
    }

    // -----------------------------------------------------------------------
    // Placement
    // -----------------------------------------------------------------------

    #[test]
    fn place_single_square() {
        let mut board = Board::new(8, 6, 10);
        let id = board.place(pos(2, 3), Structure::Belt(Direction::Right)).unwrap();
        assert_eq!(board.foreground_id(pos(2, 3)), Some(id));
        assert_eq!(board.foreground_count(), 1);
        assert_eq!(board.occupied_squares(), 1);
    }

    #[test]
    fn multi_square_shares_one_id() {
        let mut board = Board::new(8, 6, 10);
        let id = board.place(pos(1, 1), Structure::Merger(Direction::Top)).unwrap();
        assert_eq!(board.foreground_id(pos(1, 1)), Some(id));
        assert_eq!(board.foreground_id(pos(1, 2)), Some(id));
        assert_eq!(board.foreground_id(pos(2, 1)), None);
        assert_eq!(board.foreground_count(), 1);
        assert_eq!(board.occupied_squares(), 2);
    }

    #[test]
    fn place_rejects_overlap() {
        let mut board = Board::new(8, 6, 10);
        board.place(pos(1, 2), Structure::Wall).unwrap();
        let err = board.place(pos(1, 1), Structure::Merger(Direction::Bottom)).unwrap_err();
        assert_eq!(err, PlaceError::Occupied { at: pos(1, 2) });
        assert_eq!(board.foreground_id(pos(1, 1)), None);
    }

    #[test]
    fn place_rejects_out_of_bounds() {
        let mut board = Board::new(8, 6, 10);
        assert_eq!(
            board.place(pos(0, 7), Structure::Merger(Direction::Top)),
            Err(PlaceError::OutOfBounds { anchor: pos(0, 7) })
        );
        assert_eq!(
            board.place(pos(5, 0), Structure::Merger(Direction::Left)),
            Err(PlaceError::OutOfBounds { anchor: pos(5, 0) })
        );
        assert_eq!(
            board.place(pos(-1, 0), Structure::Wall),
            Err(PlaceError::OutOfBounds { anchor: pos(-1, 0) })
        );
        assert_eq!(board.foreground_count(), 0);
        assert_eq!(board.occupied_squares(), 0);
    }

    #[test]
    fn deposits_are_buildable() {
        let mut board = Board::new(4, 4, 10);
        board.set_background(pos(0, 0), Some(Background::Deposit(5)));
        assert!(board.can_place(pos(0, 0), Footprint::single()));
        board.place(pos(0, 0), Structure::Extractor(Direction::Right)).unwrap();
        assert_eq!(board.background(pos(0, 0)), Some(Background::Deposit(5)));
    }

    #[test]
    fn can_place_sees_whole_footprint() {
        let mut board = Board::new(10, 10, 10);
        board
            .place(pos(3, 3), Structure::Sink { size: 4, divisor: 2 })
            .unwrap();
        assert!(!board.can_place(pos(2, 2), Footprint::new(2, 2)));
        assert!(!board.can_place(pos(6, 6), Footprint::single()));
        assert!(board.can_place(pos(7, 7), Footprint::single()));
        assert!(board.can_place(pos(1, 1), Footprint::new(2, 2)));
    }

    // -----------------------------------------------------------------------
    // Removal
    // -----------------------------------------------------------------------

    #[test]
    fn remove_through_any_covered_square() {
        let mut board = Board::new(8, 6, 10);
        board.place(pos(2, 2), Structure::Merger(Direction::Right)).unwrap();
        let removed = board.remove(pos(3, 2)).unwrap();
        assert_eq!(removed.anchor(), pos(2, 2));
        assert_eq!(board.foreground_id(pos(2, 2)), None);
        assert_eq!(board.foreground_id(pos(3, 2)), None);
        assert_eq!(board.foreground_count(), 0);
    }

    #[test]
    fn remove_refuses_permanent_structures() {
        let mut board = Board::new(10, 10, 10);
        board.place(pos(0, 0), Structure::Wall).unwrap();
        board
            .place(pos(3, 3), Structure::Sink { size: 4, divisor: 2 })
            .unwrap();
        assert_eq!(board.remove(pos(0, 0)), Err(RemoveError::NotRemovable { at: pos(0, 0) }));
        assert_eq!(board.remove(pos(5, 5)), Err(RemoveError::NotRemovable { at: pos(5, 5) }));
        assert_eq!(board.occupied_squares(), 17);
    }

    #[test]
    fn remove_empty_and_off_board() {
        let mut board = Board::new(4, 4, 10);
        assert_eq!(board.remove(pos(1, 1)), Err(RemoveError::Empty { at: pos(1, 1) }));
        assert_eq!(board.remove(pos(4, 0)), Err(RemoveError::OutOfBounds { at: pos(4, 0) }));
    }

    #[test]
    fn removed_square_can_be_rebuilt() {
        let mut board = Board::new(4, 4, 10);
        let first = board.place(pos(1, 1), Structure::Belt(Direction::Top)).unwrap();
        board.remove(pos(1, 1)).unwrap();
        let second = board.place(pos(1, 1), Structure::Belt(Direction::Left)).unwrap();
        assert_ne!(first, second);
        assert!(board.foreground_by_id(first).is_none());
    }

    // -----------------------------------------------------------------------
    // Flow control
    // -----------------------------------------------------------------------

    #[test]
    fn neighbor_capacity_off_board_and_empty() {
        let mut board = Board::new(4, 4, 10);
        assert_eq!(board.neighbor_capacity(pos(0, 0), Direction::Top), 0);
        assert_eq!(board.neighbor_capacity(pos(0, 0), Direction::Right), 0);
        board.place(pos(0, 1), Structure::Belt(Direction::Right)).unwrap();
        assert_eq!(board.neighbor_capacity(pos(0, 0), Direction::Right), 10);
    }

    #[test]
    fn send_to_nothing_is_dropped() {
        let mut board = Board::new(4, 4, 10);
        board.send(pos(0, 0), Direction::Left, 5);
        board.send(pos(0, 0), Direction::Right, 5);
        assert_eq!(board.foreground_count(), 0);
    }

    #[test]
    fn send_addresses_merger_square() {
        let mut board = Board::new(6, 6, 10);
        board.place(pos(2, 2), Structure::Merger(Direction::Bottom)).unwrap();
        // Anchor (2, 2) is main for a Bottom merger.
        board.send(pos(1, 2), Direction::Bottom, 3);
        board.send(pos(1, 3), Direction::Bottom, 5);
        let merger = board.foreground(pos(2, 3)).unwrap().as_merger().unwrap();
        assert_eq!((merger.first(), merger.second()), (3, 5));
    }

    // -----------------------------------------------------------------------
    // Update
    // -----------------------------------------------------------------------

    #[test]
    fn belt_hands_product_to_next_belt() {
        let mut board = Board::new(4, 1, 10);
        board.place(pos(0, 0), Structure::Belt(Direction::Right)).unwrap();
        board.place(pos(0, 1), Structure::Belt(Direction::Right)).unwrap();
        board.send(pos(0, -1), Direction::Right, 7);
        assert_eq!(belt_slots(&board, pos(0, 0))[9], 7);

        let mut ticks = 0;
        while belt_slots(&board, pos(0, 1)).iter().all(|&v| v == 0) {
            board.update();
            ticks += 1;
            assert!(ticks < 50, "product never crossed");
        }
        // Received in pass one, advanced one slot in the same tick's pass two.
        assert_eq!(belt_slots(&board, pos(0, 1))[8], 7);
        assert!(belt_slots(&board, pos(0, 0)).iter().all(|&v| v == 0));
    }

    #[test]
    fn merger_emits_sum_next_tick() {
        let mut board = Board::new(6, 6, 10);
        board.place(pos(2, 2), Structure::Merger(Direction::Bottom)).unwrap();
        board.place(pos(3, 2), Structure::Belt(Direction::Bottom)).unwrap();
        board.send(pos(1, 2), Direction::Bottom, 3);
        board.send(pos(1, 3), Direction::Bottom, 5);
        assert!(board.neighbor_capacity(pos(2, 2), Direction::Bottom) >= MIN_SEND_CAPACITY);

        board.update();

        let merger = board.foreground(pos(2, 2)).unwrap().as_merger().unwrap();
        assert_eq!((merger.first(), merger.second()), (0, 0));
        let slots = belt_slots(&board, pos(3, 2));
        assert_eq!(slots.iter().filter(|&&v| v == 8).count(), 1);
    }

    #[test]
    fn capacity_is_read_before_pass_two() {
        let mut board = Board::new(3, 1, 10);
        board.set_background(pos(0, 0), Some(Background::Deposit(5)));
        board.place(pos(0, 0), Structure::Extractor(Direction::Right)).unwrap();
        board.place(pos(0, 1), Structure::Belt(Direction::Right)).unwrap();
        for _ in 1..crate::cell::EXTRACTION_PERIOD {
            board.update();
        }

        // Block the belt entry right before the extractor fires. Pass two
        // would clear it, but the extractor looks during pass one.
        board.send(pos(-1, 1), Direction::Bottom, 4);
        assert_eq!(board.neighbor_capacity(pos(0, 0), Direction::Right), 0);
        board.update();

        let slots = belt_slots(&board, pos(0, 1));
        assert_eq!(slots[8], 4);
        assert!(!slots.contains(&5));
        assert_eq!(board.foreground(pos(0, 0)).unwrap().as_extractor().unwrap().timer(), 0);
    }

    #[test]
    fn walls_and_sink_are_inert() {
        let mut board = Board::new(6, 6, 10);
        board.place(pos(0, 0), Structure::Wall).unwrap();
        board.place(pos(1, 1), Structure::Sink { size: 4, divisor: 2 }).unwrap();
        let before = board.clone();
        board.update();
        for at in board.positions() {
            assert_eq!(board.foreground(at), before.foreground(at));
        }
    }

    #[test]
    fn sink_counts_deliveries() {
        let mut board = Board::new(6, 6, 10);
        let sink = board.place(pos(1, 1), Structure::Sink { size: 4, divisor: 2 }).unwrap();
        board.send(pos(0, 1), Direction::Bottom, 4);
        board.send(pos(2, 0), Direction::Right, 3);
        match board.foreground_by_id(sink).unwrap().machine() {
            Machine::Sink(s) => {
                assert_eq!(s.scored(), 1);
                assert_eq!(s.received(), 2);
            }
            other => panic!("expected sink, got {other:?}"),
        }
    }

    #[test]
    fn hash_tracks_contents() {
        let mut a = Board::new(4, 4, 10);
        let mut b = Board::new(4, 4, 10);
        a.place(pos(0, 0), Structure::Belt(Direction::Right)).unwrap();
        b.place(pos(0, 0), Structure::Belt(Direction::Right)).unwrap();

        let digest = |board: &Board| {
            let mut h = StateHash::new();
            board.hash_into(&mut h);
            h.finish()
        };
        assert_eq!(digest(&a), digest(&b));
        a.send(pos(0, -1), Direction::Right, 3);
        assert_ne!(digest(&a), digest(&b));
    }
}
