//! Cell variants: the background deposit marker and the five foreground
//! machines.
//!
//! Foregrounds use **enum dispatch** over the closed [`Machine`] set. Each
//! variant owns its own state machine; the board supplies whatever a variant
//! needs to observe about its surroundings through [`PassContext`] and routes
//! the returned product to the output neighbor.
//!
//! # Flow control
//!
//! A sender reads the receiving square's [`Foreground::capacity`] and only
//! sends when at least [`MIN_SEND_CAPACITY`] slots are free. `receive` trusts
//! that contract and panics when it is broken.

use crate::grid::{Direction, Footprint, Position};
use serde::{Deserialize, Serialize};

/// Free slots a receiver must report before anything is sent to it.
pub const MIN_SEND_CAPACITY: usize = 3;

/// Ticks between extraction attempts.
pub const EXTRACTION_PERIOD: u32 = 100;

/// Shortest belt buffer the head shuffle logic can address.
pub const MIN_BELT_LEN: usize = 3;

// ---------------------------------------------------------------------------
// Background
// ---------------------------------------------------------------------------

/// What lies under a square. Only deposits exist today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Background {
    /// A resource an extractor can mine. The value is the product it yields.
    Deposit(i32),
}

impl Background {
    /// Whether a foreground may be built on top.
    pub fn can_build(&self) -> bool {
        match self {
            Background::Deposit(_) => true,
        }
    }

    /// The value an extractor would mine here.
    pub fn deposit_value(&self) -> Option<i32> {
        match self {
            Background::Deposit(value) => Some(*value),
        }
    }
}

// ---------------------------------------------------------------------------
// Blueprint
// ---------------------------------------------------------------------------

/// A request to build something. The board turns it into a [`Foreground`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Structure {
    Wall,
    Sink { size: u32, divisor: i32 },
    Belt(Direction),
    Merger(Direction),
    Extractor(Direction),
}

/// Fieldless tag for each foreground variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MachineKind {
    Wall,
    Sink,
    Belt,
    Merger,
    Extractor,
}

// ---------------------------------------------------------------------------
// Per-tick context
// ---------------------------------------------------------------------------

/// What a foreground may observe about its surroundings during pass one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassContext {
    /// Capacity reported by the output neighbor (0 if off-board or empty).
    pub out_capacity: usize,
    /// Deposit value under the square being updated, if any.
    pub deposit: Option<i32>,
}

// ---------------------------------------------------------------------------
// Belt
// ---------------------------------------------------------------------------

/// A conveyor with a fixed-length slot buffer.
///
/// Products enter at the last slot and leave from slot 0, which is the slot
/// next to the output neighbor. A slot holding 0 is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Belt {
    direction: Direction,
    slots: Vec<i32>,
}

impl Belt {
    /// Create an empty belt. `len` is raised to [`MIN_BELT_LEN`] if shorter.
    pub fn new(direction: Direction, len: usize) -> Self {
        Self {
            direction,
            slots: vec![0; len.max(MIN_BELT_LEN)],
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Slot contents, exit end first.
    pub fn slots(&self) -> &[i32] {
        &self.slots
    }

    /// Number of non-empty slots.
    pub fn product_count(&self) -> usize {
        self.slots.iter().filter(|&&v| v != 0).count()
    }

    /// Empty slots counted from the entry end up to the first product.
    pub fn capacity(&self) -> usize {
        self.slots.iter().rev().take_while(|&&v| v == 0).count()
    }

    /// Put a product into the entry slot.
    ///
    /// # Panics
    ///
    /// Panics if `value` is 0 or the entry slot is occupied.
    pub fn receive(&mut self, value: i32) {
        assert!(value != 0, "belt received an empty product");
        let last = self.slots.len() - 1;
        assert_eq!(self.slots[last], 0, "belt entry slot already occupied");
        self.slots[last] = value;
    }

    /// Hand the front product to the output neighbor when it has room, and
    /// pull the next products up to the head.
    ///
    /// Returns the product to send, if any.
    pub fn pass_one(&mut self, out_capacity: usize) -> Option<i32> {
        let mut emitted = None;

        if out_capacity >= MIN_SEND_CAPACITY && self.slots[0] != 0 {
            emitted = Some(std::mem::take(&mut self.slots[0]));
        }

        if out_capacity >= 2 && self.slots[0] == 0 && self.slots[1] != 0 {
            self.slots.swap(0, 1);
        }

        if out_capacity >= 1 && self.slots[0] == 0 && self.slots[1] == 0 && self.slots[2] != 0 {
            self.slots.swap(1, 2);
        }

        emitted
    }

    /// Advance every product one slot if the three slots ahead of it are
    /// empty. Scans from the exit end so no product moves twice.
    pub fn pass_two(&mut self) {
        for k in MIN_BELT_LEN..self.slots.len() {
            if self.slots[k] != 0 && self.slots[k - 3..k].iter().all(|&v| v == 0) {
                self.slots.swap(k, k - 1);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Merger
// ---------------------------------------------------------------------------

/// Sums one product from each of its two squares into a single output.
///
/// Occupies 2x1 when facing `Top`/`Bottom` and 1x2 when facing
/// `Right`/`Left`. The "main" square owns the `first` slot and is the one
/// that emits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Merger {
    direction: Direction,
    first: i32,
    second: i32,
    room: usize,
}

impl Merger {
    /// `room` is the capacity reported for an empty slot.
    pub fn new(direction: Direction, room: usize) -> Self {
        Self {
            direction,
            first: 0,
            second: 0,
            room,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn first(&self) -> i32 {
        self.first
    }

    pub fn second(&self) -> i32 {
        self.second
    }

    pub fn footprint(&self) -> Footprint {
        if self.direction.is_vertical() {
            Footprint::new(2, 1)
        } else {
            Footprint::new(1, 2)
        }
    }

    /// Top/Right mergers treat the non-anchor square as main; Bottom/Left
    /// mergers treat the anchor square as main.
    pub fn is_main(&self, anchor: Position, at: Position) -> bool {
        match self.direction {
            Direction::Top | Direction::Right => at != anchor,
            Direction::Bottom | Direction::Left => at == anchor,
        }
    }

    pub fn capacity(&self, anchor: Position, at: Position) -> usize {
        let slot = if self.is_main(anchor, at) {
            self.first
        } else {
            self.second
        };
        if slot == 0 { self.room } else { 0 }
    }

    /// # Panics
    ///
    /// Panics if `value` is 0 or the addressed slot is occupied.
    pub fn receive(&mut self, anchor: Position, at: Position, value: i32) {
        assert!(value != 0, "merger received an empty product");
        let slot = if self.is_main(anchor, at) {
            &mut self.first
        } else {
            &mut self.second
        };
        assert_eq!(*slot, 0, "merger slot already occupied");
        *slot = value;
    }

    /// Emit the sum once both slots are full and the output has room.
    /// Only the main square does anything.
    pub fn pass_one(&mut self, anchor: Position, at: Position, out_capacity: usize) -> Option<i32> {
        if !self.is_main(anchor, at) {
            return None;
        }
        if self.first != 0 && self.second != 0 && out_capacity >= MIN_SEND_CAPACITY {
            let sum = self.first + self.second;
            self.first = 0;
            self.second = 0;
            return Some(sum);
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Extractor
// ---------------------------------------------------------------------------

/// Mines the deposit under it once every [`EXTRACTION_PERIOD`] ticks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extractor {
    direction: Direction,
    timer: u32,
}

impl Extractor {
    pub fn new(direction: Direction) -> Self {
        Self { direction, timer: 0 }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Ticks elapsed in the current period.
    pub fn timer(&self) -> u32 {
        self.timer
    }

    /// The period restarts whether or not the attempt succeeds; a missed
    /// extraction is not retried.
    pub fn pass_one(&mut self, ctx: &PassContext) -> Option<i32> {
        self.timer += 1;
        if self.timer < EXTRACTION_PERIOD {
            return None;
        }
        self.timer = 0;

        let emitted = match ctx.deposit {
            Some(value) if value != 0 && ctx.out_capacity >= MIN_SEND_CAPACITY => Some(value),
            _ => None,
        };
        tracing::trace!(?emitted, out_capacity = ctx.out_capacity, "extraction attempt");
        emitted
    }
}

// ---------------------------------------------------------------------------
// Sink
// ---------------------------------------------------------------------------

/// The collection center. Accepts everything and scores products that are
/// multiples of its divisor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sink {
    size: u32,
    divisor: i32,
    room: usize,
    scored: u32,
    received: u64,
}

impl Sink {
    pub fn new(size: u32, divisor: i32, room: usize) -> Self {
        Self {
            size,
            divisor,
            room,
            scored: 0,
            received: 0,
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn divisor(&self) -> i32 {
        self.divisor
    }

    /// Products that counted toward the score.
    pub fn scored(&self) -> u32 {
        self.scored
    }

    /// Every product delivered, scoring or not.
    pub fn received(&self) -> u64 {
        self.received
    }

    pub fn capacity(&self) -> usize {
        self.room
    }

    /// A zero divisor never scores.
    pub fn is_scoring(&self, value: i32) -> bool {
        value.checked_rem(self.divisor) == Some(0)
    }

    /// # Panics
    ///
    /// Panics if `value` is 0.
    pub fn receive(&mut self, value: i32) {
        assert!(value != 0, "sink received an empty product");
        self.received += 1;
        if self.is_scoring(value) {
            self.scored += 1;
        }
    }
}

// ---------------------------------------------------------------------------
// Machine / Foreground
// ---------------------------------------------------------------------------

/// The closed set of foreground variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Machine {
    Wall,
    Sink(Sink),
    Belt(Belt),
    Merger(Merger),
    Extractor(Extractor),
}

/// A placed foreground: a machine plus the anchor its footprint hangs from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Foreground {
    anchor: Position,
    machine: Machine,
}

impl Foreground {
    pub fn new(anchor: Position, machine: Machine) -> Self {
        Self { anchor, machine }
    }

    /// Build the foreground a [`Structure`] describes. `belt_len` sizes belt
    /// buffers and is also the room sinks and mergers advertise.
    pub fn from_structure(anchor: Position, structure: Structure, belt_len: usize) -> Self {
        let machine = match structure {
            Structure::Wall => Machine::Wall,
            Structure::Sink { size, divisor } => Machine::Sink(Sink::new(size, divisor, belt_len)),
            Structure::Belt(dir) => Machine::Belt(Belt::new(dir, belt_len)),
            Structure::Merger(dir) => Machine::Merger(Merger::new(dir, belt_len)),
            Structure::Extractor(dir) => Machine::Extractor(Extractor::new(dir)),
        };
        Self::new(anchor, machine)
    }

    /// Top-left square of the footprint.
    pub fn anchor(&self) -> Position {
        self.anchor
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    pub fn machine_mut(&mut self) -> &mut Machine {
        &mut self.machine
    }

    pub fn kind(&self) -> MachineKind {
        match &self.machine {
            Machine::Wall => MachineKind::Wall,
            Machine::Sink(_) => MachineKind::Sink,
            Machine::Belt(_) => MachineKind::Belt,
            Machine::Merger(_) => MachineKind::Merger,
            Machine::Extractor(_) => MachineKind::Extractor,
        }
    }

    pub fn footprint(&self) -> Footprint {
        match &self.machine {
            Machine::Wall | Machine::Belt(_) | Machine::Extractor(_) => Footprint::single(),
            Machine::Sink(sink) => Footprint::square(sink.size()),
            Machine::Merger(merger) => merger.footprint(),
        }
    }

    pub fn width(&self) -> u32 {
        self.footprint().width
    }

    pub fn height(&self) -> u32 {
        self.footprint().height
    }

    /// Squares covered, row-major from the anchor.
    pub fn tiles(&self) -> impl Iterator<Item = Position> + use<> {
        self.footprint().tiles(self.anchor)
    }

    /// Walls and the sink are permanent.
    pub fn can_remove(&self) -> bool {
        !matches!(self.machine, Machine::Wall | Machine::Sink(_))
    }

    /// The side this foreground pushes products out of, if it emits at all.
    pub fn output_direction(&self) -> Option<Direction> {
        match &self.machine {
            Machine::Wall | Machine::Sink(_) => None,
            Machine::Belt(belt) => Some(belt.direction()),
            Machine::Merger(merger) => Some(merger.direction()),
            Machine::Extractor(extractor) => Some(extractor.direction()),
        }
    }

    /// Free slots offered to a product arriving at square `at`.
    pub fn capacity(&self, at: Position) -> usize {
        match &self.machine {
            Machine::Wall | Machine::Extractor(_) => 0,
            Machine::Sink(sink) => sink.capacity(),
            Machine::Belt(belt) => belt.capacity(),
            Machine::Merger(merger) => merger.capacity(self.anchor, at),
        }
    }

    /// Accept a product arriving at square `at`. Walls and extractors drop it.
    ///
    /// # Panics
    ///
    /// Panics if `value` is 0 or the addressed slot is occupied. Callers must
    /// check [`capacity`](Self::capacity) first.
    pub fn receive(&mut self, at: Position, value: i32) {
        let anchor = self.anchor;
        match &mut self.machine {
            Machine::Wall | Machine::Extractor(_) => {}
            Machine::Sink(sink) => sink.receive(value),
            Machine::Belt(belt) => belt.receive(value),
            Machine::Merger(merger) => merger.receive(anchor, at, value),
        }
    }

    /// First update phase, run for every covered square `at`. Returns a
    /// product to send toward [`output_direction`](Self::output_direction).
    pub fn pass_one(&mut self, at: Position, ctx: &PassContext) -> Option<i32> {
        let anchor = self.anchor;
        match &mut self.machine {
            Machine::Wall | Machine::Sink(_) => None,
            Machine::Belt(belt) => belt.pass_one(ctx.out_capacity),
            Machine::Merger(merger) => merger.pass_one(anchor, at, ctx.out_capacity),
            Machine::Extractor(extractor) => extractor.pass_one(ctx),
        }
    }

    /// Second update phase. Only belts do anything here.
    pub fn pass_two(&mut self, _at: Position) {
        if let Machine::Belt(belt) = &mut self.machine {
            belt.pass_two();
        }
    }

    /// Slot contents for inspection: belt buffer, merger `[first, second]`,
    /// nothing for the rest.
    pub fn contents(&self) -> Vec<i32> {
        match &self.machine {
            Machine::Belt(belt) => belt.slots().to_vec(),
            Machine::Merger(merger) => vec![merger.first(), merger.second()],
            Machine::Wall | Machine::Sink(_) | Machine::Extractor(_) => Vec::new(),
        }
    }

    pub fn as_belt(&self) -> Option<&Belt> {
        match &self.machine {
            Machine::Belt(belt) => Some(belt),
            _ => None,
        }
    }

    pub fn as_merger(&self) -> Option<&Merger> {
        match &self.machine {
            Machine::Merger(merger) => Some(merger),
            _ => None,
        }
    }

    pub fn as_extractor(&self) -> Option<&Extractor> {
        match &self.machine {
            Machine::Extractor(extractor) => Some(extractor),
            _ => None,
        }
    }

    pub fn as_sink(&self) -> Option<&Sink> {
        match &self.machine {
            Machine::Sink(sink) => Some(sink),
            _ => None,
        }
    }
}
