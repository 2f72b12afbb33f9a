//! Simulation clock and state hashing.

/// How often the player is asked for an action, in ticks.
pub const ACTION_CADENCE: u64 = 3;

// ---------------------------------------------------------------------------
// Simulation state
// ---------------------------------------------------------------------------

/// The game clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SimState {
    /// Ticks elapsed so far.
    pub tick: u64,
    /// The tick at which the game stops advancing.
    pub end_tick: u64,
}

impl SimState {
    pub fn new(end_tick: u64) -> Self {
        Self { tick: 0, end_tick }
    }

    pub fn is_over(&self) -> bool {
        self.tick >= self.end_tick
    }

    /// Whether the player is consulted on the current tick.
    pub fn is_action_tick(&self) -> bool {
        self.tick % ACTION_CADENCE == 0
    }
}

// ---------------------------------------------------------------------------
// Tick report
// ---------------------------------------------------------------------------

/// What happened during one `GameManager::tick` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// False when the game was already over and nothing ran.
    pub advanced: bool,
    /// The action the player chose, on cadence ticks.
    pub action: Option<crate::player::PlayerAction>,
    /// Whether that action changed the board.
    pub action_applied: bool,
    /// Points scored during this tick's update.
    pub scored: u32,
}

// ---------------------------------------------------------------------------
// State hash
// ---------------------------------------------------------------------------

/// A simple deterministic hash of simulation state for comparing runs.
///
/// Uses FNV-1a (64-bit) for speed and simplicity. Not cryptographic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateHash(pub u64);

impl StateHash {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    /// Start a new hash.
    pub fn new() -> Self {
        Self(Self::FNV_OFFSET)
    }

    /// Feed bytes into the hash.
    pub fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u64;
            self.0 = self.0.wrapping_mul(Self::FNV_PRIME);
        }
    }

    pub fn write_u64(&mut self, v: u64) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_i32(&mut self, v: i32) {
        self.write(&v.to_le_bytes());
    }

    /// Finalize and return the hash value.
    pub fn finish(self) -> u64 {
        self.0
    }
}

impl Default for StateHash {
    fn default() -> Self {
        Self::new()
    }
}
