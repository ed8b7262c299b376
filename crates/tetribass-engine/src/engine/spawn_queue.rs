use std::{collections::VecDeque, fmt::Write as _};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::PieceKind;

/// Target length of the upcoming-piece queue.
pub const QUEUE_TARGET_LEN: usize = 5;

/// Upcoming-piece queue plus the hold slot.
///
/// Strictly FIFO with uniform random refill: taking a piece pops the front
/// and immediately appends fresh uniformly random kinds until the queue is
/// back at [`QUEUE_TARGET_LEN`]. There is deliberately no 7-bag guarantee
/// (immediate repeats are possible), and refill-on-removal keeps the queue
/// non-empty by construction.
///
/// # Hold slot
///
/// - First hold stores the current piece and draws from the queue
/// - Subsequent holds swap the current piece with the held piece
#[derive(Debug, Clone)]
pub struct SpawnQueue {
    rng: Pcg32,
    queue: VecDeque<PieceKind>,
    held: Option<PieceKind>,
}

impl Default for SpawnQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Seed for deterministic piece generation.
///
/// A 128-bit (16-byte) seed for the queue's random number generator. The
/// same seed produces the same piece sequence, enabling reproducible
/// gameplay, replays, and deterministic tests. Serializes as a 32-character
/// hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueSeed([u8; 16]);

impl QueueSeed {
    /// Parses a seed from a 32-character hex string.
    pub fn from_hex(hex_str: &str) -> Result<Self, String> {
        if hex_str.len() != 32 {
            return Err(format!(
                "invalid hex: expected 32 characters, got {}",
                hex_str.len()
            ));
        }
        let num = u128::from_str_radix(hex_str, 16)
            .map_err(|e| format!("invalid hex: {hex_str} ({e})"))?;
        Ok(Self(num.to_be_bytes()))
    }

    /// Renders the seed as a 32-character lowercase hex string.
    #[must_use]
    pub fn to_hex(self) -> String {
        let num = u128::from_be_bytes(self.0);
        let mut hex_str = String::with_capacity(2 * self.0.len());
        write!(&mut hex_str, "{num:032x}").unwrap();
        hex_str
    }
}

impl Serialize for QueueSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for QueueSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        Self::from_hex(&hex_str).map_err(serde::de::Error::custom)
    }
}

/// Allows generating random `QueueSeed` values with `rng.random()`.
impl Distribution<QueueSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> QueueSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        QueueSeed(seed)
    }
}

impl SpawnQueue {
    /// Creates a queue with a random seed, filled to the target length.
    ///
    /// For deterministic piece generation, use [`Self::with_seed`] instead.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed.
    #[must_use]
    pub fn with_seed(seed: QueueSeed) -> Self {
        let rng = Pcg32::from_seed(seed.0);
        let queue = VecDeque::with_capacity(QUEUE_TARGET_LEN + 1);
        let mut this = Self {
            rng,
            queue,
            held: None,
        };
        this.refill();
        this
    }

    fn refill(&mut self) {
        while self.queue.len() < QUEUE_TARGET_LEN {
            self.queue.push_back(self.rng.random());
        }
    }

    /// Takes the front piece, refilling the queue back to its target length.
    ///
    /// # Panics
    ///
    /// Panics if the queue is empty (cannot happen with the refill policy).
    pub fn take_next(&mut self) -> PieceKind {
        let kind = self
            .queue
            .pop_front()
            .expect("spawn queue should never be empty");
        self.refill();
        kind
    }

    /// Returns an iterator over the upcoming pieces, front first.
    pub fn upcoming(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.queue.iter().copied()
    }

    /// Returns what piece would be received if hold were used now.
    ///
    /// - If a piece is held: the held piece
    /// - If no piece is held: the next piece in the queue
    #[must_use]
    pub fn peek_hold_result(&self) -> PieceKind {
        self.held.unwrap_or_else(|| self.queue[0])
    }

    /// Stores `current` in the hold slot and returns its replacement: the
    /// previously held piece, or the next queue piece on first use.
    pub fn swap_hold(&mut self, current: PieceKind) -> PieceKind {
        self.held
            .replace(current)
            .unwrap_or_else(|| self.take_next())
    }

    /// Returns the currently held piece, if any.
    #[must_use]
    pub fn held_piece(&self) -> Option<PieceKind> {
        self.held
    }
}
