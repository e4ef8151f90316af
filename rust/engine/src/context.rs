//! Per-match infrastructure services: seeded randomizer, match timer, and
//! the shared event bus handle. Pure infrastructure, no game knowledge.

use chrono::{SecondsFormat, Utc};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::events::EventBus;

/// Seeded RNG wrapper. The sole source of in-match nondeterminism: deck
/// shuffles and any engine tie-breaks draw from here, so a match's non-AI
/// trajectory is reproducible from the seed and the action sequence.
#[derive(Debug)]
pub struct Randomizer {
    rng: ChaCha20Rng,
    seed: u64,
}

impl Randomizer {
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or(0xC0FF_EE00);
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// The seed this randomizer was created with, recorded in hand records
    /// for deterministic replay.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }

    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            None
        } else {
            let idx = self.rng.random_range(0..items.len());
            Some(&items[idx])
        }
    }

    /// Uniform integer in `0..bound`. Returns 0 for a zero bound.
    pub fn next_int(&mut self, bound: u64) -> u64 {
        if bound == 0 {
            0
        } else {
            self.rng.random_range(0..bound)
        }
    }
}

/// Monotonic match clock plus a wall-clock start timestamp.
#[derive(Debug, Clone)]
pub struct MatchTimer {
    started: Instant,
    started_at: String,
}

impl MatchTimer {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            started_at: now_rfc3339(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// RFC3339 timestamp of when the match started.
    pub fn started_at(&self) -> &str {
        &self.started_at
    }
}

/// Current wall-clock time, RFC3339 with second precision.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Shared services for one match. Owned by the engine; the event bus is
/// handed out by `Arc` clone so scoring and orchestration can subscribe
/// without touching engine state.
#[derive(Debug)]
pub struct GameContext {
    pub match_id: String,
    pub events: Arc<EventBus>,
    pub rng: Randomizer,
    pub timer: MatchTimer,
}

impl GameContext {
    pub fn new(match_id: impl Into<String>, seed: Option<u64>) -> Self {
        Self {
            match_id: match_id.into(),
            events: Arc::new(EventBus::new()),
            rng: Randomizer::new(seed),
            timer: MatchTimer::start(),
        }
    }

    /// Handle to the match event bus, for subscribers living outside the
    /// engine (scoring, orchestration).
    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.events)
    }
}
