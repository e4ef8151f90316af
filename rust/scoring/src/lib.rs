//! # gambit-scoring: Event-Driven Match Scoring
//!
//! A scoring system is a passive consumer of the match event bus. It
//! subscribes to a fixed whitelist of event kinds, maintains per-player
//! running statistics, and evaluates an ordered list of bonus and
//! penalty rules to produce a score breakdown per player.
//!
//! Rules are pure: a bonus rule looks at the current statistics plus the
//! most recent event, a penalty rule looks at a player's full event
//! history. Neither touches game state; only the scoring system's own
//! counters change as events arrive.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::Serialize;

use gambit_engine::engine::PlayerId;
use gambit_engine::events::{EventBus, EventKind, GameEvent, ListenerId};

pub mod poker;

/// Cumulative per-player counters, updated on every whitelisted event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlayerStats {
    pub hands_played: u32,
    pub hands_won: u32,
    pub showdowns_won: u32,
    /// Hands won before showdown after betting or raising in them.
    pub bluffs_won: u32,
    pub aggressive_actions: u32,
    pub biggest_pot: u32,
    pub minor_misreads: u32,
    pub major_misreads: u32,
    pub illogical_actions: u32,
}

/// One player's score at a point in time. `total` may go below the base
/// when penalties outweigh bonuses, but never below zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdown {
    pub base: u32,
    pub bonus: u32,
    pub penalty: u32,
    pub total: u32,
}

impl ScoreBreakdown {
    fn new(base: u32, bonus: u32, penalty: u32) -> Self {
        let total = (base + bonus).saturating_sub(penalty);
        Self {
            base,
            bonus,
            penalty,
            total,
        }
    }
}

/// A scoring system consumes events and answers score queries. The base
/// points are supplied by the caller at query time because they live in
/// game state (the chip stack, for poker), which the scorer never reads.
pub trait ScoringSystem: Send {
    /// Event kinds this system wants delivered.
    fn whitelist(&self) -> &'static [EventKind];

    /// Ingest one event: update counters and accrue bonus points.
    fn record(&mut self, event: &GameEvent);

    fn stats(&self, player: PlayerId) -> PlayerStats;

    fn breakdown(&self, player: PlayerId, base: u32) -> ScoreBreakdown;
}

/// Subscribe a scoring system to a bus. One listener per whitelisted
/// kind; the returned ids let the caller detach it at match end.
pub fn attach<S>(scoring: &Arc<Mutex<S>>, bus: &EventBus) -> Vec<ListenerId>
where
    S: ScoringSystem + 'static,
{
    let kinds = scoring.lock().expect("scoring lock poisoned").whitelist();
    kinds
        .iter()
        .map(|&kind| {
            let scoring = Arc::clone(scoring);
            bus.on(kind, move |event| {
                scoring.lock().expect("scoring lock poisoned").record(event);
            })
        })
        .collect()
}

/// Shared bookkeeping for concrete scoring systems: the raw event log
/// and the per-player statistics table.
#[derive(Debug, Default)]
pub(crate) struct ScoreLedger {
    pub events: Vec<GameEvent>,
    pub stats: HashMap<PlayerId, PlayerStats>,
    pub bonus_points: HashMap<PlayerId, u32>,
}

impl ScoreLedger {
    pub fn stats_mut(&mut self, player: PlayerId) -> &mut PlayerStats {
        self.stats.entry(player).or_default()
    }

    pub fn stats_of(&self, player: PlayerId) -> PlayerStats {
        self.stats.get(&player).copied().unwrap_or_default()
    }

    pub fn add_bonus(&mut self, player: PlayerId, points: u32) {
        if points > 0 {
            *self.bonus_points.entry(player).or_default() += points;
        }
    }

    /// Events involving one player, in arrival order.
    pub fn history_of(&self, player: PlayerId) -> Vec<&GameEvent> {
        self.events
            .iter()
            .filter(|e| involves(e, player))
            .collect()
    }
}

fn involves(event: &GameEvent, player: PlayerId) -> bool {
    match event {
        GameEvent::HandStarted { .. } => false,
        GameEvent::HandCompleted {
            winners, players, ..
        } => players.contains(&player) || winners.contains(&player),
        GameEvent::ActionExecuted { player: p, .. }
        | GameEvent::HandMisread { player: p, .. }
        | GameEvent::ActionIllogical { player: p, .. } => *p == player,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakdown_floors_at_zero() {
        let b = ScoreBreakdown::new(10, 5, 100);
        assert_eq!(b.total, 0);
        let b = ScoreBreakdown::new(100, 50, 30);
        assert_eq!(b.total, 120);
    }
}
