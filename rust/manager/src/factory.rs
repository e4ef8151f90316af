//! Match construction.
//!
//! A factory call builds the whole stack for one match: the context with
//! its seeded randomizer and event bus, the engine, and (for poker) the
//! scoring system already subscribed to the bus. Agents are registered
//! afterwards, one per seat.

use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::info;

use gambit_engine::connect4::Connect4Engine;
use gambit_engine::context::GameContext;
use gambit_engine::engine::{GameEngine, PlayerId};
use gambit_engine::poker::{PokerConfig, PokerEngine};
use gambit_scoring::poker::PokerScoring;
use gambit_scoring::{ScoreBreakdown, ScoringSystem};

use crate::{GameManager, ManagerError, TURN_LIMIT};

/// The games this framework can host. A closed set: adding a game means
/// adding an engine, an agent, and a factory arm.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    Poker,
    Connect4,
}

pub struct GameFactory;

impl GameFactory {
    /// Build a poker match with its scoring system attached to the bus.
    pub fn poker(match_id: &str, seed: Option<u64>, config: PokerConfig) -> PokerMatch {
        let ctx = GameContext::new(match_id, seed);
        let bus = ctx.event_bus();
        let scoring = PokerScoring::attached(&bus);
        let engine = PokerEngine::new(config, ctx);
        info!(match_id, kind = ?GameKind::Poker, "match created");
        PokerMatch {
            manager: GameManager::new(engine, bus),
            scoring,
        }
    }

    pub fn connect4(
        match_id: &str,
        seed: Option<u64>,
        players: [PlayerId; 2],
    ) -> GameManager<Connect4Engine> {
        let ctx = GameContext::new(match_id, seed);
        let bus = ctx.event_bus();
        let engine = Connect4Engine::new(players, ctx);
        info!(match_id, kind = ?GameKind::Connect4, "match created");
        GameManager::new(engine, bus)
    }
}

/// Final standings of a completed match.
#[derive(Debug, Clone, Serialize)]
pub struct MatchOutcome {
    pub hands_played: u32,
    pub winners: Vec<PlayerId>,
    pub scores: Vec<PlayerScore>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerScore {
    pub player: PlayerId,
    pub breakdown: ScoreBreakdown,
}

/// A poker match: the manager plus the scoring system listening to its
/// bus. The scoring handle stays shared so callers can query standings
/// mid-match.
pub struct PokerMatch {
    pub manager: GameManager<PokerEngine>,
    pub scoring: Arc<Mutex<PokerScoring>>,
}

impl PokerMatch {
    /// Play one complete hand, from deal to settlement.
    pub async fn run_hand(&mut self) -> Result<Vec<PlayerId>, ManagerError> {
        self.manager.engine_mut().start_hand()?;
        let mut turns = 0u32;
        while !self.manager.engine().state().hand_complete {
            if self.manager.play_turn().await?.is_none() {
                break;
            }
            turns += 1;
            if turns > TURN_LIMIT {
                return Err(ManagerError::TurnLimitExceeded);
            }
        }
        Ok(self.manager.engine().state().winners.clone())
    }

    /// Play hands until one player holds all the chips or the hand cap
    /// is reached, then report standings.
    pub async fn run_match(&mut self, max_hands: u32) -> Result<MatchOutcome, ManagerError> {
        let mut hands_played = 0u32;
        while hands_played < max_hands && !self.manager.engine().is_game_over() {
            self.run_hand().await?;
            hands_played += 1;
        }

        let scoring = self.scoring.lock().expect("scoring lock poisoned");
        let scores = self
            .manager
            .engine()
            .state()
            .players
            .iter()
            .map(|p| PlayerScore {
                player: p.id,
                breakdown: scoring.breakdown(p.id, p.chips),
            })
            .collect();
        drop(scoring);

        Ok(MatchOutcome {
            hands_played,
            winners: self.manager.engine().winners(),
            scores,
        })
    }
}
