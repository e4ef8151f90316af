//! # gambit-manager: Match Orchestration
//!
//! Wires one engine, one agent per player, and a scoring system into a
//! running match. The manager owns the turn loop: it asks the engine who
//! holds the turn, collects that player's legal actions, waits for the
//! agent's decision, and applies it. The agent call is the only
//! suspension point; no action is applied for a player until their
//! decision resolves.
//!
//! An agent decision the engine nevertheless rejects is reported on the
//! event bus (as a misread or an illogical action, depending on the
//! rejection) and replaced with the default action, which is always the
//! first legal one.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use gambit_ai::{Agent, AgentError};
use gambit_engine::engine::{GameEngine, PlayerId};
use gambit_engine::errors::GameError;
use gambit_engine::events::{EventBus, GameEvent, MisreadSeverity};

pub mod factory;

pub use factory::{GameFactory, GameKind, PokerMatch};

/// Turns taken in one hand before the manager assumes the match is
/// wedged. Generous; a full-ring hand stays well under a hundred.
pub const TURN_LIMIT: u32 = 1_000;

#[derive(Debug, Error)]
pub enum ManagerError {
    #[error(transparent)]
    Game(#[from] GameError),
    #[error(transparent)]
    Agent(#[from] AgentError),
    #[error("no agent registered for player {0}")]
    NoAgent(PlayerId),
    #[error("player {0} holds the turn but has no legal actions")]
    NoLegalActions(PlayerId),
    #[error("turn limit exceeded, match presumed wedged")]
    TurnLimitExceeded,
}

type BoxedAgent<E> = Box<
    dyn Agent<State = <E as GameEngine>::State, Action = <E as GameEngine>::Action> + Send + Sync,
>;

/// One match: an engine plus an agent per seat, sharing the match's
/// event bus. Matches are independent; run as many concurrently as you
/// like, each on its own manager.
pub struct GameManager<E: GameEngine> {
    engine: E,
    agents: HashMap<PlayerId, BoxedAgent<E>>,
    bus: Arc<EventBus>,
}

impl<E> GameManager<E>
where
    E: GameEngine,
    E::State: Sync,
    E::Action: Clone + Send + Sync,
{
    pub fn new(engine: E, bus: Arc<EventBus>) -> Self {
        Self {
            engine,
            agents: HashMap::new(),
            bus,
        }
    }

    pub fn register_agent(&mut self, player: PlayerId, agent: BoxedAgent<E>) {
        self.agents.insert(player, agent);
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.bus)
    }

    /// Resolve and apply one turn. Returns the applied action, or `None`
    /// when nobody holds the turn.
    pub async fn play_turn(&mut self) -> Result<Option<E::Action>, ManagerError> {
        let Some(player) = self.engine.current_player() else {
            return Ok(None);
        };
        let actions = self.engine.valid_actions(player);
        if actions.is_empty() {
            return Err(ManagerError::NoLegalActions(player));
        }
        let agent = self
            .agents
            .get(&player)
            .ok_or(ManagerError::NoAgent(player))?;

        let decision = agent.make_decision(self.engine.state(), &actions).await?;
        debug!(
            player,
            agent = decision.agent_id,
            confidence = decision.confidence,
            "decision resolved"
        );

        match self.engine.apply_action(&decision.action) {
            Ok(()) => Ok(Some(decision.action)),
            Err(err) => {
                self.report_rejection(player, err)?;
                // The engine's state is untouched by a rejection, so the
                // default action collected above is still legal.
                let default = actions[0].clone();
                self.engine.apply_action(&default)?;
                Ok(Some(default))
            }
        }
    }

    /// Classify an engine rejection of an agent decision and broadcast
    /// it. Rejections that indicate state corruption propagate instead.
    fn report_rejection(&self, player: PlayerId, err: GameError) -> Result<(), ManagerError> {
        warn!(player, %err, "engine rejected an agent decision");
        match err {
            GameError::CheckFacingBet { .. } => {
                self.bus
                    .emit(&GameEvent::hand_misread(player, MisreadSeverity::Major));
                Ok(())
            }
            GameError::InvalidBetAmount { .. } => {
                self.bus
                    .emit(&GameEvent::hand_misread(player, MisreadSeverity::Minor));
                Ok(())
            }
            GameError::NotPlayersTurn(_)
            | GameError::PlayerAlreadyFolded(_)
            | GameError::PlayerAllIn(_) => {
                self.bus.emit(&GameEvent::action_illogical(player));
                Ok(())
            }
            other => Err(ManagerError::Game(other)),
        }
    }

    /// Drive turns until the engine reports the game over. Suits games
    /// without a hand structure; poker matches go through
    /// [`PokerMatch::run_match`] instead.
    pub async fn run_to_completion(&mut self) -> Result<Vec<PlayerId>, ManagerError> {
        let mut turns = 0u32;
        while !self.engine.is_game_over() {
            if self.play_turn().await?.is_none() {
                break;
            }
            turns += 1;
            if turns > TURN_LIMIT {
                return Err(ManagerError::TurnLimitExceeded);
            }
        }
        Ok(self.engine.winners())
    }
}
