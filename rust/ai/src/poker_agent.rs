//! The poker decision agent.
//!
//! Builds a neutral view of the table (no opponent hole cards), asks the
//! external service to pick from the engine's legal actions, validates
//! the reply, and answers from personality when anything goes wrong.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use tracing::warn;

use gambit_engine::player::PlayerAction;
use gambit_engine::poker::{PokerAction, PokerState};

use crate::decision::Decision;
use crate::personality::Personality;
use crate::service::{
    request_with_timeout, DecisionRequest, DecisionService, ModelConfig, ResponseFormat,
};
use crate::validator::validate_reply;
use crate::{Agent, AgentError};

const SYSTEM_PROMPT: &str = "You are a professional no-limit hold'em player. \
Reply with a single JSON object: {\"action\": <one of the valid actions, verbatim>, \
\"confidence\": <0.0-1.0>, \"reasoning\": <short string>, \
\"alternativeActions\": [<other valid actions in preference order>]}.";

/// What the model is allowed to see. Opponent hole cards are withheld
/// at construction, not by prompt discipline.
#[derive(Debug, Serialize)]
struct PokerView {
    phase: String,
    hole_cards: Vec<String>,
    community: Vec<String>,
    pot: u32,
    to_call: u32,
    chips: u32,
    opponents: Vec<OpponentView>,
}

#[derive(Debug, Serialize)]
struct OpponentView {
    id: usize,
    chips: u32,
    street_bet: u32,
    folded: bool,
    all_in: bool,
}

impl PokerView {
    fn of(state: &PokerState, player: usize) -> Self {
        let me = state.players.iter().find(|p| p.id == player);
        let (hole, chips, street_bet) = me
            .map(|p| (p.hole.clone(), p.chips, p.street_bet))
            .unwrap_or_default();
        Self {
            phase: format!("{:?}", state.phase).to_lowercase(),
            hole_cards: hole.iter().map(|c| c.to_string()).collect(),
            community: state.community.iter().map(|c| c.to_string()).collect(),
            pot: state.pot,
            to_call: state.current_bet.saturating_sub(street_bet),
            chips,
            opponents: state
                .players
                .iter()
                .filter(|p| p.id != player)
                .map(|p| OpponentView {
                    id: p.id,
                    chips: p.chips,
                    street_bet: p.street_bet,
                    folded: p.folded,
                    all_in: p.all_in,
                })
                .collect(),
        }
    }
}

pub struct PokerAgent {
    id: String,
    config: ModelConfig,
    personality: Personality,
    service: Arc<dyn DecisionService>,
}

impl PokerAgent {
    pub fn new(id: impl Into<String>, config: ModelConfig, service: Arc<dyn DecisionService>) -> Self {
        let id = id.into();
        let personality = Personality::derive(&id, &config.model);
        Self {
            id,
            config,
            personality,
            service,
        }
    }

    pub fn personality(&self) -> &Personality {
        &self.personality
    }

    fn build_request(&self, state: &PokerState, player: usize, legal: &[PlayerAction]) -> DecisionRequest {
        let view = PokerView::of(state, player);
        let user_prompt = json!({
            "state": view,
            "validActions": legal,
        })
        .to_string();
        let system_prompt = format!(
            "{SYSTEM_PROMPT} Your playing style: {}.",
            self.personality.describe()
        );
        DecisionRequest {
            model: self.config.model.clone(),
            system_prompt,
            user_prompt,
            temperature: self.config.temperature(),
            max_tokens: self.config.max_tokens(),
            response_format: ResponseFormat::JsonObject,
        }
    }

    /// The default action is simply the first legal one, which the
    /// engine orders most-passive-first. Used when a reply arrives but
    /// fails validation.
    fn default_decision(&self, valid_actions: &[PokerAction]) -> Decision<PokerAction> {
        Decision::new(
            valid_actions[0],
            0.5,
            "reply failed validation, taking the default action",
            &self.id,
            &self.config.model,
        )
    }

    /// Personality-driven choice from the legal actions, used when the
    /// external service fails outright. Folding is a last resort, never
    /// chosen while another line exists.
    fn fallback(&self, valid_actions: &[PokerAction]) -> Decision<PokerAction> {
        let mut ranked: Vec<PokerAction> = valid_actions
            .iter()
            .filter(|a| a.action != PlayerAction::Fold)
            .copied()
            .collect();
        ranked.sort_by_key(|a| aggression_rank(a.action));
        let chosen = self
            .personality
            .pick_ranked(&ranked)
            .or_else(|| valid_actions.first())
            .copied();
        // Callers guarantee a non-empty action list before reaching here.
        let action = chosen.unwrap_or(PokerAction {
            player: 0,
            action: PlayerAction::Fold,
        });
        Decision::new(
            action,
            self.personality.fallback_confidence(),
            "fallback: chosen from personality profile",
            &self.id,
            &self.config.model,
        )
    }
}

// Passive lines first. Used only to order fallback candidates.
fn aggression_rank(action: PlayerAction) -> u8 {
    match action {
        PlayerAction::Check => 0,
        PlayerAction::Call => 1,
        PlayerAction::Bet { .. } => 2,
        PlayerAction::Raise { .. } => 3,
        PlayerAction::AllIn => 4,
        PlayerAction::Fold => 5,
    }
}

#[async_trait]
impl Agent for PokerAgent {
    type State = PokerState;
    type Action = PokerAction;

    async fn make_decision(
        &self,
        state: &PokerState,
        valid_actions: &[PokerAction],
    ) -> Result<Decision<PokerAction>, AgentError> {
        let Some(first) = valid_actions.first() else {
            return Err(AgentError::NoValidActions);
        };
        if valid_actions.len() == 1 {
            return Ok(Decision::new(
                *first,
                1.0,
                "only legal action",
                &self.id,
                &self.config.model,
            ));
        }

        let player = first.player;
        let legal: Vec<PlayerAction> = valid_actions.iter().map(|a| a.action).collect();
        let request = self.build_request(state, player, &legal);

        let reply = match request_with_timeout(self.service.as_ref(), &request, self.config.timeout())
            .await
        {
            Ok(reply) => reply,
            Err(err) => {
                warn!(agent = %self.id, %err, "decision service unavailable, using fallback");
                return Ok(self.fallback(valid_actions));
            }
        };

        match validate_reply(&reply, &legal) {
            Some(v) => Ok(Decision::new(
                PokerAction {
                    player,
                    action: v.action,
                },
                v.confidence,
                v.reasoning,
                &self.id,
                &self.config.model,
            )),
            None => {
                warn!(agent = %self.id, "reply failed validation, using default action");
                Ok(self.default_decision(valid_actions))
            }
        }
    }

    fn agent_id(&self) -> &str {
        &self.id
    }
}
