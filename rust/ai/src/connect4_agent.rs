//! The connect-four decision agent. Same pipeline as the poker agent
//! with a board-text view and a centrality-ranked fallback.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::warn;

use gambit_engine::connect4::{Connect4Action, Connect4Move, Connect4State, COLS};

use crate::decision::Decision;
use crate::personality::Personality;
use crate::service::{
    request_with_timeout, DecisionRequest, DecisionService, ModelConfig, ResponseFormat,
};
use crate::validator::validate_reply;
use crate::{Agent, AgentError};

const SYSTEM_PROMPT: &str = "You are a strong connect-four player on an 8x8 board. \
Reply with a single JSON object: {\"action\": <one of the valid actions, verbatim>, \
\"confidence\": <0.0-1.0>, \"reasoning\": <short string>, \
\"alternativeActions\": [<other valid actions in preference order>]}.";

pub struct Connect4Agent {
    id: String,
    config: ModelConfig,
    personality: Personality,
    service: Arc<dyn DecisionService>,
}

impl Connect4Agent {
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

    fn build_request(&self, state: &Connect4State, player: usize, legal: &[Connect4Move]) -> DecisionRequest {
        let user_prompt = json!({
            "board": render_board(state),
            "you": player,
            "moveNumber": state.moves,
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

    /// Default action for a reply that fails validation: the first
    /// legal move.
    fn default_decision(&self, valid_actions: &[Connect4Action]) -> Decision<Connect4Action> {
        Decision::new(
            valid_actions[0],
            0.5,
            "reply failed validation, taking the default action",
            &self.id,
            &self.config.model,
        )
    }

    /// Centrality-ranked fallback for service failures: central columns
    /// dominate more lines, so an uninformed move takes the most central
    /// one still open.
    fn fallback(&self, valid_actions: &[Connect4Action]) -> Decision<Connect4Action> {
        // Callers guarantee a non-empty action list before reaching here.
        let action = valid_actions
            .iter()
            .max_by_key(|a| centrality(a.mv))
            .copied()
            .unwrap_or(Connect4Action {
                player: 0,
                mv: Connect4Move::Place { column: COLS / 2 },
            });
        Decision::new(
            action,
            self.personality.fallback_confidence(),
            "fallback: central column preference",
            &self.id,
            &self.config.model,
        )
    }
}

// Distance from the board center, inverted; ties broken by column order.
fn centrality(mv: Connect4Move) -> usize {
    let Connect4Move::Place { column } = mv;
    let center = (COLS - 1) as i64;
    let doubled = 2 * column as i64;
    COLS * 2 - (doubled - center).unsigned_abs() as usize
}

fn render_board(state: &Connect4State) -> Vec<String> {
    state
        .board
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Some(p) if *p == state.players[0] => 'X',
                    Some(_) => 'O',
                    None => '.',
                })
                .collect()
        })
        .collect()
}

#[async_trait]
impl Agent for Connect4Agent {
    type State = Connect4State;
    type Action = Connect4Action;

    async fn make_decision(
        &self,
        state: &Connect4State,
        valid_actions: &[Connect4Action],
    ) -> Result<Decision<Connect4Action>, AgentError> {
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
        let legal: Vec<Connect4Move> = valid_actions.iter().map(|a| a.mv).collect();
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
                Connect4Action {
                    player,
                    mv: v.action,
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
