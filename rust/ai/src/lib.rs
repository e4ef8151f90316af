//! # gambit-ai: AI Decision Pipeline
//!
//! Turns the output of an external, untrusted decision service (typically
//! a language model) into a validated game action. The pipeline never
//! lets a bad reply reach the match: anything missing, malformed, or
//! illegal degrades to a deterministic, locally computed fallback.
//!
//! ## Core Components
//!
//! - [`Agent`] - Trait for per-game decision makers
//! - [`decision`] - The immutable [`decision::Decision`] an agent produces
//! - [`service`] - External decision-service contract and model config
//! - [`validator`] - Reply sanitization and legal-action matching
//! - [`personality`] - Seeded trait generation for agents
//! - [`poker_agent`] / [`connect4_agent`] - Concrete agents
//!
//! ## Pipeline
//!
//! 1. Zero legal actions is a caller bug and fails fast.
//! 2. One legal action short-circuits with confidence 1.0, no external call.
//! 3. Otherwise: neutral state view -> prompts -> bounded external call ->
//!    validation. Any failure along the way is caught at the
//!    [`Agent::make_decision`] boundary and answered from local state.

use async_trait::async_trait;
use thiserror::Error;

use crate::decision::Decision;

pub mod connect4_agent;
pub mod decision;
pub mod personality;
pub mod poker_agent;
pub mod service;
pub mod validator;

#[derive(Debug, Error)]
pub enum AgentError {
    /// The caller asked for a decision with no legal actions; a contract
    /// violation, never recovered locally.
    #[error("no valid actions supplied")]
    NoValidActions,
    #[error("decision service timed out")]
    Timeout,
    #[error("decision service failed: {0}")]
    Service(String),
    #[error("reply did not contain a usable action")]
    InvalidReply,
}

/// A per-game decision maker backed by an external decision service.
///
/// `make_decision` is the single suspension point of a match: the caller
/// must not apply any action for this player until it resolves. It only
/// returns an error for the empty-action contract violation; every other
/// failure mode resolves to a fallback decision.
#[async_trait]
pub trait Agent {
    type State: Sync;
    type Action: Clone + Send + Sync;

    async fn make_decision(
        &self,
        state: &Self::State,
        valid_actions: &[Self::Action],
    ) -> Result<Decision<Self::Action>, AgentError>;

    fn agent_id(&self) -> &str;
}
