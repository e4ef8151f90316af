use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use gambit_ai::decision::Decision;
use gambit_ai::{Agent, AgentError};
use gambit_engine::connect4::{Connect4Action, Connect4State};
use gambit_engine::engine::GameEngine;
use gambit_engine::events::EventKind;
use gambit_engine::player::PlayerAction;
use gambit_engine::poker::{PokerAction, PokerConfig, PokerState};
use gambit_manager::GameFactory;
use gambit_scoring::ScoringSystem;

/// Always takes the first legal action, no external service involved.
struct FirstActionAgent(String);

#[async_trait]
impl Agent for FirstActionAgent {
    type State = PokerState;
    type Action = PokerAction;

    async fn make_decision(
        &self,
        _state: &PokerState,
        valid_actions: &[PokerAction],
    ) -> Result<Decision<PokerAction>, AgentError> {
        let action = *valid_actions.first().ok_or(AgentError::NoValidActions)?;
        Ok(Decision::new(action, 0.9, "scripted", &self.0, "scripted"))
    }

    fn agent_id(&self) -> &str {
        &self.0
    }
}

struct FirstColumnAgent(String);

#[async_trait]
impl Agent for FirstColumnAgent {
    type State = Connect4State;
    type Action = Connect4Action;

    async fn make_decision(
        &self,
        _state: &Connect4State,
        valid_actions: &[Connect4Action],
    ) -> Result<Decision<Connect4Action>, AgentError> {
        let action = *valid_actions.first().ok_or(AgentError::NoValidActions)?;
        Ok(Decision::new(action, 0.9, "scripted", &self.0, "scripted"))
    }

    fn agent_id(&self) -> &str {
        &self.0
    }
}

/// Checks no matter what, so every facing-a-bet spot is a misread.
struct StubbornChecker(String);

#[async_trait]
impl Agent for StubbornChecker {
    type State = PokerState;
    type Action = PokerAction;

    async fn make_decision(
        &self,
        _state: &PokerState,
        valid_actions: &[PokerAction],
    ) -> Result<Decision<PokerAction>, AgentError> {
        let player = valid_actions.first().ok_or(AgentError::NoValidActions)?.player;
        Ok(Decision::new(
            PokerAction {
                player,
                action: PlayerAction::Check,
            },
            0.9,
            "checking blind",
            &self.0,
            "scripted",
        ))
    }

    fn agent_id(&self) -> &str {
        &self.0
    }
}

#[tokio::test]
async fn poker_match_runs_hands_and_scores_players() {
    let mut game = GameFactory::poker(
        "match-1",
        Some(42),
        PokerConfig {
            players: 2,
            starting_stack: 1_000,
            small_blind: 50,
            big_blind: 100,
        },
    );
    game.manager
        .register_agent(0, Box::new(FirstActionAgent("p0".into())));
    game.manager
        .register_agent(1, Box::new(FirstActionAgent("p1".into())));

    let outcome = game.run_match(20).await.unwrap();
    assert!(outcome.hands_played >= 1);
    assert!(outcome.hands_played <= 20);

    let total: u32 = game
        .manager
        .engine()
        .state()
        .players
        .iter()
        .map(|p| p.chips)
        .sum();
    assert_eq!(total, 2_000, "chips conserved across the match");

    assert_eq!(outcome.scores.len(), 2);
    for score in &outcome.scores {
        let chips = game.manager.engine().state().players[score.player].chips;
        assert_eq!(score.breakdown.base, chips);
        assert_eq!(
            score.breakdown.total,
            (chips + score.breakdown.bonus).saturating_sub(score.breakdown.penalty)
        );
    }

    // Both players hold chips until the match ends, so every completed
    // hand dealt both in, including hands where a blind forced one
    // all-in before they could act.
    let stats = game.scoring.lock().unwrap().stats(0);
    assert_eq!(stats.hands_played, outcome.hands_played);
}

#[tokio::test]
async fn connect4_match_runs_to_a_winner() {
    let mut manager = GameFactory::connect4("match-c4", None, [0, 1]);
    manager.register_agent(0, Box::new(FirstColumnAgent("a".into())));
    manager.register_agent(1, Box::new(FirstColumnAgent("b".into())));

    let winners = manager.run_to_completion().await.unwrap();
    // Column-by-column fill hands the first mover the bottom row.
    assert_eq!(winners, vec![0]);
    assert!(manager.engine().is_game_over());
}

#[tokio::test]
async fn rejected_decision_is_reported_and_replaced() {
    let mut game = GameFactory::poker("match-misread", Some(7), PokerConfig::default());
    game.manager
        .register_agent(0, Box::new(StubbornChecker("p0".into())));
    game.manager
        .register_agent(1, Box::new(StubbornChecker("p1".into())));

    let misreads = Arc::new(AtomicU32::new(0));
    let count = Arc::clone(&misreads);
    game.manager.event_bus().on(EventKind::HandMisread, move |_| {
        count.fetch_add(1, Ordering::SeqCst);
    });

    game.run_hand().await.unwrap();
    assert!(game.manager.engine().state().hand_complete);

    // The small blind checked into the big blind preflop; the manager
    // reported the misread and called in their stead.
    assert!(misreads.load(Ordering::SeqCst) >= 1);
    let scoring = game.scoring.lock().unwrap();
    assert!(scoring.stats(0).major_misreads >= 1);
    assert!(scoring.breakdown(0, 0).penalty > 0);
}
