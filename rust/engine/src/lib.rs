//! # gambit-engine: Turn-Based Game Engine Core
//!
//! A deterministic, single-threaded engine framework for turn-based
//! multiplayer games, with a full No-Limit Hold'em implementation and a
//! connect-four implementation. Provides exclusive-ownership state
//! management, a synchronous event bus, and reproducible RNG so that a
//! match's non-AI trajectory can be replayed from its seed and action
//! sequence.
//!
//! ## Core Modules
//!
//! - [`cards`] - Card representation (Suit, Rank, Card) and deck construction
//! - [`deck`] - Top-draw deck, shuffled through the match randomizer
//! - [`hand`] - Poker hand evaluation and strength comparison
//! - [`context`] - Per-match services: randomizer, timer, event bus handle
//! - [`events`] - Typed domain events and the synchronous event bus
//! - [`engine`] - The `GameEngine` trait every game implements
//! - [`player`] - Poker player state: chips, hole cards, betting flags
//! - [`rules`] - Betting validation (check/call/bet/raise/all-in legality)
//! - [`pots`] - Side-pot construction and payout
//! - [`poker`] - The poker betting state machine
//! - [`connect4`] - Gravity-drop connect-four on an 8x8 board
//! - [`record`] - Hand records serialized to JSONL for replay
//! - [`errors`] - Error types for game operations
//!
//! ## Quick Start
//!
//! ```rust
//! use gambit_engine::context::GameContext;
//! use gambit_engine::engine::GameEngine;
//! use gambit_engine::poker::{PokerConfig, PokerEngine};
//!
//! let ctx = GameContext::new("match-1", Some(42));
//! let mut engine = PokerEngine::new(PokerConfig::default(), ctx);
//! engine.start_hand().expect("enough players to start");
//!
//! // Exactly one player can act at any observable point.
//! let on_turn: Vec<_> = (0..engine.state().players.len())
//!     .filter(|&p| !engine.valid_actions(p).is_empty())
//!     .collect();
//! assert_eq!(on_turn.len(), 1);
//! ```
//!
//! ## Determinism
//!
//! All shuffling goes through the seeded [`context::Randomizer`]; two
//! matches created with the same seed and fed the same action sequence
//! reach identical states.

pub mod cards;
pub mod connect4;
pub mod context;
pub mod deck;
pub mod engine;
pub mod errors;
pub mod events;
pub mod hand;
pub mod player;
pub mod poker;
pub mod pots;
pub mod record;
pub mod rules;
