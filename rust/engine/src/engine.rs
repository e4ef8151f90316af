//! The contract every game engine implements.

use crate::errors::GameError;

/// Player identity within a match. Seats and ids coincide at match
/// creation; ids stay stable even as turn order rotates.
pub type PlayerId = usize;

/// A turn-based game engine owning one match's mutable state exclusively.
///
/// All mutation funnels through [`apply_action`](GameEngine::apply_action);
/// callers only ever observe the state through [`state`](GameEngine::state)
/// or a deep [`clone_state`](GameEngine::clone_state), so history/replay
/// consumers can never corrupt a live match.
pub trait GameEngine {
    /// Full game state. Cloning must deep-copy every mutable collection.
    type State: Clone;
    /// A player-submitted action, immutable once constructed.
    type Action;

    /// Validate and apply one action, then run the phase-advance check.
    /// Rejections leave the state untouched.
    fn apply_action(&mut self, action: &Self::Action) -> Result<(), GameError>;

    /// Exactly the legal actions for `player` right now. Empty when it is
    /// not their turn or they can no longer act (folded, all-in, game
    /// over). This is the contract both the UI and the AI agents rely on
    /// to avoid illegal moves.
    fn valid_actions(&self, player: PlayerId) -> Vec<Self::Action>;

    /// The player who holds the turn, or `None` when nobody does
    /// (between hands, or after the game ends). At most one player holds
    /// the turn at any observable point.
    fn current_player(&self) -> Option<PlayerId>;

    /// Game-specific termination predicate.
    fn is_game_over(&self) -> bool;

    /// Winners of the match once [`is_game_over`](GameEngine::is_game_over)
    /// holds; empty before then.
    fn winners(&self) -> Vec<PlayerId>;

    /// Read-only view of the live state.
    fn state(&self) -> &Self::State;

    /// Deep copy of the state. Mutating the clone never affects the live
    /// match.
    fn clone_state(&self) -> Self::State {
        self.state().clone()
    }
}
