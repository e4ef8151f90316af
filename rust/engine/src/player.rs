use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::engine::PlayerId;

/// A betting-round action as a player submits it. Amounts are requests;
/// the engine clamps them to the acting player's stack during validation.
///
/// The serde representation matches the wire shape AI replies use:
/// `{"type": "raise", "amount": 300}`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlayerAction {
    Fold,
    Check,
    Call,
    Bet { amount: u32 },
    /// Raise by `amount` over the current bet.
    Raise { amount: u32 },
    #[serde(alias = "all-in", alias = "allin")]
    AllIn,
}

/// One seat's state within a poker hand.
///
/// Invariant: a folded player holds no cards and takes no further turns
/// until the next hand; an all-in player keeps their cards but takes no
/// further voluntary action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PokerPlayer {
    pub id: PlayerId,
    pub seat: usize,
    /// Chip stack, excluding anything already committed to the pot.
    pub chips: u32,
    /// Hole cards; cleared when the player folds.
    pub hole: Vec<Card>,
    /// Chips committed during the current betting round.
    pub street_bet: u32,
    /// Chips committed across the whole hand; feeds side-pot tiers.
    pub hand_bet: u32,
    pub folded: bool,
    pub all_in: bool,
    pub has_acted: bool,
}

impl PokerPlayer {
    pub fn new(id: PlayerId, seat: usize, chips: u32) -> Self {
        Self {
            id,
            seat,
            chips,
            hole: Vec::with_capacity(2),
            street_bet: 0,
            hand_bet: 0,
            folded: false,
            all_in: false,
            has_acted: false,
        }
    }

    /// Move up to `amount` chips from the stack toward the pot, returning
    /// what was actually committed. Hitting zero marks the player all-in.
    pub fn commit(&mut self, amount: u32) -> u32 {
        let paid = amount.min(self.chips);
        self.chips -= paid;
        self.street_bet += paid;
        self.hand_bet += paid;
        if self.chips == 0 && paid > 0 {
            self.all_in = true;
        }
        paid
    }

    pub fn fold(&mut self) {
        self.folded = true;
        self.hole.clear();
    }

    /// True when the player can still take a voluntary action this hand.
    pub fn can_act(&self) -> bool {
        !self.folded && !self.all_in && self.chips > 0
    }

    /// Reset hand-scoped fields at the start of a new hand. A player with
    /// no chips left sits the hand out as folded.
    pub fn reset_for_hand(&mut self) {
        self.hole.clear();
        self.street_bet = 0;
        self.hand_bet = 0;
        self.all_in = false;
        self.has_acted = false;
        self.folded = self.chips == 0;
    }

    pub fn reset_for_street(&mut self) {
        self.street_bet = 0;
        self.has_acted = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_clamps_to_stack_and_flags_all_in() {
        let mut p = PokerPlayer::new(0, 0, 100);
        assert_eq!(p.commit(40), 40);
        assert_eq!(p.chips, 60);
        assert!(!p.all_in);
        assert_eq!(p.commit(500), 60);
        assert_eq!(p.chips, 0);
        assert!(p.all_in);
        assert_eq!(p.hand_bet, 100);
    }

    #[test]
    fn fold_discards_hole_cards() {
        use crate::cards::{Rank, Suit};
        let mut p = PokerPlayer::new(1, 1, 100);
        p.hole.push(Card {
            suit: Suit::Hearts,
            rank: Rank::Ace,
        });
        p.fold();
        assert!(p.folded);
        assert!(p.hole.is_empty());
    }

    #[test]
    fn bankrupt_player_sits_out_next_hand() {
        let mut p = PokerPlayer::new(2, 2, 50);
        p.commit(50);
        p.reset_for_hand();
        assert!(p.folded);
        assert!(!p.all_in);
    }

    #[test]
    fn action_wire_shape_round_trips() {
        let raise = PlayerAction::Raise { amount: 300 };
        let json = serde_json::to_string(&raise).unwrap();
        assert_eq!(json, r#"{"type":"raise","amount":300}"#);
        let back: PlayerAction = serde_json::from_str(&json).unwrap();
        assert_eq!(back, raise);

        let all_in: PlayerAction = serde_json::from_str(r#"{"type":"all-in"}"#).unwrap();
        assert_eq!(all_in, PlayerAction::AllIn);
    }
}
