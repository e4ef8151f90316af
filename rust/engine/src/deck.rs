use crate::cards::{full_deck, Card};
use crate::context::Randomizer;

/// Ordered deck drawn strictly from the top. Shuffling goes through the
/// match [`Randomizer`] so one seed covers every hand of the match.
#[derive(Debug, Clone)]
pub struct Deck {
    cards: Vec<Card>,
    position: usize,
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}

impl Deck {
    /// Canonical order until the first shuffle.
    pub fn new() -> Self {
        Self {
            cards: full_deck(),
            position: 0,
        }
    }

    /// Restore all 52 cards and shuffle them.
    pub fn shuffle(&mut self, rng: &mut Randomizer) {
        self.cards = full_deck();
        rng.shuffle(&mut self.cards);
        self.position = 0;
    }

    pub fn draw(&mut self) -> Option<Card> {
        let card = self.cards.get(self.position).copied();
        if card.is_some() {
            self.position += 1;
        }
        card
    }

    /// Discard the top card face-down, as done before each street.
    pub fn burn(&mut self) {
        let _ = self.draw();
    }

    pub fn remaining(&self) -> usize {
        self.cards.len().saturating_sub(self.position)
    }
}
