//! The No-Limit Hold'em betting state machine.
//!
//! Phases run `Waiting -> Preflop -> Flop -> Turn -> River -> Showdown`.
//! After every applied action the engine recomputes who still owes action;
//! when nobody does, the phase advances (dealing 3/1/1 community cards and
//! resetting the betting round), and when only one non-folded player
//! remains the hand ends on the spot. Chip conservation holds across every
//! mutation: `sum(chips) + pot + sum(side pots)` only changes by what
//! players commit through their own actions.

use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::context::{now_rfc3339, GameContext};
use crate::deck::Deck;
use crate::engine::{GameEngine, PlayerId};
use crate::errors::GameError;
use crate::events::GameEvent;
use crate::hand::{evaluate, HandStrength};
use crate::player::{PlayerAction, PokerPlayer};
use crate::pots::{build_side_pots, SidePot};
use crate::rules::{validate_action, ValidatedAction};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Waiting,
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
}

impl Phase {
    pub fn is_betting(self) -> bool {
        matches!(
            self,
            Phase::Preflop | Phase::Flop | Phase::Turn | Phase::River
        )
    }
}

/// Table configuration, fixed for the lifetime of a match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PokerConfig {
    pub players: usize,
    pub starting_stack: u32,
    pub small_blind: u32,
    pub big_blind: u32,
}

impl Default for PokerConfig {
    fn default() -> Self {
        Self {
            players: 2,
            starting_stack: 10_000,
            small_blind: 50,
            big_blind: 100,
        }
    }
}

/// An action as submitted for a specific player.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct PokerAction {
    pub player: PlayerId,
    pub action: PlayerAction,
}

/// Complete per-match poker state. Owned exclusively by [`PokerEngine`];
/// callers receive clones only.
#[derive(Debug, Clone)]
pub struct PokerState {
    pub phase: Phase,
    pub players: Vec<PokerPlayer>,
    /// Seat index of the player on turn; `None` between hands.
    pub turn: Option<usize>,
    pub move_count: u32,
    pub community: Vec<Card>,
    pub pot: u32,
    /// Highest street bet any player has matched or must match.
    pub current_bet: u32,
    /// Minimum raise delta; reset to the big blind each street.
    pub min_raise: u32,
    pub dealer: usize,
    pub small_blind_seat: usize,
    pub big_blind_seat: usize,
    pub deck: Deck,
    pub side_pots: Vec<SidePot>,
    pub winners: Vec<PlayerId>,
    pub hand_complete: bool,
    pub hand_number: u32,
    pub small_blind: u32,
    pub big_blind: u32,
}

pub struct PokerEngine {
    state: PokerState,
    ctx: GameContext,
}

impl PokerEngine {
    pub fn new(config: PokerConfig, ctx: GameContext) -> Self {
        let players = (0..config.players)
            .map(|i| PokerPlayer::new(i, i, config.starting_stack))
            .collect();
        let state = PokerState {
            phase: Phase::Waiting,
            players,
            turn: None,
            move_count: 0,
            community: Vec::with_capacity(5),
            pot: 0,
            current_bet: 0,
            min_raise: config.big_blind,
            // Rotates forward before the first deal, so seat 0 opens.
            dealer: config.players.saturating_sub(1),
            small_blind_seat: 0,
            big_blind_seat: 0,
            deck: Deck::new(),
            side_pots: Vec::new(),
            winners: Vec::new(),
            hand_complete: false,
            hand_number: 0,
            small_blind: config.small_blind,
            big_blind: config.big_blind,
        };
        Self { state, ctx }
    }

    pub fn context(&self) -> &GameContext {
        &self.ctx
    }

    /// Reset hand-scoped state, rotate the button, shuffle, deal, post
    /// blinds, and hand the turn to the first player after the big blind.
    pub fn start_hand(&mut self) -> Result<(), GameError> {
        let funded = self.state.players.iter().filter(|p| p.chips > 0).count();
        if funded < 2 {
            return Err(GameError::NotEnoughPlayers);
        }

        self.state.hand_number += 1;
        self.state.community.clear();
        self.state.side_pots.clear();
        self.state.winners.clear();
        self.state.pot = 0;
        self.state.current_bet = 0;
        self.state.min_raise = self.state.big_blind;
        self.state.move_count = 0;
        self.state.hand_complete = false;
        for p in &mut self.state.players {
            p.reset_for_hand();
        }
        self.state.dealer = self
            .next_seat(self.state.dealer, |p| p.chips > 0)
            .expect("at least two funded players");

        self.state.deck.shuffle(&mut self.ctx.rng);
        self.deal_hole_cards()?;
        self.post_blinds();
        self.state.phase = Phase::Preflop;

        tracing::info!(
            match_id = %self.ctx.match_id,
            hand_number = self.state.hand_number,
            dealer = self.state.dealer,
            "hand started"
        );
        self.ctx.events.emit(&GameEvent::HandStarted {
            hand_number: self.state.hand_number,
            phase: Phase::Preflop,
            ts: now_rfc3339(),
        });

        // Preflop first-to-act sits after the big blind. If the blinds put
        // everyone all-in already, run the board out instead.
        match self.next_seat(self.state.big_blind_seat, Self::is_pending_in(&self.state)) {
            Some(seat) => self.state.turn = Some(seat),
            None => self.advance_phase(),
        }
        Ok(())
    }

    fn deal_hole_cards(&mut self) -> Result<(), GameError> {
        for _ in 0..2 {
            for i in 0..self.state.players.len() {
                let seat = (self.state.dealer + 1 + i) % self.state.players.len();
                if self.state.players[seat].folded {
                    continue;
                }
                let card = self.state.deck.draw().ok_or(GameError::DeckExhausted)?;
                self.state.players[seat].hole.push(card);
            }
        }
        Ok(())
    }

    fn post_blinds(&mut self) {
        let funded = self.state.players.iter().filter(|p| !p.folded).count();
        let live = |p: &PokerPlayer| !p.folded;
        let (sb, bb) = if funded == 2 {
            // Heads-up: the dealer posts the small blind.
            let sb = if self.state.players[self.state.dealer].folded {
                self.next_seat(self.state.dealer, live)
                    .expect("two live players remain")
            } else {
                self.state.dealer
            };
            (sb, self.next_seat(sb, live).expect("two live players remain"))
        } else {
            let sb = self
                .next_seat(self.state.dealer, live)
                .expect("two live players remain");
            (sb, self.next_seat(sb, live).expect("two live players remain"))
        };

        let small = self.state.small_blind;
        let big = self.state.big_blind;
        self.state.pot += self.state.players[sb].commit(small);
        self.state.pot += self.state.players[bb].commit(big);
        self.state.small_blind_seat = sb;
        self.state.big_blind_seat = bb;
        self.state.current_bet = big;
    }

    /// First seat after `from` (wrapping) whose player satisfies `pred`.
    fn next_seat<F>(&self, from: usize, pred: F) -> Option<usize>
    where
        F: Fn(&PokerPlayer) -> bool,
    {
        let n = self.state.players.len();
        (1..=n)
            .map(|step| (from + step) % n)
            .find(|&seat| pred(&self.state.players[seat]))
    }

    /// A player still owes action this street: they can act and either
    /// have not acted yet or are below the current bet.
    fn is_pending_in(state: &PokerState) -> impl Fn(&PokerPlayer) -> bool + '_ {
        move |p| p.can_act() && (!p.has_acted || p.street_bet < state.current_bet)
    }

    fn survivors(&self) -> Vec<usize> {
        (0..self.state.players.len())
            .filter(|&i| !self.state.players[i].folded)
            .collect()
    }

    /// Post-action bookkeeping: end the hand if only one player is left,
    /// otherwise pass the turn or advance the phase.
    fn advance(&mut self, last_actor: usize) {
        if self.state.hand_complete {
            return;
        }
        let survivors = self.survivors();
        if survivors.len() == 1 {
            self.award_uncontested(survivors[0]);
            return;
        }

        let anyone_pending = self
            .state
            .players
            .iter()
            .any(|p| Self::is_pending_in(&self.state)(p));
        if !anyone_pending {
            self.advance_phase();
            return;
        }

        match self.next_seat(last_actor, Self::is_pending_in(&self.state)) {
            Some(seat) => self.state.turn = Some(seat),
            None => {
                // Players owe action but none is reachable in seat order.
                // Recoverable integrity anomaly: force the phase forward.
                tracing::warn!(
                    match_id = %self.ctx.match_id,
                    hand_number = self.state.hand_number,
                    "no eligible next player despite pending action; forcing phase advance"
                );
                self.advance_phase();
            }
        }
    }

    /// Close the betting round and move to the next phase, dealing the
    /// street's community cards. Cascades through remaining streets when
    /// fewer than two players can still act (all-in runout).
    fn advance_phase(&mut self) {
        for p in &mut self.state.players {
            p.reset_for_street();
        }
        self.state.current_bet = 0;
        self.state.min_raise = self.state.big_blind;
        self.state.turn = None;

        let next = match self.state.phase {
            Phase::Preflop => {
                self.deal_community(3);
                Phase::Flop
            }
            Phase::Flop => {
                self.deal_community(1);
                Phase::Turn
            }
            Phase::Turn => {
                self.deal_community(1);
                Phase::River
            }
            Phase::River => {
                self.showdown();
                return;
            }
            Phase::Waiting | Phase::Showdown => return,
        };
        self.state.phase = next;
        tracing::debug!(
            match_id = %self.ctx.match_id,
            phase = ?next,
            board = self.state.community.len(),
            "phase advanced"
        );

        let can_act = self.state.players.iter().filter(|p| p.can_act()).count();
        if can_act < 2 {
            self.advance_phase();
            return;
        }
        // Postflop first-to-act sits after the dealer button.
        match self.next_seat(self.state.dealer, Self::is_pending_in(&self.state)) {
            Some(seat) => self.state.turn = Some(seat),
            None => self.advance_phase(),
        }
    }

    fn deal_community(&mut self, count: usize) {
        self.state.deck.burn();
        for _ in 0..count {
            // The deck holds 52 cards against at most 25 draws per hand.
            if let Some(card) = self.state.deck.draw() {
                self.state.community.push(card);
            }
        }
    }

    /// Everyone else folded: the last player standing takes the pot
    /// without showing cards.
    fn award_uncontested(&mut self, seat: usize) {
        let pot = self.state.pot;
        self.state.players[seat].chips += pot;
        self.state.pot = 0;
        let winner = self.state.players[seat].id;
        self.finish_hand(vec![winner], false, pot);
    }

    fn showdown(&mut self) {
        let survivors = self.survivors();
        debug_assert!(survivors.len() >= 2);

        let strengths: Vec<(usize, HandStrength)> = survivors
            .iter()
            .map(|&i| {
                let mut cards = self.state.players[i].hole.clone();
                cards.extend_from_slice(&self.state.community);
                (i, evaluate(&cards))
            })
            .collect();
        let best = strengths.iter().map(|(_, s)| s).max().cloned().expect("non-empty");
        let overall: Vec<usize> = strengths
            .iter()
            .filter(|(_, s)| *s == best)
            .map(|&(i, _)| i)
            .collect();

        let total_pot = self.state.pot;
        let contributions: Vec<(PlayerId, u32)> = survivors
            .iter()
            .map(|&i| (self.state.players[i].id, self.state.players[i].hand_bet))
            .collect();
        let (pots, refunds) = build_side_pots(&contributions);

        for &(id, amount) in &refunds {
            let seat = self.seat_of(id).expect("refund target is seated");
            self.state.players[seat].chips += amount;
            self.state.pot -= amount;
        }

        if pots.len() > 1 {
            self.state.side_pots = pots.clone();
            // Money moves from the pot into the layered side pots; what is
            // left behind is dead money from folded players.
            self.state.pot -= pots.iter().map(|p| p.amount).sum::<u32>();
            for pot in &pots {
                let eligible_best = strengths
                    .iter()
                    .filter(|(i, _)| pot.eligible.contains(&self.state.players[*i].id))
                    .map(|(_, s)| s)
                    .max()
                    .cloned()
                    .expect("every pot has eligible players");
                let winners: Vec<usize> = strengths
                    .iter()
                    .filter(|(i, s)| {
                        *s == eligible_best && pot.eligible.contains(&self.state.players[*i].id)
                    })
                    .map(|&(i, _)| i)
                    .collect();
                self.pay_split(pot.amount, &winners);
            }
            // Dead money from folded players goes to the best hand overall.
            let dead = self.state.pot;
            if dead > 0 {
                self.pay_split(dead, &overall);
                self.state.pot = 0;
            }
        } else {
            let amount = self.state.pot;
            self.pay_split(amount, &overall);
            self.state.pot = 0;
        }
        debug_assert_eq!(self.state.pot, 0, "showdown must distribute the full pot");

        let winner_ids: Vec<PlayerId> = overall
            .iter()
            .map(|&i| self.state.players[i].id)
            .collect();
        self.finish_hand(winner_ids, true, total_pot);
    }

    /// Split `amount` evenly with floor division; the remainder goes to
    /// the earliest winning seat so no chips leak.
    fn pay_split(&mut self, amount: u32, winner_seats: &[usize]) {
        let mut seats = winner_seats.to_vec();
        seats.sort_unstable();
        let share = amount / seats.len() as u32;
        let remainder = amount % seats.len() as u32;
        for (rank, &seat) in seats.iter().enumerate() {
            let mut payout = share;
            if rank == 0 {
                payout += remainder;
            }
            self.state.players[seat].chips += payout;
        }
    }

    fn finish_hand(&mut self, winners: Vec<PlayerId>, showdown: bool, pot: u32) {
        // Hole cards survive until the next deal, so a non-empty hand
        // marks everyone dealt in, blinds-only players included.
        let players: Vec<PlayerId> = self
            .state
            .players
            .iter()
            .filter(|p| !p.hole.is_empty())
            .map(|p| p.id)
            .collect();
        self.state.winners = winners.clone();
        self.state.hand_complete = true;
        self.state.phase = Phase::Showdown;
        self.state.turn = None;
        tracing::info!(
            match_id = %self.ctx.match_id,
            hand_number = self.state.hand_number,
            winners = ?winners,
            pot,
            showdown,
            "hand completed"
        );
        self.ctx.events.emit(&GameEvent::HandCompleted {
            winners,
            players,
            hand_number: self.state.hand_number,
            phase: Phase::Showdown,
            showdown,
            pot,
            ts: now_rfc3339(),
        });
    }

    fn seat_of(&self, id: PlayerId) -> Option<usize> {
        self.state.players.iter().position(|p| p.id == id)
    }
}

impl GameEngine for PokerEngine {
    type State = PokerState;
    type Action = PokerAction;

    fn apply_action(&mut self, action: &PokerAction) -> Result<(), GameError> {
        if self.state.hand_complete {
            return Err(GameError::HandAlreadyComplete);
        }
        if !self.state.phase.is_betting() {
            return Err(GameError::NoHandInProgress);
        }
        let seat = self
            .seat_of(action.player)
            .ok_or(GameError::UnknownPlayer(action.player))?;
        if self.state.players[seat].folded {
            return Err(GameError::PlayerAlreadyFolded(action.player));
        }
        if self.state.players[seat].all_in {
            return Err(GameError::PlayerAllIn(action.player));
        }
        if self.state.turn != Some(seat) {
            return Err(GameError::NotPlayersTurn(action.player));
        }

        let to_call = self.state.current_bet - self.state.players[seat].street_bet;
        let validated = validate_action(
            self.state.players[seat].chips,
            to_call,
            self.state.min_raise,
            action.action,
        )?;

        match validated {
            ValidatedAction::Fold => self.state.players[seat].fold(),
            ValidatedAction::Check => {}
            ValidatedAction::Call(amount) => {
                let paid = self.state.players[seat].commit(amount);
                self.state.pot += paid;
            }
            ValidatedAction::Bet(amount) => {
                let paid = self.state.players[seat].commit(amount);
                self.state.pot += paid;
                self.state.current_bet = self.state.players[seat].street_bet;
                self.state.min_raise = amount;
            }
            ValidatedAction::Raise(amount) => {
                let paid = self.state.players[seat].commit(to_call + amount);
                self.state.pot += paid;
                self.state.current_bet = self.state.players[seat].street_bet;
                self.state.min_raise = amount;
            }
            ValidatedAction::AllIn(stack) => {
                let paid = self.state.players[seat].commit(stack);
                self.state.pot += paid;
                let street_bet = self.state.players[seat].street_bet;
                if street_bet > self.state.current_bet {
                    let delta = street_bet - self.state.current_bet;
                    self.state.min_raise = self.state.min_raise.max(delta);
                    self.state.current_bet = street_bet;
                }
            }
        }
        self.state.players[seat].has_acted = true;
        self.state.move_count += 1;

        tracing::debug!(
            match_id = %self.ctx.match_id,
            player = action.player,
            action = ?action.action,
            pot = self.state.pot,
            "action applied"
        );
        self.ctx
            .events
            .emit(&GameEvent::action_executed(action.player, action.action));

        self.advance(seat);
        Ok(())
    }

    fn valid_actions(&self, player: PlayerId) -> Vec<PokerAction> {
        if self.state.hand_complete || !self.state.phase.is_betting() {
            return Vec::new();
        }
        let seat = match self.seat_of(player) {
            Some(seat) => seat,
            None => return Vec::new(),
        };
        let p = &self.state.players[seat];
        if !p.can_act() || self.state.turn != Some(seat) {
            return Vec::new();
        }

        let to_call = self.state.current_bet - p.street_bet;
        let mut actions = Vec::new();
        if to_call == 0 {
            actions.push(PlayerAction::Check);
            let min_bet = self.state.min_raise.max(self.state.big_blind);
            if p.chips > min_bet {
                actions.push(PlayerAction::Bet { amount: min_bet });
            }
            if self.state.pot > min_bet && p.chips > self.state.pot {
                actions.push(PlayerAction::Bet {
                    amount: self.state.pot,
                });
            }
        } else {
            if p.chips > to_call {
                actions.push(PlayerAction::Call);
            }
            if p.chips > to_call + self.state.min_raise {
                actions.push(PlayerAction::Raise {
                    amount: self.state.min_raise,
                });
            }
        }
        actions.push(PlayerAction::AllIn);
        actions.push(PlayerAction::Fold);

        actions
            .into_iter()
            .map(|action| PokerAction { player, action })
            .collect()
    }

    fn current_player(&self) -> Option<PlayerId> {
        if self.state.hand_complete || !self.state.phase.is_betting() {
            return None;
        }
        self.state.turn.map(|seat| self.state.players[seat].id)
    }

    fn is_game_over(&self) -> bool {
        let between_hands = self.state.hand_complete || self.state.phase == Phase::Waiting;
        between_hands && self.state.players.iter().filter(|p| p.chips > 0).count() < 2
    }

    fn winners(&self) -> Vec<PlayerId> {
        if !self.is_game_over() {
            return Vec::new();
        }
        self.state
            .players
            .iter()
            .filter(|p| p.chips > 0)
            .map(|p| p.id)
            .collect()
    }

    fn state(&self) -> &PokerState {
        &self.state
    }
}
