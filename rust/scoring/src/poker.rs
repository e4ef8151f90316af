//! Poker scoring rules.
//!
//! Base points are the player's chip stack. Bonuses reward winning at
//! showdown, winning without one after applying pressure, and dragging
//! unusually large pots. Penalties punish misreading the game state and
//! proposing illogical actions, scaled by severity.

use std::collections::HashSet;

use tracing::debug;

use gambit_engine::engine::PlayerId;
use gambit_engine::events::{ActionSummary, EventBus, EventKind, GameEvent, MisreadSeverity};
use gambit_engine::player::PlayerAction;

use crate::{ScoreBreakdown, ScoreLedger, ScoringSystem};

const WHITELIST: &[EventKind] = &[
    EventKind::ActionExecuted,
    EventKind::HandCompleted,
    EventKind::HandMisread,
    EventKind::ActionIllogical,
];

const SHOWDOWN_WIN_BONUS: u32 = 50;
const BLUFF_WIN_BONUS: u32 = 75;
const BIG_POT_BONUS: u32 = 25;
/// Pots at or above this many chips count as big.
const BIG_POT_THRESHOLD: u32 = 1_000;
const AGGRESSION_STREAK_BONUS: u32 = 10;
/// Cumulative aggressive actions needed before the streak bonus pays.
const AGGRESSION_STREAK_THRESHOLD: u32 = 5;

const MINOR_MISREAD_PENALTY: u32 = 10;
const MAJOR_MISREAD_PENALTY: u32 = 25;
const ILLOGICAL_ACTION_PENALTY: u32 = 15;

/// Bonus rule: statistics after the counter update, plus the event that
/// triggered evaluation. Non-negative by construction.
type BonusRule = fn(&crate::PlayerStats, &GameEvent) -> u32;

/// Penalty rule: the full event history of one player.
type PenaltyRule = fn(&[&GameEvent]) -> u32;

// Evaluated in order for each winner of a completed hand.
const BONUS_RULES: &[BonusRule] = &[showdown_win, bluff_win, big_pot, aggression_streak];

const PENALTY_RULES: &[PenaltyRule] = &[misreads, illogical_actions];

fn showdown_win(_stats: &crate::PlayerStats, event: &GameEvent) -> u32 {
    match event {
        GameEvent::HandCompleted { showdown: true, .. } => SHOWDOWN_WIN_BONUS,
        _ => 0,
    }
}

fn bluff_win(stats: &crate::PlayerStats, event: &GameEvent) -> u32 {
    match event {
        GameEvent::HandCompleted {
            showdown: false, ..
        } if stats.aggressive_actions > 0 => BLUFF_WIN_BONUS,
        _ => 0,
    }
}

fn big_pot(_stats: &crate::PlayerStats, event: &GameEvent) -> u32 {
    match event {
        GameEvent::HandCompleted { pot, .. } if *pot >= BIG_POT_THRESHOLD => BIG_POT_BONUS,
        _ => 0,
    }
}

fn aggression_streak(stats: &crate::PlayerStats, event: &GameEvent) -> u32 {
    match event {
        GameEvent::HandCompleted { .. }
            if stats.aggressive_actions >= AGGRESSION_STREAK_THRESHOLD =>
        {
            AGGRESSION_STREAK_BONUS
        }
        _ => 0,
    }
}

fn misreads(history: &[&GameEvent]) -> u32 {
    history
        .iter()
        .map(|event| match event {
            GameEvent::HandMisread {
                severity: MisreadSeverity::Minor,
                ..
            } => MINOR_MISREAD_PENALTY,
            GameEvent::HandMisread {
                severity: MisreadSeverity::Major,
                ..
            } => MAJOR_MISREAD_PENALTY,
            _ => 0,
        })
        .sum()
}

fn illogical_actions(history: &[&GameEvent]) -> u32 {
    history
        .iter()
        .filter(|event| matches!(event, GameEvent::ActionIllogical { .. }))
        .count() as u32
        * ILLOGICAL_ACTION_PENALTY
}

/// The poker scoring system. Create one per match, attach it with
/// [`crate::attach`], then query breakdowns after each hand.
#[derive(Debug, Default)]
pub struct PokerScoring {
    ledger: ScoreLedger,
    /// Players who acted in the hand currently in progress.
    hand_participants: HashSet<PlayerId>,
    /// Players who bet, raised, or shoved in the current hand.
    hand_aggressors: HashSet<PlayerId>,
}

impl PokerScoring {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor that also subscribes to the bus.
    pub fn attached(bus: &EventBus) -> std::sync::Arc<std::sync::Mutex<Self>> {
        let scoring = std::sync::Arc::new(std::sync::Mutex::new(Self::new()));
        crate::attach(&scoring, bus);
        scoring
    }

    fn update_counters(&mut self, event: &GameEvent) {
        match event {
            GameEvent::ActionExecuted {
                player,
                action: ActionSummary::Poker(action),
                ..
            } => {
                self.hand_participants.insert(*player);
                if is_aggressive(*action) {
                    self.hand_aggressors.insert(*player);
                    self.ledger.stats_mut(*player).aggressive_actions += 1;
                }
            }
            GameEvent::HandCompleted {
                winners,
                players,
                showdown,
                pot,
                ..
            } => {
                // The event's player list covers everyone dealt in, so a
                // blind-forced all-in counts as a played hand even though
                // the player never acted voluntarily.
                let participants: HashSet<PlayerId> = self
                    .hand_participants
                    .drain()
                    .chain(players.iter().copied())
                    .chain(winners.iter().copied())
                    .collect();
                let aggressors = std::mem::take(&mut self.hand_aggressors);
                for player in participants {
                    self.ledger.stats_mut(player).hands_played += 1;
                }
                for &winner in winners {
                    let stats = self.ledger.stats_mut(winner);
                    stats.hands_won += 1;
                    if *showdown {
                        stats.showdowns_won += 1;
                    } else if aggressors.contains(&winner) {
                        stats.bluffs_won += 1;
                    }
                    stats.biggest_pot = stats.biggest_pot.max(*pot);
                }
            }
            GameEvent::HandMisread {
                player, severity, ..
            } => {
                let stats = self.ledger.stats_mut(*player);
                match severity {
                    MisreadSeverity::Minor => stats.minor_misreads += 1,
                    MisreadSeverity::Major => stats.major_misreads += 1,
                }
            }
            GameEvent::ActionIllogical { player, .. } => {
                self.ledger.stats_mut(*player).illogical_actions += 1;
            }
            GameEvent::ActionExecuted { .. } => {}
            GameEvent::HandStarted { .. } => {}
        }
    }

    fn accrue_bonuses(&mut self, event: &GameEvent) {
        let GameEvent::HandCompleted { winners, .. } = event else {
            return;
        };
        for &winner in winners {
            let stats = self.ledger.stats_of(winner);
            let earned: u32 = BONUS_RULES.iter().map(|rule| rule(&stats, event)).sum();
            if earned > 0 {
                debug!(player = winner, points = earned, "bonus points accrued");
                self.ledger.add_bonus(winner, earned);
            }
        }
    }
}

fn is_aggressive(action: PlayerAction) -> bool {
    matches!(
        action,
        PlayerAction::Bet { .. } | PlayerAction::Raise { .. } | PlayerAction::AllIn
    )
}

impl ScoringSystem for PokerScoring {
    fn whitelist(&self) -> &'static [EventKind] {
        WHITELIST
    }

    fn record(&mut self, event: &GameEvent) {
        self.update_counters(event);
        self.accrue_bonuses(event);
        self.ledger.events.push(event.clone());
    }

    fn stats(&self, player: PlayerId) -> crate::PlayerStats {
        self.ledger.stats_of(player)
    }

    fn breakdown(&self, player: PlayerId, base: u32) -> ScoreBreakdown {
        let bonus = self.ledger.bonus_points.get(&player).copied().unwrap_or(0);
        let history = self.ledger.history_of(player);
        let penalty: u32 = PENALTY_RULES.iter().map(|rule| rule(&history)).sum();
        ScoreBreakdown::new(base, bonus, penalty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gambit_engine::poker::Phase;
    use std::sync::{Arc, Mutex};

    fn completed(winners: Vec<PlayerId>, showdown: bool, pot: u32) -> GameEvent {
        GameEvent::HandCompleted {
            players: winners.clone(),
            winners,
            hand_number: 1,
            phase: Phase::Showdown,
            showdown,
            pot,
            ts: String::new(),
        }
    }

    #[test]
    fn showdown_win_earns_the_bonus() {
        let mut scoring = PokerScoring::new();
        scoring.record(&completed(vec![0], true, 300));
        let b = scoring.breakdown(0, 10_000);
        assert_eq!(b.bonus, SHOWDOWN_WIN_BONUS);
        assert_eq!(b.total, 10_000 + SHOWDOWN_WIN_BONUS);
    }

    #[test]
    fn bluff_win_requires_prior_aggression() {
        let mut scoring = PokerScoring::new();
        scoring.record(&GameEvent::action_executed(
            0,
            PlayerAction::Bet { amount: 200 },
        ));
        scoring.record(&completed(vec![0], false, 400));
        assert_eq!(scoring.stats(0).bluffs_won, 1);
        assert_eq!(scoring.breakdown(0, 0).bonus, BLUFF_WIN_BONUS);

        // A passive winner of an uncontested pot earns nothing extra.
        let mut passive = PokerScoring::new();
        passive.record(&completed(vec![1], false, 400));
        assert_eq!(passive.stats(1).bluffs_won, 0);
        assert_eq!(passive.breakdown(1, 0).bonus, 0);
    }

    #[test]
    fn blind_forced_player_still_counts_as_having_played() {
        // Player 0 is dealt in but all-in from the blinds, so no
        // ActionExecuted ever arrives for them; the completion event's
        // player list must still credit the hand.
        let mut scoring = PokerScoring::new();
        scoring.record(&GameEvent::HandCompleted {
            winners: vec![1],
            players: vec![0, 1],
            hand_number: 1,
            phase: Phase::Showdown,
            showdown: true,
            pot: 600,
            ts: String::new(),
        });
        assert_eq!(scoring.stats(0).hands_played, 1);
        assert_eq!(scoring.stats(0).hands_won, 0);
        assert_eq!(scoring.stats(1).hands_played, 1);
    }

    #[test]
    fn big_pot_bonus_stacks_with_showdown_bonus() {
        let mut scoring = PokerScoring::new();
        scoring.record(&completed(vec![2], true, BIG_POT_THRESHOLD));
        assert_eq!(
            scoring.breakdown(2, 0).bonus,
            SHOWDOWN_WIN_BONUS + BIG_POT_BONUS
        );
        assert_eq!(scoring.stats(2).biggest_pot, BIG_POT_THRESHOLD);
    }

    #[test]
    fn sustained_aggression_earns_the_streak_bonus() {
        let mut scoring = PokerScoring::new();
        for _ in 0..AGGRESSION_STREAK_THRESHOLD {
            scoring.record(&GameEvent::action_executed(
                0,
                PlayerAction::Raise { amount: 100 },
            ));
        }
        scoring.record(&completed(vec![0], true, 300));
        assert_eq!(
            scoring.breakdown(0, 0).bonus,
            SHOWDOWN_WIN_BONUS + AGGRESSION_STREAK_BONUS
        );
    }

    #[test]
    fn misreads_and_illogical_actions_deduct() {
        let mut scoring = PokerScoring::new();
        scoring.record(&GameEvent::hand_misread(3, MisreadSeverity::Minor));
        scoring.record(&GameEvent::hand_misread(3, MisreadSeverity::Major));
        scoring.record(&GameEvent::action_illogical(3));
        let b = scoring.breakdown(3, 100);
        assert_eq!(
            b.penalty,
            MINOR_MISREAD_PENALTY + MAJOR_MISREAD_PENALTY + ILLOGICAL_ACTION_PENALTY
        );
        assert_eq!(b.total, 100 - b.penalty);
    }

    #[test]
    fn penalties_never_push_a_score_below_zero() {
        let mut scoring = PokerScoring::new();
        for _ in 0..20 {
            scoring.record(&GameEvent::hand_misread(4, MisreadSeverity::Major));
        }
        assert_eq!(scoring.breakdown(4, 5).total, 0);
    }

    #[test]
    fn attached_scoring_hears_bus_events() {
        let bus = EventBus::new();
        let scoring = Arc::new(Mutex::new(PokerScoring::new()));
        crate::attach(&scoring, &bus);

        bus.emit(&GameEvent::action_executed(0, PlayerAction::AllIn));
        bus.emit(&completed(vec![0], true, 2_000));

        let guard = scoring.lock().unwrap();
        assert_eq!(guard.stats(0).hands_won, 1);
        assert_eq!(guard.stats(0).aggressive_actions, 1);
        assert_eq!(guard.stats(0).hands_played, 1);
    }

    #[test]
    fn hand_started_is_outside_the_whitelist() {
        let scoring = PokerScoring::new();
        assert!(!scoring.whitelist().contains(&EventKind::HandStarted));
    }
}
