use gambit_engine::context::{GameContext, Randomizer};
use gambit_engine::engine::GameEngine;
use gambit_engine::poker::{PokerAction, PokerConfig, PokerEngine};
use gambit_engine::pots::build_side_pots;

/// Side-pot completeness: for arbitrary contribution profiles, the pots
/// plus refunds reconstruct the total and every contributor is eligible
/// for at least one pot (or got refunded).
#[test]
fn side_pots_reconstruct_contributions_for_random_profiles() {
    let mut rng = Randomizer::new(Some(2026));
    for _ in 0..50 {
        let n = 2 + rng.next_int(5) as usize;
        let contributions: Vec<(usize, u32)> = (0..n)
            .map(|id| (id, (rng.next_int(20) * 25) as u32))
            .collect();
        let total: u32 = contributions.iter().map(|&(_, b)| b).sum();

        let (pots, refunds) = build_side_pots(&contributions);
        let rebuilt: u32 = pots.iter().map(|p| p.amount).sum::<u32>()
            + refunds.iter().map(|&(_, r)| r).sum::<u32>();
        assert_eq!(rebuilt, total);

        for &(id, bet) in &contributions {
            if bet == 0 {
                continue;
            }
            let potted = pots.iter().any(|p| p.eligible.contains(&id));
            let refunded = refunds.iter().any(|&(r, _)| r == id);
            assert!(potted || refunded, "contributor {id} lost chips");
        }

        // Eligible sets shrink strictly as tiers rise.
        for pair in pots.windows(2) {
            assert!(pair[1].eligible.len() < pair[0].eligible.len());
            assert!(pair[1]
                .eligible
                .iter()
                .all(|id| pair[0].eligible.contains(id)));
        }
    }
}

/// Three players shove; settlement must return every chip to some stack.
#[test]
fn three_way_all_in_settles_exactly() {
    let config = PokerConfig {
        players: 3,
        starting_stack: 1_000,
        small_blind: 50,
        big_blind: 100,
    };
    let mut eng = PokerEngine::new(config, GameContext::new("pots", Some(5)));
    eng.start_hand().unwrap();
    let total: u32 = eng.state().players.iter().map(|p| p.chips).sum::<u32>() + eng.state().pot;

    while !eng.state().hand_complete {
        let seat = eng.state().turn.unwrap();
        let player = eng.state().players[seat].id;
        let all_in = eng
            .valid_actions(player)
            .into_iter()
            .find(|a| matches!(a, PokerAction { action, .. }
                if *action == gambit_engine::player::PlayerAction::AllIn))
            .expect("all-in always offered to a live player");
        eng.apply_action(&all_in).unwrap();
    }

    let settled: u32 = eng.state().players.iter().map(|p| p.chips).sum();
    assert_eq!(settled, total, "every chip accounted for after settlement");
    assert_eq!(eng.state().pot, 0);
}

#[test]
fn dead_money_from_folders_reaches_the_winners() {
    let config = PokerConfig {
        players: 3,
        starting_stack: 2_000,
        small_blind: 50,
        big_blind: 100,
    };
    let mut eng = PokerEngine::new(config, GameContext::new("dead-money", Some(11)));
    eng.start_hand().unwrap();
    let total = 6_000;

    // First to act folds, leaving their blind-free contribution of zero;
    // the blinds then check it down to showdown.
    let seat = eng.state().turn.unwrap();
    let player = eng.state().players[seat].id;
    let fold = eng.valid_actions(player).into_iter().last().unwrap();
    eng.apply_action(&fold).unwrap();

    while !eng.state().hand_complete {
        let seat = eng.state().turn.unwrap();
        let player = eng.state().players[seat].id;
        let first = eng.valid_actions(player).into_iter().next().unwrap();
        eng.apply_action(&first).unwrap();
    }

    let after: u32 = eng.state().players.iter().map(|p| p.chips).sum();
    assert_eq!(after, total);
    assert_eq!(eng.state().pot, 0);
}
