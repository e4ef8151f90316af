use gambit_engine::context::{GameContext, Randomizer};
use gambit_engine::engine::GameEngine;
use gambit_engine::poker::{PokerConfig, PokerEngine};

fn engine(seed: u64, players: usize) -> PokerEngine {
    let config = PokerConfig {
        players,
        starting_stack: 5_000,
        small_blind: 50,
        big_blind: 100,
    };
    PokerEngine::new(config, GameContext::new(format!("flow-{seed}"), Some(seed)))
}

fn bankroll(engine: &PokerEngine) -> u32 {
    let s = engine.state();
    s.players.iter().map(|p| p.chips).sum::<u32>() + s.pot
}

/// Play random legal actions until the hand completes, checking the core
/// invariants after every step: chip conservation and turn exclusivity.
#[test]
fn random_playouts_preserve_chips_and_turn_exclusivity() {
    for seed in 0..12u64 {
        let players = 2 + (seed as usize % 3);
        let mut eng = engine(seed, players);
        let mut picker = Randomizer::new(Some(seed ^ 0xDEAD));
        eng.start_hand().expect("hand starts");
        let expected = bankroll(&eng);

        let mut steps = 0;
        while !eng.state().hand_complete {
            let on_turn: Vec<usize> = (0..players)
                .filter(|&p| !eng.valid_actions(p).is_empty())
                .collect();
            assert_eq!(on_turn.len(), 1, "seed {seed}: exactly one player on turn");

            let actions = eng.valid_actions(on_turn[0]);
            let choice = *picker.pick(&actions).expect("non-empty legal set");
            eng.apply_action(&choice).expect("picked action is legal");
            assert_eq!(bankroll(&eng), expected, "seed {seed}: chips conserved");

            steps += 1;
            assert!(steps < 200, "seed {seed}: hand failed to terminate");
        }

        assert!(!eng.state().winners.is_empty(), "seed {seed}: hand has winners");
        for p in 0..players {
            assert!(eng.valid_actions(p).is_empty());
        }
    }
}

#[test]
fn consecutive_hands_rotate_the_button() {
    let mut eng = engine(3, 3);
    eng.start_hand().unwrap();
    let first_dealer = eng.state().dealer;
    // Everyone folds to the big blind to finish the hand quickly.
    while !eng.state().hand_complete {
        let seat = eng.state().turn.unwrap();
        let player = eng.state().players[seat].id;
        let fold = eng
            .valid_actions(player)
            .into_iter()
            .last()
            .expect("fold is always offered");
        eng.apply_action(&fold).unwrap();
    }
    eng.start_hand().unwrap();
    assert_eq!(eng.state().dealer, (first_dealer + 1) % 3);
    assert_eq!(eng.state().hand_number, 2);
}

#[test]
fn same_seed_produces_identical_hands() {
    let mut a = engine(77, 3);
    let mut b = engine(77, 3);
    a.start_hand().unwrap();
    b.start_hand().unwrap();
    for (pa, pb) in a.state().players.iter().zip(b.state().players.iter()) {
        assert_eq!(pa.hole, pb.hole);
    }
    assert_eq!(a.state().turn, b.state().turn);
}
