//! Seven-card poker hand evaluation.
//!
//! One pass builds a rank histogram and per-suit rank bitmasks; category
//! detection walks from straight flush down to high card. Comparison is
//! the derived lexicographic order on (category, kickers).

use crate::cards::Card;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub enum Category {
    HighCard,
    OnePair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
}

/// Total strength of a best-five hand. Kickers are ordered high to low and
/// padded with zeros, so the derived `Ord` settles every tie the rules
/// settle (identical kickers split the pot).
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub struct HandStrength {
    pub category: Category,
    pub kickers: [u8; 5],
}

/// Evaluate the best five-card hand out of the given cards (hole plus
/// community, normally seven).
pub fn evaluate(cards: &[Card]) -> HandStrength {
    debug_assert!(cards.len() >= 5 && cards.len() <= 7);

    let mut rank_counts = [0u8; 15];
    let mut suit_masks = [0u16; 4];
    let mut suit_counts = [0u8; 4];
    for card in cards {
        let r = card.rank.value();
        let s = card.suit as usize;
        rank_counts[r as usize] += 1;
        suit_masks[s] |= 1 << r;
        suit_counts[s] += 1;
    }
    let rank_mask: u16 = suit_masks.iter().fold(0, |acc, m| acc | m);

    let flush_suit = (0..4).find(|&s| suit_counts[s] >= 5);

    if let Some(s) = flush_suit {
        if let Some(high) = straight_high(suit_masks[s]) {
            return strength(Category::StraightFlush, &[high]);
        }
    }

    // Rank groups ordered by count, then rank, both descending. Drives
    // quads, boats, trips and pairs uniformly.
    let mut groups: Vec<(u8, u8)> = (2..=14u8)
        .filter(|&r| rank_counts[r as usize] > 0)
        .map(|r| (rank_counts[r as usize], r))
        .collect();
    groups.sort_unstable_by(|a, b| b.cmp(a));

    if groups[0].0 == 4 {
        let quad = groups[0].1;
        let kicker = top_ranks_excluding(&groups, &[quad], 1);
        return strength(Category::FourOfAKind, &[quad, kicker[0]]);
    }

    if groups[0].0 == 3 && groups.len() > 1 && groups[1].0 >= 2 {
        return strength(Category::FullHouse, &[groups[0].1, groups[1].1]);
    }

    if let Some(s) = flush_suit {
        let mut ranks: Vec<u8> = (2..=14u8)
            .rev()
            .filter(|&r| suit_masks[s] & (1 << r) != 0)
            .take(5)
            .collect();
        ranks.resize(5, 0);
        return strength(Category::Flush, &ranks);
    }

    if let Some(high) = straight_high(rank_mask) {
        return strength(Category::Straight, &[high]);
    }

    if groups[0].0 == 3 {
        let trip = groups[0].1;
        let ks = top_ranks_excluding(&groups, &[trip], 2);
        return strength(Category::ThreeOfAKind, &[trip, ks[0], ks[1]]);
    }

    if groups[0].0 == 2 && groups.len() > 1 && groups[1].0 == 2 {
        let (high, low) = (groups[0].1, groups[1].1);
        let ks = top_ranks_excluding(&groups, &[high, low], 1);
        return strength(Category::TwoPair, &[high, low, ks[0]]);
    }

    if groups[0].0 == 2 {
        let pair = groups[0].1;
        let ks = top_ranks_excluding(&groups, &[pair], 3);
        return strength(Category::OnePair, &[pair, ks[0], ks[1], ks[2]]);
    }

    let ks = top_ranks_excluding(&groups, &[], 5);
    strength(Category::HighCard, &ks)
}

fn strength(category: Category, kickers: &[u8]) -> HandStrength {
    let mut k = [0u8; 5];
    k[..kickers.len()].copy_from_slice(kickers);
    HandStrength {
        category,
        kickers: k,
    }
}

/// Highest straight top-card present in a rank bitmask, treating the ace
/// as both high and low. None when no five ranks run consecutively.
fn straight_high(mask: u16) -> Option<u8> {
    let mut m = mask;
    if m & (1 << 14) != 0 {
        m |= 1 << 1; // wheel
    }
    (5..=14u8)
        .rev()
        .find(|&high| {
            let window = 0b11111u16 << (high - 4);
            m & window == window
        })
}

/// Up to `take` highest single ranks, skipping `exclude`, zero-padded.
fn top_ranks_excluding(groups: &[(u8, u8)], exclude: &[u8], take: usize) -> Vec<u8> {
    let mut out: Vec<u8> = groups
        .iter()
        .filter(|(_, r)| !exclude.contains(r))
        .map(|&(_, r)| r)
        .collect();
    out.sort_unstable_by(|a, b| b.cmp(a));
    out.truncate(take);
    out.resize(take, 0);
    out
}
