//! Side-pot construction.
//!
//! When players go all-in for different amounts, the chips at risk are
//! layered into one pot per distinct contribution tier, smallest first,
//! each eligible to a strictly shrinking player set. The construction
//! partitions tiers before multiplying, so the pots plus refunds always
//! reconstruct the contributed total exactly.

use serde::{Deserialize, Serialize};

use crate::engine::PlayerId;

/// A sub-pot only some players are eligible to win. Append-only within a
/// hand, cleared at hand start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidePot {
    pub amount: u32,
    /// Player ids eligible to win this pot, in seat order.
    pub eligible: Vec<PlayerId>,
}

/// Layer the hand-total contributions of the non-folded players into side
/// pots. Returns the pots (ascending tier order) and any uncontested
/// excess refunded to its lone contributor.
///
/// A tier with a single remaining contributor creates no pot: nobody else
/// matched those chips, so they go straight back.
pub fn build_side_pots(
    contributions: &[(PlayerId, u32)],
) -> (Vec<SidePot>, Vec<(PlayerId, u32)>) {
    let live: Vec<(PlayerId, u32)> = contributions
        .iter()
        .copied()
        .filter(|&(_, bet)| bet > 0)
        .collect();

    let mut tiers: Vec<u32> = live.iter().map(|&(_, bet)| bet).collect();
    tiers.sort_unstable();
    tiers.dedup();

    let mut pots = Vec::new();
    let mut refunds = Vec::new();
    let mut prev = 0u32;
    for &tier in &tiers {
        let eligible: Vec<PlayerId> = live
            .iter()
            .filter(|&&(_, bet)| bet >= tier)
            .map(|&(id, _)| id)
            .collect();
        if eligible.len() == 1 {
            // All chips above the last matched tier are uncontested.
            refunds.push((eligible[0], tier - prev));
            break;
        }
        pots.push(SidePot {
            amount: (tier - prev) * eligible.len() as u32,
            eligible,
        });
        prev = tier;
    }

    debug_assert_eq!(
        pots.iter().map(|p| p.amount).sum::<u32>()
            + refunds.iter().map(|&(_, r)| r).sum::<u32>(),
        live.iter().map(|&(_, bet)| bet).sum::<u32>(),
        "side pots plus refunds must reconstruct the contributed total"
    );

    (pots, refunds)
}
