//! Deterministic per-agent personality traits.
//!
//! Traits are derived from the agent identity alone, so the same agent
//! configured against the same model always falls back the same way.
//! They shape fallback play and prompt tone; they never override the
//! validator.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Four traits, each in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Personality {
    /// Willingness to put chips at risk.
    pub risk_tolerance: f64,
    /// Preference for betting and raising over calling.
    pub aggressiveness: f64,
    /// How much confidence the agent claims for a fallback decision.
    pub adaptability: f64,
    /// Inclination to represent strength without it.
    pub bluffing_tendency: f64,
}

impl Personality {
    /// Derive a personality from the agent id and model name. Stable
    /// across processes and platforms.
    pub fn derive(agent_id: &str, model: &str) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(fnv1a(agent_id, model));
        Self {
            risk_tolerance: rng.random::<f64>(),
            aggressiveness: rng.random::<f64>(),
            adaptability: rng.random::<f64>(),
            bluffing_tendency: rng.random::<f64>(),
        }
    }

    /// One-line description for embedding in a system prompt.
    pub fn describe(&self) -> String {
        format!(
            "aggressiveness {:.2}, risk tolerance {:.2}, bluffing tendency {:.2}, adaptability {:.2}",
            self.aggressiveness, self.risk_tolerance, self.bluffing_tendency, self.adaptability
        )
    }

    /// Combined appetite for aggressive lines, in `[0.0, 1.0]`.
    pub fn aggression_weight(&self) -> f64 {
        (self.risk_tolerance + self.aggressiveness) / 2.0
    }

    /// Confidence reported for a locally computed fallback. Deliberately
    /// capped below what a validated external decision may claim.
    pub fn fallback_confidence(&self) -> f64 {
        0.4 + 0.3 * self.adaptability
    }

    /// Pick from `ranked`, ordered most passive first. An aggressive
    /// personality lands near the end of the slice.
    pub fn pick_ranked<'a, T>(&self, ranked: &'a [T]) -> Option<&'a T> {
        if ranked.is_empty() {
            return None;
        }
        let idx = (self.aggression_weight() * (ranked.len() - 1) as f64).round() as usize;
        ranked.get(idx.min(ranked.len() - 1))
    }
}

// FNV-1a over agent id, a separator, and model name.
fn fnv1a(agent_id: &str, model: &str) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    let mut hash = OFFSET;
    for byte in agent_id.bytes().chain([0u8]).chain(model.bytes()) {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_identity_same_traits() {
        let a = Personality::derive("alice", "model-x");
        let b = Personality::derive("alice", "model-x");
        assert_eq!(a, b);
    }

    #[test]
    fn different_identity_different_traits() {
        let a = Personality::derive("alice", "model-x");
        let b = Personality::derive("bob", "model-x");
        let c = Personality::derive("alice", "model-y");
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn traits_stay_in_unit_interval() {
        for id in ["a", "b", "agent-7", "deep", ""] {
            let p = Personality::derive(id, "m");
            for t in [
                p.risk_tolerance,
                p.aggressiveness,
                p.adaptability,
                p.bluffing_tendency,
            ] {
                assert!((0.0..=1.0).contains(&t));
            }
            assert!((0.4..=0.7).contains(&p.fallback_confidence()));
        }
    }

    #[test]
    fn ranked_pick_is_total_over_nonempty_slices() {
        let p = Personality::derive("picker", "m");
        assert!(p.pick_ranked::<u32>(&[]).is_none());
        for n in 1..6 {
            let options: Vec<u32> = (0..n).collect();
            assert!(p.pick_ranked(&options).is_some());
        }
    }
}
