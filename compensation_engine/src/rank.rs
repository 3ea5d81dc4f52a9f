//! Career level derivation.
//!
//! Rank is a pure function of the cumulative leg volumes. Matching drains the *unsettled* leg
//! balances only, so the inputs here are monotone and a member's rank can never regress.

use bce_common::Pv;

use crate::db_types::Rank;

#[derive(Debug, Clone, Copy)]
pub struct RankThreshold {
    pub rank: Rank,
    pub left_required: Pv,
    pub right_required: Pv,
}

const fn tier(rank: Rank, both_legs: i64) -> RankThreshold {
    RankThreshold { rank, left_required: Pv::new(both_legs), right_required: Pv::new(both_legs) }
}

/// Qualification ladder, ascending. A member holds the *highest* tier whose both thresholds are
/// met, so the scan below must visit every entry rather than stopping at the first match.
pub const RANK_THRESHOLDS: [RankThreshold; 12] = [
    tier(Rank::Distributor, 0),
    tier(Rank::Platinum, 5_000),
    tier(Rank::Pearl, 15_000),
    tier(Rank::Sapphire, 50_000),
    tier(Rank::Ruby, 100_000),
    tier(Rank::Emerald, 250_000),
    tier(Rank::Diamond, 500_000),
    tier(Rank::DoubleDiamond, 1_000_000),
    tier(Rank::TripleDiamond, 2_500_000),
    tier(Rank::President, 5_000_000),
    tier(Rank::DoublePresident, 10_000_000),
    tier(Rank::TriplePresident, 25_000_000),
];

/// Derives the rank earned by the given cumulative leg volumes. Never fails; volumes below the
/// first paying tier earn the base rank.
pub fn evaluate(left_total: Pv, right_total: Pv) -> Rank {
    let mut earned = Rank::Distributor;
    for tier in &RANK_THRESHOLDS {
        if left_total >= tier.left_required && right_total >= tier.right_required {
            earned = tier.rank;
        }
    }
    earned
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn zero_volume_is_base_rank() {
        assert_eq!(evaluate(Pv::new(0), Pv::new(0)), Rank::Distributor);
    }

    #[test]
    fn highest_qualifying_tier_wins() {
        // Qualifies for every tier up to Ruby; the scan must not stop at Platinum.
        assert_eq!(evaluate(Pv::new(120_000), Pv::new(100_000)), Rank::Ruby);
    }

    #[test]
    fn both_legs_must_qualify() {
        // A heavy left leg alone earns nothing beyond what the right leg supports.
        assert_eq!(evaluate(Pv::new(30_000_000), Pv::new(4_999)), Rank::Distributor);
        assert_eq!(evaluate(Pv::new(30_000_000), Pv::new(15_000)), Rank::Pearl);
    }

    #[test]
    fn exact_threshold_qualifies() {
        assert_eq!(evaluate(Pv::new(5_000), Pv::new(5_000)), Rank::Platinum);
        assert_eq!(evaluate(Pv::new(25_000_000), Pv::new(25_000_000)), Rank::TriplePresident);
    }

    #[test]
    fn rank_is_monotone_as_volume_accumulates() {
        let mut left = Pv::new(0);
        let mut right = Pv::new(0);
        let mut last = evaluate(left, right);
        for _ in 0..200 {
            left += Pv::new(70_000);
            right += Pv::new(55_000);
            let next = evaluate(left, right);
            assert!(next >= last);
            last = next;
        }
    }
}
