//! Matching payouts, generation overrides, bonuses and rank application.
//!
//! Every function here runs on a caller-owned connection, so the payout orchestrator can compose
//! them inside a single transaction spanning a whole ancestor walk.

use bce_common::Cv;
use log::{debug, info};
use sqlx::SqliteConnection;

use crate::{
    db_types::{MatchingPayout, Member, NewWalletEntry, RankChange, WalletCategory},
    rank,
    sqlite::db::{members, settings, wallet},
    traits::{PayoutError, DEFAULT_SHORT_LEG_RATE, MAX_GENERATIONS, SHORT_LEG_RATE_KEY},
};

/// Checks whether both of a member's legs hold unsettled volume and, if so, pays out on the
/// short leg: the matched volume is drained from both legs, the payout is credited, a MATCHING
/// ledger entry is appended, and generation overrides cascade up the sponsor chain.
///
/// A zero balance on either leg is a no-op. Matching can fire again and again over a member's
/// lifetime as volume reaccumulates.
pub async fn check_matching(
    member_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<MatchingPayout>, PayoutError> {
    let Some(member) = members::member_by_id(member_id, &mut *conn).await? else {
        return Ok(None);
    };
    if !member.left_pv.is_positive() || !member.right_pv.is_positive() {
        return Ok(None);
    }
    let matched = member.left_pv.min(member.right_pv);
    let rate = settings::get_or_default(SHORT_LEG_RATE_KEY, DEFAULT_SHORT_LEG_RATE, &mut *conn).await?;
    let payout = Cv::from_pv_at_rate(matched, rate);

    members::apply_matching(member_id, matched, payout, &mut *conn).await?;
    let memo = format!("Short-leg match on {matched} at rate {rate}");
    wallet::insert_entry(&NewWalletEntry::new(member_id, payout, WalletCategory::Matching, memo), &mut *conn).await?;
    debug!("💰️ Member #{member_id} matched {matched} on both legs. Payout: {payout}");

    distribute_generations(&member, payout, &mut *conn).await?;
    Ok(Some(MatchingPayout { member_id, matched, payout }))
}

/// Distributes generation overrides on a matching payout up the *sponsor* chain (who referred
/// whom), which is independent of tree geometry. Stops at the first generation with no
/// configured rate, at the top of the sponsor chain, or at the hard depth cap, whichever comes
/// first. Returns the number of sponsors credited.
pub async fn distribute_generations(
    origin: &Member,
    amount: Cv,
    conn: &mut SqliteConnection,
) -> Result<u32, PayoutError> {
    let mut current = origin.clone();
    let mut credited = 0u32;
    for generation in 1..=MAX_GENERATIONS {
        let Some(rate) = settings::generation_rate(generation, &mut *conn).await? else {
            break;
        };
        let Some(sponsor_id) = current.sponsor_id else {
            break;
        };
        let Some(sponsor) = members::member_by_id(sponsor_id, &mut *conn).await? else {
            break;
        };
        let bonus = amount.at_rate(rate);
        members::credit_cv(sponsor.id, bonus, &mut *conn).await?;
        let memo = format!("Generation {generation} override from {}'s earnings", current.full_name);
        wallet::insert_entry(&NewWalletEntry::new(sponsor.id, bonus, WalletCategory::Generation, memo), &mut *conn)
            .await?;
        credited += 1;
        current = sponsor;
    }
    if credited > 0 {
        debug!("💰️ Generation distribution complete. Origin member #{}: {credited} sponsors credited", origin.id);
    }
    Ok(credited)
}

/// Credits the sponsor's referral bonus and appends a REFERRAL ledger entry. No cascading; paid
/// once per registration.
pub async fn pay_referral_bonus(
    sponsor_id: i64,
    amount: Cv,
    new_member_name: &str,
    conn: &mut SqliteConnection,
) -> Result<(), PayoutError> {
    members::credit_cv(sponsor_id, amount, &mut *conn).await?;
    let memo = format!("New registration: {new_member_name}");
    wallet::insert_entry(&NewWalletEntry::new(sponsor_id, amount, WalletCategory::Referral, memo), &mut *conn).await?;
    info!("💰️ Referral bonus {amount} paid to sponsor #{sponsor_id}");
    Ok(())
}

/// Re-derives the member's rank from its cumulative leg volumes and persists a change if one
/// occurred. Promotions append a zero-amount RANK_UP ledger entry so the career step shows up in
/// the member's wallet history.
pub async fn refresh_rank(member: &Member, conn: &mut SqliteConnection) -> Result<Option<RankChange>, PayoutError> {
    let earned = rank::evaluate(member.left_pv_total, member.right_pv_total);
    if earned == member.rank {
        return Ok(None);
    }
    members::set_rank(member.id, earned, &mut *conn).await?;
    let memo = format!("Career advancement: {earned}");
    wallet::insert_entry(&NewWalletEntry::new(member.id, Cv::zero(), WalletCategory::RankUp, memo), &mut *conn)
        .await?;
    info!("🏅️ Member #{} advanced from {} to {earned}", member.id, member.rank);
    Ok(Some(RankChange { member_id: member.id, from: member.rank, to: earned }))
}
