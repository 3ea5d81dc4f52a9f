use bce_common::{Cv, Pv};
use log::debug;

use crate::{
    db_types::{PayoutSummary, WalletEntry},
    traits::{CompensationDatabase, MemberApiError, PayoutError},
};

/// Sale settlement. One call per completed sale; everything downstream of it (leg credits,
/// matching, generation overrides, rank changes) is the backend's single atomic walk.
#[derive(Debug, Clone)]
pub struct PayoutApi<B> {
    db: B,
}

impl<B> PayoutApi<B>
where B: CompensationDatabase
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Distributes a completed sale's volume up the tree. A sale carrying no positive PV is a
    /// no-op rather than an error, so callers can push every sale through without filtering.
    pub async fn process_sale(&self, buyer_id: i64, sale_pv: Pv, sale_cv: Cv) -> Result<PayoutSummary, PayoutError> {
        if !sale_pv.is_positive() {
            debug!("💰️ Sale by member #{buyer_id} carries no PV. Nothing to distribute.");
            return Ok(PayoutSummary::default());
        }
        self.db.distribute_pv(buyer_id, sale_pv, sale_cv).await
    }

    /// The member's wallet ledger, newest first.
    pub async fn wallet_history(&self, member_id: i64) -> Result<Vec<WalletEntry>, MemberApiError> {
        self.db.wallet_history(member_id).await
    }
}
