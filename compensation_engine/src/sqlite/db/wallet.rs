//! The wallet ledger. Append-only: the engine inserts and reads entries, nothing else.

use log::trace;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewWalletEntry, WalletEntry},
    traits::MemberApiError,
};

pub async fn insert_entry(entry: &NewWalletEntry, conn: &mut SqliteConnection) -> Result<i64, MemberApiError> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO wallet_entries (member_id, amount, category, memo) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(entry.member_id)
    .bind(entry.amount)
    .bind(entry.category)
    .bind(&entry.memo)
    .fetch_one(&mut *conn)
    .await?;
    trace!("💰️ Ledger entry #{id}: {} {} for member #{}", entry.category, entry.amount, entry.member_id);
    Ok(id)
}

pub async fn history_for_member(
    member_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<WalletEntry>, MemberApiError> {
    let entries = sqlx::query_as::<_, WalletEntry>(
        "SELECT id, member_id, amount, category, memo, created_at FROM wallet_entries WHERE member_id = $1 ORDER BY \
         created_at DESC, id DESC",
    )
    .bind(member_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(entries)
}
