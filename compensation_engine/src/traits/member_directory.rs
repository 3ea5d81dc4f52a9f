use thiserror::Error;

use crate::db_types::{Leg, Member, TreeNodeRow, WalletEntry};

#[derive(Debug, Clone, Error)]
pub enum MemberApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("User error constructing query: {0}")]
    QueryError(String),
}

impl From<sqlx::Error> for MemberApiError {
    fn from(e: sqlx::Error) -> Self {
        MemberApiError::DatabaseError(e.to_string())
    }
}

/// Read-side access to member records, wallet history and tree shape.
///
/// The [`CompensationDatabase`](super::CompensationDatabase) trait handles the workflows that
/// mutate this data; `MemberDirectory` only answers questions about it.
#[allow(async_fn_in_trait)]
pub trait MemberDirectory {
    /// Fetches the member with the given internal id, or `None`.
    async fn fetch_member(&self, member_id: i64) -> Result<Option<Member>, MemberApiError>;

    /// Fetches the member carrying the given human-facing member number, or `None`.
    async fn fetch_member_by_number(&self, member_number: &str) -> Result<Option<Member>, MemberApiError>;

    async fn fetch_member_by_email(&self, email: &str) -> Result<Option<Member>, MemberApiError>;

    async fn fetch_member_by_phone(&self, phone: &str) -> Result<Option<Member>, MemberApiError>;

    async fn fetch_member_by_national_id(&self, national_id: &str) -> Result<Option<Member>, MemberApiError>;

    /// Fetches every descendant of `root_id` within `max_depth` levels (plus the root itself,
    /// plus one further level marking boundary occupancy) as flat rows, in a single set-oriented
    /// query. Implementations must not issue per-node lookups; the result feeds
    /// latency-sensitive tree rendering.
    async fn fetch_subtree(&self, root_id: i64, max_depth: u32) -> Result<Vec<TreeNodeRow>, MemberApiError>;

    /// Counts all descendants of the member, optionally restricted to one leg at the first hop.
    async fn count_team(&self, member_id: i64, leg: Option<Leg>) -> Result<u64, MemberApiError>;

    /// Members referred by the given sponsor that are still pending placement.
    async fn pending_placements(&self, sponsor_id: i64) -> Result<Vec<Member>, MemberApiError>;

    /// The member's wallet ledger, newest first.
    async fn wallet_history(&self, member_id: i64) -> Result<Vec<WalletEntry>, MemberApiError>;
}
