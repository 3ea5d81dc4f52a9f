//! Binary-tree shape queries and the placement mutation.
//!
//! Subtree and team-count reads use recursive CTEs so that a whole tree region is fetched in one
//! set-oriented query. Rendering a 3-level tree costs one round trip, not one per node.

use log::{info, warn};
use sqlx::SqliteConnection;

use crate::{
    db_types::{Leg, Member, TreeNodeRow},
    sqlite::db::members::MEMBER_COLUMNS,
    traits::{MemberApiError, PlacementError, MAX_DESCENT_HOPS},
};

/// Fetches the member occupying the given leg under `parent_id`, if any.
pub async fn leg_occupant(
    parent_id: i64,
    leg: Leg,
    conn: &mut SqliteConnection,
) -> Result<Option<Member>, MemberApiError> {
    let sql = format!("SELECT {MEMBER_COLUMNS} FROM members WHERE parent_id = $1 AND leg = $2");
    let member = sqlx::query_as::<_, Member>(&sql).bind(parent_id).bind(leg).fetch_optional(&mut *conn).await?;
    Ok(member)
}

/// Attaches a member to the tree. Preconditions (member unplaced, slot free) are checked by the
/// caller inside the same transaction; the unique index on `(parent_id, leg)` backs this up at
/// the storage layer and any race surfaces as `SlotOccupied`.
pub async fn attach(
    member_id: i64,
    parent_id: i64,
    leg: Leg,
    conn: &mut SqliteConnection,
) -> Result<Member, PlacementError> {
    let sql = format!(
        "UPDATE members SET parent_id = $1, leg = $2, updated_at = CURRENT_TIMESTAMP WHERE id = $3 RETURNING \
         {MEMBER_COLUMNS}"
    );
    let result = sqlx::query_as::<_, Member>(&sql).bind(parent_id).bind(leg).bind(member_id).fetch_one(&mut *conn).await;
    match result {
        Ok(member) => {
            info!("🌳️ Member #{member_id} placed under #{parent_id} on the {leg} leg");
            Ok(member)
        },
        Err(sqlx::Error::RowNotFound) => Err(PlacementError::MemberNotFound(member_id)),
        Err(e) if e.as_database_error().map(|d| d.is_unique_violation()).unwrap_or(false) => {
            Err(PlacementError::SlotOccupied { parent_id, leg })
        },
        Err(e) => Err(e.into()),
    }
}

/// Walks down from `parent_id` along the preferred leg until an empty slot is found. Iterative
/// with a hard hop cap; on hitting the cap, the deepest node reached is returned and a warning
/// logged rather than erroring out (the cap marks a pathological tree, not invalid input).
pub async fn find_first_empty_leg(
    parent_id: i64,
    preferred_leg: Leg,
    conn: &mut SqliteConnection,
) -> Result<i64, MemberApiError> {
    let mut current = parent_id;
    for _ in 0..MAX_DESCENT_HOPS {
        match leg_occupant(current, preferred_leg, &mut *conn).await? {
            None => return Ok(current),
            Some(child) => current = child.id,
        }
    }
    warn!(
        "🌳️ Empty-leg search below member #{parent_id} on {preferred_leg} hit the {MAX_DESCENT_HOPS}-hop cap. \
         Returning the deepest node reached (#{current})."
    );
    Ok(current)
}

/// Fetches the root and every descendant within `max_depth` levels as flat rows with their
/// depth, in one recursive query. One extra level past the window is included so that assembly
/// can tell an occupied boundary slot (rendered as an expansion point) from an empty one.
pub async fn fetch_subtree(
    root_id: i64,
    max_depth: u32,
    conn: &mut SqliteConnection,
) -> Result<Vec<TreeNodeRow>, MemberApiError> {
    let rows = sqlx::query_as::<_, TreeNodeRow>(
        r#"
        WITH RECURSIVE subtree (id, full_name, member_number, parent_id, leg, left_pv, right_pv, depth) AS (
            SELECT id, full_name, member_number, parent_id, leg, left_pv, right_pv, 0
            FROM members
            WHERE id = $1

            UNION ALL

            SELECT m.id, m.full_name, m.member_number, m.parent_id, m.leg, m.left_pv, m.right_pv, s.depth + 1
            FROM members m
            INNER JOIN subtree s ON m.parent_id = s.id
            WHERE s.depth < $2
        )
        SELECT id, full_name, member_number, parent_id, leg, left_pv, right_pv, depth FROM subtree"#,
    )
    .bind(root_id)
    .bind(max_depth as i64 + 1)
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows)
}

/// Counts all descendants of a member; with a leg filter, only the subtree hanging off that leg
/// at the first hop.
pub async fn count_team(
    member_id: i64,
    leg: Option<Leg>,
    conn: &mut SqliteConnection,
) -> Result<u64, MemberApiError> {
    let total: i64 = match leg {
        Some(leg) => {
            sqlx::query_scalar(
                r#"
                WITH RECURSIVE team (id) AS (
                    SELECT id FROM members WHERE parent_id = $1 AND leg = $2
                    UNION ALL
                    SELECT m.id FROM members m INNER JOIN team t ON m.parent_id = t.id
                )
                SELECT COUNT(id) FROM team"#,
            )
            .bind(member_id)
            .bind(leg)
            .fetch_one(&mut *conn)
            .await?
        },
        None => {
            sqlx::query_scalar(
                r#"
                WITH RECURSIVE team (id) AS (
                    SELECT id FROM members WHERE parent_id = $1
                    UNION ALL
                    SELECT m.id FROM members m INNER JOIN team t ON m.parent_id = t.id
                )
                SELECT COUNT(id) FROM team"#,
            )
            .bind(member_id)
            .fetch_one(&mut *conn)
            .await?
        },
    };
    #[allow(clippy::cast_sign_loss)]
    Ok(total as u64)
}

/// Members referred by the sponsor that have not been placed in the tree yet.
pub async fn pending_placements(
    sponsor_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Member>, MemberApiError> {
    let sql =
        format!("SELECT {MEMBER_COLUMNS} FROM members WHERE sponsor_id = $1 AND parent_id IS NULL ORDER BY created_at, id");
    let members = sqlx::query_as::<_, Member>(&sql).bind(sponsor_id).fetch_all(&mut *conn).await?;
    Ok(members)
}
