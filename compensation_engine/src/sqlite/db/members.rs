use bce_common::{Cv, Pv};
use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db_types::{Leg, Member, NewMember, Rank},
    helpers::member_number::random_member_number,
    traits::MemberApiError,
};

/// Column list for every query that materializes a full [`Member`].
pub(crate) const MEMBER_COLUMNS: &str = "id, member_number, full_name, email, phone, national_id, sponsor_id, \
                                         parent_id, leg, left_pv, right_pv, left_pv_total, right_pv_total, total_cv, \
                                         rank, created_at, updated_at";

pub async fn member_by_id(member_id: i64, conn: &mut SqliteConnection) -> Result<Option<Member>, MemberApiError> {
    let sql = format!("SELECT {MEMBER_COLUMNS} FROM members WHERE id = $1");
    let member = sqlx::query_as::<_, Member>(&sql).bind(member_id).fetch_optional(&mut *conn).await?;
    Ok(member)
}

pub async fn member_by_number(
    member_number: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Member>, MemberApiError> {
    let sql = format!("SELECT {MEMBER_COLUMNS} FROM members WHERE member_number = $1");
    let member = sqlx::query_as::<_, Member>(&sql).bind(member_number).fetch_optional(&mut *conn).await?;
    Ok(member)
}

pub async fn member_by_email(email: &str, conn: &mut SqliteConnection) -> Result<Option<Member>, MemberApiError> {
    let sql = format!("SELECT {MEMBER_COLUMNS} FROM members WHERE email = $1");
    let member = sqlx::query_as::<_, Member>(&sql).bind(email).fetch_optional(&mut *conn).await?;
    Ok(member)
}

pub async fn member_by_phone(phone: &str, conn: &mut SqliteConnection) -> Result<Option<Member>, MemberApiError> {
    let sql = format!("SELECT {MEMBER_COLUMNS} FROM members WHERE phone = $1");
    let member = sqlx::query_as::<_, Member>(&sql).bind(phone).fetch_optional(&mut *conn).await?;
    Ok(member)
}

pub async fn member_by_national_id(
    national_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Member>, MemberApiError> {
    let sql = format!("SELECT {MEMBER_COLUMNS} FROM members WHERE national_id = $1");
    let member = sqlx::query_as::<_, Member>(&sql).bind(national_id).fetch_optional(&mut *conn).await?;
    Ok(member)
}

/// Inserts a new, unplaced member at base rank and returns the stored record.
pub async fn insert_member(
    new_member: &NewMember,
    member_number: &str,
    conn: &mut SqliteConnection,
) -> Result<Member, MemberApiError> {
    let sql = format!(
        "INSERT INTO members (member_number, full_name, email, phone, national_id, sponsor_id) VALUES ($1, $2, $3, \
         $4, $5, $6) RETURNING {MEMBER_COLUMNS}"
    );
    let member = sqlx::query_as::<_, Member>(&sql)
        .bind(member_number)
        .bind(&new_member.full_name)
        .bind(&new_member.email)
        .bind(&new_member.phone)
        .bind(&new_member.national_id)
        .bind(new_member.sponsor_id)
        .fetch_one(&mut *conn)
        .await?;
    debug!("📝️ Created member #{} with member number {member_number}", member.id);
    Ok(member)
}

/// Allocates a fresh member number, regenerating on collision. The collision probability is tiny
/// at 7 random digits, but the loop is unbounded in principle.
pub async fn allocate_member_number(conn: &mut SqliteConnection) -> Result<String, MemberApiError> {
    loop {
        let candidate = random_member_number();
        if member_by_number(&candidate, &mut *conn).await?.is_none() {
            trace!("📝️ Allocated member number {candidate}");
            return Ok(candidate);
        }
        debug!("📝️ Member number {candidate} is taken. Regenerating.");
    }
}

/// Adds sale volume to one leg of a member: both the unsettled balance and the cumulative
/// qualification total. Single read-modify-write statement; returns the updated record.
pub async fn add_leg_volume(
    member_id: i64,
    leg: Leg,
    volume: Pv,
    conn: &mut SqliteConnection,
) -> Result<Option<Member>, MemberApiError> {
    let sql = match leg {
        Leg::Left => format!(
            "UPDATE members SET left_pv = left_pv + $1, left_pv_total = left_pv_total + $1, updated_at = \
             CURRENT_TIMESTAMP WHERE id = $2 RETURNING {MEMBER_COLUMNS}"
        ),
        Leg::Right => format!(
            "UPDATE members SET right_pv = right_pv + $1, right_pv_total = right_pv_total + $1, updated_at = \
             CURRENT_TIMESTAMP WHERE id = $2 RETURNING {MEMBER_COLUMNS}"
        ),
    };
    let member = sqlx::query_as::<_, Member>(&sql).bind(volume).bind(member_id).fetch_optional(&mut *conn).await?;
    Ok(member)
}

/// Credits commission value to a member's lifetime total.
pub async fn credit_cv(member_id: i64, amount: Cv, conn: &mut SqliteConnection) -> Result<(), MemberApiError> {
    sqlx::query("UPDATE members SET total_cv = total_cv + $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2")
        .bind(amount)
        .bind(member_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Settles a match: drains the matched volume from both unsettled legs and credits the payout.
/// The cumulative totals are deliberately untouched; matching never consumes qualification
/// volume.
pub async fn apply_matching(
    member_id: i64,
    matched: Pv,
    payout: Cv,
    conn: &mut SqliteConnection,
) -> Result<(), MemberApiError> {
    sqlx::query(
        "UPDATE members SET left_pv = left_pv - $1, right_pv = right_pv - $1, total_cv = total_cv + $2, updated_at = \
         CURRENT_TIMESTAMP WHERE id = $3",
    )
    .bind(matched)
    .bind(payout)
    .bind(member_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn set_rank(member_id: i64, rank: Rank, conn: &mut SqliteConnection) -> Result<(), MemberApiError> {
    sqlx::query("UPDATE members SET rank = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2")
        .bind(rank)
        .bind(member_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}
