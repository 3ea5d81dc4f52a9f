//! `SqliteDatabase` is a concrete implementation of a compensation engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the
//! [`traits`](crate::traits) module. Workflows are composed from the low-level functions in
//! [`db`](super::db), each wrapped in a single transaction so that a failure anywhere in a walk
//! rolls the whole walk back.
use std::fmt::Debug;

use bce_common::{Cv, Pv};
use log::*;
use sqlx::SqlitePool;

use super::db::{commissions, db_url, members, new_pool, settings, tree, wallet};
use crate::{
    db_types::{GenerationRate, Leg, Member, NewMember, PayoutSummary, TreeNodeRow, WalletEntry},
    traits::{
        CompensationDatabase,
        MemberApiError,
        MemberDirectory,
        PayoutError,
        PlacementError,
        RegistrationError,
        SettingsError,
        DEFAULT_REFERRAL_BONUS,
        DEFAULT_WELCOME_BONUS,
        MAX_PAYOUT_HOPS,
        REFERRAL_BONUS_KEY,
        WELCOME_BONUS_KEY,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl MemberDirectory for SqliteDatabase {
    async fn fetch_member(&self, member_id: i64) -> Result<Option<Member>, MemberApiError> {
        let mut conn = self.pool.acquire().await?;
        members::member_by_id(member_id, &mut conn).await
    }

    async fn fetch_member_by_number(&self, member_number: &str) -> Result<Option<Member>, MemberApiError> {
        let mut conn = self.pool.acquire().await?;
        members::member_by_number(member_number, &mut conn).await
    }

    async fn fetch_member_by_email(&self, email: &str) -> Result<Option<Member>, MemberApiError> {
        let mut conn = self.pool.acquire().await?;
        members::member_by_email(email, &mut conn).await
    }

    async fn fetch_member_by_phone(&self, phone: &str) -> Result<Option<Member>, MemberApiError> {
        let mut conn = self.pool.acquire().await?;
        members::member_by_phone(phone, &mut conn).await
    }

    async fn fetch_member_by_national_id(&self, national_id: &str) -> Result<Option<Member>, MemberApiError> {
        let mut conn = self.pool.acquire().await?;
        members::member_by_national_id(national_id, &mut conn).await
    }

    async fn fetch_subtree(&self, root_id: i64, max_depth: u32) -> Result<Vec<TreeNodeRow>, MemberApiError> {
        let mut conn = self.pool.acquire().await?;
        tree::fetch_subtree(root_id, max_depth, &mut conn).await
    }

    async fn count_team(&self, member_id: i64, leg: Option<Leg>) -> Result<u64, MemberApiError> {
        let mut conn = self.pool.acquire().await?;
        tree::count_team(member_id, leg, &mut conn).await
    }

    async fn pending_placements(&self, sponsor_id: i64) -> Result<Vec<Member>, MemberApiError> {
        let mut conn = self.pool.acquire().await?;
        tree::pending_placements(sponsor_id, &mut conn).await
    }

    async fn wallet_history(&self, member_id: i64) -> Result<Vec<WalletEntry>, MemberApiError> {
        let mut conn = self.pool.acquire().await?;
        wallet::history_for_member(member_id, &mut conn).await
    }
}

impl CompensationDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    /// SQLite has no `SELECT ... FOR UPDATE`. Concurrent sales converging on a shared ancestor
    /// are serialized by SQLite's single-writer transaction model instead, which is coarser but
    /// sound for a single process. Deployments needing row-level locking should use a backend
    /// that reports `true` here.
    fn supports_row_locks(&self) -> bool {
        false
    }

    async fn place_member(&self, member_id: i64, parent_id: i64, leg: Leg) -> Result<Member, PlacementError> {
        let mut tx = self.pool.begin().await?;
        let member =
            members::member_by_id(member_id, &mut tx).await?.ok_or(PlacementError::MemberNotFound(member_id))?;
        if member.is_placed() {
            return Err(PlacementError::AlreadyPlaced(member_id));
        }
        members::member_by_id(parent_id, &mut tx).await?.ok_or(PlacementError::ParentNotFound(parent_id))?;
        if tree::leg_occupant(parent_id, leg, &mut tx).await?.is_some() {
            return Err(PlacementError::SlotOccupied { parent_id, leg });
        }
        let placed = tree::attach(member_id, parent_id, leg, &mut tx).await?;
        tx.commit().await?;
        Ok(placed)
    }

    async fn find_first_empty_leg(&self, parent_id: i64, preferred_leg: Leg) -> Result<i64, PlacementError> {
        let mut conn = self.pool.acquire().await?;
        members::member_by_id(parent_id, &mut conn).await?.ok_or(PlacementError::ParentNotFound(parent_id))?;
        let target = tree::find_first_empty_leg(parent_id, preferred_leg, &mut conn).await?;
        Ok(target)
    }

    /// Takes the PV of one completed sale and, in a single atomic transaction, walks the
    /// placement chain upward from the buyer:
    /// * each ancestor's occupied leg is credited with the sale volume (unsettled + cumulative),
    /// * the ancestor's rank is re-derived from the new cumulative totals,
    /// * short-leg matching fires wherever both legs now hold volume, cascading generation
    ///   overrides up the sponsor chain.
    ///
    /// Either every ancestor in the chain receives its credit and every triggered payout is
    /// recorded, or the entire walk rolls back and nothing is observable.
    async fn distribute_pv(
        &self,
        origin_member_id: i64,
        sale_pv: Pv,
        sale_cv: Cv,
    ) -> Result<PayoutSummary, PayoutError> {
        let mut tx = self.pool.begin().await?;
        let mut current = members::member_by_id(origin_member_id, &mut tx)
            .await?
            .ok_or(PayoutError::MemberNotFound(origin_member_id))?;
        let mut summary = PayoutSummary::default();

        while let (Some(parent_id), Some(leg)) = (current.parent_id, current.leg) {
            if summary.hops >= MAX_PAYOUT_HOPS {
                warn!(
                    "💰️ PV distribution from member #{origin_member_id} hit the {MAX_PAYOUT_HOPS}-hop cap. The \
                     placement chain should never be this deep."
                );
                break;
            }
            let Some(parent) = members::add_leg_volume(parent_id, leg, sale_pv, &mut tx).await? else {
                warn!("💰️ Parent #{parent_id} vanished mid-walk. Stopping the distribution here.");
                break;
            };
            summary.hops += 1;
            trace!("💰️ Credited {sale_pv} to the {leg} leg of member #{parent_id}");

            if let Some(promotion) = commissions::refresh_rank(&parent, &mut tx).await? {
                summary.promotions.push(promotion);
            }
            if let Some(payout) = commissions::check_matching(parent_id, &mut tx).await? {
                summary.matches.push(payout);
            }
            current = parent;
        }

        tx.commit().await?;
        info!(
            "💰️ Distributed {sale_pv} ({sale_cv}) from member #{origin_member_id} across {} ancestors. {} matches, \
             {} promotions.",
            summary.hops,
            summary.matches.len(),
            summary.promotions.len()
        );
        Ok(summary)
    }

    /// Registers a new member. Uniqueness checks fail fast before any mutation; everything after
    /// them (member insert, bonuses, ledger entries) happens inside one transaction and rolls
    /// back together on any failure.
    async fn register_member(&self, new_member: NewMember) -> Result<Member, RegistrationError> {
        let mut tx = self.pool.begin().await?;

        if members::member_by_email(&new_member.email, &mut tx).await?.is_some() {
            return Err(RegistrationError::DuplicateEmail(new_member.email));
        }
        if let Some(phone) = &new_member.phone {
            if members::member_by_phone(phone, &mut tx).await?.is_some() {
                return Err(RegistrationError::DuplicatePhone(phone.clone()));
            }
        }
        if let Some(national_id) = &new_member.national_id {
            if members::member_by_national_id(national_id, &mut tx).await?.is_some() {
                return Err(RegistrationError::DuplicateNationalId(national_id.clone()));
            }
        }
        let sponsor = members::member_by_id(new_member.sponsor_id, &mut tx)
            .await?
            .ok_or_else(|| RegistrationError::SponsorNotFound(new_member.sponsor_id.to_string()))?;

        let member_number = match &new_member.member_number {
            Some(number) => {
                if members::member_by_number(number, &mut tx).await?.is_some() {
                    return Err(RegistrationError::DuplicateMemberNumber(number.clone()));
                }
                number.clone()
            },
            None => members::allocate_member_number(&mut tx).await?,
        };

        let member = members::insert_member(&new_member, &member_number, &mut tx).await?;

        let referral_bonus =
            settings::get_or_default(REFERRAL_BONUS_KEY, DEFAULT_REFERRAL_BONUS, &mut tx).await?;
        if referral_bonus > 0.0 {
            commissions::pay_referral_bonus(sponsor.id, Cv::from_cv_f64(referral_bonus), &member.full_name, &mut tx)
                .await?;
        }

        let welcome_bonus = settings::get_or_default(WELCOME_BONUS_KEY, DEFAULT_WELCOME_BONUS, &mut tx).await?;
        if welcome_bonus > 0.0 {
            let amount = Cv::from_cv_f64(welcome_bonus);
            members::credit_cv(member.id, amount, &mut tx).await?;
            let entry = crate::db_types::NewWalletEntry::new(
                member.id,
                amount,
                crate::db_types::WalletCategory::Welcome,
                "Welcome bonus",
            );
            wallet::insert_entry(&entry, &mut tx).await?;
        }

        // Bonuses may have touched the stored record; return what actually committed.
        let member = members::member_by_id(member.id, &mut tx)
            .await?
            .ok_or_else(|| RegistrationError::DatabaseError(format!("Member #{} vanished mid-registration", member.id)))?;
        tx.commit().await?;
        info!(
            "📝️ Registered member #{} ({member_number}) with sponsor #{}. Referral bonus: {referral_bonus} CV",
            member.id, sponsor.id
        );
        Ok(member)
    }

    async fn setting_or_default(&self, key: &str, default: f64) -> Result<f64, SettingsError> {
        let mut conn = self.pool.acquire().await?;
        settings::get_or_default(key, default, &mut conn).await
    }

    async fn set_setting(&self, key: &str, value: f64) -> Result<(), SettingsError> {
        let mut conn = self.pool.acquire().await?;
        settings::set(key, value, &mut conn).await
    }

    async fn set_generation_rate(&self, generation: i64, rate: f64) -> Result<(), SettingsError> {
        let mut conn = self.pool.acquire().await?;
        settings::set_generation_rate(generation, rate, &mut conn).await
    }

    async fn generation_rates(&self) -> Result<Vec<GenerationRate>, SettingsError> {
        let mut conn = self.pool.acquire().await?;
        settings::generation_rates(&mut conn).await
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the URL from the environment.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
