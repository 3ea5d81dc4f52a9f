use std::{fmt::Display, str::FromStr};

use bce_common::{Cv, Pv};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

//--------------------------------------        Leg        -----------------------------------------------------------
/// One of the two child slots under a placement-tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Leg {
    Left,
    Right,
}

impl Display for Leg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Leg::Left => write!(f, "LEFT"),
            Leg::Right => write!(f, "RIGHT"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid leg: {0}. A leg is either LEFT or RIGHT")]
pub struct InvalidLeg(pub String);

impl FromStr for Leg {
    type Err = InvalidLeg;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LEFT" => Ok(Leg::Left),
            "RIGHT" => Ok(Leg::Right),
            other => Err(InvalidLeg(other.to_string())),
        }
    }
}

//--------------------------------------        Rank       -----------------------------------------------------------
/// Career level. Ordered ascending; derived from cumulative leg volumes only, so it never
/// regresses as volumes accumulate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Type, Serialize, Deserialize)]
pub enum Rank {
    #[default]
    Distributor,
    Platinum,
    Pearl,
    Sapphire,
    Ruby,
    Emerald,
    Diamond,
    #[sqlx(rename = "Double Diamond")]
    #[serde(rename = "Double Diamond")]
    DoubleDiamond,
    #[sqlx(rename = "Triple Diamond")]
    #[serde(rename = "Triple Diamond")]
    TripleDiamond,
    President,
    #[sqlx(rename = "Double President")]
    #[serde(rename = "Double President")]
    DoublePresident,
    #[sqlx(rename = "Triple President")]
    #[serde(rename = "Triple President")]
    TriplePresident,
}

impl Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Rank::Distributor => "Distributor",
            Rank::Platinum => "Platinum",
            Rank::Pearl => "Pearl",
            Rank::Sapphire => "Sapphire",
            Rank::Ruby => "Ruby",
            Rank::Emerald => "Emerald",
            Rank::Diamond => "Diamond",
            Rank::DoubleDiamond => "Double Diamond",
            Rank::TripleDiamond => "Triple Diamond",
            Rank::President => "President",
            Rank::DoublePresident => "Double President",
            Rank::TriplePresident => "Triple President",
        };
        write!(f, "{name}")
    }
}

//--------------------------------------   WalletCategory   ----------------------------------------------------------
/// Category of a wallet ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WalletCategory {
    Referral,
    Matching,
    Generation,
    Welcome,
    RankUp,
}

impl Display for WalletCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WalletCategory::Referral => write!(f, "REFERRAL"),
            WalletCategory::Matching => write!(f, "MATCHING"),
            WalletCategory::Generation => write!(f, "GENERATION"),
            WalletCategory::Welcome => write!(f, "WELCOME"),
            WalletCategory::RankUp => write!(f, "RANK_UP"),
        }
    }
}

//--------------------------------------       Member       ----------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Member {
    pub id: i64,
    /// Human-facing member code. Unique, immutable once assigned.
    pub member_number: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub national_id: Option<String>,
    /// Who referred this member. Independent of tree position.
    pub sponsor_id: Option<i64>,
    /// Placement parent. `None` while the member is pending placement.
    pub parent_id: Option<i64>,
    /// Which of the parent's legs this member occupies. Set together with `parent_id`.
    pub leg: Option<Leg>,
    /// Unsettled volume sitting on each leg, drained by matching.
    pub left_pv: Pv,
    pub right_pv: Pv,
    /// Cumulative volume per leg. Never decremented; drives rank qualification.
    pub left_pv_total: Pv,
    pub right_pv_total: Pv,
    /// Lifetime commission value earned.
    pub total_cv: Cv,
    pub rank: Rank,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    pub fn is_placed(&self) -> bool {
        self.parent_id.is_some()
    }
}

//--------------------------------------      NewMember     ----------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewMember {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub national_id: Option<String>,
    /// The referring member. Must exist.
    pub sponsor_id: i64,
    /// If `None`, a member number is allocated at registration.
    pub member_number: Option<String>,
}

impl NewMember {
    pub fn new<S1: Into<String>, S2: Into<String>>(full_name: S1, email: S2, sponsor_id: i64) -> Self {
        Self {
            full_name: full_name.into(),
            email: email.into(),
            phone: None,
            national_id: None,
            sponsor_id,
            member_number: None,
        }
    }

    pub fn with_phone<S: Into<String>>(mut self, phone: S) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_national_id<S: Into<String>>(mut self, national_id: S) -> Self {
        self.national_id = Some(national_id.into());
        self
    }

    pub fn with_member_number<S: Into<String>>(mut self, member_number: S) -> Self {
        self.member_number = Some(member_number.into());
        self
    }
}

//--------------------------------------     WalletEntry    ----------------------------------------------------------
/// A row in the append-only wallet ledger.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct WalletEntry {
    pub id: i64,
    pub member_id: i64,
    pub amount: Cv,
    pub category: WalletCategory,
    pub memo: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewWalletEntry {
    pub member_id: i64,
    pub amount: Cv,
    pub category: WalletCategory,
    pub memo: String,
}

impl NewWalletEntry {
    pub fn new<S: Into<String>>(member_id: i64, amount: Cv, category: WalletCategory, memo: S) -> Self {
        Self { member_id, amount, category, memo: memo.into() }
    }
}

//--------------------------------------    TreeNodeRow     ----------------------------------------------------------
/// One flat row of a subtree fetch. The whole subtree is produced by a single recursive query
/// and reassembled into a nested structure in memory.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TreeNodeRow {
    pub id: i64,
    pub full_name: String,
    pub member_number: String,
    pub parent_id: Option<i64>,
    pub leg: Option<Leg>,
    pub left_pv: Pv,
    pub right_pv: Pv,
    pub depth: i64,
}

//--------------------------------------   GenerationRate   ----------------------------------------------------------
#[derive(Debug, Clone, Copy, FromRow, Serialize, Deserialize)]
pub struct GenerationRate {
    pub generation: i64,
    pub rate: f64,
}

//--------------------------------------   Payout results   ----------------------------------------------------------
/// A matching payout that fired during a PV distribution walk.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MatchingPayout {
    pub member_id: i64,
    /// The short-leg volume consumed from both legs.
    pub matched: Pv,
    pub payout: Cv,
}

/// A rank promotion that fired during a PV distribution walk.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RankChange {
    pub member_id: i64,
    pub from: Rank,
    pub to: Rank,
}

/// What happened during one `distribute_pv` invocation. Committed atomically: either all of it
/// is visible, or none of it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayoutSummary {
    /// Number of ancestors credited on the walk up the placement chain.
    pub hops: u32,
    pub matches: Vec<MatchingPayout>,
    pub promotions: Vec<RankChange>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn leg_round_trips_through_strings() {
        assert_eq!("LEFT".parse::<Leg>().unwrap(), Leg::Left);
        assert_eq!("right".parse::<Leg>().unwrap(), Leg::Right);
        assert_eq!(Leg::Left.to_string(), "LEFT");
        assert!("MIDDLE".parse::<Leg>().is_err());
    }

    #[test]
    fn ranks_are_ordered_ascending() {
        assert!(Rank::Distributor < Rank::Platinum);
        assert!(Rank::Diamond < Rank::DoubleDiamond);
        assert!(Rank::President < Rank::TriplePresident);
        assert_eq!(Rank::default(), Rank::Distributor);
    }
}
