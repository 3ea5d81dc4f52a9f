use bce_common::{Cv, Pv};
use thiserror::Error;

use crate::{
    db_types::{GenerationRate, Leg, Member, NewMember, PayoutSummary},
    traits::{MemberApiError, MemberDirectory},
};

/// Settings key for the short-leg matching rate.
pub const SHORT_LEG_RATE_KEY: &str = "short_leg_rate";
pub const DEFAULT_SHORT_LEG_RATE: f64 = 0.13;

/// Settings key for the sponsor referral bonus, in CV.
pub const REFERRAL_BONUS_KEY: &str = "referral_bonus";
pub const DEFAULT_REFERRAL_BONUS: f64 = 50.0;

/// Settings key for the new-member welcome bonus, in CV.
pub const WELCOME_BONUS_KEY: &str = "welcome_bonus";
pub const DEFAULT_WELCOME_BONUS: f64 = 0.0;

/// Hard cap on the ancestor walk of a PV distribution. The tree is acyclic by construction
/// (placement is single-assignment), so this is a runaway safeguard, not an expected limit.
pub const MAX_PAYOUT_HOPS: u32 = 500;

/// Hard cap on generation-override depth, independent of how many rate rows exist.
pub const MAX_GENERATIONS: i64 = 10;

/// Hard cap on the empty-leg search descent.
pub const MAX_DESCENT_HOPS: u32 = 1000;

#[derive(Debug, Clone, Error)]
pub enum PlacementError {
    #[error("Member #{0} does not exist")]
    MemberNotFound(i64),
    #[error("Placement parent #{0} does not exist")]
    ParentNotFound(i64),
    #[error("Member #{0} is already placed in the tree. Placement is irreversible")]
    AlreadyPlaced(i64),
    #[error("The {leg} leg of member #{parent_id} is already occupied")]
    SlotOccupied { parent_id: i64, leg: Leg },
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for PlacementError {
    fn from(e: sqlx::Error) -> Self {
        PlacementError::DatabaseError(e.to_string())
    }
}

impl From<MemberApiError> for PlacementError {
    fn from(e: MemberApiError) -> Self {
        PlacementError::DatabaseError(e.to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum RegistrationError {
    #[error("The email address {0} is already registered")]
    DuplicateEmail(String),
    #[error("The phone number {0} is already registered")]
    DuplicatePhone(String),
    #[error("The national id {0} is already registered")]
    DuplicateNationalId(String),
    #[error("The member number {0} is already taken")]
    DuplicateMemberNumber(String),
    #[error("Sponsor {0} does not exist")]
    SponsorNotFound(String),
    #[error("Registration failed: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for RegistrationError {
    fn from(e: sqlx::Error) -> Self {
        RegistrationError::DatabaseError(e.to_string())
    }
}

impl From<MemberApiError> for RegistrationError {
    fn from(e: MemberApiError) -> Self {
        RegistrationError::DatabaseError(e.to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum PayoutError {
    #[error("Member #{0} does not exist")]
    MemberNotFound(i64),
    #[error("PV distribution failed and was rolled back: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for PayoutError {
    fn from(e: sqlx::Error) -> Self {
        PayoutError::DatabaseError(e.to_string())
    }
}

impl From<MemberApiError> for PayoutError {
    fn from(e: MemberApiError) -> Self {
        PayoutError::DatabaseError(e.to_string())
    }
}

impl From<SettingsError> for PayoutError {
    fn from(e: SettingsError) -> Self {
        PayoutError::DatabaseError(e.to_string())
    }
}

impl From<PayoutError> for RegistrationError {
    fn from(e: PayoutError) -> Self {
        RegistrationError::DatabaseError(e.to_string())
    }
}

impl From<SettingsError> for RegistrationError {
    fn from(e: SettingsError) -> Self {
        RegistrationError::DatabaseError(e.to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum SettingsError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for SettingsError {
    fn from(e: sqlx::Error) -> Self {
        SettingsError::DatabaseError(e.to_string())
    }
}

/// The transactional workflows of the compensation engine.
///
/// Every method that mutates state runs as a single atomic unit of work: either all of its
/// effects commit together, or none of them are observable. Partial credit propagation must
/// never be visible to concurrent readers.
#[allow(async_fn_in_trait)]
pub trait CompensationDatabase: Clone + MemberDirectory {
    /// The URL of the database.
    fn url(&self) -> &str;

    /// Whether the backend serializes concurrent read-modify-write access to a shared ancestor
    /// with row-level locks. Backends that return `false` provide weaker, documented
    /// best-effort behaviour (e.g. whole-transaction writer serialization on SQLite), and
    /// deployments needing strict concurrent correctness should pick a backend that returns
    /// `true`.
    fn supports_row_locks(&self) -> bool;

    /// Places an unplaced member under `parent_id` on the given leg. The only mutation path for
    /// tree shape, and irreversible: there is no move or re-parent operation.
    async fn place_member(&self, member_id: i64, parent_id: i64, leg: Leg) -> Result<Member, PlacementError>;

    /// Descends from `parent_id` along `preferred_leg` until an unoccupied slot is found, and
    /// returns the id of the node owning that slot. Iterative, capped at [`MAX_DESCENT_HOPS`];
    /// on hitting the cap the deepest node reached is returned and a warning logged.
    async fn find_first_empty_leg(&self, parent_id: i64, preferred_leg: Leg) -> Result<i64, PlacementError>;

    /// Distributes the PV of one completed sale up the placement chain from the buyer, crediting
    /// each ancestor's occupied leg, re-deriving each ancestor's rank, and firing short-leg
    /// matching (with generation overrides) wherever both legs hold volume. One transaction for
    /// the entire walk.
    async fn distribute_pv(&self, origin_member_id: i64, sale_pv: Pv, sale_cv: Cv)
        -> Result<PayoutSummary, PayoutError>;

    /// Registers a new member: uniqueness checks, sponsor validation, member-number allocation,
    /// member creation (unplaced), sponsor referral bonus and optional welcome bonus.
    async fn register_member(&self, new_member: NewMember) -> Result<Member, RegistrationError>;

    /// Reads a tunable setting, lazily creating it with the given default if absent.
    async fn setting_or_default(&self, key: &str, default: f64) -> Result<f64, SettingsError>;

    /// Creates or overwrites a tunable setting.
    async fn set_setting(&self, key: &str, value: f64) -> Result<(), SettingsError>;

    /// Creates or overwrites the override rate for one generation.
    async fn set_generation_rate(&self, generation: i64, rate: f64) -> Result<(), SettingsError>;

    /// All configured generation rates, ordered by generation.
    async fn generation_rates(&self) -> Result<Vec<GenerationRate>, SettingsError>;
}
