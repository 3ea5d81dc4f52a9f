//! Backend interface contracts for the compensation engine.
//!
//! The engine is split into a read side and a write side:
//!
//! * [`MemberDirectory`] provides queries over members, wallet history and tree shape. It carries
//!   no business logic.
//! * [`CompensationDatabase`] defines the transactional workflows: tree placement, PV
//!   distribution with matching and generation overrides, registration, and the settings store.
//!   Each workflow is a single atomic unit of work; a failure anywhere inside it must roll the
//!   whole workflow back.
//!
//! Specific backends (SQLite today) implement these traits to act as a storage engine for the
//! compensation APIs.
mod compensation_database;
mod member_directory;

pub use compensation_database::{
    CompensationDatabase,
    PayoutError,
    PlacementError,
    RegistrationError,
    SettingsError,
    DEFAULT_REFERRAL_BONUS,
    DEFAULT_SHORT_LEG_RATE,
    DEFAULT_WELCOME_BONUS,
    MAX_DESCENT_HOPS,
    MAX_GENERATIONS,
    MAX_PAYOUT_HOPS,
    REFERRAL_BONUS_KEY,
    SHORT_LEG_RATE_KEY,
    WELCOME_BONUS_KEY,
};
pub use member_directory::{MemberApiError, MemberDirectory};
