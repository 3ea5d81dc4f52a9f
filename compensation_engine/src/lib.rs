//! Binary Compensation Engine
//!
//! The compensation engine is the settlement core of a binary-plan direct-sales organization. It
//! owns the member genealogy (a binary placement tree plus an independent sponsorship chain) and
//! turns completed sales into commissions. This library is provider-agnostic: it contains no web
//! or messaging surface of its own.
//!
//! The library is divided into two main sections:
//! 1. Database management and control ([`mod@sqlite`]). SQLite is the supported backend. You
//!    should never need to access the database directly; use the public APIs instead. The
//!    exception is the data types stored in the database, which are defined in the [`db_types`]
//!    module and are public.
//! 2. The engine public API ([`mod@api`]). [`TreeApi`](api::TreeApi) renders and mutates the
//!    placement tree, [`PayoutApi`](api::PayoutApi) settles sales, and
//!    [`RegistrationApi`](api::RegistrationApi) signs up new members. Backends implement the
//!    traits in [`mod@traits`] to drive these APIs.
//!
//! Money flows through two distinct units: PV (point volume, what a sale is worth for
//! qualification and matching) and CV (commission value, what actually lands in a wallet). Both
//! are fixed-point integers from [`bce_common`]; no commission arithmetic touches floating point
//! except the configured rates themselves.
pub mod api;
pub mod db_types;
pub mod helpers;
pub mod rank;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{CompensationDatabase, MemberDirectory};
