//! High-level APIs over a [`CompensationDatabase`](crate::traits::CompensationDatabase) backend.
//!
//! Each API is a thin, cloneable wrapper around the backend that adds the behaviour callers want
//! at the edge (tree assembly and caching, no-op filtering, sponsor resolution) without putting
//! any of it inside the transactional core.
mod payout_api;
mod registration_api;
mod tree_api;
pub mod tree_objects;

pub use payout_api::PayoutApi;
pub use registration_api::RegistrationApi;
pub use tree_api::{TreeApi, DEFAULT_TREE_DEPTH, SUBTREE_CACHE_TTL};
