//! Offline-first sync core for the muster yard operations client.
//!
//! Every remote collection is loaded network-first and mirrored into a
//! persistent key-value store so the app keeps working without connectivity.
//! The `sync` module holds the generic engines, `resources` wires them up for
//! the yard domain, and `registry` is the composition root shells talk to.

pub mod auth;
pub mod cache;
pub mod errors;
pub mod reachability;
pub mod registry;
pub mod resources;
pub mod store;
pub mod sync;

pub use errors::SyncError;
