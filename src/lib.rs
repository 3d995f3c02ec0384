//! Bulk pinner — batch pin authoring against a social-bookmarking service.
//!
//! ARCHITECTURE
//! ============
//! The session coordinator (`services::session`) owns one draft per selected
//! image (`services::draft`). Boards come from a local cache (`cache`) or the
//! remote service (`remote`). Rendering layers subscribe to the coordinator's
//! event channel (`events`) instead of reaching into coordinator state.

pub mod board;
pub mod cache;
pub mod config;
pub mod events;
pub mod image;
pub mod remote;
pub mod services;
