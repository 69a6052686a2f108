//! HTTP front end for AniTrack.
//!
//! Exposed as a library so integration tests can build the router in-process.

pub mod api;
pub mod metrics;
pub mod state;
