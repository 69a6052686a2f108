//! Anime records as reported by the remote catalog.

mod types;

pub use types::*;
