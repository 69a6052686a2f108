//! Read-through TTL cache for catalog responses.
//!
//! Entries are keyed by a normalized [`CacheKey`] and expire once they are
//! older than the cache-wide TTL. Failed fetches are never stored.

mod clock;
mod key;
mod ttl;

pub use clock::{Clock, ManualClock, SystemClock};
pub use key::{normalize_query, CacheKey};
pub use ttl::{CacheStats, TtlCache, DEFAULT_TTL};
