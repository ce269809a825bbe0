//! Disk cache writer
//!
//! Persists cachable items to a cache directory on a background FIFO queue.

pub mod destination;
pub mod errors;
pub mod item;
pub mod writer;

pub use destination::Destination;
pub use errors::{CacheError, Result};
pub use item::{Cachable, JsonItem};
pub use writer::{Cacher, PendingWrite};
