//! Disk Cacher - asynchronous cache writes
//!
//! Hand a [`Cacher`] an item that knows its file name and how to turn
//! itself into bytes; the write happens atomically on a background worker
//! and the caller is told where the file landed.

pub mod cache;

pub use cache::{Cachable, CacheError, Cacher, Destination, JsonItem, PendingWrite, Result};
