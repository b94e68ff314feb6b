//! Periodic refresh of aggregate pool statistics
//!
//! Unlike session polling this runs on a fixed period with no backoff: a
//! failed fetch is logged and skipped, and the next tick runs as usual.

pub mod subscription;

pub use subscription::{PoolCallback, PoolSubscription, DEFAULT_POOL_REFRESH_INTERVAL};
